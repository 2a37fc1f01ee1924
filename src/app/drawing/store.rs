//! Besitzer des Zeichen-Modus: Action-Queue rein, Zustände raus.

use super::{DrawingAction, DrawingModeState, reduce};
use tokio::sync::{mpsc, watch};

/// Sendeseite der Action-Queue.
#[derive(Debug, Clone)]
pub struct DrawingDispatcher(mpsc::UnboundedSender<DrawingAction>);

impl DrawingDispatcher {
    /// Stellt eine Action ein. `false`, wenn der Store nicht mehr existiert.
    pub fn dispatch(&self, action: DrawingAction) -> bool {
        self.0.send(action).is_ok()
    }
}

/// Hält den aktuellen Zustand und veröffentlicht jede Änderung.
#[derive(Debug)]
pub struct DrawingStore {
    state: DrawingModeState,
    queue_tx: mpsc::UnboundedSender<DrawingAction>,
    queue_rx: mpsc::UnboundedReceiver<DrawingAction>,
    publisher: watch::Sender<DrawingModeState>,
}

impl Default for DrawingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingStore {
    /// Erstellt einen Store im Idle-Zustand.
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (publisher, _) = watch::channel(DrawingModeState::default());
        Self {
            state: DrawingModeState::default(),
            queue_tx,
            queue_rx,
            publisher,
        }
    }

    /// Aktueller Zustand.
    pub fn state(&self) -> &DrawingModeState {
        &self.state
    }

    /// Neue Sendeseite für Actions.
    pub fn dispatcher(&self) -> DrawingDispatcher {
        DrawingDispatcher(self.queue_tx.clone())
    }

    /// Beobachter, der jeden neuen Zustand sieht.
    pub fn subscribe(&self) -> watch::Receiver<DrawingModeState> {
        self.publisher.subscribe()
    }

    /// Wendet eine Action sofort an.
    pub fn dispatch(&mut self, action: DrawingAction) -> &DrawingModeState {
        let next = reduce(&self.state, &action);
        if next != self.state {
            log::debug!("Zeichen-Modus geändert: {:?}", next.interaction);
            self.publisher.send_replace(next.clone());
            self.state = next;
        }
        &self.state
    }

    /// Arbeitet alle wartenden Actions in Reihenfolge ab. Liefert deren Anzahl.
    pub fn process_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(action) = self.queue_rx.try_recv() {
            self.dispatch(action);
            count += 1;
        }
        count
    }
}
