//! WFS-T Editor Library.
//! Editier-Kern (Codec, Transport, Interaktionen, Zeichen-Modus) als Library exportiert
//! für Tests und Wiederverwendung.

pub mod app;
pub mod core;
pub mod shared;
pub mod transport;
pub mod xml;

pub use app::{
    ArmState, DeleteOutcome, DirtyTracker, EditIntent, EditOutcome, InsertOutcome,
    InteractionController, UpdateOutcome, intent_channel,
};
pub use app::drawing::{DrawingAction, DrawingModeState, DrawingStore, reduce};
pub use core::{
    FeatureEdit, FeatureKey, Geometry, GeometryType, LayerTransactionConfig, VectorLayer,
};
pub use shared::{EditError, EditorOptions};
pub use transport::{HttpTransactionClient, TransactionClient};
pub use xml::{TransactionOutcome, TransactionRequest, decode, encode};
