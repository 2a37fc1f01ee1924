//! WFS-T Editor (headless).
//!
//! Spielt eine aufgezeichnete Edit-Sitzung (JSON-Liste von Intents) gegen die
//! konfigurierten WFS-T-Dienste ab.
//!
//! Aufruf: `wfst-editor <session.json> [options.toml]`

use anyhow::Context;
use std::path::{Path, PathBuf};
use wfst_editor::app::{EditIntent, EditOutcome, InsertOutcome, intent_channel};
use wfst_editor::{EditorOptions, HttpTransactionClient, InteractionController};

fn main() -> anyhow::Result<()> {
    AppRunner::run()
}

struct AppRunner;

impl AppRunner {
    fn run() -> anyhow::Result<()> {
        // Logger initialisieren
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();

        log::info!("WFS-T Editor v{} startet...", env!("CARGO_PKG_VERSION"));

        let mut args = std::env::args().skip(1);
        let session_path = args
            .next()
            .map(PathBuf::from)
            .context("Aufruf: wfst-editor <session.json> [options.toml]")?;
        let options_path = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(EditorOptions::config_path);

        let options = EditorOptions::load_from_file(&options_path);
        let intents = read_session(&session_path)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Tokio-Runtime konnte nicht gestartet werden")?;
        runtime.block_on(replay(options, intents))
    }
}

fn read_session(path: &Path) -> anyhow::Result<Vec<EditIntent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Sitzung konnte nicht gelesen werden: {}", path.display()))?;
    let intents: Vec<EditIntent> = serde_json::from_str(&content)
        .with_context(|| format!("Sitzung ist kein gültiges Intent-JSON: {}", path.display()))?;
    log::info!("{} Intents aus {} gelesen", intents.len(), path.display());
    Ok(intents)
}

async fn replay(options: EditorOptions, intents: Vec<EditIntent>) -> anyhow::Result<()> {
    let client = HttpTransactionClient::new(options.request_timeout())?;
    let mut controller = InteractionController::with_options(client, &options);

    let (sender, mut queue) = intent_channel();
    for intent in intents {
        sender.publish(intent);
    }

    let mut failures = 0usize;
    for (index, result) in controller.process_pending(&mut queue).await.into_iter().enumerate() {
        match result {
            Ok(outcomes) => {
                for outcome in outcomes {
                    if let EditOutcome::Inserted(InsertOutcome::ReloadRequested { layer_id }) =
                        &outcome
                    {
                        log::warn!("Layer '{}' muss neu geladen werden", layer_id);
                    }
                    println!("#{index}: {outcome:?}");
                }
            }
            Err(err) => {
                failures += 1;
                log::error!("Intent #{} fehlgeschlagen: {}", index, err);
                println!("#{index}: Fehler: {err}");
            }
        }
    }

    let dirty: Vec<String> = controller
        .dirty()
        .dirty_features()
        .map(|(layer_id, id)| format!("{layer_id}/{id}"))
        .collect();
    if !dirty.is_empty() {
        log::warn!("Ungespeicherte Änderungen: {}", dirty.join(", "));
    }
    log::info!(
        "Sitzung beendet: {} Transaktionen, {} Fehler",
        controller.transaction_log().len(),
        failures
    );
    Ok(())
}
