//! Metascope personalization demo
//!
//! Replays usage events against the engine and prints what the interface
//! would look like afterwards.
//!
//! ```text
//! metascope single_upload exif_viewer exif_viewer csv_export
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use metascope::adapters::{KeyValueCounterStore, TracingAnalyticsSink};
use metascope::application::{EnginePorts, PersonalizationEngine};
use metascope::config::{ConfigError, EngineConfig};

#[tokio::main]
async fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("metascope: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ConfigError> {
    let config = EngineConfig::load()?;
    config.validate()?;
    config.logging.init()?;

    let catalogs = config.catalog.load_catalogs()?;
    let storage = config.storage.build_store();
    let ports = EnginePorts {
        counters: Arc::new(KeyValueCounterStore::new(storage.clone())),
        analytics: Arc::new(TracingAnalyticsSink::new()),
        storage,
    };

    let engine = PersonalizationEngine::new(ports, catalogs, config.personalization.engine_settings());
    engine.start_session();

    for key in std::env::args().skip(1) {
        if let Err(e) = engine.mark_feature_used(&key) {
            tracing::warn!(feature = %key, error = %e, "Skipping usage event");
        }
    }

    let context = engine.context();
    let tier = engine.resolve_tier(None);
    let navigation = engine.compose_navigation(None);
    let summary = serde_json::json!({
        "context": context,
        "tier": tier,
        "navigation": {
            "primary": navigation.primary_ids(),
            "secondary": navigation.secondary_ids(),
            "prominent": navigation.prominent_ids(),
        },
        "activeHints": engine.active_hints(),
        "notifications": engine.notifications(),
    });

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to render summary"),
    }

    engine.teardown();
    Ok(())
}
