use std::fs;
use std::path::PathBuf;

use charforge::config::AppConfig;
use charforge::core::character_gen::{Catalog, CharacterWizard, WizardAction};
use charforge::core::storage::{InMemoryCharacterStore, JsonFileDraftStore};

const USAGE: &str = "usage: charforge <actions.json> [catalog.json]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load();
    let _log_guard = charforge::core::logging::init(&config.logging, &config.data_dir());
    log::info!("charforge v{} starting", charforge::VERSION);

    let mut args = std::env::args().skip(1);
    let Some(actions_path) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let catalog = match args.next().map(PathBuf::from).or_else(|| config.data.catalog_path.clone()) {
        Some(path) => Catalog::load(&path)?,
        None => Catalog::builtin(),
    };
    if let Err(e) = catalog.validate() {
        tracing::warn!(error = %e, "Catalog failed validation");
    }

    let actions: Vec<WizardAction> = serde_json::from_str(&fs::read_to_string(&actions_path)?)?;
    tracing::debug!(count = actions.len(), path = %actions_path, "Loaded action script");

    let mut wizard = CharacterWizard::new(catalog, config.rules.clone(), InMemoryCharacterStore::new());
    wizard.dispatch_all(&actions);

    match wizard.finalize() {
        Ok(id) => {
            if let Some(stored) = wizard.store().get(&id) {
                println!("{}", serde_json::to_string_pretty(stored)?);
            }
            Ok(())
        }
        Err(e) => {
            // Keep the partial build so it can be resumed later
            let drafts = JsonFileDraftStore::new(config.drafts_dir(), config.rules.clone());
            wizard.save_draft(&drafts)?;
            eprintln!("Error: {e}");
            eprintln!(
                "Draft {} saved to {}",
                wizard.state().id,
                drafts.dir().display()
            );
            println!("{}", serde_json::to_string_pretty(&wizard.view())?);
            std::process::exit(1);
        }
    }
}
