//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&settings)?;
            println!("{}", content);
        }
        ConfigAction::Init => {
            let path = Settings::default_config_path();
            if path.exists() {
                Output::warning(&format!("Config already exists at {}", path.display()));
                Output::info("Edit it directly, or delete it and rerun 'daun config init'.");
            } else {
                settings.save_to(&path)?;
                Output::success(&format!("Wrote config to {}", path.display()));
            }
        }

        ConfigAction::Path => {
            let path = Settings::default_config_path();
            println!("{}", path.display());
            if !path.exists() {
                Output::info("File does not exist yet; defaults are in effect.");
            }
        }
    }
    Ok(())
}
