//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings.redacted())
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!(
                    "Config already exists at {}. Use --force to overwrite.",
                    config_path.display()
                ));
                return Ok(());
            }
            // Keys stay in the environment, never in the file.
            let mut defaults = Settings::default();
            defaults.model.api_key = None;
            defaults.weather.api_key = None;
            defaults.save_to(&config_path)?;
            Output::success(&format!("Wrote default config to {}", config_path.display()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("breeze").join("config.toml");

        run_config(&ConfigAction::Init { force: false }, Settings::default(), Some(path.clone()))
            .unwrap();
        assert!(path.exists());

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.model.name, Settings::default().model.name);
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nname = \"gpt-4o\"\n").unwrap();

        run_config(&ConfigAction::Init { force: false }, Settings::default(), Some(path.clone()))
            .unwrap();
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.model.name, "gpt-4o");
    }
}
