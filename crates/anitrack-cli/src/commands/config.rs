//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use anitrack_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str =
    "data_dir, catalog_url, catalog_ttl_secs, request_timeout_secs, user, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "catalog_url": config.catalog_url,
                    "catalog_ttl_secs": config.catalog_ttl_secs,
                    "request_timeout_secs": config.request_timeout_secs,
                    "user": config.user,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  catalog_url:          {}", config.catalog_url);
            println!("  catalog_ttl_secs:     {}", config.catalog_ttl_secs);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!(
                "  user:                 {}",
                config.user.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  log_file:             {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Validate and assign one key
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            if value.is_empty() {
                bail!("data_dir cannot be empty");
            }
            config.data_dir = value.into();
        }
        "catalog_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                bail!("catalog_url must start with http:// or https://");
            }
            config.catalog_url = value.to_string();
        }
        "catalog_ttl_secs" => {
            config.catalog_ttl_secs = value
                .parse()
                .context("Invalid value for catalog_ttl_secs. Use a number of seconds.")?;
        }
        "request_timeout_secs" => {
            let secs: u64 = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a number of seconds.")?;
            if secs == 0 {
                bail!("request_timeout_secs must be at least 1");
            }
            config.request_timeout_secs = secs;
        }
        "user" => {
            config.user = if value.is_empty() || value == "none" {
                None
            } else if value.contains('/') {
                bail!("user must not contain '/'");
            } else {
                Some(value.to_string())
            };
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_numeric_settings() {
        let mut config = Config::default();

        apply_setting(&mut config, "catalog_ttl_secs", "60").unwrap();
        apply_setting(&mut config, "request_timeout_secs", "5").unwrap();

        assert_eq!(config.catalog_ttl_secs, 60);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_reject_invalid_values() {
        let mut config = Config::default();

        assert!(apply_setting(&mut config, "catalog_ttl_secs", "soon").is_err());
        assert!(apply_setting(&mut config, "request_timeout_secs", "0").is_err());
        assert!(apply_setting(&mut config, "catalog_url", "ftp://x").is_err());
        assert!(apply_setting(&mut config, "user", "a/b").is_err());
    }

    #[test]
    fn test_unset_user() {
        let mut config = Config::default();

        apply_setting(&mut config, "user", "alice").unwrap();
        assert_eq!(config.user.as_deref(), Some("alice"));

        apply_setting(&mut config, "user", "none").unwrap();
        assert!(config.user.is_none());
    }

    #[test]
    fn test_unknown_key() {
        let mut config = Config::default();
        let err = apply_setting(&mut config, "sync_url", "x").unwrap_err();
        assert!(err.to_string().contains("Valid keys"));
    }

    #[test]
    fn test_set_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");
        std::fs::write(&path, format!("data_dir = {:?}\n", data_dir)).unwrap();

        let output = Output::new(OutputFormat::Quiet);
        set(
            "catalog_ttl_secs".to_string(),
            "42".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("catalog_ttl_secs = 42"));
    }
}
