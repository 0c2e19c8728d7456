//! Translation from the TOML config plus global flags into a live
//! `raasta_core::Controller`.
//!
//! Core never sees the file-level `Config`; it receives a pre-built
//! `ClientConfig` and a settings store.

use std::sync::Arc;

use clap::ValueEnum;

use raasta_config::{Config, FileSettings};
use raasta_core::{ClientConfig, Controller};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

fn parse_setting<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|_| {
        let allowed: Vec<String> = T::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value().map(|p| p.get_name().to_owned()))
            .collect();
        CliError::Validation {
            field: field.into(),
            reason: format!("'{value}' is not one of: {}", allowed.join(", ")),
        }
    })
}

/// Fill `--output` / `--color` from the config file when not given.
pub fn apply_display_defaults(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        global.output = Some(parse_setting::<OutputFormat>("output", &cfg.output)?);
    }
    if global.color.is_none() {
        global.color = Some(parse_setting::<ColorMode>("color", &cfg.color)?);
    }
    Ok(())
}

/// Merge flag overrides (flag > env > file > default) into a `ClientConfig`.
pub fn resolve_client_config(cfg: &Config, global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let mut cfg = cfg.clone();
    if let Some(ref server) = global.server {
        cfg.server_url.clone_from(server);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }

    let mut client = cfg.to_client_config()?;
    client.admin_override = global.admin;
    Ok(client)
}

/// Open the settings store named by `cfg` and assemble the controller.
pub fn build_controller(cfg: &Config, global: &GlobalOpts) -> Result<Controller, CliError> {
    let client_config = resolve_client_config(cfg, global)?;

    let settings = FileSettings::open(cfg.settings_path());
    tracing::debug!(
        server = %client_config.url,
        settings = %cfg.settings_path().display(),
        "building controller"
    );
    Ok(Controller::new(client_config, Arc::new(settings))?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["raasta"];
        argv.extend_from_slice(args);
        argv.push("usage");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_file_values() {
        let cfg = Config {
            server_url: "https://file.example.pk".into(),
            timeout: 10,
            ..Config::default()
        };
        let opts = global(&["--server", "http://localhost:8787", "--timeout", "5"]);

        let client = resolve_client_config(&cfg, &opts).unwrap();
        assert_eq!(client.url.as_str(), "http://localhost:8787/");
        assert_eq!(client.timeout.as_secs(), 5);
        assert!(!client.admin_override);
    }

    #[test]
    fn file_values_used_without_flags() {
        let cfg = Config {
            server_url: "https://file.example.pk".into(),
            lang: "ur".into(),
            ..Config::default()
        };
        let client = resolve_client_config(&cfg, &global(&[])).unwrap();
        assert_eq!(client.url.host_str(), Some("file.example.pk"));
        assert_eq!(client.lang, "ur");
    }

    #[test]
    fn display_settings_fill_missing_flags() {
        let cfg = Config {
            output: "json".into(),
            color: "Never".into(),
            ..Config::default()
        };

        let mut opts = global(&[]);
        apply_display_defaults(&mut opts, &cfg).unwrap();
        assert!(matches!(opts.output_format(), OutputFormat::Json));
        assert!(matches!(opts.color_mode(), ColorMode::Never));

        let mut opts = global(&["-o", "plain"]);
        apply_display_defaults(&mut opts, &cfg).unwrap();
        assert!(matches!(opts.output_format(), OutputFormat::Plain));
    }

    #[test]
    fn unknown_output_setting_is_validation_error() {
        let cfg = Config {
            output: "xml".into(),
            ..Config::default()
        };
        // Not consulted when the flag is present.
        assert!(apply_display_defaults(&mut global(&["-o", "table"]), &cfg).is_ok());

        let err = apply_display_defaults(&mut global(&[]), &cfg).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "output"));
    }

    #[test]
    fn bad_server_flag_is_validation_error() {
        let err = resolve_client_config(&Config::default(), &global(&["--server", "ftp://x"]))
            .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
