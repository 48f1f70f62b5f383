//! `a11ylens config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use a11ylens_core::config::A11yLensConfig;
use a11ylens_core::error::A11yError;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const SECTIONS: &[&str] = &["general", "store", "code", "browser", "context"];

/// Execute the `config` command.
///
/// `loaded` is the result of loading `config_path`; validation reports a
/// failure instead of propagating it.
pub fn execute(
    args: ConfigArgs,
    config_path: &Path,
    loaded: Result<A11yLensConfig, A11yError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, loaded, writer),
        ConfigAction::Show { section } => {
            let config = loaded?;
            let report = show_report(config_path, &config, section.as_deref())?;
            writer.render(&report)
        }
    }
}

fn execute_validate(
    config_path: &Path,
    loaded: Result<A11yLensConfig, A11yError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = ConfigValidationReport {
        source: config_path.display().to_string(),
        valid: loaded.is_ok(),
        errors: loaded.err().map(|e| e.to_string()).into_iter().collect(),
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

fn show_report(
    config_path: &Path,
    config: &A11yLensConfig,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let value = match section {
        None => serde_json::to_value(config)?,
        Some("general") => serde_json::to_value(&config.general)?,
        Some("store") => serde_json::to_value(&config.store)?,
        Some("code") => serde_json::to_value(&config.code)?,
        Some("browser") => serde_json::to_value(&config.browser)?,
        Some("context") => serde_json::to_value(&config.context)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: {})",
                SECTIONS.join(", ")
            )));
        }
    };

    let config_toml = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("store") => toml::to_string_pretty(&config.store),
        Some("code") => toml::to_string_pretty(&config.code),
        Some("browser") => toml::to_string_pretty(&config.browser),
        _ => toml::to_string_pretty(&config.context),
    }
    .unwrap_or_else(|e| format!("(serialization error: {e})\n"));

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section: section.map(str::to_owned),
        config: value,
        config_toml,
    })
}

/// Effective configuration display.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub config: serde_json::Value,
    /// Text rendering only.
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{section}]").bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)
    }
}

/// Configuration validation result.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11ylens_core::error::ConfigError;

    fn render(payload: &impl Render) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        payload.render_text(&mut buffer).expect("render succeeded");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn show_full_config_contains_every_section() {
        let report = show_report(
            Path::new("a11ylens.toml"),
            &A11yLensConfig::default(),
            None,
        )
        .unwrap();

        for section in SECTIONS {
            assert!(report.config.get(section).is_some(), "{section}");
            assert!(report.config_toml.contains(&format!("[{section}]")), "{section}");
        }
    }

    #[test]
    fn show_single_section() {
        let report = show_report(
            Path::new("a11ylens.toml"),
            &A11yLensConfig::default(),
            Some("store"),
        )
        .unwrap();

        assert_eq!(report.config["ttl_secs"], 3600);
        assert!(report.config_toml.contains("ttl_secs = 3600"));
        let text = render(&report);
        assert!(text.contains("Configuration [store] (source: a11ylens.toml)"));
    }

    #[test]
    fn unknown_section_is_command_error() {
        let err = show_report(
            Path::new("a11ylens.toml"),
            &A11yLensConfig::default(),
            Some("ebpf"),
        )
        .err()
        .unwrap();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("expected: general, store, code, browser, context"));
    }

    #[test]
    fn validation_report_lists_error() {
        let loaded: Result<A11yLensConfig, A11yError> = Err(ConfigError::InvalidValue {
            field: "store.ttl_secs".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into());
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: loaded.is_ok(),
            errors: loaded.err().map(|e| e.to_string()).into_iter().collect(),
        };

        let text = render(&report);
        assert!(text.contains("INVALID"));
        assert!(text.contains("store.ttl_secs"));
    }
}
