// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::PwdmanConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &PwdmanConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(path) = &config.store.path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "store.path must not be empty when set".to_string(),
        });
    }

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of: {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.shell.prompt.is_empty() {
        errors.push(ConfigError::Validation {
            message: "shell.prompt must not be empty".to_string(),
        });
    }

    if config.shell.history_size == 0 {
        errors.push(ConfigError::Validation {
            message: "shell.history_size must be at least 1".to_string(),
        });
    }

    if let Some(command) = &config.clipboard.command
        && command.first().is_none_or(|program| program.trim().is_empty())
    {
        errors.push(ConfigError::Validation {
            message: "clipboard.command must name a program".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&PwdmanConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = PwdmanConfig::default();
        config.log.level = "loud".into();
        config.shell.prompt.clear();
        config.shell.history_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn empty_clipboard_command_rejected() {
        let mut config = PwdmanConfig::default();
        config.clipboard.command = Some(vec![]);
        assert!(validate_config(&config).is_err());

        config.clipboard.command = Some(vec!["xclip".into()]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn parsed_config_is_validated() {
        let toml_str = r#"
            [log]
            level = "chatty"

            [clipboard]
            command = ["", "--input"]
        "#;
        let config: PwdmanConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn parsed_overrides_pass_validation() {
        let toml_str = r#"
            [shell]
            prompt = "vault> "
            history_size = 50
        "#;
        let config: PwdmanConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn blank_store_path_rejected() {
        let mut config = PwdmanConfig::default();
        config.store.path = Some("  ".into());
        assert!(validate_config(&config).is_err());
    }
}
