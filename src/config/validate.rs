// src/config/validate.rs

use crate::config::model::{RawServerConfig, ServerConfig};
use crate::errors::{FeedbackError, Result};

impl TryFrom<RawServerConfig> for ServerConfig {
    type Error = FeedbackError;

    fn try_from(raw: RawServerConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ServerConfig::new_unchecked(raw.executor, raw.feedback))
    }
}

fn validate_raw_config(cfg: &RawServerConfig) -> Result<()> {
    validate_executor(cfg)?;
    validate_feedback(cfg)?;
    Ok(())
}

fn validate_executor(cfg: &RawServerConfig) -> Result<()> {
    if cfg.executor.output_capacity == 0 {
        return Err(FeedbackError::ConfigError(
            "[executor].output_capacity must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_feedback(cfg: &RawServerConfig) -> Result<()> {
    if cfg.feedback.history_limit == 0 {
        return Err(FeedbackError::ConfigError(
            "[feedback].history_limit must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.feedback.python.trim().is_empty() {
        return Err(FeedbackError::ConfigError(
            "[feedback].python must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ServerConfig> {
        let raw: RawServerConfig = toml::from_str(toml_src)?;
        ServerConfig::try_from(raw)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.executor.output_capacity, 100);
        assert_eq!(cfg.executor.drain_grace_ms, 250);
        assert_eq!(cfg.feedback.history_limit, 10);
        assert_eq!(cfg.feedback.python, "python3");
        assert!(cfg.feedback.gui_script.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = parse(
            r#"
[executor]
output_capacity = 8

[feedback]
history_limit = 4
gui_script = "/opt/gui.py"
"#,
        )
        .unwrap();
        assert_eq!(cfg.executor.options().output_capacity, 8);
        assert_eq!(cfg.feedback.history_limit, 4);
        assert_eq!(cfg.feedback.gui_script.as_deref(), Some(std::path::Path::new("/opt/gui.py")));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        match parse("[executor]\noutput_capacity = 0\n") {
            Err(FeedbackError::ConfigError(msg)) => assert!(msg.contains("output_capacity")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn zero_history_is_rejected() {
        match parse("[feedback]\nhistory_limit = 0\n") {
            Err(FeedbackError::ConfigError(msg)) => assert!(msg.contains("history_limit")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
