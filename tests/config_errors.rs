use std::io::Write;
use std::path::Path;
use std::time::Duration;

use interactive_feedback::config::{load_and_validate, load_or_default};
use interactive_feedback::errors::FeedbackError;
use tempfile::NamedTempFile;

fn settings_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_settings_file_is_loaded() {
    let file = settings_file(
        r#"
[executor]
output_capacity = 32
drain_grace_ms = 50

[feedback]
history_limit = 4
gui_script = "/opt/feedback/desktop_gui_single.py"
python = "python3.12"
command_wait_ms = 1500
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let options = cfg.executor.options();
    assert_eq!(options.output_capacity, 32);
    assert_eq!(options.drain_grace, Duration::from_millis(50));
    assert_eq!(cfg.feedback.history_limit, 4);
    assert_eq!(
        cfg.feedback.gui_script.as_deref(),
        Some(Path::new("/opt/feedback/desktop_gui_single.py"))
    );
    assert_eq!(cfg.feedback.python, "python3.12");
    assert_eq!(cfg.feedback.command_wait(), Duration::from_millis(1500));
}

#[test]
fn empty_file_and_no_file_give_defaults() {
    let file = settings_file("");
    let from_file = load_and_validate(file.path()).unwrap();
    let builtin = load_or_default(None).unwrap();

    assert_eq!(from_file.executor.output_capacity, 100);
    assert_eq!(builtin.executor.output_capacity, 100);
    assert_eq!(builtin.feedback.history_limit, 10);
    assert_eq!(builtin.feedback.python, "python3");
    assert!(builtin.feedback.gui_script.is_none());
}

#[test]
fn zero_capacity_is_a_config_error() {
    let file = settings_file("[executor]\noutput_capacity = 0\n");
    match load_and_validate(file.path()) {
        Err(FeedbackError::ConfigError(msg)) => assert!(msg.contains("output_capacity")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn zero_history_limit_is_a_config_error() {
    let file = settings_file("[feedback]\nhistory_limit = 0\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(FeedbackError::ConfigError(_))
    ));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = settings_file("[executor\noutput_capacity = ");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(FeedbackError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_or_default(Some(Path::new("/definitely/not/settings.toml"))),
        Err(FeedbackError::IoError(_))
    ));
}
