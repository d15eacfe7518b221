//! Configuration and startup errors shared across crates

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_includes_reason() {
        let err = Error::Config("provider \"myspace\" is not supported".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: provider \"myspace\" is not supported"
        );
    }

    #[test]
    fn io_error_converts_via_question_mark() {
        fn read() -> Result<String> {
            Ok(std::fs::read_to_string("/nonexistent/auth-demo.toml")?)
        }
        let err = read().unwrap_err();
        assert!(err.to_string().starts_with("I/O error:"), "got: {err}");
        assert!(format!("{err:?}").contains("Io"));
    }

    #[test]
    fn toml_error_converts() {
        let parsed: std::result::Result<toml::Table, _> = toml::from_str("not = = toml");
        let err: Error = parsed.unwrap_err().into();
        assert!(err.to_string().starts_with("TOML parse error:"), "got: {err}");
    }
}
