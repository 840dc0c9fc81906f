use env_logger::{Builder, Target, WriteStyle};
use log::{info, warn, LevelFilter};
use std::fs::OpenOptions;
use std::path::Path;

/// Initialize logging to stderr, or to an append-only file when one is given.
/// `RUST_LOG` overrides the default `info` level.
pub fn initialize_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .format_module_path(true)
        .write_style(WriteStyle::Auto);

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;
    info!("Logging system initialized");
    Ok(())
}

/// Mask a token or identifier for logging, keeping two characters each end
pub fn mask_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Structured single-line event for token issuance and redemption
pub fn log_reset_event(event_type: &str, subject: &str, success: bool, details: Option<&str>) {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Reset event: type={}, subject={}, success=true, timestamp={}, details={:?}",
            event_type,
            mask_sensitive(subject),
            timestamp,
            details
        );
    } else {
        warn!(
            "Reset event: type={}, subject={}, success=false, timestamp={}, details={:?}",
            event_type,
            mask_sensitive(subject),
            timestamp,
            details
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sensitive_data_masking() {
        assert_eq!(mask_sensitive("password"), "pa***rd");
        assert_eq!(mask_sensitive("key"), "***");
        assert_eq!(mask_sensitive("Xk3q9LmPa2"), "Xk***a2");
        assert_eq!(mask_sensitive("héllo"), "hé***lo");
        assert_eq!(mask_sensitive(""), "");
    }

    #[test]
    fn test_logging_initialization() {
        let log_file = NamedTempFile::new().unwrap();

        // Another test may already have installed a logger
        let result = initialize_logging(Some(log_file.path()));
        assert!(
            result.is_ok()
                || result
                    .unwrap_err()
                    .to_string()
                    .contains("logger")
        );

        log_reset_event("password_reset", "user-123456", true, None);
    }
}
