//! Error types for the comparison library.

use thiserror::Error;

/// Main error type for comparison runs.
#[derive(Error, Debug)]
pub enum CompareError {
    /// Configuration error (bad URL, zero-sized scan page, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not open a connection to one of the stores
    #[error("Connection to {side} failed: {message}")]
    Connection { side: String, message: String },

    /// Keyspace iteration failed; the cursor is lost and the run cannot continue
    #[error("Scan failed at cursor {cursor}: {message}")]
    Scan { cursor: u64, message: String },

    /// A store command returned an error
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),

    /// A store command did not answer within the read timeout
    #[error("Store command {command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompareError {
    /// Create a Connection error for one side of the comparison
    pub fn connection(side: impl Into<String>, message: impl Into<String>) -> Self {
        CompareError::Connection {
            side: side.into(),
            message: message.into(),
        }
    }

    /// Create a Scan error
    pub fn scan(cursor: u64, message: impl Into<String>) -> Self {
        CompareError::Scan {
            cursor,
            message: message.into(),
        }
    }

    /// Process exit status for this error.
    ///
    /// A failed page fetch exits with 2, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            CompareError::Scan { .. } => 2,
            _ => 1,
        }
    }

    /// True when a store rejected a read because the key holds another type.
    ///
    /// Servers report this as `WRONGTYPE`. Reply decoding failures share the
    /// driver's type-error kind but are not a type conflict.
    pub fn is_wrong_type(&self) -> bool {
        match self {
            CompareError::Store(e) => {
                e.code() == Some("WRONGTYPE") || e.to_string().contains("WRONGTYPE")
            }
            _ => false,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, CompareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_exit_code() {
        let err = CompareError::scan(42, "connection reset");
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("cursor 42"));
    }

    #[test]
    fn test_other_errors_exit_one() {
        assert_eq!(CompareError::Config("bad".into()).exit_code(), 1);
        assert_eq!(CompareError::connection("source", "refused").exit_code(), 1);
    }

    #[test]
    fn test_format_detailed_includes_message() {
        let err = CompareError::connection("target", "refused");
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: Connection to target failed: refused"));
    }

    #[test]
    fn test_wrong_type_detection() {
        let wrong_type = CompareError::Store(redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "WRONGTYPE Operation against a key holding the wrong kind of value",
        )));
        assert!(wrong_type.is_wrong_type());

        let bad_reply = CompareError::Store(redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "Invalid UTF-8",
        )));
        assert!(!bad_reply.is_wrong_type());

        let timeout = CompareError::Timeout {
            command: "GET".into(),
            secs: 1,
        };
        assert!(!timeout.is_wrong_type());
    }
}
