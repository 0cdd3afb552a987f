//! # Error Handling
//!
//! Error types for Tally Core, categorized by where they arise:
//!
//! | Range   | Category                                             |
//! |---------|------------------------------------------------------|
//! | 100-199 | Session lifecycle (wallet, in-flight gate)           |
//! | 200-299 | Validation (caught before any external call)         |
//! | 300-399 | External call (transport, RPC, contract rejection)   |
//! | 400-499 | Decode (object shape does not match the contract)    |
//! | 500-599 | Local I/O (wallet key file)                          |
//!
//! Every session operation catches its failure at the operation boundary:
//! an error is returned to the caller, local view state stays at its last
//! known-good value, and nothing is retried automatically.

use thiserror::Error;

/// Result type alias for Tally Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Tally Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Session Lifecycle Errors (100-199)
    // ========================================================================

    /// No wallet is connected
    #[error("No wallet connected. Connect a wallet before writing to the chain.")]
    NotConnected,

    /// Another operation is already in flight
    #[error("Another action is still in flight. Wait for it to finish.")]
    Busy,

    // ========================================================================
    // Validation Errors (200-299)
    // ========================================================================

    /// List name was empty or whitespace
    #[error("List name cannot be empty.")]
    EmptyName,

    /// Item text was empty or whitespace
    #[error("Item text cannot be empty.")]
    EmptyText,

    /// No list is currently selected
    #[error("No list is selected.")]
    NoSelection,

    /// The given list id is not in the local collection
    #[error("Unknown list: {0}")]
    ListNotFound(String),

    /// Item index is outside the current snapshot
    #[error("Item index {index} is out of range (list has {len} items).")]
    IndexOutOfRange {
        /// The rejected zero-based position.
        index: usize,
        /// Length of the item snapshot at the time of the call.
        len: usize,
    },

    /// Malformed address string
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed object id string
    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    // ========================================================================
    // External Call Errors (300-399)
    // ========================================================================

    /// Transport-level failure reaching the chain endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// The RPC endpoint answered with an error payload
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Numeric code from the error payload.
        code: i64,
        /// Message from the error payload.
        message: String,
    },

    /// The chain accepted the request but the call failed
    #[error("Call rejected by the chain: {0}")]
    CallRejected(String),

    /// A signed call's signature did not check out
    #[error("Signature verification failed.")]
    SignatureInvalid,

    // ========================================================================
    // Decode Errors (400-499)
    // ========================================================================

    /// Returned object's type tag does not match the expected contract type
    #[error("Object type mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// The type tag the session queried for.
        expected: String,
        /// The type tag the chain returned.
        actual: String,
    },

    /// A field the contract read model promises was absent
    #[error("Missing field in object response: {0}")]
    MissingField(String),

    /// Serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ========================================================================
    // Local I/O Errors (500-599)
    // ========================================================================

    /// Wallet key file could not be read or written
    #[error("Key file error: {0}")]
    KeyFile(String),
}

impl Error {
    /// Get the numeric error code for this error
    pub fn code(&self) -> i32 {
        match self {
            // Session lifecycle (100-199)
            Error::NotConnected => 100,
            Error::Busy => 101,

            // Validation (200-299)
            Error::EmptyName => 200,
            Error::EmptyText => 201,
            Error::NoSelection => 202,
            Error::ListNotFound(_) => 203,
            Error::IndexOutOfRange { .. } => 204,
            Error::InvalidAddress(_) => 205,
            Error::InvalidObjectId(_) => 206,

            // External call (300-399)
            Error::Transport(_) => 300,
            Error::Rpc { .. } => 301,
            Error::CallRejected(_) => 302,
            Error::SignatureInvalid => 303,

            // Decode (400-499)
            Error::ShapeMismatch { .. } => 400,
            Error::MissingField(_) => 401,
            Error::Serialization(_) => 402,

            // Local I/O (500-599)
            Error::KeyFile(_) => 500,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors can potentially be resolved by retrying the same
    /// action. Validation and decode errors are not: the same input will
    /// fail the same way.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Busy)
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NotConnected.code(), 100);
        assert_eq!(Error::EmptyName.code(), 200);
        assert_eq!(Error::Transport("test".into()).code(), 300);
        assert_eq!(
            Error::ShapeMismatch {
                expected: "a".into(),
                actual: "b".into()
            }
            .code(),
            400
        );
        assert_eq!(Error::KeyFile("test".into()).code(), 500);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::Transport("connection refused".into()).is_recoverable());
        assert!(Error::Busy.is_recoverable());
        assert!(!Error::EmptyName.is_recoverable());
        assert!(!Error::CallRejected("no such object".into()).is_recoverable());
        assert!(!Error::SignatureInvalid.is_recoverable());
    }

    #[test]
    fn test_messages_are_user_facing() {
        // Session surfaces these verbatim in the status line.
        let err = Error::IndexOutOfRange { index: 5, len: 3 };
        assert!(err.to_string().contains('5'));
        assert!(err.to_string().contains('3'));
        assert!(!Error::NotConnected.to_string().is_empty());
    }
}
