//! # Tally Core
//!
//! Client library for a minimal multi-list todo application whose data
//! lives as objects on a Move-style chain. The chain is the only source of
//! truth; this crate holds a possibly-stale local view and the logic that
//! keeps it eventually consistent through signed writes and re-reads.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          TALLY CORE                                 │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │   ┌────────────────┐     signed writes      ┌───────────────────┐  │
//! │   │  TodoSession   │ ─────────────────────► │    ChainClient    │  │
//! │   │                │                        │                   │  │
//! │   │ - list view    │ ◄───────────────────── │ - execute         │  │
//! │   │ - selection    │    object queries      │ - get_object      │  │
//! │   │ - item snapshot│                        │ - owned_objects   │  │
//! │   └───────┬────────┘                        └─────────┬─────────┘  │
//! │           │                                           │            │
//! │   ┌───────┴────────┐                        ┌─────────┴─────────┐  │
//! │   │     Wallet     │                        │  RpcChainClient   │  │
//! │   │                │                        │  (HTTP JSON-RPC)  │  │
//! │   │ - Ed25519 keys │                        ├───────────────────┤  │
//! │   │ - address      │                        │   MemoryChain     │  │
//! │   │ - sign_call    │                        │   (in-process)    │  │
//! │   └────────────────┘                        └───────────────────┘  │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`model`] - Identifier newtypes and the local list view
//! - [`wallet`] - Ed25519 signing identity and key-file persistence
//! - [`chain`] - Chain client trait, wire types, and both transports
//! - [`contract`] - The todo contract's call builders and read model
//! - [`session`] - View state holder and action dispatcher
//!
//! ## Consistency Model
//!
//! Every successful mutation is followed by a re-read of the affected
//! collection from the chain; nothing is patched speculatively. A failed
//! write leaves local state at its last known-good value and is never
//! retried automatically. See [`session`] for the details.

#![warn(missing_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod chain;
pub mod contract;
pub mod error;
pub mod model;
pub mod session;
pub mod wallet;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use chain::{memory::MemoryChain, rpc::RpcChainClient, ChainClient};
pub use error::{Error, Result};
pub use model::{Address, ListSummary, ObjectId, TxDigest};
pub use session::{SessionConfig, TodoSession, View};
pub use wallet::Wallet;

/// Returns the version of Tally Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
