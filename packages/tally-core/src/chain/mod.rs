//! # Chain Client
//!
//! The external store abstraction. The chain owns the only durable copy of
//! list/item data; this module defines the three capabilities the session
//! needs from it and the wire types they exchange:
//!
//! - **execute**: run a signed contract call, returning a digest plus any
//!   created object ids
//! - **get_object**: read the current field values of one object
//! - **owned_objects**: list the objects of a given type owned by an address
//!
//! Two implementations exist: [`rpc::RpcChainClient`] speaks JSON-RPC over
//! HTTP to a real endpoint, and [`memory::MemoryChain`] runs the contract
//! semantics in-process for local mode and tests.

pub mod memory;
pub mod rpc;

use async_trait::async_trait;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Address, ObjectId, TxDigest};
use crate::wallet::derive_address;

// ── Call Envelope ─────────────────────────────────────────────────────────────

/// One argument to a contract call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallArg {
    /// Reference to an object held by the chain.
    Object {
        /// Id of the referenced object.
        id: ObjectId,
    },
    /// A UTF-8 string value.
    Text {
        /// The string value.
        value: String,
    },
    /// A zero-based position.
    Index {
        /// The position value.
        value: u64,
    },
}

/// A call addressed to an entry function of a published contract module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCall {
    /// Address of the published package.
    pub package: Address,
    /// Module name within the package.
    pub module: String,
    /// Entry function name.
    pub function: String,
    /// Positional arguments.
    pub args: Vec<CallArg>,
}

/// A [`MoveCall`] plus the sender's identity proof. This is the unit the
/// chain executes; everything in it is covered by the signature except the
/// signature itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedCall {
    /// The call being executed.
    pub call: MoveCall,
    /// Claimed sender address; must match the attached public key.
    pub sender: Address,
    /// Hex-encoded Ed25519 public key of the sender.
    pub public_key: String,
    /// Hex-encoded Ed25519 signature over the canonical call bytes.
    pub signature: String,
}

/// Canonical byte form of a call for signing: its JSON encoding.
/// Field order is fixed by the struct definitions, so both sides produce
/// identical bytes for identical calls.
pub fn signing_bytes(call: &MoveCall) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(call)?)
}

impl SignedCall {
    /// Check the signature and that the claimed sender address matches the
    /// attached public key.
    pub fn verify(&self) -> Result<()> {
        let key_bytes: [u8; 32] = hex::decode(&self.public_key)
            .map_err(|_| Error::SignatureInvalid)?
            .try_into()
            .map_err(|_| Error::SignatureInvalid)?;
        let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| Error::SignatureInvalid)?;

        if derive_address(&key) != self.sender {
            return Err(Error::SignatureInvalid);
        }

        let sig_bytes = hex::decode(&self.signature).map_err(|_| Error::SignatureInvalid)?;
        let signature = Signature::from_slice(&sig_bytes).map_err(|_| Error::SignatureInvalid)?;

        let bytes = signing_bytes(&self.call)?;
        key.verify(&bytes, &signature)
            .map_err(|_| Error::SignatureInvalid)
    }
}

// ── Read Model ────────────────────────────────────────────────────────────────

/// Current state of one chain object: its id, concrete type tag, and field
/// values as the chain reports them. Decoding the fields into a contract
/// read model happens in [`crate::contract`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// The object's id.
    pub id: ObjectId,
    /// Fully qualified type of the object, e.g. `0x2::todo_list::TodoList`.
    pub type_tag: String,
    /// Field values as reported by the chain.
    pub fields: serde_json::Value,
}

/// What an executed transaction reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteEffects {
    /// Digest of the executed transaction.
    pub digest: TxDigest,
    /// Objects the call created, in creation order.
    #[serde(default)]
    pub created: Vec<ObjectId>,
}

// ── Client Trait ──────────────────────────────────────────────────────────────

/// The three capabilities the session requires from the external store.
///
/// No retries, timeouts, or cancellation: a call resolves or rejects, and
/// rejection is terminal for that attempt.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Execute a signed contract call.
    async fn execute(&self, call: &SignedCall) -> Result<ExecuteEffects>;

    /// Read the current state of one object.
    async fn get_object(&self, id: &ObjectId) -> Result<ObjectRecord>;

    /// List objects of `type_tag` owned by `owner`, in creation order.
    async fn owned_objects(&self, owner: &Address, type_tag: &str) -> Result<Vec<ObjectRecord>>;
}
