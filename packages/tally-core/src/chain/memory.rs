//! In-process chain implementation.
//!
//! Runs the todo contract's semantics against a concurrent map instead of a
//! real chain. Backs `--local` mode and the session tests. Signature and
//! ownership rules are enforced the same way a real endpoint would enforce
//! them, so the session cannot tell the difference.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{CallArg, ChainClient, ExecuteEffects, ObjectRecord, SignedCall};
use crate::contract::{self, FN_ADD, FN_DELETE, FN_NEW, FN_REMOVE, TODO_MODULE};
use crate::error::{Error, Result};
use crate::model::{Address, ObjectId, TxDigest};

/// One stored list object.
#[derive(Debug, Clone)]
struct StoredList {
    owner: Address,
    name: String,
    items: Vec<String>,
    /// Creation sequence number, so owned-objects queries return lists in
    /// the order they were created.
    seq: u64,
}

/// An in-memory chain holding one published todo package.
pub struct MemoryChain {
    package: Address,
    objects: DashMap<ObjectId, StoredList>,
    next_seq: AtomicU64,
}

impl MemoryChain {
    /// Create an empty chain with the todo contract published at `package`.
    pub fn new(package: Address) -> Self {
        Self {
            package,
            objects: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// The package address this chain serves.
    pub fn package(&self) -> &Address {
        &self.package
    }

    fn fresh_id() -> ObjectId {
        let digest = Sha256::digest(Uuid::new_v4().as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        ObjectId::from_bytes(&bytes)
    }

    fn fresh_digest() -> TxDigest {
        TxDigest(format!("tx-{}", Uuid::new_v4()))
    }

    fn record_for(&self, id: &ObjectId, list: &StoredList) -> ObjectRecord {
        ObjectRecord {
            id: id.clone(),
            type_tag: contract::list_type_tag(&self.package),
            fields: serde_json::json!({
                "name": list.name,
                "items": list.items,
            }),
        }
    }

    /// Look up a list, checking that `sender` owns it.
    fn owned_list(&self, id: &ObjectId, sender: &Address) -> Result<dashmap::mapref::one::RefMut<'_, ObjectId, StoredList>> {
        let entry = self
            .objects
            .get_mut(id)
            .ok_or_else(|| Error::CallRejected(format!("unknown object: {}", id)))?;
        if &entry.owner != sender {
            return Err(Error::CallRejected(format!(
                "object {} is not owned by {}",
                id, sender
            )));
        }
        Ok(entry)
    }
}

#[async_trait]
impl ChainClient for MemoryChain {
    async fn execute(&self, signed: &SignedCall) -> Result<ExecuteEffects> {
        signed.verify()?;

        let call = &signed.call;
        if call.package != self.package || call.module != TODO_MODULE {
            return Err(Error::CallRejected(format!(
                "no such module: {}::{}",
                call.package, call.module
            )));
        }

        let mut created = Vec::new();
        match (call.function.as_str(), call.args.as_slice()) {
            (FN_NEW, [CallArg::Text { value: name }]) => {
                if name.trim().is_empty() {
                    return Err(Error::CallRejected("list name cannot be empty".into()));
                }
                let id = Self::fresh_id();
                self.objects.insert(
                    id.clone(),
                    StoredList {
                        owner: signed.sender.clone(),
                        name: name.clone(),
                        items: Vec::new(),
                        seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    },
                );
                tracing::info!(list = %id, owner = %signed.sender, "List created");
                created.push(id);
            }
            (FN_DELETE, [CallArg::Object { id }]) => {
                // Ownership check before removal.
                self.owned_list(id, &signed.sender)?;
                self.objects.remove(id);
                tracing::info!(list = %id, "List deleted");
            }
            (FN_ADD, [CallArg::Object { id }, CallArg::Text { value: text }]) => {
                if text.trim().is_empty() {
                    return Err(Error::CallRejected("item text cannot be empty".into()));
                }
                let mut list = self.owned_list(id, &signed.sender)?;
                list.items.push(text.clone());
            }
            (FN_REMOVE, [CallArg::Object { id }, CallArg::Index { value: index }]) => {
                let mut list = self.owned_list(id, &signed.sender)?;
                // Bounds check in u64: narrowing first would let an index
                // past usize::MAX alias a valid position on 32-bit targets.
                if *index >= list.items.len() as u64 {
                    return Err(Error::CallRejected(format!(
                        "index {} out of range for list of {} items",
                        index,
                        list.items.len()
                    )));
                }
                // Vec::remove shifts subsequent positions down by one,
                // matching the contract's positional identity model.
                list.items.remove(*index as usize);
            }
            (function, _) => {
                return Err(Error::CallRejected(format!(
                    "no entry function {}::{} with those arguments",
                    TODO_MODULE, function
                )));
            }
        }

        Ok(ExecuteEffects {
            digest: Self::fresh_digest(),
            created,
        })
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectRecord> {
        let list = self
            .objects
            .get(id)
            .ok_or_else(|| Error::CallRejected(format!("unknown object: {}", id)))?;
        Ok(self.record_for(id, &list))
    }

    async fn owned_objects(&self, owner: &Address, type_tag: &str) -> Result<Vec<ObjectRecord>> {
        if type_tag != contract::list_type_tag(&self.package) {
            return Ok(Vec::new());
        }
        let mut entries: Vec<(u64, ObjectRecord)> = self
            .objects
            .iter()
            .filter(|entry| &entry.value().owner == owner)
            .map(|entry| (entry.value().seq, self.record_for(entry.key(), entry.value())))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        Ok(entries.into_iter().map(|(_, record)| record).collect())
    }
}
