//! # Todo Session
//!
//! The process-local half of the application: view state, selection, and
//! the dispatch of user intents to the chain.
//!
//! ## Consistency model
//!
//! The chain owns the only durable copy of the data. Everything this
//! session holds — the list collection and the item snapshot of the open
//! list — is a snapshot taken at the last successful query, with no
//! freshness guarantee between writes performed by other agents.
//!
//! Every successful mutation is therefore followed by a re-read of the
//! affected collection rather than a speculative local patch: a partial or
//! reordered write is never silently assumed to have the shape the caller
//! expected. On failure the write is abandoned, the error is surfaced, and
//! local state stays at its last known-good value.
//!
//! ## Operation gate
//!
//! All operations run through a single in-flight slot. A submission while
//! another operation is outstanding fails fast with [`Error::Busy`], so at
//! most one external write is ever in flight.
//!
//! ## Navigation
//!
//! ```text
//!              select_list            deselect / delete open list
//!   Overview ──────────────► Detail ──────────────────────────► Overview
//! ```
//!
//! Leaving detail discards the item snapshot; reselecting the same list
//! re-issues the object query rather than reusing a cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::chain::ChainClient;
use crate::contract::{self, ListFields};
use crate::error::{Error, Result};
use crate::model::{Address, ListSummary, ObjectId};
use crate::wallet::Wallet;

/// Session configuration: where the todo contract lives.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Address of the published todo package.
    pub package: Address,
}

/// The two navigation states of the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// No list is open.
    Overview,
    /// A list is open and its items are snapshotted.
    Detail(ObjectId),
}

/// View state holder and action dispatcher over a [`ChainClient`].
pub struct TodoSession {
    chain: Arc<dyn ChainClient>,
    package: Address,
    type_tag: String,
    wallet: Option<Wallet>,
    /// Snapshot of the owned-lists collection.
    lists: Vec<ListSummary>,
    /// Currently open list, if any.
    selected: Option<ObjectId>,
    /// Item snapshot of the open list. Meaningless in overview.
    items: Vec<String>,
    /// Single-slot in-flight gate. Shared with the [`Gate`] guard so the
    /// slot is released even when an operation's future is dropped
    /// mid-await.
    busy: Arc<AtomicBool>,
}

/// Releases the in-flight slot on drop, including drops caused by
/// cancelling the operation's future.
struct Gate(Arc<AtomicBool>);

impl Drop for Gate {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl TodoSession {
    /// Create a disconnected session against the given chain.
    pub fn new(chain: Arc<dyn ChainClient>, config: SessionConfig) -> Self {
        let type_tag = contract::list_type_tag(&config.package);
        Self {
            chain,
            package: config.package,
            type_tag,
            wallet: None,
            lists: Vec::new(),
            selected: None,
            items: Vec::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Connected wallet address, if any.
    pub fn address(&self) -> Option<&Address> {
        self.wallet.as_ref().map(|w| w.address())
    }

    /// Whether a wallet is connected.
    pub fn is_connected(&self) -> bool {
        self.wallet.is_some()
    }

    /// Whether an operation is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// The local snapshot of the list collection.
    pub fn lists(&self) -> &[ListSummary] {
        &self.lists
    }

    /// The item snapshot of the open list (empty in overview).
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Summary of the open list, looked up by id in the local collection.
    pub fn selected_list(&self) -> Option<&ListSummary> {
        let id = self.selected.as_ref()?;
        self.lists.iter().find(|l| &l.id == id)
    }

    /// Current navigation state.
    pub fn view(&self) -> View {
        match &self.selected {
            Some(id) => View::Detail(id.clone()),
            None => View::Overview,
        }
    }

    // ── Operations ────────────────────────────────────────────────────────

    /// Connect a wallet and load its list collection. On failure the
    /// session stays disconnected.
    pub async fn connect(&mut self, wallet: Wallet) -> Result<()> {
        let _gate = self.enter()?;
        self.connect_inner(wallet).await
    }

    /// Drop the wallet and all view state. Purely local.
    pub fn disconnect(&mut self) {
        self.wallet = None;
        self.lists.clear();
        self.selected = None;
        self.items.clear();
    }

    /// Re-read the list collection and, if a list is open, its items.
    /// If the open list no longer exists, fall back to overview.
    pub async fn refresh(&mut self) -> Result<()> {
        let _gate = self.enter()?;
        self.refresh_inner().await
    }

    /// Create a list and open it. Returns the new list's id.
    pub async fn create_list(&mut self, name: &str) -> Result<ObjectId> {
        let _gate = self.enter()?;
        self.create_list_inner(name).await
    }

    /// Delete a list. If it was open, the view falls back to overview.
    pub async fn delete_list(&mut self, id: &ObjectId) -> Result<()> {
        let _gate = self.enter()?;
        self.delete_list_inner(id).await
    }

    /// Open a list, querying its items fresh. Always re-issues the query,
    /// even when reselecting the list that was open before.
    pub async fn select_list(&mut self, id: &ObjectId) -> Result<()> {
        let _gate = self.enter()?;
        self.select_list_inner(id).await
    }

    /// Close the open list and discard its snapshot. Purely local.
    pub fn deselect(&mut self) {
        self.selected = None;
        self.items.clear();
    }

    /// Append an item to the open list.
    pub async fn add_item(&mut self, text: &str) -> Result<()> {
        let _gate = self.enter()?;
        self.add_item_inner(text).await
    }

    /// Remove the item at `position` from the open list.
    pub async fn remove_item(&mut self, position: usize) -> Result<()> {
        let _gate = self.enter()?;
        self.remove_item_inner(position).await
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Claim the in-flight slot. The returned guard releases it on drop,
    /// so a cancelled operation cannot wedge the session.
    fn enter(&self) -> Result<Gate> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(Error::Busy);
        }
        Ok(Gate(self.busy.clone()))
    }

    fn require_wallet(&self) -> Result<&Wallet> {
        self.wallet.as_ref().ok_or(Error::NotConnected)
    }

    fn require_selected(&self) -> Result<ObjectId> {
        self.selected.clone().ok_or(Error::NoSelection)
    }

    /// Query the owned-lists collection for `owner`.
    async fn fetch_lists(&self, owner: &Address) -> Result<Vec<ListSummary>> {
        let records = self.chain.owned_objects(owner, &self.type_tag).await?;
        records
            .iter()
            .map(|record| {
                let fields = ListFields::decode(record, &self.type_tag)?;
                Ok(ListSummary {
                    id: record.id.clone(),
                    name: fields.name,
                    item_count: fields.items.len(),
                })
            })
            .collect()
    }

    /// Query the current item sequence of one list.
    async fn fetch_items(&self, id: &ObjectId) -> Result<Vec<String>> {
        let record = self.chain.get_object(id).await?;
        let fields = ListFields::decode(&record, &self.type_tag)?;
        Ok(fields.items)
    }

    async fn connect_inner(&mut self, wallet: Wallet) -> Result<()> {
        let owner = wallet.address().clone();
        // Committed only after the initial query succeeds.
        let previous = self.wallet.replace(wallet);
        match self.fetch_lists(&owner).await {
            Ok(lists) => {
                tracing::info!(address = %owner, lists = lists.len(), "Wallet connected");
                self.lists = lists;
                self.selected = None;
                self.items.clear();
                Ok(())
            }
            Err(err) => {
                self.wallet = previous;
                Err(err)
            }
        }
    }

    async fn refresh_inner(&mut self) -> Result<()> {
        let wallet = self.require_wallet()?;
        let owner = wallet.address().clone();
        let lists = self.fetch_lists(&owner).await?;

        let selected = self
            .selected
            .as_ref()
            .filter(|id| lists.iter().any(|l| &l.id == *id))
            .cloned();
        let items = match &selected {
            Some(id) => self.fetch_items(id).await?,
            None => Vec::new(),
        };

        self.lists = lists;
        self.selected = selected;
        self.items = items;
        Ok(())
    }

    async fn create_list_inner(&mut self, name: &str) -> Result<ObjectId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let wallet = self.require_wallet()?;
        let owner = wallet.address().clone();
        let signed = wallet.sign_call(contract::new_list(&self.package, name))?;

        let effects = self.chain.execute(&signed).await?;
        let id = effects
            .created
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingField("created object id".to_string()))?;
        tracing::info!(list = %id, digest = %effects.digest, "List created");

        // Re-read the authoritative collection, then open the new list.
        let lists = self.fetch_lists(&owner).await?;
        let items = self.fetch_items(&id).await?;
        self.lists = lists;
        self.selected = Some(id.clone());
        self.items = items;
        Ok(id)
    }

    async fn delete_list_inner(&mut self, id: &ObjectId) -> Result<()> {
        let wallet = self.require_wallet()?;
        let owner = wallet.address().clone();
        if !self.lists.iter().any(|l| &l.id == id) {
            return Err(Error::ListNotFound(id.to_string()));
        }
        let signed = wallet.sign_call(contract::delete_list(&self.package, id))?;

        let effects = self.chain.execute(&signed).await?;
        tracing::info!(list = %id, digest = %effects.digest, "List deleted");

        let lists = self.fetch_lists(&owner).await?;
        self.lists = lists;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.items.clear();
        }
        Ok(())
    }

    async fn select_list_inner(&mut self, id: &ObjectId) -> Result<()> {
        if !self.lists.iter().any(|l| &l.id == id) {
            return Err(Error::ListNotFound(id.to_string()));
        }
        let items = self.fetch_items(id).await?;
        self.selected = Some(id.clone());
        self.items = items;
        Ok(())
    }

    async fn add_item_inner(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyText);
        }
        let wallet = self.require_wallet()?;
        let id = self.require_selected()?;
        let signed = wallet.sign_call(contract::add_item(&self.package, &id, text))?;

        self.chain.execute(&signed).await?;
        let items = self.fetch_items(&id).await?;
        self.commit_items(&id, items);
        Ok(())
    }

    async fn remove_item_inner(&mut self, position: usize) -> Result<()> {
        let wallet = self.require_wallet()?;
        let id = self.require_selected()?;
        // Fail fast on a stale index instead of burning a chain call.
        if position >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index: position,
                len: self.items.len(),
            });
        }
        let signed = wallet.sign_call(contract::remove_item(&self.package, &id, position as u64))?;

        self.chain.execute(&signed).await?;
        let items = self.fetch_items(&id).await?;
        self.commit_items(&id, items);
        Ok(())
    }

    /// Overwrite the item snapshot and keep the overview count in step.
    fn commit_items(&mut self, id: &ObjectId, items: Vec<String>) {
        if let Some(summary) = self.lists.iter_mut().find(|l| &l.id == id) {
            summary.item_count = items.len();
        }
        self.items = items;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::chain::memory::MemoryChain;
    use crate::chain::{ExecuteEffects, ObjectRecord, SignedCall};

    /// Wraps a [`MemoryChain`], counting calls and optionally rejecting
    /// writes, so tests can observe exactly what the session did.
    struct RecordingChain {
        inner: MemoryChain,
        execute_calls: AtomicUsize,
        get_object_calls: AtomicUsize,
        owned_calls: AtomicUsize,
        fail_writes: AtomicBool,
    }

    impl RecordingChain {
        fn new(package: Address) -> Self {
            Self {
                inner: MemoryChain::new(package),
                execute_calls: AtomicUsize::new(0),
                get_object_calls: AtomicUsize::new(0),
                owned_calls: AtomicUsize::new(0),
                fail_writes: AtomicBool::new(false),
            }
        }

        fn total_calls(&self) -> usize {
            self.execute_calls.load(Ordering::SeqCst)
                + self.get_object_calls.load(Ordering::SeqCst)
                + self.owned_calls.load(Ordering::SeqCst)
        }

        fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ChainClient for RecordingChain {
        async fn execute(&self, call: &SignedCall) -> crate::error::Result<ExecuteEffects> {
            self.execute_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Error::CallRejected("injected rejection".to_string()));
            }
            self.inner.execute(call).await
        }

        async fn get_object(&self, id: &ObjectId) -> crate::error::Result<ObjectRecord> {
            self.get_object_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_object(id).await
        }

        async fn owned_objects(
            &self,
            owner: &Address,
            type_tag: &str,
        ) -> crate::error::Result<Vec<ObjectRecord>> {
            self.owned_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.owned_objects(owner, type_tag).await
        }
    }

    fn package() -> Address {
        Address::from_bytes(&[0x02; 32])
    }

    fn harness() -> (Arc<RecordingChain>, TodoSession) {
        let chain = Arc::new(RecordingChain::new(package()));
        let session = TodoSession::new(
            chain.clone(),
            SessionConfig { package: package() },
        );
        (chain, session)
    }

    async fn connected() -> (Arc<RecordingChain>, TodoSession) {
        let (chain, mut session) = harness();
        session.connect(Wallet::from_seed(&[1u8; 32])).await.unwrap();
        (chain, session)
    }

    #[tokio::test]
    async fn test_create_lists_grow_collection_with_matching_names() {
        let (_chain, mut session) = connected().await;

        let names = ["groceries", "chores", "reading"];
        for name in names {
            session.create_list(name).await.unwrap();
        }

        assert_eq!(session.lists().len(), names.len());
        for (summary, name) in session.lists().iter().zip(names) {
            assert_eq!(summary.name, name);
            assert_eq!(summary.item_count, 0);
        }
    }

    #[tokio::test]
    async fn test_create_list_opens_the_new_list() {
        let (_chain, mut session) = connected().await;
        let id = session.create_list("groceries").await.unwrap();

        assert_eq!(session.view(), View::Detail(id.clone()));
        assert_eq!(session.selected_list().unwrap().id, id);
        assert!(session.items().is_empty());
    }

    #[tokio::test]
    async fn test_create_list_rejects_blank_names_locally() {
        let (chain, mut session) = connected().await;
        let before = chain.total_calls();

        assert!(matches!(
            session.create_list("   ").await,
            Err(Error::EmptyName)
        ));
        assert_eq!(chain.total_calls(), before);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one_entry() {
        let (_chain, mut session) = connected().await;
        session.create_list("keep").await.unwrap();
        let doomed = session.create_list("doomed").await.unwrap();
        session.deselect();

        session.delete_list(&doomed).await.unwrap();

        assert_eq!(session.lists().len(), 1);
        assert_eq!(session.lists()[0].name, "keep");
        assert_eq!(session.view(), View::Overview);
    }

    #[tokio::test]
    async fn test_deleting_the_open_list_returns_to_overview() {
        let (_chain, mut session) = connected().await;
        let id = session.create_list("doomed").await.unwrap();
        session.add_item("last words").await.unwrap();
        assert_eq!(session.view(), View::Detail(id.clone()));

        session.delete_list(&id).await.unwrap();

        assert_eq!(session.view(), View::Overview);
        assert!(session.items().is_empty());
        assert!(session.selected_list().is_none());
    }

    #[tokio::test]
    async fn test_add_item_snapshot_matches_the_store() {
        let (chain, mut session) = connected().await;
        let id = session.create_list("chores").await.unwrap();

        session.add_item("sweep").await.unwrap();
        session.add_item("mop").await.unwrap();

        // The snapshot must equal what the store holds, re-read not patched.
        let record = chain.inner.get_object(&id).await.unwrap();
        let fields = ListFields::decode(&record, &contract::list_type_tag(&package())).unwrap();
        assert_eq!(session.items(), fields.items.as_slice());
        assert_eq!(session.selected_list().unwrap().item_count, 2);
    }

    #[tokio::test]
    async fn test_remove_item_shifts_positions() {
        let (_chain, mut session) = connected().await;
        session.create_list("chores").await.unwrap();
        for text in ["sweep", "mop", "dust"] {
            session.add_item(text).await.unwrap();
        }

        session.remove_item(1).await.unwrap();

        assert_eq!(session.items(), ["sweep", "dust"]);
    }

    #[tokio::test]
    async fn test_stale_index_fails_without_a_chain_call() {
        let (chain, mut session) = connected().await;
        session.create_list("chores").await.unwrap();
        session.add_item("sweep").await.unwrap();
        let before = chain.execute_calls.load(Ordering::SeqCst);

        let err = session.remove_item(5).await.unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 1 }));
        assert_eq!(chain.execute_calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn test_disconnected_writes_make_zero_external_calls() {
        let (chain, mut session) = harness();
        let id = ObjectId::from_bytes(&[0x0a; 32]);

        assert!(matches!(
            session.create_list("groceries").await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(
            session.delete_list(&id).await,
            Err(Error::ListNotFound(_)) | Err(Error::NotConnected)
        ));
        assert!(matches!(session.add_item("x").await, Err(Error::NotConnected)));
        assert!(matches!(session.remove_item(0).await, Err(Error::NotConnected)));

        assert_eq!(chain.total_calls(), 0);
        assert!(session.lists().is_empty());
        assert!(session.items().is_empty());
        assert_eq!(session.view(), View::Overview);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_snapshot_untouched() {
        let (chain, mut session) = connected().await;
        session.create_list("chores").await.unwrap();
        session.add_item("sweep").await.unwrap();

        let lists_before = session.lists().to_vec();
        let items_before = session.items().to_vec();

        chain.set_fail_writes(true);
        let err = session.add_item("mop").await.unwrap_err();
        assert!(!err.to_string().is_empty());

        assert_eq!(session.lists(), lists_before.as_slice());
        assert_eq!(session.items(), items_before.as_slice());

        // And the session is usable again once the store recovers.
        chain.set_fail_writes(false);
        session.add_item("mop").await.unwrap();
        assert_eq!(session.items(), ["sweep", "mop"]);
    }

    #[tokio::test]
    async fn test_reselecting_reissues_the_item_query() {
        let (chain, mut session) = connected().await;
        let a = session.create_list("alpha").await.unwrap();
        let b = session.create_list("beta").await.unwrap();
        session.deselect();

        let before = chain.get_object_calls.load(Ordering::SeqCst);
        session.select_list(&a).await.unwrap();
        session.select_list(&b).await.unwrap();
        session.select_list(&a).await.unwrap();

        // Three selections, three queries. Nothing served from a cache.
        assert_eq!(chain.get_object_calls.load(Ordering::SeqCst), before + 3);
    }

    #[tokio::test]
    async fn test_deselect_discards_the_snapshot() {
        let (_chain, mut session) = connected().await;
        session.create_list("chores").await.unwrap();
        session.add_item("sweep").await.unwrap();

        session.deselect();

        assert_eq!(session.view(), View::Overview);
        assert!(session.items().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_drops_a_list_deleted_elsewhere() {
        let (chain, mut session) = connected().await;
        let id = session.create_list("shared").await.unwrap();

        // Another client of the same wallet deletes the list out from
        // under us.
        let other = Wallet::from_seed(&[1u8; 32]);
        let signed = other
            .sign_call(contract::delete_list(&package(), &id))
            .unwrap();
        chain.inner.execute(&signed).await.unwrap();

        session.refresh().await.unwrap();

        assert!(session.lists().is_empty());
        assert_eq!(session.view(), View::Overview);
    }

    #[tokio::test]
    async fn test_in_flight_slot_rejects_a_second_operation() {
        let (_chain, mut session) = connected().await;

        let slot = session.enter().unwrap();
        assert!(session.is_busy());
        assert!(matches!(session.create_list("x").await, Err(Error::Busy)));
        assert!(matches!(session.refresh().await, Err(Error::Busy)));

        drop(slot);
        assert!(!session.is_busy());
        session.create_list("x").await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_operation_releases_the_slot() {
        // Reads resolve, writes never do, so an in-flight write can be
        // cancelled from the outside.
        struct StalledChain;
        #[async_trait]
        impl ChainClient for StalledChain {
            async fn execute(&self, _: &SignedCall) -> crate::error::Result<ExecuteEffects> {
                std::future::pending().await
            }
            async fn get_object(&self, _: &ObjectId) -> crate::error::Result<ObjectRecord> {
                std::future::pending().await
            }
            async fn owned_objects(
                &self,
                _: &Address,
                _: &str,
            ) -> crate::error::Result<Vec<ObjectRecord>> {
                Ok(Vec::new())
            }
        }

        let mut session = TodoSession::new(
            Arc::new(StalledChain),
            SessionConfig { package: package() },
        );
        session.connect(Wallet::from_seed(&[2u8; 32])).await.unwrap();

        let create = session.create_list("stuck");
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), create)
            .await
            .is_err();
        assert!(timed_out);

        // Dropping the cancelled future released the slot; the session
        // stays usable.
        assert!(!session.is_busy());
        session.refresh().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_failure_stays_disconnected() {
        // A chain that rejects everything fails the initial owned-objects
        // query, so the wallet must not be committed.
        struct DeadChain;
        #[async_trait]
        impl ChainClient for DeadChain {
            async fn execute(&self, _: &SignedCall) -> crate::error::Result<ExecuteEffects> {
                Err(Error::Transport("connection refused".to_string()))
            }
            async fn get_object(&self, _: &ObjectId) -> crate::error::Result<ObjectRecord> {
                Err(Error::Transport("connection refused".to_string()))
            }
            async fn owned_objects(
                &self,
                _: &Address,
                _: &str,
            ) -> crate::error::Result<Vec<ObjectRecord>> {
                Err(Error::Transport("connection refused".to_string()))
            }
        }

        let mut session = TodoSession::new(
            Arc::new(DeadChain),
            SessionConfig { package: package() },
        );
        let err = session.connect(Wallet::from_seed(&[3u8; 32])).await.unwrap_err();
        assert!(err.is_recoverable());
        assert!(!session.is_connected());
        assert!(!session.is_busy());
    }
}
