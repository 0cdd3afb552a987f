//! Application state and key handling for the Tally TUI.
//!
//! The `App` owns a [`TodoSession`] and translates terminal key events
//! into session operations. All rendering state that is not session
//! state (cursors, the input buffer, the status line) lives here.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use tally_core::{TodoSession, View, Wallet};

// ============================================================================
// Input modes
// ============================================================================

/// What the line editor is collecting text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// A name for a new list.
    NewList,
    /// Text for a new item on the open list.
    NewItem,
}

/// Whether keys drive navigation or the line editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are commands.
    Normal,
    /// Keys append to the input buffer.
    Editing(EditTarget),
}

/// A one-line message shown in the footer until the next action.
#[derive(Debug, Clone)]
pub struct Status {
    /// The message text.
    pub message: String,
    /// Rendered in red when set.
    pub is_error: bool,
}

// ============================================================================
// App
// ============================================================================

/// Top-level TUI state.
pub struct App {
    /// The todo session this UI drives.
    pub session: TodoSession,
    /// Key file for on-demand connect. `None` when the session was
    /// connected at startup (local mode).
    wallet_key: Option<PathBuf>,
    /// Line editor buffer.
    pub input: String,
    /// Current input mode.
    pub mode: InputMode,
    /// Cursor into the overview list collection.
    pub list_cursor: usize,
    /// Cursor into the open list's items.
    pub item_cursor: usize,
    /// Footer status message, if any.
    pub status: Option<Status>,
    /// Set when the user asks to exit.
    pub should_quit: bool,
}

impl App {
    /// Creates the app around an already-built session.
    pub fn new(session: TodoSession, wallet_key: Option<PathBuf>) -> Self {
        Self {
            session,
            wallet_key,
            input: String::new(),
            mode: InputMode::Normal,
            list_cursor: 0,
            item_cursor: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Handles one key press.
    pub async fn handle_key(&mut self, key: KeyEvent) {
        self.status = None;
        match self.mode {
            InputMode::Editing(target) => self.handle_editing_key(key, target).await,
            InputMode::Normal => match self.session.view() {
                View::Overview => self.handle_overview_key(key).await,
                View::Detail(_) => self.handle_detail_key(key).await,
            },
        }
    }

    // ── Editing mode ────────────────────────────────────────────────────────

    async fn handle_editing_key(&mut self, key: KeyEvent, target: EditTarget) {
        match key.code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => {
                self.input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                self.mode = InputMode::Normal;
                let result = match target {
                    EditTarget::NewList => self.session.create_list(&text).await.map(|_| ()),
                    EditTarget::NewItem => self.session.add_item(&text).await,
                };
                match result {
                    Ok(()) => self.sync_cursors(target),
                    Err(err) => self.report(err),
                }
            }
            _ => {}
        }
    }

    // ── Overview ────────────────────────────────────────────────────────────

    async fn handle_overview_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.list_cursor = self.list_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.session.lists().len().saturating_sub(1);
                self.list_cursor = (self.list_cursor + 1).min(last);
            }
            KeyCode::Char('n') => self.mode = InputMode::Editing(EditTarget::NewList),
            KeyCode::Enter => {
                let Some(id) = self.session.lists().get(self.list_cursor).map(|l| l.id.clone())
                else {
                    return;
                };
                if let Err(err) = self.session.select_list(&id).await {
                    self.report(err);
                } else {
                    self.item_cursor = 0;
                }
            }
            KeyCode::Char('d') => {
                let Some(id) = self.session.lists().get(self.list_cursor).map(|l| l.id.clone())
                else {
                    return;
                };
                match self.session.delete_list(&id).await {
                    Ok(()) => self.clamp_list_cursor(),
                    Err(err) => self.report(err),
                }
            }
            KeyCode::Char('r') => {
                match self.session.refresh().await {
                    Ok(()) => self.clamp_list_cursor(),
                    Err(err) => self.report(err),
                }
            }
            KeyCode::Char('w') => self.connect_wallet().await,
            _ => {}
        }
    }

    // ── Detail ──────────────────────────────────────────────────────────────

    async fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Left | KeyCode::Char('b') => {
                self.session.deselect();
                self.clamp_list_cursor();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.item_cursor = self.item_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.session.items().len().saturating_sub(1);
                self.item_cursor = (self.item_cursor + 1).min(last);
            }
            KeyCode::Char('a') => self.mode = InputMode::Editing(EditTarget::NewItem),
            KeyCode::Char('d') => {
                if self.session.items().is_empty() {
                    return;
                }
                match self.session.remove_item(self.item_cursor).await {
                    Ok(()) => self.clamp_item_cursor(),
                    Err(err) => self.report(err),
                }
            }
            _ => {}
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    /// Loads the key file and connects, unless already connected.
    async fn connect_wallet(&mut self) {
        if self.session.is_connected() {
            self.info("already connected");
            return;
        }
        let Some(path) = self.wallet_key.clone() else {
            self.info("no wallet configured");
            return;
        };
        let wallet = match Wallet::load_or_generate(&path) {
            Ok(wallet) => wallet,
            Err(err) => return self.report(err),
        };
        let address = wallet.address().short();
        match self.session.connect(wallet).await {
            Ok(()) => {
                self.clamp_list_cursor();
                self.info(format!("connected as {address}"));
            }
            Err(err) => self.report(err),
        }
    }

    /// Points the cursors at what a just-finished edit produced.
    fn sync_cursors(&mut self, target: EditTarget) {
        match target {
            // create_list opens the new list; it also lands last in the
            // overview, so keep the collection cursor on it for when the
            // user backs out.
            EditTarget::NewList => {
                self.list_cursor = self.session.lists().len().saturating_sub(1);
                self.item_cursor = 0;
            }
            EditTarget::NewItem => {
                self.item_cursor = self.session.items().len().saturating_sub(1);
            }
        }
    }

    fn clamp_list_cursor(&mut self) {
        let last = self.session.lists().len().saturating_sub(1);
        self.list_cursor = self.list_cursor.min(last);
    }

    fn clamp_item_cursor(&mut self) {
        let last = self.session.items().len().saturating_sub(1);
        self.item_cursor = self.item_cursor.min(last);
    }

    fn report(&mut self, err: tally_core::Error) {
        tracing::debug!(code = err.code(), "operation failed: {err}");
        self.status = Some(Status {
            message: err.to_string(),
            is_error: true,
        });
    }

    fn info(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            is_error: false,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
