//! Transactions and the Undo/Redo Stack
//!
//! Every programmatic change to the board is a [`Txn`]: a self-sufficient
//! description of the end state it produces. The [`TxnStack`] keeps a linear
//! history of them and moves through it by *replaying* stored transactions,
//! never by inverting them. Undo re-applies the previous entry's target; redo
//! re-applies the next one.
//!
//! `history[0]` is the baseline ("clean") transaction. Undo never goes below
//! it.

use serde::{Deserialize, Serialize};

use crate::events::{EventSink, HistoryEvent};
use crate::layout::Layout;
use crate::reconcile::SyncReport;

/// State a transaction can change
pub trait TxnTarget {
    /// Reconcile the tiles to `layout`
    fn sync_to_layout(&mut self, layout: &Layout) -> SyncReport;

    /// Replace the phrase in the companion text field
    fn set_phrase(&mut self, phrase: &str);
}

/// A replayable change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Txn {
    /// Sync the tiles to a stored layout
    Layout(Layout),
    /// Set the phrase field to a stored string
    ChangePhrase(String),
    /// Apply several transactions, in order, as one history entry
    Batch(Vec<Txn>),
}

impl Txn {
    /// Apply this transaction to `target`
    pub fn apply(&self, target: &mut dyn TxnTarget) {
        match self {
            Self::Layout(layout) => {
                target.sync_to_layout(layout);
            }
            Self::ChangePhrase(phrase) => target.set_phrase(phrase),
            Self::Batch(txns) => {
                for txn in txns {
                    txn.apply(target);
                }
            }
        }
    }

    /// Short name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Layout(_) => "layout",
            Self::ChangePhrase(_) => "change-phrase",
            Self::Batch(_) => "batch",
        }
    }
}

/// Linear history of transactions with a cursor
#[derive(Debug)]
pub struct TxnStack {
    history: Vec<Txn>,
    cursor: usize,
    observer: EventSink<HistoryEvent>,
}

impl TxnStack {
    /// Create a stack whose baseline is `clean`
    ///
    /// The baseline is stored, not applied.
    #[must_use]
    pub fn new(clean: Txn) -> Self {
        Self {
            history: vec![clean],
            cursor: 0,
            observer: EventSink::disconnected(),
        }
    }

    /// Register the observer notified after every history change
    #[must_use]
    pub fn with_observer(mut self, observer: EventSink<HistoryEvent>) -> Self {
        self.observer = observer;
        self
    }

    /// Index of the current transaction
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored transactions, baseline included
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Always false: the baseline is never removed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Transaction at the cursor
    #[must_use]
    pub fn current(&self) -> &Txn {
        &self.history[self.cursor]
    }

    /// Stored transactions, oldest first
    #[must_use]
    pub fn history(&self) -> &[Txn] {
        &self.history
    }

    /// Whether [`undo`](Self::undo) would do anything
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`redo`](Self::redo) would do anything
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    /// Apply `txn` and record it as the newest entry
    ///
    /// Entries after the cursor (the redo branch) are discarded.
    pub fn apply(&mut self, txn: Txn, target: &mut dyn TxnTarget) {
        txn.apply(target);
        let discarded = self.history.len() - (self.cursor + 1);
        self.history.truncate(self.cursor + 1);
        tracing::debug!(kind = txn.kind(), discarded, "Applied transaction");
        self.history.push(txn);
        self.cursor = self.history.len() - 1;
        self.notify();
    }

    /// Step back by replaying the previous transaction
    ///
    /// Returns `false`, leaving everything untouched, at the baseline.
    pub fn undo(&mut self, target: &mut dyn TxnTarget) -> bool {
        if !self.can_undo() {
            tracing::warn!(cursor = self.cursor, "Attempt to undo when not possible");
            return false;
        }
        self.cursor -= 1;
        self.history[self.cursor].apply(target);
        tracing::debug!(cursor = self.cursor, len = self.history.len(), "Undo");
        self.notify();
        true
    }

    /// Step forward by replaying the next transaction
    ///
    /// Returns `false`, leaving everything untouched, at the newest entry.
    pub fn redo(&mut self, target: &mut dyn TxnTarget) -> bool {
        if !self.can_redo() {
            tracing::warn!(cursor = self.cursor, "Attempt to redo when not possible");
            return false;
        }
        self.cursor += 1;
        self.history[self.cursor].apply(target);
        tracing::debug!(cursor = self.cursor, len = self.history.len(), "Redo");
        self.notify();
        true
    }

    /// Current position as an event
    #[must_use]
    pub fn position(&self) -> HistoryEvent {
        HistoryEvent {
            cursor: self.cursor,
            len: self.history.len(),
        }
    }

    fn notify(&self) {
        self.observer.emit(self.position());
    }
}
