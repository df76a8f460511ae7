// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The draft editing surface for one session.
//!
//! `DraftEditor` owns the in-memory record for a `(session, kind)` pair and reconciles it
//! with the store: edits land synchronously in memory and are persisted by a debounced
//! autosave, kind switches flush the outgoing draft before the incoming one is loaded, and
//! explicit actions (save to history, clear) surface store failures to the caller while
//! autosave failures are only logged.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::model::{Record, RecordKind, SessionId};
use crate::store::{HistoryEntry, SessionStore, StoreError};

/// Edits settle for this long before the draft is persisted.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(2000);

#[derive(Debug)]
struct PendingSave {
    due: Instant,
    record: Record,
}

#[derive(Debug, Default)]
struct AutosaveState {
    pending: Option<PendingSave>,
    in_flight: bool,
    shutdown: bool,
}

#[derive(Debug)]
struct AutosaveInner {
    state: Mutex<AutosaveState>,
    cv: Condvar,
}

/// Debounced draft persistence on a dedicated worker thread.
///
/// Only the newest scheduled save survives; scheduling replaces any pending one and restarts
/// the quiet period. Cancel clears the pending save and waits out an in-flight one, so after
/// it returns no stale write can land.
#[derive(Debug)]
struct AutosaveWorker {
    inner: Arc<AutosaveInner>,
    handle: Option<JoinHandle<()>>,
}

impl AutosaveWorker {
    fn new(store: SessionStore, session_id: SessionId) -> Self {
        let inner = Arc::new(AutosaveInner {
            state: Mutex::new(AutosaveState::default()),
            cv: Condvar::new(),
        });

        let handle = std::thread::Builder::new()
            .name("proteus-autosave".to_owned())
            .spawn({
                let inner = inner.clone();
                move || Self::run_worker(inner, store, session_id)
            })
            .expect("spawn autosave worker thread");

        Self {
            inner,
            handle: Some(handle),
        }
    }

    fn schedule(&self, record: Record, quiet_period: Duration) {
        let mut state = self.inner.state.lock().expect("autosave lock poisoned");
        if record.has_content() {
            state.pending = Some(PendingSave {
                due: Instant::now() + quiet_period,
                record,
            });
        } else {
            // The newest state is blank; a stale pending write must not resurrect it.
            state.pending = None;
        }
        self.inner.cv.notify_one();
    }

    fn cancel(&self) {
        let mut state = self.inner.state.lock().expect("autosave lock poisoned");
        state.pending = None;
        while state.in_flight {
            state = self.inner.cv.wait(state).expect("autosave cv poisoned");
        }
    }

    /// Makes any pending save due immediately and waits until the worker is quiescent.
    fn flush(&self) {
        let mut state = self.inner.state.lock().expect("autosave lock poisoned");
        if let Some(pending) = state.pending.as_mut() {
            pending.due = Instant::now();
        }
        self.inner.cv.notify_one();
        while state.pending.is_some() || state.in_flight {
            state = self.inner.cv.wait(state).expect("autosave cv poisoned");
        }
    }

    fn run_worker(inner: Arc<AutosaveInner>, store: SessionStore, session_id: SessionId) {
        loop {
            let record = {
                let mut state = inner.state.lock().expect("autosave lock poisoned");

                loop {
                    if state.shutdown {
                        return;
                    }

                    match state.pending.as_ref().map(|pending| pending.due) {
                        Some(due) => {
                            let now = Instant::now();
                            if due <= now {
                                if let Some(pending) = state.pending.take() {
                                    state.in_flight = true;
                                    break pending.record;
                                }
                            } else {
                                let (next, _timeout) = inner
                                    .cv
                                    .wait_timeout(state, due - now)
                                    .expect("autosave cv poisoned");
                                state = next;
                            }
                        }
                        None => {
                            state = inner.cv.wait(state).expect("autosave cv poisoned");
                        }
                    }
                }
            };

            // Best-effort persistence: the in-memory record stays authoritative, so a
            // failed write loses nothing the user can see.
            if let Err(err) = store.save_draft(&session_id, &record) {
                tracing::warn!(
                    session = %session_id,
                    kind = %record.kind(),
                    error = %err,
                    "autosave failed; keeping draft in memory"
                );
            }

            let mut state = inner.state.lock().expect("autosave lock poisoned");
            state.in_flight = false;
            inner.cv.notify_all();
        }
    }
}

impl Drop for AutosaveWorker {
    fn drop(&mut self) {
        {
            let mut state = self.inner.state.lock().expect("autosave lock poisoned");
            state.pending = None;
            state.shutdown = true;
            self.inner.cv.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// The single logical writer for one session's drafts.
#[derive(Debug)]
pub struct DraftEditor {
    store: SessionStore,
    session_id: SessionId,
    kind: RecordKind,
    record: Record,
    quiet_period: Duration,
    autosave: AutosaveWorker,
}

impl DraftEditor {
    /// Opens the editing surface on a session, loading the stored draft for `kind` if one
    /// exists and starting from an empty record otherwise.
    pub fn open(
        store: SessionStore,
        session_id: SessionId,
        kind: RecordKind,
    ) -> Result<Self, StoreError> {
        let record = match store.load_draft(&session_id, kind)? {
            Some(draft) => draft.record,
            None => Record::empty(kind),
        };
        let autosave = AutosaveWorker::new(store.clone(), session_id.clone());
        Ok(Self {
            store,
            session_id,
            kind,
            record,
            quiet_period: DEFAULT_QUIET_PERIOD,
            autosave,
        })
    }

    /// Overrides the autosave quiet period. Mainly for tests; the default is 2000 ms.
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Replaces the in-memory record and restarts the autosave quiet period.
    ///
    /// The edit itself never blocks on storage. The incoming record's kind is forced to the
    /// editor's current kind; switching kinds goes through [`DraftEditor::switch_kind`].
    pub fn update(&mut self, record: Record) {
        debug_assert_eq!(record.kind(), self.kind);
        self.record = record;
        self.record.ensure_list_rows();
        self.autosave.schedule(self.record.clone(), self.quiet_period);
    }

    /// Switches the editing surface to the other record kind.
    ///
    /// Cancels the pending autosave, synchronously flushes the outgoing record when it has
    /// content, then loads or initializes the target kind's draft. A flush failure aborts
    /// the switch with the outgoing record still in memory.
    pub fn switch_kind(&mut self, kind: RecordKind) -> Result<(), StoreError> {
        if kind == self.kind {
            return Ok(());
        }

        self.autosave.cancel();
        if self.record.has_content() {
            self.store.save_draft(&self.session_id, &self.record)?;
        }

        let record = match self.store.load_draft(&self.session_id, kind)? {
            Some(draft) => draft.record,
            None => Record::empty(kind),
        };
        self.kind = kind;
        self.record = record;
        Ok(())
    }

    /// Discards the session's drafts and resets the in-memory record to empty.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.autosave.cancel();
        self.store.clear_drafts(&self.session_id)?;
        self.record = Record::empty(self.kind);
        Ok(())
    }

    /// Finalizes the current record into the session's history.
    ///
    /// A blank record is silently skipped and returns `Ok(None)`. The draft slot is left
    /// untouched either way.
    pub fn save_to_history(&mut self) -> Result<Option<HistoryEntry>, StoreError> {
        if !self.record.has_content() {
            return Ok(None);
        }
        let entry = self.store.append_history(&self.session_id, &self.record)?;
        Ok(Some(entry))
    }

    /// Runs any pending autosave immediately and blocks until the worker is idle.
    pub fn flush_autosave(&mut self) {
        self.autosave.flush();
    }
}

#[cfg(test)]
mod tests;
