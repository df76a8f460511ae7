// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{RecordKind, SessionId};
use crate::store::{SessionStore, StoreError};

/// Per-session activity summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub session_id: SessionId,
    pub drafts: usize,
    pub history_entries: usize,
    pub first_activity: Option<u64>,
    pub last_activity: Option<u64>,
}

/// Store-wide aggregate of [`SessionStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverallStats {
    pub sessions: usize,
    pub drafts: usize,
    pub history_entries: usize,
    pub first_activity: Option<u64>,
    pub last_activity: Option<u64>,
}

/// Summarizes one session by scanning its draft slots and history.
pub fn session_stats(
    store: &SessionStore,
    session_id: &SessionId,
) -> Result<SessionStats, StoreError> {
    let mut drafts = 0;
    let mut first_activity: Option<u64> = None;
    let mut last_activity: Option<u64> = None;

    let mut observe = |created_at: u64, updated_at: u64| {
        first_activity = Some(first_activity.map_or(created_at, |t| t.min(created_at)));
        last_activity = Some(last_activity.map_or(updated_at, |t| t.max(updated_at)));
    };

    for kind in RecordKind::ALL {
        if let Some(draft) = store.load_draft(session_id, kind)? {
            drafts += 1;
            observe(draft.created_at, draft.updated_at);
        }
    }

    let history = store.list_history(session_id)?;
    for entry in &history {
        observe(entry.created_at, entry.updated_at);
    }

    Ok(SessionStats {
        session_id: session_id.clone(),
        drafts,
        history_entries: history.len(),
        first_activity,
        last_activity,
    })
}

/// Summarizes every session, most recently active first.
///
/// Sessions with no recorded activity sort last; ties fall back to session id order so the
/// output stays stable.
pub fn all_session_stats(store: &SessionStore) -> Result<Vec<SessionStats>, StoreError> {
    let mut stats = Vec::new();
    for session_id in store.list_sessions()? {
        stats.push(session_stats(store, &session_id)?);
    }
    stats.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    Ok(stats)
}

/// Aggregates all sessions into one store-wide summary.
pub fn overall_stats(store: &SessionStore) -> Result<OverallStats, StoreError> {
    let mut overall = OverallStats::default();
    for stats in all_session_stats(store)? {
        overall.sessions += 1;
        overall.drafts += stats.drafts;
        overall.history_entries += stats.history_entries;
        overall.first_activity = match (overall.first_activity, stats.first_activity) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        overall.last_activity = match (overall.last_activity, stats.last_activity) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
    Ok(overall)
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use rstest::{fixture, rstest};

    use super::{all_session_stats, overall_stats, session_stats};
    use crate::model::{Record, RecordKind, SessionId};
    use crate::store::SessionStore;

    static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    struct TempDir {
        path: std::path::PathBuf,
    }

    impl TempDir {
        fn new(prefix: &str) -> Self {
            let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
            let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
            let mut path = env::temp_dir();
            path.push(format!("proteus-{prefix}-{}-{nanos}-{counter}", std::process::id()));
            std::fs::create_dir_all(&path).unwrap();
            Self { path }
        }

        fn path(&self) -> &std::path::Path {
            &self.path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    struct StatsTestCtx {
        _tmp: TempDir,
        store: SessionStore,
    }

    #[fixture]
    fn ctx() -> StatsTestCtx {
        let tmp = TempDir::new("stats");
        let store = SessionStore::new(tmp.path().join("store"));
        StatsTestCtx { _tmp: tmp, store }
    }

    fn sid(value: &str) -> SessionId {
        SessionId::new(value).unwrap()
    }

    fn story(role: &str) -> Record {
        let mut record = Record::empty(RecordKind::Story);
        record.set_role(role);
        record
    }

    #[rstest]
    fn empty_session_has_no_activity(ctx: StatsTestCtx) {
        let stats = session_stats(&ctx.store, &sid("ghost")).unwrap();
        assert_eq!(stats.drafts, 0);
        assert_eq!(stats.history_entries, 0);
        assert!(stats.first_activity.is_none());
        assert!(stats.last_activity.is_none());
    }

    #[rstest]
    fn counts_drafts_and_history(ctx: StatsTestCtx) {
        let session = sid("alice");
        ctx.store.save_draft(&session, &story("a")).unwrap();
        ctx.store.append_history(&session, &story("a")).unwrap();
        ctx.store.append_history(&session, &story("b")).unwrap();

        let stats = session_stats(&ctx.store, &session).unwrap();
        assert_eq!(stats.drafts, 1);
        assert_eq!(stats.history_entries, 2);
        assert!(stats.first_activity.is_some());
        assert!(stats.last_activity >= stats.first_activity);
    }

    #[rstest]
    fn overall_aggregates_across_sessions(ctx: StatsTestCtx) {
        ctx.store.save_draft(&sid("alice"), &story("a")).unwrap();
        ctx.store.save_draft(&sid("bob"), &story("b")).unwrap();
        ctx.store.append_history(&sid("bob"), &story("b")).unwrap();

        let overall = overall_stats(&ctx.store).unwrap();
        assert_eq!(overall.sessions, 2);
        assert_eq!(overall.drafts, 2);
        assert_eq!(overall.history_entries, 1);
    }

    #[rstest]
    fn listing_orders_by_recency(ctx: StatsTestCtx) {
        ctx.store.save_draft(&sid("older"), &story("a")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        ctx.store.save_draft(&sid("newer"), &story("b")).unwrap();

        let stats = all_session_stats(&ctx.store).unwrap();
        let order: Vec<&str> = stats.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(order, vec!["newer", "older"]);
    }
}
