// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::DraftEditor;
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

struct EditorTestCtx {
    _tmp: TempDir,
    store: SessionStore,
    session: SessionId,
}

impl EditorTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let store = SessionStore::new(tmp.path().join("store"));
        let session = SessionId::new("alice").unwrap();
        Self { _tmp: tmp, store, session }
    }

    fn open_story(&self) -> DraftEditor {
        DraftEditor::open(self.store.clone(), self.session.clone(), RecordKind::Story)
            .unwrap()
            .with_quiet_period(Duration::from_millis(20))
    }
}

#[fixture]
fn ctx() -> EditorTestCtx {
    EditorTestCtx::new("editor")
}

fn story(role: &str) -> Record {
    let mut record = Record::empty(RecordKind::Story);
    record.set_role(role);
    record
}

#[rstest]
fn open_without_a_draft_starts_empty(ctx: EditorTestCtx) {
    let editor = ctx.open_story();
    assert_eq!(editor.kind(), RecordKind::Story);
    assert!(!editor.record().has_content());
}

#[rstest]
fn open_resumes_a_stored_draft(ctx: EditorTestCtx) {
    ctx.store.save_draft(&ctx.session, &story("returning user")).unwrap();
    let editor = ctx.open_story();
    assert_eq!(editor.record().role(), "returning user");
}

#[rstest]
fn flushed_update_is_persisted(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("user"));
    editor.flush_autosave();

    let draft = ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().unwrap();
    assert_eq!(draft.record.role(), "user");
}

#[rstest]
fn autosave_fires_after_the_quiet_period(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("user"));

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().is_some() {
            break;
        }
        assert!(Instant::now() < deadline, "autosave never landed");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[rstest]
fn blank_records_are_never_persisted(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(Record::empty(RecordKind::Story));
    editor.flush_autosave();
    assert!(ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().is_none());
}

#[rstest]
fn only_the_newest_pending_save_survives(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("one"));
    editor.update(story("two"));
    editor.flush_autosave();

    let draft = ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().unwrap();
    assert_eq!(draft.record.role(), "two");
}

#[rstest]
fn editing_back_to_blank_cancels_the_stale_save(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("one"));
    editor.update(Record::empty(RecordKind::Story));
    editor.flush_autosave();
    assert!(ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().is_none());
}

#[rstest]
fn switch_flushes_the_outgoing_draft_first(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("pre-switch"));
    editor.switch_kind(RecordKind::Bug).unwrap();

    // The story draft is readable immediately after the switch returns.
    let draft = ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().unwrap();
    assert_eq!(draft.record.role(), "pre-switch");
    assert_eq!(editor.kind(), RecordKind::Bug);
    assert!(!editor.record().has_content());
}

#[rstest]
fn switching_back_restores_the_stored_draft(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("original"));
    editor.switch_kind(RecordKind::Bug).unwrap();
    editor.switch_kind(RecordKind::Story).unwrap();
    assert_eq!(editor.record().role(), "original");
}

#[rstest]
fn switching_to_the_current_kind_is_a_no_op(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("kept"));
    editor.switch_kind(RecordKind::Story).unwrap();
    assert_eq!(editor.record().role(), "kept");
}

#[rstest]
fn blank_outgoing_record_is_not_flushed_on_switch(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.switch_kind(RecordKind::Bug).unwrap();
    assert!(ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().is_none());
}

#[rstest]
fn clear_discards_drafts_and_resets_memory(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("doomed"));
    editor.flush_autosave();
    editor.clear().unwrap();

    assert!(!editor.record().has_content());
    assert!(ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().is_none());
}

#[rstest]
fn blank_record_is_not_saved_to_history(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    assert!(editor.save_to_history().unwrap().is_none());
    assert!(ctx.store.list_history(&ctx.session).unwrap().is_empty());
}

#[rstest]
fn save_to_history_leaves_the_draft_untouched(ctx: EditorTestCtx) {
    let mut editor = ctx.open_story();
    editor.update(story("kept"));
    editor.flush_autosave();

    let entry = editor.save_to_history().unwrap().unwrap();
    assert_eq!(entry.entry_id.value(), 1);
    assert_eq!(entry.record.role(), "kept");

    let draft = ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().unwrap();
    assert_eq!(draft.record.role(), "kept");
}

#[rstest]
fn dropping_the_editor_cancels_the_pending_save(ctx: EditorTestCtx) {
    let mut editor = DraftEditor::open(
        ctx.store.clone(),
        ctx.session.clone(),
        RecordKind::Story,
    )
    .unwrap()
    .with_quiet_period(Duration::from_secs(60));
    editor.update(story("never lands"));
    drop(editor);

    assert!(ctx.store.load_draft(&ctx.session, RecordKind::Story).unwrap().is_none());
}
