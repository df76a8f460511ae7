// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::{HistoryEntryId, Record, RecordKind, SessionId};

const HISTORY_DIR_NAME: &str = "history";

/// Maximum finalized entries kept per session; appending beyond it evicts the oldest.
const HISTORY_CAP: usize = 10;

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidRecordKind {
        path: PathBuf,
        value: String,
    },
    InvalidRelativePath {
        field: &'static str,
        value: PathBuf,
    },
    PathOutsideSession {
        session_dir: PathBuf,
        path: PathBuf,
    },
    SymlinkRefused {
        path: PathBuf,
    },
    HistoryEntryNotFound {
        session_id: SessionId,
        entry_id: HistoryEntryId,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::InvalidRecordKind { path, value } => {
                write!(f, "invalid record kind {value:?} in {path:?}")
            }
            Self::InvalidRelativePath { field, value } => {
                write!(f, "invalid relative path for {field}: {value:?}")
            }
            Self::PathOutsideSession { session_dir, path } => write!(
                f,
                "path is outside session dir: session_dir={session_dir:?} path={path:?}"
            ),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
            Self::HistoryEntryNotFound {
                session_id,
                entry_id,
            } => write!(
                f,
                "history entry {entry_id} not found in session {session_id}"
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidRecordKind { .. }
            | Self::InvalidRelativePath { .. }
            | Self::PathOutsideSession { .. }
            | Self::SymlinkRefused { .. }
            | Self::HistoryEntryNotFound { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// A per-kind working copy, one slot file per `(session, kind)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub record: Record,
    pub created_at: u64,
    pub updated_at: u64,
}

/// A finalized snapshot in a session's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub entry_id: HistoryEntryId,
    pub record: Record,
    pub created_at: u64,
    pub updated_at: u64,
}

/// File-backed store for drafts and history, rooted at one directory.
///
/// Layout: `<root>/<session>/draft-<kind>.json` plus `<root>/<session>/history/<id>.json`
/// with zero-padded, monotonically increasing ids. Every write goes through an atomic
/// temp-file-and-rename, so a draft save IS the upsert; there is no observable gap between
/// delete and insert. Mutating history operations serialize on a per-session mutex shared
/// across clones of the store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
    durability: WriteDurability,
    locks: Arc<Mutex<BTreeMap<String, Arc<Mutex<()>>>>>,
}

fn encode_persisted_id_segment(segment: &str) -> String {
    if !needs_windows_safe_filename_segment_encoding(segment) {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn decode_persisted_id_segment(segment: &str) -> Option<String> {
    let Some(hex) = segment.strip_prefix('~') else {
        return Some(segment.to_owned());
    };

    let bytes = hex.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        out.push(((hi << 4) | lo) as u8);
    }
    String::from_utf8(out).ok()
}

fn needs_windows_safe_filename_segment_encoding(segment: &str) -> bool {
    if segment.starts_with('~') {
        return true;
    }
    if segment == "." || segment == ".." {
        return true;
    }
    if segment.ends_with(' ') || segment.ends_with('.') {
        return true;
    }

    let trimmed = segment.trim_end_matches([' ', '.']);
    let base = trimmed.split('.').next().unwrap_or(trimmed);
    if is_windows_device_name(base) {
        return true;
    }

    for ch in segment.chars() {
        if matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
            return true;
        }
        if ch <= '\u{1f}' || ch == '\u{7f}' {
            return true;
        }
    }

    false
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            if let Some(num) = base.strip_prefix("COM") {
                matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")
            } else if let Some(num) = base.strip_prefix("LPT") {
                matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")
            } else {
                false
            }
        }
    }
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
            locks: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_dir(&self, session_id: &SessionId) -> PathBuf {
        self.root
            .join(encode_persisted_id_segment(session_id.as_str()))
    }

    pub fn draft_path(&self, session_id: &SessionId, kind: RecordKind) -> PathBuf {
        self.session_dir(session_id)
            .join(format!("draft-{}.json", kind.as_str()))
    }

    pub fn history_dir(&self, session_id: &SessionId) -> PathBuf {
        self.session_dir(session_id).join(HISTORY_DIR_NAME)
    }

    pub fn history_entry_path(&self, session_id: &SessionId, entry_id: HistoryEntryId) -> PathBuf {
        self.history_dir(session_id)
            .join(format!("{:08}.json", entry_id.value()))
    }

    fn session_lock(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("session lock registry poisoned");
        locks
            .entry(session_id.as_str().to_owned())
            .or_default()
            .clone()
    }

    /// Loads the draft slot for `(session, kind)`, if one exists.
    pub fn load_draft(
        &self,
        session_id: &SessionId,
        kind: RecordKind,
    ) -> Result<Option<Draft>, StoreError> {
        let path = self.draft_path(session_id, kind);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let json: DraftJson =
            serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;
        Ok(Some(draft_from_json(&path, json)?))
    }

    /// Saves `record` into its kind's draft slot, replacing whatever was there.
    ///
    /// The slot's `created_at` survives overwrites; only `updated_at` moves.
    pub fn save_draft(
        &self,
        session_id: &SessionId,
        record: &Record,
    ) -> Result<Draft, StoreError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().expect("session lock poisoned");

        let now = now_millis();
        let created_at = self
            .load_draft(session_id, record.kind())?
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let draft = Draft {
            record: record.clone(),
            created_at,
            updated_at: now,
        };

        let path = self.draft_path(session_id, record.kind());
        self.write_json(session_id, &path, &draft_to_json(&draft))?;
        Ok(draft)
    }

    /// Removes one kind's draft slot. A missing slot is not an error.
    pub fn delete_draft(
        &self,
        session_id: &SessionId,
        kind: RecordKind,
    ) -> Result<(), StoreError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().expect("session lock poisoned");

        let path = self.draft_path(session_id, kind);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Removes both draft slots. Missing slots are not an error.
    pub fn clear_drafts(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().expect("session lock poisoned");

        for kind in RecordKind::ALL {
            let path = self.draft_path(session_id, kind);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
        Ok(())
    }

    /// Appends a finalized snapshot to the session's history.
    ///
    /// Runs under the session lock: reads the existing ids, evicts the oldest entries down
    /// to one below the cap, and writes the new entry with the next monotone id. Ascending
    /// id order equals creation order, so eviction by smallest id is eviction by age.
    pub fn append_history(
        &self,
        session_id: &SessionId,
        record: &Record,
    ) -> Result<HistoryEntry, StoreError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().expect("session lock poisoned");

        let history_dir = self.history_dir(session_id);
        let mut ids = scan_history_ids(&history_dir)?;
        ids.sort_unstable();

        if ids.len() >= HISTORY_CAP {
            let evict = ids.len() + 1 - HISTORY_CAP;
            for &id in ids.iter().take(evict) {
                let path = self.history_entry_path(session_id, HistoryEntryId::new(id));
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(source) => return Err(StoreError::Io { path, source }),
                }
            }
        }

        let next_id = ids.last().map(|&id| id + 1).unwrap_or(1);
        let now = now_millis();
        let entry = HistoryEntry {
            entry_id: HistoryEntryId::new(next_id),
            record: record.clone(),
            created_at: now,
            updated_at: now,
        };

        let path = self.history_entry_path(session_id, entry.entry_id);
        self.write_json(session_id, &path, &history_entry_to_json(&entry))?;
        Ok(entry)
    }

    /// Lists history entries newest first, at most the cap.
    pub fn list_history(&self, session_id: &SessionId) -> Result<Vec<HistoryEntry>, StoreError> {
        let history_dir = self.history_dir(session_id);
        let mut ids = scan_history_ids(&history_dir)?;
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids.truncate(HISTORY_CAP);

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let path = self.history_entry_path(session_id, HistoryEntryId::new(id));
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                // Raced with eviction or deletion; the entry is simply gone.
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(StoreError::Io { path, source }),
            };
            let json: HistoryEntryJson =
                serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?;
            entries.push(history_entry_from_json(&path, json)?);
        }
        Ok(entries)
    }

    /// Deletes one history entry owned by this session.
    ///
    /// The id is only ever resolved inside the caller's session folder, so an id minted by
    /// another session comes back as not found rather than touching foreign data.
    pub fn delete_history_entry(
        &self,
        session_id: &SessionId,
        entry_id: HistoryEntryId,
    ) -> Result<(), StoreError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().expect("session lock poisoned");

        let path = self.history_entry_path(session_id, entry_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::HistoryEntryNotFound {
                    session_id: session_id.clone(),
                    entry_id,
                })
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Removes a whole session folder, drafts and history alike. Idempotent.
    pub fn delete_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().expect("session lock poisoned");

        let dir = self.session_dir(session_id);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path: dir, source }),
        }
    }

    /// Lists all session ids under the store root, sorted.
    ///
    /// Entries whose folder name does not decode back to a valid session id are skipped.
    pub fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut sessions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let file_type = entry.file_type().map_err(|source| StoreError::Io {
                path: entry.path(),
                source,
            })?;
            if !file_type.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let Some(decoded) = decode_persisted_id_segment(&name) else {
                continue;
            };
            if let Ok(session_id) = SessionId::new(decoded) {
                sessions.push(session_id);
            }
        }
        sessions.sort();
        Ok(sessions)
    }

    fn write_json<T: Serialize>(
        &self,
        session_id: &SessionId,
        path: &Path,
        value: &T,
    ) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic_in_session(
            &self.session_dir(session_id),
            path,
            format!("{contents}\n").as_bytes(),
            self.durability,
        )
    }
}

fn scan_history_ids(history_dir: &Path) -> Result<Vec<u64>, StoreError> {
    let entries = match fs::read_dir(history_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: history_dir.to_path_buf(),
                source,
            })
        }
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: history_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if let Ok(id) = stem.parse::<u64>() {
            ids.push(id);
        }
    }
    Ok(ids)
}

include!("session_store/helpers.rs");
