// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Session store persistence helpers:
/// json conversion and safe filesystem writes.

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordJson {
    kind: String,
    role: String,
    action: String,
    benefit: String,
    background: String,
    additional_info: String,
    acceptance_criteria: Vec<String>,
    technical_info: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DraftJson {
    record: RecordJson,
    created_at: u64,
    updated_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryEntryJson {
    entry_id: u64,
    record: RecordJson,
    created_at: u64,
    updated_at: u64,
}

fn record_to_json(record: &Record) -> RecordJson {
    RecordJson {
        kind: record.kind().as_str().to_owned(),
        role: record.role().to_owned(),
        action: record.action().to_owned(),
        benefit: record.benefit().to_owned(),
        background: record.background().to_owned(),
        additional_info: record.additional_info().to_owned(),
        acceptance_criteria: record.acceptance_criteria().to_vec(),
        technical_info: record.technical_info().to_vec(),
    }
}

fn record_from_json(path: &Path, json: RecordJson) -> Result<Record, StoreError> {
    let kind = json
        .kind
        .parse::<RecordKind>()
        .map_err(|_| StoreError::InvalidRecordKind {
            path: path.to_path_buf(),
            value: json.kind,
        })?;

    let mut record = Record::empty(kind);
    record.set_role(json.role);
    record.set_action(json.action);
    record.set_benefit(json.benefit);
    record.set_background(json.background);
    record.set_additional_info(json.additional_info);
    *record.acceptance_criteria_mut() = json.acceptance_criteria;
    *record.technical_info_mut() = json.technical_info;
    // Files written by older builds may carry empty lists; loading restores the
    // at-least-one-row invariant.
    record.ensure_list_rows();
    Ok(record)
}

fn draft_to_json(draft: &Draft) -> DraftJson {
    DraftJson {
        record: record_to_json(&draft.record),
        created_at: draft.created_at,
        updated_at: draft.updated_at,
    }
}

fn draft_from_json(path: &Path, json: DraftJson) -> Result<Draft, StoreError> {
    Ok(Draft {
        record: record_from_json(path, json.record)?,
        created_at: json.created_at,
        updated_at: json.updated_at,
    })
}

fn history_entry_to_json(entry: &HistoryEntry) -> HistoryEntryJson {
    HistoryEntryJson {
        entry_id: entry.entry_id.value(),
        record: record_to_json(&entry.record),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

fn history_entry_from_json(path: &Path, json: HistoryEntryJson) -> Result<HistoryEntry, StoreError> {
    Ok(HistoryEntry {
        entry_id: HistoryEntryId::new(json.entry_id),
        record: record_from_json(path, json.record)?,
        created_at: json.created_at,
        updated_at: json.updated_at,
    })
}

fn validate_relative_path(field: &'static str, path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() {
        return Err(StoreError::InvalidRelativePath {
            field,
            value: path.to_path_buf(),
        });
    }

    if path.is_absolute() {
        return Err(StoreError::InvalidRelativePath {
            field,
            value: path.to_path_buf(),
        });
    }

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                return Err(StoreError::InvalidRelativePath {
                    field,
                    value: path.to_path_buf(),
                });
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

fn to_relative_path(
    session_dir: &Path,
    path: &Path,
    field: &'static str,
) -> Result<PathBuf, StoreError> {
    let relative = if path.is_absolute() {
        path.strip_prefix(session_dir)
            .map(PathBuf::from)
            .map_err(|_| StoreError::PathOutsideSession {
                session_dir: session_dir.to_path_buf(),
                path: path.to_path_buf(),
            })?
    } else {
        path.to_path_buf()
    };

    validate_relative_path(field, &relative)?;
    Ok(relative)
}

fn create_dir_all_safe(session_dir: &Path, relative: &Path) -> Result<(), StoreError> {
    if relative.as_os_str().is_empty() {
        return Ok(());
    }

    validate_relative_path("dir", relative)?;

    let mut current = session_dir.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };

        current.push(part);

        match fs::symlink_metadata(&current) {
            Ok(md) => {
                if md.file_type().is_symlink() {
                    return Err(StoreError::SymlinkRefused { path: current });
                }
                if !md.is_dir() {
                    return Err(StoreError::Io {
                        path: current,
                        source: io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                    });
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|source| StoreError::Io {
                    path: current.clone(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: current,
                    source,
                })
            }
        }
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic_in_session(
    session_dir: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(session_dir).map_err(|source| StoreError::Io {
        path: session_dir.to_path_buf(),
        source,
    })?;

    let relative = to_relative_path(session_dir, path, "path")?;
    let parent_rel = relative.parent().unwrap_or_else(|| Path::new(""));
    create_dir_all_safe(session_dir, parent_rel)?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".proteus.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
