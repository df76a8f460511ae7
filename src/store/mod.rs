// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for drafts and history on disk.
//!
//! The store module reads/writes the session folder format (per-kind draft slot files plus a
//! capped history directory) used by both the editor and the CLI.

pub mod session_store;

pub use session_store::{Draft, HistoryEntry, SessionStore, StoreError, WriteDurability};
