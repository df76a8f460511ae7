// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core record model.
//!
//! A record is the single editable unit: a user story or a bug report bound to a browser
//! session. Field meaning depends on the record kind.

pub mod ids;
pub mod record;

pub use ids::{HistoryEntryId, ParseHistoryEntryIdError, SessionId, SessionIdError};
pub use record::{ParseRecordKindError, Record, RecordKind};
