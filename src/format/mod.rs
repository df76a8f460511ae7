// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canonical text formatting.
//!
//! `normalize_rich_text` converts rich-text fragments into canonical markdown fragments;
//! `format_record` assembles a whole record into one deterministic markdown document.
//! Both are pure functions and never fail.

pub mod record;
pub mod richtext;

pub use record::format_record;
pub use richtext::normalize_rich_text;
