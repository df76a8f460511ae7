// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Display rendering for canonical markdown.
//!
//! The renderer turns the formatter's canonical markdown into structured, renderer-agnostic
//! display blocks. It is a restricted fixed-grammar pass, not a general markdown parser.

pub mod markdown;

pub use markdown::{render_markdown, DisplayBlock};
