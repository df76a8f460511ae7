// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

/// Selects which template the formatter applies and how the free-text fields are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Story,
    Bug,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Story, RecordKind::Bug];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Bug => "bug",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ParseRecordKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "story" => Ok(Self::Story),
            "bug" => Ok(Self::Bug),
            other => Err(ParseRecordKindError {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecordKindError {
    pub value: String,
}

impl fmt::Display for ParseRecordKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown record kind: {:?} (expected story|bug)", self.value)
    }
}

impl std::error::Error for ParseRecordKindError {}

/// A single editable record.
///
/// For a story, `role`/`action`/`benefit` are the "As a / I want / So that" triad and
/// `background` is free context. For a bug they are read as title/scenario/expected result,
/// with `background` carrying the actual result. `action` (bug), `background` and
/// `additional_info` may contain rich-text markup; everything else is plain text.
///
/// The criteria/technical-info lists keep insertion order and may contain blank entries;
/// blanks are filtered at render time, never at storage time, so an editing surface always
/// has at least one input row to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    role: String,
    action: String,
    benefit: String,
    background: String,
    additional_info: String,
    acceptance_criteria: Vec<String>,
    technical_info: Vec<String>,
}

impl Record {
    /// An empty record of the given kind, with single blank rows in both lists.
    pub fn empty(kind: RecordKind) -> Self {
        Self {
            kind,
            role: String::new(),
            action: String::new(),
            benefit: String::new(),
            background: String::new(),
            additional_info: String::new(),
            acceptance_criteria: vec![String::new()],
            technical_info: vec![String::new()],
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.role = role.into();
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = action.into();
    }

    pub fn benefit(&self) -> &str {
        &self.benefit
    }

    pub fn set_benefit(&mut self, benefit: impl Into<String>) {
        self.benefit = benefit.into();
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn set_background(&mut self, background: impl Into<String>) {
        self.background = background.into();
    }

    pub fn additional_info(&self) -> &str {
        &self.additional_info
    }

    pub fn set_additional_info(&mut self, additional_info: impl Into<String>) {
        self.additional_info = additional_info.into();
    }

    pub fn acceptance_criteria(&self) -> &[String] {
        &self.acceptance_criteria
    }

    pub fn acceptance_criteria_mut(&mut self) -> &mut Vec<String> {
        &mut self.acceptance_criteria
    }

    pub fn technical_info(&self) -> &[String] {
        &self.technical_info
    }

    pub fn technical_info_mut(&mut self) -> &mut Vec<String> {
        &mut self.technical_info
    }

    /// Restores the "at least one input row" invariant after list edits.
    pub fn ensure_list_rows(&mut self) {
        if self.acceptance_criteria.is_empty() {
            self.acceptance_criteria.push(String::new());
        }
        if self.technical_info.is_empty() {
            self.technical_info.push(String::new());
        }
    }

    /// Whether any user-entered field is non-blank after trimming.
    ///
    /// `additional_info` is deliberately not part of this check: a record carrying only
    /// supplemental text is still treated as blank for autosave purposes.
    pub fn has_content(&self) -> bool {
        !self.role.trim().is_empty()
            || !self.action.trim().is_empty()
            || !self.benefit.trim().is_empty()
            || !self.background.trim().is_empty()
            || self.acceptance_criteria.iter().any(|c| !c.trim().is_empty())
            || self.technical_info.iter().any(|t| !t.trim().is_empty())
    }
}
