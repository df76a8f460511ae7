// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus: draft/history engine for user-story and bug-report sessions.
//!
//! The crate is split into a stateless text pipeline (`format` → `render`) and a stateful
//! persistence pipeline (`store` → `editor`) over the shared record `model`.

pub mod editor;
pub mod format;
pub mod model;
pub mod query;
pub mod render;
pub mod store;
