// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout algorithms for diagrams.
//!
//! Node placement is left to the user; the engine only separates relations that would otherwise
//! be drawn on top of each other.

pub mod siblings;

pub use siblings::{arrange_siblings, candidate_vertex, SiblingParams};
