// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.
//! Galene: the state engine behind a diagram editor for graph-database records.
//!
//! Nodes and relations placed on a canvas are kept consistent with the rendering surface, an
//! undo/redo history, and a relation mode that compares the diagram with the relations stored in
//! the backend. [`handler::DiagramHandler`] is the entry point.

pub mod backend;
pub mod commands;
pub mod config;
pub mod graph;
pub mod handler;
pub mod layout;
pub mod model;
pub mod registry;
pub mod relation_mode;
pub mod scene;
pub mod store;
pub mod style;

pub use handler::DiagramHandler;
