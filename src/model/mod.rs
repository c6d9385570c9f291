// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Nodes and relations are identified by a scene-assigned [`RenderId`] and refer back to backend
//! records through [`RecordId`]s.

pub mod geometry;
pub mod ids;
pub mod node;
pub mod relation;

pub use geometry::{Point, Rect, ResizeDirection, Size};
pub use ids::{
    parse_relation_uuid, DiagramId, Id, IdError, RecordId, RenderId, UNKNOWN_RELATION_UUID,
};
pub use node::{NodeEntity, NodeInfo, NodeRef, Shape};
pub use relation::{
    Anchor, Anchors, BackendRelation, RelationEntity, RelationModeType, Terminal, Vertices,
};
