// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use smol_str::SmolStr;

use super::geometry::Point;
use super::ids::{RecordId, RenderId};

/// Bend points of a relation, in drawing order.
pub type Vertices = SmallVec<[Point; 2]>;

/// How a relation participates in relation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RelationModeType {
    /// Present in the diagram and persisted with it.
    #[default]
    Normal,
    /// Present in the backend only; shown dimmed while relation mode is on.
    Faint,
    /// Drawn ad hoc in relation mode, with no confirmed backend counterpart.
    Visual,
}

impl RelationModeType {
    pub const ALL: [RelationModeType; 3] = [Self::Normal, Self::Faint, Self::Visual];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Faint => "faint",
            Self::Visual => "visual",
        }
    }

    /// Whether relations in this mode belong to the persisted diagram.
    pub fn is_persisted(self) -> bool {
        !matches!(self, Self::Faint)
    }
}

impl fmt::Display for RelationModeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a relation: either attached to a node or left dangling on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Terminal {
    Node(RenderId),
    Point(Point),
}

impl Terminal {
    pub fn node(self) -> Option<RenderId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Point(_) => None,
        }
    }
}

/// Attachment hint for a relation end, relative to the node's bounding box (`0.0..=1.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchors {
    pub source: Option<Anchor>,
    pub target: Option<Anchor>,
}

impl Anchors {
    pub(crate) fn keys(&self) -> impl Iterator<Item = String> + '_ {
        let source = self
            .source
            .map(|a| format!("source:{}@{}", a.dx, a.dy));
        let target = self
            .target
            .map(|a| format!("target:{}@{}", a.dx, a.dy));
        source.into_iter().chain(target)
    }
}

/// A relation between two records as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendRelation {
    pub relation_id: RecordId,
    pub from: RecordId,
    pub to: RecordId,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl BackendRelation {
    pub fn touches(&self, uuid: &RecordId) -> bool {
        &self.from == uuid || &self.to == uuid
    }

    /// The record on the other end, seen from `uuid`.
    pub fn counterpart(&self, uuid: &RecordId) -> Option<&RecordId> {
        if &self.from == uuid {
            Some(&self.to)
        } else if &self.to == uuid {
            Some(&self.from)
        } else {
            None
        }
    }
}

/// A directed relation placed in the diagram.
///
/// Vertices and anchors live in the scene cell; the entity carries identity, endpoints, and
/// its relation-mode classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationEntity {
    render_id: RenderId,
    uuid: Option<RecordId>,
    source: Terminal,
    target: Terminal,
    label: Option<SmolStr>,
    mode: RelationModeType,
    origin: Option<(Terminal, Terminal)>,
}

impl RelationEntity {
    pub(crate) fn new(
        render_id: RenderId,
        uuid: Option<RecordId>,
        source: Terminal,
        target: Terminal,
        label: Option<SmolStr>,
        mode: RelationModeType,
    ) -> Self {
        Self {
            render_id,
            uuid,
            source,
            target,
            label,
            mode,
            origin: None,
        }
    }

    pub fn render_id(&self) -> RenderId {
        self.render_id
    }

    /// Backend id; `None` until the relation has been saved.
    pub fn uuid(&self) -> Option<&RecordId> {
        self.uuid.as_ref()
    }

    pub fn source(&self) -> Terminal {
        self.source
    }

    pub fn target(&self) -> Terminal {
        self.target
    }

    /// Both endpoint node ids, when both ends are attached.
    pub fn endpoints(&self) -> Option<(RenderId, RenderId)> {
        Some((self.source.node()?, self.target.node()?))
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn mode(&self) -> RelationModeType {
        self.mode
    }

    /// Endpoints recorded when the relation was classified as visual.
    pub fn origin(&self) -> Option<(Terminal, Terminal)> {
        self.origin
    }

    /// Whether the relation connects `a` and `b`, in either direction.
    pub fn connects(&self, a: RenderId, b: RenderId) -> bool {
        match self.endpoints() {
            Some((s, t)) => (s == a && t == b) || (s == b && t == a),
            None => false,
        }
    }

    pub(crate) fn set_terminals(&mut self, source: Terminal, target: Terminal) {
        self.source = source;
        self.target = target;
    }

    pub(crate) fn set_label(&mut self, label: Option<SmolStr>) {
        self.label = label;
    }

    pub(crate) fn set_mode(&mut self, mode: RelationModeType) {
        self.mode = mode;
    }

    pub(crate) fn set_origin(&mut self, origin: Option<(Terminal, Terminal)>) {
        self.origin = origin;
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendRelation, RelationModeType};
    use crate::model::RecordId;

    #[test]
    fn backend_relation_uses_camel_case_wire_names() {
        let raw = r#"{"relationId":"r1","from":"a","to":"b","type":"OWNS"}"#;
        let relation: BackendRelation = serde_json::from_str(raw).expect("relation");
        assert_eq!(relation.relation_id.as_str(), "r1");
        assert_eq!(relation.kind, "OWNS");

        let a = RecordId::new("a").expect("a");
        let b = RecordId::new("b").expect("b");
        let c = RecordId::new("c").expect("c");
        assert_eq!(relation.counterpart(&a), Some(&b));
        assert_eq!(relation.counterpart(&b), Some(&a));
        assert_eq!(relation.counterpart(&c), None);
    }

    #[test]
    fn only_faint_relations_are_transient() {
        assert!(RelationModeType::Normal.is_persisted());
        assert!(RelationModeType::Visual.is_persisted());
        assert!(!RelationModeType::Faint.is_persisted());
    }
}
