// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::geometry::{Point, Size};
use super::ids::{RecordId, RenderId};
use super::relation::BackendRelation;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    #[serde(alias = "rect")]
    Rectangle,
    Circle,
    Diamond,
    Cylinder,
    Text,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Diamond => "diamond",
            Self::Cylinder => "cylinder",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The backend record a node stands for. Several nodes may show the same record; `index`
/// disambiguates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    pub uuid: RecordId,
    pub index: u32,
}

impl NodeRef {
    pub fn new(uuid: RecordId, index: u32) -> Self {
        Self { uuid, index }
    }
}

/// Lookup key used while restoring serialized diagrams (`<uuid>-<index>`).
pub(crate) fn node_key(uuid: &str, index: u32) -> String {
    let mut buf = itoa::Buffer::new();
    let index = buf.format(index);
    let mut key = String::with_capacity(uuid.len() + 1 + index.len());
    key.push_str(uuid);
    key.push('-');
    key.push_str(index);
    key
}

/// Everything needed to place a new node on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub uuid: RecordId,
    pub label: SmolStr,
    pub name: String,
    pub color: Option<String>,
    pub border_color: Option<String>,
    pub shape: Shape,
    pub position: Point,
    pub size: Option<Size>,
    /// Backend relations touching this record, used to wire the node up when it is created.
    pub relations: Vec<BackendRelation>,
}

impl NodeInfo {
    pub fn new(uuid: RecordId, label: impl Into<SmolStr>, position: Point) -> Self {
        Self {
            uuid,
            label: label.into(),
            name: String::new(),
            color: None,
            border_color: None,
            shape: Shape::default(),
            position,
            size: None,
            relations: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_relations(mut self, relations: Vec<BackendRelation>) -> Self {
        self.relations = relations;
        self
    }
}

/// A node placed in the diagram.
///
/// Geometry lives in the scene cell with the same [`RenderId`]; the entity carries identity,
/// presentation data, and the ids of the relations attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEntity {
    render_id: RenderId,
    reference: NodeRef,
    shape: Shape,
    label: SmolStr,
    name: String,
    color: String,
    border_color: String,
    label_color: Option<String>,
    incoming: BTreeSet<RenderId>,
    outgoing: BTreeSet<RenderId>,
}

impl NodeEntity {
    pub(crate) fn new(
        render_id: RenderId,
        reference: NodeRef,
        shape: Shape,
        label: SmolStr,
        name: String,
        color: String,
        border_color: String,
    ) -> Self {
        Self {
            render_id,
            reference,
            shape,
            label,
            name,
            color,
            border_color,
            label_color: None,
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
        }
    }

    pub fn render_id(&self) -> RenderId {
        self.render_id
    }

    pub fn reference(&self) -> &NodeRef {
        &self.reference
    }

    pub fn uuid(&self) -> &RecordId {
        &self.reference.uuid
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn border_color(&self) -> &str {
        &self.border_color
    }

    /// Label color forced at creation, bypassing the contrast rule.
    pub fn label_color(&self) -> Option<&str> {
        self.label_color.as_deref()
    }

    pub fn incoming_relations(&self) -> &BTreeSet<RenderId> {
        &self.incoming
    }

    pub fn outgoing_relations(&self) -> &BTreeSet<RenderId> {
        &self.outgoing
    }

    /// Ids of every relation attached to this node, in either direction.
    pub fn relation_ids(&self) -> BTreeSet<RenderId> {
        self.incoming.union(&self.outgoing).copied().collect()
    }

    pub(crate) fn set_reference_index(&mut self, index: u32) {
        self.reference.index = index;
    }

    pub(crate) fn set_label_color(&mut self, label_color: Option<String>) {
        self.label_color = label_color;
    }

    pub(crate) fn set_colors(&mut self, color: String, border_color: String) {
        self.color = color;
        self.border_color = border_color;
    }

    pub(crate) fn incoming_mut(&mut self) -> &mut BTreeSet<RenderId> {
        &mut self.incoming
    }

    pub(crate) fn outgoing_mut(&mut self) -> &mut BTreeSet<RenderId> {
        &mut self.outgoing
    }
}
