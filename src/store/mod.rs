// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persisted diagram format.
//!
//! Only normal and visual relations are written; faint relations exist only while relation mode
//! is on. Relations refer to their endpoints by `{uuid, index}`, which is resolved against the
//! restored nodes on load.

mod saver;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::DiagramGraph;
use crate::model::node::node_key;
use crate::model::{
    parse_relation_uuid, NodeInfo, NodeRef, Point, RecordId, RelationModeType, RenderId, Shape,
    Size, Terminal, Vertices, UNKNOWN_RELATION_UUID,
};

pub use saver::DiagramSaver;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid diagram json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SerializedRef {
    pub uuid: String,
    pub index: u32,
}

impl SerializedRef {
    fn key(&self) -> String {
        node_key(&self.uuid, self.index)
    }
}

impl From<&NodeRef> for SerializedRef {
    fn from(reference: &NodeRef) -> Self {
        Self {
            uuid: reference.uuid.to_string(),
            index: reference.index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNode {
    pub label: String,
    #[serde(rename = "ref")]
    pub reference: SerializedRef,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default)]
    pub shape: Shape,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SerializedPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SerializedRelation {
    /// Backend id, or `"unknown"` for a relation not saved to the backend yet.
    pub uuid: String,
    pub from: SerializedRef,
    pub to: SerializedRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<SerializedPoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SerializedDiagram {
    #[serde(default)]
    pub nodes: Vec<SerializedNode>,
    #[serde(default)]
    pub relations: Vec<SerializedRelation>,
}

impl SerializedDiagram {
    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

/// What [`load_diagram`] had to leave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub nodes: usize,
    pub relations: usize,
    /// Nodes whose uuid is not a valid record id.
    pub dropped_nodes: usize,
    /// Relations whose endpoints did not resolve to a restored node.
    pub dropped_relations: usize,
}

/// JSON schema of [`SerializedDiagram`].
pub fn diagram_schema() -> Result<serde_json::Value, StoreError> {
    Ok(serde_json::to_value(schemars::schema_for!(SerializedDiagram))?)
}

/// Serializes the normal and visual relations of `graph` along with every node.
pub fn save_diagram(graph: &DiagramGraph) -> SerializedDiagram {
    let nodes = graph
        .nodes()
        .ids()
        .into_iter()
        .filter_map(|id| {
            let node = graph.node(id)?;
            let rect = graph.scene().bbox(id)?;
            Some(SerializedNode {
                label: node.label().to_owned(),
                reference: SerializedRef::from(node.reference()),
                name: node.name().to_owned(),
                color: Some(node.color().to_owned()),
                border_color: Some(node.border_color().to_owned()),
                shape: node.shape(),
                x: rect.origin.x,
                y: rect.origin.y,
                width: Some(rect.size.width),
                height: Some(rect.size.height),
            })
        })
        .collect();

    let mut relation_ids = RelationModeType::ALL
        .into_iter()
        .filter(|mode| mode.is_persisted())
        .flat_map(|mode| graph.relations().map(mode).ids())
        .collect::<Vec<_>>();
    relation_ids.sort_unstable();

    let relations = relation_ids
        .into_iter()
        .filter_map(|id| {
            let relation = graph.relation(id)?;
            let (source, target) = relation.endpoints()?;
            let from = graph.node(source)?.reference();
            let to = graph.node(target)?.reference();
            Some(SerializedRelation {
                uuid: relation
                    .uuid()
                    .map_or_else(|| UNKNOWN_RELATION_UUID.to_owned(), ToString::to_string),
                from: from.into(),
                to: to.into(),
                label: relation.label().map(str::to_owned),
                vertices: graph
                    .scene()
                    .vertices(id)
                    .unwrap_or_default()
                    .iter()
                    .map(|p| SerializedPoint { x: p.x, y: p.y })
                    .collect(),
            })
        })
        .collect();

    SerializedDiagram { nodes, relations }
}

/// Restores a serialized diagram into `graph`, which is expected to be empty.
///
/// Nodes are restored first; relations whose endpoints cannot be resolved are skipped.
pub fn load_diagram(graph: &mut DiagramGraph, diagram: &SerializedDiagram) -> LoadReport {
    let mut report = LoadReport::default();
    let mut lookup: HashMap<String, RenderId> = HashMap::with_capacity(diagram.nodes.len());

    for node in &diagram.nodes {
        let uuid = match RecordId::new(&node.reference.uuid) {
            Ok(uuid) => uuid,
            Err(err) => {
                warn!(uuid = %node.reference.uuid, error = %err, "skipping node with invalid uuid");
                report.dropped_nodes += 1;
                continue;
            }
        };
        let mut info = NodeInfo::new(uuid, node.label.as_str(), Point::new(node.x, node.y))
            .with_name(node.name.clone())
            .with_shape(node.shape);
        info.color = node.color.clone();
        info.border_color = node.border_color.clone();
        if let (Some(width), Some(height)) = (node.width, node.height) {
            info.size = Some(Size::new(width, height));
        }

        let id = graph.spawn_node(&info, None, Some(node.reference.index));
        if lookup.insert(node.reference.key(), id).is_some() {
            warn!(key = %node.reference.key(), "duplicate node reference; later node wins");
        }
        report.nodes += 1;
    }

    for relation in &diagram.relations {
        let endpoints = (
            lookup.get(&relation.from.key()).copied(),
            lookup.get(&relation.to.key()).copied(),
        );
        let (Some(source), Some(target)) = endpoints else {
            warn!(
                uuid = %relation.uuid,
                from = %relation.from.key(),
                to = %relation.to.key(),
                "dropping relation with unresolved endpoint"
            );
            report.dropped_relations += 1;
            continue;
        };
        let id = graph.new_relation(
            Terminal::Node(source),
            Terminal::Node(target),
            RelationModeType::Normal,
            relation.label.as_deref(),
            parse_relation_uuid(&relation.uuid),
        );
        if !relation.vertices.is_empty() {
            let vertices: Vertices = relation
                .vertices
                .iter()
                .map(|p| Point::new(p.x, p.y))
                .collect();
            graph.scene_mut().set_vertices(id, vertices);
        }
        report.relations += 1;
    }

    debug!(
        nodes = report.nodes,
        relations = report.relations,
        dropped = report.dropped_relations,
        "diagram loaded"
    );
    report
}
