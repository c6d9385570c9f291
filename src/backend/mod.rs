// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The backend collaborator: the graph database the diagram's records live in.

mod http;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{BackendRelation, DiagramId, NodeInfo, Point, RecordId};
use crate::store::SerializedDiagram;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("record {0} not found")]
    NotFound(RecordId),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A node record as stored in the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub node_id: RecordId,
    pub label: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl NodeRecord {
    pub fn new(node_id: RecordId, label: impl Into<String>) -> Self {
        Self {
            node_id,
            label: label.into(),
            name: String::new(),
            color: None,
            attributes: serde_json::Map::new(),
        }
    }

    /// Placement info for a new node showing this record at `position`.
    pub fn to_node_info(&self, position: Point) -> NodeInfo {
        let mut info = NodeInfo::new(self.node_id.clone(), self.label.as_str(), position)
            .with_name(self.name.clone());
        info.color = self.color.clone();
        info
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Every relation with `uuid` at either end.
    async fn relations_of(&self, uuid: &RecordId) -> Result<Vec<BackendRelation>, BackendError>;

    async fn node(&self, uuid: &RecordId) -> Result<NodeRecord, BackendError>;

    async fn put_diagram(
        &self,
        id: &DiagramId,
        diagram: &SerializedDiagram,
    ) -> Result<(), BackendError>;
}
