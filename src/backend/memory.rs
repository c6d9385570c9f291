// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Backend, BackendError, NodeRecord};
use crate::model::{BackendRelation, DiagramId, RecordId};
use crate::store::SerializedDiagram;

/// In-process backend holding its records in memory. Saved diagrams are kept in order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    nodes: HashMap<RecordId, NodeRecord>,
    relations: Vec<BackendRelation>,
    unreachable: HashSet<RecordId>,
    saved: Mutex<Vec<(DiagramId, SerializedDiagram)>>,
    relation_requests: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: NodeRecord) -> Self {
        self.nodes.insert(node.node_id.clone(), node);
        self
    }

    pub fn with_relation(mut self, relation: BackendRelation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Makes every request about `uuid` fail.
    pub fn with_unreachable(mut self, uuid: RecordId) -> Self {
        self.unreachable.insert(uuid);
        self
    }

    pub async fn saved(&self) -> Vec<(DiagramId, SerializedDiagram)> {
        self.saved.lock().await.clone()
    }

    /// Number of `relations_of` calls served so far.
    pub fn relation_requests(&self) -> usize {
        self.relation_requests.load(Ordering::Relaxed)
    }

    fn check_reachable(&self, uuid: &RecordId) -> Result<(), BackendError> {
        if self.unreachable.contains(uuid) {
            return Err(BackendError::Unavailable(format!("node {uuid}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn relations_of(&self, uuid: &RecordId) -> Result<Vec<BackendRelation>, BackendError> {
        self.relation_requests.fetch_add(1, Ordering::Relaxed);
        self.check_reachable(uuid)?;
        Ok(self
            .relations
            .iter()
            .filter(|relation| relation.touches(uuid))
            .cloned()
            .collect())
    }

    async fn node(&self, uuid: &RecordId) -> Result<NodeRecord, BackendError> {
        self.check_reachable(uuid)?;
        self.nodes
            .get(uuid)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(uuid.clone()))
    }

    async fn put_diagram(
        &self,
        id: &DiagramId,
        diagram: &SerializedDiagram,
    ) -> Result<(), BackendError> {
        self.saved.lock().await.push((id.clone(), diagram.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBackend;
    use crate::backend::{Backend, BackendError, NodeRecord};
    use crate::model::{BackendRelation, RecordId};

    fn uuid(raw: &str) -> RecordId {
        RecordId::new(raw).expect("uuid")
    }

    #[tokio::test]
    async fn serves_relations_touching_a_record() {
        let backend = MemoryBackend::new()
            .with_node(NodeRecord::new(uuid("a"), "A"))
            .with_relation(BackendRelation {
                relation_id: uuid("r1"),
                from: uuid("a"),
                to: uuid("b"),
                kind: String::new(),
            });

        assert_eq!(backend.relations_of(&uuid("b")).await.expect("b").len(), 1);
        assert!(backend.relations_of(&uuid("c")).await.expect("c").is_empty());
        assert_eq!(backend.relation_requests(), 2);
        assert_eq!(backend.node(&uuid("a")).await.expect("a").label, "A");
        assert!(matches!(
            backend.node(&uuid("zzz")).await,
            Err(BackendError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_records_fail() {
        let backend = MemoryBackend::new().with_unreachable(uuid("a"));
        assert!(matches!(
            backend.relations_of(&uuid("a")).await,
            Err(BackendError::Unavailable(_))
        ));
    }
}
