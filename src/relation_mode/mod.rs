// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Relation mode.
//!
//! While relation mode is on, every backend relation between nodes on the canvas is visible:
//! relations already in the diagram stay normal, backend relations not drawn yet appear faint,
//! and diagram relations without a backend counterpart are marked visual. Leaving the mode
//! drops the faint relations and turns visual relations into normal ones.

mod draft;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::backend::{Backend, BackendError};
use crate::graph::{DiagramGraph, Settled};
use crate::model::{BackendRelation, RecordId, RelationModeType, RenderId, Terminal};

pub use draft::{DraftOutcome, DraftState, RelationDraft};

#[derive(Debug, thiserror::Error)]
pub enum RelationModeError {
    #[error("relation mode is already enabled")]
    AlreadyEnabled,
    #[error("relation mode is not enabled")]
    NotEnabled,
    #[error("failed to fetch relations of {uuid}: {source}")]
    Backend {
        uuid: RecordId,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnableReport {
    /// Diagram relations confirmed by the backend.
    pub present: usize,
    /// Diagram relations without a backend counterpart.
    pub visual: usize,
    /// Backend relations added as faint relations.
    pub faint: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisableReport {
    pub removed_faint: usize,
    /// Visual relations kept as normal relations.
    pub promoted: usize,
    /// Visual relations put back on the endpoints they had when the mode was entered.
    pub reset: usize,
    /// Visual relations removed because they had no endpoints to go back to.
    pub dropped: usize,
}

/// Relation-mode switch plus the drawing gesture that only exists while it is on.
///
/// Callers must not start a toggle while another one is still awaiting the backend.
#[derive(Debug, Default)]
pub struct RelationMode {
    enabled: bool,
    draft: RelationDraft,
}

impl RelationMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn draft(&self) -> &RelationDraft {
        &self.draft
    }

    pub(crate) fn draft_mut(&mut self) -> &mut RelationDraft {
        &mut self.draft
    }

    /// Enters relation mode. All backend reads complete before the diagram is touched, so a
    /// failed read leaves the diagram as it was.
    pub async fn enable(
        &mut self,
        graph: &mut DiagramGraph,
        backend: &dyn Backend,
    ) -> Result<EnableReport, RelationModeError> {
        if self.enabled {
            return Err(RelationModeError::AlreadyEnabled);
        }
        let relations = fetch_backend_relations(graph, backend).await?;
        let report = apply_backend_relations(graph, &relations);
        self.enabled = true;
        info!(
            present = report.present,
            visual = report.visual,
            faint = report.faint,
            "relation mode enabled"
        );
        Ok(report)
    }

    pub fn disable(&mut self, graph: &mut DiagramGraph) -> Result<DisableReport, RelationModeError> {
        if !self.enabled {
            return Err(RelationModeError::NotEnabled);
        }
        self.draft.cancel(graph);
        let report = settle_relations(graph);
        self.enabled = false;
        info!(
            removed_faint = report.removed_faint,
            promoted = report.promoted,
            reset = report.reset,
            dropped = report.dropped,
            "relation mode disabled"
        );
        Ok(report)
    }
}

/// Fetches the backend relations of every record on the canvas, one request per uuid, merged
/// by relation id.
pub async fn fetch_backend_relations(
    graph: &DiagramGraph,
    backend: &dyn Backend,
) -> Result<BTreeMap<RecordId, BackendRelation>, RelationModeError> {
    let uuids = graph.nodes().uuids().cloned().collect::<BTreeSet<_>>();
    debug!(records = uuids.len(), "fetching backend relations");
    let responses = try_join_all(uuids.iter().map(|uuid| async move {
        backend
            .relations_of(uuid)
            .await
            .map_err(|source| RelationModeError::Backend {
                uuid: uuid.clone(),
                source,
            })
    }))
    .await?;

    let mut merged = BTreeMap::new();
    for relation in responses.into_iter().flatten() {
        merged
            .entry(relation.relation_id.clone())
            .or_insert(relation);
    }
    Ok(merged)
}

type PresentKey = (RecordId, RenderId, RenderId);

/// The backend relation a diagram relation stands for, if the backend knows it with the same
/// direction.
fn backend_counterpart(
    graph: &DiagramGraph,
    relations: &BTreeMap<RecordId, BackendRelation>,
    id: RenderId,
) -> Option<PresentKey> {
    let relation = graph.relation(id)?;
    let uuid = relation.uuid()?;
    let (source, target) = relation.endpoints()?;
    let backend = relations.get(uuid)?;
    let from = graph.node(source)?.uuid();
    let to = graph.node(target)?.uuid();
    (&backend.from == from && &backend.to == to).then(|| (uuid.clone(), source, target))
}

/// Classifies the diagram relations against `relations` and adds the missing ones as faint.
pub fn apply_backend_relations(
    graph: &mut DiagramGraph,
    relations: &BTreeMap<RecordId, BackendRelation>,
) -> EnableReport {
    let mut report = EnableReport::default();
    let mut present: HashSet<PresentKey> = HashSet::new();

    let mut drawn = graph.relations().map(RelationModeType::Normal).ids();
    drawn.extend(graph.relations().map(RelationModeType::Visual).ids());
    drawn.sort_unstable();
    for id in drawn {
        match backend_counterpart(graph, relations, id) {
            Some(key) => {
                present.insert(key);
                graph.set_relation_mode(id, RelationModeType::Normal);
                report.present += 1;
            }
            None => {
                let Some(origin) = graph.relation(id).map(|r| (r.source(), r.target())) else {
                    continue;
                };
                graph.set_relation_mode(id, RelationModeType::Visual);
                graph.set_relation_origin(id, Some(origin));
                report.visual += 1;
            }
        }
    }

    for node in graph.nodes().ids() {
        let Some(uuid) = graph.node(node).map(|n| n.uuid().clone()) else {
            continue;
        };
        let mut added = false;
        for relation in relations.values().filter(|r| r.from == uuid) {
            for target in graph.nodes().ids_by_uuid(&relation.to) {
                if target == node {
                    continue;
                }
                let key = (relation.relation_id.clone(), node, target);
                if present.contains(&key) {
                    continue;
                }
                let label = (!relation.kind.is_empty()).then_some(relation.kind.as_str());
                graph.new_relation(
                    Terminal::Node(node),
                    Terminal::Node(target),
                    RelationModeType::Faint,
                    label,
                    Some(relation.relation_id.clone()),
                );
                present.insert(key);
                report.faint += 1;
                added = true;
            }
        }
        if added {
            graph.arrange_siblings_of_node(node, false);
        }
    }
    report
}

/// Removes faint relations and turns visual relations back into normal ones.
pub fn settle_relations(graph: &mut DiagramGraph) -> DisableReport {
    let mut report = DisableReport::default();

    let mut transient = graph.relations().map(RelationModeType::Faint).ids();
    transient.extend(graph.relations().map(RelationModeType::Visual).ids());
    for id in transient {
        match graph.settle_relation(id) {
            Some(Settled::Removed(detached)) => {
                if detached.entity().mode() == RelationModeType::Faint {
                    report.removed_faint += 1;
                } else {
                    report.dropped += 1;
                }
            }
            Some(Settled::Promoted) => {
                report.promoted += 1;
                graph.arrange_siblings_of_relation(id, false);
            }
            Some(Settled::Reset) => {
                report.reset += 1;
                graph.arrange_siblings_of_relation(id, false);
            }
            Some(Settled::Unchanged) | None => {}
        }
    }
    report
}

#[cfg(test)]
mod tests;
