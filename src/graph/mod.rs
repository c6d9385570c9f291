// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Node and relation controllers.
//!
//! [`DiagramGraph`] owns the scene and the registries and is the only place that mutates them
//! together. Removal is soft: the entity and its cell are handed back as a detached value so
//! that undo can re-attach the very same instance.

mod nodes;
mod relations;

use std::collections::BTreeSet;

use smallvec::smallvec;

use crate::config::EditorConfig;
use crate::layout::{self, SiblingParams};
use crate::model::{NodeEntity, Point, RelationEntity, RenderId, Vertices};
use crate::registry::{NodesMap, RelationRegistries};
use crate::scene::{Cell, Scene};

/// A node taken out of the diagram, ready to be re-attached unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedNode {
    entity: NodeEntity,
    cell: Cell,
}

impl DetachedNode {
    pub fn render_id(&self) -> RenderId {
        self.entity.render_id()
    }

    pub fn entity(&self) -> &NodeEntity {
        &self.entity
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetachedRelation {
    entity: RelationEntity,
    cell: Cell,
}

impl DetachedRelation {
    pub fn render_id(&self) -> RenderId {
        self.entity.render_id()
    }

    pub fn entity(&self) -> &RelationEntity {
        &self.entity
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }
}

/// Outcome of settling a relation once relation mode is off.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    /// Already normal.
    Unchanged,
    /// A visual relation with both ends on nodes, now normal.
    Promoted,
    /// A dangling visual relation moved back onto its origin, now normal.
    Reset,
    /// A faint relation, or a dangling visual relation with no usable origin.
    Removed(DetachedRelation),
}

/// A removed node together with the relations its removal cascaded to.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    node: DetachedNode,
    relations: Vec<DetachedRelation>,
}

impl RemovedNode {
    pub fn render_id(&self) -> RenderId {
        self.node.render_id()
    }

    pub fn node(&self) -> &DetachedNode {
        &self.node
    }

    pub fn relations(&self) -> &[DetachedRelation] {
        &self.relations
    }
}

/// Vertices a sibling layout pass overwrote, in the order they were overwritten.
pub type BendLog = Vec<(RenderId, Vertices)>;

#[derive(Debug, Default)]
pub struct DiagramGraph {
    scene: Scene,
    nodes: NodesMap,
    relations: RelationRegistries,
    config: EditorConfig,
}

impl DiagramGraph {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            scene: Scene::new(),
            nodes: NodesMap::default(),
            relations: RelationRegistries::default(),
            config,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct access for the renderer, which writes back geometry changed by manipulation.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn nodes(&self) -> &NodesMap {
        &self.nodes
    }

    pub fn relations(&self) -> &RelationRegistries {
        &self.relations
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn node(&self, id: RenderId) -> Option<&NodeEntity> {
        self.nodes.get(id)
    }

    pub fn relation(&self, id: RenderId) -> Option<&RelationEntity> {
        self.relations.get(id)
    }

    /// Removes every node and relation. Render ids are not recycled.
    pub fn clear(&mut self) {
        for id in self.relations.ids() {
            self.remove_existing_relation(id);
        }
        for id in self.nodes.ids() {
            self.remove_existing_node(id);
        }
        self.scene.clear();
    }

    fn sibling_params(&self) -> SiblingParams {
        SiblingParams {
            gap: self.config.sibling_gap,
            min_distance: self.config.sibling_min_distance,
        }
    }

    /// Relations connecting `a` and `b` in either direction, ascending by render id.
    pub fn relations_between(&self, a: RenderId, b: RenderId) -> Vec<RenderId> {
        let Some(node) = self.nodes.get(a) else {
            return Vec::new();
        };
        node.relation_ids()
            .into_iter()
            .filter(|id| {
                self.relations
                    .get(*id)
                    .is_some_and(|relation| relation.connects(a, b))
            })
            .collect()
    }

    /// Separates the relations between `a` and `b`. Returns the vertices it replaced.
    pub fn arrange_siblings(&mut self, a: RenderId, b: RenderId, rearrange_all: bool) -> BendLog {
        if a == b {
            return BendLog::new();
        }
        let (Some(source), Some(target)) = (self.scene.center(a), self.scene.center(b)) else {
            return BendLog::new();
        };
        let ids = self.relations_between(a, b);
        let current: Vec<Vertices> = ids
            .iter()
            .map(|id| {
                self.scene
                    .vertices(*id)
                    .map(Vertices::from_slice)
                    .unwrap_or_default()
            })
            .collect();
        let slices: Vec<&[Point]> = current.iter().map(|v| v.as_slice()).collect();
        let placements =
            layout::arrange_siblings(source, target, &slices, rearrange_all, self.sibling_params());

        let mut log = BendLog::new();
        for ((id, previous), placement) in ids.into_iter().zip(current).zip(placements) {
            if let Some(vertex) = placement {
                self.scene.set_vertices(id, smallvec![vertex]);
                log.push((id, previous));
            }
        }
        log
    }

    pub fn arrange_siblings_of_relation(&mut self, id: RenderId, rearrange_all: bool) -> BendLog {
        match self.relations.get(id).and_then(RelationEntity::endpoints) {
            Some((a, b)) => self.arrange_siblings(a, b, rearrange_all),
            None => BendLog::new(),
        }
    }

    /// Runs the sibling layout for every pair `node` is part of.
    pub fn arrange_siblings_of_node(&mut self, node: RenderId, rearrange_all: bool) -> BendLog {
        let Some(entity) = self.nodes.get(node) else {
            return BendLog::new();
        };
        let neighbours: BTreeSet<RenderId> = entity
            .relation_ids()
            .into_iter()
            .filter_map(|id| self.relations.get(id).and_then(RelationEntity::endpoints))
            .map(|(s, t)| if s == node { t } else { s })
            .filter(|other| *other != node)
            .collect();
        neighbours
            .into_iter()
            .flat_map(|other| self.arrange_siblings(node, other, rearrange_all))
            .collect()
    }

    /// Puts back the vertices recorded by a layout pass.
    pub fn restore_bends(&mut self, log: BendLog) {
        for (id, vertices) in log.into_iter().rev() {
            self.scene.set_vertices(id, vertices);
        }
    }
}

#[cfg(test)]
mod tests;
