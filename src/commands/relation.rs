// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use smol_str::SmolStr;
use tracing::debug;

use super::CommandContext;
use crate::graph::{BendLog, DetachedRelation, DiagramGraph, Settled};
use crate::model::{Anchors, Point, RecordId, RelationModeType, RenderId, Terminal, Vertices};

#[derive(Debug, Clone, PartialEq)]
enum RelationSlot {
    NotCreated,
    Live(RenderId),
    Detached(DetachedRelation),
}

impl RelationSlot {
    fn render_id(&self) -> Option<RenderId> {
        match self {
            Self::NotCreated => None,
            Self::Live(id) => Some(*id),
            Self::Detached(detached) => Some(detached.render_id()),
        }
    }

    /// Re-attaches a detached relation; a relation that can no longer be attached stays detached.
    ///
    /// Outside relation mode the relation is settled first, which may detach it again.
    fn reattach(&mut self, cx: &mut CommandContext<'_>) -> Option<RenderId> {
        let detached = match std::mem::replace(self, Self::NotCreated) {
            Self::Detached(detached) => detached,
            other => {
                *self = other;
                return None;
            }
        };
        let id = match cx.graph.add_existing_relation(detached) {
            Ok(id) => id,
            Err(detached) => {
                debug!(relation = %detached.render_id(), "relation endpoints gone; skipped");
                *self = Self::Detached(detached);
                return None;
            }
        };
        if !cx.relation_mode {
            if let Some(Settled::Removed(detached)) = cx.graph.settle_relation(id) {
                *self = Self::Detached(detached);
                return None;
            }
        }
        *self = Self::Live(id);
        Some(id)
    }

    fn detach(&mut self, graph: &mut DiagramGraph) {
        if let Self::Live(id) = *self {
            if let Some(detached) = graph.remove_existing_relation(id) {
                *self = Self::Detached(detached);
            }
        }
    }
}

/// Creates a relation between two nodes, typically the confirmed result of a drawing gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRelation {
    source: RenderId,
    target: RenderId,
    mode: RelationModeType,
    label: Option<SmolStr>,
    uuid: Option<RecordId>,
    slot: RelationSlot,
    bends: BendLog,
}

impl CreateRelation {
    pub fn new(source: RenderId, target: RenderId, mode: RelationModeType) -> Self {
        Self {
            source,
            target,
            mode,
            label: None,
            uuid: None,
            slot: RelationSlot::NotCreated,
            bends: BendLog::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<SmolStr>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_uuid(mut self, uuid: RecordId) -> Self {
        self.uuid = Some(uuid);
        self
    }

    pub fn uuid(&self) -> Option<&RecordId> {
        self.uuid.as_ref()
    }

    pub fn render_id(&self) -> Option<RenderId> {
        self.slot.render_id()
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        let id = match self.slot {
            RelationSlot::Live(_) => return,
            RelationSlot::Detached(_) => self.slot.reattach(cx),
            RelationSlot::NotCreated => {
                let nodes = cx.graph.nodes();
                if !(nodes.contains(self.source) && nodes.contains(self.target)) {
                    return;
                }
                let id = cx.graph.new_relation(
                    Terminal::Node(self.source),
                    Terminal::Node(self.target),
                    self.mode,
                    self.label.as_deref(),
                    self.uuid.clone(),
                );
                self.slot = RelationSlot::Live(id);
                Some(id)
            }
        };
        if let Some(id) = id {
            self.bends = cx.graph.arrange_siblings_of_relation(id, false);
        }
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        cx.graph.restore_bends(std::mem::take(&mut self.bends));
        self.slot.detach(cx.graph);
    }
}

/// Removes a visual relation. Normal and faint relations are structurally fixed and cannot be
/// removed this way.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveRelation {
    slot: RelationSlot,
}

impl RemoveRelation {
    pub fn new(graph: &DiagramGraph, relation: RenderId) -> Option<Self> {
        if graph.relations().mode_of(relation)? != RelationModeType::Visual {
            return None;
        }
        Some(Self {
            slot: RelationSlot::Live(relation),
        })
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        self.slot.detach(cx.graph);
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        self.slot.reattach(cx);
    }
}

fn geometry_keys(vertices: &[Point], anchors: &Anchors) -> BTreeSet<String> {
    vertices
        .iter()
        .map(|p| p.key())
        .chain(anchors.keys())
        .collect()
}

/// Records a bend edit (vertices and anchors) made on the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub struct BendRelation {
    relation: RenderId,
    start: (Vertices, Anchors),
    stop: Option<(Vertices, Anchors)>,
}

impl BendRelation {
    pub fn new(graph: &DiagramGraph, relation: RenderId) -> Option<Self> {
        let cell = graph.scene().get(relation)?;
        Some(Self {
            relation,
            start: (Vertices::from_slice(cell.vertices()), cell.anchors()),
            stop: None,
        })
    }

    pub fn update_stop(&mut self, graph: &DiagramGraph) {
        if let Some(cell) = graph.scene().get(self.relation) {
            self.stop = Some((Vertices::from_slice(cell.vertices()), cell.anchors()));
        }
    }

    /// Whether the vertex or anchor sets differ, compared as sets of coordinates.
    pub fn has_changed(&self) -> bool {
        let Some((vertices, anchors)) = &self.stop else {
            return false;
        };
        let before = geometry_keys(&self.start.0, &self.start.1);
        let after = geometry_keys(vertices, anchors);
        before.symmetric_difference(&after).next().is_some()
    }

    fn apply(&self, cx: &mut CommandContext<'_>, (vertices, anchors): &(Vertices, Anchors)) {
        let scene = cx.graph.scene_mut();
        scene.set_vertices(self.relation, vertices.clone());
        scene.set_anchors(self.relation, *anchors);
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        if let Some(stop) = &self.stop {
            self.apply(cx, stop);
        }
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        self.apply(cx, &self.start);
    }
}

/// Records an endpoint drag on a relation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectRelation {
    relation: RenderId,
    previous: (Terminal, Terminal),
    next: Option<(Terminal, Terminal)>,
    bends: BendLog,
}

impl ConnectRelation {
    pub fn new(graph: &DiagramGraph, relation: RenderId) -> Option<Self> {
        let entity = graph.relation(relation)?;
        Some(Self {
            relation,
            previous: (entity.source(), entity.target()),
            next: None,
            bends: BendLog::new(),
        })
    }

    /// Reads the endpoints the renderer left on the link. Returns whether there is a change
    /// worth committing; a link attached to the same node at both ends is reset instead.
    pub fn update_terminals(&mut self, graph: &mut DiagramGraph) -> bool {
        let Some(cell) = graph.scene().get(self.relation) else {
            return false;
        };
        let (Some(source), Some(target)) = (cell.source(), cell.target()) else {
            return false;
        };
        let same_node =
            matches!((source, target), (Terminal::Node(s), Terminal::Node(t)) if s == t);
        if same_node || (source, target) == self.previous {
            let (source, target) = self.previous;
            graph.scene_mut().set_terminals(self.relation, source, target);
            self.next = None;
            return false;
        }
        self.next = Some((source, target));
        true
    }

    pub fn set_terminals(&mut self, source: Terminal, target: Terminal) {
        self.next = Some((source, target));
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        let Some((source, target)) = self.next else {
            return;
        };
        let old_pair = cx
            .graph
            .relation(self.relation)
            .and_then(|relation| relation.endpoints());
        if !cx.graph.set_terminals(self.relation, source, target) {
            return;
        }
        let mut bends = match old_pair {
            Some((a, b)) => cx.graph.arrange_siblings(a, b, false),
            None => BendLog::new(),
        };
        bends.extend(cx.graph.arrange_siblings_of_relation(self.relation, false));
        self.bends = bends;
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        cx.graph.restore_bends(std::mem::take(&mut self.bends));
        let (source, target) = self.previous;
        cx.graph.set_terminals(self.relation, source, target);
    }
}

/// Changes the label (the relation type) of a relation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRelationType {
    relation: RenderId,
    label: Option<SmolStr>,
    previous: Option<Option<SmolStr>>,
}

impl ChangeRelationType {
    pub fn new(relation: RenderId, label: Option<&str>) -> Self {
        Self {
            relation,
            label: label.map(SmolStr::new),
            previous: None,
        }
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        let previous = cx
            .graph
            .set_relation_label(self.relation, self.label.as_deref());
        if previous.is_some() {
            self.previous = previous;
        }
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        if let Some(previous) = &self.previous {
            cx.graph.set_relation_label(self.relation, previous.as_deref());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DbRelationSlot {
    Pending {
        source: RenderId,
        target: RenderId,
        uuid: RecordId,
        label: Option<SmolStr>,
    },
    Attached(RelationSlot),
}

/// Shows or hides a backend relation in the diagram.
///
/// Outside relation mode, hiding removes the relation and showing adds it back. In relation
/// mode every backend relation stays on the canvas, so hiding turns it faint instead and showing
/// turns it normal again.
#[derive(Debug, Clone, PartialEq)]
pub struct DbRelationToggle {
    slot: DbRelationSlot,
    bends: BendLog,
}

impl DbRelationToggle {
    /// For a backend relation that is not drawn yet.
    pub fn pending(source: RenderId, target: RenderId, uuid: RecordId, label: Option<&str>) -> Self {
        Self {
            slot: DbRelationSlot::Pending {
                source,
                target,
                uuid,
                label: label.map(SmolStr::new),
            },
            bends: BendLog::new(),
        }
    }

    pub fn existing(relation: RenderId) -> Self {
        Self {
            slot: DbRelationSlot::Attached(RelationSlot::Live(relation)),
            bends: BendLog::new(),
        }
    }

    pub fn render_id(&self) -> Option<RenderId> {
        match &self.slot {
            DbRelationSlot::Pending { .. } => None,
            DbRelationSlot::Attached(slot) => slot.render_id(),
        }
    }

    pub(super) fn show(&mut self, cx: &mut CommandContext<'_>) {
        let id = match &mut self.slot {
            DbRelationSlot::Pending {
                source,
                target,
                uuid,
                label,
            } => {
                let nodes = cx.graph.nodes();
                if !(nodes.contains(*source) && nodes.contains(*target)) {
                    return;
                }
                let id = cx.graph.new_relation(
                    Terminal::Node(*source),
                    Terminal::Node(*target),
                    RelationModeType::Normal,
                    label.as_deref(),
                    Some(uuid.clone()),
                );
                self.slot = DbRelationSlot::Attached(RelationSlot::Live(id));
                id
            }
            DbRelationSlot::Attached(slot @ RelationSlot::Detached(_)) => {
                match slot.reattach(cx) {
                    Some(id) => id,
                    None => return,
                }
            }
            DbRelationSlot::Attached(RelationSlot::Live(id)) => *id,
            DbRelationSlot::Attached(RelationSlot::NotCreated) => return,
        };
        if cx.graph.relations().mode_of(id) != Some(RelationModeType::Normal) {
            cx.graph.set_relation_mode(id, RelationModeType::Normal);
        }
        self.bends = cx.graph.arrange_siblings_of_relation(id, false);
    }

    pub(super) fn hide(&mut self, cx: &mut CommandContext<'_>) {
        let DbRelationSlot::Attached(slot) = &mut self.slot else {
            return;
        };
        cx.graph.restore_bends(std::mem::take(&mut self.bends));
        let RelationSlot::Live(id) = *slot else {
            return;
        };
        if !cx.graph.relations().contains(id) {
            return;
        }
        if cx.relation_mode {
            cx.graph.set_relation_mode(id, RelationModeType::Faint);
        } else {
            slot.detach(cx.graph);
        }
    }
}
