// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::debug;

use super::CommandContext;
use crate::graph::{BendLog, DiagramGraph, RemovedNode};
use crate::model::{
    BackendRelation, NodeInfo, Point, RelationModeType, RenderId, ResizeDirection, Size,
    Terminal,
};

#[derive(Debug, Clone, PartialEq)]
enum NodeSlot {
    NotCreated,
    Live(RenderId),
    Detached(RemovedNode),
}

/// Places a node and connects it to the nodes the backend relates it to.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNode {
    info: NodeInfo,
    label_color: Option<String>,
    slot: NodeSlot,
    bends: BendLog,
}

impl CreateNode {
    pub fn new(info: NodeInfo) -> Self {
        Self {
            info,
            label_color: None,
            slot: NodeSlot::NotCreated,
            bends: BendLog::new(),
        }
    }

    pub fn with_label_color(mut self, color: impl Into<String>) -> Self {
        self.label_color = Some(color.into());
        self
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    /// The node's render id once the command has been applied at least once.
    pub fn render_id(&self) -> Option<RenderId> {
        match &self.slot {
            NodeSlot::NotCreated => None,
            NodeSlot::Live(id) => Some(*id),
            NodeSlot::Detached(removed) => Some(removed.render_id()),
        }
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        let id = match std::mem::replace(&mut self.slot, NodeSlot::NotCreated) {
            NodeSlot::Live(id) => {
                self.slot = NodeSlot::Live(id);
                return;
            }
            NodeSlot::NotCreated => cx.graph.new_node(&self.info, self.label_color.as_deref()),
            NodeSlot::Detached(removed) => cx.graph.restore_node(removed, cx.relation_mode),
        };
        self.slot = NodeSlot::Live(id);
        wire_backend_relations(cx.graph, id, &self.info.relations);
        self.bends = cx.graph.arrange_siblings_of_node(id, false);
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        let NodeSlot::Live(id) = self.slot else {
            return;
        };
        cx.graph.restore_bends(std::mem::take(&mut self.bends));
        if let Some(removed) = cx.graph.remove_existing_node(id) {
            self.slot = NodeSlot::Detached(removed);
        }
    }
}

/// Adds a normal relation for every backend relation between `node` and a node already in the
/// diagram, skipping the ones that are drawn already.
fn wire_backend_relations(graph: &mut DiagramGraph, node: RenderId, relations: &[BackendRelation]) {
    let Some(uuid) = graph.node(node).map(|n| n.uuid().clone()) else {
        return;
    };
    for relation in relations {
        let Some(counterpart) = relation.counterpart(&uuid) else {
            continue;
        };
        let outgoing = relation.from == uuid;
        for other in graph.nodes().ids_by_uuid(counterpart) {
            if other == node {
                continue;
            }
            let (source, target) = if outgoing { (node, other) } else { (other, node) };
            let drawn = graph
                .relations()
                .get_by_uuid(&relation.relation_id)
                .iter()
                .any(|existing| existing.endpoints() == Some((source, target)));
            if drawn {
                continue;
            }
            let label = (!relation.kind.is_empty()).then_some(relation.kind.as_str());
            graph.new_relation(
                Terminal::Node(source),
                Terminal::Node(target),
                RelationModeType::Normal,
                label,
                Some(relation.relation_id.clone()),
            );
        }
    }
}

/// Several [`CreateNode`]s applied as one step.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNodes {
    nodes: Vec<CreateNode>,
}

impl CreateNodes {
    pub fn new(infos: impl IntoIterator<Item = NodeInfo>) -> Self {
        Self {
            nodes: infos.into_iter().map(CreateNode::new).collect(),
        }
    }

    pub fn render_ids(&self) -> Vec<RenderId> {
        self.nodes.iter().filter_map(CreateNode::render_id).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        for node in &mut self.nodes {
            node.redo(cx);
        }
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        for node in self.nodes.iter_mut().rev() {
            node.undo(cx);
        }
    }
}

/// Removes a node and its relations; undo re-attaches the same instances.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveNode {
    node: RenderId,
    removed: Option<RemovedNode>,
}

impl RemoveNode {
    pub fn new(node: RenderId) -> Self {
        Self {
            node,
            removed: None,
        }
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        if self.removed.is_some() {
            return;
        }
        self.removed = cx.graph.remove_existing_node(self.node);
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        let Some(removed) = self.removed.take() else {
            return;
        };
        cx.graph.restore_node(removed, cx.relation_mode);
    }
}

/// Records a drag. Create it when the drag starts and call
/// [`MoveNode::update_stop_position`] once the node has been dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveNode {
    node: RenderId,
    start: Point,
    stop: Option<Point>,
}

impl MoveNode {
    pub fn new(graph: &DiagramGraph, node: RenderId) -> Option<Self> {
        let start = graph.scene().position(node)?;
        Some(Self {
            node,
            start,
            stop: None,
        })
    }

    pub fn node(&self) -> RenderId {
        self.node
    }

    pub fn update_stop_position(&mut self, graph: &DiagramGraph) {
        if let Some(position) = graph.scene().position(self.node) {
            self.stop = Some(position);
        }
    }

    pub fn set_stop_position(&mut self, position: Point) {
        self.stop = Some(position);
    }

    pub fn has_changed(&self) -> bool {
        self.stop.is_some_and(|stop| stop != self.start)
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        if let Some(stop) = self.stop {
            cx.graph.scene_mut().set_position(self.node, stop);
        }
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        cx.graph.scene_mut().set_position(self.node, self.start);
    }
}

/// Records a resize through one of the node's handles.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeNode {
    node: RenderId,
    direction: ResizeDirection,
    start: Size,
    stop: Option<Size>,
}

impl ResizeNode {
    pub fn new(graph: &DiagramGraph, node: RenderId, direction: ResizeDirection) -> Option<Self> {
        let start = graph.scene().size(node)?;
        Some(Self {
            node,
            direction,
            start,
            stop: None,
        })
    }

    pub fn update_stop_size(&mut self, graph: &DiagramGraph) {
        if let Some(size) = graph.scene().size(self.node) {
            self.stop = Some(size);
        }
    }

    pub fn set_stop_size(&mut self, size: Size) {
        self.stop = Some(size);
    }

    pub fn has_changed(&self) -> bool {
        self.stop.is_some_and(|stop| stop != self.start)
    }

    fn apply(&self, cx: &mut CommandContext<'_>, size: Size) {
        let scene = cx.graph.scene_mut();
        if let Some(rect) = scene.bbox(self.node) {
            scene.set_rect(self.node, rect.resized(size, self.direction));
        }
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        if let Some(stop) = self.stop {
            self.apply(cx, stop);
        }
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        self.apply(cx, self.start);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestyleNode {
    node: RenderId,
    color: String,
    border_color: String,
    previous: Option<(String, String)>,
}

impl RestyleNode {
    pub fn new(node: RenderId, color: impl Into<String>, border_color: impl Into<String>) -> Self {
        Self {
            node,
            color: color.into(),
            border_color: border_color.into(),
            previous: None,
        }
    }

    pub(super) fn redo(&mut self, cx: &mut CommandContext<'_>) {
        let previous = cx
            .graph
            .restyle_node(self.node, &self.color, &self.border_color);
        if previous.is_some() {
            self.previous = previous;
        }
    }

    pub(super) fn undo(&mut self, cx: &mut CommandContext<'_>) {
        let Some((color, border_color)) = &self.previous else {
            debug!(node = %self.node, "restyle undo without a recorded style");
            return;
        };
        cx.graph.restyle_node(self.node, color, border_color);
    }
}
