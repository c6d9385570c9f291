// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.
//! The editor façade.
//!
//! [`DiagramHandler`] owns the diagram, its history, and the relation-mode state. Every edit a
//! user makes goes through it as a [`Command`], so it can be undone.

use std::collections::BTreeSet;

use futures::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::{Backend, BackendError};
use crate::commands::{
    BendRelation, ChangeRelationType, Command, CommandContext, ConnectRelation, CreateNode,
    CreateNodes, DbRelationToggle, History, MoveNode, RemoveNode, RemoveRelation, ResizeNode,
    RestyleNode,
};
use crate::config::EditorConfig;
use crate::graph::DiagramGraph;
use crate::model::{
    NodeInfo, Point, RecordId, RelationModeType, RenderId, ResizeDirection,
};
use crate::relation_mode::{
    DisableReport, DraftOutcome, EnableReport, RelationDraft, RelationMode, RelationModeError,
};
use crate::scene::Scene;
use crate::store::{self, DiagramSaver, LoadReport, SerializedDiagram};

#[derive(Debug)]
pub struct DiagramHandler {
    graph: DiagramGraph,
    history: History,
    relation_mode: RelationMode,
    saver: Option<DiagramSaver>,
}

impl DiagramHandler {
    pub fn new(config: EditorConfig) -> Self {
        let history = History::new(config.history_limit);
        Self {
            graph: DiagramGraph::new(config),
            history,
            relation_mode: RelationMode::new(),
            saver: None,
        }
    }

    /// Saves the diagram through `saver` after every change to the history. Saving spawns
    /// tokio tasks, so a handler with a saver must be driven from inside a runtime.
    pub fn with_saver(mut self, saver: DiagramSaver) -> Self {
        self.saver = Some(saver);
        self
    }

    pub fn graph(&self) -> &DiagramGraph {
        &self.graph
    }

    /// The rendering surface, for geometry changed by direct manipulation.
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.graph.scene_mut()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_relation_mode(&self) -> bool {
        self.relation_mode.is_enabled()
    }

    pub fn draft(&self) -> &RelationDraft {
        self.relation_mode.draft()
    }

    pub fn execute(&mut self, command: Command) {
        let relation_mode = self.relation_mode.is_enabled();
        self.history.execute(
            command,
            &mut CommandContext {
                graph: &mut self.graph,
                relation_mode,
            },
        );
        self.autosave();
    }

    pub fn undo(&mut self) -> bool {
        let relation_mode = self.relation_mode.is_enabled();
        let undone = self.history.undo(&mut CommandContext {
            graph: &mut self.graph,
            relation_mode,
        });
        if undone {
            self.autosave();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let relation_mode = self.relation_mode.is_enabled();
        let redone = self.history.redo(&mut CommandContext {
            graph: &mut self.graph,
            relation_mode,
        });
        if redone {
            self.autosave();
        }
        redone
    }

    fn last_render_ids(&self) -> Vec<RenderId> {
        match self.history.last_applied() {
            Some(Command::CreateNode(command)) => command.render_id().into_iter().collect(),
            Some(Command::CreateNodes(command)) => command.render_ids(),
            Some(Command::CreateRelation(command)) => command.render_id().into_iter().collect(),
            Some(Command::EnableDbRelation(command)) => command.render_id().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn add_node(&mut self, info: NodeInfo) -> Option<RenderId> {
        self.execute(Command::CreateNode(CreateNode::new(info)));
        self.last_render_ids().first().copied()
    }

    /// Adds several nodes as a single undo step.
    pub fn add_nodes(&mut self, infos: impl IntoIterator<Item = NodeInfo>) -> Vec<RenderId> {
        let command = CreateNodes::new(infos);
        if command.is_empty() {
            return Vec::new();
        }
        self.execute(Command::CreateNodes(command));
        self.last_render_ids()
    }

    pub fn remove_node(&mut self, node: RenderId) -> bool {
        if !self.graph.nodes().contains(node) {
            return false;
        }
        self.execute(Command::RemoveNode(RemoveNode::new(node)));
        true
    }

    pub fn restyle_node(
        &mut self,
        node: RenderId,
        color: impl Into<String>,
        border_color: impl Into<String>,
    ) -> bool {
        if !self.graph.nodes().contains(node) {
            return false;
        }
        self.execute(Command::RestyleNode(RestyleNode::new(node, color, border_color)));
        true
    }

    /// Starts recording a drag; pass the result to [`finish_move`](Self::finish_move) on drop.
    pub fn begin_move(&self, node: RenderId) -> Option<MoveNode> {
        MoveNode::new(&self.graph, node)
    }

    /// Commits the drag if the node ended up somewhere else.
    pub fn finish_move(&mut self, mut command: MoveNode) -> bool {
        command.update_stop_position(&self.graph);
        if !command.has_changed() {
            return false;
        }
        self.execute(Command::MoveNode(command));
        true
    }

    pub fn begin_resize(&self, node: RenderId, direction: ResizeDirection) -> Option<ResizeNode> {
        ResizeNode::new(&self.graph, node, direction)
    }

    pub fn finish_resize(&mut self, mut command: ResizeNode) -> bool {
        command.update_stop_size(&self.graph);
        if !command.has_changed() {
            return false;
        }
        self.execute(Command::ResizeNode(command));
        true
    }

    pub fn begin_bend(&self, relation: RenderId) -> Option<BendRelation> {
        BendRelation::new(&self.graph, relation)
    }

    pub fn finish_bend(&mut self, mut command: BendRelation) -> bool {
        command.update_stop(&self.graph);
        if !command.has_changed() {
            return false;
        }
        self.execute(Command::BendRelation(command));
        true
    }

    /// Only visual relations can have their endpoints dragged.
    pub fn begin_connect(&self, relation: RenderId) -> Option<ConnectRelation> {
        if self.graph.relations().mode_of(relation) != Some(RelationModeType::Visual) {
            return None;
        }
        ConnectRelation::new(&self.graph, relation)
    }

    /// Reads the endpoints left on the link and commits them; a link dropped back where it
    /// was, or onto the same node at both ends, is reset instead.
    pub fn finish_connect(&mut self, mut command: ConnectRelation) -> bool {
        if !command.update_terminals(&mut self.graph) {
            return false;
        }
        self.execute(Command::ConnectRelation(command));
        true
    }

    /// Removes a visual relation. Normal and faint relations are refused.
    pub fn remove_relation(&mut self, relation: RenderId) -> bool {
        match RemoveRelation::new(&self.graph, relation) {
            Some(command) => {
                self.execute(Command::RemoveRelation(command));
                true
            }
            None => false,
        }
    }

    pub fn change_relation_type(&mut self, relation: RenderId, label: Option<&str>) -> bool {
        if !self.graph.relations().contains(relation) {
            return false;
        }
        self.execute(Command::ChangeRelationType(ChangeRelationType::new(
            relation, label,
        )));
        true
    }

    /// Draws a backend relation that is not in the diagram yet.
    pub fn show_db_relation(
        &mut self,
        source: RenderId,
        target: RenderId,
        uuid: RecordId,
        label: Option<&str>,
    ) -> Option<RenderId> {
        let toggle = DbRelationToggle::pending(source, target, uuid, label);
        self.execute(Command::EnableDbRelation(toggle));
        self.last_render_ids().first().copied()
    }

    /// Toggles a backend relation between shown and hidden. In relation mode this switches it
    /// between normal and faint in place; otherwise hiding takes it off the canvas.
    pub fn switch_db_relation(&mut self, relation: RenderId) -> bool {
        let toggle = DbRelationToggle::existing(relation);
        match self.graph.relations().mode_of(relation) {
            Some(RelationModeType::Normal) => {
                self.execute(Command::DisableDbRelation(toggle));
                true
            }
            Some(RelationModeType::Faint) => {
                self.execute(Command::EnableDbRelation(toggle));
                true
            }
            Some(RelationModeType::Visual) | None => false,
        }
    }

    pub async fn enable_relation_mode(
        &mut self,
        backend: &dyn Backend,
    ) -> Result<EnableReport, RelationModeError> {
        self.relation_mode.enable(&mut self.graph, backend).await
    }

    pub fn disable_relation_mode(&mut self) -> Result<DisableReport, RelationModeError> {
        let report = self.relation_mode.disable(&mut self.graph)?;
        self.autosave();
        Ok(report)
    }

    /// Feeds a node click to the drawing gesture. Ignored outside relation mode.
    pub fn click_node(&mut self, node: RenderId) -> DraftOutcome {
        if !self.relation_mode.is_enabled() {
            return DraftOutcome::Ignored;
        }
        self.relation_mode.draft_mut().click_node(&mut self.graph, node)
    }

    pub fn click_blank(&mut self) -> DraftOutcome {
        self.relation_mode.draft_mut().click_blank(&mut self.graph)
    }

    pub fn pointer_moved(&mut self, pointer: Point) -> bool {
        self.relation_mode
            .draft_mut()
            .pointer_moved(&mut self.graph, pointer)
    }

    /// Confirms the drawn relation with `label` and records its creation.
    pub fn confirm_relation(&mut self, label: &str) -> Option<RenderId> {
        let command = self.relation_mode.draft_mut().confirm(&mut self.graph, label)?;
        self.execute(Command::CreateRelation(command));
        self.last_render_ids().first().copied()
    }

    pub fn cancel_relation(&mut self) {
        self.relation_mode.draft_mut().cancel(&mut self.graph);
    }

    pub fn to_json(&self) -> SerializedDiagram {
        store::save_diagram(&self.graph)
    }

    /// Replaces the diagram. History and relation mode start over.
    pub fn from_json(&mut self, diagram: &SerializedDiagram) -> LoadReport {
        self.relation_mode = RelationMode::new();
        self.history.clear();
        self.graph.clear();
        store::load_diagram(&mut self.graph, diagram)
    }

    /// Hands the current diagram to the saver, if there is one.
    pub fn save(&self) -> Option<JoinHandle<()>> {
        let saver = self.saver.as_ref()?;
        Some(saver.save(self.to_json()))
    }

    fn autosave(&self) {
        // Saves are fire-and-forget; the handle is not awaited.
        drop(self.save());
    }

    /// Adds the backend records related to `node` that are not on the canvas yet, placed on a
    /// ring around it. All of them are added as one undo step.
    pub async fn add_related_nodes(
        &mut self,
        node: RenderId,
        backend: &dyn Backend,
    ) -> Result<Vec<RenderId>, BackendError> {
        let (Some(uuid), Some(center)) = (
            self.graph.node(node).map(|entity| entity.uuid().clone()),
            self.graph.scene().center(node),
        ) else {
            debug!(node = %node, "add related nodes: node is gone");
            return Ok(Vec::new());
        };

        let relations = backend.relations_of(&uuid).await?;
        let counterparts = relations
            .iter()
            .filter_map(|relation| relation.counterpart(&uuid))
            .filter(|other| **other != uuid && !self.graph.nodes().contains_uuid(other))
            .cloned()
            .collect::<BTreeSet<_>>();
        if counterparts.is_empty() {
            return Ok(Vec::new());
        }
        let records = try_join_all(counterparts.iter().map(|other| backend.node(other))).await?;

        let config = self.graph.config();
        let radius = config.related_ring_radius;
        let size = config.default_node_size;
        let step = 360.0 / records.len() as f64;
        let infos = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let at = Point::from_polar(radius, step * i as f64, center)
                    .offset(-size.width / 2.0, -size.height / 2.0);
                let touching = relations
                    .iter()
                    .filter(|relation| relation.touches(&record.node_id))
                    .cloned()
                    .collect();
                record.to_node_info(at).with_relations(touching)
            })
            .collect::<Vec<_>>();

        let ids = self.add_nodes(infos);
        info!(node = %node, added = ids.len(), "related nodes added");
        Ok(ids)
    }
}
