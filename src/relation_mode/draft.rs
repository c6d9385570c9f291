// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.
use tracing::debug;
use uuid::Uuid;

use crate::commands::CreateRelation;
use crate::graph::DiagramGraph;
use crate::model::{Point, RecordId, RelationModeType, RenderId, Terminal};
use crate::scene::Cell;
use crate::style::relation_style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftState {
    #[default]
    Idle,
    /// A provisional link follows the pointer away from `source`.
    Drawing { source: RenderId, link: RenderId },
    /// Both ends are picked; waiting for the label.
    Confirming {
        source: RenderId,
        target: RenderId,
        link: RenderId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    Started { source: RenderId },
    AwaitingConfirmation { source: RenderId, target: RenderId },
    Cancelled,
    Ignored,
}

/// Two-click gesture that draws a new visual relation.
///
/// The provisional link is a scene cell only; no relation entity exists until [`confirm`]
/// hands back a [`CreateRelation`] for the history.
///
/// [`confirm`]: RelationDraft::confirm
#[derive(Debug, Default)]
pub struct RelationDraft {
    state: DraftState,
}

impl RelationDraft {
    pub fn state(&self) -> DraftState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != DraftState::Idle
    }

    pub fn click_node(&mut self, graph: &mut DiagramGraph, node: RenderId) -> DraftOutcome {
        if !graph.nodes().contains(node) {
            return DraftOutcome::Ignored;
        }
        match self.state {
            DraftState::Idle => {
                let Some(center) = graph.scene().center(node) else {
                    return DraftOutcome::Ignored;
                };
                let link = spawn_provisional_link(graph, node, center);
                self.state = DraftState::Drawing { source: node, link };
                debug!(source = %node, "relation draft started");
                DraftOutcome::Started { source: node }
            }
            DraftState::Drawing { source, .. } if source == node => {
                self.cancel(graph);
                DraftOutcome::Cancelled
            }
            DraftState::Drawing { source, link } => {
                graph.scene_mut().set_terminals(
                    link,
                    Terminal::Node(source),
                    Terminal::Node(node),
                );
                self.state = DraftState::Confirming {
                    source,
                    target: node,
                    link,
                };
                DraftOutcome::AwaitingConfirmation {
                    source,
                    target: node,
                }
            }
            DraftState::Confirming { .. } => DraftOutcome::Ignored,
        }
    }

    pub fn click_blank(&mut self, graph: &mut DiagramGraph) -> DraftOutcome {
        match self.state {
            DraftState::Drawing { .. } => {
                self.cancel(graph);
                DraftOutcome::Cancelled
            }
            DraftState::Idle | DraftState::Confirming { .. } => DraftOutcome::Ignored,
        }
    }

    /// Keeps the loose end a little short of the pointer so the link itself never sits under
    /// the cursor and swallows the click meant for the target node.
    pub fn pointer_moved(&mut self, graph: &mut DiagramGraph, pointer: Point) -> bool {
        let DraftState::Drawing { source, link } = self.state else {
            return false;
        };
        let Some(center) = graph.scene().center(source) else {
            return false;
        };
        let offset = graph.config().pointer_offset;
        graph
            .scene_mut()
            .set_target_point(link, pointer.pulled_towards(center, offset))
    }

    /// Finishes the gesture. Returns the command that creates the relation, or `None` when no
    /// target is picked yet or one of the nodes is gone.
    pub fn confirm(&mut self, graph: &mut DiagramGraph, label: &str) -> Option<CreateRelation> {
        let DraftState::Confirming {
            source,
            target,
            link,
        } = self.state
        else {
            return None;
        };
        graph.scene_mut().remove(link);
        self.state = DraftState::Idle;
        if !(graph.nodes().contains(source) && graph.nodes().contains(target)) {
            return None;
        }

        let mut command = CreateRelation::new(source, target, RelationModeType::Visual);
        let label = label.trim();
        if !label.is_empty() {
            command = command.with_label(label);
        }
        if let Ok(uuid) = RecordId::new(Uuid::new_v4().to_string()) {
            command = command.with_uuid(uuid);
        }
        debug!(source = %source, target = %target, "relation draft confirmed");
        Some(command)
    }

    pub fn cancel(&mut self, graph: &mut DiagramGraph) {
        match std::mem::take(&mut self.state) {
            DraftState::Idle => {}
            DraftState::Drawing { link, .. } | DraftState::Confirming { link, .. } => {
                graph.scene_mut().remove(link);
                debug!("relation draft cancelled");
            }
        }
    }
}

fn spawn_provisional_link(graph: &mut DiagramGraph, source: RenderId, at: Point) -> RenderId {
    let style = relation_style(RelationModeType::Visual, &graph.config().palette);
    let scene = graph.scene_mut();
    let link = scene.allocate_id();
    scene.insert(link, Cell::link(Terminal::Node(source), Terminal::Point(at)));
    scene.set_attr(link, "line/stroke", style.stroke);
    scene.set_attr(link, "line/dasharray", "2 2");
    link
}
