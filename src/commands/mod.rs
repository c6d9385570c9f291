// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reversible edits and the undo/redo history.
//!
//! Commands hold render ids, never references into the graph. Commands that create or remove
//! entities keep the detached entity between `undo` and `redo`, so replaying them re-attaches
//! the same instance instead of building a copy. Commands whose target has disappeared do
//! nothing.

mod node;
mod relation;

use std::collections::VecDeque;

use tracing::debug;

use crate::graph::DiagramGraph;

pub use node::{CreateNode, CreateNodes, MoveNode, RemoveNode, ResizeNode, RestyleNode};
pub use relation::{
    BendRelation, ChangeRelationType, ConnectRelation, CreateRelation, DbRelationToggle,
    RemoveRelation,
};

/// What a command operates on.
pub struct CommandContext<'a> {
    pub graph: &'a mut DiagramGraph,
    /// Whether relation mode is on; changes how backend relations are hidden.
    pub relation_mode: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateNode(CreateNode),
    CreateNodes(CreateNodes),
    RemoveNode(RemoveNode),
    MoveNode(MoveNode),
    ResizeNode(ResizeNode),
    RestyleNode(RestyleNode),
    CreateRelation(CreateRelation),
    RemoveRelation(RemoveRelation),
    BendRelation(BendRelation),
    ConnectRelation(ConnectRelation),
    ChangeRelationType(ChangeRelationType),
    /// Shows a backend relation; undo hides it again.
    EnableDbRelation(DbRelationToggle),
    /// Hides a backend relation; undo shows it again.
    DisableDbRelation(DbRelationToggle),
    /// Applied in order, undone in reverse order.
    Compound(Vec<Command>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateNode(_) => "create_node",
            Self::CreateNodes(_) => "create_nodes",
            Self::RemoveNode(_) => "remove_node",
            Self::MoveNode(_) => "move_node",
            Self::ResizeNode(_) => "resize_node",
            Self::RestyleNode(_) => "restyle_node",
            Self::CreateRelation(_) => "create_relation",
            Self::RemoveRelation(_) => "remove_relation",
            Self::BendRelation(_) => "bend_relation",
            Self::ConnectRelation(_) => "connect_relation",
            Self::ChangeRelationType(_) => "change_relation_type",
            Self::EnableDbRelation(_) => "enable_db_relation",
            Self::DisableDbRelation(_) => "disable_db_relation",
            Self::Compound(_) => "compound",
        }
    }

    pub fn redo(&mut self, cx: &mut CommandContext<'_>) {
        match self {
            Self::CreateNode(command) => command.redo(cx),
            Self::CreateNodes(command) => command.redo(cx),
            Self::RemoveNode(command) => command.redo(cx),
            Self::MoveNode(command) => command.redo(cx),
            Self::ResizeNode(command) => command.redo(cx),
            Self::RestyleNode(command) => command.redo(cx),
            Self::CreateRelation(command) => command.redo(cx),
            Self::RemoveRelation(command) => command.redo(cx),
            Self::BendRelation(command) => command.redo(cx),
            Self::ConnectRelation(command) => command.redo(cx),
            Self::ChangeRelationType(command) => command.redo(cx),
            Self::EnableDbRelation(command) => command.show(cx),
            Self::DisableDbRelation(command) => command.hide(cx),
            Self::Compound(commands) => {
                for command in commands.iter_mut() {
                    command.redo(cx);
                }
            }
        }
    }

    pub fn undo(&mut self, cx: &mut CommandContext<'_>) {
        match self {
            Self::CreateNode(command) => command.undo(cx),
            Self::CreateNodes(command) => command.undo(cx),
            Self::RemoveNode(command) => command.undo(cx),
            Self::MoveNode(command) => command.undo(cx),
            Self::ResizeNode(command) => command.undo(cx),
            Self::RestyleNode(command) => command.undo(cx),
            Self::CreateRelation(command) => command.undo(cx),
            Self::RemoveRelation(command) => command.undo(cx),
            Self::BendRelation(command) => command.undo(cx),
            Self::ConnectRelation(command) => command.undo(cx),
            Self::ChangeRelationType(command) => command.undo(cx),
            Self::EnableDbRelation(command) => command.hide(cx),
            Self::DisableDbRelation(command) => command.show(cx),
            Self::Compound(commands) => {
                for command in commands.iter_mut().rev() {
                    command.undo(cx);
                }
            }
        }
    }
}

/// Undo and redo stacks.
///
/// Executing a new command clears the redo stack. With a non-zero `limit`, the oldest undo
/// entries are dropped once the limit is exceeded. `rev` counts every change applied through the
/// history.
#[derive(Debug, Default)]
pub struct History {
    undo: VecDeque<Command>,
    redo: Vec<Command>,
    limit: usize,
    rev: u64,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Applies `command` and records it.
    pub fn execute(&mut self, mut command: Command, cx: &mut CommandContext<'_>) {
        command.redo(cx);
        debug!(command = command.name(), "executed");
        self.redo.clear();
        self.push_undo(command);
        self.rev += 1;
    }

    fn push_undo(&mut self, command: Command) {
        self.undo.push_back(command);
        if self.limit > 0 {
            while self.undo.len() > self.limit {
                self.undo.pop_front();
            }
        }
    }

    pub fn undo(&mut self, cx: &mut CommandContext<'_>) -> bool {
        let Some(mut command) = self.undo.pop_back() else {
            return false;
        };
        command.undo(cx);
        debug!(command = command.name(), "undone");
        self.redo.push(command);
        self.rev += 1;
        true
    }

    pub fn redo(&mut self, cx: &mut CommandContext<'_>) -> bool {
        let Some(mut command) = self.redo.pop() else {
            return false;
        };
        command.redo(cx);
        debug!(command = command.name(), "redone");
        self.push_undo(command);
        self.rev += 1;
        true
    }

    /// The command the next undo would revert.
    pub fn last_applied(&self) -> Option<&Command> {
        self.undo.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
