// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;
use tracing::debug;

use super::{DetachedRelation, DiagramGraph, Settled};
use crate::model::{RecordId, RelationEntity, RelationModeType, RenderId, Terminal};
use crate::scene::{Cell, Scene};
use crate::style::{relation_style, relation_tools, Palette};

fn apply_relation_style(scene: &mut Scene, palette: &Palette, relation: &RelationEntity) {
    let id = relation.render_id();
    let style = relation_style(relation.mode(), palette);
    scene.set_attr(id, "line/stroke", style.stroke);
    scene.set_attr(id, "line/opacity", style.opacity.to_string());
    scene.set_attr(
        id,
        "line/dasharray",
        if style.dashed { "5 3" } else { "none" },
    );
    scene.set_attr(id, "label/fill", style.label_fill);
    scene.set_attr(id, "label/text", relation.label().unwrap_or_default());
    scene.set_tools(id, relation_tools(relation.mode()));
}

impl DiagramGraph {
    /// Creates a relation from `source` to `target` and registers it on both endpoints.
    pub fn new_relation(
        &mut self,
        source: Terminal,
        target: Terminal,
        mode: RelationModeType,
        label: Option<&str>,
        uuid: Option<RecordId>,
    ) -> RenderId {
        let render_id = self.scene.allocate_id();
        self.scene.insert(render_id, Cell::link(source, target));

        let entity = RelationEntity::new(
            render_id,
            uuid,
            source,
            target,
            label.map(SmolStr::new),
            mode,
        );
        apply_relation_style(&mut self.scene, &self.config.palette, &entity);
        self.relations.add(entity);
        self.reconnect(render_id);
        debug!(render_id = %render_id, mode = %mode, "relation created");
        render_id
    }

    /// Registers the relation on its endpoint nodes. Point terminals are skipped.
    pub fn reconnect(&mut self, id: RenderId) -> bool {
        let Some(relation) = self.relations.get(id) else {
            return false;
        };
        let (source, target) = (relation.source(), relation.target());
        if let Some(node) = source.node() {
            if let Some(node) = self.nodes.get_mut(node) {
                node.outgoing_mut().insert(id);
            }
        }
        if let Some(node) = target.node() {
            if let Some(node) = self.nodes.get_mut(node) {
                node.incoming_mut().insert(id);
            }
        }
        true
    }

    fn disconnect(&mut self, id: RenderId, source: Terminal, target: Terminal) {
        if let Some(node) = source.node() {
            if let Some(node) = self.nodes.get_mut(node) {
                node.outgoing_mut().remove(&id);
            }
        }
        if let Some(node) = target.node() {
            if let Some(node) = self.nodes.get_mut(node) {
                node.incoming_mut().remove(&id);
            }
        }
    }

    /// Moves both ends of a relation, keeping the node registrations symmetric.
    pub fn set_terminals(&mut self, id: RenderId, source: Terminal, target: Terminal) -> bool {
        let Some(relation) = self.relations.get(id) else {
            return false;
        };
        let (old_source, old_target) = (relation.source(), relation.target());
        self.disconnect(id, old_source, old_target);
        if let Some(relation) = self.relations.get_mut(id) {
            relation.set_terminals(source, target);
        }
        self.scene.set_terminals(id, source, target);
        self.reconnect(id)
    }

    /// Re-attaches a detached relation. Fails, handing the relation back, when a node it is
    /// attached to is no longer in the diagram.
    pub fn add_existing_relation(
        &mut self,
        detached: DetachedRelation,
    ) -> Result<RenderId, DetachedRelation> {
        let render_id = detached.render_id();
        if self.relations.contains(render_id) {
            return Ok(render_id);
        }
        let attached = |terminal: Terminal| terminal.node().map_or(true, |n| self.nodes.contains(n));
        if !(attached(detached.entity.source()) && attached(detached.entity.target())) {
            return Err(detached);
        }

        let DetachedRelation { entity, cell } = detached;
        self.scene.insert(render_id, cell);
        apply_relation_style(&mut self.scene, &self.config.palette, &entity);
        self.relations.add(entity);
        self.reconnect(render_id);
        debug!(render_id = %render_id, "relation re-attached");
        Ok(render_id)
    }

    fn is_attached(&self, terminal: Terminal) -> bool {
        terminal.node().is_some_and(|node| self.nodes.contains(node))
    }

    /// Brings one relation back to what the diagram holds outside relation mode.
    ///
    /// Faint relations are detached. Visual relations become normal; a dangling one is first
    /// moved back onto its origin, or detached when the origin is gone too. The origin is
    /// cleared on every relation that stays.
    pub fn settle_relation(&mut self, id: RenderId) -> Option<Settled> {
        let relation = self.relations.get(id)?;
        let (source, target, origin) = (relation.source(), relation.target(), relation.origin());
        match relation.mode() {
            RelationModeType::Normal => return Some(Settled::Unchanged),
            RelationModeType::Faint => {
                return self.remove_existing_relation(id).map(Settled::Removed);
            }
            RelationModeType::Visual => {}
        }

        let settled = if self.is_attached(source) && self.is_attached(target) {
            Settled::Promoted
        } else {
            match origin {
                Some((s, t)) if self.is_attached(s) && self.is_attached(t) => {
                    self.set_terminals(id, s, t);
                    Settled::Reset
                }
                _ => return self.remove_existing_relation(id).map(Settled::Removed),
            }
        };
        self.set_relation_mode(id, RelationModeType::Normal);
        self.set_relation_origin(id, None);
        debug!(render_id = %id, "visual relation settled");
        Some(settled)
    }

    pub fn remove_existing_relation(&mut self, id: RenderId) -> Option<DetachedRelation> {
        let entity = self.relations.remove(id)?;
        self.disconnect(id, entity.source(), entity.target());
        let cell = self
            .scene
            .remove(id)
            .unwrap_or_else(|| Cell::link(entity.source(), entity.target()));
        debug!(render_id = %id, mode = %entity.mode(), "relation removed");
        Some(DetachedRelation { entity, cell })
    }

    /// Re-registers and restyles a relation for `mode`. Returns the previous mode.
    pub fn set_relation_mode(
        &mut self,
        id: RenderId,
        mode: RelationModeType,
    ) -> Option<RelationModeType> {
        let previous = self.relations.reclassify(id, mode)?;
        if let Some(relation) = self.relations.get(id) {
            apply_relation_style(&mut self.scene, &self.config.palette, relation);
        }
        Some(previous)
    }

    /// Returns the previous label.
    pub fn set_relation_label(
        &mut self,
        id: RenderId,
        label: Option<&str>,
    ) -> Option<Option<SmolStr>> {
        let relation = self.relations.get_mut(id)?;
        let previous = relation.label().map(SmolStr::new);
        relation.set_label(label.map(SmolStr::new));
        self.scene
            .set_attr(id, "label/text", label.unwrap_or_default());
        Some(previous)
    }

    pub(crate) fn set_relation_origin(
        &mut self,
        id: RenderId,
        origin: Option<(Terminal, Terminal)>,
    ) -> bool {
        match self.relations.get_mut(id) {
            Some(relation) => {
                relation.set_origin(origin);
                true
            }
            None => false,
        }
    }
}
