// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{debug, warn};

use super::{DetachedNode, DiagramGraph, RemovedNode};
use crate::config::EditorConfig;
use crate::model::{NodeEntity, NodeInfo, NodeRef, Rect, RenderId};
use crate::scene::{Cell, Scene};
use crate::style::node_style;

fn apply_node_style(scene: &mut Scene, config: &EditorConfig, node: &NodeEntity) {
    let style = node_style(
        node.color(),
        node.border_color(),
        &config.palette,
        config.luminance_threshold,
        node.label_color(),
    );
    let id = node.render_id();
    scene.set_attr(id, "body/fill", style.fill);
    scene.set_attr(id, "body/stroke", style.stroke);
    scene.set_attr(id, "label/fill", style.label_fill);
    scene.set_attr(id, "label/text", node.label());
}

impl DiagramGraph {
    /// Places a new node for `info`, taking the next free index for its uuid.
    pub fn new_node(&mut self, info: &NodeInfo, label_color: Option<&str>) -> RenderId {
        self.spawn_node(info, label_color, None)
    }

    /// Like [`Self::new_node`], but keeps `index` when it is still free. Used when restoring
    /// saved diagrams.
    pub(crate) fn spawn_node(
        &mut self,
        info: &NodeInfo,
        label_color: Option<&str>,
        index: Option<u32>,
    ) -> RenderId {
        let index = match index {
            Some(index) if self.nodes.is_index_free(&info.uuid, index) => index,
            _ => self.nodes.next_index(&info.uuid),
        };

        let render_id = self.scene.allocate_id();
        let size = info.size.unwrap_or(self.config.default_node_size);
        self.scene.insert(
            render_id,
            Cell::node(info.shape, Rect::new(info.position, size)),
        );

        let color = info
            .color
            .clone()
            .unwrap_or_else(|| self.config.palette.node_fill.clone());
        let border_color = info
            .border_color
            .clone()
            .unwrap_or_else(|| self.config.palette.node_border.clone());
        let mut entity = NodeEntity::new(
            render_id,
            NodeRef::new(info.uuid.clone(), index),
            info.shape,
            info.label.clone(),
            info.name.clone(),
            color,
            border_color,
        );
        entity.set_label_color(label_color.map(str::to_owned));

        apply_node_style(&mut self.scene, &self.config, &entity);
        self.nodes.add(entity);
        debug!(render_id = %render_id, uuid = %info.uuid, index, "node created");
        render_id
    }

    /// Re-attaches a previously detached node under its original render id.
    ///
    /// Relation sets are cleared; relations re-register themselves when they are re-attached.
    pub fn add_existing_node(&mut self, detached: DetachedNode) -> RenderId {
        let DetachedNode { mut entity, cell } = detached;
        let render_id = entity.render_id();
        if self.nodes.contains(render_id) {
            return render_id;
        }

        let index = entity.reference().index;
        if !self.nodes.is_index_free(entity.uuid(), index) {
            let next = self.nodes.next_index(entity.uuid());
            warn!(
                render_id = %render_id,
                uuid = %entity.uuid(),
                index,
                next,
                "node index taken while detached; reassigning"
            );
            entity.set_reference_index(next);
        }
        entity.incoming_mut().clear();
        entity.outgoing_mut().clear();

        self.scene.insert(render_id, cell);
        self.nodes.add(entity);
        debug!(render_id = %render_id, "node re-attached");
        render_id
    }

    /// Detaches a node and every relation attached to it.
    pub fn remove_existing_node(&mut self, id: RenderId) -> Option<RemovedNode> {
        let relation_ids = self.nodes.get(id)?.relation_ids();
        let relations = relation_ids
            .into_iter()
            .filter_map(|relation| self.remove_existing_relation(relation))
            .collect::<Vec<_>>();

        let entity = self.nodes.remove(id)?;
        let cell = self
            .scene
            .remove(id)
            .unwrap_or_else(|| Cell::node(entity.shape(), Rect::default()));
        debug!(render_id = %id, cascaded = relations.len(), "node removed");
        Some(RemovedNode {
            node: DetachedNode { entity, cell },
            relations,
        })
    }

    /// Undoes [`Self::remove_existing_node`], re-attaching the same relation instances.
    ///
    /// Outside relation mode the re-attached relations are settled, so faint and visual
    /// relations detached while the mode was on do not outlive it.
    pub fn restore_node(&mut self, removed: RemovedNode, relation_mode: bool) -> RenderId {
        let RemovedNode { node, relations } = removed;
        let id = self.add_existing_node(node);
        for relation in relations {
            match self.add_existing_relation(relation) {
                Ok(relation) if !relation_mode => {
                    self.settle_relation(relation);
                }
                Ok(_) => {}
                Err(dropped) => {
                    debug!(relation = %dropped.render_id(), "relation endpoint gone; not restored");
                }
            }
        }
        id
    }

    /// Changes the fill and border colors. Returns the previous `(color, border_color)`.
    pub fn restyle_node(
        &mut self,
        id: RenderId,
        color: &str,
        border_color: &str,
    ) -> Option<(String, String)> {
        let node = self.nodes.get_mut(id)?;
        let previous = (node.color().to_owned(), node.border_color().to_owned());
        node.set_colors(color.to_owned(), border_color.to_owned());
        apply_node_style(&mut self.scene, &self.config, node);
        Some(previous)
    }
}
