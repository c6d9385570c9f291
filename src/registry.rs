// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Dual-indexed entity registries.
//!
//! Each registry indexes its entities by [`RenderId`] and by backend [`RecordId`]. `add` and
//! `remove` are the only mutators of the indices, so the two never drift apart.

use std::collections::{BTreeMap, HashMap};

use crate::model::{NodeEntity, RecordId, RelationEntity, RelationModeType, RenderId};

#[derive(Debug, Default)]
pub struct NodesMap {
    by_render_id: HashMap<RenderId, NodeEntity>,
    by_uuid: HashMap<RecordId, BTreeMap<u32, RenderId>>,
}

impl NodesMap {
    pub fn add(&mut self, node: NodeEntity) {
        let render_id = node.render_id();
        if let Some(previous) = self.by_render_id.remove(&render_id) {
            self.unindex(&previous);
        }
        self.by_uuid
            .entry(node.uuid().clone())
            .or_default()
            .insert(node.reference().index, render_id);
        self.by_render_id.insert(render_id, node);
    }

    pub fn remove(&mut self, render_id: RenderId) -> Option<NodeEntity> {
        let node = self.by_render_id.remove(&render_id)?;
        self.unindex(&node);
        Some(node)
    }

    fn unindex(&mut self, node: &NodeEntity) {
        let reference = node.reference();
        if let Some(indices) = self.by_uuid.get_mut(&reference.uuid) {
            if indices.get(&reference.index) == Some(&node.render_id()) {
                indices.remove(&reference.index);
            }
            if indices.is_empty() {
                self.by_uuid.remove(&reference.uuid);
            }
        }
    }

    pub fn get(&self, render_id: RenderId) -> Option<&NodeEntity> {
        self.by_render_id.get(&render_id)
    }

    pub(crate) fn get_mut(&mut self, render_id: RenderId) -> Option<&mut NodeEntity> {
        self.by_render_id.get_mut(&render_id)
    }

    pub fn contains(&self, render_id: RenderId) -> bool {
        self.by_render_id.contains_key(&render_id)
    }

    /// Every on-canvas instance of `uuid`, keyed by index.
    pub fn get_by_uuid(&self, uuid: &RecordId) -> BTreeMap<u32, &NodeEntity> {
        let Some(indices) = self.by_uuid.get(uuid) else {
            return BTreeMap::new();
        };
        indices
            .iter()
            .filter_map(|(index, id)| self.by_render_id.get(id).map(|node| (*index, node)))
            .collect()
    }

    /// Render ids of every instance of `uuid`, ordered by index.
    pub fn ids_by_uuid(&self, uuid: &RecordId) -> Vec<RenderId> {
        self.by_uuid
            .get(uuid)
            .map(|indices| indices.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains_uuid(&self, uuid: &RecordId) -> bool {
        self.by_uuid.contains_key(uuid)
    }

    pub fn is_index_free(&self, uuid: &RecordId, index: u32) -> bool {
        self.by_uuid
            .get(uuid)
            .map_or(true, |indices| !indices.contains_key(&index))
    }

    /// `max(existing indices) + 1`, or `0` for a uuid not yet in the diagram.
    pub fn next_index(&self, uuid: &RecordId) -> u32 {
        self.by_uuid
            .get(uuid)
            .and_then(|indices| indices.keys().next_back())
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Render ids in ascending order.
    pub fn ids(&self) -> Vec<RenderId> {
        let mut ids = self.by_render_id.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeEntity> + '_ {
        self.by_render_id.values()
    }

    pub fn uuids(&self) -> impl Iterator<Item = &RecordId> + '_ {
        self.by_uuid.keys()
    }

    pub fn len(&self) -> usize {
        self.by_render_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_render_id.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RelationsMap {
    by_render_id: HashMap<RenderId, RelationEntity>,
    by_uuid: HashMap<RecordId, Vec<RenderId>>,
}

impl RelationsMap {
    pub fn add(&mut self, relation: RelationEntity) {
        let render_id = relation.render_id();
        if let Some(previous) = self.by_render_id.remove(&render_id) {
            self.unindex(&previous);
        }
        if let Some(uuid) = relation.uuid() {
            let ids = self.by_uuid.entry(uuid.clone()).or_default();
            if !ids.contains(&render_id) {
                ids.push(render_id);
            }
        }
        self.by_render_id.insert(render_id, relation);
    }

    pub fn remove(&mut self, render_id: RenderId) -> Option<RelationEntity> {
        let relation = self.by_render_id.remove(&render_id)?;
        self.unindex(&relation);
        Some(relation)
    }

    fn unindex(&mut self, relation: &RelationEntity) {
        let Some(uuid) = relation.uuid() else {
            return;
        };
        if let Some(ids) = self.by_uuid.get_mut(uuid) {
            ids.retain(|id| *id != relation.render_id());
            if ids.is_empty() {
                self.by_uuid.remove(uuid);
            }
        }
    }

    pub fn get(&self, render_id: RenderId) -> Option<&RelationEntity> {
        self.by_render_id.get(&render_id)
    }

    pub(crate) fn get_mut(&mut self, render_id: RenderId) -> Option<&mut RelationEntity> {
        self.by_render_id.get_mut(&render_id)
    }

    pub fn contains(&self, render_id: RenderId) -> bool {
        self.by_render_id.contains_key(&render_id)
    }

    pub fn get_by_uuid(&self, uuid: &RecordId) -> Vec<&RelationEntity> {
        self.by_uuid
            .get(uuid)
            .map(|ids| ids.iter().filter_map(|id| self.by_render_id.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn ids(&self) -> Vec<RenderId> {
        let mut ids = self.by_render_id.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationEntity> + '_ {
        self.by_render_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_render_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_render_id.is_empty()
    }
}

/// One [`RelationsMap`] per [`RelationModeType`]. A relation lives in exactly one of them.
#[derive(Debug, Default)]
pub struct RelationRegistries {
    normal: RelationsMap,
    faint: RelationsMap,
    visual: RelationsMap,
}

impl RelationRegistries {
    pub fn map(&self, mode: RelationModeType) -> &RelationsMap {
        match mode {
            RelationModeType::Normal => &self.normal,
            RelationModeType::Faint => &self.faint,
            RelationModeType::Visual => &self.visual,
        }
    }

    fn map_mut(&mut self, mode: RelationModeType) -> &mut RelationsMap {
        match mode {
            RelationModeType::Normal => &mut self.normal,
            RelationModeType::Faint => &mut self.faint,
            RelationModeType::Visual => &mut self.visual,
        }
    }

    /// Registers `relation` in the registry matching its mode.
    pub fn add(&mut self, relation: RelationEntity) {
        let render_id = relation.render_id();
        for mode in RelationModeType::ALL {
            if mode != relation.mode() {
                self.map_mut(mode).remove(render_id);
            }
        }
        self.map_mut(relation.mode()).add(relation);
    }

    pub fn remove(&mut self, render_id: RenderId) -> Option<RelationEntity> {
        let mode = self.mode_of(render_id)?;
        self.map_mut(mode).remove(render_id)
    }

    /// Moves a relation to the registry of `mode`. Returns the previous mode.
    pub fn reclassify(
        &mut self,
        render_id: RenderId,
        mode: RelationModeType,
    ) -> Option<RelationModeType> {
        let mut relation = self.remove(render_id)?;
        let previous = relation.mode();
        relation.set_mode(mode);
        self.map_mut(mode).add(relation);
        Some(previous)
    }

    pub fn get(&self, render_id: RenderId) -> Option<&RelationEntity> {
        RelationModeType::ALL
            .iter()
            .find_map(|mode| self.map(*mode).get(render_id))
    }

    pub(crate) fn get_mut(&mut self, render_id: RenderId) -> Option<&mut RelationEntity> {
        let mode = self.mode_of(render_id)?;
        self.map_mut(mode).get_mut(render_id)
    }

    pub fn mode_of(&self, render_id: RenderId) -> Option<RelationModeType> {
        RelationModeType::ALL
            .into_iter()
            .find(|mode| self.map(*mode).contains(render_id))
    }

    pub fn contains(&self, render_id: RenderId) -> bool {
        self.mode_of(render_id).is_some()
    }

    pub fn get_by_uuid(&self, uuid: &RecordId) -> Vec<&RelationEntity> {
        RelationModeType::ALL
            .iter()
            .flat_map(|mode| self.map(*mode).get_by_uuid(uuid))
            .collect()
    }

    /// Render ids across all registries, ascending.
    pub fn ids(&self) -> Vec<RenderId> {
        let mut ids = RelationModeType::ALL
            .iter()
            .flat_map(|mode| self.map(*mode).ids())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationEntity> + '_ {
        self.normal
            .iter()
            .chain(self.faint.iter())
            .chain(self.visual.iter())
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.faint.len() + self.visual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
