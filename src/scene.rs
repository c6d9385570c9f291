// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory rendering surface.
//!
//! The scene owns every visual cell (node bodies and relation links) and assigns their
//! [`RenderId`]s. Renderers read cells from here and write back geometry changed by direct
//! manipulation (dragging, resizing, bending); the engine reads that geometry when it records
//! commands.

use std::collections::{BTreeMap, BTreeSet};

use smol_str::SmolStr;

use crate::model::{Anchors, Point, Rect, RenderId, Shape, Size, Terminal, Vertices};
use crate::style::LinkTools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Node,
    Link,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    kind: CellKind,
    rect: Rect,
    shape: Option<Shape>,
    source: Option<Terminal>,
    target: Option<Terminal>,
    vertices: Vertices,
    anchors: Anchors,
    tools: LinkTools,
    attrs: BTreeMap<SmolStr, String>,
}

impl Cell {
    pub fn node(shape: Shape, rect: Rect) -> Self {
        Self {
            kind: CellKind::Node,
            rect,
            shape: Some(shape),
            source: None,
            target: None,
            vertices: Vertices::new(),
            anchors: Anchors::default(),
            tools: LinkTools::default(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn link(source: Terminal, target: Terminal) -> Self {
        Self {
            kind: CellKind::Link,
            rect: Rect::default(),
            shape: None,
            source: Some(source),
            target: Some(target),
            vertices: Vertices::new(),
            anchors: Anchors::default(),
            tools: LinkTools::default(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    pub fn source(&self) -> Option<Terminal> {
        self.source
    }

    pub fn target(&self) -> Option<Terminal> {
        self.target
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn anchors(&self) -> Anchors {
        self.anchors
    }

    pub fn tools(&self) -> LinkTools {
        self.tools
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn attrs(&self) -> &BTreeMap<SmolStr, String> {
        &self.attrs
    }
}

/// Cells changed since the last [`Scene::take_delta`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SceneDelta {
    pub added: Vec<RenderId>,
    pub removed: Vec<RenderId>,
    pub updated: Vec<RenderId>,
}

impl SceneDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<RenderId>,
    removed: BTreeSet<RenderId>,
    updated: BTreeSet<RenderId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, id: RenderId) {
        self.removed.remove(&id);
        self.updated.remove(&id);
        self.added.insert(id);
    }

    fn record_removed(&mut self, id: RenderId) {
        self.added.remove(&id);
        self.updated.remove(&id);
        self.removed.insert(id);
    }

    fn record_updated(&mut self, id: RenderId) {
        if self.added.contains(&id) || self.removed.contains(&id) {
            return;
        }
        self.updated.insert(id);
    }

    fn finish(&mut self) -> SceneDelta {
        let delta = std::mem::take(self);
        SceneDelta {
            added: delta.added.into_iter().collect(),
            removed: delta.removed.into_iter().collect(),
            updated: delta.updated.into_iter().collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    next_id: u64,
    cells: BTreeMap<RenderId, Cell>,
    delta: DeltaBuilder,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a fresh id. Ids are never handed out twice.
    pub fn allocate_id(&mut self) -> RenderId {
        self.next_id += 1;
        RenderId::from_raw(self.next_id)
    }

    /// Attaches `cell` under `id`, replacing whatever was attached there.
    pub fn insert(&mut self, id: RenderId, cell: Cell) {
        self.cells.insert(id, cell);
        self.delta.record_added(id);
    }

    pub fn remove(&mut self, id: RenderId) -> Option<Cell> {
        let cell = self.cells.remove(&id)?;
        self.delta.record_removed(id);
        Some(cell)
    }

    pub fn contains(&self, id: RenderId) -> bool {
        self.cells.contains_key(&id)
    }

    pub fn get(&self, id: RenderId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn cells(&self) -> impl Iterator<Item = (RenderId, &Cell)> + '_ {
        self.cells.iter().map(|(id, cell)| (*id, cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        let ids = self.cells.keys().copied().collect::<Vec<_>>();
        for id in ids {
            self.remove(id);
        }
    }

    pub fn take_delta(&mut self) -> SceneDelta {
        self.delta.finish()
    }

    fn update<R>(&mut self, id: RenderId, f: impl FnOnce(&mut Cell) -> R) -> Option<R> {
        let cell = self.cells.get_mut(&id)?;
        let result = f(cell);
        self.delta.record_updated(id);
        Some(result)
    }

    pub fn bbox(&self, id: RenderId) -> Option<Rect> {
        self.get(id).map(Cell::rect)
    }

    pub fn center(&self, id: RenderId) -> Option<Point> {
        self.bbox(id).map(|rect| rect.center())
    }

    pub fn position(&self, id: RenderId) -> Option<Point> {
        self.bbox(id).map(|rect| rect.origin)
    }

    pub fn set_position(&mut self, id: RenderId, position: Point) -> bool {
        self.update(id, |cell| cell.rect.origin = position).is_some()
    }

    pub fn size(&self, id: RenderId) -> Option<Size> {
        self.bbox(id).map(|rect| rect.size)
    }

    pub fn set_rect(&mut self, id: RenderId, rect: Rect) -> bool {
        self.update(id, |cell| cell.rect = rect).is_some()
    }

    pub fn vertices(&self, id: RenderId) -> Option<&[Point]> {
        self.get(id).map(Cell::vertices)
    }

    pub fn set_vertices(&mut self, id: RenderId, vertices: Vertices) -> bool {
        self.update(id, |cell| cell.vertices = vertices).is_some()
    }

    pub fn anchors(&self, id: RenderId) -> Option<Anchors> {
        self.get(id).map(Cell::anchors)
    }

    pub fn set_anchors(&mut self, id: RenderId, anchors: Anchors) -> bool {
        self.update(id, |cell| cell.anchors = anchors).is_some()
    }

    pub fn set_terminals(&mut self, id: RenderId, source: Terminal, target: Terminal) -> bool {
        self.update(id, |cell| {
            cell.source = Some(source);
            cell.target = Some(target);
        })
        .is_some()
    }

    /// Moves the dangling end of a link. Only point terminals follow the pointer.
    pub fn set_target_point(&mut self, id: RenderId, point: Point) -> bool {
        self.update(id, |cell| cell.target = Some(Terminal::Point(point)))
            .is_some()
    }

    pub fn set_tools(&mut self, id: RenderId, tools: LinkTools) -> bool {
        self.update(id, |cell| cell.tools = tools).is_some()
    }

    pub fn set_attr(&mut self, id: RenderId, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(id, |cell| {
            cell.attrs.insert(SmolStr::new(key), value);
        })
        .is_some()
    }

    pub fn attr(&self, id: RenderId, key: &str) -> Option<&str> {
        self.get(id)?.attr(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, Scene};
    use crate::model::{Point, Rect, Shape, Size};

    fn node_cell() -> Cell {
        Cell::node(
            Shape::Rectangle,
            Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0)),
        )
    }

    #[test]
    fn ids_are_never_reused() {
        let mut scene = Scene::new();
        let a = scene.allocate_id();
        scene.insert(a, node_cell());
        scene.remove(a);
        let b = scene.allocate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn delta_collapses_updates_into_adds() {
        let mut scene = Scene::new();
        let a = scene.allocate_id();
        scene.insert(a, node_cell());
        scene.set_position(a, Point::new(5.0, 5.0));

        let delta = scene.take_delta();
        assert_eq!(delta.added, vec![a]);
        assert!(delta.updated.is_empty());
        assert!(scene.take_delta().is_empty());

        scene.set_attr(a, "fill", "#fff");
        assert_eq!(scene.take_delta().updated, vec![a]);

        scene.set_position(a, Point::new(1.0, 1.0));
        scene.remove(a);
        let delta = scene.take_delta();
        assert_eq!(delta.removed, vec![a]);
        assert!(delta.updated.is_empty());
    }

    #[test]
    fn updates_on_missing_cells_are_ignored() {
        let mut scene = Scene::new();
        let ghost = scene.allocate_id();
        assert!(!scene.set_position(ghost, Point::new(1.0, 1.0)));
        assert!(scene.take_delta().is_empty());
    }
}
