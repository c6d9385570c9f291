// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Sibling relation layout.
//!
//! Relations sharing the same (unordered) node pair are fanned out by giving each one a single
//! bend point on the perpendicular through the midpoint of the two node centers. Candidates
//! alternate between the two sides of the direct line and move outwards by `gap` every second
//! step. A candidate too close to an already placed bend point is skipped.

use crate::model::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiblingParams {
    pub gap: f64,
    pub min_distance: f64,
}

impl Default for SiblingParams {
    fn default() -> Self {
        Self {
            gap: 120.0,
            min_distance: 10.0,
        }
    }
}

/// The `i`-th candidate bend point for a group of `count` siblings.
pub fn candidate_vertex(i: usize, count: usize, midpoint: Point, theta: f64, gap: f64) -> Point {
    let sign = if i % 2 == 0 { -1.0 } else { 1.0 };
    let mut offset = gap * i.div_ceil(2) as f64;
    if count % 2 == 0 {
        offset -= gap / 2.0 * sign;
    }
    let reverse = if theta < 180.0 { 1.0 } else { -1.0 };
    Point::from_polar(offset, theta + sign * reverse * 90.0, midpoint)
}

/// Computes bend points for the relations between two nodes.
///
/// `siblings` holds the current vertices of every relation between the pair, in a stable order.
/// The result has one entry per sibling: `Some(vertex)` when the sibling should be bent through
/// that single vertex, `None` when it must be left as is. With `rearrange_all == false`,
/// siblings that already have vertices are kept and their bend points block nearby candidates.
pub fn arrange_siblings(
    source_center: Point,
    target_center: Point,
    siblings: &[&[Point]],
    rearrange_all: bool,
    params: SiblingParams,
) -> Vec<Option<Point>> {
    let count = siblings.len();
    let mut placements = vec![None; count];
    if count <= 1 {
        return placements;
    }

    let midpoint = source_center.midpoint(target_center);
    let theta = source_center.theta(target_center);

    let mut placed: Vec<Point> = if rearrange_all {
        Vec::new()
    } else {
        siblings.iter().flat_map(|v| v.iter().copied()).collect()
    };

    let mut i = 0usize;
    for (slot, vertices) in siblings.iter().enumerate() {
        if !rearrange_all && !vertices.is_empty() {
            continue;
        }
        // Offsets grow with `i`, so a free candidate always exists.
        let vertex = loop {
            let candidate = candidate_vertex(i, count, midpoint, theta, params.gap);
            i += 1;
            if placed
                .iter()
                .all(|p| p.distance(candidate) >= params.min_distance)
            {
                break candidate;
            }
        };
        placed.push(vertex);
        placements[slot] = Some(vertex);
    }
    placements
}
