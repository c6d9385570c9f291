// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use super::{DiagramGraph, Settled};
use crate::config::EditorConfig;
use crate::model::{
    NodeInfo, Point, RecordId, RelationModeType, RenderId, Shape, Terminal,
};

fn uuid(raw: &str) -> RecordId {
    RecordId::new(raw).expect("uuid")
}

fn info(raw: &str, x: f64, y: f64) -> NodeInfo {
    NodeInfo::new(uuid(raw), raw.to_uppercase(), Point::new(x, y))
}

struct Pair {
    graph: DiagramGraph,
    a: RenderId,
    b: RenderId,
}

#[fixture]
fn pair() -> Pair {
    let mut graph = DiagramGraph::new(EditorConfig::default());
    let a = graph.new_node(&info("a", 0.0, 0.0), None);
    let b = graph.new_node(&info("b", 400.0, 0.0), None);
    Pair { graph, a, b }
}

fn link(graph: &mut DiagramGraph, from: RenderId, to: RenderId, mode: RelationModeType) -> RenderId {
    graph.new_relation(Terminal::Node(from), Terminal::Node(to), mode, None, None)
}

#[test]
fn indices_for_repeated_uuid_count_up_from_zero() {
    let mut graph = DiagramGraph::new(EditorConfig::default());
    let ids = (0..3)
        .map(|_| graph.new_node(&info("u1", 0.0, 0.0), None))
        .collect::<Vec<_>>();
    let indices = ids
        .iter()
        .map(|id| graph.node(*id).expect("node").reference().index)
        .collect::<Vec<_>>();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn new_node_applies_default_size_and_contrast_label() {
    let mut graph = DiagramGraph::new(EditorConfig::default());
    let id = graph.new_node(
        &info("dark", 10.0, 20.0).with_color("#101010").with_shape(Shape::Circle),
        None,
    );
    let cell = graph.scene().get(id).expect("cell");
    assert_eq!(cell.shape(), Some(Shape::Circle));
    assert_eq!(cell.rect().size, graph.config().default_node_size);
    assert_eq!(cell.attr("body/fill"), Some("#101010"));
    assert_eq!(
        cell.attr("label/fill"),
        Some(graph.config().palette.light_label.as_str())
    );
    assert_eq!(cell.attr("label/text"), Some("DARK"));
}

#[rstest]
fn relations_register_on_both_endpoints(mut pair: Pair) {
    let r = link(&mut pair.graph, pair.a, pair.b, RelationModeType::Normal);
    let a = pair.graph.node(pair.a).expect("a");
    let b = pair.graph.node(pair.b).expect("b");
    assert!(a.outgoing_relations().contains(&r));
    assert!(b.incoming_relations().contains(&r));
    assert!(a.incoming_relations().is_empty());
}

#[rstest]
fn removing_a_node_cascades_to_all_its_relations(mut pair: Pair) {
    let graph = &mut pair.graph;
    let c = graph.new_node(&info("c", 0.0, 300.0), None);
    let out1 = link(graph, pair.a, pair.b, RelationModeType::Normal);
    let out2 = link(graph, pair.a, c, RelationModeType::Visual);
    let inc = link(graph, c, pair.a, RelationModeType::Faint);

    let removed = graph.remove_existing_node(pair.a).expect("removed");
    assert_eq!(removed.relations().len(), 3);
    for id in [out1, out2, inc] {
        assert!(graph.relation(id).is_none());
        assert!(!graph.scene().contains(id));
    }
    assert!(graph.relations().is_empty());
    let b = graph.node(pair.b).expect("b");
    assert!(b.incoming_relations().is_empty());
    let c = graph.node(c).expect("c");
    assert!(c.relation_ids().is_empty());
}

#[rstest]
fn restoring_a_node_brings_back_the_same_relations(mut pair: Pair) {
    let graph = &mut pair.graph;
    let r = link(graph, pair.a, pair.b, RelationModeType::Normal);
    graph.scene_mut().set_vertices(r, smallvec::smallvec![Point::new(5.0, 5.0)]);
    graph.set_relation_label(r, Some("owns"));

    let removed = graph.remove_existing_node(pair.b).expect("removed");
    let id = graph.restore_node(removed, false);
    assert_eq!(id, pair.b);

    let relation = graph.relation(r).expect("relation restored");
    assert_eq!(relation.label(), Some("owns"));
    assert_eq!(graph.scene().vertices(r), Some(&[Point::new(5.0, 5.0)][..]));
    assert!(graph.node(pair.a).expect("a").outgoing_relations().contains(&r));
    assert!(graph.node(pair.b).expect("b").incoming_relations().contains(&r));
}

#[rstest]
fn relation_cannot_be_restored_onto_a_missing_node(mut pair: Pair) {
    let graph = &mut pair.graph;
    let r = link(graph, pair.a, pair.b, RelationModeType::Normal);
    let detached = graph.remove_existing_relation(r).expect("detached");
    graph.remove_existing_node(pair.b);

    let rejected = graph.add_existing_relation(detached).expect_err("endpoint missing");
    assert_eq!(rejected.render_id(), r);
    assert!(graph.relation(r).is_none());
}

#[rstest]
#[case::outside_relation_mode(false)]
#[case::inside_relation_mode(true)]
fn restored_transient_relations_follow_relation_mode(mut pair: Pair, #[case] relation_mode: bool) {
    let graph = &mut pair.graph;
    let faint = link(graph, pair.a, pair.b, RelationModeType::Faint);
    let visual = link(graph, pair.b, pair.a, RelationModeType::Visual);
    graph.set_relation_origin(visual, Some((Terminal::Node(pair.b), Terminal::Node(pair.a))));

    let removed = graph.remove_existing_node(pair.b).expect("removed");
    graph.restore_node(removed, relation_mode);

    let relation = graph.relation(visual).expect("visual relation restored");
    if relation_mode {
        assert!(graph.relation(faint).is_some());
        assert_eq!(relation.mode(), RelationModeType::Visual);
        assert!(relation.origin().is_some());
    } else {
        assert!(graph.relation(faint).is_none());
        assert!(graph.relations().map(RelationModeType::Faint).is_empty());
        assert_eq!(relation.mode(), RelationModeType::Normal);
        assert_eq!(relation.origin(), None);
    }
}

#[rstest]
fn settling_moves_a_dangling_visual_relation_back_to_its_origin(mut pair: Pair) {
    let graph = &mut pair.graph;
    let visual = link(graph, pair.a, pair.b, RelationModeType::Visual);
    graph.set_relation_origin(visual, Some((Terminal::Node(pair.a), Terminal::Node(pair.b))));
    graph.set_terminals(visual, Terminal::Node(pair.a), Terminal::Point(Point::new(90.0, 90.0)));

    assert_eq!(graph.settle_relation(visual), Some(Settled::Reset));
    let relation = graph.relation(visual).expect("relation");
    assert_eq!(relation.endpoints(), Some((pair.a, pair.b)));
    assert_eq!(relation.mode(), RelationModeType::Normal);
    assert!(graph.node(pair.b).expect("b").incoming_relations().contains(&visual));

    assert_eq!(graph.settle_relation(visual), Some(Settled::Unchanged));
}

#[test]
fn reattached_node_gets_a_new_index_when_its_own_was_taken() {
    let mut graph = DiagramGraph::new(EditorConfig::default());
    let first = graph.new_node(&info("u1", 0.0, 0.0), None);
    let removed = graph.remove_existing_node(first).expect("removed");
    let second = graph.new_node(&info("u1", 0.0, 0.0), None);
    assert_eq!(graph.node(second).expect("second").reference().index, 0);

    graph.restore_node(removed, false);
    assert_eq!(graph.node(first).expect("first").reference().index, 1);
}

#[rstest]
fn mode_change_moves_registry_and_restyles(mut pair: Pair) {
    let graph = &mut pair.graph;
    let r = link(graph, pair.a, pair.b, RelationModeType::Normal);
    assert_eq!(
        graph.set_relation_mode(r, RelationModeType::Visual),
        Some(RelationModeType::Normal)
    );
    assert_eq!(graph.relations().mode_of(r), Some(RelationModeType::Visual));
    let cell = graph.scene().get(r).expect("cell");
    assert!(cell.tools().remove);
    assert_eq!(
        cell.attr("line/stroke"),
        Some(graph.config().palette.visual_relation.as_str())
    );
    assert_eq!(graph.set_relation_mode(RenderId::from_raw(999), RelationModeType::Faint), None);
}

#[rstest]
fn reconnecting_updates_both_old_and_new_endpoints(mut pair: Pair) {
    let graph = &mut pair.graph;
    let c = graph.new_node(&info("c", 0.0, 300.0), None);
    let r = link(graph, pair.a, pair.b, RelationModeType::Visual);

    assert!(graph.set_terminals(r, Terminal::Node(pair.a), Terminal::Node(c)));
    assert!(graph.node(pair.b).expect("b").incoming_relations().is_empty());
    assert!(graph.node(c).expect("c").incoming_relations().contains(&r));
    assert_eq!(
        graph.scene().get(r).and_then(|cell| cell.target()),
        Some(Terminal::Node(c))
    );
}

#[rstest]
fn siblings_between_a_pair_are_fanned_out(mut pair: Pair) {
    let graph = &mut pair.graph;
    let r1 = link(graph, pair.a, pair.b, RelationModeType::Normal);
    let r2 = link(graph, pair.b, pair.a, RelationModeType::Normal);
    let other = graph.new_node(&info("c", 0.0, 300.0), None);
    let lone = link(graph, pair.a, other, RelationModeType::Normal);

    assert_eq!(graph.relations_between(pair.a, pair.b), vec![r1, r2]);
    let log = graph.arrange_siblings_of_node(pair.a, false);
    assert_eq!(log.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![r1, r2]);

    let v1 = graph.scene().vertices(r1).expect("r1")[0];
    let v2 = graph.scene().vertices(r2).expect("r2")[0];
    assert!((v1.distance(v2) - 120.0).abs() < 1e-9);
    assert!(graph.scene().vertices(lone).expect("lone").is_empty());

    // Already bent siblings are kept unless everything is rearranged.
    assert!(graph.arrange_siblings(pair.a, pair.b, false).is_empty());
    assert_eq!(graph.arrange_siblings(pair.a, pair.b, true).len(), 2);

    graph.restore_bends(log);
    assert!(graph.scene().vertices(r1).expect("r1").is_empty());
    assert!(graph.scene().vertices(r2).expect("r2").is_empty());
}

#[rstest]
fn clear_empties_scene_and_registries(mut pair: Pair) {
    let graph = &mut pair.graph;
    link(graph, pair.a, pair.b, RelationModeType::Normal);
    graph.clear();
    assert!(graph.nodes().is_empty());
    assert!(graph.relations().is_empty());
    assert!(graph.scene().is_empty());
}
