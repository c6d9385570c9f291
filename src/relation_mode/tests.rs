// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.
use rstest::{fixture, rstest};

use super::{DraftOutcome, DraftState, RelationMode, RelationModeError};
use crate::backend::MemoryBackend;
use crate::commands::{Command, CommandContext, History};
use crate::config::EditorConfig;
use crate::graph::DiagramGraph;
use crate::model::{
    BackendRelation, NodeInfo, Point, RecordId, RelationModeType, RenderId, Terminal,
};
use crate::store::save_diagram;

fn uuid(raw: &str) -> RecordId {
    RecordId::new(raw).expect("uuid")
}

fn backend_relation(id: &str, from: &str, to: &str) -> BackendRelation {
    BackendRelation {
        relation_id: uuid(id),
        from: uuid(from),
        to: uuid(to),
        kind: "uses".to_owned(),
    }
}

fn add_node(graph: &mut DiagramGraph, raw: &str, x: f64) -> RenderId {
    graph.new_node(&NodeInfo::new(uuid(raw), raw, Point::new(x, 0.0)), None)
}

struct Canvas {
    graph: DiagramGraph,
    a: RenderId,
    b: RenderId,
    c: RenderId,
    /// `a -> b`, known to the backend as `r1`.
    known: RenderId,
    /// `a -> c`, never stored in the backend.
    unknown: RenderId,
}

#[fixture]
fn canvas() -> Canvas {
    let mut graph = DiagramGraph::new(EditorConfig::default());
    let a = add_node(&mut graph, "a", 0.0);
    let b = add_node(&mut graph, "b", 400.0);
    let c = add_node(&mut graph, "c", 800.0);
    let known = graph.new_relation(
        Terminal::Node(a),
        Terminal::Node(b),
        RelationModeType::Normal,
        Some("uses"),
        Some(uuid("r1")),
    );
    let unknown = graph.new_relation(
        Terminal::Node(a),
        Terminal::Node(c),
        RelationModeType::Normal,
        None,
        Some(uuid("x9")),
    );
    Canvas {
        graph,
        a,
        b,
        c,
        known,
        unknown,
    }
}

fn backend() -> MemoryBackend {
    MemoryBackend::new()
        .with_relation(backend_relation("r1", "a", "b"))
        .with_relation(backend_relation("r2", "b", "c"))
}

fn mode_of(graph: &DiagramGraph, id: RenderId) -> Option<RelationModeType> {
    graph.relations().mode_of(id)
}

#[rstest]
#[tokio::test]
async fn enable_classifies_diagram_relations_and_reveals_missing_ones(canvas: Canvas) {
    let Canvas {
        mut graph,
        b,
        c,
        known,
        unknown,
        ..
    } = canvas;
    let mut mode = RelationMode::new();

    let report = mode.enable(&mut graph, &backend()).await.expect("enable");
    assert!(mode.is_enabled());
    assert_eq!((report.present, report.visual, report.faint), (1, 1, 1));

    assert_eq!(mode_of(&graph, known), Some(RelationModeType::Normal));
    assert_eq!(mode_of(&graph, unknown), Some(RelationModeType::Visual));
    let unknown_relation = graph.relation(unknown).expect("unknown");
    assert_eq!(
        unknown_relation.origin(),
        Some((unknown_relation.source(), unknown_relation.target()))
    );

    let faint = graph.relations().map(RelationModeType::Faint).ids();
    assert_eq!(faint.len(), 1);
    let faint = graph.relation(faint[0]).expect("faint");
    assert_eq!(faint.endpoints(), Some((b, c)));
    assert_eq!(faint.uuid(), Some(&uuid("r2")));
    assert_eq!(faint.label(), Some("uses"));
}

#[rstest]
#[tokio::test]
async fn enable_issues_one_request_per_distinct_record(canvas: Canvas) {
    let mut graph = canvas.graph;
    add_node(&mut graph, "b", 400.0);
    let backend = backend();

    RelationMode::new()
        .enable(&mut graph, &backend)
        .await
        .expect("enable");
    assert_eq!(backend.relation_requests(), 3);
}

#[rstest]
#[tokio::test]
async fn faint_relations_reach_every_instance_but_never_loop(canvas: Canvas) {
    let Canvas { mut graph, a, .. } = canvas;
    let second_b = add_node(&mut graph, "b", 400.0);
    let backend = backend().with_relation(backend_relation("self", "a", "a"));

    RelationMode::new()
        .enable(&mut graph, &backend)
        .await
        .expect("enable");

    let faint = graph
        .relations()
        .map(RelationModeType::Faint)
        .iter()
        .filter_map(|relation| relation.endpoints())
        .collect::<Vec<_>>();
    assert!(faint.contains(&(a, second_b)));
    assert!(faint.iter().all(|(s, t)| s != t));
    // r1 to the first b instance is already drawn.
    assert_eq!(
        faint
            .iter()
            .filter(|(s, _)| *s == a)
            .count(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn reversed_relation_does_not_count_as_present(canvas: Canvas) {
    let Canvas {
        mut graph, a, b, ..
    } = canvas;
    let reversed = graph.new_relation(
        Terminal::Node(b),
        Terminal::Node(a),
        RelationModeType::Normal,
        None,
        Some(uuid("r2")),
    );
    let backend = MemoryBackend::new().with_relation(backend_relation("r2", "a", "b"));

    let report = RelationMode::new()
        .enable(&mut graph, &backend)
        .await
        .expect("enable");
    assert_eq!(mode_of(&graph, reversed), Some(RelationModeType::Visual));
    assert_eq!(report.faint, 1);
}

#[rstest]
#[tokio::test]
async fn failed_fetch_leaves_the_diagram_untouched(canvas: Canvas) {
    let Canvas {
        mut graph, unknown, ..
    } = canvas;
    let before = save_diagram(&graph);
    let backend = backend().with_unreachable(uuid("c"));
    let mut mode = RelationMode::new();

    let err = mode.enable(&mut graph, &backend).await.unwrap_err();
    match err {
        RelationModeError::Backend { uuid: failed, .. } => assert_eq!(failed, uuid("c")),
        other => panic!("expected Backend error, got: {other:?}"),
    }
    assert!(!mode.is_enabled());
    assert_eq!(save_diagram(&graph), before);
    assert_eq!(mode_of(&graph, unknown), Some(RelationModeType::Normal));
    assert!(graph.relations().map(RelationModeType::Faint).is_empty());
}

#[rstest]
#[tokio::test]
async fn toggles_reject_repeated_calls(mut canvas: Canvas) {
    let mut mode = RelationMode::new();
    assert!(matches!(
        mode.disable(&mut canvas.graph),
        Err(RelationModeError::NotEnabled)
    ));
    mode.enable(&mut canvas.graph, &backend())
        .await
        .expect("enable");
    assert!(matches!(
        mode.enable(&mut canvas.graph, &backend()).await,
        Err(RelationModeError::AlreadyEnabled)
    ));
}

#[rstest]
#[tokio::test]
async fn disable_drops_faint_and_promotes_visual(canvas: Canvas) {
    let Canvas {
        mut graph,
        known,
        unknown,
        ..
    } = canvas;
    let mut mode = RelationMode::new();
    mode.enable(&mut graph, &backend()).await.expect("enable");

    let report = mode.disable(&mut graph).expect("disable");
    assert!(!mode.is_enabled());
    assert_eq!(report.removed_faint, 1);
    assert_eq!(report.promoted, 1);
    assert!(graph.relations().map(RelationModeType::Faint).is_empty());
    assert!(graph.relations().map(RelationModeType::Visual).is_empty());
    assert_eq!(mode_of(&graph, known), Some(RelationModeType::Normal));
    assert_eq!(mode_of(&graph, unknown), Some(RelationModeType::Normal));
    assert_eq!(graph.relation(unknown).expect("unknown").origin(), None);
    assert_eq!(save_diagram(&graph).relations.len(), 2);
}

#[rstest]
#[tokio::test]
async fn disable_puts_detached_visual_relations_back(canvas: Canvas) {
    let Canvas {
        mut graph,
        a,
        c,
        unknown,
        ..
    } = canvas;
    let mut mode = RelationMode::new();
    mode.enable(&mut graph, &backend()).await.expect("enable");
    graph.set_terminals(
        unknown,
        Terminal::Node(a),
        Terminal::Point(Point::new(50.0, 500.0)),
    );

    let report = mode.disable(&mut graph).expect("disable");
    assert_eq!(report.reset, 1);
    let relation = graph.relation(unknown).expect("unknown");
    assert_eq!(relation.endpoints(), Some((a, c)));
    assert_eq!(relation.mode(), RelationModeType::Normal);
}

#[rstest]
#[tokio::test]
async fn disable_removes_detached_visual_relations_without_origin(canvas: Canvas) {
    let Canvas {
        mut graph, a, b, ..
    } = canvas;
    let mut mode = RelationMode::new();
    mode.enable(&mut graph, &backend()).await.expect("enable");
    let drawn = graph.new_relation(
        Terminal::Node(a),
        Terminal::Node(b),
        RelationModeType::Visual,
        None,
        None,
    );
    graph.set_terminals(
        drawn,
        Terminal::Point(Point::new(0.0, 300.0)),
        Terminal::Node(b),
    );

    let report = mode.disable(&mut graph).expect("disable");
    assert_eq!(report.dropped, 1);
    assert!(!graph.relations().contains(drawn));
    assert!(!graph.scene().contains(drawn));
}

#[rstest]
#[tokio::test]
async fn drawing_gesture_creates_a_visual_relation(canvas: Canvas) {
    let Canvas {
        mut graph, b, c, ..
    } = canvas;
    let mut mode = RelationMode::new();
    mode.enable(&mut graph, &backend()).await.expect("enable");
    let cells = graph.scene().len();

    let draft = mode.draft_mut();
    assert_eq!(
        draft.click_node(&mut graph, c),
        DraftOutcome::Started { source: c }
    );
    assert_eq!(graph.scene().len(), cells + 1);
    assert_eq!(
        draft.click_node(&mut graph, b),
        DraftOutcome::AwaitingConfirmation {
            source: c,
            target: b
        }
    );
    let command = draft.confirm(&mut graph, " owns ").expect("command");
    assert_eq!(draft.state(), DraftState::Idle);
    assert_eq!(graph.scene().len(), cells);
    assert!(command.uuid().is_some());

    let mut history = History::new(0);
    history.execute(
        Command::CreateRelation(command),
        &mut CommandContext {
            graph: &mut graph,
            relation_mode: true,
        },
    );
    let visual = graph.relations().map(RelationModeType::Visual).ids();
    assert_eq!(visual.len(), 2);
    let drawn = visual
        .iter()
        .filter_map(|id| graph.relation(*id))
        .find(|relation| relation.endpoints() == Some((c, b)))
        .expect("drawn relation");
    assert_eq!(drawn.label(), Some("owns"));
}

#[rstest]
fn loose_end_stops_short_of_the_pointer(mut canvas: Canvas) {
    let mut mode = RelationMode::new();
    let draft = mode.draft_mut();
    draft.click_node(&mut canvas.graph, canvas.a);
    let DraftState::Drawing { link, .. } = draft.state() else {
        panic!("expected drawing state");
    };

    // Node `a` is centered on (80, 30).
    assert!(draft.pointer_moved(&mut canvas.graph, Point::new(80.0, 130.0)));
    let Some(Terminal::Point(end)) = canvas.graph.scene().get(link).and_then(|cell| cell.target())
    else {
        panic!("expected a point terminal");
    };
    assert!((end.x - 80.0).abs() < 1e-9);
    assert!((end.y - 120.0).abs() < 1e-9);
}

#[rstest]
fn clicking_the_source_or_blank_space_cancels(mut canvas: Canvas) {
    let cells = canvas.graph.scene().len();
    let mut mode = RelationMode::new();
    let draft = mode.draft_mut();

    draft.click_node(&mut canvas.graph, canvas.a);
    assert_eq!(draft.click_node(&mut canvas.graph, canvas.a), DraftOutcome::Cancelled);
    assert_eq!(canvas.graph.scene().len(), cells);

    draft.click_node(&mut canvas.graph, canvas.a);
    assert_eq!(draft.click_blank(&mut canvas.graph), DraftOutcome::Cancelled);
    assert_eq!(draft.state(), DraftState::Idle);
    assert_eq!(canvas.graph.scene().len(), cells);
    assert!(draft.confirm(&mut canvas.graph, "late").is_none());
}

#[rstest]
fn confirmation_is_dropped_when_a_node_disappears(mut canvas: Canvas) {
    let mut mode = RelationMode::new();
    let draft = mode.draft_mut();
    draft.click_node(&mut canvas.graph, canvas.a);
    draft.click_node(&mut canvas.graph, canvas.b);
    canvas.graph.remove_existing_node(canvas.b);

    assert!(draft.confirm(&mut canvas.graph, "").is_none());
    assert!(!draft.is_active());
}
