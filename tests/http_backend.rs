// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use galene::backend::{Backend, BackendError, HttpBackend};
use galene::config::{BackendConfig, EditorConfig};
use galene::model::{DiagramId, NodeInfo, Point, RecordId, RelationModeType};
use galene::store::SerializedDiagram;
use galene::DiagramHandler;

type Saved = Arc<Mutex<Vec<(String, Value)>>>;

async fn relations(Path(uuid): Path<String>) -> Result<Json<Value>, StatusCode> {
    match uuid.as_str() {
        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        "a" | "b" => Ok(Json(json!([
            { "relationId": "r1", "from": "a", "to": "b", "type": "KNOWS" }
        ]))),
        _ => Ok(Json(json!([]))),
    }
}

async fn node(Path(uuid): Path<String>) -> Result<Json<Value>, StatusCode> {
    match uuid.as_str() {
        "a" => Ok(Json(json!({
            "nodeId": "a",
            "label": "Person",
            "name": "Ada",
            "color": "#ff8800",
            "attributes": { "born": 1815 }
        }))),
        "team a?b#c" => Ok(Json(json!({ "nodeId": "team a?b#c", "label": "Team" }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn put_diagram(
    State(saved): State<Saved>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    if let Ok(mut saved) = saved.lock() {
        saved.push((id, body));
    }
    StatusCode::NO_CONTENT
}

async fn spawn_server() -> (HttpBackend, Saved) {
    let saved = Saved::default();
    let app = Router::new()
        .route("/api/nodes/{uuid}/relations", get(relations))
        .route("/api/nodes/{uuid}", get(node))
        .route("/api/diagrams/{id}", put(put_diagram))
        .with_state(saved.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let backend = HttpBackend::new(&BackendConfig {
        base_url: format!("http://{addr}/api/"),
        timeout_ms: 5_000,
    })
    .expect("client");
    (backend, saved)
}

fn uuid(raw: &str) -> RecordId {
    RecordId::new(raw).expect("uuid")
}

#[tokio::test]
async fn reads_relations_and_nodes() {
    let (backend, _) = spawn_server().await;

    let relations = backend.relations_of(&uuid("a")).await.expect("relations");
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].relation_id, uuid("r1"));
    assert_eq!(relations[0].kind, "KNOWS");

    let record = backend.node(&uuid("a")).await.expect("node");
    assert_eq!(record.name, "Ada");
    assert_eq!(record.color.as_deref(), Some("#ff8800"));
    assert_eq!(record.attributes.get("born"), Some(&json!(1815)));
}

#[tokio::test]
async fn ids_with_reserved_characters_reach_their_route() {
    let (backend, _) = spawn_server().await;

    let record = backend.node(&uuid("team a?b#c")).await.expect("node");
    assert_eq!(record.node_id, uuid("team a?b#c"));
    assert_eq!(record.label, "Team");
}

#[tokio::test]
async fn maps_error_statuses() {
    let (backend, _) = spawn_server().await;

    match backend.node(&uuid("nobody")).await {
        Err(BackendError::NotFound(missing)) => assert_eq!(missing, uuid("nobody")),
        other => panic!("expected NotFound, got: {other:?}"),
    }
    match backend.relations_of(&uuid("broken")).await {
        Err(BackendError::Status { status, url }) => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/api/nodes/broken/relations"));
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn puts_the_serialized_diagram() {
    let (backend, saved) = spawn_server().await;
    let diagram = SerializedDiagram::from_json_str(
        r#"{"nodes":[{"label":"L","ref":{"uuid":"a","index":0},"name":"","shape":"text","x":1,"y":2}],"relations":[]}"#,
    )
    .expect("diagram");

    backend
        .put_diagram(&DiagramId::new("d-7").expect("diagram id"), &diagram)
        .await
        .expect("put");

    let saved = saved.lock().expect("saved").clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "d-7");
    assert_eq!(saved[0].1["nodes"][0]["ref"]["uuid"], "a");
}

#[tokio::test]
async fn relation_mode_runs_against_the_http_backend() {
    let (backend, _) = spawn_server().await;
    let mut handler = DiagramHandler::new(EditorConfig::default());
    handler.add_node(NodeInfo::new(uuid("a"), "A", Point::new(0.0, 0.0)));
    handler.add_node(NodeInfo::new(uuid("b"), "B", Point::new(400.0, 0.0)));

    let report = handler
        .enable_relation_mode(&backend)
        .await
        .expect("enable");
    assert_eq!(report.faint, 1);
    assert_eq!(
        handler
            .graph()
            .relations()
            .map(RelationModeType::Faint)
            .len(),
        1
    );
}
