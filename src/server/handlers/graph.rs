//! Graph-store smoke test: `/test/neo4j`

use super::{AppState, parse_query, requested_id};
use crate::core::error::{FoundationResult, RecordError, StorageError};
use crate::core::record::{
    ListQuery, RecordQuery, RelationshipList, RelationshipResponse, WriteResponse,
};
use crate::core::{RelationshipInput, StoreKind, TestRecord, TestRecordInput, ValidatedJson};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;

const STORE: StoreKind = StoreKind::Graph;

/// `POST /test/neo4j` - create a test node, then read it back
pub async fn create_node(
    State(connections): State<AppState>,
    ValidatedJson(input): ValidatedJson<TestRecordInput>,
) -> FoundationResult<(StatusCode, Json<WriteResponse>)> {
    let store = connections.graph_store()?;
    let record = TestRecord::new(input);
    let id = record.id.clone();

    store
        .create_node(record)
        .await
        .map_err(|e| StorageError::from_anyhow(STORE, "create node", e))?;

    let stored = store
        .get_node(&id)
        .await
        .map_err(|e| StorageError::from_anyhow(STORE, "read back", e))?
        .ok_or_else(|| {
            StorageError::new(STORE, "read back", format!("node '{}' missing after create", id))
        })?;

    tracing::info!(%id, "test node created");

    Ok((
        StatusCode::CREATED,
        Json(WriteResponse {
            id,
            message: "Node created successfully.".to_string(),
            record: stored,
        }),
    ))
}

/// `GET /test/neo4j[?id=<id>]` - fetch one node, or the most recent one
pub async fn fetch_node(
    State(connections): State<AppState>,
    query: Result<Query<RecordQuery>, QueryRejection>,
) -> FoundationResult<Json<TestRecord>> {
    let query = parse_query(query)?;
    let store = connections.graph_store()?;

    let record = match requested_id(query.id) {
        Some(id) => store
            .get_node(&id)
            .await
            .map_err(|e| StorageError::from_anyhow(STORE, "read", e))?
            .ok_or_else(|| RecordError::not_found(STORE, id))?,
        None => store
            .latest_node()
            .await
            .map_err(|e| StorageError::from_anyhow(STORE, "read", e))?
            .ok_or(RecordError::Empty { store: STORE })?,
    };

    Ok(Json(record))
}

/// `POST /test/neo4j/relationship` - merge two `Person` nodes and link them
pub async fn create_relationship(
    State(connections): State<AppState>,
    ValidatedJson(input): ValidatedJson<RelationshipInput>,
) -> FoundationResult<(StatusCode, Json<RelationshipResponse>)> {
    let store = connections.graph_store()?;

    let relationship = store
        .create_relationship(input.into_relationship())
        .await
        .map_err(|e| StorageError::from_anyhow(STORE, "create relationship", e))?;

    let message = format!(
        "Created ({})-[:{}]->({})",
        relationship.from, relationship.relationship, relationship.to
    );
    tracing::info!(%message, "test relationship merged");

    Ok((
        StatusCode::CREATED,
        Json(RelationshipResponse {
            message,
            relationship,
        }),
    ))
}

/// `GET /test/neo4j/relationships[?limit=<n>]`
pub async fn list_relationships(
    State(connections): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> FoundationResult<Json<RelationshipList>> {
    let limit = parse_query(query)?.effective_limit();
    let store = connections.graph_store()?;

    let relationships = store
        .relationships(limit)
        .await
        .map_err(|e| StorageError::from_anyhow(STORE, "list relationships", e))?;

    Ok(Json(RelationshipList {
        count: relationships.len(),
        relationships,
    }))
}
