//! Document-store smoke test: `/test/mongo`

use super::{AppState, parse_query, requested_id};
use crate::core::error::{FoundationResult, RecordError, StorageError};
use crate::core::record::{ListQuery, RecordList, RecordQuery, WriteResponse};
use crate::core::{StoreKind, TestRecord, TestRecordInput, ValidatedJson};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;

const STORE: StoreKind = StoreKind::Document;

/// `POST /test/mongo` - insert a test record, then read it back
pub async fn insert_document(
    State(connections): State<AppState>,
    ValidatedJson(input): ValidatedJson<TestRecordInput>,
) -> FoundationResult<(StatusCode, Json<WriteResponse>)> {
    let store = connections.document_store()?;
    let record = TestRecord::new(input);
    let id = record.id.clone();

    store
        .insert(record)
        .await
        .map_err(|e| StorageError::from_anyhow(STORE, "insert", e))?;

    let stored = store
        .get(&id)
        .await
        .map_err(|e| StorageError::from_anyhow(STORE, "read back", e))?
        .ok_or_else(|| {
            StorageError::new(STORE, "read back", format!("document '{}' missing after insert", id))
        })?;

    tracing::info!(%id, "test document inserted");

    Ok((
        StatusCode::CREATED,
        Json(WriteResponse {
            id,
            message: "Document inserted successfully.".to_string(),
            record: stored,
        }),
    ))
}

/// `GET /test/mongo[?id=<id>]` - fetch one record, or the most recent one
pub async fn fetch_document(
    State(connections): State<AppState>,
    query: Result<Query<RecordQuery>, QueryRejection>,
) -> FoundationResult<Json<TestRecord>> {
    let query = parse_query(query)?;
    let store = connections.document_store()?;

    let record = match requested_id(query.id) {
        Some(id) => store
            .get(&id)
            .await
            .map_err(|e| StorageError::from_anyhow(STORE, "read", e))?
            .ok_or_else(|| RecordError::not_found(STORE, id))?,
        None => store
            .latest()
            .await
            .map_err(|e| StorageError::from_anyhow(STORE, "read", e))?
            .ok_or(RecordError::Empty { store: STORE })?,
    };

    Ok(Json(record))
}

/// `GET /test/mongo/recent[?limit=<n>]` - newest records first
pub async fn recent_documents(
    State(connections): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> FoundationResult<Json<RecordList>> {
    let limit = parse_query(query)?.effective_limit();
    let store = connections.document_store()?;

    let records = store
        .recent(limit)
        .await
        .map_err(|e| StorageError::from_anyhow(STORE, "list", e))?;

    Ok(Json(RecordList {
        count: records.len(),
        records,
    }))
}
