//! Admin configuration endpoints.

use axum::{body::Bytes, extract::State, Json};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    ConfigurationRecord, DraftState, PublishOutcome, PublishRequest, SaveDraftOutcome,
    SaveDraftRequest, ValidationReport,
};
use crate::AppState;

/// GET /api/admin/config - Full record including the draft.
pub async fn get_admin_config(State(state): State<AppState>) -> ApiResult<ConfigurationRecord> {
    match state.publisher.store().load_admin().await {
        Ok(record) => {
            let revision_id = record.revision;
            success(record, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// PUT /api/admin/config/draft - Merge a partial update into the draft.
pub async fn save_draft(
    State(state): State<AppState>,
    Json(request): Json<SaveDraftRequest>,
) -> ApiResult<SaveDraftOutcome> {
    let revision_id = state.publisher.store().get_revision().await.unwrap_or(0);

    if request.changes.is_empty() {
        return error(
            AppError::BadRequest("No configuration fields to save".to_string()),
            revision_id,
        );
    }

    match state
        .publisher
        .save_draft(&request.changes, request.expected_revision)
        .await
    {
        Ok(outcome) => {
            let new_revision = outcome.revision;
            success(outcome, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/config/draft-state - Draft vs published status.
pub async fn get_draft_state(State(state): State<AppState>) -> ApiResult<DraftState> {
    match state.publisher.store().get_draft_state().await {
        Ok(draft_state) => {
            let revision_id = draft_state.revision;
            success(draft_state, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// POST /api/admin/config/publish - Promote the draft. The body is optional.
pub async fn publish(State(state): State<AppState>, body: Bytes) -> ApiResult<PublishOutcome> {
    let revision_id = state.publisher.store().get_revision().await.unwrap_or(0);

    let request = if body.iter().all(u8::is_ascii_whitespace) {
        PublishRequest::default()
    } else {
        match serde_json::from_slice::<PublishRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return error(
                    AppError::BadRequest(format!("Invalid publish request: {}", e)),
                    revision_id,
                )
            }
        }
    };

    match state.publisher.publish(request.expected_revision).await {
        Ok(outcome) => {
            let new_revision = outcome.revision;
            success(outcome, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/config/validate - Check the draft against the publish rules.
pub async fn validate_draft(State(state): State<AppState>) -> ApiResult<ValidationReport> {
    let revision_id = state.publisher.store().get_revision().await.unwrap_or(0);

    match state.publisher.validate_draft().await {
        Ok(report) => success(report, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/cache/invalidate - Drop cached public reads.
///
/// Used by content editors outside the draft/publish flow.
pub async fn invalidate_cache(State(state): State<AppState>) -> ApiResult<()> {
    let revision_id = state.publisher.store().get_revision().await.unwrap_or(0);
    state.publisher.invalidate_cache();
    tracing::info!("Public configuration cache invalidated");
    success((), revision_id)
}
