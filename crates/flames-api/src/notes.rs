use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::{info, warn};

use flames_types::api::{
    CreateNoteRequest, CreateNoteResponse, NoteInfoResponse, UnlockNoteRequest, UnlockNoteResponse,
};

use crate::AppState;
use crate::error::{ApiError, run_blocking};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// POST /create-note: store a password-protected note and hand back its link.
pub async fn create_note(
    State(state): State<AppState>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(message), Some(password)) = (non_empty(req.message), non_empty(req.password)) else {
        return Err(ApiError::BadRequest("Message and password are required".into()));
    };
    let sender_name = req.sender_name;

    let store = state.store.clone();
    let note_id = run_blocking(move || {
        store.create(&message, &password, sender_name.as_deref())
    })
    .await?;

    Ok(Json(CreateNoteResponse {
        success: true,
        note_url: state.note_url(&note_id),
        note_id,
    }))
}

/// GET /note/{note_id}: existence check before prompting for the password.
///
/// Only metadata is returned; the message stays sealed until unlock.
pub async fn get_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let note = run_blocking(move || store.fetch(&note_id)).await?;

    Ok(Json(NoteInfoResponse {
        id: note.id,
        sender_name: note.sender_name,
        created_at: note.created_at,
        expires_at: note.expires_at,
        view_count: note.view_count,
    }))
}

/// POST /unlock-note: verify the password and release the message.
pub async fn unlock_note(
    State(state): State<AppState>,
    Json(req): Json<UnlockNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(note_id), Some(password)) = (non_empty(req.note_id), non_empty(req.password)) else {
        return Err(ApiError::BadRequest("Missing data".into()));
    };

    let store = state.store.clone();
    let id = note_id.clone();
    match run_blocking(move || store.verify_and_reveal(&id, &password)).await {
        Ok(note) => {
            info!(note_id = %note_id, view_count = note.view_count, "Secret note unlocked");
            Ok(Json(UnlockNoteResponse {
                success: true,
                message: note.message,
                sender_name: note.sender_name,
                view_count: note.view_count,
            }))
        }
        // Unknown ids answer exactly like wrong passwords
        Err(ApiError::NotFound | ApiError::IncorrectPassword) => {
            warn!(note_id = %note_id, "Failed unlock attempt");
            Err(ApiError::IncorrectPassword)
        }
        Err(e) => Err(e),
    }
}
