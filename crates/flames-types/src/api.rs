use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Secret notes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNoteResponse {
    pub success: bool,
    pub note_id: String,
    pub note_url: String,
}

/// Public metadata for a note. The message itself is only released by unlock.
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteInfoResponse {
    pub id: String,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub view_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnlockNoteRequest {
    #[serde(default)]
    pub note_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnlockNoteResponse {
    pub success: bool,
    pub message: String,
    pub sender_name: String,
    pub view_count: u64,
}

// -- Compatibility --

#[derive(Debug, Deserialize)]
pub struct FlamesRequest {
    #[serde(default)]
    pub name1: Option<String>,
    #[serde(default)]
    pub name2: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlamesResponse {
    pub result: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ZodiacRequest {
    pub sign1: String,
    pub sign2: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ZodiacResponse {
    pub sign1: String,
    pub element1: String,
    pub sign2: String,
    pub element2: String,
    pub score: u8,
    pub vibe: String,
    pub insight: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub error: String,
}
