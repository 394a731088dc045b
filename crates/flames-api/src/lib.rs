pub mod error;
pub mod flames;
pub mod notes;
pub mod zodiac;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use flames_db::NoteStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: NoteStore,
    /// Base used to build shareable note links, without a trailing slash.
    pub public_url: String,
}

impl AppStateInner {
    pub fn new(store: NoteStore, public_url: &str) -> AppState {
        Arc::new(Self {
            store,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn note_url(&self, note_id: &str) -> String {
        format!("{}/note/{}", self.public_url, note_id)
    }
}

/// All API routes. Middleware (CORS, tracing) is layered on by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/create-note", post(notes::create_note))
        .route("/note/{note_id}", get(notes::get_note))
        .route("/unlock-note", post(notes::unlock_note))
        .route("/calculate", post(flames::calculate))
        .route("/zodiac-check", post(zodiac::zodiac_check))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
