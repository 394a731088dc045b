use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL};
use rand::RngCore;

/// Random bytes per note id (64 bits of entropy).
pub const NOTE_ID_BYTES: usize = 8;

/// Length of the encoded id: 8 bytes -> 11 base64url characters.
pub const NOTE_ID_LEN: usize = 11;

/// Generate a fresh note id, e.g. `xK7mP9qR-3a`.
///
/// The id is URL-safe and is not derived from content, time or sequence.
/// Uniqueness against existing rows is enforced by the store on insert.
pub fn generate_note_id() -> String {
    let mut bytes = [0u8; NOTE_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    BASE64_URL.encode(bytes)
}

/// Cheap shape check used before touching the database with a caller-supplied id.
pub fn is_well_formed_note_id(id: &str) -> bool {
    id.len() == NOTE_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
