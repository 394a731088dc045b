/// Flames Crypto Library
///
/// Note identifiers come from a CSPRNG and carry no information about the note.
/// Note passwords are stored as Argon2id PHC strings; the plaintext never
/// leaves this crate's call stack.

pub mod ids;
pub mod password;

pub use ids::generate_note_id;
pub use password::{CredentialHasher, HashCost};
