use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use flames_crypto::ids::{generate_note_id, is_well_formed_note_id};
use flames_crypto::CredentialHasher;

use crate::Database;
use crate::error::StoreError;
use crate::models::{Note, NoteRow, RevealedNote, normalize};

pub const MAX_MESSAGE_CHARS: usize = 500;
pub const DEFAULT_RETENTION_DAYS: i64 = 30;
pub const DEFAULT_SENDER_NAME: &str = "Someone";

const MAX_ID_ATTEMPTS: u32 = 5;

type IdSource = Arc<dyn Fn() -> String + Send + Sync>;

/// Password-protected notes with a fixed lifetime.
///
/// Expiry is enforced on every read: a note past `expires_at` is `NotFound`
/// whether or not [`NoteStore::sweep`] has removed it yet.
///
/// All methods block (SQLite I/O and Argon2). Async callers should run them
/// on a blocking thread.
#[derive(Clone)]
pub struct NoteStore {
    db: Arc<Database>,
    hasher: CredentialHasher,
    retention: Duration,
    id_source: IdSource,
}

impl NoteStore {
    pub fn new(db: Arc<Database>, hasher: CredentialHasher) -> Self {
        Self {
            db,
            hasher,
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
            id_source: Arc::new(generate_note_id),
        }
    }

    pub fn with_retention_days(mut self, days: i64) -> Result<Self, StoreError> {
        self.retention = Duration::try_days(days)
            .filter(|d| *d > Duration::zero())
            .ok_or_else(|| {
                StoreError::Validation(format!(
                    "retention must be a positive number of days, got {}",
                    days
                ))
            })?;
        Ok(self)
    }

    /// Replace the id generator. Ids that are not 11 URL-safe characters
    /// will never be found again, so only use this with well-formed ids.
    pub fn with_id_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.id_source = Arc::new(source);
        self
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn create(
        &self,
        message: &str,
        password: &str,
        sender_name: Option<&str>,
    ) -> Result<String, StoreError> {
        self.create_at(Utc::now(), message, password, sender_name)
    }

    /// Store a new note created at `now` and return its id.
    pub fn create_at(
        &self,
        now: DateTime<Utc>,
        message: &str,
        password: &str,
        sender_name: Option<&str>,
    ) -> Result<String, StoreError> {
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(StoreError::Validation(format!(
                "Message too long (max {} characters)",
                MAX_MESSAGE_CHARS
            )));
        }

        let created_at = normalize(now);
        let expires_at = created_at
            .checked_add_signed(self.retention)
            .ok_or_else(|| StoreError::Validation("expiry out of range".into()))?;

        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|e| StoreError::Hashing(e.to_string()))?;

        let sender_name = sender_name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SENDER_NAME);

        let mut row = NoteRow {
            id: String::new(),
            message: message.to_string(),
            password_hash,
            sender_name: sender_name.to_string(),
            created_at,
            expires_at,
        };

        for attempt in 1..=MAX_ID_ATTEMPTS {
            row.id = (self.id_source)();
            if self.db.insert_note(&row)? {
                info!(note_id = %row.id, expires_at = %row.expires_at, "Secret note created");
                return Ok(row.id);
            }
            warn!(attempt, "Note id collision, generating a new one");
        }

        Err(StoreError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
    }

    pub fn fetch(&self, id: &str) -> Result<Note, StoreError> {
        self.fetch_at(id, Utc::now())
    }

    pub fn fetch_at(&self, id: &str, now: DateTime<Utc>) -> Result<Note, StoreError> {
        if !is_well_formed_note_id(id) {
            return Err(StoreError::NotFound);
        }
        self.db
            .get_live_note(id, normalize(now))?
            .ok_or(StoreError::NotFound)
    }

    pub fn verify_and_reveal(&self, id: &str, password: &str) -> Result<RevealedNote, StoreError> {
        self.verify_and_reveal_at(id, password, Utc::now())
    }

    /// Check `password` and, if it matches, count the view and release the message.
    ///
    /// The digest is immutable, so it is verified without holding the writer;
    /// the increment and the read-back are a single `UPDATE ... RETURNING`.
    /// A wrong password mutates nothing. Unknown and expired ids still pay for
    /// one Argon2 verification before returning `NotFound`.
    pub fn verify_and_reveal_at(
        &self,
        id: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<RevealedNote, StoreError> {
        let now = normalize(now);
        let digest = if is_well_formed_note_id(id) {
            self.db.get_live_password_hash(id, now)?
        } else {
            None
        };

        let Some(digest) = digest else {
            self.hasher.verify_decoy(password);
            return Err(StoreError::NotFound);
        };

        if !self.hasher.verify(password, &digest) {
            debug!(note_id = %id, "Password rejected");
            return Err(StoreError::Unauthorized);
        }

        // Swept or expired between the check and the update
        self.db
            .increment_view_count(id, now)?
            .ok_or(StoreError::NotFound)
    }

    /// Physically remove notes that expired before `now`. Returns how many went.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.db.delete_expired(normalize(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flames_crypto::HashCost;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn store() -> (TempDir, NoteStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("notes.db")).unwrap();
        let hasher = CredentialHasher::new(HashCost::minimal()).unwrap();
        (dir, NoteStore::new(Arc::new(db), hasher))
    }

    #[test]
    fn create_then_fetch() {
        let (_dir, store) = store();
        let id = store.create("I like you", "rosebud", Some("Anon")).unwrap();

        let note = store.fetch(&id).unwrap();
        assert_eq!(note.id, id);
        assert_eq!(note.message, "I like you");
        assert_eq!(note.sender_name, "Anon");
        assert_eq!(note.view_count, 0);
        assert_eq!(note.expires_at - note.created_at, Duration::days(30));
    }

    #[test]
    fn sender_defaults_to_placeholder() {
        let (_dir, store) = store();
        let a = store.create("hi", "pw", None).unwrap();
        let b = store.create("hi", "pw", Some("   ")).unwrap();
        assert_eq!(store.fetch(&a).unwrap().sender_name, DEFAULT_SENDER_NAME);
        assert_eq!(store.fetch(&b).unwrap().sender_name, DEFAULT_SENDER_NAME);
    }

    #[test]
    fn password_is_not_stored_in_plaintext() {
        let (_dir, store) = store();
        let id = store.create("msg", "hunter2-plain", None).unwrap();

        let digest = store
            .db
            .get_live_password_hash(&id, Utc::now())
            .unwrap()
            .unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(!digest.contains("hunter2-plain"));
    }

    #[test]
    fn message_length_limit() {
        let (_dir, store) = store();

        let exact = "a".repeat(MAX_MESSAGE_CHARS);
        assert!(store.create(&exact, "pw", None).is_ok());

        let too_long = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(matches!(
            store.create(&too_long, "pw", None),
            Err(StoreError::Validation(_))
        ));

        // Counted in characters, not bytes
        let hearts = "\u{2764}".repeat(MAX_MESSAGE_CHARS);
        assert!(store.create(&hearts, "pw", None).is_ok());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (_dir, store) = store();
        assert!(matches!(store.fetch("AAAAAAAAAAA"), Err(StoreError::NotFound)));
        assert!(matches!(
            store.verify_and_reveal("AAAAAAAAAAA", "pw"),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.fetch("../etc"), Err(StoreError::NotFound)));
    }

    fn fastest_of<F: FnMut()>(runs: usize, mut f: F) -> std::time::Duration {
        (0..runs)
            .map(|_| {
                let start = std::time::Instant::now();
                f();
                start.elapsed()
            })
            .min()
            .unwrap()
    }

    #[test]
    fn unknown_id_costs_as_much_as_wrong_password() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("notes.db")).unwrap();
        let hasher = CredentialHasher::new(HashCost {
            memory_kib: 8 * 1024,
            iterations: 3,
            parallelism: 1,
        })
        .unwrap();
        let store = NoteStore::new(Arc::new(db), hasher);
        let id = store.create("timed", "rosebud", None).unwrap();
        let expired = store
            .create_at(Utc::now() - Duration::days(31), "old", "rosebud", None)
            .unwrap();

        let wrong = fastest_of(5, || {
            assert!(matches!(
                store.verify_and_reveal(&id, "wrong"),
                Err(StoreError::Unauthorized)
            ));
        });
        let unknown = fastest_of(5, || {
            assert!(matches!(
                store.verify_and_reveal("AAAAAAAAAAA", "wrong"),
                Err(StoreError::NotFound)
            ));
        });
        let gone = fastest_of(5, || {
            assert!(matches!(
                store.verify_and_reveal(&expired, "wrong"),
                Err(StoreError::NotFound)
            ));
        });
        let malformed = fastest_of(5, || {
            assert!(matches!(
                store.verify_and_reveal("../etc", "wrong"),
                Err(StoreError::NotFound)
            ));
        });

        for (label, miss) in [("unknown", unknown), ("expired", gone), ("malformed", malformed)] {
            assert!(
                miss * 4 >= wrong,
                "{label} id took {miss:?}, wrong password took {wrong:?}"
            );
        }
    }

    #[test]
    fn expired_notes_are_not_found_before_sweep() {
        let (_dir, store) = store();
        let created = Utc::now() - Duration::days(31);
        let id = store.create_at(created, "old", "pw", None).unwrap();

        assert!(matches!(store.fetch(&id), Err(StoreError::NotFound)));
        assert!(matches!(
            store.verify_and_reveal(&id, "pw"),
            Err(StoreError::NotFound)
        ));

        // Still physically present until swept
        assert_eq!(store.sweep(Utc::now()).unwrap(), 1);
    }

    #[test]
    fn note_is_live_until_the_expiry_instant() {
        let (_dir, store) = store();
        let created = Utc::now();
        let id = store.create_at(created, "edge", "pw", None).unwrap();
        let expires_at = store.fetch(&id).unwrap().expires_at;

        assert!(store.fetch_at(&id, expires_at).is_ok());
        assert!(matches!(
            store.fetch_at(&id, expires_at + Duration::microseconds(1)),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn wrong_password_leaves_count_alone() {
        let (_dir, store) = store();
        let id = store.create("I like you", "rosebud", Some("Anon")).unwrap();

        assert!(matches!(
            store.verify_and_reveal(&id, "wrong"),
            Err(StoreError::Unauthorized)
        ));
        assert_eq!(store.fetch(&id).unwrap().view_count, 0);

        let revealed = store.verify_and_reveal(&id, "rosebud").unwrap();
        assert_eq!(
            revealed,
            RevealedNote {
                message: "I like you".into(),
                sender_name: "Anon".into(),
                view_count: 1,
            }
        );
        assert_eq!(store.verify_and_reveal(&id, "rosebud").unwrap().view_count, 2);
        assert_eq!(store.fetch(&id).unwrap().view_count, 2);
    }

    #[test]
    fn concurrent_reveals_are_all_counted() {
        let (_dir, store) = store();
        let id = store.create("shared", "pw", None).unwrap();
        let n = 16;

        std::thread::scope(|s| {
            for _ in 0..n {
                let store = store.clone();
                let id = id.clone();
                s.spawn(move || {
                    store.verify_and_reveal(&id, "pw").unwrap();
                });
            }
        });

        assert_eq!(store.fetch(&id).unwrap().view_count, n);
    }

    #[test]
    fn concurrent_reveals_see_distinct_counts() {
        let (_dir, store) = store();
        let id = store.create("shared", "pw", None).unwrap();

        let mut counts: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    let id = id.clone();
                    s.spawn(move || store.verify_and_reveal(&id, "pw").unwrap().view_count)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        counts.sort_unstable();

        assert_eq!(counts, (1..=8).collect::<Vec<u64>>());
    }

    #[test]
    fn ids_are_unique_across_many_creates() {
        let (_dir, store) = store();
        let mut ids = std::collections::HashSet::new();
        for i in 0..300 {
            let id = store.create(&format!("note {i}"), "pw", None).unwrap();
            assert!(ids.insert(id));
        }
    }

    #[test]
    fn id_collision_is_retried() {
        let (_dir, store) = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let store = store.with_id_source(move || {
            // The first three calls hand out the same id
            match counter.fetch_add(1, Ordering::SeqCst) {
                0..=2 => "dupdupdup00".to_string(),
                _ => "freshfresh1".to_string(),
            }
        });

        assert_eq!(store.create("one", "pw", None).unwrap(), "dupdupdup00");
        assert_eq!(store.create("two", "pw", None).unwrap(), "freshfresh1");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(store.fetch("dupdupdup00").unwrap().message, "one");
    }

    #[test]
    fn id_space_exhaustion_is_an_error() {
        let (_dir, store) = store();
        let store = store.with_id_source(|| "samesamesam".to_string());

        store.create("first", "pw", None).unwrap();
        assert!(matches!(
            store.create("second", "pw", None),
            Err(StoreError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
        ));
        assert_eq!(store.fetch("samesamesam").unwrap().message, "first");
    }

    #[test]
    fn sweep_removes_only_expired() {
        let (_dir, store) = store();
        let now = Utc::now();

        let old_a = store.create_at(now - Duration::days(40), "a", "pw", None).unwrap();
        let old_b = store.create_at(now - Duration::days(31), "b", "pw", None).unwrap();
        let fresh = store.create_at(now - Duration::days(29), "c", "pw", None).unwrap();
        let new = store.create_at(now, "d", "pw", None).unwrap();

        assert_eq!(store.sweep(now).unwrap(), 2);
        assert_eq!(store.sweep(now).unwrap(), 0);

        let far_future = now + Duration::days(365);
        for id in [&old_a, &old_b] {
            assert!(store.db.get_live_password_hash(id, now - Duration::days(100)).unwrap().is_none());
        }
        assert!(store.fetch_at(&fresh, now).is_ok());
        assert!(store.fetch_at(&new, now).is_ok());
        assert_eq!(store.sweep(far_future).unwrap(), 2);
    }

    #[test]
    fn sweep_keeps_note_expiring_exactly_now() {
        let (_dir, store) = store();
        let created = Utc::now() - Duration::days(30);
        let id = store.create_at(created, "boundary", "pw", None).unwrap();
        let expires_at = store.fetch_at(&id, created).unwrap().expires_at;

        assert_eq!(store.sweep(expires_at).unwrap(), 0);
        assert_eq!(store.sweep(expires_at + Duration::microseconds(1)).unwrap(), 1);
    }

    #[test]
    fn custom_retention() {
        let (_dir, store) = store();
        let store = store.with_retention_days(1).unwrap();
        let now = Utc::now();
        let id = store.create_at(now, "short", "pw", None).unwrap();

        assert!(store.fetch_at(&id, now + Duration::hours(23)).is_ok());
        assert!(store.fetch_at(&id, now + Duration::hours(25)).is_err());
        assert!(store.clone().with_retention_days(0).is_err());
        assert!(store.with_retention_days(-3).is_err());
    }
}
