//! Row types for the `secret_notes` table, plus the timestamp encoding they use.
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;

/// A full row, including the password digest. Only built on insert.
pub struct NoteRow {
    pub id: String,
    pub message: String,
    pub password_hash: String,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A live note as returned by a fetch. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub message: String,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub view_count: u64,
}

/// What a successful password check releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedNote {
    pub message: String,
    pub sender_name: String,
    pub view_count: u64,
}

/// Timestamps are kept at microsecond precision, which is what survives a
/// round trip through the database.
pub fn normalize(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Fixed-width UTC text, e.g. `2026-10-17T09:30:00.000000Z`.
pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn encoded_timestamps_sort_chronologically() {
        let base = Utc.with_ymd_and_hms(2026, 1, 9, 23, 59, 59).unwrap();
        let later = base + Duration::microseconds(1);
        let much_later = base + Duration::days(400);

        let a = encode_timestamp(base);
        let b = encode_timestamp(later);
        let c = encode_timestamp(much_later);
        assert_eq!(a.len(), b.len());
        assert_eq!(a.len(), c.len());
        assert!(a < b && b < c);
    }

    #[test]
    fn decode_inverts_encode_at_micros() {
        let ts = normalize(Utc::now());
        assert_eq!(decode_timestamp(0, &encode_timestamp(ts)).unwrap(), ts);
        assert!(decode_timestamp(0, "yesterday").is_err());
    }
}
