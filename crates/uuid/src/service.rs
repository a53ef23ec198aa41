//! Internal implementation of UUID and session identifier services.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Prefix carried by every diagnosis session identifier.
pub const SESSION_ID_PREFIX: &str = "diag-";

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";

/// Canonical UUID representation (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to be canonical, so it can be used to
/// derive sharded storage paths without further checks.
///
/// # Construction
/// - [`UuidService::new`] generates a new random (v4) UUID.
/// - [`UuidService::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UuidService(Uuid);

impl Default for UuidService {
    fn default() -> Self {
        Self::new()
    }
}

impl UuidService {
    /// Generates a new UUID in canonical form.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a UUID string that must already be in canonical form.
    ///
    /// Hyphenated or uppercase forms are rejected, not normalised.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }

        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid UUID '{}': {}", input, e)))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical UUID form.
    ///
    /// This is a purely syntactic check: exactly 32 bytes of `0-9` / `a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<uuid>/` where `s1`/`s2` are the first two pairs of hex
    /// characters of this UUID.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for UuidService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for UuidService {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UuidService::parse(s)
    }
}

/// Identifier of one diagnosis run.
///
/// Format: `diag-YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`.
///
/// The timestamp has millisecond precision and doubles as the run's `createdAt` value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId {
    timestamp: DateTime<Utc>,
    uuid: UuidService,
}

impl SessionId {
    /// Returns the timestamp component.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the UUID component.
    pub fn uuid(&self) -> &UuidService {
        &self.uuid
    }

    /// Generate a session id whose timestamp is strictly greater than `last` (by at least 1 ms).
    pub fn generate(last: Option<DateTime<Utc>>) -> Self {
        let now = truncate_to_millis(Utc::now());

        let timestamp = match last {
            Some(prev) if now <= prev => prev + Duration::milliseconds(1),
            _ => now,
        };

        Self {
            timestamp,
            uuid: UuidService::new(),
        }
    }
}

fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}Z-{}",
            SESSION_ID_PREFIX,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.uuid
        )
    }
}

impl FromStr for SessionId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix(SESSION_ID_PREFIX).ok_or_else(|| {
            UuidError::InvalidInput(format!(
                "session id must start with '{}': '{}'",
                SESSION_ID_PREFIX, s
            ))
        })?;

        let (ts_str, uuid_str) = rest.split_once('-').ok_or_else(|| {
            UuidError::InvalidInput(format!("invalid session id format: '{}'", s))
        })?;

        let ts_no_z = ts_str.strip_suffix('Z').ok_or_else(|| {
            UuidError::InvalidInput(format!("timestamp must end with 'Z': '{}'", ts_str))
        })?;

        let naive = NaiveDateTime::parse_from_str(ts_no_z, TIMESTAMP_FORMAT).map_err(|e| {
            UuidError::InvalidInput(format!("invalid timestamp format '{}': {}", ts_str, e))
        })?;

        Ok(Self {
            timestamp: DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc),
            uuid: UuidService::parse(uuid_str)?,
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Process-wide session id source.
///
/// Successive ids from one generator have strictly increasing timestamps, even when requests
/// arrive within the same millisecond.
#[derive(Debug, Default)]
pub struct SessionIdGenerator {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self) -> SessionId {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let id = SessionId::generate(*last);
        *last = Some(id.timestamp());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_valid_uuid() {
        let canonical = UuidService::new().to_string();

        assert_eq!(canonical.len(), 32);
        assert!(UuidService::is_canonical(&canonical));
    }

    #[test]
    fn test_parse_valid_canonical_uuid() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let result = UuidService::parse(canonical);

        assert_eq!(result.unwrap().to_string(), canonical);
    }

    #[test]
    fn test_parse_rejects_hyphenated_uuid() {
        let result = UuidService::parse("550e8400-e29b-41d4-a716-446655440000");

        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase_and_bad_length() {
        assert!(UuidService::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(UuidService::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(UuidService::parse("550e8400e29b41d4a7164466554400000").is_err());
        assert!(UuidService::parse("").is_err());
    }

    #[test]
    fn test_sharded_dir_structure() {
        let uuid = UuidService::parse("550e8400e29b41d4a716446655440000").unwrap();
        let sharded = uuid.sharded_dir(Path::new("/diagnosis_logs"));

        assert_eq!(
            sharded,
            PathBuf::from("/diagnosis_logs/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_session_id_display_format() {
        let id: SessionId = "diag-20260111T143522.045Z-550e8400e29b41d4a716446655440000"
            .parse()
            .unwrap();

        assert_eq!(
            id.to_string(),
            "diag-20260111T143522.045Z-550e8400e29b41d4a716446655440000"
        );
        assert_eq!(id.timestamp().timestamp_subsec_millis(), 45);
        assert_eq!(id.uuid().to_string(), "550e8400e29b41d4a716446655440000");
    }

    #[test]
    fn test_session_id_parse_rejects_bad_input() {
        assert!("20260111T143522.045Z-550e8400e29b41d4a716446655440000"
            .parse::<SessionId>()
            .is_err());
        assert!("diag-20260111T143522.045-550e8400e29b41d4a716446655440000"
            .parse::<SessionId>()
            .is_err());
        assert!("diag-20260111T143522.045Z".parse::<SessionId>().is_err());
        assert!("diag-20260111T143522.045Z-NOTAUUID"
            .parse::<SessionId>()
            .is_err());
    }

    #[test]
    fn test_generated_session_id_parses_back() {
        let id = SessionId::generate(None);
        let parsed: SessionId = id.to_string().parse().unwrap();

        assert_eq!(parsed, id);
    }

    #[test]
    fn test_generate_is_monotonic_without_sleep() {
        let first = SessionId::generate(None);
        let second = SessionId::generate(Some(first.timestamp()));

        assert!(second.timestamp() > first.timestamp());
        assert_ne!(first.uuid(), second.uuid());
    }

    #[test]
    fn test_generator_produces_strictly_increasing_ids() {
        let generator = SessionIdGenerator::new();
        let ids: Vec<SessionId> = (0..50).map(|_| generator.generate()).collect();

        for pair in ids.windows(2) {
            assert!(pair[1].timestamp() > pair[0].timestamp());
            assert!(pair[1].to_string() > pair[0].to_string());
        }
    }

    #[test]
    fn test_session_id_serde_as_string() {
        let id = SessionId::generate(None);
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, format!("\"{}\"", id));
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
