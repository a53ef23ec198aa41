//! # HerbDx Types
//!
//! Small validated value types shared across the HerbDx crates.

/// Errors that can occur when creating validated value types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when creating a [`MatchScore`].
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("match score {0} is outside 0..=100")]
    OutOfRange(u64),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction. Catalog names
/// use this type so that a blank symptom name can never take part in substring matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A syndrome match score, always within `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchScore(u8);

impl MatchScore {
    pub const MAX: u8 = 100;

    /// Clamps an accumulated raw score into `0..=100`.
    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(0, i64::from(Self::MAX)) as u8)
    }

    /// Validates a score that must already be in range.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` if `value` exceeds 100.
    pub fn new(value: u64) -> Result<Self, ScoreError> {
        if value > u64::from(Self::MAX) {
            return Err(ScoreError::OutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for MatchScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for MatchScore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for MatchScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u64::deserialize(deserializer)?;
        MatchScore::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  두통  ").unwrap();
        assert_eq!(text.as_str(), "두통");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
        assert!(matches!(NonEmptyText::new(""), Err(TextError::Empty)));
    }

    #[test]
    fn test_non_empty_text_deserialize_rejects_blank() {
        let result: Result<NonEmptyText, _> = serde_yaml::from_str("'  '");
        assert!(result.is_err());
    }

    #[test]
    fn test_match_score_clamps_both_ends() {
        assert_eq!(MatchScore::clamped(-5).value(), 0);
        assert_eq!(MatchScore::clamped(45).value(), 45);
        assert_eq!(MatchScore::clamped(135).value(), 100);
    }

    #[test]
    fn test_match_score_is_positive() {
        assert!(!MatchScore::clamped(0).is_positive());
        assert!(MatchScore::clamped(1).is_positive());
    }

    #[test]
    fn test_match_score_serializes_as_number() {
        let json = serde_json::to_string(&MatchScore::clamped(70)).unwrap();
        assert_eq!(json, "70");

        let parsed: MatchScore = serde_json::from_str("100").unwrap();
        assert_eq!(parsed.value(), 100);
        assert!(serde_json::from_str::<MatchScore>("101").is_err());
    }
}
