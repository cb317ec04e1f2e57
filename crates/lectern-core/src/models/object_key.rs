//! Object key naming.
//!
//! Key layout: `{nonce}-{discipline}-{lesson}-{file_name}`, where the nonce is either
//! the issuance time in epoch milliseconds (`KeyScheme::Timestamp`) or a random
//! UUID in simple form (`KeyScheme::Unique`). The file name is sanitized so a key is
//! always a single path segment.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slot::{parse_index, SlotId};

const FALLBACK_FILE_NAME: &str = "file";

/// How the unique prefix of an object key is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    /// `{epochMillis}-...`; unique only as long as two sessions never presign the
    /// same position in the same millisecond.
    Timestamp,
    /// `{uuid}-...`
    #[default]
    Unique,
}

impl FromStr for KeyScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timestamp" => Ok(KeyScheme::Timestamp),
            "unique" | "uuid" => Ok(KeyScheme::Unique),
            _ => Err(anyhow::anyhow!("Invalid object key scheme: {}", s)),
        }
    }
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyScheme::Timestamp => write!(f, "timestamp"),
            KeyScheme::Unique => write!(f, "unique"),
        }
    }
}

/// Key of one stored object in the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn generate(
        scheme: KeyScheme,
        issued_at: DateTime<Utc>,
        slot: SlotId,
        file_name: &str,
    ) -> Self {
        let nonce = match scheme {
            KeyScheme::Timestamp => issued_at.timestamp_millis().to_string(),
            KeyScheme::Unique => Uuid::new_v4().simple().to_string(),
        };
        ObjectKey(format!(
            "{}-{}-{}-{}",
            nonce,
            slot.discipline,
            slot.lesson,
            sanitize_file_name(file_name)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn parse(&self) -> Result<ParsedObjectKey, ParseObjectKeyError> {
        self.0.parse()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}

impl From<String> for ObjectKey {
    fn from(raw: String) -> Self {
        ObjectKey(raw)
    }
}

/// Unique prefix recovered from a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNonce {
    Timestamp(i64),
    Unique(Uuid),
}

/// The components an object key was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedObjectKey {
    pub nonce: KeyNonce,
    pub slot: SlotId,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object key: {0}")]
pub struct ParseObjectKeyError(pub String);

impl FromStr for ParsedObjectKey {
    type Err = ParseObjectKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseObjectKeyError(s.to_string());
        let mut parts = s.splitn(4, '-');
        let nonce = parts.next().ok_or_else(invalid)?;
        let discipline = parts.next().and_then(parse_index).ok_or_else(invalid)?;
        let lesson = parts.next().and_then(parse_index).ok_or_else(invalid)?;
        let file_name = parts.next().filter(|n| !n.is_empty()).ok_or_else(invalid)?;

        let nonce = if nonce.len() == 32 && nonce.bytes().all(|b| b.is_ascii_hexdigit()) {
            KeyNonce::Unique(Uuid::parse_str(nonce).map_err(|_| invalid())?)
        } else if !nonce.is_empty() && nonce.bytes().all(|b| b.is_ascii_digit()) {
            KeyNonce::Timestamp(nonce.parse().map_err(|_| invalid())?)
        } else {
            return Err(invalid());
        };

        Ok(ParsedObjectKey {
            nonce,
            slot: SlotId::new(discipline, lesson),
            file_name: file_name.to_string(),
        })
    }
}

/// Make a client-supplied file name safe to embed in a single key segment.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '#' | '%' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issued_at() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_730_000_000_123).unwrap()
    }

    #[test]
    fn timestamp_scheme_matches_historical_layout() {
        let key = ObjectKey::generate(
            KeyScheme::Timestamp,
            issued_at(),
            SlotId::new(1, 2),
            "intro.mp4",
        );
        assert_eq!(key.as_str(), "1730000000123-1-2-intro.mp4");
    }

    #[test]
    fn timestamp_key_round_trips() {
        let key = ObjectKey::generate(
            KeyScheme::Timestamp,
            issued_at(),
            SlotId::new(3, 0),
            "aula-01 final.mov",
        );
        let parsed = key.parse().unwrap();
        assert_eq!(parsed.nonce, KeyNonce::Timestamp(1_730_000_000_123));
        assert_eq!(parsed.slot, SlotId::new(3, 0));
        assert_eq!(parsed.file_name, "aula-01 final.mov");
    }

    #[test]
    fn unique_key_round_trips() {
        let key = ObjectKey::generate(
            KeyScheme::Unique,
            issued_at(),
            SlotId::new(0, 4),
            "lesson.webm",
        );
        let parsed = key.parse().unwrap();
        assert!(matches!(parsed.nonce, KeyNonce::Unique(_)));
        assert_eq!(parsed.slot, SlotId::new(0, 4));
        assert_eq!(parsed.file_name, "lesson.webm");
    }

    #[test]
    fn unique_keys_differ_for_same_slot_and_time() {
        let a = ObjectKey::generate(KeyScheme::Unique, issued_at(), SlotId::new(0, 0), "a.mp4");
        let b = ObjectKey::generate(KeyScheme::Unique, issued_at(), SlotId::new(0, 0), "a.mp4");
        assert_ne!(a, b);
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("a?b#c%d\\e"), "a_b_c_d_e");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("tab\tname"), "tab_name");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!("".parse::<ParsedObjectKey>().is_err());
        assert!("123-1-2-".parse::<ParsedObjectKey>().is_err());
        assert!("abc-1-2-x.mp4".parse::<ParsedObjectKey>().is_err());
        assert!("123-x-2-x.mp4".parse::<ParsedObjectKey>().is_err());
        assert!("123-1-2".parse::<ParsedObjectKey>().is_err());
    }

    #[test]
    fn parses_scheme_names() {
        assert_eq!("timestamp".parse::<KeyScheme>().unwrap(), KeyScheme::Timestamp);
        assert_eq!("UUID".parse::<KeyScheme>().unwrap(), KeyScheme::Unique);
        assert!("random".parse::<KeyScheme>().is_err());
    }
}
