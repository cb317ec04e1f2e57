//! Upload slot identity.
//!
//! A slot is one lesson's pending video upload, identified by its position in the
//! discipline/lesson tree. Inside the process it is a pair of indices; on the wire it
//! is the string `file-{discipline}-{lesson}`.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const SLOT_PREFIX: &str = "file-";

/// Position of a lesson in the course tree. Orders by discipline, then lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId {
    pub discipline: usize,
    pub lesson: usize,
}

impl SlotId {
    pub fn new(discipline: usize, lesson: usize) -> Self {
        Self { discipline, lesson }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", SLOT_PREFIX, self.discipline, self.lesson)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slot key: {0} (expected file-<discipline>-<lesson>)")]
pub struct ParseSlotIdError(pub String);

impl FromStr for SlotId {
    type Err = ParseSlotIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSlotIdError(s.to_string());
        let rest = s.strip_prefix(SLOT_PREFIX).ok_or_else(invalid)?;
        let (discipline, lesson) = rest.split_once('-').ok_or_else(invalid)?;
        Ok(SlotId {
            discipline: parse_index(discipline).ok_or_else(invalid)?,
            lesson: parse_index(lesson).ok_or_else(invalid)?,
        })
    }
}

/// Plain decimal index; rejects signs and empty strings that `usize::from_str` would
/// partly accept.
pub(crate) fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl Serialize for SlotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// One lesson's pending upload as described by the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    pub id: SlotId,
    pub original_file_name: String,
    pub declared_content_type: String,
}
