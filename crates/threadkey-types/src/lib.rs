//! Shared record and option types for threadkey.
//!
//! The engine never owns records. It borrows a caller-owned slice of
//! anything implementing [`ThreadItem`] and writes keys in place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parent-referencing record that can carry a hierarchy key.
pub trait ThreadItem {
    /// Identifier, unique within the collection.
    fn id(&self) -> &str;

    /// Identifier of the parent record, if any.
    fn parent(&self) -> Option<&str>;

    /// The hierarchy key, once assigned.
    fn key(&self) -> Option<&str>;

    /// Stores a freshly computed key.
    ///
    /// Called at most once per record, and only while `key()` is `None`.
    fn set_key(&mut self, key: String);
}

/// Plain record as read from JSON.
///
/// The key is stored under `order` on the wire (`key` is accepted as an
/// alias). Fields the engine does not know about are kept in `extra` so
/// records round-trip unchanged apart from the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(
        default,
        rename = "order",
        alias = "key",
        skip_serializing_if = "Option::is_none"
    )]
    pub key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl ThreadItem for Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn set_key(&mut self, key: String) {
        self.key = Some(key);
    }
}

/// Key layout options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    /// Marker appended once to every complete key.
    pub end_of_record: String,
    /// Separator between depth segments.
    pub delimiter: String,
}

impl SortOptions {
    pub const DEFAULT_END_OF_RECORD: &str = ".";
    pub const DEFAULT_DELIMITER: &str = "/";

    /// Builds options, rejecting layouts that cannot be parsed back.
    pub fn new(
        end_of_record: impl Into<String>,
        delimiter: impl Into<String>,
    ) -> Result<Self, OptionsError> {
        let end_of_record = end_of_record.into();
        let delimiter = delimiter.into();

        if end_of_record.is_empty() {
            return Err(OptionsError::EmptyEndOfRecord);
        }
        if delimiter.is_empty() {
            return Err(OptionsError::EmptyDelimiter);
        }
        if end_of_record == delimiter {
            return Err(OptionsError::SameMarkerAndDelimiter(delimiter));
        }

        Ok(Self {
            end_of_record,
            delimiter,
        })
    }

    /// Whether a parent key sorts before its children's keys.
    ///
    /// True when the marker compares below the delimiter, as with the
    /// defaults (`.` < `/`).
    pub fn marker_sorts_first(&self) -> bool {
        self.end_of_record < self.delimiter
    }
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            end_of_record: Self::DEFAULT_END_OF_RECORD.to_string(),
            delimiter: Self::DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Invalid [`SortOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    EmptyEndOfRecord,
    EmptyDelimiter,
    SameMarkerAndDelimiter(String),
}

impl std::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionsError::EmptyEndOfRecord => write!(f, "end-of-record marker must not be empty"),
            OptionsError::EmptyDelimiter => write!(f, "delimiter must not be empty"),
            OptionsError::SameMarkerAndDelimiter(s) => {
                write!(f, "end-of-record marker and delimiter are both '{s}'")
            }
        }
    }
}

impl std::error::Error for OptionsError {}
