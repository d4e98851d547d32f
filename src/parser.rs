// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! JSON parsing for Firefox bookmark backups.
//!
//! Firefox stores its bookmark tree as one nested JSON document. Every node
//! is an object; which fields it carries decides what kind of node it is:
//!
//! - a `children` array makes it a folder (even when a `uri` is present too)
//! - a string `uri` without `children` makes it a bookmark
//! - `typeCode: 3` makes a child a separator, whatever else it holds
//!
//! Anything else is kept as [`Node::Other`] and produces no output.
//!
//! # Example
//!
//! ```
//! use ffbookmarks::parser::{parse_bookmarks, Node};
//!
//! let json = r#"{
//!     "title": "",
//!     "children": [
//!         { "title": "Example", "uri": "https://example.com" },
//!         { "typeCode": 3 }
//!     ]
//! }"#;
//!
//! let tree = parse_bookmarks(json).unwrap();
//! assert_eq!(tree.root.children.len(), 2);
//! assert!(matches!(tree.root.children[1], Node::Separator));
//! ```

use serde::{Deserialize, de::Error as _};
use serde_json::Value;
use snafu::prelude::*;

/// `typeCode` value Firefox uses for separators.
pub const SEPARATOR_TYPE_CODE: i64 = 3;

/// Annotation name under which Firefox stores a bookmark description.
pub const DESCRIPTION_ANNOTATION: &str = "bookmarkProperties/description";

/// Error type for JSON parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// The document is not JSON, or not a bookmark tree.
    #[snafu(display("JSON parsing error: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// A parsed bookmark backup.
///
/// The root is always a folder, whether or not the document declares
/// `children`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkTree {
    /// The top-level container.
    pub root: Folder,
}

/// A single entry in the bookmark tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A container with (possibly zero) children.
    Folder(Folder),
    /// A link.
    Bookmark(Bookmark),
    /// A UI divider. Anything nested below it is discarded.
    Separator,
    /// A node that is neither a folder nor a bookmark.
    Other,
}

/// A bookmark folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Folder {
    /// Folder name. `None` when the source omits it or it is not a string.
    pub title: Option<String>,
    /// Creation and modification times.
    pub dates: Dates,
    /// Entries in their original order.
    pub children: Vec<Node>,
}

/// A bookmarked URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// Display title. `None` when the source omits it.
    pub title: Option<String>,
    /// The bookmarked address.
    pub uri: String,
    /// Creation and modification times.
    pub dates: Dates,
    /// Key/value annotations in their original order.
    pub annotations: Vec<Annotation>,
}

/// Raw Firefox timestamps, in microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dates {
    /// `dateAdded`, when present and numeric.
    pub added: Option<i64>,
    /// `lastModified`, when present and numeric.
    pub last_modified: Option<i64>,
}

/// A named annotation attached to a bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Annotation key, e.g. [`DESCRIPTION_ANNOTATION`].
    pub name: String,
    /// Annotation value.
    pub value: String,
}

/// Node counts for a [`BookmarkTree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Folders below the root.
    pub folders: usize,
    /// Bookmarks, excluding anything under a separator.
    pub bookmarks: usize,
    /// Separators.
    pub separators: usize,
}

impl Bookmark {
    /// The text shown for this bookmark: its title, or the URI when untitled.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.uri)
    }

    /// Values of all description annotations, in order.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.annotations
            .iter()
            .filter(|anno| anno.name == DESCRIPTION_ANNOTATION)
            .map(|anno| anno.value.as_str())
    }
}

impl BookmarkTree {
    /// Counts folders, bookmarks and separators below the root.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut pending: Vec<&[Node]> = vec![&self.root.children];

        while let Some(nodes) = pending.pop() {
            for node in nodes {
                match node {
                    Node::Folder(folder) => {
                        stats.folders += 1;
                        pending.push(&folder.children);
                    }
                    Node::Bookmark(_) => stats.bookmarks += 1,
                    Node::Separator => stats.separators += 1,
                    Node::Other => {}
                }
            }
        }

        stats
    }
}

impl<'de> Deserialize<'de> for BookmarkTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        if !value.is_object() {
            return Err(D::Error::custom(
                "bookmark document must be a JSON object",
            ));
        }

        Ok(Self {
            root: Folder::from_value(&value),
        })
    }
}

impl Node {
    /// Classifies a child entry. Separators are checked first, then folders,
    /// then bookmarks.
    fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::Other;
        }

        if is_separator(value) {
            return Self::Separator;
        }

        if value.get("children").is_some_and(Value::is_array) {
            return Self::Folder(Folder::from_value(value));
        }

        match value.get("uri").and_then(Value::as_str) {
            Some(uri) => Self::Bookmark(Bookmark::from_value(value, uri)),
            None => Self::Other,
        }
    }
}

impl Folder {
    fn from_value(value: &Value) -> Self {
        let children = value
            .get("children")
            .and_then(Value::as_array)
            .map(|children| children.iter().map(Node::from_value).collect())
            .unwrap_or_default();

        Self {
            title: get_string(value, "title"),
            dates: Dates::from_value(value),
            children,
        }
    }
}

impl Bookmark {
    fn from_value(value: &Value, uri: &str) -> Self {
        Self {
            title: get_string(value, "title"),
            uri: uri.to_owned(),
            dates: Dates::from_value(value),
            annotations: extract_annotations(value),
        }
    }
}

impl Dates {
    fn from_value(value: &Value) -> Self {
        Self {
            added: value.get("dateAdded").and_then(lenient_i64),
            last_modified: value.get("lastModified").and_then(lenient_i64),
        }
    }
}

/// `typeCode` may be serialized as `3` or `3.0`.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn is_separator(value: &Value) -> bool {
    value
        .get("typeCode")
        .and_then(Value::as_f64)
        .is_some_and(|code| code == SEPARATOR_TYPE_CODE as f64)
}

fn get_string(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_owned)
}

/// Reads an integer that may have been written as a number or a string.
///
/// Floats are truncated toward zero. Booleans, `null`, out-of-range values
/// and unparseable strings yield `None`.
fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_f64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn truncate_f64(f: f64) -> Option<i64> {
    let in_range = f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64;
    in_range.then(|| f.trunc() as i64)
}

/// Extracts the `annos` array, skipping entries that are not objects.
fn extract_annotations(value: &Value) -> Vec<Annotation> {
    value
        .get("annos")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|anno| anno.is_object())
        .map(|anno| Annotation {
            name: get_string(anno, "name").unwrap_or_default(),
            value: get_string(anno, "value").unwrap_or_default(),
        })
        .collect()
}

/// Parses a JSON string into a [`BookmarkTree`].
///
/// # Errors
///
/// Returns an error if the text is not JSON, nests deeper than
/// `serde_json`'s recursion limit, or its top level is not an object.
///
/// # Example
///
/// ```
/// use ffbookmarks::parser::parse_bookmarks;
///
/// let tree = parse_bookmarks(r#"{"title": "Bookmarks Menu", "children": []}"#).unwrap();
/// assert_eq!(tree.root.title.as_deref(), Some("Bookmarks Menu"));
/// assert!(tree.root.children.is_empty());
/// ```
pub fn parse_bookmarks(json_str: &str) -> Result<BookmarkTree, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}

/// Like [`parse_bookmarks`] but takes raw bytes, which must be UTF-8.
///
/// # Errors
///
/// Same as [`parse_bookmarks`], plus invalid UTF-8.
pub fn parse_bookmarks_slice(json: &[u8]) -> Result<BookmarkTree, ParseError> {
    serde_json::from_slice(json).context(JsonSnafu)
}
