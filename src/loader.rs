// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Input detection and `mozLz4` container decoding.
//!
//! Firefox writes bookmark backups as `.jsonlz4` files: a 12-byte header
//! starting with the `mozLz4` signature, followed by one raw LZ4 block that
//! decompresses to the JSON document. Plain `.json` exports are accepted
//! as well.
//!
//! # Example
//!
//! ```no_run
//! use ffbookmarks::loader;
//!
//! let payload = loader::read_payload("bookmarks-2025-06-11.jsonlz4").unwrap();
//! println!("detected {}", payload.format);
//! let tree = payload.parse_tree().unwrap();
//! println!("{} bookmarks", tree.stats().bookmarks);
//! ```

use crate::parser::{self, BookmarkTree, ParseError};
use log::debug;
use snafu::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

/// Signature at the start of every `.jsonlz4` file.
pub const CONTAINER_MAGIC: &[u8; 6] = b"mozLz4";

/// Bytes before the compressed block, signature included.
pub const CONTAINER_HEADER_SIZE: usize = 12;

/// Output buffer for block decompression.
///
/// The container's own size field is not consulted; larger payloads fail.
pub const DECOMPRESS_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// Error type for loading a bookmark file.
#[derive(Debug, Snafu)]
pub enum LoadError {
    /// The input path is not an existing file.
    #[snafu(display("input file '{}' does not exist", path.display()))]
    InputNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The input could not be read.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadInput {
        /// The unreadable path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The input is neither a `mozLz4` container nor a JSON document.
    #[snafu(display(
        "'{}' is not a valid Firefox bookmark backup file (.jsonlz4) or JSON file",
        path.display()
    ))]
    UnrecognizedFormat {
        /// The offending path.
        path: PathBuf,
    },

    /// The container has no compressed data after its header.
    #[snafu(display(
        "LZ4 decompression error: {} is truncated ({len} bytes, header alone is {CONTAINER_HEADER_SIZE})",
        path.display()
    ))]
    TruncatedContainer {
        /// The offending path.
        path: PathBuf,
        /// Total file length in bytes.
        len: usize,
    },

    /// The compressed block is corrupt or too large for the buffer.
    #[snafu(display("LZ4 decompression error in {}: {source}", path.display()))]
    Decompression {
        /// The offending path.
        path: PathBuf,
        /// The underlying LZ4 error.
        source: lz4_flex::block::DecompressError,
    },

    /// The JSON payload is malformed or not a bookmark tree.
    #[snafu(display("{source}"))]
    Parse {
        /// The underlying parse error.
        source: ParseError,
    },
}

/// How the input file was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// A compressed `mozLz4` backup.
    Container,
    /// A plain JSON document.
    PlainJson,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Container => "Firefox jsonlz4 bookmark backup",
            Self::PlainJson => "JSON bookmark file",
        })
    }
}

/// The JSON document extracted from an input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Detected input format.
    pub format: Format,
    /// UTF-8 JSON bytes, decompressed if needed.
    pub json: Vec<u8>,
}

impl Payload {
    /// Parses the JSON bytes into a bookmark tree.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] if the JSON is malformed or its top level
    /// is not an object.
    pub fn parse_tree(&self) -> Result<BookmarkTree, LoadError> {
        let tree = parser::parse_bookmarks_slice(&self.json).context(ParseSnafu)?;
        debug!("parsed bookmark tree: {:?}", tree.stats());
        Ok(tree)
    }
}

/// Reads `path` and returns its JSON document, decompressing if needed.
///
/// # Errors
///
/// - [`LoadError::InputNotFound`] if `path` is not a file
/// - [`LoadError::ReadInput`] if reading fails
/// - [`LoadError::TruncatedContainer`] or [`LoadError::Decompression`] for a
///   damaged container
/// - [`LoadError::UnrecognizedFormat`] if a file without the container
///   signature is not JSON
pub fn read_payload(path: impl AsRef<Path>) -> Result<Payload, LoadError> {
    let path = path.as_ref();
    ensure!(path.is_file(), InputNotFoundSnafu { path });

    let bytes = std::fs::read(path).context(ReadInputSnafu { path })?;
    debug!("read {} bytes from {}", bytes.len(), path.display());

    let format = detect_format(&bytes);
    debug!("detected format: {format}");

    match format {
        Format::Container => {
            let json = decompress_container(&bytes, path)?;
            Ok(Payload { format, json })
        }
        Format::PlainJson => {
            ensure!(is_json(&bytes), UnrecognizedFormatSnafu { path });
            Ok(Payload {
                format,
                json: bytes,
            })
        }
    }
}

/// Reads `path` and parses it into a bookmark tree.
///
/// # Errors
///
/// Any error from [`read_payload`] or [`Payload::parse_tree`].
pub fn load(path: impl AsRef<Path>) -> Result<BookmarkTree, LoadError> {
    read_payload(path)?.parse_tree()
}

/// Classifies input by its leading signature.
#[must_use]
pub fn detect_format(bytes: &[u8]) -> Format {
    if bytes.starts_with(CONTAINER_MAGIC) {
        Format::Container
    } else {
        Format::PlainJson
    }
}

/// Decompresses the LZ4 block following the container header.
fn decompress_container(bytes: &[u8], path: &Path) -> Result<Vec<u8>, LoadError> {
    let compressed = bytes.get(CONTAINER_HEADER_SIZE..).unwrap_or_default();
    ensure!(
        !compressed.is_empty(),
        TruncatedContainerSnafu {
            path,
            len: bytes.len(),
        }
    );

    let mut json = vec![0; DECOMPRESS_BUFFER_SIZE];
    let len =
        lz4_flex::block::decompress_into(compressed, &mut json).context(DecompressionSnafu { path })?;
    json.truncate(len);

    debug!("decompressed {} bytes to {len}", compressed.len());
    Ok(json)
}

/// Syntax-only check that `bytes` hold exactly one JSON value.
fn is_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<serde::de::IgnoredAny>(bytes).is_ok()
}
