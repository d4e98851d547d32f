// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert Firefox bookmark backups to Netscape bookmark HTML.
//!
//! This crate reads Firefox's bookmark backups (compressed `.jsonlz4` files or
//! plain `.json` exports) and writes the `NETSCAPE-Bookmark-file-1` HTML that
//! other browsers import.
//!
//! # Overview
//!
//! 1. Detects the input format and unwraps the `mozLz4` container
//! 2. Parses the JSON document into a typed bookmark tree
//! 3. Renders the tree as indented bookmark HTML
//!
//! # Example
//!
//! ```no_run
//! use ffbookmarks::{loader, renderer};
//!
//! let tree = loader::load("bookmarks-2025-06-11.jsonlz4").unwrap();
//! let html = renderer::render_html(&tree);
//! std::fs::write("bookmarks.html", html).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`loader`]: format detection and container decompression
//! - [`parser`]: JSON parsing and the bookmark tree types
//! - [`renderer`]: HTML generation

#![deny(missing_docs)]

pub mod loader;
pub mod parser;
pub mod renderer;
