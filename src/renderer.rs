// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Netscape bookmark-file HTML rendering.
//!
//! This module writes a [`BookmarkTree`] in the `NETSCAPE-Bookmark-file-1`
//! format that every major browser can import.
//!
//! # Output Format
//!
//! - A fixed preamble with the root title in an `<H1>`
//! - Folders as `<DT><H3>` headings followed by a nested `<DL><p>` list
//! - Bookmarks as `<DT><A HREF="...">` lines, with `<DD>` description lines
//! - Four spaces of indentation per nesting level
//!
//! # Example
//!
//! ```
//! use ffbookmarks::parser::parse_bookmarks;
//! use ffbookmarks::renderer::render_html;
//!
//! let tree = parse_bookmarks(
//!     r#"{"children": [{"title": "Example", "uri": "https://example.com"}]}"#,
//! )
//! .unwrap();
//!
//! let html = render_html(&tree);
//! assert!(html.contains("<H1>Bookmarks Menu</H1>"));
//! assert!(html.contains("    <DT><A HREF=\"https://example.com\">Example</A>\n"));
//! ```

use crate::parser::{Bookmark, BookmarkTree, Dates, Folder, Node};
use chrono::DateTime;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Title used for the `<H1>` when the root carries none.
pub const DEFAULT_ROOT_TITLE: &str = "Bookmarks Menu";

const INDENT_WIDTH: usize = 4;

/// Writes `tree` as a complete Netscape bookmark HTML document.
///
/// Output depends only on `tree`, so equal trees give byte-identical output.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn write_html<W: Write>(tree: &BookmarkTree, out: W) -> io::Result<()> {
    let mut out = HtmlWriter::new(out);
    let title = tree.root.title.as_deref().unwrap_or(DEFAULT_ROOT_TITLE);

    out.header(title)?;

    // Pre-order walk; closing tags are queued behind a folder's children.
    let mut stack: Vec<Step<'_>> = vec![Step::Close(0)];
    push_children(&mut stack, &tree.root, 1);

    while let Some(step) = stack.pop() {
        match step {
            Step::Visit(Node::Folder(folder), depth) => {
                out.folder_open(folder, depth)?;
                stack.push(Step::Close(depth));
                push_children(&mut stack, folder, depth + 1);
            }
            Step::Visit(Node::Bookmark(bookmark), depth) => out.bookmark(bookmark, depth)?,
            Step::Visit(Node::Separator | Node::Other, _) => {}
            Step::Close(depth) => out.line(depth, "</DL><p>")?,
        }
    }

    out.flush()
}

/// Renders `tree` to a `String`.
#[must_use]
pub fn render_html(tree: &BookmarkTree) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_html(tree, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Escapes `& < > " '` for use in HTML text and attribute values.
///
/// # Example
///
/// ```
/// use ffbookmarks::renderer::escape_html;
///
/// assert_eq!(escape_html(r#"Tom & "Jerry""#), "Tom &amp; &quot;Jerry&quot;");
/// ```
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }

    result
}

/// Converts a Firefox timestamp (microseconds) to whole Unix seconds.
///
/// Zero and timestamps outside chrono's range yield `None`. Negative values
/// round toward negative infinity.
#[must_use]
pub fn unix_seconds(micros: i64) -> Option<i64> {
    if micros == 0 {
        return None;
    }
    DateTime::from_timestamp_micros(micros).map(|dt| dt.timestamp())
}

/// Formats ` ADD_DATE="..."` and ` LAST_MODIFIED="..."` attributes.
fn date_attributes(dates: &Dates) -> String {
    let mut attrs = String::new();

    if let Some(secs) = dates.added.and_then(unix_seconds) {
        let _ = write!(attrs, r#" ADD_DATE="{secs}""#);
    }
    if let Some(secs) = dates.last_modified.and_then(unix_seconds) {
        let _ = write!(attrs, r#" LAST_MODIFIED="{secs}""#);
    }

    attrs
}

enum Step<'a> {
    Visit(&'a Node, usize),
    Close(usize),
}

/// Queues a folder's children so they pop in document order.
fn push_children<'a>(stack: &mut Vec<Step<'a>>, folder: &'a Folder, depth: usize) {
    stack.extend(
        folder
            .children
            .iter()
            .rev()
            .map(|child| Step::Visit(child, depth)),
    );
}

/// Line-oriented writer that indents by nesting depth.
struct HtmlWriter<W> {
    out: W,
}

impl<W: Write> HtmlWriter<W> {
    const fn new(out: W) -> Self {
        Self { out }
    }

    fn line(&mut self, depth: usize, text: &str) -> io::Result<()> {
        writeln!(self.out, "{:indent$}{text}", "", indent = depth * INDENT_WIDTH)
    }

    fn header(&mut self, title: &str) -> io::Result<()> {
        write!(
            self.out,
            "\
<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
    It will be read and overwritten.
    DO NOT EDIT! -->
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">
<TITLE>Bookmarks</TITLE>
<H1>{}</H1>
<DL><p>
",
            escape_html(title)
        )
    }

    fn folder_open(&mut self, folder: &Folder, depth: usize) -> io::Result<()> {
        let title = escape_html(folder.title.as_deref().unwrap_or_default());
        let dates = date_attributes(&folder.dates);

        self.line(depth, &format!("<DT><H3{dates}>{title}</H3>"))?;
        self.line(depth, "<DL><p>")
    }

    fn bookmark(&mut self, bookmark: &Bookmark, depth: usize) -> io::Result<()> {
        let uri = escape_html(&bookmark.uri);
        let title = escape_html(bookmark.display_title());
        let dates = date_attributes(&bookmark.dates);

        self.line(depth, &format!(r#"<DT><A HREF="{uri}"{dates}>{title}</A>"#))?;

        for description in bookmark.descriptions() {
            self.line(depth, &format!("<DD>{}", escape_html(description)))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
