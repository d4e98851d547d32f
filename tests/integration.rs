// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Integration tests for ffbookmarks loading and rendering.

use ffbookmarks::parser::{self, Node};
use ffbookmarks::{loader, renderer};
use std::fs;
use tempfile::TempDir;

/// A trimmed-down Firefox backup with the fields Firefox actually writes.
const FIREFOX_BACKUP: &str = r#"{
    "guid": "root________",
    "title": "",
    "index": 0,
    "dateAdded": 1700000000000000,
    "lastModified": 1700000500000000,
    "id": 1,
    "typeCode": 2,
    "type": "text/x-moz-place-container",
    "root": "placesRoot",
    "children": [
        {
            "guid": "menu________",
            "title": "menu",
            "dateAdded": 1700000000000000,
            "lastModified": 1700000400000000,
            "typeCode": 2,
            "root": "bookmarksMenuFolder",
            "children": [
                {
                    "guid": "aaaaaaaaaaaa",
                    "title": "Rust & Friends",
                    "dateAdded": 1700000100000000,
                    "lastModified": 1700000100000000,
                    "typeCode": 1,
                    "uri": "https://www.rust-lang.org/",
                    "annos": [
                        {
                            "name": "bookmarkProperties/description",
                            "flags": 0,
                            "expires": 4,
                            "value": "The \"Rust\" <language>"
                        }
                    ]
                },
                {
                    "guid": "bbbbbbbbbbbb",
                    "typeCode": 3,
                    "type": "text/x-moz-place-separator"
                },
                {
                    "guid": "cccccccccccc",
                    "title": "Docs",
                    "typeCode": 1,
                    "uri": "https://docs.rs/"
                }
            ]
        },
        {
            "guid": "toolbar_____",
            "title": "toolbar",
            "typeCode": 2,
            "children": []
        }
    ]
}"#;

fn container(json: &str) -> Vec<u8> {
    let mut bytes = b"mozLz40\0".to_vec();
    let len = u32::try_from(json.len()).unwrap();
    bytes.extend_from_slice(&len.to_le_bytes());
    bytes.extend_from_slice(&lz4_flex::block::compress(json.as_bytes()));
    bytes
}

/// URIs in pre-order, skipping separators and everything under them.
fn collect_uris(nodes: &[Node], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Folder(folder) => collect_uris(&folder.children, out),
            Node::Bookmark(bookmark) => out.push(bookmark.uri.clone()),
            Node::Separator | Node::Other => {}
        }
    }
}

#[test]
fn converts_firefox_backup() {
    let tree = parser::parse_bookmarks(FIREFOX_BACKUP).unwrap();
    let html = renderer::render_html(&tree);

    let expected = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
    It will be read and overwritten.
    DO NOT EDIT! -->
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1></H1>
<DL><p>
    <DT><H3 ADD_DATE="1700000000" LAST_MODIFIED="1700000400">menu</H3>
    <DL><p>
        <DT><A HREF="https://www.rust-lang.org/" ADD_DATE="1700000100" LAST_MODIFIED="1700000100">Rust &amp; Friends</A>
        <DD>The &quot;Rust&quot; &lt;language&gt;
        <DT><A HREF="https://docs.rs/">Docs</A>
    </DL><p>
    <DT><H3>toolbar</H3>
    <DL><p>
    </DL><p>
</DL><p>
"#;
    assert_eq!(html, expected);
}

#[test]
fn container_and_plain_json_render_identically() {
    let dir = TempDir::new().unwrap();
    let lz4_path = dir.path().join("bookmarks.jsonlz4");
    let json_path = dir.path().join("bookmarks.json");
    fs::write(&lz4_path, container(FIREFOX_BACKUP)).unwrap();
    fs::write(&json_path, FIREFOX_BACKUP).unwrap();

    let from_container = loader::load(&lz4_path).unwrap();
    let from_json = loader::load(&json_path).unwrap();

    assert_eq!(from_container, from_json);
    assert_eq!(
        renderer::render_html(&from_container),
        renderer::render_html(&from_json)
    );
}

#[test]
fn every_bookmark_appears_once_in_order() {
    let json = r#"{"children": [
        {"uri": "https://1.test"},
        {"children": [
            {"uri": "https://2.test"},
            {"typeCode": 3, "children": [{"uri": "https://hidden.test"}]},
            {"children": [{"uri": "https://3.test"}]}
        ]},
        {"typeCode": 3, "uri": "https://also-hidden.test"},
        {"uri": "https://4.test", "children": [{"uri": "https://5.test"}]}
    ]}"#;
    let tree = parser::parse_bookmarks(json).unwrap();
    let html = renderer::render_html(&tree);

    let mut uris = Vec::new();
    collect_uris(&tree.root.children, &mut uris);
    assert_eq!(
        uris,
        [
            "https://1.test",
            "https://2.test",
            "https://3.test",
            "https://5.test"
        ]
    );

    let anchors: Vec<&str> = html
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("<DT><A HREF=\""))
        .filter_map(|rest| rest.split('"').next())
        .collect();
    assert_eq!(anchors, uris);
    assert!(!html.contains("hidden"));
}

#[test]
fn escaped_output_has_no_raw_special_characters_in_text() {
    let nasty = r#"<&>"'"#;
    let json = serde_json::json!({
        "title": nasty,
        "children": [
            {"title": nasty, "children": []},
            {
                "title": nasty,
                "uri": nasty,
                "annos": [{"name": "bookmarkProperties/description", "value": nasty}]
            }
        ]
    })
    .to_string();
    let html = renderer::render_html(&parser::parse_bookmarks(&json).unwrap());

    for line in html.lines().skip(6) {
        let text: String = line
            .replace("<H1>", "")
            .replace("</H1>", "")
            .replace("<DT><H3>", "")
            .replace("</H3>", "")
            .replace("<DT><A HREF=\"", "")
            .replace("\">", "")
            .replace("</A>", "")
            .replace("<DD>", "")
            .replace("<DL><p>", "")
            .replace("</DL><p>", "");
        assert!(
            !text.contains(['<', '>', '"', '\'']),
            "raw special character in {line:?}"
        );
        assert!(
            text.matches('&').count() == text.matches("&amp;").count()
                + text.matches("&lt;").count()
                + text.matches("&gt;").count()
                + text.matches("&quot;").count()
                + text.matches("&#x27;").count(),
            "raw ampersand in {line:?}"
        );
    }
}

#[test]
fn payload_exposes_decompressed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bookmarks.jsonlz4");
    fs::write(&path, container(FIREFOX_BACKUP)).unwrap();

    let payload = loader::read_payload(&path).unwrap();

    assert_eq!(payload.format, loader::Format::Container);
    assert_eq!(payload.json, FIREFOX_BACKUP.as_bytes());
}

#[test]
fn oversized_container_payload_fails_to_decompress() {
    let big = format!(
        r#"{{"title": "{}", "children": []}}"#,
        "x".repeat(loader::DECOMPRESS_BUFFER_SIZE)
    );
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("huge.jsonlz4");
    fs::write(&path, container(&big)).unwrap();

    assert!(matches!(
        loader::load(&path).unwrap_err(),
        loader::LoadError::Decompression { .. }
    ));
}
