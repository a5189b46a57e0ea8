//! Visible-text extraction from raw HTML.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node};

/// Elements whose text never reaches a reader.
const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collect every visible text node of `html`, stripped, joined by single spaces.
///
/// Text under `<script>`, `<style>`, `<noscript>` and `<template>` is dropped.
/// Whitespace runs inside a text node collapse to one space.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut parts: Vec<String> = Vec::new();

    for node in doc.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let stripped = text.trim();
        if !stripped.is_empty() {
            parts.push(WHITESPACE_RE.replace_all(stripped, " ").into_owned());
        }
    }

    parts.join(" ")
}
