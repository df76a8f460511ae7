// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?/?>").expect("tag regex is valid")
    })
}

/// Converts a rich-text fragment into a canonical markdown fragment.
///
/// Behavior:
/// - empty or whitespace-only input returns an empty string;
/// - input without markup delimiters is returned trimmed (plain-text passthrough);
/// - otherwise a structural HTML-to-markdown conversion runs: bold/italic spans, headings,
///   and bulleted/numbered lists map to their markdown equivalents, unknown tags are dropped.
///
/// This never fails. Malformed markup (stray `<`, unclosed tags) degrades to best-effort
/// text extraction instead of erroring; formatting fidelity may be lost, content is not.
pub fn normalize_rich_text(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }
    if !input.contains('<') {
        return input.trim().to_owned();
    }

    let mut converter = Converter::default();
    let mut last = 0;
    for tag in tag_regex().find_iter(input) {
        converter.text(&input[last..tag.start()]);
        converter.tag(tag.as_str());
        last = tag.end();
    }
    converter.text(&input[last..]);
    converter.finish()
}

#[derive(Debug)]
enum ListState {
    Bullet,
    Ordered(usize),
}

#[derive(Debug, Default)]
struct Converter {
    out: String,
    lists: Vec<ListState>,
}

impl Converter {
    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }

        let decoded = decode_entities(raw);
        let mut at_boundary = self.out.is_empty() || self.out.ends_with('\n');
        let mut pending_space = false;

        // Inter-tag whitespace (indentation, newlines inside the markup) collapses to a
        // single space and is dropped entirely at line starts.
        for ch in decoded.chars() {
            if ch.is_whitespace() {
                pending_space = !at_boundary;
                continue;
            }
            if pending_space {
                self.out.push(' ');
                pending_space = false;
            }
            self.out.push(ch);
            at_boundary = false;
        }
        if pending_space && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    fn tag(&mut self, raw: &str) {
        let inner = raw.trim_start_matches('<').trim_end_matches('>');
        let inner = inner.strip_suffix('/').unwrap_or(inner);
        let (closing, inner) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };
        let name = inner
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match name.as_str() {
            "strong" | "b" => self.out.push_str("**"),
            "em" | "i" => self.out.push('*'),
            "br" => self.out.push('\n'),
            "p" | "div" => {
                if closing {
                    self.break_block();
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.break_block();
                if !closing {
                    let level = name[1..].parse::<usize>().unwrap_or(1);
                    for _ in 0..level {
                        self.out.push('#');
                    }
                    self.out.push(' ');
                }
            }
            "ul" => {
                if closing {
                    self.lists.pop();
                    self.break_block();
                } else {
                    self.lists.push(ListState::Bullet);
                }
            }
            "ol" => {
                if closing {
                    self.lists.pop();
                    self.break_block();
                } else {
                    self.lists.push(ListState::Ordered(1));
                }
            }
            "li" => {
                if !closing {
                    self.list_item();
                }
            }
            // Unknown tags contribute no markup; their text content is kept.
            _ => {}
        }
    }

    fn list_item(&mut self) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        match self.lists.last_mut() {
            Some(ListState::Ordered(counter)) => {
                let _ = write!(self.out, "{counter}. ");
                *counter += 1;
            }
            _ => self.out.push_str("- "),
        }
    }

    fn break_block(&mut self) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
        if self.out.is_empty() {
            return;
        }
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out.push_str("\n\n");
    }

    fn finish(self) -> String {
        let mut collapsed = String::with_capacity(self.out.len());
        let mut newlines = 0usize;
        for ch in self.out.chars() {
            if ch == '\n' {
                newlines += 1;
                if newlines <= 2 {
                    collapsed.push(ch);
                }
            } else {
                newlines = 0;
                collapsed.push(ch);
            }
        }
        collapsed.trim().to_owned()
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
