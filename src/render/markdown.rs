// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// A renderer-agnostic display unit produced from canonical markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayBlock {
    /// A line fully wrapped in `**` markers.
    Heading(String),
    /// A line opening with a closed bold span, followed by the raw remainder.
    LeadIn { bold: String, rest: String },
    /// A line with no recognized markers.
    Paragraph(String),
    /// One or more consecutive `- `/`* ` lines.
    BulletList(Vec<String>),
    /// One or more consecutive `N. ` lines.
    OrderedList(Vec<String>),
    /// A blank line.
    Spacer,
}

/// Renders canonical markdown into display blocks.
///
/// Single pass, line oriented. The only state carried across lines is the currently open
/// list block: consecutive bullet lines merge into one bullet list, consecutive numbered
/// lines into one ordered list, and any other line kind (including the other list kind)
/// flushes the open list first. No markdown escaping is performed.
pub fn render_markdown(text: &str) -> Vec<DisplayBlock> {
    let mut blocks = Vec::new();
    let mut open_list: Option<OpenList> = None;

    for line in text.split('\n') {
        match classify(line) {
            Line::Heading(content) => {
                flush_list(&mut blocks, &mut open_list);
                blocks.push(DisplayBlock::Heading(content));
            }
            Line::LeadIn { bold, rest } => {
                flush_list(&mut blocks, &mut open_list);
                blocks.push(DisplayBlock::LeadIn { bold, rest });
            }
            Line::Bullet(item) => match &mut open_list {
                Some(OpenList::Bullet(items)) => items.push(item),
                _ => {
                    flush_list(&mut blocks, &mut open_list);
                    open_list = Some(OpenList::Bullet(vec![item]));
                }
            },
            Line::Numbered(item) => match &mut open_list {
                Some(OpenList::Ordered(items)) => items.push(item),
                _ => {
                    flush_list(&mut blocks, &mut open_list);
                    open_list = Some(OpenList::Ordered(vec![item]));
                }
            },
            Line::Blank => {
                flush_list(&mut blocks, &mut open_list);
                blocks.push(DisplayBlock::Spacer);
            }
            Line::Plain(content) => {
                flush_list(&mut blocks, &mut open_list);
                blocks.push(DisplayBlock::Paragraph(content));
            }
        }
    }

    flush_list(&mut blocks, &mut open_list);
    blocks
}

#[derive(Debug)]
enum OpenList {
    Bullet(Vec<String>),
    Ordered(Vec<String>),
}

fn flush_list(blocks: &mut Vec<DisplayBlock>, open_list: &mut Option<OpenList>) {
    match open_list.take() {
        Some(OpenList::Bullet(items)) => blocks.push(DisplayBlock::BulletList(items)),
        Some(OpenList::Ordered(items)) => blocks.push(DisplayBlock::OrderedList(items)),
        None => {}
    }
}

#[derive(Debug)]
enum Line {
    Heading(String),
    LeadIn { bold: String, rest: String },
    Bullet(String),
    Numbered(String),
    Blank,
    Plain(String),
}

fn classify(line: &str) -> Line {
    if let Some(after_open) = line.strip_prefix("**") {
        if let Some(content) = after_open.strip_suffix("**") {
            return Line::Heading(content.to_owned());
        }
        if let Some(close) = after_open.find("**") {
            return Line::LeadIn {
                bold: after_open[..close].to_owned(),
                rest: after_open[close + 2..].to_owned(),
            };
        }
        // An opening marker without a closing one renders as plain text.
        return Line::Plain(line.to_owned());
    }

    if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Line::Bullet(item.to_owned());
    }

    if let Some(item) = strip_numbered_marker(line) {
        return Line::Numbered(item.to_owned());
    }

    if line.trim().is_empty() {
        return Line::Blank;
    }

    Line::Plain(line.to_owned())
}

fn strip_numbered_marker(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|ch| ch.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}
