use serde::Serialize;

use crate::content::{ContentNode, Tag};

use super::inline;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: String,
    pub value: String,
}

/// Parse a `@name: value` line.
pub fn directive(line: &str) -> Option<Directive> {
    let rest = line.trim().strip_prefix('@')?;
    let (name, value) = rest.split_once(':')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    valid.then(|| Directive {
        name: name.to_string(),
        value: value.trim().to_string(),
    })
}

/// Pull directive lines out of a raw slide, returning them and the
/// remaining markdown.
pub fn extract_directives(raw: &str) -> (Vec<Directive>, String) {
    let mut directives = Vec::new();
    let mut body = Vec::new();
    for line in raw.lines() {
        match directive(line) {
            Some(d) => directives.push(d),
            None => body.push(line),
        }
    }
    (directives, body.join("\n").trim().to_string())
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if !(1..=3).contains(&hashes) {
        return None;
    }
    let text = line[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, text.trim()))
}

/// Join paragraph lines. Soft wraps become a space; a trailing `\` is a hard
/// break and keeps the newline so the segmenter drops the gap.
fn paragraph(lines: &[&str]) -> ContentNode {
    let mut text = String::new();
    let mut hard = false;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            text.push(if hard { '\n' } else { ' ' });
        }
        let line = line.trim();
        match line.strip_suffix('\\') {
            Some(kept) => {
                text.push_str(kept.trim_end());
                text.push_str("<br>");
                hard = true;
            }
            None => {
                text.push_str(line);
                hard = line.ends_with("<br>") || line.ends_with("<br/>") || line.ends_with("<br />");
            }
        }
    }
    ContentNode::element(Tag::Paragraph, inline::parse(&text))
}

/// Turn a slide body into top-level heading and paragraph elements.
pub fn parse(content: &str) -> Vec<ContentNode> {
    let mut blocks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !pending.is_empty() {
                blocks.push(paragraph(&pending));
                pending.clear();
            }
            continue;
        }
        if let Some((level, text)) = heading(line.trim_start()) {
            if !pending.is_empty() {
                blocks.push(paragraph(&pending));
                pending.clear();
            }
            blocks.push(ContentNode::element(Tag::Heading(level), inline::parse(text)));
            continue;
        }
        pending.push(line);
    }
    if !pending.is_empty() {
        blocks.push(paragraph(&pending));
    }
    blocks
}
