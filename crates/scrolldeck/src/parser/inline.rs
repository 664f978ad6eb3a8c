//! Inline markup: `**strong**`, `*em*`, `~~strike~~`, `==highlight==` and
//! `<br>` hard breaks.

use crate::content::{ContentNode, Tag};

const SPANS: [(&str, Tag); 4] = [
    ("**", Tag::Strong),
    ("~~", Tag::Strikethrough),
    ("==", Tag::Highlight),
    ("*", Tag::Emphasis),
];

const BREAKS: [&str; 3] = ["<br>", "<br/>", "<br />"];

pub fn parse(text: &str) -> Vec<ContentNode> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    'scan: while let Some(c) = rest.chars().next() {
        if let Some(after) = BREAKS.iter().find_map(|b| rest.strip_prefix(b)) {
            flush(&mut plain, &mut out);
            out.push(ContentNode::Break);
            rest = after;
            continue;
        }
        for (delim, tag) in SPANS {
            let Some(inner) = rest.strip_prefix(delim) else {
                continue;
            };
            if delim == "*" && inner.starts_with('*') {
                continue;
            }
            if let Some(end) = find_close(inner, delim) {
                flush(&mut plain, &mut out);
                out.push(ContentNode::element(tag, parse(&inner[..end])));
                rest = &inner[end + delim.len()..];
                continue 'scan;
            }
        }
        plain.push(c);
        rest = &rest[c.len_utf8()..];
    }
    flush(&mut plain, &mut out);
    out
}

fn flush(plain: &mut String, out: &mut Vec<ContentNode>) {
    if !plain.is_empty() {
        out.push(ContentNode::text(std::mem::take(plain)));
    }
}

/// Position of the closing delimiter. Empty spans don't count, and a
/// single `*` never opens or closes on half of a `**`.
fn find_close(s: &str, delim: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = s[from..].find(delim) {
        let at = from + pos;
        if delim == "*" && s[at + 1..].starts_with('*') {
            from = at + 2;
            continue;
        }
        return (at > 0).then_some(at);
    }
    None
}
