//! Word segmentation for staggered reveals.
//!
//! [`segment`] turns a content tree into an isomorphic tree in which every
//! text run has been replaced by word and space units. Word ordinals are
//! threaded through the whole descent in reading order, so a word inside a
//! nested `Strong` span gets the ordinal right after the word preceding the
//! span.
//!
//! Whitespace policy:
//! - a whitespace run without a line terminator becomes a single `Space`
//! - a whitespace run containing `\n` or `\r` is dropped; the line break it
//!   stood for is carried by a `Break` node elsewhere in the tree

use std::sync::LazyLock;

use regex::Regex;

use crate::content::{ContentNode, Element, WordUnit};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Segment a tree, numbering words from zero.
pub fn segment(root: &ContentNode) -> ContentNode {
    segment_from(root, 0).0
}

/// Segment a tree starting at `ordinal`. Returns the new tree and the next
/// free ordinal.
pub fn segment_from(node: &ContentNode, ordinal: usize) -> (ContentNode, usize) {
    match node {
        ContentNode::Text { text } => {
            let mut units = Vec::new();
            let next = split_text(text, ordinal, &mut units);
            (ContentNode::fragment(units), next)
        }
        ContentNode::Element(el) => {
            let (children, next) = segment_children(&el.children, ordinal);
            (
                ContentNode::Element(Element {
                    tag: el.tag,
                    class: el.class.clone(),
                    children,
                }),
                next,
            )
        }
        _ => {
            let mut out = Vec::with_capacity(1);
            let next = segment_leaf(node, ordinal, &mut out);
            match out.pop() {
                Some(single) => (single, next),
                None => (ContentNode::fragment(Vec::new()), next),
            }
        }
    }
}

fn segment_children(children: &[ContentNode], mut ordinal: usize) -> (Vec<ContentNode>, usize) {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        ordinal = match child {
            ContentNode::Text { text } => split_text(text, ordinal, &mut out),
            ContentNode::Element(_) => {
                let (node, next) = segment_from(child, ordinal);
                out.push(node);
                next
            }
            _ => segment_leaf(child, ordinal, &mut out),
        };
    }
    (out, ordinal)
}

/// Breaks and spaces are cloned as-is; an existing word is renumbered.
fn segment_leaf(node: &ContentNode, ordinal: usize, out: &mut Vec<ContentNode>) -> usize {
    match node {
        ContentNode::Word(w) => {
            out.push(ContentNode::Word(WordUnit {
                text: w.text.clone(),
                ordinal,
            }));
            ordinal + 1
        }
        ContentNode::Break | ContentNode::Space => {
            out.push(node.clone());
            ordinal
        }
        ContentNode::Text { .. } | ContentNode::Element(_) => {
            unreachable!("segment_leaf called with a non-leaf node")
        }
    }
}

fn split_text(text: &str, mut ordinal: usize, out: &mut Vec<ContentNode>) -> usize {
    let mut last = 0;
    for ws in WHITESPACE.find_iter(text) {
        if ws.start() > last {
            out.push(word(&text[last..ws.start()], ordinal));
            ordinal += 1;
        }
        if !ws.as_str().contains(['\n', '\r']) {
            out.push(ContentNode::Space);
        }
        last = ws.end();
    }
    if last < text.len() {
        out.push(word(&text[last..], ordinal));
        ordinal += 1;
    }
    ordinal
}

fn word(text: &str, ordinal: usize) -> ContentNode {
    ContentNode::Word(WordUnit {
        text: text.to_string(),
        ordinal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Tag;
    use proptest::prelude::*;

    fn words_of(node: &ContentNode) -> Vec<(String, usize)> {
        node.words()
            .into_iter()
            .map(|w| (w.text.clone(), w.ordinal))
            .collect()
    }

    #[test]
    fn splits_plain_text_into_words_and_spaces() {
        let out = segment(&ContentNode::text("Design  is\tthinking"));
        let ContentNode::Element(el) = &out else {
            panic!("expected fragment, got {out:?}");
        };
        assert_eq!(el.tag, Tag::Fragment);
        assert_eq!(el.children.len(), 5);
        assert!(matches!(el.children[1], ContentNode::Space));
        assert!(matches!(el.children[3], ContentNode::Space));
        assert_eq!(
            words_of(&out),
            vec![
                ("Design".to_string(), 0),
                ("is".to_string(), 1),
                ("thinking".to_string(), 2)
            ]
        );
    }

    #[test]
    fn newline_whitespace_is_dropped() {
        let tree = ContentNode::element(
            Tag::Paragraph,
            vec![
                ContentNode::text("first line"),
                ContentNode::Break,
                ContentNode::text("\n  second"),
            ],
        );
        let out = segment(&tree);
        let ContentNode::Element(el) = &out else {
            panic!("expected element");
        };
        // first, space, line, break, second
        assert_eq!(el.children.len(), 5);
        assert!(matches!(el.children[3], ContentNode::Break));
        assert_eq!(out.rendered_text(), "first linesecond");
    }

    #[test]
    fn ordinals_continue_across_nested_spans() {
        let tree = ContentNode::element(
            Tag::Heading(1),
            vec![
                ContentNode::text("The "),
                ContentNode::element(
                    Tag::Strong,
                    vec![
                        ContentNode::text("new "),
                        ContentNode::element(Tag::Emphasis, vec![ContentNode::text("creative")]),
                    ],
                ),
                ContentNode::text(" cycle"),
            ],
        );
        let out = segment(&tree);
        let ordinals: Vec<usize> = out.words().iter().map(|w| w.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        assert_eq!(out.rendered_text(), "The new creative cycle");
    }

    #[test]
    fn nesting_depth_is_preserved() {
        let tree = ContentNode::element(
            Tag::Paragraph,
            vec![ContentNode::element(
                Tag::Strong,
                vec![ContentNode::element(
                    Tag::Emphasis,
                    vec![ContentNode::text("deep")],
                )],
            )],
        );
        let out = segment(&tree);
        let ContentNode::Element(p) = &out else {
            panic!()
        };
        let ContentNode::Element(strong) = &p.children[0] else {
            panic!()
        };
        assert_eq!(strong.tag, Tag::Strong);
        let ContentNode::Element(em) = &strong.children[0] else {
            panic!()
        };
        assert_eq!(em.tag, Tag::Emphasis);
        assert!(matches!(em.children[0], ContentNode::Word(_)));
    }

    #[test]
    fn class_is_cloned() {
        let tree = ContentNode::Element(Element {
            tag: Tag::Highlight,
            class: Some("gradient".to_string()),
            children: vec![ContentNode::text("glow")],
        });
        let ContentNode::Element(el) = segment(&tree) else {
            panic!()
        };
        assert_eq!(el.class.as_deref(), Some("gradient"));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(segment(&ContentNode::text("")).is_empty());
        assert!(segment(&ContentNode::fragment(Vec::new())).is_empty());
        assert_eq!(segment_from(&ContentNode::text(""), 7).1, 7);
    }

    #[test]
    fn whitespace_only_text_yields_single_space() {
        let out = segment(&ContentNode::text("   "));
        let ContentNode::Element(el) = &out else {
            panic!()
        };
        assert_eq!(el.children, vec![ContentNode::Space]);
        assert_eq!(out.word_count(), 0);
    }

    #[test]
    fn resegmenting_renumbers_from_start() {
        let once = segment(&ContentNode::text("a b c"));
        let (twice, next) = segment_from(&once, 10);
        let ordinals: Vec<usize> = twice.words().iter().map(|w| w.ordinal).collect();
        assert_eq!(ordinals, vec![10, 11, 12]);
        assert_eq!(next, 13);
        assert_eq!(twice.rendered_text(), "a b c");
    }

    #[test]
    fn root_break_is_cloned() {
        assert_eq!(segment(&ContentNode::Break), ContentNode::Break);
    }

    /// Reference rendering: drop whitespace runs holding a line terminator,
    /// collapse the rest to one space.
    fn collapse(text: &str) -> String {
        let mut out = String::new();
        let mut run = String::new();
        for c in text.chars() {
            if c.is_whitespace() {
                run.push(c);
                continue;
            }
            if !run.is_empty() {
                if !run.contains(['\n', '\r']) {
                    out.push(' ');
                }
                run.clear();
            }
            out.push(c);
        }
        if !run.is_empty() && !run.contains(['\n', '\r']) {
            out.push(' ');
        }
        out
    }

    fn arb_tree() -> impl Strategy<Value = ContentNode> {
        let leaf = prop_oneof![
            "[a-z \\n\\t]{0,12}".prop_map(ContentNode::text),
            Just(ContentNode::Break),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            (
                prop_oneof![
                    Just(Tag::Strong),
                    Just(Tag::Emphasis),
                    Just(Tag::Paragraph)
                ],
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(tag, children)| ContentNode::element(tag, children))
        })
    }

    proptest! {
        #[test]
        fn text_round_trips_with_collapsed_whitespace(text in "[a-z \\n\\t\\r]{0,40}") {
            let out = segment(&ContentNode::text(text.clone()));
            prop_assert_eq!(out.rendered_text(), collapse(&text));
        }

        #[test]
        fn ordinals_strictly_increase_in_preorder(tree in arb_tree()) {
            let out = segment(&tree);
            let ordinals: Vec<usize> = out.words().iter().map(|w| w.ordinal).collect();
            for (i, ord) in ordinals.iter().enumerate() {
                prop_assert_eq!(*ord, i);
            }
            prop_assert_eq!(segment_from(&tree, 0).1, ordinals.len());
        }
    }
}
