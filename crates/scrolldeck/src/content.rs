use std::time::Duration;

use serde::Serialize;

/// A node in a slide's rich-text tree.
///
/// Parsed content only contains `Text`, `Break` and `Element`. `Word` and
/// `Space` are produced by [`crate::segment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentNode {
    Text { text: String },
    Break,
    Element(Element),
    Word(WordUnit),
    Space,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: Tag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub children: Vec<ContentNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Fragment,
    Heading(u8),
    Paragraph,
    Strong,
    Emphasis,
    Strikethrough,
    Highlight,
}

/// One animatable word. `ordinal` counts words across the whole tree in
/// reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordUnit {
    pub text: String,
    pub ordinal: usize,
}

impl WordUnit {
    pub fn stagger_delay(&self, step: Duration) -> Duration {
        crate::schedule::steps(step, self.ordinal)
    }
}

impl ContentNode {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }

    pub fn element(tag: Tag, children: Vec<ContentNode>) -> Self {
        Self::Element(Element {
            tag,
            class: None,
            children,
        })
    }

    pub fn fragment(children: Vec<ContentNode>) -> Self {
        Self::element(Tag::Fragment, children)
    }

    /// Word units in document (pre-order) order.
    pub fn words(&self) -> Vec<&WordUnit> {
        let mut out = Vec::new();
        collect_words(self, &mut out);
        out
    }

    pub fn word_count(&self) -> usize {
        match self {
            Self::Word(_) => 1,
            Self::Element(el) => el.children.iter().map(Self::word_count).sum(),
            _ => 0,
        }
    }

    /// Concatenated text of every word, space and raw text run, in order.
    /// Breaks contribute nothing.
    pub fn rendered_text(&self) -> String {
        let mut out = String::new();
        push_text(self, &mut out);
        out
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text { text } => text.is_empty(),
            Self::Element(el) => el.children.is_empty(),
            Self::Break | Self::Word(_) | Self::Space => false,
        }
    }
}

fn collect_words<'a>(node: &'a ContentNode, out: &mut Vec<&'a WordUnit>) {
    match node {
        ContentNode::Word(w) => out.push(w),
        ContentNode::Element(el) => {
            for child in &el.children {
                collect_words(child, out);
            }
        }
        _ => {}
    }
}

fn push_text(node: &ContentNode, out: &mut String) {
    match node {
        ContentNode::Text { text } => out.push_str(text),
        ContentNode::Word(w) => out.push_str(&w.text),
        ContentNode::Space => out.push(' '),
        ContentNode::Break => {}
        ContentNode::Element(el) => {
            for child in &el.children {
                push_text(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_delay_scales_with_ordinal() {
        let w = WordUnit {
            text: "hello".to_string(),
            ordinal: 4,
        };
        assert_eq!(
            w.stagger_delay(Duration::from_millis(45)),
            Duration::from_millis(180)
        );
    }

    #[test]
    fn huge_ordinal_saturates() {
        let w = WordUnit {
            text: "late".to_string(),
            ordinal: usize::MAX,
        };
        assert_eq!(w.stagger_delay(Duration::from_millis(45)), Duration::MAX);
    }

    #[test]
    fn rendered_text_skips_breaks() {
        let node = ContentNode::fragment(vec![
            ContentNode::text("one"),
            ContentNode::Break,
            ContentNode::element(Tag::Strong, vec![ContentNode::text(" two")]),
        ]);
        assert_eq!(node.rendered_text(), "one two");
    }

    #[test]
    fn empty_fragment_is_empty() {
        assert!(ContentNode::fragment(Vec::new()).is_empty());
        assert!(!ContentNode::Break.is_empty());
    }
}
