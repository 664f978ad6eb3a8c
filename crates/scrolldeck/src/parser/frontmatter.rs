use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Mode;

/// Deck-wide settings from the leading YAML block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

/// Split `---`-fenced frontmatter off the top of a document.
///
/// A document that does not open with a fence, or whose fence is never
/// closed, has no frontmatter and is returned whole.
pub fn extract(content: &str) -> Result<(DeckMeta, String)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return Ok((DeckMeta::default(), content.to_string()));
    }

    let mut yaml = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim_end() == "---" {
            closed = true;
            break;
        }
        yaml.push(line);
    }
    if !closed {
        return Ok((DeckMeta::default(), content.to_string()));
    }

    let yaml = yaml.join("\n");
    let meta = if yaml.trim().is_empty() {
        DeckMeta::default()
    } else {
        serde_yaml::from_str(&yaml).context("Invalid frontmatter")?
    };
    if let Some(theme) = meta.theme.as_deref() {
        if theme != "light" && theme != "dark" {
            anyhow::bail!("Invalid theme in frontmatter: {theme}. Must be 'light' or 'dark'.");
        }
    }
    let body: Vec<&str> = lines.collect();
    Ok((meta, body.join("\n")))
}
