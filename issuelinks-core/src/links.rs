//! Markdown link extraction from issue bodies

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `[text](url)`, both parts non-greedy. Not a markdown parser: nested
/// brackets produce whatever the regex happens to match.
static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"\[(.*?)\]\((.*?)\)") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    });

/// A link found in issue text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Display text between the brackets (may be empty)
    pub text: String,
    /// Target between the parentheses
    pub url: String,
}

impl Link {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Extract all `[text](url)` links from `body`, in order of appearance
///
/// An absent body yields no links. Duplicates are kept.
pub fn extract_links(body: Option<&str>) -> Vec<Link> {
    let Some(body) = body else {
        return Vec::new();
    };

    MARKDOWN_LINK_RE
        .captures_iter(body)
        .map(|caps| {
            let text = caps.get(1).map_or("", |m| m.as_str());
            let url = caps.get(2).map_or("", |m| m.as_str());
            Link::new(text, url)
        })
        .collect()
}
