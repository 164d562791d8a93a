use scraper::{Html, Node};
use serde_json::Value;

/// Elements whose text is code or inert markup rather than review prose.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Plain-text review of a candidate, taken from the first evaluation only.
///
/// Returns `None` when `evaluations` is missing, not a list, or empty. A first
/// evaluation without `content` yields an empty review rather than none.
pub fn extract_review(evaluations: Option<&Value>) -> Option<String> {
    let first = evaluations?.as_array()?.first()?;
    let content = first
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(html_to_text(content))
}

/// Visible text of an HTML fragment, one space between text nodes.
///
/// html5ever recovers from any malformed markup, so this never fails; at
/// worst the text is shorter than the author intended.
pub fn html_to_text(fragment: &str) -> String {
    if fragment.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_fragment(fragment);
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}
