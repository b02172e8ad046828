//! Plain-text export of content.

use crate::content::latex::prettify;
use crate::content::model::{Content, Topic};
use crate::error::Result;
use arboard::Clipboard;

/// Render the content tree as an indented outline.
pub fn format_outline(content: &Content) -> String {
    let mut text = String::from("Calculus Modules\n");
    let last_module = content.modules.len().saturating_sub(1);

    for (m, module) in content.modules.iter().enumerate() {
        let is_last = m == last_module;
        let connector = if is_last { "└── " } else { "├── " };
        text.push_str(&format!("{}{}\n", connector, module.title));

        let prefix = if is_last { "    " } else { "│   " };
        let last_topic = module.topics.len().saturating_sub(1);
        for (t, topic) in module.topics.iter().enumerate() {
            let connector = if t == last_topic { "└── " } else { "├── " };
            text.push_str(&format!("{}{}{}\n", prefix, connector, topic.title));
        }
    }

    text
}

/// Render one topic card as plain text.
pub fn format_topic(topic: &Topic) -> String {
    let mut text = format!("{}\n", topic.title);
    text.push_str(&"=".repeat(topic.title.chars().count()));
    text.push('\n');

    if let Some(explanation) = &topic.explanation {
        text.push_str(&format!("\n{}\n", explanation));
    }

    if !topic.formulas.is_empty() {
        text.push_str("\nFormulas:\n");
        for formula in &topic.formulas {
            text.push_str(&format!("  {}\n", prettify(formula)));
        }
    }

    if !topic.concepts.is_empty() {
        text.push_str("\nKey concepts:\n");
        for concept in &topic.concepts {
            text.push_str(&format!("  - {}\n", concept));
        }
    }

    text
}

/// Copy the content outline to clipboard.
pub fn copy_outline(content: &Content) -> Result<()> {
    set_clipboard(&format_outline(content))
}

/// Copy a topic card to clipboard.
pub fn copy_topic(topic: &Topic) -> Result<()> {
    set_clipboard(&format_topic(topic))
}

fn set_clipboard(text: &str) -> Result<()> {
    Clipboard::new()?.set_text(text)?;
    tracing::debug!("Copied {} chars to clipboard", text.chars().count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Content {
        Content::from_json(
            r#"{"modules":[
                {"title":"Limits","topics":[{"title":"A"},{"title":"B"}]},
                {"title":"Derivatives","topics":[{"title":"C"}]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn outline_uses_tree_connectors() {
        assert_eq!(
            format_outline(&sample()),
            "Calculus Modules\n\
             ├── Limits\n\
             │   ├── A\n\
             │   └── B\n\
             └── Derivatives\n    \
             └── C\n"
        );
    }

    #[test]
    fn topic_text_prettifies_formulas() {
        let topic = Topic {
            title: "Power Rule".into(),
            explanation: Some("Differentiate powers.".into()),
            formulas: vec![r"\frac{d}{dx}[x^n] = nx^{n-1}".into()],
            concepts: vec!["Works for real n".into()],
        };
        let text = format_topic(&topic);
        assert!(text.starts_with("Power Rule\n==========\n"));
        assert!(text.contains("  d/dx[xⁿ] = nxⁿ⁻¹\n"));
        assert!(text.contains("  - Works for real n\n"));
    }
}
