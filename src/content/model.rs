//! Course content data model.

use crate::error::{CalcError, Result};
use serde::Deserialize;

/// Content bundled into the binary.
const BUILTIN_JSON: &str = include_str!("../../assets/modules.json");

/// A topic card.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Topic {
    /// Card title.
    pub title: String,
    /// Short prose explanation.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Formulas in LaTeX notation.
    #[serde(default)]
    pub formulas: Vec<String>,
    /// Key concepts.
    #[serde(default)]
    pub concepts: Vec<String>,
}

impl Topic {
    /// Case-insensitive match against any text on the card.
    pub fn matches(&self, needle_lower: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle_lower);
        hit(&self.title)
            || self.explanation.as_deref().is_some_and(hit)
            || self.formulas.iter().any(|f| hit(f))
            || self.concepts.iter().any(|c| hit(c))
    }
}

/// A module grouping related topics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Module {
    /// Module title.
    pub title: String,
    /// Topics in display order.
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// The full content tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Content {
    /// Modules in display order.
    pub modules: Vec<Module>,
}

impl Content {
    /// Parse the content compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_JSON)
    }

    /// Parse content from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let content: Content =
            serde_json::from_str(json).map_err(|e| CalcError::Content(e.to_string()))?;
        if content.modules.is_empty() {
            return Err(CalcError::Content("no modules".to_string()));
        }
        if let Some(module) = content.modules.iter().find(|m| m.title.trim().is_empty()) {
            return Err(CalcError::Content(format!(
                "module with {} topics has no title",
                module.topics.len()
            )));
        }
        tracing::debug!(
            "Loaded {} modules, {} topics",
            content.modules.len(),
            content.topic_count()
        );
        Ok(content)
    }

    /// Total number of topics.
    pub fn topic_count(&self) -> usize {
        self.modules.iter().map(|m| m.topics.len()).sum()
    }

    /// Look up a topic.
    pub fn topic(&self, module: usize, topic: usize) -> Option<&Topic> {
        self.modules.get(module)?.topics.get(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_content_parses() {
        let content = Content::builtin().unwrap();
        assert_eq!(content.modules.len(), 8);
        assert!(content.modules[0].title.starts_with("CHUNK 1"));
        let first = content.topic(0, 0).unwrap();
        assert_eq!(first.title, "The Limit of a Function");
        assert!(!first.formulas.is_empty());
    }

    #[test]
    fn optional_fields_default() {
        let content =
            Content::from_json(r#"{"modules":[{"title":"M","topics":[{"title":"T"}]}]}"#).unwrap();
        let topic = content.topic(0, 0).unwrap();
        assert_eq!(topic.explanation, None);
        assert!(topic.formulas.is_empty());
    }

    #[test]
    fn invalid_content_is_rejected() {
        assert!(matches!(
            Content::from_json(r#"{"modules":[]}"#),
            Err(CalcError::Content(_))
        ));
        assert!(matches!(
            Content::from_json("not json"),
            Err(CalcError::Content(_))
        ));
    }

    #[test]
    fn topic_matching_covers_all_fields() {
        let topic = Topic {
            title: "Chain Rule".into(),
            explanation: Some("Composite functions".into()),
            formulas: vec![r"\frac{dy}{dx}".into()],
            concepts: vec!["Inner derivative".into()],
        };
        assert!(topic.matches("chain"));
        assert!(topic.matches("composite"));
        assert!(topic.matches("dy"));
        assert!(topic.matches("inner"));
        assert!(!topic.matches("integral"));
    }
}
