//! Search over the content tree.

use super::model::Content;
use super::NodeId;

/// Search state.
#[derive(Debug, Default)]
pub struct SearchState {
    is_active: bool,
    buffer: String,
    query: String,
    matches: Vec<NodeId>,
    current_match: usize,
}

impl SearchState {
    /// Create a new search state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the search prompt is open.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Start a search.
    pub fn start(&mut self) {
        self.is_active = true;
        self.buffer.clear();
    }

    /// Add a character to the search buffer.
    pub fn input(&mut self, c: char) {
        self.buffer.push(c);
    }

    /// Remove the last character from the search buffer.
    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Submit the search.
    pub fn submit(&mut self) {
        if !self.buffer.is_empty() {
            self.query = self.buffer.clone();
        }
        self.buffer.clear();
        self.is_active = false;
    }

    /// Cancel the search.
    pub fn cancel(&mut self) {
        self.is_active = false;
        self.buffer.clear();
        self.matches.clear();
        self.current_match = 0;
    }

    /// Collect matching modules and topics in display order.
    pub fn perform_search(&mut self, content: &Content) {
        self.matches.clear();
        self.current_match = 0;

        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return;
        }

        for (m, module) in content.modules.iter().enumerate() {
            if module.title.to_lowercase().contains(&needle) {
                self.matches.push(NodeId::Module(m));
            }
            for (t, topic) in module.topics.iter().enumerate() {
                if topic.matches(&needle) {
                    self.matches.push(NodeId::Topic(m, t));
                }
            }
        }
        tracing::debug!("Search '{}': {} matches", self.query, self.matches.len());
    }

    /// Get the current match.
    pub fn current_match(&self) -> Option<NodeId> {
        self.matches.get(self.current_match).copied()
    }

    /// Move to the next match.
    pub fn next_match(&mut self) {
        if !self.matches.is_empty() {
            self.current_match = (self.current_match + 1) % self.matches.len();
        }
    }

    /// Move to the previous match.
    pub fn prev_match(&mut self) {
        if !self.matches.is_empty() {
            if self.current_match == 0 {
                self.current_match = self.matches.len() - 1;
            } else {
                self.current_match -= 1;
            }
        }
    }

    /// Get the search buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Get the search query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Get the number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Get the current match index.
    pub fn current_match_index(&self) -> usize {
        self.current_match
    }

    /// Whether a node is one of the matches.
    pub fn is_match(&self, id: NodeId) -> bool {
        self.matches.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(query: &str) -> SearchState {
        let content = Content::builtin().unwrap();
        let mut state = SearchState::new();
        state.start();
        for c in query.chars() {
            state.input(c);
        }
        state.submit();
        state.perform_search(&content);
        state
    }

    #[test]
    fn finds_topics_by_formula_text() {
        let state = search("hôpital");
        assert!(state.match_count() >= 1);
        assert!(matches!(state.current_match(), Some(NodeId::Topic(..))));
    }

    #[test]
    fn module_titles_match() {
        let state = search("definite integrals");
        assert!(state.is_match(NodeId::Module(6)));
    }

    #[test]
    fn navigation_wraps() {
        let mut state = search("limit");
        let count = state.match_count();
        assert!(count > 1);
        state.prev_match();
        assert_eq!(state.current_match_index(), count - 1);
        state.next_match();
        assert_eq!(state.current_match_index(), 0);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let state = search("");
        assert_eq!(state.match_count(), 0);
        assert!(state.current_match().is_none());
    }
}
