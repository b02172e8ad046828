//! Content browser feature - modules and topic cards.
//!
//! The tree shows modules as collapsible groups of topic cards. The details
//! pane renders the card under the cursor.

pub mod latex;
pub mod model;
pub mod search;
pub mod ui;

use model::{Content, Topic};
use std::collections::HashSet;

/// Address of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// A module.
    Module(usize),
    /// A topic inside a module.
    Topic(usize, usize),
}

impl NodeId {
    /// The module this node belongs to.
    pub fn module(self) -> usize {
        match self {
            NodeId::Module(m) | NodeId::Topic(m, _) => m,
        }
    }
}

/// A single row in the tree view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeItem {
    /// Node address.
    pub id: NodeId,
    /// Nesting level.
    pub level: usize,
    /// Whether this node is expanded.
    pub expanded: bool,
}

/// Browser state - tree navigation plus details pane.
#[derive(Debug)]
pub struct BrowserState {
    content: Content,
    /// Visible rows in display order.
    items: Vec<TreeItem>,
    /// Cursor position (index into items).
    cursor: usize,
    /// Expanded module indices.
    expanded: HashSet<usize>,
    /// Scroll offset for the tree view.
    scroll_offset: usize,
    /// Show the details pane.
    pub show_preview: bool,
    /// Details pane scroll offset.
    pub preview_scroll: u16,
}

impl BrowserState {
    /// Create a browser over `content` with the first module open.
    pub fn new(content: Content) -> Self {
        let mut state = Self {
            content,
            items: Vec::new(),
            cursor: 0,
            expanded: HashSet::new(),
            scroll_offset: 0,
            show_preview: true,
            preview_scroll: 0,
        };
        state.expanded.insert(0);
        state.rebuild_visible_items();
        state
    }

    /// The content being browsed.
    pub fn content(&self) -> &Content {
        &self.content
    }

    fn rebuild_visible_items(&mut self) {
        let current = self.current();
        self.items.clear();
        for (m, module) in self.content.modules.iter().enumerate() {
            let expanded = self.expanded.contains(&m);
            self.items.push(TreeItem {
                id: NodeId::Module(m),
                level: 0,
                expanded,
            });
            if expanded {
                self.items.extend((0..module.topics.len()).map(|t| TreeItem {
                    id: NodeId::Topic(m, t),
                    level: 1,
                    expanded: false,
                }));
            }
        }
        if let Some(id) = current {
            self.goto_node(id);
        }
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
    }

    /// Move the cursor up one position.
    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.preview_scroll = 0;
        }
    }

    /// Move the cursor down one position.
    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
            self.preview_scroll = 0;
        }
    }

    /// Move the cursor by a page.
    pub fn page(&mut self, down: bool, rows: usize) {
        for _ in 0..rows {
            if down {
                self.cursor_down();
            } else {
                self.cursor_up();
            }
        }
    }

    /// Adjust scroll to keep cursor visible.
    pub fn adjust_scroll(&mut self, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }

        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        }

        if self.cursor >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor.saturating_sub(viewport_height - 1);
        }
    }

    /// Get the current scroll offset.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Expand the module under the cursor.
    pub fn expand_current(&mut self) {
        if let Some(NodeId::Module(m)) = self.current() {
            if self.expanded.insert(m) {
                self.rebuild_visible_items();
            }
        }
    }

    /// Collapse the module under the cursor, or the module of the topic under it.
    pub fn collapse_current(&mut self) {
        let Some(id) = self.current() else {
            return;
        };
        let m = id.module();
        if self.expanded.remove(&m) {
            self.rebuild_visible_items();
            self.goto_node(NodeId::Module(m));
        }
    }

    /// Expand or collapse the module under the cursor.
    pub fn toggle_current(&mut self) {
        match self.current() {
            Some(NodeId::Module(m)) if self.expanded.contains(&m) => self.collapse_current(),
            Some(NodeId::Module(_)) => self.expand_current(),
            _ => {},
        }
    }

    /// Make a node visible by opening its module.
    pub fn reveal(&mut self, id: NodeId) {
        if self.expanded.insert(id.module()) {
            self.rebuild_visible_items();
        }
        self.goto_node(id);
    }

    /// Go to the first item.
    pub fn goto_first(&mut self) {
        self.cursor = 0;
        self.preview_scroll = 0;
    }

    /// Go to the last visible item.
    pub fn goto_last(&mut self) {
        if !self.items.is_empty() {
            self.cursor = self.items.len() - 1;
            self.preview_scroll = 0;
        }
    }

    /// Get all currently visible items in the tree.
    pub fn visible_items(&self) -> &[TreeItem] {
        &self.items
    }

    /// Get the current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Node under the cursor.
    pub fn current(&self) -> Option<NodeId> {
        self.items.get(self.cursor).map(|item| item.id)
    }

    /// Topic under the cursor, if the cursor is on a topic.
    pub fn current_topic(&self) -> Option<&Topic> {
        match self.current()? {
            NodeId::Topic(m, t) => self.content.topic(m, t),
            NodeId::Module(_) => None,
        }
    }

    /// Display title of a node.
    pub fn title(&self, id: NodeId) -> &str {
        match id {
            NodeId::Module(m) => self
                .content
                .modules
                .get(m)
                .map(|module| module.title.as_str())
                .unwrap_or_default(),
            NodeId::Topic(m, t) => self
                .content
                .topic(m, t)
                .map(|topic| topic.title.as_str())
                .unwrap_or_default(),
        }
    }

    /// Move the cursor to a visible node.
    pub fn goto_node(&mut self, target: NodeId) {
        if let Some(i) = self.items.iter().position(|item| item.id == target) {
            if i != self.cursor {
                self.preview_scroll = 0;
            }
            self.cursor = i;
        }
    }

    /// Expand every module.
    pub fn expand_all(&mut self) {
        self.expanded.extend(0..self.content.modules.len());
        self.rebuild_visible_items();
    }

    /// Collapse every module.
    pub fn collapse_all(&mut self) {
        let m = self.current().map(NodeId::module).unwrap_or(0);
        self.expanded.clear();
        self.rebuild_visible_items();
        self.goto_node(NodeId::Module(m));
    }

    /// Toggle the details pane.
    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    /// Scroll details down.
    pub fn scroll_down(&mut self) {
        self.preview_scroll = self.preview_scroll.saturating_add(5);
    }

    /// Scroll details up.
    pub fn scroll_up(&mut self) {
        self.preview_scroll = self.preview_scroll.saturating_sub(5);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser() -> BrowserState {
        let json = r#"{"modules":[
            {"title":"Limits","topics":[{"title":"One"},{"title":"Two"}]},
            {"title":"Derivatives","topics":[{"title":"Power rule"}]}
        ]}"#;
        BrowserState::new(Content::from_json(json).unwrap())
    }

    #[test]
    fn first_module_starts_open() {
        let b = browser();
        let ids: Vec<NodeId> = b.visible_items().iter().map(|i| i.id).collect();
        assert_eq!(
            ids,
            vec![
                NodeId::Module(0),
                NodeId::Topic(0, 0),
                NodeId::Topic(0, 1),
                NodeId::Module(1)
            ]
        );
    }

    #[test]
    fn collapse_from_topic_moves_to_module() {
        let mut b = browser();
        b.cursor_down();
        b.cursor_down();
        assert_eq!(b.current_topic().unwrap().title, "Two");
        b.collapse_current();
        assert_eq!(b.current(), Some(NodeId::Module(0)));
        assert_eq!(b.visible_items().len(), 2);
    }

    #[test]
    fn expand_keeps_cursor_on_node() {
        let mut b = browser();
        b.goto_last();
        assert_eq!(b.current(), Some(NodeId::Module(1)));
        b.expand_current();
        assert_eq!(b.current(), Some(NodeId::Module(1)));
        b.cursor_down();
        assert_eq!(b.title(b.current().unwrap()), "Power rule");
    }

    #[test]
    fn reveal_opens_module() {
        let mut b = browser();
        b.collapse_all();
        assert_eq!(b.visible_items().len(), 2);
        b.reveal(NodeId::Topic(1, 0));
        assert_eq!(b.current(), Some(NodeId::Topic(1, 0)));
    }

    #[test]
    fn cursor_stops_at_edges() {
        let mut b = browser();
        b.cursor_up();
        assert_eq!(b.cursor(), 0);
        b.page(true, 50);
        assert_eq!(b.cursor(), 3);
    }
}
