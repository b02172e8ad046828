//! User interface rendering.

pub mod formatters;
mod keymap_bar;
mod status_bar;
mod theme;

use crate::app::{App, Panel};
use crate::chat::ui::draw_chat;
use crate::content::ui::{draw_details, draw_tree};
use crate::visualizer::ui::draw_visualizer;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

pub use theme::ThemeColors;

/// Draw the UI.
pub fn draw(f: &mut Frame<'_>, app: &mut App) {
    let colors = ThemeColors::from_theme(&app.theme);
    f.render_widget(Block::default().style(Style::default().bg(colors.bg)), f.area());

    // Main layout with status bar and key map bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[0]);

    let browser_focused = app.focus == Panel::Browser;
    if app.browser.show_preview {
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(columns[0]);
        draw_tree(f, &mut app.browser, &app.search, left[0], &colors, browser_focused);
        draw_details(f, &app.browser, left[1], &colors);
    } else {
        draw_tree(f, &mut app.browser, &app.search, columns[0], &colors, browser_focused);
    }

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);
    draw_visualizer(
        f,
        right[0],
        &app.visualizer,
        &colors,
        app.focus == Panel::Visualizer,
    );
    draw_chat(f, right[1], &mut app.chat, &colors, app.focus == Panel::Chat);

    status_bar::draw_status(f, chunks[1], &app.status, &app.search, &colors);
    keymap_bar::draw_keymap(f, chunks[2], app.focus, app.search.is_active(), &colors);
}
