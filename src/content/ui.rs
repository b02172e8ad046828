//! Content tree and topic card rendering.

use super::latex::prettify;
use super::model::{Module, Topic};
use super::search::SearchState;
use super::{BrowserState, NodeId};
use crate::ui::ThemeColors;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Draw the tree panel.
pub fn draw_tree(
    f: &mut Frame<'_>,
    browser: &mut BrowserState,
    search: &SearchState,
    area: Rect,
    colors: &ThemeColors,
    focused: bool,
) {
    // Subtract 2 for borders
    let viewport_height = area.height.saturating_sub(2) as usize;
    browser.adjust_scroll(viewport_height);

    let cursor = browser.cursor();
    let items: Vec<ListItem<'_>> = browser
        .visible_items()
        .iter()
        .enumerate()
        .skip(browser.scroll_offset())
        .take(viewport_height)
        .map(|(idx, item)| {
            let indent = "  ".repeat(item.level);
            let icon = match item.id {
                NodeId::Module(_) if item.expanded => "▼ ",
                NodeId::Module(_) => "▶ ",
                NodeId::Topic(..) => "• ",
            };
            let title = browser.title(item.id);

            let line = if idx == cursor {
                Line::from(format!("{}{}{}", indent, icon, title)).style(
                    Style::default()
                        .fg(colors.cursor_fg)
                        .bg(colors.cursor_bg)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                let mut style = match item.id {
                    NodeId::Module(_) => Style::default()
                        .fg(colors.heading)
                        .add_modifier(Modifier::BOLD),
                    NodeId::Topic(..) => Style::default().fg(colors.text),
                };
                if search.is_match(item.id) {
                    style = style.fg(colors.yellow).add_modifier(Modifier::UNDERLINED);
                }
                Line::from(vec![
                    Span::raw(indent),
                    Span::styled(icon, Style::default().fg(colors.muted)),
                    Span::styled(title.to_string(), style),
                ])
            };

            ListItem::new(line)
        })
        .collect();

    let content = browser.content();
    let title = format!(
        " Calculus - {} modules, {} topics ",
        content.modules.len(),
        content.topic_count()
    );

    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused { colors.focus } else { colors.border }))
            .style(Style::default().bg(colors.bg)),
    );

    f.render_widget(list, area);
}

/// Draw the details pane for the node under the cursor.
pub fn draw_details(f: &mut Frame<'_>, browser: &BrowserState, area: Rect, colors: &ThemeColors) {
    let lines = match browser.current() {
        Some(NodeId::Topic(m, t)) => browser
            .content()
            .topic(m, t)
            .map(|topic| topic_lines(topic, colors))
            .unwrap_or_default(),
        Some(NodeId::Module(m)) => browser
            .content()
            .modules
            .get(m)
            .map(|module| module_lines(module, colors))
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Details ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .style(Style::default().bg(colors.bg)),
        )
        .wrap(Wrap { trim: false })
        .scroll((browser.preview_scroll, 0));

    f.render_widget(paragraph, area);
}

fn heading(text: &str, colors: &ThemeColors) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(colors.heading)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Lines describing a topic card.
pub fn topic_lines(topic: &Topic, colors: &ThemeColors) -> Vec<Line<'static>> {
    let mut lines = vec![
        heading(&topic.title, colors),
        Line::from(Span::styled("─".repeat(40), Style::default().fg(colors.border))),
    ];

    if let Some(explanation) = &topic.explanation {
        lines.push(Line::from(Span::styled(
            explanation.clone(),
            Style::default().fg(colors.text),
        )));
        lines.push(Line::from(""));
    }

    if !topic.formulas.is_empty() {
        lines.push(Line::from(Span::styled(
            "Formulas",
            Style::default().fg(colors.label).add_modifier(Modifier::BOLD),
        )));
        for formula in &topic.formulas {
            lines.push(Line::from(vec![
                Span::styled("  ", Style::default()),
                Span::styled(prettify(formula), Style::default().fg(colors.value)),
            ]));
        }
        lines.push(Line::from(""));
    }

    if !topic.concepts.is_empty() {
        lines.push(Line::from(Span::styled(
            "Key concepts",
            Style::default().fg(colors.label).add_modifier(Modifier::BOLD),
        )));
        for concept in &topic.concepts {
            lines.push(Line::from(vec![
                Span::styled("  • ", Style::default().fg(colors.muted)),
                Span::styled(concept.clone(), Style::default().fg(colors.text)),
            ]));
        }
    }

    lines
}

fn module_lines(module: &Module, colors: &ThemeColors) -> Vec<Line<'static>> {
    let mut lines = vec![
        heading(&module.title, colors),
        Line::from(Span::styled("─".repeat(40), Style::default().fg(colors.border))),
        Line::from(Span::styled(
            format!("{} topics", module.topics.len()),
            Style::default().fg(colors.muted),
        )),
        Line::from(""),
    ];
    for topic in &module.topics {
        lines.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(colors.muted)),
            Span::styled(topic.title.clone(), Style::default().fg(colors.text)),
            Span::styled(
                format!("  ({} formulas)", topic.formulas.len()),
                Style::default().fg(colors.muted),
            ),
        ]));
    }
    lines
}
