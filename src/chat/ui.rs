//! Chat panel rendering.

use super::message::Role;
use super::{ChatEntry, ChatState, ConnectionStatus, NoticeLevel};
use crate::content::latex::prettify_inline_math;
use crate::ui::ThemeColors;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cursor appended to a reply while it streams.
const STREAM_CURSOR: &str = "▋";

/// Draw the chat panel.
pub fn draw_chat(
    f: &mut Frame<'_>,
    area: Rect,
    state: &mut ChatState,
    colors: &ThemeColors,
    focused: bool,
) {
    let (dot_color, detail) = match &state.status {
        ConnectionStatus::Connected => (
            colors.ok,
            state
                .selected_model
                .clone()
                .unwrap_or_else(|| "no model".to_string()),
        ),
        ConnectionStatus::Disconnected(_) => (colors.error, "offline".to_string()),
        ConnectionStatus::Checking | ConnectionStatus::Unknown => {
            (colors.warning, state.status.label().to_string())
        },
    };
    let title = Line::from(vec![
        Span::raw(" Tutor "),
        Span::styled("●", Style::default().fg(dot_color)),
        Span::raw(format!(" {} ", detail)),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { colors.focus } else { colors.border }))
        .style(Style::default().bg(colors.bg));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height < 3 || inner.width < 4 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    draw_messages(f, chunks[0], state, colors);
    draw_input(f, chunks[1], state, colors, focused);
    draw_notice(f, chunks[2], state, colors);
}

fn draw_messages(f: &mut Frame<'_>, area: Rect, state: &mut ChatState, colors: &ThemeColors) {
    let width = usize::from(area.width.max(1));
    let mut lines: Vec<Line<'static>> = Vec::new();

    if let ConnectionStatus::Disconnected(reason) = &state.status {
        for row in wrap_text(reason, width) {
            lines.push(Line::styled(row, Style::default().fg(colors.error)));
        }
        lines.push(Line::styled(
            "Start Ollama (`ollama serve`) and type /refresh",
            Style::default().fg(colors.muted),
        ));
        lines.push(Line::raw(""));
    }

    for entry in &state.entries {
        lines.extend(entry_lines(entry, width, colors));
        lines.push(Line::raw(""));
    }

    let height = usize::from(area.height);
    let max_scroll = lines.len().saturating_sub(height);
    state.set_scroll_limit(max_scroll);
    let start = max_scroll - state.scroll;
    let visible: Vec<Line<'_>> = lines.into_iter().skip(start).take(height).collect();

    f.render_widget(Paragraph::new(visible), area);
}

fn entry_lines(entry: &ChatEntry, width: usize, colors: &ThemeColors) -> Vec<Line<'static>> {
    let (label, label_color) = match entry.role {
        Role::User => ("You", colors.heading),
        Role::Assistant => ("Tutor", colors.label),
        Role::System => ("Info", colors.muted),
    };
    let text_style = if entry.failed {
        Style::default().fg(colors.error)
    } else if entry.role == Role::System {
        Style::default().fg(colors.muted)
    } else {
        Style::default().fg(colors.text)
    };

    let mut header = vec![Span::styled(
        label,
        Style::default().fg(label_color).add_modifier(Modifier::BOLD),
    )];
    if let Some(image) = &entry.image {
        header.push(Span::styled(
            format!("  [image: {}]", image),
            Style::default().fg(colors.purple),
        ));
    }

    let mut lines = vec![Line::from(header)];
    let text = match entry.role {
        Role::Assistant => prettify_inline_math(&entry.text),
        _ => entry.text.clone(),
    };
    let mut body = wrap_text(&text, width);
    if entry.streaming {
        match body.last_mut() {
            Some(last) if last.width() < width => last.push_str(STREAM_CURSOR),
            _ => body.push(STREAM_CURSOR.to_string()),
        }
    }
    lines.extend(body.into_iter().map(|row| Line::styled(row, text_style)));
    lines
}

fn draw_input(
    f: &mut Frame<'_>,
    area: Rect,
    state: &ChatState,
    colors: &ThemeColors,
    focused: bool,
) {
    let prompt = if state.is_busy() { "… " } else { "> " };
    let mut spans = vec![Span::styled(prompt, Style::default().fg(colors.heading))];

    if let Some(image) = &state.pending_image {
        spans.push(Span::styled(
            format!("[{}] ", image.file_name()),
            Style::default().fg(colors.purple),
        ));
    }

    let used: usize = spans.iter().map(|s| s.width()).sum();
    let room = usize::from(area.width).saturating_sub(used + 1);
    spans.push(Span::styled(
        tail_to_width(&state.input, room).to_string(),
        Style::default().fg(colors.text),
    ));
    if focused {
        spans.push(Span::styled(
            " ",
            Style::default().bg(colors.cursor_bg).fg(colors.cursor_fg),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notice(f: &mut Frame<'_>, area: Rect, state: &ChatState, colors: &ThemeColors) {
    let line = match &state.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => colors.muted,
                NoticeLevel::Warning => colors.warning,
                NoticeLevel::Error => colors.error,
            };
            Line::styled(notice.text.clone(), Style::default().fg(color))
        },
        None if state.is_busy() => Line::styled(
            "Streaming… Esc to cancel",
            Style::default().fg(colors.muted),
        ),
        None => Line::styled(
            "/models /model NAME /image PATH /clear /refresh",
            Style::default().fg(colors.muted),
        ),
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Word-wrap `text` to rows of at most `width` display columns.
///
/// Existing newlines are kept. Words wider than a row are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;

        for word in paragraph.split(' ') {
            let word_width = word.width();
            let gap = usize::from(!row.is_empty());

            if row_width + gap + word_width <= width {
                if gap == 1 {
                    row.push(' ');
                }
                row.push_str(word);
                row_width += gap + word_width;
                continue;
            }

            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }

            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if row_width + w > width && !row.is_empty() {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                row.push(c);
                row_width += w;
            }
        }
        rows.push(row);
    }
    rows
}

/// The longest suffix of `text` that fits in `width` columns.
fn tail_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, c) in text.char_indices().rev() {
        used += c.width().unwrap_or(0);
        if used > width {
            return &text[idx + c.len_utf8()..];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("the derivative of x squared", 10),
            vec!["the", "derivative", "of x", "squared"]
        );
    }

    #[test]
    fn long_words_are_split() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn newlines_and_wide_chars() {
        assert_eq!(wrap_text("a\n\nb", 5), vec!["a", "", "b"]);
        // CJK characters take two columns each.
        assert_eq!(wrap_text("微积分", 4), vec!["微积", "分"]);
    }

    #[test]
    fn input_tail_keeps_latest_text() {
        assert_eq!(tail_to_width("hello world", 5), "world");
        assert_eq!(tail_to_width("short", 10), "short");
    }
}
