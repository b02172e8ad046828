//! Visualizer panel - pure rendering layer.

use super::scene::{DrawCommand, Ink};
use super::VisualizerState;
use crate::ui::formatters::format_axis_label;
use crate::ui::ThemeColors;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

/// Braille dots per terminal cell, horizontally.
const DOTS_X: f64 = 2.0;
/// Braille dots per terminal cell, vertically.
const DOTS_Y: f64 = 4.0;

/// Draw the visualizer panel.
pub fn draw_visualizer(
    f: &mut Frame<'_>,
    area: Rect,
    state: &VisualizerState,
    colors: &ThemeColors,
    focused: bool,
) {
    let function = state.function();
    let title = if state.kind().uses_function() {
        format!(" Visualizer - {} | {} ", state.kind().name(), function.formula)
    } else {
        format!(" Visualizer - {} ", state.kind().name())
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { colors.focus } else { colors.border }))
        .style(Style::default().bg(colors.bg));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 4 || inner.height < 4 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);

    draw_canvas(f, chunks[0], state, colors);
    draw_controls(f, chunks[1], state, colors);
}

fn draw_canvas(f: &mut Frame<'_>, area: Rect, state: &VisualizerState, colors: &ThemeColors) {
    let width = f64::from(area.width) * DOTS_X;
    let height = f64::from(area.height) * DOTS_Y;
    let scene = state.scene(width, height);

    // Canvas y grows upwards, pixel rows grow downwards.
    let flip = |y: f64| height - y;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(colors.bg)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx: &mut Context<'_>| {
            let mut readout_row = 0.0;
            for cmd in &scene.commands {
                match cmd {
                    DrawCommand::Line { from, to, ink } => {
                        ctx.draw(&CanvasLine {
                            x1: from.x,
                            y1: flip(from.y),
                            x2: to.x,
                            y2: flip(to.y),
                            color: colors.ink(*ink),
                        });
                    },
                    DrawCommand::Polyline { points, ink } => {
                        let color = colors.ink(*ink);
                        for pair in points.windows(2) {
                            ctx.draw(&CanvasLine {
                                x1: pair[0].x,
                                y1: flip(pair[0].y),
                                x2: pair[1].x,
                                y2: flip(pair[1].y),
                                color,
                            });
                        }
                    },
                    DrawCommand::Marker { at, ink } => {
                        let color = colors.ink(*ink);
                        ctx.draw(&Circle {
                            x: at.x,
                            y: flip(at.y),
                            radius: 1.5,
                            color,
                        });
                        ctx.draw(&Points {
                            coords: &[(at.x, flip(at.y))],
                            color,
                        });
                    },
                    DrawCommand::Label { at, text, ink } => {
                        ctx.print(
                            at.x,
                            flip(at.y),
                            Line::styled(text.clone(), Style::default().fg(colors.ink(*ink))),
                        );
                    },
                    DrawCommand::Readout { text, ink } => {
                        // One terminal row per readout, top-left corner.
                        let y = height - DOTS_Y * (readout_row + 0.5);
                        ctx.print(
                            DOTS_X,
                            y,
                            Line::styled(
                                text.clone(),
                                Style::default()
                                    .fg(colors.ink(*ink))
                                    .add_modifier(Modifier::BOLD),
                            ),
                        );
                        readout_row += 1.0;
                    },
                }
            }
        });

    f.render_widget(canvas, area);
}

fn draw_controls(f: &mut Frame<'_>, area: Rect, state: &VisualizerState, colors: &ThemeColors) {
    let mut spans = Vec::new();
    let selected = state.selected_param();

    for &param in state.lesson.params() {
        let value = state.lesson.get(param).unwrap_or(f64::NAN);
        let style = if param == selected {
            Style::default()
                .fg(colors.cursor_fg)
                .bg(colors.cursor_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.value)
        };
        spans.push(Span::styled(format!(" {}={:.3} ", param.name(), value), style));
        spans.push(Span::raw(" "));
    }

    let clock = if state.clock.is_running() { "▶" } else { "⏸" };
    spans.push(Span::styled(
        format!("{} t={:.2}", clock, state.clock.time()),
        Style::default().fg(colors.label),
    ));

    let bounds = state.view.bounds();
    spans.push(Span::styled(
        format!(
            "  x∈[{}, {}] zoom {:.2}",
            format_axis_label(bounds.x_min),
            format_axis_label(bounds.x_max),
            state.view.zoom()
        ),
        Style::default().fg(colors.muted),
    ));

    if state.kind().uses_function() {
        spans.push(Span::styled(
            format!("  {}", state.function().derivative_formula),
            Style::default().fg(colors.ink(Ink::Derivative)),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
