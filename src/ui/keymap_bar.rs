//! Keymap help bar UI component.

use crate::app::Panel;
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the keymap help bar.
pub(super) fn draw_keymap(
    f: &mut Frame<'_>,
    area: Rect,
    focus: Panel,
    search_active: bool,
    colors: &ThemeColors,
) {
    let keymap_text = if search_active {
        "Enter:search | Esc:cancel | Type to search"
    } else {
        match focus {
            Panel::Browser => {
                "Tab:panel | q:quit | jk:nav | hl:fold | /:search | n/N:next/prev | t:details | a:ask | y/c:copy | T:theme"
            },
            Panel::Visualizer => {
                "Tab:panel | m/1-5:lesson | f:function | p:param | [ ]:adjust | Space:play | r:reset | hjkl:pan | +-:zoom | 0:recenter"
            },
            Panel::Chat => {
                "Tab:panel | Enter:send | Esc:cancel | PgUp/PgDn:scroll | /models /model /image /clear /refresh | Ctrl-C:quit"
            },
        }
    };

    let paragraph =
        Paragraph::new(keymap_text).style(Style::default().fg(colors.muted).bg(colors.bg));

    f.render_widget(paragraph, area);
}
