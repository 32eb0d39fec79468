//! Screen composition: header, chat panel and launcher.

use chatwidget_engine::ChatTransport;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

use crate::app::App;
use crate::widgets::{ChatPanel, Launcher};

/// Preferred panel width.
const PANEL_WIDTH: u16 = 64;

/// Preferred panel height.
const PANEL_HEIGHT: u16 = 22;

const TITLE: &str = " Análisis de denuncias ";

/// Where the open panel sits: bottom-right, just above the launcher.
pub fn panel_area(screen: Rect, launcher: Rect) -> Rect {
    let width = PANEL_WIDTH.min(screen.width);
    let bottom = launcher.y;
    let height = PANEL_HEIGHT.min(bottom.saturating_sub(screen.y));
    Rect::new(
        screen.right().saturating_sub(width),
        bottom.saturating_sub(height),
        width,
        height,
    )
}

/// Render the whole screen for the current app state.
pub fn render<T: ChatTransport>(app: &App<T>, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    Block::default()
        .style(Style::default().bg(theme.base))
        .render(area, buf);

    if area.height == 0 {
        return;
    }

    let mut header = vec![
        Span::styled(
            TITLE,
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.endpoint().to_string(), Style::default().fg(theme.muted)),
    ];
    if let Some(status) = &app.status {
        header.push(Span::raw("  "));
        header.push(Span::styled(status.clone(), Style::default().fg(theme.info)));
    }
    Paragraph::new(Line::from(header)).render(Rect::new(area.x, area.y, area.width, 1), buf);

    let launcher = Launcher::new(app.is_open(), theme);
    let launcher_area = launcher.area(area);

    let view = app.view();
    if view.is_displayed() && view.is_active() {
        let body = Rect::new(area.x, area.y + 1, area.width, area.height - 1);
        let panel = panel_area(body, launcher_area);
        if panel.height > 0 {
            Clear.render(panel, buf);
            ChatPanel::new(view, theme).render(panel, buf);
        }
    }

    launcher.render(launcher_area, buf);
}
