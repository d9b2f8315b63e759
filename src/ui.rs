//! Terminal user interface with ratatui.

use crate::api::AssetSource;
use crate::app::{App, Focus};
use crate::config::ColorConfig;
use crate::models::Theme;
use crate::render::{Card, CardDeck, EMPTY_MESSAGE, Tone};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const CARD_WIDTH: u16 = 28;
const CARD_HEIGHT: u16 = 6;

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub bar_bg: Color,
    pub gain: Color,
    pub loss: Color,
}

impl Palette {
    pub fn new(theme: Theme, colors: &ColorConfig) -> Self {
        match theme {
            Theme::Light => Self {
                bg: Color::Rgb(248, 249, 250),
                fg: Color::Rgb(33, 37, 41),
                muted: Color::Rgb(108, 117, 125),
                border: Color::Rgb(206, 212, 218),
                accent: Color::Rgb(13, 110, 253),
                bar_bg: Color::Rgb(233, 236, 239),
                gain: colors.gain_color(),
                loss: colors.loss_color(),
            },
            Theme::Dark => Self {
                bg: Color::Rgb(18, 18, 18),
                fg: Color::Rgb(230, 230, 230),
                muted: Color::Rgb(140, 140, 140),
                border: Color::Rgb(60, 60, 60),
                accent: Color::Rgb(102, 178, 255),
                bar_bg: Color::Rgb(36, 36, 36),
                gain: colors.gain_color(),
                loss: colors.loss_color(),
            },
        }
    }

    fn tone(&self, tone: Tone) -> Color {
        match tone {
            Tone::Gain => self.gain,
            Tone::Loss => self.loss,
        }
    }
}

/// Render the main UI.
///
/// Returns the largest useful scroll offset (in card rows) for the current size.
pub fn render<S: AssetSource>(frame: &mut Frame, app: &App<S, CardDeck>, colors: &ColorConfig) -> usize {
    let palette = Palette::new(app.current_theme(), colors);

    // Whole-screen theme background
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        frame.area(),
    );

    let banner_height = if app.error.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),             // Header
            Constraint::Length(3),             // Controls
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(CARD_HEIGHT),      // Card grid
            Constraint::Length(1),             // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0], &palette);
    render_controls(frame, app, chunks[1], &palette);

    if let Some(ref error) = app.error {
        render_error_banner(frame, error, chunks[2], &palette);
    }

    let mut max_scroll = 0;
    if app.loading {
        render_centered_message(frame, "Loading market data...", chunks[3], palette.accent);
    } else if app.renderer.has_rendered() && app.renderer.is_empty() {
        render_centered_message(frame, EMPTY_MESSAGE, chunks[3], palette.muted);
    } else {
        max_scroll = render_grid(frame, app.renderer.cards(), app.scroll, chunks[3], &palette);
    }

    render_footer(frame, chunks[4], &palette);

    if app.show_help {
        render_help_overlay(frame, &palette);
    }

    max_scroll
}

/// Render the header with summary information.
fn render_header<S: AssetSource>(frame: &mut Frame, app: &App<S, CardDeck>, area: Rect, palette: &Palette) {
    let header = Line::from(vec![
        Span::styled(
            "COINDECK ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "- {} of {} assets  ",
            app.display.len(),
            app.assets.len()
        )),
        Span::styled(
            format!("Updated: {}", app.time_since_refresh()),
            Style::default().fg(palette.muted),
        ),
    ]);

    let widget = Paragraph::new(header).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border)),
    );

    frame.render_widget(widget, area);
}

/// Render the price inputs and the clear/sort/theme controls.
fn render_controls<S: AssetSource>(frame: &mut Frame, app: &App<S, CardDeck>, area: Rect, palette: &Palette) {
    let input = |label: &str, text: &str, focused: bool| -> Vec<Span<'static>> {
        let cursor = if focused { "▏" } else { "" };
        let style = if focused {
            Style::default()
                .fg(palette.accent)
                .bg(palette.bar_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.fg).bg(palette.bar_bg)
        };
        vec![
            Span::styled(format!("{} $", label), Style::default().fg(palette.muted)),
            Span::styled(format!(" {:<10}", format!("{}{}", text, cursor)), style),
            Span::raw("  "),
        ]
    };

    let key = |k: &'static str| Span::styled(k, Style::default().fg(palette.accent));

    let mut spans = input("Min", &app.min_input, app.focus == Focus::Min);
    spans.extend(input("Max", &app.max_input, app.focus == Focus::Max));
    spans.extend([
        key("[c]"),
        Span::raw(" Clear  "),
        key("[s]"),
        Span::raw(format!(" {}  ", app.sort_label())),
        key("[t]"),
        Span::raw(format!(" {}", app.theme.icon())),
    ]);

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );

    frame.render_widget(widget, area);
}

/// Render the fetch error banner.
fn render_error_banner(frame: &mut Frame, error: &str, area: Rect, palette: &Palette) {
    let widget = Paragraph::new(error)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.loss)),
        )
        .style(Style::default().fg(palette.loss))
        .wrap(Wrap { trim: true });

    frame.render_widget(widget, area);
}

fn render_centered_message(frame: &mut Frame, message: &str, area: Rect, color: Color) {
    let top = area.height.saturating_sub(1) / 2;
    let line_area = Rect {
        y: area.y + top,
        height: area.height.min(1),
        ..area
    };

    let widget = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color));

    frame.render_widget(widget, line_area);
}

/// Lay cards out left-to-right, top-to-bottom, starting at row `scroll`.
///
/// Returns the last row that can usefully be scrolled to.
fn render_grid(frame: &mut Frame, cards: &[Card], scroll: usize, area: Rect, palette: &Palette) -> usize {
    let columns = grid_columns(area.width);
    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let max_scroll = total_rows(cards.len(), columns).saturating_sub(visible_rows);
    let first_row = scroll.min(max_scroll);

    for (i, card) in cards.iter().enumerate().skip(first_row * columns) {
        let row = i / columns - first_row;
        if row >= visible_rows {
            break;
        }
        let col = i % columns;
        let card_area = Rect {
            x: area.x + col as u16 * CARD_WIDTH,
            y: area.y + row as u16 * CARD_HEIGHT,
            width: CARD_WIDTH.min(area.width),
            height: CARD_HEIGHT.min(area.height),
        };
        render_card(frame, card, card_area, palette);
    }

    max_scroll
}

fn grid_columns(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

fn total_rows(cards: usize, columns: usize) -> usize {
    cards.div_ceil(columns)
}

fn render_card(frame: &mut Frame, card: &Card, area: Rect, palette: &Palette) {
    let inner_width = usize::from(area.width.saturating_sub(4));
    let change_color = palette.tone(card.tone);

    let lines = vec![
        Line::from(Span::styled(
            truncate_string(&card.name, inner_width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(card.symbol.clone(), Style::default().fg(palette.muted))),
        Line::from(card.price.clone()),
        Line::from(Span::styled(card.change.clone(), Style::default().fg(change_color))),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(
                format!(" {} ", card.badge()),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );

    frame.render_widget(widget, area);
}

/// Render the footer with keybindings.
fn render_footer(frame: &mut Frame, area: Rect, palette: &Palette) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(palette.accent));

    let footer = Line::from(vec![
        key(" q"),
        Span::raw(":quit "),
        key("h"),
        Span::raw(":help "),
        key("Tab"),
        Span::raw(":edit price "),
        key("s"),
        Span::raw(":sort "),
        key("c"),
        Span::raw(":clear "),
        key("t"),
        Span::raw(":theme "),
        key("r"),
        Span::raw(":refresh"),
    ]);

    let widget = Paragraph::new(footer).style(Style::default().bg(palette.bar_bg).fg(palette.fg));

    frame.render_widget(widget, area);
}

/// Render help overlay.
fn render_help_overlay(frame: &mut Frame, palette: &Palette) {
    let area = centered_rect(60, 70, frame.area());

    let help_text = vec![
        Line::from(Span::styled(
            "COINDECK HELP",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Filtering:"),
        Line::from("  Tab       Focus min / max price"),
        Line::from("  Enter/Esc Leave price input"),
        Line::from("  c         Clear filters and sort"),
        Line::from(""),
        Line::from("Sorting:"),
        Line::from("  s         Default → High to Low → Low to High"),
        Line::from(""),
        Line::from("Display:"),
        Line::from("  ↑/k ↓/j   Scroll cards"),
        Line::from("  t         Toggle light/dark theme"),
        Line::from(""),
        Line::from("Actions:"),
        Line::from("  r         Fetch prices again"),
        Line::from("  q/Esc     Quit"),
        Line::from("  h/?       Toggle help"),
        Line::from(""),
        Line::from("Press any key to close"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        )
        .style(Style::default().bg(palette.bg).fg(palette.fg))
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Truncate string to max length (in characters).
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
