//! Terminal rendering
//!
//! Three-row layout: a status header with the current destination, a
//! scrolling message pane, and the single-line input prompt.

use ratatui::layout::{Constraint, Layout, Position};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{List, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::input::InputState;

/// Input prompt prefix.
pub const PROMPT: &str = ">>> ";

/// Message pane height for a terminal of `rows` rows (header and input
/// each take one).
pub fn pane_height(rows: u16) -> usize {
    rows.saturating_sub(2).max(1) as usize
}

/// Typeable input width for a terminal of `cols` columns.
pub fn input_width(cols: u16) -> usize {
    (cols as usize).saturating_sub(PROMPT.len() + 1).max(1)
}

pub fn render(frame: &mut Frame, app: &App, input: &InputState) {
    let [header_area, message_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let destination = match app.selected() {
        Some(c) => format!("To: {} <{}>", c.name, c.number),
        None => "To: (no destination - /send NAME)".to_string(),
    };
    let header = Paragraph::new(format!("{destination} | {} attached", app.attached()))
        .style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(header, header_area);

    let messages = List::new(app.lines().map(str::to_string));
    frame.render_widget(messages, message_area);

    let prompt = Paragraph::new(format!("{PROMPT}{}", input.buffer()));
    frame.render_widget(prompt, input_area);
    frame.set_cursor_position(Position::new(
        input_area.x + (PROMPT.len() + input.buffer().chars().count()) as u16,
        input_area.y,
    ));
}
