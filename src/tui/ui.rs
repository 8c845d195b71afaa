use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use crate::countdown::CountdownState;
use crate::storage::Storage;
use crate::view::PriorityClass;
use super::app::{AddStep, App, InputMode};

pub fn ui<S: Storage>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filters
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let filters = Paragraph::new(Line::from(vec![
        Span::styled("Status: ", label),
        Span::raw(app.filters.status.to_string()),
        Span::raw("   "),
        Span::styled("Category: ", label),
        Span::raw(app.filters.category.to_string()),
        Span::raw(format!(" ({})", app.view.category_options.join(", "))),
        Span::raw("   "),
        Span::styled("Date: ", label),
        Span::raw(app.filters.date.to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Filters"));
    f.render_widget(filters, chunks[0]);

    let rows: Vec<Row> = app
        .view
        .items
        .iter()
        .map(|t| {
            let name_style = match t.priority {
                PriorityClass::High => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                PriorityClass::Medium => Style::default().fg(Color::Yellow),
                PriorityClass::Plain => Style::default(),
            };
            let timer_style = match app.countdowns.state(t.id) {
                Some(CountdownState::Expired) | Some(CountdownState::Invalid) => Style::default().fg(Color::Red),
                Some(CountdownState::Done) => Style::default().fg(Color::Green),
                _ => Style::default(),
            };
            let row_style = if t.completed {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(if t.completed { "[x]" } else { "[ ]" }),
                Cell::from(t.name.clone()).style(name_style),
                Cell::from(t.description.clone()),
                Cell::from(t.deadline.clone()),
                Cell::from(app.countdowns.label(t.id)).style(timer_style),
            ]).style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Min(20),
        Constraint::Length(17),
        Constraint::Length(18),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Name", "Description", "Deadline", "Time Left"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("Taskdue - Tasks"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);

    let help_text = match (&app.message, &app.input_mode) {
        (Some(msg), _) => msg.as_str(),
        (None, InputMode::Normal) => "q: Quit | a: Add | Space: Toggle Done | d: Del | s: Status | c: Category | f: Date | j/k: Move",
        (None, InputMode::Adding) => "Enter: Next Step | Esc: Cancel",
    };
    let help_style = if app.message.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };

    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let title = match app.add_state.step {
            AddStep::Name => "Add Task: Enter Name",
            AddStep::Description => "Add Task: Enter Description (Optional)",
            AddStep::Deadline => "Add Task: Enter Deadline (YYYY-MM-DD HH:MM)",
            AddStep::Priority => "Add Task: Enter Priority (none/medium/high)",
        };

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(input, area);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
