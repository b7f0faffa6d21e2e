// tui.rs

use crate::app::{App, InputMode, Tab};
use crate::todo::{DraftField, today};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use std::{io, time::Duration};

const CARET: &str = "|";

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()>
where
    std::io::Error: From<<B as Backend>::Error>,
{
    app.load_all();

    loop {
        // fold in whatever requests finished since the last frame
        app.drain_inbound();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}

/// Applies one key press. Returns true when the user asked to quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    if app.alert.is_some() {
        app.alert = None;
        return false;
    }

    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('a') => {
                app.input_mode = InputMode::EditingDraft(DraftField::Name);
            }
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Enter => app.open_detail(),
            KeyCode::Esc => app.clear_selection(),
            KeyCode::Tab => app.toggle_tab(),
            KeyCode::Char('1') => app.switch_tab(Tab::All),
            KeyCode::Char('2') => app.switch_tab(Tab::ByDay),
            KeyCode::Char('d') => {
                app.input_day = app.filter_day.clone().unwrap_or_else(|| today().to_string());
                app.input_mode = InputMode::EditingDay;
            }
            KeyCode::Char('r') => app.reload(),
            _ => {}
        },
        InputMode::EditingDraft(field) => match key.code {
            KeyCode::Esc => app.input_mode = InputMode::Normal,
            KeyCode::Enter => match app.submit_new() {
                Ok(()) => app.input_mode = InputMode::Normal,
                Err(e) => app.alert = Some(e.to_string()),
            },
            KeyCode::Tab | KeyCode::Down => {
                app.input_mode = InputMode::EditingDraft(field.next());
            }
            KeyCode::BackTab | KeyCode::Up => {
                app.input_mode = InputMode::EditingDraft(field.prev());
            }
            KeyCode::Char(' ') if field == DraftField::Complete => {
                app.draft.complete = !app.draft.complete;
            }
            KeyCode::Char(c) => {
                if let Some(text) = app.draft.text_mut(field) {
                    text.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = app.draft.text_mut(field) {
                    text.pop();
                }
            }
            _ => {}
        },
        InputMode::EditingDay => match key.code {
            KeyCode::Enter => {
                let day = std::mem::take(&mut app.input_day);
                app.set_filter_day(&day);
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                app.input_day.clear();
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Char(c) => app.input_day.push(c),
            KeyCode::Backspace => {
                app.input_day.pop();
            }
            _ => {}
        },
        InputMode::ViewingItem => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_detail(),
            _ => {}
        },
    }
    false
}

fn with_caret(text: &str, active: bool) -> String {
    if active { format!("{}{}", text, CARET) } else { text.to_string() }
}

pub fn ui(f: &mut Frame<'_>, app: &App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tabs
            Constraint::Min(3),    // todos
            Constraint::Length(6), // new todo form
            Constraint::Length(1), // status / error banner
            Constraint::Length(1), // key help
        ])
        .split(size);

    render_tabs(f, app, chunks[0]);
    render_todos(f, app, chunks[1]);
    render_form(f, app, chunks[2]);

    if let Some(ref msg) = app.error_message {
        let error = Paragraph::new(msg.as_str())
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(error, chunks[3]);
    } else if app.is_loading() {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(loading, chunks[3]);
    }

    let help = match app.input_mode {
        InputMode::Normal => "q quit  a add  j/k select  Enter open  Esc clear  Tab switch  d day  r reload",
        InputMode::EditingDraft(_) => "Tab next field  Space toggle  Enter submit  Esc back",
        InputMode::EditingDay => "Enter show day  Esc cancel",
        InputMode::ViewingItem => "Esc close",
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );

    match app.input_mode {
        InputMode::ViewingItem => render_detail(f, app, size),
        InputMode::EditingDay => render_day_prompt(f, app, size),
        _ => {}
    }

    if let Some(ref msg) = app.alert {
        render_alert(f, msg, size);
    }
}

fn render_tabs(f: &mut Frame<'_>, app: &App, area: Rect) {
    let day_title = match app.filter_day {
        Some(ref day) => format!("By day: {}", day),
        None => "By day".to_string(),
    };
    let selected = match app.tab {
        Tab::All => 0,
        Tab::ByDay => 1,
    };
    let title = if app.is_loading() { "Todo List (loading)" } else { "Todo List" };
    let tabs = Tabs::new(vec!["All".to_string(), day_title])
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn render_todos(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Todos");
    let visible = app.visible();

    if visible.is_empty() {
        let msg = if app.tab == Tab::ByDay && app.filter_day.is_none() {
            "No day chosen. Press d to pick one."
        } else {
            "No items found"
        };
        let empty = Paragraph::new(msg)
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|t| {
            let (status, color) = if t.complete {
                ("[x]", Color::Green)
            } else {
                ("[ ]", Color::Yellow)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {}", status, t.name), Style::default().fg(color)),
                Span::styled(format!("  ({})", t.day), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let mut state = ListState::default().with_selected(app.selected_index());
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, area, &mut state);
}

fn render_form(f: &mut Frame<'_>, app: &App, area: Rect) {
    let focused = match app.input_mode {
        InputMode::EditingDraft(field) => Some(field),
        _ => None,
    };
    let lines: Vec<Line> = DraftField::ALL
        .iter()
        .map(|&field| {
            let active = focused == Some(field);
            let value = match field {
                DraftField::Name => with_caret(&app.draft.name, active),
                DraftField::Description => with_caret(&app.draft.description, active),
                DraftField::Day => with_caret(&app.draft.day, active),
                DraftField::Complete => (if app.draft.complete { "[x]" } else { "[ ]" }).to_string(),
            };
            let style = if active {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:<12}", format!("{}:", field.label())), style),
                Span::styled(value, style),
            ])
        })
        .collect();
    let title = match (focused, app.draft.is_empty()) {
        (Some(_), _) => "New Todo (editing)",
        (None, true) => "New Todo (press a)",
        (None, false) => "New Todo (unsent draft, press a)",
    };
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(form, area);
}

fn render_detail(f: &mut Frame<'_>, app: &App, size: Rect) {
    let Some(todo) = app.selected_item() else {
        return;
    };
    let area = centered_rect(60, 50, size);
    let lines = vec![
        Line::from(Span::styled(
            todo.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Day: {}", todo.day)),
        Line::from(format!("Complete: {}", if todo.complete { "yes" } else { "no" })),
        Line::from(Span::styled(format!("Id: {}", todo.id), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(todo.description.clone()),
    ];
    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Todo"))
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(detail, area);
}

fn render_day_prompt(f: &mut Frame<'_>, app: &App, size: Rect) {
    let area = centered_rect(50, 20, size);
    let prompt = Paragraph::new(with_caret(&app.input_day, true))
        .block(Block::default().borders(Borders::ALL).title("Show day"))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(Clear, area);
    f.render_widget(prompt, area);
}

fn render_alert(f: &mut Frame<'_>, msg: &str, size: Rect) {
    let area = centered_rect(50, 25, size);
    let alert = Paragraph::new(vec![
        Line::from(Span::styled(
            msg.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Press any key"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Alert"))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(alert, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let rows = Layout::default()
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
        .split(rows[1])[1]
}
