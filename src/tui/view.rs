use crate::shared::{DisplayState, Page};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Tabs};
use ratatui::Frame;

const HELP: &str = "Tab page  ↑↓ select  ←→ adjust  Enter toggle  Space start/stop  Esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // page tabs
            Constraint::Min(6),    // rows
            Constraint::Length(3), // input meter
            Constraint::Length(1), // status + help
        ])
        .split(area);

    draw_tabs(frame, sections[0], state);
    draw_rows(frame, sections[1], state);
    draw_meter(frame, sections[2], state);
    draw_status(frame, sections[3], state);
}

fn draw_tabs(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let titles: Vec<&str> = Page::ALL.iter().map(|p| p.title()).collect();
    let selected = Page::ALL.iter().position(|p| *p == state.page).unwrap_or(0);
    let (run_label, run_color) = if state.running {
        (" RUNNING ", Color::Green)
    } else {
        (" STOPPED ", Color::DarkGray)
    };
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" fluentty ")
                .title(Span::styled(run_label, Style::default().fg(run_color))),
        );
    frame.render_widget(tabs, area);
}

fn draw_rows(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let items: Vec<ListItem> = state
        .rows
        .iter()
        .enumerate()
        .map(|(i, (row, value))| {
            let selected = i == state.selected_row;
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::LightMagenta)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker}{:<20}", row.label()), style),
                Span::raw(value.clone()),
            ]))
        })
        .collect();

    let title = match state.page {
        Page::Daf if state.daf_active => " Delayed feedback (audible) ",
        Page::Daf => " Delayed feedback ",
        Page::Faf => " Frequency-altered feedback ",
        Page::Settings => " Settings ",
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn draw_meter(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let level = state.input_level.clamp(0.0, 1.0) as f64;
    let color = if level > 0.9 { Color::Red } else { Color::Magenta };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Mic level "))
        .gauge_style(Style::default().fg(color))
        .ratio(level);
    frame.render_widget(gauge, area);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let text = if state.status.is_empty() {
        HELP.to_string()
    } else {
        format!("{}  |  {HELP}", state.status)
    };
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(Color::DarkGray)), area);
}
