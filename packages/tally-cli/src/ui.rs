//! Rendering for the Tally TUI.
//!
//! Stateless: every frame is drawn from scratch out of the [`App`].

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use tally_core::View;

use crate::app::{App, EditTarget, InputMode};

/// Draws one frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    draw_header(frame, app, header);
    match app.session.view() {
        View::Overview => draw_overview(frame, app, body),
        View::Detail(_) => draw_detail(frame, app, body),
    }
    draw_footer(frame, app, footer);
}

// ── Header ──────────────────────────────────────────────────────────────────

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let identity = match app.session.address() {
        Some(address) => Span::styled(address.short(), Style::default().fg(Color::Green)),
        None => Span::styled("disconnected", Style::default().fg(Color::DarkGray)),
    };
    let line = Line::from(vec![
        Span::styled(" tally ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("· "),
        identity,
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

// ── Body ────────────────────────────────────────────────────────────────────

fn draw_overview(frame: &mut Frame, app: &App, area: Rect) {
    let lists = app.session.lists();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" lists ({}) ", lists.len()));

    if lists.is_empty() {
        let hint = if app.session.is_connected() {
            "no lists yet — press n to create one"
        } else {
            "press w to connect a wallet"
        };
        let para = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(para, area);
        return;
    }

    let rows: Vec<ListItem> = lists
        .iter()
        .map(|l| {
            let count = match l.item_count {
                1 => "1 item".to_string(),
                n => format!("{n} items"),
            };
            ListItem::new(Line::from(vec![
                Span::raw(l.name.clone()),
                Span::styled(format!("  {count}"), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let widget = List::new(rows)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.list_cursor.min(lists.len() - 1)));
    frame.render_stateful_widget(widget, area, &mut state);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let title = app
        .session
        .selected_list()
        .map(|l| format!(" {} ", l.name))
        .unwrap_or_else(|| " list ".to_string());
    let block = Block::default().borders(Borders::ALL).title(title);

    let items = app.session.items();
    if items.is_empty() {
        let para = Paragraph::new("empty — press a to add an item")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(para, area);
        return;
    }

    let rows: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, text)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{i:>3}  "), Style::default().fg(Color::DarkGray)),
                Span::raw(text.clone()),
            ]))
        })
        .collect();

    let widget = List::new(rows)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.item_cursor.min(items.len() - 1)));
    frame.render_stateful_widget(widget, area, &mut state);
}

// ── Footer ──────────────────────────────────────────────────────────────────

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    match app.mode {
        InputMode::Editing(target) => {
            let title = match target {
                EditTarget::NewList => " new list ",
                EditTarget::NewItem => " new item ",
            };
            let para = Paragraph::new(format!("{}█", app.input)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
            frame.render_widget(para, area);
        }
        InputMode::Normal => {
            let line = match &app.status {
                Some(status) => {
                    let color = if status.is_error { Color::Red } else { Color::Cyan };
                    Line::styled(status.message.clone(), Style::default().fg(color))
                }
                None => Line::styled(help_text(app), Style::default().fg(Color::DarkGray)),
            };
            let para = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
            frame.render_widget(para, area);
        }
    }
}

fn help_text(app: &App) -> &'static str {
    match app.session.view() {
        View::Overview if !app.session.is_connected() => "w connect · q quit",
        View::Overview => "n new · enter open · d delete · r refresh · q quit",
        View::Detail(_) => "a add · d remove · esc back · q quit",
    }
}
