//! Drawing the session.

use super::app::{App, Focus};
use crate::state::{QueryPhase, VerseModal};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const ACCENT: Color = Color::Rgb(118, 75, 162);
const TITLE: &str = "Ask Maggie Bible Questions";
const TAGLINE: &str = "Answers are based on the New Testament covenant of Grace and God's Love \
                       as taught by Tim Keller, Andrew Farley, and others.";
const PLACEHOLDER: &str = "Ask your biblical question here...";

pub fn draw(frame: &mut Frame, app: &App) {
    let [header, back, input, status, body] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(frame.area());

    draw_header(frame, header);
    draw_back(frame, app, back);
    draw_input(frame, app, input);
    draw_status(frame, app, status);
    draw_body(frame, app, body);

    if app.state.is_modal_open() {
        draw_modal(frame, app);
    }
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            format!("🐾 {}", TITLE),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(TAGLINE, Style::default().fg(Color::Gray))),
    ]);
    frame.render_widget(Paragraph::new(text).centered(), area);
}

fn draw_back(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled("← Ctrl+R ", Style::default().fg(Color::Cyan)),
        Span::raw("Return to previous page "),
        Span::styled(format!("({})", app.return_url), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Input && !app.state.is_modal_open();
    let border = if focused { ACCENT } else { Color::DarkGray };

    let block = Block::default()
        .title(" Question ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    // Nothing fits when the border eats the whole width
    if inner_area.width == 0 || inner_area.height == 0 {
        return;
    }

    let input_width = inner_area.width as usize;
    let value = app.input.value();
    let cursor_pos = app.input.visual_cursor();

    // Scroll the input if cursor is beyond visible area
    let scroll = (cursor_pos + 1).saturating_sub(input_width);

    let line = if value.is_empty() {
        Line::from(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let visible_value: String = value.chars().skip(scroll).take(input_width).collect();
        Line::from(Span::styled(visible_value, Style::default().fg(Color::White)))
    };
    frame.render_widget(Paragraph::new(line), inner_area);

    if focused {
        let cursor_x = inner_area.x + cursor_pos.saturating_sub(scroll) as u16;
        frame.set_cursor_position((cursor_x, inner_area.y));
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(notice) = &app.notice {
        Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Yellow)))
    } else if app.state.is_loading() {
        thinking_line(app.tick)
    } else if app.state.is_verse_pending() {
        Line::from(Span::styled(
            "Looking up verse...",
            Style::default().fg(Color::Cyan),
        ))
    } else {
        Line::from(Span::styled(
            "Enter ask/open · Tab switch focus · ↑↓ select · PgUp/PgDn scroll · Esc quit",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// "Maggie is thinking..." with paw prints walking across.
fn thinking_line(tick: usize) -> Line<'static> {
    let dots = ".".repeat(tick % 4);
    let mut paws = String::new();
    for step in 0..4 {
        paws.push_str(if step <= tick % 4 { "🐾 " } else { "   " });
    }
    Line::from(vec![
        Span::styled(
            format!("Maggie is thinking{:<3} ", dots),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(paws),
    ])
}

fn draw_body(frame: &mut Frame, app: &App, area: Rect) {
    let answer = match app.state.phase() {
        QueryPhase::Idle | QueryPhase::Loading => return,
        QueryPhase::Failed(error) => {
            let block = Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red));
            let paragraph = Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }
        QueryPhase::Answered(answer) => answer,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let title = app
        .state
        .asked()
        .map(|q| format!(" {} ", q))
        .unwrap_or_default();
    let answer_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(answer.text.as_str())
        .wrap(Wrap { trim: false })
        .scroll((app.answer_scroll, 0))
        .block(answer_block);
    frame.render_widget(paragraph, chunks[0]);

    let items: Vec<ListItem> = answer
        .references
        .iter()
        .map(|reference| {
            let mut lines = vec![Line::from(vec![
                Span::raw(format!("{} ", reference.kind.icon())),
                Span::styled(
                    reference.title.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", reference.kind.label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])];
            if let Some(description) = &reference.description {
                lines.push(Line::from(Span::styled(
                    format!("   {}", description),
                    Style::default().fg(Color::Gray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let focused = app.focus == Focus::References;
    let list = List::new(items)
        .block(
            Block::default()
                .title(" References & Resources ")
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused { ACCENT } else { Color::DarkGray })),
        )
        .highlight_style(if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        })
        .highlight_symbol("› ");

    let mut list_state = ListState::default().with_selected(app.state.selected());
    frame.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn draw_modal(frame: &mut Frame, app: &App) {
    let (title, body, style) = match app.state.modal() {
        VerseModal::Open(verse) => (verse.title.as_str(), verse.content.as_str(), Style::default()),
        VerseModal::Failed { title, message } => {
            (title.as_str(), message.as_str(), Style::default().fg(Color::Red))
        }
        VerseModal::Closed => return,
    };

    let size = frame.area();
    let popup_width = size.width.saturating_sub(4).min(80);
    let popup_height = size.height.saturating_sub(4).min(20);
    let popup_area = centered_rect(popup_width, popup_height, size);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .title_bottom(Line::from(" Esc close ").right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    let paragraph = Paragraph::new(body)
        .style(style)
        .wrap(Wrap { trim: false })
        .scroll((app.modal_scroll, 0))
        .block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
