use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Mode};
use crate::notepad::TAB_DISPLAY_COLS;
use crate::notify::Phase;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Notepad area
            Constraint::Length(1), // Counters
            Constraint::Length(1), // Shortcuts / prompt
        ])
        .split(f.size());

    draw_title_bar(f, app, chunks[0]);

    if matches!(app.mode(), Mode::Help) {
        draw_help(f, chunks[1]);
    } else {
        draw_notepad(f, app, chunks[1]);
    }

    draw_counters_bar(f, app, chunks[2]);
    draw_bottom_bar(f, app, chunks[3]);

    // Banners overlay the top-right corner of the notepad area.
    draw_notifications(f, app, chunks[1]);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let unsaved = if app.store.is_dirty() { " [+]" } else { "" };
    let title = format!("  Kitty Notes  {}{}", app.ui_state.mood(), unsaved);

    let title_bar = Paragraph::new(title)
        .style(Style::default().bg(Color::Magenta).fg(Color::White))
        .alignment(Alignment::Left);

    f.render_widget(title_bar, area);
}

fn draw_notepad(f: &mut Frame, app: &mut App, area: Rect) {
    let text_area = if app.config.editor.line_numbers {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(5), // Line numbers
                Constraint::Min(0),    // Content
            ])
            .split(area);
        draw_line_numbers(f, app, chunks[0]);
        chunks[1]
    } else {
        area
    };

    app.notepad.set_viewport_height(text_area.height as usize);

    let offset = app.notepad.viewport_offset();
    let (caret_line, caret_col) = app.notepad.caret_screen_position();

    let mut lines = Vec::new();
    for (i, line) in app.notepad.viewport_lines().iter().enumerate() {
        let display = expand_tabs(line);
        if app.config.editor.highlight_current_line && offset + i == caret_line {
            lines.push(Line::from(Span::styled(
                display,
                Style::default().bg(Color::DarkGray),
            )));
        } else {
            lines.push(Line::from(display));
        }
    }

    let content = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::NONE));
    f.render_widget(content, text_area);

    // Place the terminal cursor on the caret when it is in view.
    if caret_line >= offset && caret_line < offset + text_area.height as usize {
        let x = text_area.x + caret_col as u16;
        let y = text_area.y + (caret_line - offset) as u16;
        if x < text_area.x + text_area.width && y < text_area.y + text_area.height {
            f.set_cursor(x, y);
        }
    }
}

fn draw_line_numbers(f: &mut Frame, app: &App, area: Rect) {
    let offset = app.notepad.viewport_offset();
    let visible = app
        .notepad
        .line_count()
        .saturating_sub(offset)
        .min(area.height as usize);

    let numbers: Vec<Line> = (0..visible)
        .map(|i| Line::from(format!("{:>4} ", offset + i + 1)))
        .collect();

    let widget = Paragraph::new(numbers).style(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, area);
}

fn draw_counters_bar(f: &mut Frame, app: &App, area: Rect) {
    let m = &app.metrics;
    let label = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
    let value = Style::default().fg(Color::White);

    let spans = vec![
        Span::styled(" Words: ", label),
        Span::styled(m.words.to_string(), value),
        Span::styled("   Characters: ", label),
        Span::styled(m.chars.to_string(), value),
        Span::styled("   Lines: ", label),
        Span::styled(m.lines.to_string(), value),
    ];

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    f.render_widget(bar, area);
}

fn draw_bottom_bar(f: &mut Frame, app: &App, area: Rect) {
    match app.mode() {
        Mode::ClearConfirm => {
            let prompt = Paragraph::new(" Clear all text? (y/n)")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            f.render_widget(prompt, area);
        }
        _ => {
            let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
            let shortcuts = vec![
                Span::styled(" ^S", bold),
                Span::raw(" Save TXT  "),
                Span::styled("^P", bold),
                Span::raw(" Save PDF  "),
                Span::styled("^L", bold),
                Span::raw(" Clear  "),
                Span::styled("F1", bold),
                Span::raw(" Help  "),
                Span::styled("^Q", bold),
                Span::raw(" Quit"),
            ];
            let bar = Paragraph::new(Line::from(shortcuts)).style(Style::default().bg(Color::DarkGray));
            f.render_widget(bar, area);
        }
    }
}

fn draw_notifications(f: &mut Frame, app: &App, area: Rect) {
    for (i, (notification, phase)) in app.ui_state.notifications.active().iter().enumerate() {
        let y = area.y + 1 + i as u16;
        if y >= area.y + area.height {
            break;
        }

        let text = format!(" {} ", notification.message);
        let width = (text.width() as u16).min(area.width);
        let banner_area = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height: 1,
        };

        let style = match phase {
            Phase::Visible => Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            Phase::Leaving => Style::default().fg(Color::DarkGray),
        };

        f.render_widget(Clear, banner_area);
        f.render_widget(Paragraph::new(text).style(style), banner_area);
    }
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            " HELP -- Kitty Notes",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(" Just type; the buffer autosaves as you go."),
        Line::from(""),
        Line::from(" Shortcuts:"),
        Line::from("  Ctrl+S   Save the note as a .txt file"),
        Line::from("  Ctrl+P   Export the note as a paginated PDF"),
        Line::from("  Ctrl+L   Clear all text (asks first)"),
        Line::from("  Tab      Insert a literal tab character"),
        Line::from("  Ctrl+Q   Quit"),
        Line::from(""),
        Line::from(" Movement:"),
        Line::from("  Arrow keys, Home/End, PageUp/PageDown"),
        Line::from("  Hold Shift while moving to select text"),
        Line::from(""),
        Line::from(" Exported files are named kitty-notes-<timestamp>"),
        Line::from(" and land in the configured export directory."),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Press Esc or F1 to close help",
            Style::default().add_modifier(Modifier::ITALIC),
        )]),
    ];

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .alignment(Alignment::Left);

    f.render_widget(help, area);
}

fn expand_tabs(line: &str) -> String {
    line.replace('\t', &" ".repeat(TAB_DISPLAY_COLS))
}
