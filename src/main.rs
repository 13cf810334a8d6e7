mod app;
mod calendar;
mod components;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, ViewMode};
use color_eyre::Result;
use components::{FormField, FormMode};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};

fn main() -> Result<()> {
    color_eyre::install()?;

    let mut app = App::new();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    result
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();
            let w = area.width;

            // Main layout: content + status bar
            let layout = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

            let content_area = layout[0];

            // Render main view
            match app.view_mode {
                ViewMode::Year => {
                    components::YearView::render(
                        frame,
                        content_area,
                        app.focused_date,
                        app.today,
                        &app.month_counts,
                    );
                }
                ViewMode::Month => render_month_layout(frame, content_area, app, w),
                ViewMode::Day => {
                    components::DayView::render(
                        frame,
                        content_area,
                        app.focused_date,
                        &app.day_events,
                        app.event_cursor,
                    );
                }
            }

            // Render event form overlay
            if let Some(ref form) = app.form {
                components::EventForm::render(frame, area, form);
            }

            // Render help overlay
            if app.show_help {
                render_help(frame, area);
            }

            // Status bar
            render_status_bar(frame, layout[1], app, w);
        })?;

        if let Some(key) = tui::next_key_event(Duration::from_millis(100))? {
            // Clear status message on any key
            app.status_message = None;

            // Help overlay takes priority
            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            if app.form.is_some() {
                handle_form_input(app, key.code, key.modifiers);
            } else {
                handle_normal_input(app, key.code, key.modifiers);
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('1'), _) => app.set_view(ViewMode::Year),
        (KeyCode::Char('2'), _) => app.set_view(ViewMode::Month),
        (KeyCode::Char('3'), _) => app.set_view(ViewMode::Day),
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('n'), _) => app.open_event_form(),
        (KeyCode::Char('e'), _) => app.edit_selected(),
        (KeyCode::Char('d'), _) => app.delete_selected(),
        (KeyCode::Char('x'), _) => app.export_ics(),
        (KeyCode::Char('i'), _) => app.import_ics(),
        (KeyCode::Enter, _) => app.activate(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => {
            if app.view_mode == ViewMode::Year {
                app.prev_month();
            } else {
                app.prev_day();
            }
        }
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => {
            if app.view_mode == ViewMode::Year {
                app.next_month();
            } else {
                app.next_day();
            }
        }
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
            if app.view_mode == ViewMode::Year {
                // One grid row is three months
                for _ in 0..3 {
                    app.prev_month();
                }
            } else {
                app.select_prev();
            }
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
            if app.view_mode == ViewMode::Year {
                for _ in 0..3 {
                    app.next_month();
                }
            } else {
                app.select_next();
            }
        }
        (KeyCode::Char('['), _) => {
            if app.view_mode == ViewMode::Year {
                app.prev_year();
            } else {
                app.prev_month();
            }
        }
        (KeyCode::Char(']'), _) => {
            if app.view_mode == ViewMode::Year {
                app.next_year();
            } else {
                app.next_month();
            }
        }
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode, _modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => app.close_event_form(),
        KeyCode::Enter => app.submit_event_form(),
        KeyCode::Tab => app.form_tab(),
        KeyCode::BackTab => app.form_backtab(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(' ') => {
            // Space cycles the status field; elsewhere it is just a space
            if let Some(ref mut form) = app.form {
                if form.active_field == FormField::Status {
                    form.cycle_status();
                } else {
                    form.input_char(' ');
                }
            }
        }
        KeyCode::Char(c) => app.form_input_char(c),
        _ => {}
    }
}

fn render_month_layout(frame: &mut ratatui::Frame, area: Rect, app: &App, total_width: u16) {
    if total_width < 60 {
        components::MonthView::render(
            frame,
            area,
            app.focused_date,
            app.today,
            &app.days_with_events,
        );
    } else {
        let month_w = if total_width >= 100 { 44 } else { 30 };
        let content = Layout::horizontal([
            Constraint::Length(month_w),
            Constraint::Min(20),
        ])
        .split(area);

        components::MonthView::render(
            frame,
            content[0],
            app.focused_date,
            app.today,
            &app.days_with_events,
        );

        components::DayView::render(
            frame,
            content[1],
            app.focused_date,
            &app.day_events,
            app.event_cursor,
        );
    }
}

fn render_status_bar(frame: &mut ratatui::Frame, area: Rect, app: &App, w: u16) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let w = w as usize;

    let mode_str = match app.view_mode {
        ViewMode::Year => "[1]Year",
        ViewMode::Month => "[2]Month",
        ViewMode::Day => "[3]Day",
    };

    let focus_indicator = match app.form {
        Some(ref form) => match form.mode {
            FormMode::Create => " [New Event]",
            FormMode::Edit(_) => " [Edit Event]",
        },
        None => "",
    };

    // Show status message if present, otherwise show context-aware hints
    let right_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        match app.view_mode {
            ViewMode::Year if w >= 84 => {
                " hl:Month jk:Row [/]:Year Enter:Open t:Today n:New x:Export i:Import q:Quit"
                    .to_string()
            }
            ViewMode::Month | ViewMode::Day if w >= 84 => {
                " hl:Day jk:Select [/]:Month Enter:Open n:New e:Edit d:Del x:Export q:Quit"
                    .to_string()
            }
            _ if w >= 50 => " n:New Enter:Open ?:Help q:Quit".to_string(),
            _ => " ?:Help q:Quit".to_string(),
        }
    };

    let left = format!(" {}{} ", mode_str, focus_indicator);
    let padding_len = w.saturating_sub(left.len() + right_text.len());
    let padding = " ".repeat(padding_len);

    let line = Line::from(vec![
        Span::styled(left, theme::current().status),
        Span::styled(padding, theme::current().status),
        Span::styled(right_text, theme::current().status),
    ]);

    let bar = Paragraph::new(line).style(theme::current().status);
    frame.render_widget(bar, area);
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let popup_w = area.width.min(56).max(30);
    let popup_h = area.height.min(24).max(12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let desc_style = Style::default();
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        Line::from(vec![
            Span::styled("  h/l ", key_style),
            Span::styled("or ", theme::current().dim),
            Span::styled("\u{2190}/\u{2192}  ", key_style),
            Span::styled("Previous/next day (month in Year view)", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  j/k ", key_style),
            Span::styled("or ", theme::current().dim),
            Span::styled("\u{2191}/\u{2193}  ", key_style),
            Span::styled("Select event (grid row in Year view)", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  [/]       ", key_style),
            Span::styled("Previous/next month (year in Year view)", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  t         ", key_style),
            Span::styled("Jump to today", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Views", section_style)),
        Line::from(vec![
            Span::styled("  1/2/3     ", key_style),
            Span::styled("Year / Month / Day view", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", key_style),
            Span::styled("Open month under the Year cursor", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Events", section_style)),
        Line::from(vec![
            Span::styled("  Enter     ", key_style),
            Span::styled("Edit selection, or create on the day", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  n         ", key_style),
            Span::styled("Create new event", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  e         ", key_style),
            Span::styled("Edit selected event", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  d         ", key_style),
            Span::styled("Delete selected event", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Files", section_style)),
        Line::from(vec![
            Span::styled("  x         ", key_style),
            Span::styled("Export calendar.ics to Downloads", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  i         ", key_style),
            Span::styled("Import calendar.ics from Downloads", desc_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", theme::current().dim),
            Span::styled("Esc     ", key_style),
            Span::styled("Quit / close popup", desc_style),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
