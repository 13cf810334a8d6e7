use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub struct YearView;

impl YearView {
    /// Twelve month cells in a 3x4 grid. The focused month is highlighted and
    /// each cell carries its event count for the shown year.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        focused_date: NaiveDate,
        today: NaiveDate,
        month_counts: &[usize; 12],
    ) {
        let year = focused_date.year();

        let block = Block::default()
            .title(format!(" {} ", year))
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

        for row in 0..4 {
            let cols = Layout::horizontal([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[row]);

            for col in 0..3 {
                let index = row * 3 + col;
                render_month_cell(
                    frame,
                    cols[col],
                    index,
                    year,
                    focused_date,
                    today,
                    month_counts[index],
                );
            }
        }
    }
}

fn render_month_cell(
    frame: &mut Frame,
    area: Rect,
    index: usize,
    year: i32,
    focused_date: NaiveDate,
    today: NaiveDate,
    count: usize,
) {
    let month = index as u32 + 1;
    let focused = focused_date.month() == month;
    let is_today = today.year() == year && today.month() == month;

    let name_style = if focused {
        theme::current().selected
    } else if is_today {
        theme::current().today
    } else {
        theme::current().header
    };

    let count_str = if count > 0 {
        format!("{} event{}", count, if count == 1 { "" } else { "s" })
    } else {
        String::new()
    };

    let lines = vec![
        Line::from(Span::styled(format!(" {} ", MONTH_NAMES[index]), name_style)),
        Line::from(Span::styled(count_str, theme::current().dim)),
    ];

    let cell = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(cell, area);
}
