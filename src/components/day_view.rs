use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::calendar::{Event, EventStatus};
use crate::theme;

pub struct DayView;

impl DayView {
    /// Event list for one day. The slice arrives with all-day entries sorted
    /// ahead of timed ones, and `cursor` indexes straight into it.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        events: &[Event],
        cursor: Option<usize>,
    ) {
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let count_str = if events.is_empty() {
            String::new()
        } else {
            let n = events.len();
            format!(" {} event{} ", n, if n == 1 { "" } else { "s" })
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::current().header)
            .title_bottom(Line::from(Span::styled(count_str, theme::current().dim)))
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        if events.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No events").style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;
        let all_day_count = events.iter().filter(|e| e.is_all_day()).count();

        let mut items: Vec<ListItem> = Vec::new();
        let mut cursor_row = None;

        // All-day events section
        if all_day_count > 0 {
            items.push(ListItem::new(Line::from(Span::styled(
                "All Day",
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ))));
            for (i, event) in events.iter().take(all_day_count).enumerate() {
                if cursor == Some(i) {
                    cursor_row = Some(items.len());
                }
                items.push(format_event(event, inner_w, cursor == Some(i)));
            }
            if all_day_count < events.len() {
                items.push(ListItem::new(Line::from("")));
            }
        }

        // Timed events
        for (i, event) in events.iter().enumerate().skip(all_day_count) {
            if cursor == Some(i) {
                cursor_row = Some(items.len());
            }
            items.push(format_event(event, inner_w, cursor == Some(i)));
        }

        // Keep the cursor row on screen
        let inner_h = area.height.saturating_sub(2) as usize;
        let skip = match cursor_row {
            Some(row) if row + 1 > inner_h && inner_h > 0 => row + 1 - inner_h,
            _ => 0,
        };
        let visible_items: Vec<ListItem> = items.into_iter().skip(skip).collect();

        let list = List::new(visible_items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_event(event: &Event, max_width: usize, selected: bool) -> ListItem<'static> {
    let marker = if selected { "> " } else { "  " };
    let marker_span = Span::styled(
        marker,
        if selected {
            theme::current().highlight
        } else {
            Style::default()
        },
    );

    let time_str = if event.is_all_day() {
        String::new()
    } else {
        format!("{} ", event.time_display())
    };
    let time_span = Span::styled(
        time_str.clone(),
        Style::default().add_modifier(Modifier::DIM),
    );

    let summary_style = if selected {
        theme::current().highlight
    } else {
        match event.status {
            EventStatus::Cancelled => {
                Style::default().add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
            }
            EventStatus::Tentative => Style::default().add_modifier(Modifier::DIM),
            EventStatus::Confirmed => Style::default(),
        }
    };
    let summary_span = Span::styled(event.summary.clone(), summary_style);

    let mut spans = vec![marker_span, time_span, summary_span];

    // Only show location if there's room
    let used = 2 + time_str.len() + event.summary.len();
    if let Some(ref loc) = event.location {
        if !loc.is_empty() && used + 4 + loc.len() <= max_width {
            spans.push(Span::styled(format!(" @ {}", loc), theme::current().dim));
        }
    }

    ListItem::new(Line::from(spans))
}
