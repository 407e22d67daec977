//! Output pane rendering

use crate::memory::value::as_ascii;
use crate::memory::Cell;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the output pane, one emitted value per row
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    outputs: &[Cell],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Output ({}) ", outputs.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if outputs.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = outputs
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let mut spans = vec![
                Span::styled(
                    format!("{:>4}  ", idx),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(
                    value.to_string(),
                    Style::default().fg(DEFAULT_THEME.output_value),
                ),
            ];
            if let Some(c) = as_ascii(value).filter(|c| c.is_ascii_graphic() || *c == ' ') {
                spans.push(Span::styled(
                    format!("  '{}'", c),
                    Style::default().fg(DEFAULT_THEME.comment),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}
