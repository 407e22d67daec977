//! Tape pane rendering with disassembly
//!
//! The tape is shown as one row per instruction, found by a linear sweep from
//! address 0. Cells that do not decode become single-cell `DATA` rows. The
//! sweep always starts a row at the program counter, so the current
//! instruction is never hidden inside a neighbouring row.
//!
//! Each row shows its address, how many times it has been executed (the heat
//! column), the disassembly and the raw cells.

use crate::interpreter::debugger::Debugger;
use crate::interpreter::decoder::{decode, disassemble};
use crate::memory::Tape;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One displayed row of the tape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeRow {
    pub address: usize,
    pub length: usize,
    /// Shown as raw data rather than an instruction
    pub data: bool,
}

/// Split the tape into display rows, forcing a row boundary at `pc`.
///
/// A `pc` at or past the end of the tape gets one row of its own after the
/// last tape row.
pub fn layout_rows(tape: &Tape, pc: usize) -> Vec<TapeRow> {
    let mut rows = Vec::new();
    let mut address = 0;

    while address < tape.len() {
        let row = match decode(tape, address) {
            Ok(instruction) if address >= pc || address + instruction.length() <= pc => TapeRow {
                address,
                length: instruction.length(),
                data: false,
            },
            _ => TapeRow {
                address,
                length: 1,
                data: true,
            },
        };
        address += row.length;
        rows.push(row);
    }
    if pc >= address {
        rows.push(TapeRow {
            address: pc,
            length: 1,
            data: decode(tape, pc).is_err(),
        });
    }
    rows
}

/// Scroll state for the tape pane
pub struct TapeScrollState {
    pub offset: usize,
    pub target_row: Option<usize>,
}

impl TapeScrollState {
    pub fn new() -> Self {
        TapeScrollState {
            offset: 0,
            target_row: None,
        }
    }
}

impl Default for TapeScrollState {
    fn default() -> Self {
        Self::new()
    }
}

fn row_text(tape: &Tape, row: &TapeRow) -> (String, String) {
    let text = if row.data {
        format!("DATA {}", tape.read_at(row.address))
    } else {
        disassemble(tape, row.address)
    };
    let (mnemonic, operands) = match text.split_once(' ') {
        Some((m, o)) => (m.to_string(), o.to_string()),
        None => (text, String::new()),
    };
    (mnemonic, operands)
}

fn raw_cells(tape: &Tape, row: &TapeRow) -> String {
    (0..row.length)
        .map(|offset| tape.read_at(row.address.saturating_add(offset)).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Render the tape pane
pub fn render_tape_pane(
    frame: &mut Frame,
    area: Rect,
    debugger: &Debugger,
    is_focused: bool,
    scroll_state: &mut TapeScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let machine = debugger.machine();
    let tape = machine.tape();
    let pc = machine.pc();
    let is_error = machine.fault().is_some();
    let is_input = debugger.awaiting_input();

    let block = Block::default()
        .title(format!(" Tape ({} cells) ", tape.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let rows = layout_rows(tape, pc);
    let current = rows.iter().position(|row| row.address == pc).unwrap_or(0);

    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if scroll_state.target_row.is_none() {
        scroll_state.target_row = Some(visible_height / 2);
    }
    let target_row = scroll_state
        .target_row
        .unwrap_or(0)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_row = Some(target_row);

    scroll_state.offset = current.saturating_sub(target_row);
    if rows.len() > visible_height {
        scroll_state.offset = scroll_state.offset.min(rows.len() - visible_height);
    } else {
        scroll_state.offset = 0;
    }

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, row)| {
            let is_current = idx == current;
            let (mnemonic, operands) = row_text(tape, row);
            let count = debugger.exec_count(row.address);
            let heat = if count == 0 {
                String::from("     ")
            } else {
                format!("{:>5}", count)
            };

            let marker = if is_current { "▶" } else { " " };
            let addr_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };
            let mnemonic_style = if row.data {
                Style::default().fg(DEFAULT_THEME.comment)
            } else {
                Style::default()
                    .fg(DEFAULT_THEME.mnemonic)
                    .add_modifier(Modifier::BOLD)
            };

            let mut line = Line::from(vec![
                Span::styled(format!("{}{:>6} ", marker, row.address), addr_style),
                Span::styled(heat, Style::default().fg(DEFAULT_THEME.heat)),
                Span::raw("  "),
                Span::styled(format!("{:<5}", mnemonic), mnemonic_style),
                Span::styled(
                    format!("{:<28}", operands),
                    Style::default().fg(DEFAULT_THEME.number),
                ),
                Span::styled(raw_cells(tape, row), Style::default().fg(DEFAULT_THEME.comment)),
            ]);

            if is_current {
                let highlight = if is_error {
                    Style::default()
                        .bg(DEFAULT_THEME.error)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else if is_input {
                    Style::default()
                        .bg(DEFAULT_THEME.secondary)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().bg(DEFAULT_THEME.current_line_bg)
                };
                for span in &mut line.spans {
                    span.style = span.style.patch(highlight);
                }
            }
            line
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::cells;

    #[test]
    fn test_layout_rows_follow_instructions() {
        let tape = Tape::new(cells([1002, 4, 3, 4, 33]));
        let rows = layout_rows(&tape, 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].length, 4);
        assert!(rows[1].data);
        assert_eq!(rows[1].address, 4);
    }

    #[test]
    fn test_layout_rows_break_at_pc() {
        // pc points into the middle of what looks like an ADD
        let tape = Tape::new(cells([1, 0, 0, 0, 99]));
        let rows = layout_rows(&tape, 2);
        let addresses: Vec<usize> = rows.iter().map(|r| r.address).collect();
        assert!(addresses.contains(&2));
        assert!(rows[0].data);
    }

    #[test]
    fn test_layout_rows_cover_pc_past_end() {
        let tape = Tape::new(cells([99]));
        let rows = layout_rows(&tape, 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.last().map(|r| r.address), Some(3));
    }

    #[test]
    fn test_layout_rows_pc_far_past_end() {
        let tape = Tape::new(cells([1105, 1, 7]));
        for pc in [1_000_000_000_000, usize::MAX] {
            let rows = layout_rows(&tape, pc);
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].address, 0);
            let last = rows[1];
            assert_eq!(last.address, pc);
            assert!(last.data);
            assert_eq!(raw_cells(&tape, &last), "0");
        }
    }
}
