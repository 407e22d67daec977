//! Register pane rendering

use crate::interpreter::debugger::Debugger;
use crate::interpreter::engine::MachineState;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

fn field<'a>(name: &'a str, value: String, value_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<14}", name),
            Style::default().fg(DEFAULT_THEME.register),
        ),
        Span::styled(value, value_style),
    ])
}

/// Render the register pane
pub fn render_registers_pane(frame: &mut Frame, area: Rect, debugger: &Debugger) {
    let block = Block::default()
        .title(" Registers ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal))
        .padding(Padding::new(1, 0, 0, 0));

    let machine = debugger.machine();
    let number = Style::default().fg(DEFAULT_THEME.number);

    let state_style = match machine.state() {
        MachineState::Faulted => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD),
        MachineState::Halted => Style::default()
            .fg(DEFAULT_THEME.success)
            .add_modifier(Modifier::BOLD),
        MachineState::AwaitingInput | MachineState::EmittingOutput => Style::default()
            .fg(DEFAULT_THEME.secondary)
            .add_modifier(Modifier::BOLD),
        MachineState::Running => Style::default().fg(DEFAULT_THEME.primary),
    };

    let last_output = machine
        .last_output()
        .map(|v| v.to_string())
        .unwrap_or_else(|| String::from("-"));
    let (used, limit) = debugger.history_memory();

    let mut lines = vec![
        field("state", machine.state().label().to_string(), state_style),
        field("pc", machine.pc().to_string(), number),
        field("relative base", machine.relative_base().to_string(), number),
        field(
            "last output",
            last_output,
            Style::default().fg(DEFAULT_THEME.output_value),
        ),
        field(
            "pending input",
            debugger.pending_inputs().to_string(),
            number,
        ),
        field(
            "history",
            format!("{} KiB / {} MiB", used / 1024, limit / (1024 * 1024)),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
    ];

    if let Some(fault) = machine.fault() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            fault.to_string(),
            Style::default().fg(DEFAULT_THEME.error),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
