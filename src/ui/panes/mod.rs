//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`tape`]: Disassembled tape with the current instruction and execution counts
//! - [`registers`]: Program counter, relative base, machine state and last output
//! - [`output`]: Every value the program has emitted so far
//! - [`status`]: Status bar with keybindings and execution state
//!
//! Each pane module exports a primary `render_*` function. Panes read the
//! [`Debugger`](crate::interpreter::debugger::Debugger) and never mutate it.

pub mod output;
pub mod registers;
pub mod status;
pub mod tape;

pub use output::render_output_pane;
pub use registers::render_registers_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use tape::{render_tape_pane, TapeScrollState};
