//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: monitor state, keyboard event loop, pane focus, input mode
//! - **[`panes`]**: stateless render functions for each visible pane (tape,
//!   registers, output, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a [`Debugger`] and
//! call [`App::run`] to start the event loop.
//!
//! [`Debugger`]: crate::interpreter::debugger::Debugger
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
