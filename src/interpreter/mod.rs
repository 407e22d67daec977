//! Intcode execution engine
//!
//! This module provides the core execution logic:
//! - [`decoder`]: opcode table, addressing modes and instruction decoding
//! - [`engine`]: the [`engine::Machine`] fetch-decode-execute loop
//! - [`debugger`]: stepping with a recorded history, used by the monitor
//! - [`errors`]: the [`errors::MachineError`] taxonomy
//!
//! # Execution Model
//!
//! The machine executes one instruction per [`engine::Machine::step`]. Input
//! and output go through a [`Ports`](crate::ports::Ports) implementation chosen
//! by the driver: synchronous queues, or channels to a machine running on its
//! own thread.
//!
//! # Handshake
//!
//! With [`engine::MachineConfig::pause_on_output`] enabled, every output
//! instruction waits for the driver's acknowledgment before the next
//! instruction executes, keeping driver-side state in lockstep with the
//! program's output.

pub mod constants;
pub mod debugger;
pub mod decoder;
pub mod engine;
pub mod errors;
