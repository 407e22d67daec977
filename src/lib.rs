//! # Introduction
//!
//! An Intcode virtual machine: a small register machine whose programs are
//! lists of arbitrary-precision integers, with self-modifying code, three
//! addressing modes and a relative base register.
//!
//! ## Execution pipeline
//!
//! ```text
//! Program text → Parser → Tape → Machine ⇄ Ports ⇄ Driver
//!                                    ↓
//!                                Snapshots → Monitor (TUI)
//! ```
//!
//! 1. [`parser`] turns comma-separated program text into the initial tape.
//! 2. [`memory`] holds the growable, zero-filled [`memory::Tape`] of
//!    [`memory::Cell`]s.
//! 3. [`interpreter`] decodes and executes instructions. A
//!    [`interpreter::engine::Machine`] suspends on input, and optionally after
//!    each output until the driver acknowledges it.
//! 4. [`ports`] connects a machine to its driver, either through in-memory
//!    queues or through channels to a machine on its own thread.
//! 5. [`snapshot`] saves and restores machine state, persists it as JSON and
//!    keeps the bounded history used for reverse stepping.
//! 6. [`ui`] is the ratatui-based time-travel monitor; not part of the stable
//!    library API.
//!
//! ## Example
//!
//! ```
//! use intcode::interpreter::engine::Machine;
//! use intcode::parser::parse_program;
//! use intcode::ports::QueuePorts;
//!
//! let program = parse_program("3,9,8,9,10,9,4,9,99,-1,8").unwrap();
//! let mut machine = Machine::new(program);
//! let mut ports = QueuePorts::with_inputs([8]);
//! machine.run(&mut ports).unwrap();
//! assert_eq!(ports.outputs()[0], 1.into());
//! ```

pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod ports;
pub mod snapshot;
pub mod ui;
