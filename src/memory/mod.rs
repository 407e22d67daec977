//! Memory model for the Intcode machine
//!
//! This module provides the core memory abstractions:
//! - [`value`]: the [`value::Cell`] type (an arbitrary-precision signed integer)
//!   and address conversion helpers
//! - [`tape`]: the growable, zero-defaulted [`tape::Tape`]
//!
//! # Addressing
//!
//! Addresses are non-negative and dense. Reading past the high-water mark of
//! the tape yields zero; writing past it grows the tape and back-fills the gap
//! with zeros:
//!
//! ```text
//! tape = [1, 2, 3]          len 3
//! write(6, 9)
//! tape = [1, 2, 3, 0, 0, 0, 9]
//! ```
//!
//! Negative addresses are rejected with
//! [`MachineError::InvalidAddress`](crate::interpreter::errors::MachineError::InvalidAddress).

pub mod tape;
pub mod value;

pub use tape::Tape;
pub use value::Cell;
