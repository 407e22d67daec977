//! Error types for the Intcode machine
//!
//! This module defines [`MachineError`], which represents every fault the
//! machine can surface to its driver: decode failures, invalid memory access,
//! malformed program text, closed I/O ports, and history/persistence failures.
//!
//! Errors raised while executing are fatal ([`MachineError::is_fatal`]). The
//! engine never retries; it transitions to
//! [`MachineState::Faulted`](crate::interpreter::engine::MachineState::Faulted)
//! and hands the error to the driver, which may restart from
//! [`Machine::reset`](crate::interpreter::engine::Machine::reset). History,
//! persistence and literal errors leave the machine as it was.

use crate::memory::Cell;
use std::fmt;

/// The logical port a closed channel belonged to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Input,
    Output,
    Acknowledge,
    Halt,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Input => write!(f, "input"),
            Port::Output => write!(f, "output"),
            Port::Acknowledge => write!(f, "acknowledge"),
            Port::Halt => write!(f, "halt"),
        }
    }
}

/// Errors raised while loading or executing a program
#[derive(Debug, Clone, PartialEq)]
pub enum MachineError {
    /// Decoded opcode (or one of its mode digits) is not in the dispatch table
    InvalidOpcode { instruction: Cell, pc: usize },

    /// Negative (or unrepresentable) address used for a read or write
    InvalidAddress { address: Cell },

    /// Program text contained a token that is not a base-10 integer
    MalformedLiteral { token: String, index: usize },

    /// The driver closed a port while the engine was waiting on it
    PortClosed { port: Port },

    /// Execution history exceeded its memory budget
    SnapshotLimitExceeded { current: usize, limit: usize },

    /// Stepping through history failed (start/end reached, missing frame)
    HistoryOperationFailed { message: String },

    /// Snapshot could not be written or read back
    Persistence { message: String },

    /// The worker thread running a machine panicked
    WorkerPanicked,
}

impl MachineError {
    /// Whether this error ends execution of the machine that raised it
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MachineError::InvalidOpcode { .. }
                | MachineError::InvalidAddress { .. }
                | MachineError::PortClosed { .. }
                | MachineError::WorkerPanicked
        )
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineError::InvalidOpcode { instruction, pc } => {
                write!(f, "Invalid opcode {} at position {}", instruction, pc)
            }
            MachineError::InvalidAddress { address } => {
                write!(f, "Invalid address {}", address)
            }
            MachineError::MalformedLiteral { token, index } => {
                write!(
                    f,
                    "Malformed integer literal '{}' at program index {}",
                    token, index
                )
            }
            MachineError::PortClosed { port } => {
                write!(f, "The {} port was closed by the driver", port)
            }
            MachineError::SnapshotLimitExceeded { current, limit } => {
                write!(
                    f,
                    "Snapshot memory limit exceeded: {} bytes used, limit is {}",
                    current, limit
                )
            }
            MachineError::HistoryOperationFailed { message } => {
                write!(f, "History operation failed: {}", message)
            }
            MachineError::Persistence { message } => {
                write!(f, "Snapshot persistence failed: {}", message)
            }
            MachineError::WorkerPanicked => write!(f, "Machine worker thread panicked"),
        }
    }
}

impl std::error::Error for MachineError {}
