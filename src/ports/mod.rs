//! I/O ports between a machine and its driver
//!
//! The engine talks to the outside world only through the [`Ports`] trait:
//!
//! - **input**: one value per input instruction, driver → engine
//! - **output**: one value per output instruction, engine → driver
//! - **acknowledge**: called after an output when the handshake is enabled
//! - **prompt**: side channel announcing a pending input read
//! - **halt**: fired once with the last output when the program halts
//!
//! Two implementations are provided:
//!
//! - [`QueuePorts`]: synchronous in-memory queues for single-threaded drivers
//! - [`channel::ChannelPorts`]: channels to a machine running on its own
//!   thread, created by [`channel::spawn`] or [`channel::spawn_bounded`]
//!
//! [`ascii`] converts between text and cells for programs that speak ASCII.

pub mod ascii;
pub mod channel;

use crate::interpreter::errors::{MachineError, Port};
use crate::memory::Cell;

pub use channel::{spawn, spawn_bounded, Event, MachineHandle};

/// Driver-side endpoints of a machine's I/O
pub trait Ports {
    /// Next input value; may block until one is available
    fn input(&mut self) -> Result<Cell, MachineError>;

    /// Enqueue one output value
    fn output(&mut self, value: Cell) -> Result<(), MachineError>;

    /// Wait until the driver has processed the last output
    fn acknowledge(&mut self) -> Result<(), MachineError> {
        Ok(())
    }

    /// Announce that an input read is about to block
    fn prompt(&mut self, _prompt: &Cell) -> Result<(), MachineError> {
        Ok(())
    }

    /// The program executed its halt instruction
    fn halt(&mut self, _last_output: Option<&Cell>) {}

    /// Whether [`Ports::input`] would return without waiting
    fn input_ready(&self) -> bool {
        true
    }
}

/// In-memory input log and output buffer.
///
/// Inputs are never discarded: a cursor tracks how many have been consumed,
/// so a driver that rewinds the machine can rewind the cursor too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueuePorts {
    inputs: Vec<Cell>,
    cursor: usize,
    outputs: Vec<Cell>,
    prompts: usize,
    halted_with: Option<Option<Cell>>,
}

impl QueuePorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs<I>(inputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        let mut ports = Self::new();
        ports.extend_inputs(inputs);
        ports
    }

    pub fn push_input(&mut self, value: impl Into<Cell>) {
        self.inputs.push(value.into());
    }

    pub fn extend_inputs<I>(&mut self, inputs: I)
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
    }

    /// Number of inputs queued but not yet read
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len() - self.cursor
    }

    pub fn outputs(&self) -> &[Cell] {
        &self.outputs
    }

    /// Remove and return all outputs produced so far
    pub fn drain_outputs(&mut self) -> Vec<Cell> {
        std::mem::take(&mut self.outputs)
    }

    /// Number of input reads announced through the prompt hook
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    /// `Some(last_output)` once the halt signal has fired
    pub fn halt_signal(&self) -> Option<&Option<Cell>> {
        self.halted_with.as_ref()
    }

    /// Input cursor and output count, for history bookkeeping
    pub fn position(&self) -> (usize, usize) {
        (self.cursor, self.outputs.len())
    }

    /// Rewind to a position previously returned by [`QueuePorts::position`]
    pub fn rewind(&mut self, cursor: usize, outputs: usize) {
        self.cursor = cursor.min(self.inputs.len());
        self.outputs.truncate(outputs);
        self.halted_with = None;
    }
}

impl Ports for QueuePorts {
    fn input(&mut self) -> Result<Cell, MachineError> {
        let value = self
            .inputs
            .get(self.cursor)
            .cloned()
            .ok_or(MachineError::PortClosed { port: Port::Input })?;
        self.cursor += 1;
        Ok(value)
    }

    fn output(&mut self, value: Cell) -> Result<(), MachineError> {
        self.outputs.push(value);
        Ok(())
    }

    fn prompt(&mut self, _prompt: &Cell) -> Result<(), MachineError> {
        self.prompts += 1;
        Ok(())
    }

    fn halt(&mut self, last_output: Option<&Cell>) {
        self.halted_with = Some(last_output.cloned());
    }

    fn input_ready(&self) -> bool {
        self.cursor < self.inputs.len()
    }
}
