// Stepping debugger with recorded history

use crate::interpreter::constants::RUN_STEP_LIMIT;
use crate::interpreter::engine::{Machine, MachineState, StepOutcome};
use crate::interpreter::errors::MachineError;
use crate::memory::Cell;
use crate::ports::QueuePorts;
use crate::snapshot::{HistoryFrame, SnapshotManager};
use log::debug;
use rustc_hash::FxHashMap;

/// What a forward step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next recorded frame without executing anything
    Replayed,
    /// Executed a new instruction and recorded it
    Executed,
    /// The next instruction reads input and none is queued
    NeedsInput,
    /// The program has halted; there is nothing further to do
    Halted,
}

/// A machine driven one instruction at a time, with every step recorded so
/// execution can be walked backwards and replayed.
///
/// Frame `n` of the history is the state after `n` executed instructions.
/// Stepping forward from an earlier frame replays the recorded future; only at
/// the end of the history are new instructions executed.
#[derive(Debug)]
pub struct Debugger {
    machine: Machine,
    ports: QueuePorts,
    history: SnapshotManager,
    position: usize,
    exec_counts: FxHashMap<usize, u64>,
}

impl Debugger {
    /// Wrap `machine`, recording its current state as frame 0
    pub fn new(
        machine: Machine,
        ports: QueuePorts,
        history_limit: usize,
    ) -> Result<Self, MachineError> {
        let mut debugger = Debugger {
            machine,
            ports,
            history: SnapshotManager::new(history_limit),
            position: 0,
            exec_counts: FxHashMap::default(),
        };
        let frame = Self::frame_of(&debugger.machine, &debugger.ports);
        debugger.history.push(frame)?;
        Ok(debugger)
    }

    fn frame_of(machine: &Machine, ports: &QueuePorts) -> HistoryFrame {
        let (input_cursor, output_count) = ports.position();
        HistoryFrame {
            snapshot: machine.save(),
            state: machine.state(),
            input_cursor,
            output_count,
        }
    }

    fn at_end(&self) -> bool {
        self.position + 1 >= self.history.len()
    }

    fn load_frame(&mut self, index: usize) -> Result<(), MachineError> {
        let frame = self
            .history
            .get(index)
            .cloned()
            .ok_or_else(|| MachineError::HistoryOperationFailed {
                message: format!("no recorded frame {}", index),
            })?;
        self.machine.restore_in_state(frame.snapshot, frame.state);
        self.position = index;
        Ok(())
    }

    /// Advance by one instruction
    pub fn step_forward(&mut self) -> Result<Advance, MachineError> {
        if !self.at_end() {
            self.load_frame(self.position + 1)?;
            return Ok(Advance::Replayed);
        }
        if let Some(fault) = self.machine.fault() {
            return Err(fault.clone());
        }
        if self.machine.is_halted() {
            return Ok(Advance::Halted);
        }
        if self.machine.blocked_on_input(&self.ports) {
            return Ok(Advance::NeedsInput);
        }

        // Execute on a copy so a full history leaves the machine untouched
        let mut machine = self.machine.clone();
        let mut ports = self.ports.clone();
        let pc = machine.pc();
        match machine.step(&mut ports) {
            Ok(outcome) => {
                self.history.push(Self::frame_of(&machine, &ports))?;
                self.machine = machine;
                self.ports = ports;
                self.position += 1;
                *self.exec_counts.entry(pc).or_insert(0) += 1;
                match outcome {
                    StepOutcome::Halted => Ok(Advance::Halted),
                    StepOutcome::Executed(_) => Ok(Advance::Executed),
                }
            }
            Err(error) => {
                // Keep the faulted machine on display; the history is unchanged
                self.machine = machine;
                Err(error)
            }
        }
    }

    /// Go back one instruction.
    ///
    /// A faulted machine first returns to the last good frame.
    pub fn step_backward(&mut self) -> Result<(), MachineError> {
        if self.machine.fault().is_some() {
            return self.load_frame(self.position);
        }
        if self.position == 0 {
            return Err(MachineError::HistoryOperationFailed {
                message: "already at the start of execution".to_string(),
            });
        }
        self.load_frame(self.position - 1)
    }

    pub fn rewind_to_start(&mut self) -> Result<(), MachineError> {
        self.load_frame(0)
    }

    /// Step until the program halts, needs input or `RUN_STEP_LIMIT` steps pass
    pub fn run_to_end(&mut self) -> Result<Advance, MachineError> {
        let mut last = Advance::Replayed;
        for _ in 0..RUN_STEP_LIMIT {
            last = self.step_forward()?;
            if matches!(last, Advance::Halted | Advance::NeedsInput) {
                break;
            }
        }
        debug!("run stopped at frame {} ({:?})", self.position, last);
        Ok(last)
    }

    /// Queue an input value for the machine
    pub fn provide_input(&mut self, value: impl Into<Cell>) {
        self.ports.push_input(value);
    }

    /// Throw away everything after frame 0 and start over.
    ///
    /// Inputs already provided are kept and will be read again.
    pub fn restart(&mut self) -> Result<(), MachineError> {
        let (cursor, outputs) = self
            .history
            .get(0)
            .map(|frame| (frame.input_cursor, frame.output_count))
            .unwrap_or((0, 0));
        self.ports.rewind(cursor, outputs);
        self.history.truncate_after(0);
        self.exec_counts.clear();
        self.load_frame(0)
    }

    // ========== Getter methods for UI ==========

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Outputs produced up to the current frame
    pub fn outputs(&self) -> &[Cell] {
        let count = self
            .history
            .get(self.position)
            .map(|frame| frame.output_count)
            .unwrap_or(0);
        &self.ports.outputs()[..count.min(self.ports.outputs().len())]
    }

    /// Inputs not yet consumed at the end of the history
    pub fn pending_inputs(&self) -> usize {
        self.ports.pending_inputs()
    }

    /// Times the instruction at `address` has been executed
    pub fn exec_count(&self, address: usize) -> u64 {
        self.exec_counts.get(&address).copied().unwrap_or(0)
    }

    pub fn history_position(&self) -> usize {
        self.position
    }

    pub fn total_frames(&self) -> usize {
        self.history.len()
    }

    pub fn history_memory(&self) -> (usize, usize) {
        (self.history.memory_usage(), self.history.memory_limit())
    }

    pub fn awaiting_input(&self) -> bool {
        self.at_end() && self.machine.state() == MachineState::AwaitingInput
    }
}
