// Execution engine for the Intcode machine

use crate::interpreter::decoder::{decode, Instruction, Opcode};
use crate::interpreter::errors::MachineError;
use crate::memory::value::{locate, Location};
use crate::memory::{Cell, Tape};
use crate::ports::Ports;
use crate::snapshot::Snapshot;
use log::{debug, trace};
use num_traits::{One, Zero};
use std::sync::Arc;

/// Where the engine is in its fetch-decode-execute cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Running,
    /// Suspended inside an input instruction
    AwaitingInput,
    /// Suspended inside an output instruction, waiting for acknowledgment
    EmittingOutput,
    Halted,
    Faulted,
}

impl MachineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MachineState::Halted | MachineState::Faulted)
    }

    pub fn label(self) -> &'static str {
        match self {
            MachineState::Running => "RUNNING",
            MachineState::AwaitingInput => "AWAITING INPUT",
            MachineState::EmittingOutput => "EMITTING OUTPUT",
            MachineState::Halted => "HALTED",
            MachineState::Faulted => "FAULTED",
        }
    }
}

/// Per-machine I/O behaviour
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineConfig {
    /// Block after each output until the driver acknowledges it
    pub pause_on_output: bool,
    /// Value published to the driver before each blocking input read
    pub input_prompt: Option<Cell>,
}

impl MachineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause_on_output(mut self, enabled: bool) -> Self {
        self.pause_on_output = enabled;
        self
    }

    pub fn input_prompt(mut self, prompt: impl Into<Cell>) -> Self {
        self.input_prompt = Some(prompt.into());
        self
    }
}

/// Result of executing a single instruction
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Executed(Opcode),
    Halted,
}

/// The Intcode virtual machine
#[derive(Debug, Clone)]
pub struct Machine {
    /// Initial tape, restored by [`Machine::reset`]
    template: Arc<[Cell]>,

    /// Working memory
    tape: Tape,

    /// Address of the next instruction
    pc: usize,

    /// Added to relative-mode parameters
    relative_base: Cell,

    state: MachineState,

    last_output: Option<Cell>,

    /// The error that moved the machine to `Faulted`
    fault: Option<MachineError>,

    config: MachineConfig,

    /// Instructions executed since creation or the last reset
    steps: u64,
}

impl Machine {
    /// Create a machine from its initial tape
    pub fn new(program: Vec<Cell>) -> Self {
        Self::with_config(program, MachineConfig::default())
    }

    pub fn with_config(program: Vec<Cell>, config: MachineConfig) -> Self {
        let template: Arc<[Cell]> = program.into();
        Machine {
            tape: Tape::new(template.to_vec()),
            template,
            pc: 0,
            relative_base: Cell::zero(),
            state: MachineState::Running,
            last_output: None,
            fault: None,
            config,
            steps: 0,
        }
    }

    /// Run until the program halts.
    ///
    /// Returns the last output produced before halting (the halt signal
    /// payload), or the fault that stopped the machine.
    pub fn run<P: Ports + ?Sized>(&mut self, ports: &mut P) -> Result<Option<Cell>, MachineError> {
        loop {
            if let StepOutcome::Halted = self.step(ports)? {
                return Ok(self.last_output.clone());
            }
        }
    }

    /// Run until the program halts or an input instruction would have to wait.
    ///
    /// When `ports` reports no pending input, the machine stops *before* the
    /// input instruction in state [`MachineState::AwaitingInput`]; calling
    /// this again after input is queued resumes at the same instruction.
    pub fn run_until_blocked<P: Ports + ?Sized>(
        &mut self,
        ports: &mut P,
    ) -> Result<MachineState, MachineError> {
        loop {
            if self.state.is_terminal() {
                self.step(ports)?;
                return Ok(self.state);
            }
            if self.blocked_on_input(ports) {
                return Ok(self.state);
            }
            if let StepOutcome::Halted = self.step(ports)? {
                return Ok(self.state);
            }
        }
    }

    /// Whether the next instruction is an input read `ports` cannot serve yet.
    ///
    /// A blocked machine moves to [`MachineState::AwaitingInput`] without
    /// executing anything.
    pub fn blocked_on_input<P: Ports + ?Sized>(&mut self, ports: &P) -> bool {
        if self.state.is_terminal() || self.next_opcode() != Some(Opcode::Input) {
            return false;
        }
        if ports.input_ready() {
            return false;
        }
        self.state = MachineState::AwaitingInput;
        debug!("machine blocked on input at position {}", self.pc);
        true
    }

    /// Execute one instruction.
    ///
    /// Once halted, further calls return [`StepOutcome::Halted`] without
    /// signalling the ports again. Once faulted, further calls return the
    /// original fault.
    pub fn step<P: Ports + ?Sized>(&mut self, ports: &mut P) -> Result<StepOutcome, MachineError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if self.state == MachineState::Halted {
            return Ok(StepOutcome::Halted);
        }

        let result = decode(&self.tape, self.pc).and_then(|instruction| {
            trace!(
                "pc={} rb={} {:?} {:?}",
                self.pc,
                self.relative_base,
                instruction.opcode,
                instruction.params.iter().map(|p| p.mode).collect::<Vec<_>>()
            );
            self.execute(&instruction, ports)
        });

        match result {
            Ok(outcome) => {
                self.steps += 1;
                Ok(outcome)
            }
            Err(error) => {
                self.state = MachineState::Faulted;
                self.fault = Some(error.clone());
                Err(error)
            }
        }
    }

    fn execute<P: Ports + ?Sized>(
        &mut self,
        instruction: &Instruction,
        ports: &mut P,
    ) -> Result<StepOutcome, MachineError> {
        let params = &instruction.params;
        let base = &self.relative_base;

        match instruction.opcode {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => {
                let a = params[0].load(&self.tape, base)?;
                let b = params[1].load(&self.tape, base)?;
                let value = match instruction.opcode {
                    Opcode::Add => a + b,
                    Opcode::Multiply => a * b,
                    Opcode::LessThan => Self::flag(a < b),
                    _ => Self::flag(a == b),
                };
                self.store(instruction, value)?;
            }

            Opcode::Input => {
                self.state = MachineState::AwaitingInput;
                if let Some(prompt) = &self.config.input_prompt {
                    ports.prompt(prompt)?;
                }
                debug!("machine waiting for input at position {}", self.pc);
                let value = ports.input()?;
                self.store(instruction, value)?;
                self.state = MachineState::Running;
            }

            Opcode::Output => {
                let value = params[0].load(&self.tape, base)?;
                self.state = MachineState::EmittingOutput;
                self.last_output = Some(value.clone());
                ports.output(value)?;
                if self.config.pause_on_output {
                    debug!("machine waiting for output acknowledgment");
                    ports.acknowledge()?;
                }
                self.state = MachineState::Running;
            }

            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let condition = params[0].load(&self.tape, base)?;
                let take = condition.is_zero() == (instruction.opcode == Opcode::JumpIfFalse);
                if take {
                    let target = params[1].load(&self.tape, base)?;
                    self.pc = match locate(&target) {
                        Location::At(addr) => addr,
                        Location::Unbounded | Location::Negative => {
                            return Err(MachineError::InvalidAddress { address: target })
                        }
                    };
                    return Ok(StepOutcome::Executed(instruction.opcode));
                }
            }

            Opcode::AdjustRelativeBase => {
                let delta = params[0].load(&self.tape, base)?;
                self.relative_base += delta;
            }

            Opcode::Halt => {
                self.state = MachineState::Halted;
                debug!("machine halted after {} steps", self.steps + 1);
                ports.halt(self.last_output.as_ref());
                return Ok(StepOutcome::Halted);
            }
        }

        self.pc = self.pc.saturating_add(instruction.length());
        Ok(StepOutcome::Executed(instruction.opcode))
    }

    /// Write through the instruction's destination parameter
    fn store(&mut self, instruction: &Instruction, value: Cell) -> Result<(), MachineError> {
        let destination = instruction
            .opcode
            .write_param()
            .and_then(|i| instruction.params[i].address(&self.relative_base))
            .ok_or_else(|| MachineError::InvalidOpcode {
                instruction: self.tape.read_at(self.pc),
                pc: self.pc,
            })?;
        self.tape.write(&destination, value)
    }

    fn flag(condition: bool) -> Cell {
        if condition {
            Cell::one()
        } else {
            Cell::zero()
        }
    }

    /// Opcode at the program counter, if it decodes
    pub fn next_opcode(&self) -> Option<Opcode> {
        decode(&self.tape, self.pc).ok().map(|i| i.opcode)
    }

    /// Restore the original tape and zero the registers
    pub fn reset(&mut self) {
        self.tape = Tape::new(self.template.to_vec());
        self.pc = 0;
        self.relative_base = Cell::zero();
        self.state = MachineState::Running;
        self.last_output = None;
        self.fault = None;
        self.steps = 0;
        debug!("machine reset to template ({} cells)", self.template.len());
    }

    /// Capture tape, registers and last output
    pub fn save(&self) -> Snapshot {
        Snapshot {
            tape: self.tape.as_slice().to_vec(),
            program_counter: self.pc,
            relative_base: self.relative_base.clone(),
            last_output: self.last_output.clone(),
        }
    }

    /// Replace the execution state with `snapshot`.
    ///
    /// The template and configuration are left untouched; a restored machine
    /// is always runnable, even if it was halted or faulted before.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let Snapshot {
            tape,
            program_counter,
            relative_base,
            last_output,
        } = snapshot;
        self.tape = Tape::new(tape);
        self.pc = program_counter;
        self.relative_base = relative_base;
        self.last_output = last_output;
        self.state = MachineState::Running;
        self.fault = None;
        debug!("machine restored at position {}", self.pc);
    }

    /// Restore `snapshot` as recorded while the machine was in `state`.
    ///
    /// Used when replaying history, where a halted frame must stay halted.
    pub(crate) fn restore_in_state(&mut self, snapshot: Snapshot, state: MachineState) {
        self.restore(snapshot);
        if state != MachineState::Faulted {
            self.state = state;
        }
    }

    // ========== Accessors ==========

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Mutable tape access for drivers that patch a program before running it
    pub fn tape_mut(&mut self) -> &mut Tape {
        &mut self.tape
    }

    pub fn template(&self) -> &[Cell] {
        &self.template
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn relative_base(&self) -> &Cell {
        &self.relative_base
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    pub fn last_output(&self) -> Option<&Cell> {
        self.last_output.as_ref()
    }

    pub fn fault(&self) -> Option<&MachineError> {
        self.fault.as_ref()
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}
