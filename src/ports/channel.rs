//! Machines on their own threads
//!
//! [`spawn`] moves a [`Machine`] onto a worker thread and returns a
//! [`MachineHandle`] for the driver. Engine-to-driver traffic (outputs, input
//! prompts and the final halt or fault) travels on one ordered event channel,
//! so a driver can wait on "whatever the machine does next" without polling
//! several queues. Driver-to-engine traffic uses two channels: input values
//! and output acknowledgments.
//!
//! # Suspension
//!
//! The worker blocks in exactly two places: reading input while none is
//! queued, and (with the handshake enabled) after an output until
//! [`MachineHandle::ack`] is called. Neither wait has a timeout. Dropping the
//! handle, or calling [`MachineHandle::close_input`], closes the driver's end;
//! the worker then faults with
//! [`MachineError::PortClosed`] at its next suspension point.
//!
//! # Queue bounds
//!
//! [`spawn`] uses unbounded queues: outputs never block the worker when the
//! handshake is off, and a driver that falls behind lets the event queue grow.
//! [`spawn_bounded`] caps both the input and the event queue at `capacity`;
//! the worker then blocks on a full event queue, and
//! [`MachineHandle::send`] blocks on a full input queue.

use super::Ports;
use crate::interpreter::engine::Machine;
use crate::interpreter::errors::{MachineError, Port};
use crate::memory::Cell;
use log::{debug, warn};
use std::sync::mpsc::{
    self, Receiver, RecvTimeoutError, SendError, Sender, SyncSender, TryRecvError,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Something the machine did, in the order it did it
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An input read is pending (only with an input prompt configured)
    Prompt(Cell),
    Output(Cell),
    /// The program halted; carries the last output, if any
    Halted(Option<Cell>),
    Faulted(MachineError),
}

/// Sending half of a queue that may be bounded
#[derive(Debug)]
enum Outbox<T> {
    Unbounded(Sender<T>),
    Bounded(SyncSender<T>),
}

impl<T> Outbox<T> {
    fn send(&self, value: T) -> Result<(), SendError<T>> {
        match self {
            Outbox::Unbounded(tx) => tx.send(value),
            Outbox::Bounded(tx) => tx.send(value),
        }
    }
}

fn queue<T>(capacity: Option<usize>) -> (Outbox<T>, Receiver<T>) {
    match capacity {
        Some(bound) => {
            let (tx, rx) = mpsc::sync_channel(bound);
            (Outbox::Bounded(tx), rx)
        }
        None => {
            let (tx, rx) = mpsc::channel();
            (Outbox::Unbounded(tx), rx)
        }
    }
}

/// Engine-side endpoints
#[derive(Debug)]
pub struct ChannelPorts {
    input: Receiver<Cell>,
    acks: Receiver<()>,
    events: Outbox<Event>,
    halted: bool,
}

impl ChannelPorts {
    fn emit(&self, event: Event) -> Result<(), MachineError> {
        self.events
            .send(event)
            .map_err(|_| MachineError::PortClosed { port: Port::Output })
    }
}

impl Ports for ChannelPorts {
    fn input(&mut self) -> Result<Cell, MachineError> {
        self.input
            .recv()
            .map_err(|_| MachineError::PortClosed { port: Port::Input })
    }

    fn output(&mut self, value: Cell) -> Result<(), MachineError> {
        self.emit(Event::Output(value))
    }

    fn acknowledge(&mut self) -> Result<(), MachineError> {
        self.acks.recv().map_err(|_| MachineError::PortClosed {
            port: Port::Acknowledge,
        })
    }

    fn prompt(&mut self, prompt: &Cell) -> Result<(), MachineError> {
        self.emit(Event::Prompt(prompt.clone()))
    }

    fn halt(&mut self, last_output: Option<&Cell>) {
        self.halted = true;
        if self.emit(Event::Halted(last_output.cloned())).is_err() {
            debug!("halt signal dropped: driver is gone");
        }
    }
}

/// Driver-side endpoints of a spawned machine
#[derive(Debug)]
pub struct MachineHandle {
    input: Option<Outbox<Cell>>,
    acks: Option<Sender<()>>,
    events: Receiver<Event>,
    worker: Option<JoinHandle<Machine>>,
    pause_on_output: bool,
}

/// Run `machine` on a new thread with unbounded queues
pub fn spawn(machine: Machine) -> MachineHandle {
    launch(machine, None)
}

/// Run `machine` on a new thread, holding at most `capacity` queued inputs
/// and `capacity` undelivered events
pub fn spawn_bounded(machine: Machine, capacity: usize) -> MachineHandle {
    launch(machine, Some(capacity))
}

fn launch(machine: Machine, capacity: Option<usize>) -> MachineHandle {
    let (input_tx, input_rx) = queue(capacity);
    let (ack_tx, ack_rx) = mpsc::channel();
    let (event_tx, event_rx) = queue(capacity);

    let pause_on_output = machine.config().pause_on_output;
    let mut ports = ChannelPorts {
        input: input_rx,
        acks: ack_rx,
        events: event_tx,
        halted: false,
    };

    let worker = thread::spawn(move || {
        let mut machine = machine;
        match machine.run(&mut ports) {
            Ok(last_output) => {
                // A machine spawned after halting still owes its driver a signal
                if !ports.halted {
                    ports.halt(last_output.as_ref());
                }
            }
            Err(error) => {
                match &error {
                    MachineError::PortClosed { .. } => {
                        debug!("machine cancelled at position {}: {}", machine.pc(), error)
                    }
                    _ => warn!("machine faulted at position {}: {}", machine.pc(), error),
                }
                if ports.emit(Event::Faulted(error)).is_err() {
                    debug!("fault signal dropped: driver is gone");
                }
            }
        }
        machine
    });

    MachineHandle {
        input: Some(input_tx),
        acks: Some(ack_tx),
        events: event_rx,
        worker: Some(worker),
        pause_on_output,
    }
}

impl MachineHandle {
    /// Queue one input value
    pub fn send(&self, value: impl Into<Cell>) -> Result<(), MachineError> {
        let closed = MachineError::PortClosed { port: Port::Input };
        match &self.input {
            Some(input) => input.send(value.into()).map_err(|_| closed),
            None => Err(closed),
        }
    }

    /// Queue several input values in order
    pub fn send_all<I>(&self, values: I) -> Result<(), MachineError>
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        values.into_iter().try_for_each(|value| self.send(value))
    }

    /// Acknowledge the last output ("output processed")
    pub fn ack(&self) -> Result<(), MachineError> {
        let closed = MachineError::PortClosed {
            port: Port::Acknowledge,
        };
        match &self.acks {
            Some(acks) => acks.send(()).map_err(|_| closed),
            None => Err(closed),
        }
    }

    /// Block until the machine's next event
    pub fn recv(&self) -> Result<Event, MachineError> {
        self.events
            .recv()
            .map_err(|_| MachineError::PortClosed { port: Port::Halt })
    }

    /// Next event if one is already queued
    pub fn try_recv(&self) -> Result<Option<Event>, MachineError> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(MachineError::PortClosed { port: Port::Halt }),
        }
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Event>, MachineError> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(MachineError::PortClosed { port: Port::Halt })
            }
        }
    }

    /// Block until the next output, skipping prompts.
    ///
    /// Returns `None` once the machine halts and the fault if it faults. With
    /// the handshake enabled the caller still has to [`ack`](Self::ack).
    pub fn next_output(&self) -> Result<Option<Cell>, MachineError> {
        loop {
            match self.recv()? {
                Event::Prompt(_) => continue,
                Event::Output(value) => return Ok(Some(value)),
                Event::Halted(_) => return Ok(None),
                Event::Faulted(error) => return Err(error),
            }
        }
    }

    /// Collect outputs until halt, acknowledging each one if the handshake
    /// is enabled
    pub fn collect_outputs(&self) -> Result<Vec<Cell>, MachineError> {
        let mut outputs = Vec::new();
        while let Some(value) = self.next_output()? {
            outputs.push(value);
            if self.pause_on_output {
                self.ack()?;
            }
        }
        Ok(outputs)
    }

    /// Whether the spawned machine waits for [`ack`](Self::ack) after outputs
    pub fn pauses_on_output(&self) -> bool {
        self.pause_on_output
    }

    /// Close the input port; a pending or future read faults the machine
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Close every driver-side port and wait for the worker to finish.
    ///
    /// Undelivered events are discarded. A machine blocked on input or
    /// acknowledgment, or still producing output, is cancelled with
    /// [`MachineError::PortClosed`]. Returns the machine in its final state.
    pub fn join(self) -> Result<Machine, MachineError> {
        let MachineHandle {
            input,
            acks,
            events,
            worker,
            ..
        } = self;
        drop(input);
        drop(acks);
        drop(events);
        match worker {
            Some(worker) => worker.join().map_err(|_| MachineError::WorkerPanicked),
            None => Err(MachineError::WorkerPanicked),
        }
    }
}
