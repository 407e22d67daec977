// Snapshot management for suspend/resume and reverse execution

use crate::interpreter::engine::MachineState;
use crate::interpreter::errors::MachineError;
use crate::memory::Cell;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Saved machine state.
///
/// Persisted as a JSON object with four fields. Cells are written as decimal
/// strings so values beyond the 64-bit range survive the round trip:
///
/// ```text
/// {"tape":["109","1","204"],"program_counter":2,"relative_base":"1","last_output":null}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(with = "decimal::list")]
    pub tape: Vec<Cell>,
    pub program_counter: usize,
    #[serde(with = "decimal")]
    pub relative_base: Cell,
    #[serde(with = "decimal::option")]
    pub last_output: Option<Cell>,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        // BigInt keeps a Vec of u64 digits: 24 bytes of header plus the digits
        let cell_size = |c: &Cell| 24 + (c.bits() as usize).div_ceil(64) * 8;
        let tape_size: usize = self.tape.iter().map(cell_size).sum();
        let last = self.last_output.as_ref().map(cell_size).unwrap_or(0);

        tape_size + cell_size(&self.relative_base) + last + 8
    }

    pub fn to_json(&self) -> Result<String, MachineError> {
        serde_json::to_string(self).map_err(persistence)
    }

    pub fn from_json(text: &str) -> Result<Self, MachineError> {
        serde_json::from_str(text).map_err(persistence)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), MachineError> {
        serde_json::to_writer(writer, self).map_err(persistence)
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Self, MachineError> {
        serde_json::from_reader(reader).map_err(persistence)
    }

    /// Write the snapshot to `path`, replacing any existing file
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), MachineError> {
        let file = File::create(path.as_ref()).map_err(persistence)?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)?;
        writer.flush().map_err(persistence)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, MachineError> {
        let file = File::open(path.as_ref()).map_err(persistence)?;
        Self::read_json(BufReader::new(file))
    }
}

fn persistence(error: impl std::fmt::Display) -> MachineError {
    MachineError::Persistence {
        message: error.to_string(),
    }
}

/// Serde adapters writing cells as decimal strings
mod decimal {
    use crate::memory::Cell;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    fn parse<E: Error>(text: &str) -> Result<Cell, E> {
        text.parse()
            .map_err(|_| E::custom(format!("invalid integer '{}'", text)))
    }

    pub fn serialize<S: Serializer>(value: &Cell, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cell, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text)
    }

    pub mod list {
        use super::*;
        use serde::ser::SerializeSeq;

        pub fn serialize<S: Serializer>(values: &[Cell], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for value in values {
                seq.serialize_element(&value.to_string())?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Cell>, D::Error> {
            let texts = Vec::<String>::deserialize(deserializer)?;
            texts.iter().map(|t| parse(t)).collect()
        }
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<Cell>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(&v.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Cell>, D::Error> {
            let text = Option::<String>::deserialize(deserializer)?;
            text.as_deref().map(parse).transpose()
        }
    }
}

/// One step of recorded execution history
#[derive(Debug, Clone)]
pub struct HistoryFrame {
    pub snapshot: Snapshot,
    pub state: MachineState,
    /// Inputs consumed when this frame was taken
    pub input_cursor: usize,
    /// Outputs produced when this frame was taken
    pub output_count: usize,
}

impl HistoryFrame {
    pub fn estimated_size(&self) -> usize {
        self.snapshot.estimated_size() + 3 * std::mem::size_of::<usize>()
    }
}

/// Manages execution history for reverse execution
#[derive(Debug)]
pub struct SnapshotManager {
    frames: Vec<HistoryFrame>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            frames: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a frame to history
    pub fn push(&mut self, frame: HistoryFrame) -> Result<(), MachineError> {
        let frame_size = frame.estimated_size();

        if self.current_memory + frame_size > self.max_memory {
            return Err(MachineError::SnapshotLimitExceeded {
                current: self.current_memory,
                limit: self.max_memory,
            });
        }

        self.current_memory += frame_size;
        self.frames.push(frame);
        Ok(())
    }

    /// Drop every frame after `index`
    pub fn truncate_after(&mut self, index: usize) {
        while self.frames.len() > index + 1 {
            if let Some(frame) = self.frames.pop() {
                self.current_memory -= frame.estimated_size();
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&HistoryFrame> {
        self.frames.get(index)
    }

    pub fn last(&self) -> Option<&HistoryFrame> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}
