//! Growable tape memory
//!
//! The tape is a dense vector of [`Cell`]s. Growth goes through
//! [`Vec::resize`], so repeated writes past the end reallocate geometrically
//! rather than once per cell. The tape never grows past
//! [`MAX_TAPE_LEN`](crate::interpreter::constants::MAX_TAPE_LEN) cells.

use super::value::{locate, Cell, Location};
use crate::interpreter::errors::MachineError;
use num_traits::Zero;

/// The machine's linear memory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tape {
    cells: Vec<Cell>,
}

impl Tape {
    pub fn new(cells: Vec<Cell>) -> Self {
        Tape { cells }
    }

    /// Current high-water mark
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read the cell at `address`.
    ///
    /// Addresses at or beyond the current length read as zero.
    pub fn read(&self, address: &Cell) -> Result<Cell, MachineError> {
        match locate(address) {
            Location::At(addr) => Ok(self.read_at(addr)),
            Location::Unbounded => Ok(Cell::zero()),
            Location::Negative => Err(MachineError::InvalidAddress {
                address: address.clone(),
            }),
        }
    }

    /// Write `value` at `address`, growing the tape as needed.
    pub fn write(&mut self, address: &Cell, value: Cell) -> Result<(), MachineError> {
        match locate(address) {
            Location::At(addr) => {
                self.write_at(addr, value);
                Ok(())
            }
            Location::Unbounded | Location::Negative => Err(MachineError::InvalidAddress {
                address: address.clone(),
            }),
        }
    }

    /// Read by native index; never fails
    pub fn read_at(&self, addr: usize) -> Cell {
        self.cells.get(addr).cloned().unwrap_or_else(Cell::zero)
    }

    /// Write by native index, zero-filling any gap. `addr` is below
    /// `MAX_TAPE_LEN`.
    fn write_at(&mut self, addr: usize, value: Cell) {
        if addr >= self.cells.len() {
            self.cells.resize(addr + 1, Cell::zero());
        }
        self.cells[addr] = value;
    }

    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }
}

impl From<Vec<Cell>> for Tape {
    fn from(cells: Vec<Cell>) -> Self {
        Tape::new(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::constants::MAX_TAPE_LEN;
    use crate::memory::value::{cell, cells};

    #[test]
    fn test_read_past_end_is_zero() {
        let tape = Tape::new(cells([1, 2, 3]));
        assert_eq!(tape.read(&cell(2)).unwrap(), cell(3));
        assert_eq!(tape.read(&cell(3)).unwrap(), cell(0));
        assert_eq!(tape.read(&cell(1_000_000)).unwrap(), cell(0));
        assert_eq!(tape.len(), 3);
    }

    #[test]
    fn test_write_grows_and_zero_fills() {
        let mut tape = Tape::new(cells([7]));
        tape.write(&cell(5), cell(42)).unwrap();

        assert_eq!(tape.len(), 6);
        assert_eq!(tape.as_slice(), cells([7, 0, 0, 0, 0, 42]).as_slice());
    }

    #[test]
    fn test_negative_address_rejected() {
        let mut tape = Tape::new(cells([1]));

        assert!(matches!(
            tape.read(&cell(-1)),
            Err(MachineError::InvalidAddress { .. })
        ));
        assert!(matches!(
            tape.write(&cell(-3), cell(1)),
            Err(MachineError::InvalidAddress { .. })
        ));
        // Failed write must not touch the tape
        assert_eq!(tape.as_slice(), cells([1]).as_slice());
    }

    #[test]
    fn test_unbounded_address() {
        let huge: Cell = "123456789012345678901234567890".parse().unwrap();
        let mut tape = Tape::default();

        assert_eq!(tape.read(&huge).unwrap(), cell(0));
        assert!(tape.write(&huge, cell(1)).is_err());
    }

    #[test]
    fn test_write_at_ceiling_rejected() {
        let mut tape = Tape::new(cells([1]));
        let ceiling = Cell::from(MAX_TAPE_LEN);

        assert_eq!(tape.read(&ceiling).unwrap(), cell(0));
        assert_eq!(
            tape.write(&ceiling, cell(5)),
            Err(MachineError::InvalidAddress {
                address: ceiling.clone()
            })
        );
        assert_eq!(tape.len(), 1);
    }
}
