//! Cell representation
//!
//! Every tape cell, operand, input and output is a [`Cell`]: an
//! arbitrary-precision signed integer. Programs may legitimately produce
//! values far beyond the 64-bit range, so no fixed-width type is used anywhere
//! on the data path.

use crate::interpreter::constants::MAX_TAPE_LEN;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

/// A single machine word
pub type Cell = BigInt;

/// Build a cell from a machine integer
pub fn cell(value: i64) -> Cell {
    Cell::from(value)
}

/// Build a vector of cells from machine integers
pub fn cells<I>(values: I) -> Vec<Cell>
where
    I: IntoIterator<Item = i64>,
{
    values.into_iter().map(Cell::from).collect()
}

/// Where a cell points when used as an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// A valid, representable address
    At(usize),
    /// Non-negative but at or beyond [`MAX_TAPE_LEN`]
    Unbounded,
    /// Below zero
    Negative,
}

/// Classify a cell used as an address
pub fn locate(address: &Cell) -> Location {
    if address.is_negative() {
        Location::Negative
    } else {
        match address.to_usize() {
            Some(addr) if addr < MAX_TAPE_LEN => Location::At(addr),
            _ => Location::Unbounded,
        }
    }
}

/// Interpret a cell as a character if it lies in the 7-bit ASCII range
pub fn as_ascii(value: &Cell) -> Option<char> {
    value
        .to_u8()
        .filter(|b| b.is_ascii())
        .map(char::from)
}
