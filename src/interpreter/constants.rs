// Constants for the Intcode machine

/// The opcode occupies the two low decimal digits of an instruction cell
pub const OPCODE_MODULUS: u32 = 100;

/// Each parameter mode is one decimal digit above the opcode
pub const MODE_RADIX: u32 = 10;

/// Upper bound on instructions executed by a single "run to end" request in
/// the monitor, so a looping program cannot freeze the UI
pub const RUN_STEP_LIMIT: usize = 100_000;

/// Default execution history budget for the monitor (256 MB)
pub const DEFAULT_HISTORY_LIMIT: usize = 256 * 1024 * 1024;

/// Highest tape length a program may grow to (16M cells). Addresses at or
/// above it read as zero and cannot be written or jumped to.
pub const MAX_TAPE_LEN: usize = 1 << 24;
