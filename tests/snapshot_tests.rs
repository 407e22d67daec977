// Tests for saving, restoring and persisting machine state

use intcode::interpreter::engine::{Machine, MachineState};
use intcode::interpreter::errors::MachineError;
use intcode::memory::value::{cell, cells};
use intcode::memory::Cell;
use intcode::parser::parse_program;
use intcode::ports::QueuePorts;
use intcode::snapshot::Snapshot;
use std::path::PathBuf;

/// Reads two values and echoes each one doubled
const DOUBLER: &str = "3,20,1002,20,2,20,4,20,3,20,1002,20,2,20,4,20,99";

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("intcode-{}-{}.json", name, std::process::id()))
}

#[test]
fn test_save_and_restore_mid_run() {
    let program = parse_program(DOUBLER).expect("Parsing failed");
    let mut first = Machine::new(program.clone());
    let mut ports = QueuePorts::with_inputs([5]);

    assert_eq!(
        first.run_until_blocked(&mut ports),
        Ok(MachineState::AwaitingInput)
    );
    assert_eq!(ports.drain_outputs(), vec![cell(10)]);

    let snapshot = first.save();
    assert_eq!(snapshot.program_counter, 8);
    assert_eq!(snapshot.last_output, Some(cell(10)));

    let mut second = Machine::new(program);
    second.restore(snapshot);
    assert_eq!(second.pc(), 8);
    assert_eq!(second.last_output(), Some(&cell(10)));

    let mut ports = QueuePorts::with_inputs([21]);
    assert_eq!(second.run(&mut ports), Ok(Some(cell(42))));
    assert_eq!(ports.outputs(), &[cell(42)][..]);
}

#[test]
fn test_restore_preserves_relative_base() {
    let mut m = Machine::new(cells([109, 7, 3, 0, 204, 0, 99, 55]));
    let mut ports = QueuePorts::new();
    m.run_until_blocked(&mut ports).expect("Execution failed");
    let snapshot = m.save();
    assert_eq!(snapshot.relative_base, cell(7));

    let mut resumed = Machine::new(Vec::new());
    resumed.restore(snapshot);
    let mut ports = QueuePorts::with_inputs([13]);
    resumed.run(&mut ports).expect("Execution failed");
    // Input went to tape[0]; relative output reads tape[7]
    assert_eq!(resumed.tape().read_at(0), cell(13));
    assert_eq!(ports.outputs(), &[cell(55)][..]);
}

#[test]
fn test_restore_makes_halted_machine_runnable() {
    let mut m = Machine::new(cells([104, 1, 99]));
    let start = m.save();
    m.run(&mut QueuePorts::new()).expect("Execution failed");
    assert!(m.is_halted());

    m.restore(start);
    assert_eq!(m.state(), MachineState::Running);
    let mut ports = QueuePorts::new();
    m.run(&mut ports).expect("Execution failed");
    assert_eq!(ports.outputs(), &[cell(1)][..]);
}

#[test]
fn test_restore_clears_fault() {
    let mut m = Machine::new(cells([3, 0, 4, 0, 99]));
    let start = m.save();
    assert!(m.run(&mut QueuePorts::new()).is_err());

    m.restore(start);
    assert_eq!(m.fault(), None);
    assert!(m.run(&mut QueuePorts::with_inputs([1])).is_ok());
}

#[test]
fn test_json_round_trip_with_large_values() {
    let huge: Cell = "123456789012345678901234567890123456789"
        .parse()
        .expect("valid integer");
    let snapshot = Snapshot {
        tape: vec![cell(1), huge.clone(), -huge.clone()],
        program_counter: 2,
        relative_base: -huge.clone(),
        last_output: Some(huge),
    };

    let text = snapshot.to_json().expect("serialize failed");
    assert!(text.contains("\"-123456789012345678901234567890123456789\""));
    assert_eq!(Snapshot::from_json(&text), Ok(snapshot));
}

#[test]
fn test_file_persistence() {
    let path = temp_path("persist");
    let mut m = Machine::new(parse_program(DOUBLER).expect("Parsing failed"));
    m.run_until_blocked(&mut QueuePorts::with_inputs([3]))
        .expect("Execution failed");
    m.save().save_to_path(&path).expect("save failed");

    let loaded = Snapshot::load_from_path(&path).expect("load failed");
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, m.save());
}

#[test]
fn test_missing_file_is_persistence_error() {
    let path = temp_path("does-not-exist");
    assert!(matches!(
        Snapshot::load_from_path(&path),
        Err(MachineError::Persistence { .. })
    ));
}

#[test]
fn test_malformed_json_is_persistence_error() {
    for text in ["", "{", r#"{"tape":[1,2],"program_counter":0,"relative_base":"0","last_output":null}"#] {
        assert!(
            matches!(Snapshot::from_json(text), Err(MachineError::Persistence { .. })),
            "{:?} should not load",
            text
        );
    }
}
