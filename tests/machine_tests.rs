// Integration tests for the Intcode machine

use intcode::interpreter::engine::{Machine, MachineConfig, MachineState, StepOutcome};
use intcode::interpreter::errors::{MachineError, Port};
use intcode::memory::value::{cell, cells};
use intcode::memory::Cell;
use intcode::parser::parse_program;
use intcode::ports::QueuePorts;

const QUINE: &str = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";

const AROUND_EIGHT: &str = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,999,1105,1,46,1101,1000,1,20,4,20,\
1105,1,46,98,99";

const FEEDBACK: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,\
1005,28,6,99,0,0,5";

fn machine(text: &str) -> Machine {
    Machine::new(parse_program(text).expect("Parsing failed"))
}

/// Run `text` to halt with the given inputs and return every output
fn outputs_of(text: &str, inputs: &[i64]) -> Vec<Cell> {
    let mut m = machine(text);
    let mut ports = QueuePorts::with_inputs(inputs.iter().copied());
    let result = m.run(&mut ports);
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    ports.drain_outputs()
}

#[test]
fn test_arithmetic_programs_rewrite_tape() {
    let cases: [(&str, Vec<i64>); 5] = [
        ("1,9,10,3,2,3,11,0,99,30,40,50", vec![3500, 9, 10, 70, 2, 3, 11, 0, 99, 30, 40, 50]),
        ("1,0,0,0,99", vec![2, 0, 0, 0, 99]),
        ("2,3,0,3,99", vec![2, 3, 0, 6, 99]),
        ("2,4,4,5,99,0", vec![2, 4, 4, 5, 99, 9801]),
        ("1,1,1,4,99,5,6,0,99", vec![30, 1, 1, 4, 2, 5, 6, 0, 99]),
    ];

    for (text, expected) in cases {
        let mut m = machine(text);
        m.run(&mut QueuePorts::new()).expect("Execution failed");
        assert_eq!(m.tape().as_slice(), &cells(expected)[..], "program {}", text);
        assert_eq!(m.state(), MachineState::Halted);
    }
}

#[test]
fn test_self_modifying_modes() {
    let mut m = machine("1002,4,3,4,33");
    m.run(&mut QueuePorts::new()).expect("Execution failed");
    assert_eq!(m.tape().as_slice(), &cells([1002, 4, 3, 4, 99])[..]);

    let mut m = machine("1101,100,-1,4,0");
    m.run(&mut QueuePorts::new()).expect("Execution failed");
    assert_eq!(m.tape().read_at(4), cell(99));
}

#[test]
fn test_quine() {
    let expected = parse_program(QUINE).expect("Parsing failed");
    assert_eq!(outputs_of(QUINE, &[]), expected);
}

#[test]
fn test_large_numbers() {
    assert_eq!(
        outputs_of("1102,34915192,34915192,7,4,7,99,0", &[]),
        vec![cell(1219070632396864)]
    );
    assert_eq!(
        outputs_of("104,1125899906842624,99", &[]),
        vec![cell(1125899906842624)]
    );
}

#[test]
fn test_values_beyond_64_bits() {
    // [14] = [13] * 1; [14] = [14] * [14]; out [14]
    let program = cells([1002, 13, 1, 14, 2, 14, 14, 14, 4, 14, 99, 0, 0, 1 << 62, 0]);
    let mut m = Machine::new(program);
    let mut ports = QueuePorts::new();
    m.run(&mut ports).expect("Execution failed");

    let expected = Cell::from(1u8) << 124usize;
    assert_eq!(ports.outputs(), &[expected][..]);
}

#[test]
fn test_comparisons() {
    let programs = [
        ("3,9,8,9,10,9,4,9,99,-1,8", [0, 1, 0]),
        ("3,9,7,9,10,9,4,9,99,-1,8", [1, 0, 0]),
        ("3,3,1108,-1,8,3,4,3,99", [0, 1, 0]),
        ("3,3,1107,-1,8,3,4,3,99", [1, 0, 0]),
    ];
    for (text, expected) in programs {
        for (input, want) in [7, 8, 9].into_iter().zip(expected) {
            assert_eq!(
                outputs_of(text, &[input]),
                vec![cell(want)],
                "program {} input {}",
                text,
                input
            );
        }
    }
}

#[test]
fn test_jumps() {
    for text in [
        "3,12,6,12,15,1,13,14,13,4,13,99,-1,0,1,9",
        "3,3,1105,-1,9,1101,0,0,12,4,12,99,1",
    ] {
        assert_eq!(outputs_of(text, &[0]), vec![cell(0)]);
        assert_eq!(outputs_of(text, &[5]), vec![cell(1)]);
        assert_eq!(outputs_of(text, &[-3]), vec![cell(1)]);
    }
}

#[test]
fn test_compare_to_eight() {
    assert_eq!(outputs_of(AROUND_EIGHT, &[5]), vec![cell(999)]);
    assert_eq!(outputs_of(AROUND_EIGHT, &[8]), vec![cell(1000)]);
    assert_eq!(outputs_of(AROUND_EIGHT, &[11]), vec![cell(1001)]);
}

#[test]
fn test_relative_base() {
    let mut m = Machine::new(cells([109, 2000, 109, 19, 204, -34, 99]));
    m.tape_mut()
        .write(&cell(1985), cell(77))
        .expect("write failed");
    let mut ports = QueuePorts::new();
    m.run(&mut ports).expect("Execution failed");

    assert_eq!(ports.outputs(), &[cell(77)][..]);
    assert_eq!(m.relative_base(), &cell(2019));
}

#[test]
fn test_memory_grows_on_write() {
    // Input stored far past the end of a five-cell program
    let mut m = Machine::new(cells([3, 1000, 4, 1000, 99]));
    let mut ports = QueuePorts::with_inputs([42]);
    m.run(&mut ports).expect("Execution failed");

    assert_eq!(m.tape().len(), 1001);
    assert_eq!(m.tape().read_at(1000), cell(42));
    assert_eq!(m.tape().read_at(500), cell(0));
    assert_eq!(ports.outputs(), &[cell(42)][..]);
}

#[test]
fn test_halt_returns_last_output() {
    let mut m = machine("104,3,104,4,99");
    let mut ports = QueuePorts::new();
    let last = m.run(&mut ports).expect("Execution failed");

    assert_eq!(last, Some(cell(4)));
    assert_eq!(ports.halt_signal(), Some(&Some(cell(4))));
    assert_eq!(m.last_output(), Some(&cell(4)));

    // Stepping a halted machine is a no-op
    assert_eq!(m.step(&mut ports), Ok(StepOutcome::Halted));
    assert_eq!(m.pc(), 4);
}

#[test]
fn test_halt_without_output() {
    let mut m = machine("99");
    let mut ports = QueuePorts::new();
    assert_eq!(m.run(&mut ports), Ok(None));
    assert_eq!(ports.halt_signal(), Some(&None));
}

#[test]
fn test_invalid_opcode() {
    let mut m = machine("1101,1,1,0,42");
    let err = m.run(&mut QueuePorts::new()).unwrap_err();
    assert_eq!(
        err,
        MachineError::InvalidOpcode {
            instruction: cell(42),
            pc: 4
        }
    );
    assert_eq!(m.state(), MachineState::Faulted);
    assert_eq!(m.fault(), Some(&err));

    // A faulted machine keeps reporting the same fault
    assert_eq!(m.step(&mut QueuePorts::new()), Err(err));
}

#[test]
fn test_running_off_the_end() {
    let mut m = machine("1101,1,1,5");
    let err = m.run(&mut QueuePorts::new()).unwrap_err();
    assert_eq!(
        err,
        MachineError::InvalidOpcode {
            instruction: cell(0),
            pc: 4
        }
    );
}

#[test]
fn test_negative_address() {
    let mut m = machine("4,-1,99");
    assert_eq!(
        m.run(&mut QueuePorts::new()),
        Err(MachineError::InvalidAddress { address: cell(-1) })
    );

    // Relative writes below zero
    let mut m = machine("109,-10,21101,1,1,0,99");
    assert_eq!(
        m.run(&mut QueuePorts::new()),
        Err(MachineError::InvalidAddress { address: cell(-10) })
    );
}

#[test]
fn test_jump_to_negative_target() {
    let mut m = machine("1105,1,-5");
    assert_eq!(
        m.run(&mut QueuePorts::new()),
        Err(MachineError::InvalidAddress { address: cell(-5) })
    );
}

#[test]
fn test_write_far_beyond_memory_faults() {
    // 2^62 fits in usize but can never be backed by memory
    let mut m = machine("1101,1,1,4611686018427387904,99");
    assert_eq!(
        m.run(&mut QueuePorts::new()),
        Err(MachineError::InvalidAddress {
            address: Cell::from(1u64 << 62)
        })
    );
    assert_eq!(m.state(), MachineState::Faulted);
    assert_eq!(m.tape().len(), 5);

    // Reads from the same address are zero
    let mut m = machine("4,4611686018427387904,99");
    let mut ports = QueuePorts::new();
    m.run(&mut ports).expect("Execution failed");
    assert_eq!(ports.outputs(), &[cell(0)][..]);
    assert_eq!(m.tape().len(), 3);
}

#[test]
fn test_jump_far_beyond_memory_faults() {
    let mut m = machine("1105,1,18446744073709551615");
    assert_eq!(
        m.run(&mut QueuePorts::new()),
        Err(MachineError::InvalidAddress {
            address: Cell::from(u64::MAX)
        })
    );
    assert_eq!(m.pc(), 0);
}

#[test]
fn test_immediate_write_target() {
    let mut m = machine("11101,1,1,5,99");
    assert!(matches!(
        m.run(&mut QueuePorts::new()),
        Err(MachineError::InvalidOpcode { pc: 0, .. })
    ));
}

#[test]
fn test_input_exhausted_closes_port() {
    let mut m = machine("3,0,99");
    assert_eq!(
        m.run(&mut QueuePorts::new()),
        Err(MachineError::PortClosed { port: Port::Input })
    );
}

#[test]
fn test_run_until_blocked_resumes_on_input() {
    let mut m = machine("3,9,8,9,10,9,4,9,99,-1,8");
    let mut ports = QueuePorts::new();

    assert_eq!(m.run_until_blocked(&mut ports), Ok(MachineState::AwaitingInput));
    assert_eq!(m.pc(), 0);
    assert!(ports.outputs().is_empty());

    ports.push_input(8);
    assert_eq!(m.run_until_blocked(&mut ports), Ok(MachineState::Halted));
    assert_eq!(ports.outputs(), &[cell(1)][..]);
}

#[test]
fn test_input_prompt() {
    let config = MachineConfig::new().input_prompt(-1);
    let program = parse_program("3,0,3,0,4,0,99").expect("Parsing failed");
    let mut m = Machine::with_config(program, config);
    let mut ports = QueuePorts::with_inputs([5, 6]);
    m.run(&mut ports).expect("Execution failed");

    assert_eq!(ports.prompts(), 2);
    assert_eq!(ports.outputs(), &[cell(6)][..]);
}

#[test]
fn test_no_prompt_by_default() {
    let mut ports = QueuePorts::with_inputs([5]);
    machine("3,0,99").run(&mut ports).expect("Execution failed");
    assert_eq!(ports.prompts(), 0);
}

#[test]
fn test_reset_restores_template() {
    let mut m = machine("3,0,4,0,99");
    m.run(&mut QueuePorts::with_inputs([7])).expect("Execution failed");
    assert_eq!(m.tape().read_at(0), cell(7));

    m.reset();
    assert_eq!(m.tape().as_slice(), m.template());
    assert_eq!(m.pc(), 0);
    assert_eq!(m.relative_base(), &cell(0));
    assert_eq!(m.state(), MachineState::Running);
    assert_eq!(m.last_output(), None);
    assert_eq!(m.steps(), 0);

    let mut ports = QueuePorts::with_inputs([9]);
    m.run(&mut ports).expect("Execution failed");
    assert_eq!(ports.outputs(), &[cell(9)][..]);
}

#[test]
fn test_reset_clears_fault() {
    let mut m = machine("3,0,99");
    assert!(m.run(&mut QueuePorts::new()).is_err());
    m.reset();
    assert_eq!(m.fault(), None);
    assert!(m.run(&mut QueuePorts::with_inputs([1])).is_ok());
}

#[test]
fn test_feedback_loop_single_threaded() {
    let phases = [9, 8, 7, 6, 5];
    let program = parse_program(FEEDBACK).expect("Parsing failed");
    let mut amps: Vec<Machine> = phases.iter().map(|_| Machine::new(program.clone())).collect();
    let mut ports: Vec<QueuePorts> = phases.iter().map(|&p| QueuePorts::with_inputs([p])).collect();
    ports[0].push_input(0);

    let mut signal = None;
    while !amps[4].is_halted() {
        for i in 0..amps.len() {
            amps[i].run_until_blocked(&mut ports[i]).expect("Execution failed");
            let outputs = ports[i].drain_outputs();
            if i == 4 {
                signal = outputs.last().cloned().or(signal);
            }
            ports[(i + 1) % 5].extend_inputs(outputs);
        }
    }

    assert_eq!(signal, Some(cell(139629729)));
}
