//! # SAP-1 Tests
//!
//! Runs the sample programs on the assembled computer and checks register state,
//! cycle counts, memory side effects, halting and reset.

use gatesim_core::cpu::sap1::{Sap1, Sap1State, programs};
use gatesim_core::{Circuit, SimError};
use pretty_assertions::assert_eq;

use crate::common::harness::init_tracing;

const MAX_CYCLES: u64 = 1_000;

fn machine(program: &[u8]) -> (Circuit, Sap1) {
    init_tracing();
    let mut circuit = Circuit::default();
    let cpu = Sap1::with_clock(&mut circuit, 1).unwrap();
    cpu.load(&mut circuit, program).unwrap();
    (circuit, cpu)
}

// ══════════════════════════════════════════════════════════
// 1. Sample programs
// ══════════════════════════════════════════════════════════

#[test]
fn add_program_outputs_the_sum() {
    let (mut circuit, cpu) = machine(programs::ADD);
    let summary = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    assert!(summary.halted);
    assert_eq!(summary.cycles, 20);

    let state = cpu.snapshot(&circuit);
    assert_eq!(
        (state.a, state.b, state.out, state.pc, state.ir),
        (8, 3, 8, 7, 0x1E)
    );
    assert!(state.halted);
    assert_eq!(state.step, 2);
}

#[test]
fn subtract_program_outputs_the_difference() {
    let (mut circuit, cpu) = machine(programs::SUBTRACT);
    let summary = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    assert!(summary.halted);
    assert_eq!(circuit.read(&cpu.out), 7);
}

#[test]
fn subtraction_wraps_below_zero() {
    let (mut circuit, cpu) = machine(&[0x01, 3, 0x02, 5, 0x11, 0x18, 0x1E]);
    let _ = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    assert_eq!(circuit.read(&cpu.out), 0xFE);
}

#[test]
fn memory_program_round_trips_through_ram() {
    let (mut circuit, cpu) = machine(programs::MEMORY);
    let summary = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    assert!(summary.halted);
    assert_eq!(summary.cycles, 32);
    assert_eq!(circuit.read(&cpu.out), 42);
    assert_eq!(circuit.read(&cpu.pc), 11);
    assert_eq!(circuit.memory(cpu.ram).unwrap().read(0x80), 42);
}

#[test]
fn indirect_loads_and_stores_compose() {
    let program = [0x01, 7, 0x05, 0x09, 0x90, 0x0A, 0x90, 0x10, 0x18, 0x1E];
    let (mut circuit, cpu) = machine(&program);
    let summary = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    assert!(summary.halted);
    assert_eq!(circuit.read(&cpu.out), 14);
    assert_eq!(circuit.memory(cpu.ram).unwrap().read(0x90), 7);
}

#[test]
fn halt_program_stops_after_one_instruction() {
    let (mut circuit, cpu) = machine(programs::HALT);
    let summary = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    assert!(summary.halted);
    assert_eq!(summary.cycles, 2);
}

#[test]
fn count_program_loops_until_the_cycle_budget() {
    let (mut circuit, cpu) = machine(programs::COUNT);
    let summary = cpu.run(&mut circuit, 100).unwrap();
    assert!(!summary.halted);
    assert_eq!(summary.cycles, 100);
    assert_eq!(circuit.read(&cpu.out), 7);
}

#[test]
fn every_named_program_resolves() {
    for name in programs::NAMES {
        assert!(programs::by_name(name).is_some(), "{name}");
    }
    assert_eq!(programs::by_name("sub"), Some(programs::SUBTRACT));
    assert_eq!(programs::by_name("fibonacci"), None);
}

// ══════════════════════════════════════════════════════════
// 2. Machine control
// ══════════════════════════════════════════════════════════

#[test]
fn power_up_state_is_all_zero() {
    let (circuit, cpu) = machine(programs::ADD);
    let state = cpu.snapshot(&circuit);
    assert_eq!(
        state,
        Sap1State {
            control: 0x180,
            ..Sap1State::default()
        }
    );
}

#[test]
fn reset_clears_a_halted_machine() {
    let (mut circuit, cpu) = machine(programs::ADD);
    let _ = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    cpu.reset(&mut circuit).unwrap();
    let state = cpu.snapshot(&circuit);
    assert!(!state.halted);
    assert_eq!((state.a, state.b, state.pc, state.out, state.step), (0, 0, 0, 0, 0));

    let summary = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    assert!(summary.halted);
    assert_eq!(summary.cycles, 20);
    assert_eq!(circuit.read(&cpu.out), 8);
}

#[test]
fn halted_machine_ignores_further_runs() {
    let (mut circuit, cpu) = machine(programs::HALT);
    let _ = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    let before = cpu.snapshot(&circuit);
    let summary = cpu.run(&mut circuit, MAX_CYCLES).unwrap();
    assert_eq!(summary.cycles, 0);
    assert_eq!(cpu.snapshot(&circuit), before);
}

#[test]
fn oversized_program_is_rejected() {
    let mut circuit = Circuit::default();
    let cpu = Sap1::with_clock(&mut circuit, 1).unwrap();
    let err = cpu.load(&mut circuit, &[0; 300]).unwrap_err();
    assert!(matches!(
        err,
        SimError::LoadOutOfRange {
            len: 300,
            size: 256,
            ..
        }
    ));
}
