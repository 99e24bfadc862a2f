//! SAP-1: an 8-bit microcoded computer built from the component library.
//!
//! The machine is assembled only from library parts:
//! 1. **Datapath:** One shared 8-bit bus; A, B, IR, MAR and OUT registers; a program counter
//!    (incrementer plus load multiplexer); an add/subtract ALU computing `A + (B ^ SUB) + SUB`.
//! 2. **Memory:** 256 bytes of bidirectional RAM clocked on the inverted CPU clock, so it
//!    reads and writes in the middle of each cycle against a settled control word.
//! 3. **Control:** A microcode control unit with 5-bit opcodes (the low bits of IR), eight
//!    steps per instruction and a 16-bit control word.
//! 4. **Halt:** The HALT line sets a latch that gates the CPU clock off until reset.
//!
//! Instructions are one byte, optionally followed by an operand byte:
//!
//! | Opcode | Mnemonic     | Effect                  |
//! |--------|--------------|-------------------------|
//! | `0x00` | `NOP`        |                         |
//! | `0x01` | `LDA #imm`   | `A = imm`               |
//! | `0x02` | `LDB #imm`   | `B = imm`               |
//! | `0x04` | `MOV A,B`    | `A = B`                 |
//! | `0x05` | `MOV B,A`    | `B = A`                 |
//! | `0x08` | `STA addr`   | `mem[addr] = A`         |
//! | `0x09` | `STB addr`   | `mem[addr] = B`         |
//! | `0x0A` | `LDA [addr]` | `A = mem[addr]`         |
//! | `0x0B` | `LDB [addr]` | `B = mem[addr]`         |
//! | `0x10` | `ADD`        | `A = A + B`             |
//! | `0x11` | `SUB`        | `A = A - B`             |
//! | `0x18` | `OUT`        | `OUT = A`               |
//! | `0x1E` | `HLT`        | stop the clock          |
//! | `0x1F` | `JMP addr`   | `PC = addr`             |

use serde::Serialize;
use tracing::{debug, info};

use crate::circuit::{Circuit, ComponentId};
use crate::common::SimResult;
use crate::logic::memory::Memory;
use crate::microcode::{MicrocodeBuilder, MicrocodeTable};
use crate::net::{Bus, Wire};

/// Width of the data bus and registers.
pub const WORD_BITS: usize = 8;
/// Width of the opcode field.
pub const OPCODE_BITS: usize = 5;
/// Width of the step counter.
pub const STEP_BITS: usize = 3;
/// Width of the control word, one bit per line in [`ctl`].
pub const CONTROL_BITS: usize = 15;

/// Control lines, one bit each.
pub mod ctl {
    /// A register loads from the bus.
    pub const A_IN: u64 = 1 << 0;
    /// A register drives the bus.
    pub const A_OUT: u64 = 1 << 1;
    /// B register loads from the bus.
    pub const B_IN: u64 = 1 << 2;
    /// B register drives the bus.
    pub const B_OUT: u64 = 1 << 3;
    /// Instruction register loads from the bus.
    pub const IR_IN: u64 = 1 << 4;
    /// Program counter increments.
    pub const PC_INC: u64 = 1 << 5;
    /// Program counter loads from the bus.
    pub const PC_IN: u64 = 1 << 6;
    /// Program counter drives the bus.
    pub const PC_OUT: u64 = 1 << 7;
    /// Memory address register loads from the bus.
    pub const MAR_IN: u64 = 1 << 8;
    /// RAM stores the bus at MAR.
    pub const RAM_IN: u64 = 1 << 9;
    /// RAM drives the bus with the word at MAR.
    pub const RAM_OUT: u64 = 1 << 10;
    /// ALU result drives the bus.
    pub const ALU_OUT: u64 = 1 << 11;
    /// ALU subtracts instead of adding.
    pub const ALU_SUB: u64 = 1 << 12;
    /// Output register loads from the bus.
    pub const OUT_IN: u64 = 1 << 13;
    /// Stops the CPU clock.
    pub const HALT: u64 = 1 << 14;
}

/// Opcodes.
pub mod op {
    /// No operation.
    pub const NOP: u64 = 0x00;
    /// Load A with the next byte.
    pub const LDA_IMM: u64 = 0x01;
    /// Load B with the next byte.
    pub const LDB_IMM: u64 = 0x02;
    /// Copy B into A.
    pub const MOV_AB: u64 = 0x04;
    /// Copy A into B.
    pub const MOV_BA: u64 = 0x05;
    /// Store A at the address in the next byte.
    pub const STA: u64 = 0x08;
    /// Store B at the address in the next byte.
    pub const STB: u64 = 0x09;
    /// Load A from the address in the next byte.
    pub const LDA_MEM: u64 = 0x0A;
    /// Load B from the address in the next byte.
    pub const LDB_MEM: u64 = 0x0B;
    /// A = A + B.
    pub const ADD: u64 = 0x10;
    /// A = A - B.
    pub const SUB: u64 = 0x11;
    /// Copy A to the output register.
    pub const OUT: u64 = 0x18;
    /// Halt.
    pub const HLT: u64 = 0x1E;
    /// Jump to the address in the next byte.
    pub const JMP: u64 = 0x1F;
}

/// Sample programs.
pub mod programs {
    /// `5 + 3`, leaving 8 in OUT.
    pub const ADD: &[u8] = &[0x01, 5, 0x02, 3, 0x10, 0x18, 0x1E];
    /// `10 - 3`, leaving 7 in OUT.
    pub const SUBTRACT: &[u8] = &[0x01, 10, 0x02, 3, 0x11, 0x18, 0x1E];
    /// Stores 42 at `0x80`, clears A, reads it back through B and outputs it.
    pub const MEMORY: &[u8] = &[
        0x01, 42, 0x08, 0x80, 0x01, 0, 0x0B, 0x80, 0x04, 0x18, 0x1E,
    ];
    /// Halts immediately.
    pub const HALT: &[u8] = &[0x1E];
    /// Counts up in OUT forever.
    pub const COUNT: &[u8] = &[0x02, 1, 0x10, 0x18, 0x1F, 2];

    /// Looks a program up by name.
    pub fn by_name(name: &str) -> Option<&'static [u8]> {
        match name {
            "add" => Some(ADD),
            "subtract" | "sub" => Some(SUBTRACT),
            "memory" => Some(MEMORY),
            "halt" => Some(HALT),
            "count" => Some(COUNT),
            _ => None,
        }
    }

    /// Names accepted by [`by_name`].
    pub const NAMES: &[&str] = &["add", "subtract", "memory", "halt", "count"];
}

/// Fetch sequence shared by every instruction: `MAR = PC`, then `IR = mem[MAR], PC += 1`.
pub const FETCH: [u64; 2] = [ctl::PC_OUT | ctl::MAR_IN, ctl::RAM_OUT | ctl::IR_IN | ctl::PC_INC];

/// Builds the SAP-1 microcode table.
///
/// # Errors
///
/// Only fails if the instruction definitions above are inconsistent with the table shape.
pub fn microcode() -> SimResult<MicrocodeTable> {
    use ctl::{
        A_IN, A_OUT, ALU_OUT, ALU_SUB, B_IN, B_OUT, HALT, MAR_IN, OUT_IN, PC_IN, PC_INC, PC_OUT,
        RAM_IN, RAM_OUT,
    };

    let operand = PC_OUT | MAR_IN;
    let indirect = RAM_OUT | MAR_IN;
    MicrocodeBuilder::new(OPCODE_BITS, STEP_BITS, CONTROL_BITS)
        .fetch(&FETCH)
        .instruction(op::LDA_IMM, &[operand, RAM_OUT | A_IN | PC_INC])
        .instruction(op::LDB_IMM, &[operand, RAM_OUT | B_IN | PC_INC])
        .instruction(op::MOV_AB, &[B_OUT | A_IN])
        .instruction(op::MOV_BA, &[A_OUT | B_IN])
        .instruction(op::STA, &[operand, indirect, A_OUT | RAM_IN | PC_INC])
        .instruction(op::STB, &[operand, indirect, B_OUT | RAM_IN | PC_INC])
        .instruction(op::LDA_MEM, &[operand, indirect, RAM_OUT | A_IN | PC_INC])
        .instruction(op::LDB_MEM, &[operand, indirect, RAM_OUT | B_IN | PC_INC])
        .instruction(op::ADD, &[ALU_OUT | A_IN])
        .instruction(op::SUB, &[ALU_SUB | ALU_OUT | A_IN])
        .instruction(op::OUT, &[A_OUT | OUT_IN])
        .instruction(op::HLT, &[HALT])
        .instruction(op::JMP, &[operand, RAM_OUT | PC_IN])
        .build()
}

/// Register values at one instant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Sap1State {
    /// Accumulator.
    pub a: u64,
    /// Operand register.
    pub b: u64,
    /// Program counter.
    pub pc: u64,
    /// Instruction register.
    pub ir: u64,
    /// Memory address register.
    pub mar: u64,
    /// Output register.
    pub out: u64,
    /// Shared bus.
    pub bus: u64,
    /// Microcode step.
    pub step: u64,
    /// Active control word.
    pub control: u64,
    /// Whether the clock is gated off.
    pub halted: bool,
}

/// Outcome of [`Sap1::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Rising clock edges simulated.
    pub cycles: u64,
    /// Whether the machine executed `HLT`.
    pub halted: bool,
}

/// Handles to a SAP-1 built inside a [`Circuit`].
#[derive(Clone, Debug)]
pub struct Sap1 {
    /// Free-running system clock.
    pub clk: Wire,
    /// Clock after the halt gate; every register is clocked by it.
    pub cpu_clk: Wire,
    /// Asynchronous reset.
    pub reset: Wire,
    /// Halt latch output.
    pub halted: Wire,
    /// Shared data bus.
    pub bus: Bus,
    /// Accumulator.
    pub a: Bus,
    /// Operand register.
    pub b: Bus,
    /// ALU result.
    pub alu: Bus,
    /// ALU carry out.
    pub carry: Wire,
    /// Instruction register.
    pub ir: Bus,
    /// Memory address register.
    pub mar: Bus,
    /// Program counter.
    pub pc: Bus,
    /// Output register.
    pub out: Bus,
    /// Control bus, one wire per line in [`ctl`].
    pub control: Bus,
    /// Microcode step.
    pub step: Bus,
    /// RAM component, for [`Circuit::memory_mut`].
    pub ram: ComponentId,
}

impl Sap1 {
    /// Builds a SAP-1 with its own clock of the given half-period and a fresh reset line.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock or any component fails to build.
    pub fn with_clock(circuit: &mut Circuit, half_period: u64) -> SimResult<Self> {
        let clk = circuit.clock(half_period)?;
        let reset = circuit.wire();
        Self::build(circuit, clk, reset)
    }

    /// Builds a SAP-1 driven by `clk` and `reset`.
    ///
    /// # Errors
    ///
    /// Returns an error if any component fails to build.
    pub fn build(circuit: &mut Circuit, clk: Wire, reset: Wire) -> SimResult<Self> {
        let control = circuit.bus(CONTROL_BITS);
        let line = |mask: u64| control[mask.trailing_zeros() as usize];

        let halted = circuit.sr_latch(line(ctl::HALT), reset, false)?;
        let running = circuit.inverter(halted)?;
        let cpu_clk = circuit.and(clk, running)?;
        let mem_clk = circuit.inverter(cpu_clk)?;

        let bus = circuit.bus(WORD_BITS);

        let a = circuit.register(&bus, cpu_clk, line(ctl::A_IN), reset)?;
        circuit.buffer_into(&a, line(ctl::A_OUT), &bus)?;
        let b = circuit.register(&bus, cpu_clk, line(ctl::B_IN), reset)?;
        circuit.buffer_into(&b, line(ctl::B_OUT), &bus)?;

        let subtract = Bus::repeat(line(ctl::ALU_SUB), WORD_BITS);
        let operand = circuit.xor_bus(&b, &subtract)?;
        let (alu, carry) = circuit.full_adder(&a, &operand, line(ctl::ALU_SUB))?;
        circuit.buffer_into(&alu, line(ctl::ALU_OUT), &bus)?;

        let ir = circuit.register(&bus, cpu_clk, line(ctl::IR_IN), reset)?;
        let mar = circuit.register(&bus, cpu_clk, line(ctl::MAR_IN), reset)?;
        let out = circuit.register(&bus, cpu_clk, line(ctl::OUT_IN), reset)?;

        let pc = circuit.bus(WORD_BITS);
        let (next_pc, _) = circuit.incrementer(&pc)?;
        let pc_source = circuit.mux(&[next_pc, bus.clone()], &Bus::from(line(ctl::PC_IN)))?;
        let pc_we = circuit.or(line(ctl::PC_IN), line(ctl::PC_INC))?;
        let _ = circuit.register_into(&pc_source, cpu_clk, pc_we, reset, 0, &pc)?;
        circuit.buffer_into(&pc, line(ctl::PC_OUT), &bus)?;

        let memory = Memory::new(WORD_BITS, WORD_BITS)?;
        let ram = circuit.ioram(
            &mar,
            mem_clk,
            &bus,
            memory,
            line(ctl::RAM_IN),
            line(ctl::RAM_OUT),
        )?;

        let opcode = ir.slice(..OPCODE_BITS);
        let ports = circuit.control_unit(&opcode, cpu_clk, reset, microcode()?, &control)?;
        circuit.settle()?;
        debug!(
            wires = circuit.stats().wires,
            components = circuit.component_count(),
            "built SAP-1"
        );

        Ok(Self {
            clk,
            cpu_clk,
            reset,
            halted,
            bus,
            a,
            b,
            alu,
            carry,
            ir,
            mar,
            pc,
            out,
            control,
            step: ports.step,
            ram: ram.id,
        })
    }

    /// Copies a program image into RAM at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::LoadOutOfRange`] for images over 256 bytes.
    pub fn load(&self, circuit: &mut Circuit, program: &[u8]) -> SimResult<()> {
        circuit.memory_mut(self.ram)?.load(0, program)
    }

    /// Pulses reset: clears every register, the step counter and the halt latch.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures.
    pub fn reset(&self, circuit: &mut Circuit) -> SimResult<()> {
        circuit.set(self.reset, true)?;
        circuit.settle()?;
        circuit.set(self.reset, false)?;
        circuit.settle()
    }

    /// Clocks the machine until it halts or `max_cycles` rising edges have passed.
    ///
    /// # Errors
    ///
    /// Propagates simulation errors.
    pub fn run(&self, circuit: &mut Circuit, max_cycles: u64) -> SimResult<RunSummary> {
        let mut cycles = 0;
        while !circuit.get(self.halted) && cycles < max_cycles {
            let _ = circuit.posedge(self.clk)?;
            cycles += 1;
        }
        circuit.settle()?;
        let halted = circuit.get(self.halted);
        info!(cycles, halted, out = circuit.read(&self.out), "SAP-1 run finished");
        Ok(RunSummary { cycles, halted })
    }

    /// Reads every register.
    pub fn snapshot(&self, circuit: &Circuit) -> Sap1State {
        Sap1State {
            a: circuit.read(&self.a),
            b: circuit.read(&self.b),
            pc: circuit.read(&self.pc),
            ir: circuit.read(&self.ir),
            mar: circuit.read(&self.mar),
            out: circuit.read(&self.out),
            bus: circuit.read(&self.bus),
            step: circuit.read(&self.step),
            control: circuit.read(&self.control),
            halted: circuit.get(self.halted),
        }
    }
}
