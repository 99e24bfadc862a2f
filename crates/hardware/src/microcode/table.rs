//! Microcode tables.
//!
//! A table holds one control word per `(opcode, step)` pair at address
//! `(opcode << step_bits) | step`. It is built once from a shared fetch sequence and a
//! sparse list of per-opcode execute sequences:
//!
//! 1. Every opcode starts with the fetch sequence.
//! 2. Listed opcodes continue with their own steps.
//! 3. Every remaining step holds the all-zero word, which ends the instruction.
//!
//! Because the zero word is the end marker, it may not appear inside a sequence.

use tracing::warn;

use crate::common::value::mask;
use crate::common::{SimError, SimResult};
use crate::logic::memory::Memory;

/// Immutable control-word lookup table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MicrocodeTable {
    words: Vec<u64>,
    opcode_bits: usize,
    step_bits: usize,
    word_bits: usize,
    fetch_len: usize,
}

impl MicrocodeTable {
    /// Table address of `(opcode, step)`.
    pub const fn address(&self, opcode: u64, step: u64) -> usize {
        ((opcode as usize) << self.step_bits) | (step as usize & ((1 << self.step_bits) - 1))
    }

    /// Control word for `(opcode, step)`; opcodes wrap to the table's opcode field.
    pub fn word(&self, opcode: u64, step: u64) -> u64 {
        let address = self.address(opcode & mask(self.opcode_bits), step);
        self.words[address]
    }

    /// Width of the opcode field.
    pub const fn opcode_bits(&self) -> usize {
        self.opcode_bits
    }

    /// Width of the step counter.
    pub const fn step_bits(&self) -> usize {
        self.step_bits
    }

    /// Width of a control word.
    pub const fn word_bits(&self) -> usize {
        self.word_bits
    }

    /// Steps available to each instruction.
    pub const fn steps_per_instruction(&self) -> usize {
        1 << self.step_bits
    }

    /// Length of the shared fetch sequence.
    pub const fn fetch_len(&self) -> usize {
        self.fetch_len
    }

    /// Number of words in the table.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Every word in address order.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Steps of `opcode` up to, not including, its first end-of-instruction word.
    pub fn sequence(&self, opcode: u64) -> &[u64] {
        let start = self.address(opcode & mask(self.opcode_bits), 0);
        let slot = &self.words[start..start + self.steps_per_instruction()];
        let end = slot.iter().position(|&w| w == 0).unwrap_or(slot.len());
        &slot[..end]
    }

    /// The table as a ROM image addressed by `opcode_bits + step_bits` lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is too large to address.
    pub fn to_memory(&self) -> SimResult<Memory> {
        Memory::from_words(
            self.opcode_bits + self.step_bits,
            self.word_bits,
            self.words.clone(),
        )
    }
}

/// Builder for [`MicrocodeTable`].
///
/// # Examples
///
/// ```
/// use gatesim_core::microcode::MicrocodeBuilder;
///
/// const PC_OUT: u64 = 1 << 0;
/// const MAR_IN: u64 = 1 << 1;
/// const IR_IN: u64 = 1 << 2;
/// const HALT: u64 = 1 << 3;
///
/// let table = MicrocodeBuilder::new(4, 3, 4)
///     .fetch(&[PC_OUT | MAR_IN, IR_IN])
///     .instruction(0xF, &[HALT])
///     .build()
///     .unwrap();
/// assert_eq!(table.word(0x3, 1), IR_IN);
/// assert_eq!(table.word(0x3, 2), 0);
/// assert_eq!(table.word(0xF, 2), HALT);
/// ```
#[derive(Clone, Debug)]
pub struct MicrocodeBuilder {
    opcode_bits: usize,
    step_bits: usize,
    word_bits: usize,
    fetch: Vec<u64>,
    entries: Vec<(u64, Vec<u64>)>,
}

impl MicrocodeBuilder {
    /// Starts a table for `opcode_bits`-bit opcodes, `2^step_bits` steps per instruction and
    /// `word_bits`-bit control words.
    pub const fn new(opcode_bits: usize, step_bits: usize, word_bits: usize) -> Self {
        Self {
            opcode_bits,
            step_bits,
            word_bits,
            fetch: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Sets the fetch sequence shared by every opcode.
    #[must_use]
    pub fn fetch(mut self, steps: &[u64]) -> Self {
        self.fetch = steps.to_vec();
        self
    }

    /// Adds the execute sequence of `opcode`, run after the fetch sequence.
    #[must_use]
    pub fn instruction(mut self, opcode: u64, steps: &[u64]) -> Self {
        self.entries.push((opcode, steps.to_vec()));
        self
    }

    /// Validates the description and lays out the table.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OpcodeRange`] for opcodes outside the opcode field,
    /// [`SimError::MicrocodeOverflow`] for sequences longer than an instruction slot,
    /// [`SimError::EmptyControlWord`] for zero words inside a sequence,
    /// [`SimError::ControlWordWidth`] for words wider than `word_bits`, and
    /// [`SimError::InvalidConfig`] if the table would be too large.
    pub fn build(self) -> SimResult<MicrocodeTable> {
        if self.opcode_bits + self.step_bits > 24 || self.word_bits == 0 || self.word_bits > 64 {
            return Err(SimError::InvalidConfig(format!(
                "microcode: {} opcode bits, {} step bits and {} word bits are out of range",
                self.opcode_bits, self.step_bits, self.word_bits
            )));
        }
        let steps = 1usize << self.step_bits;
        let opcodes = 1usize << self.opcode_bits;
        self.check_sequence(0, &self.fetch, 0)?;
        let mut words = vec![0; opcodes * steps];
        for opcode in 0..opcodes {
            let base = opcode * steps;
            words[base..base + self.fetch.len()].copy_from_slice(&self.fetch);
        }

        let mut seen = vec![false; opcodes];
        for (opcode, sequence) in &self.entries {
            let opcode = *opcode;
            if opcode >= opcodes as u64 {
                return Err(SimError::OpcodeRange {
                    opcode,
                    bits: self.opcode_bits,
                });
            }
            self.check_sequence(opcode, sequence, self.fetch.len())?;
            let base = opcode as usize * steps + self.fetch.len();
            if seen[opcode as usize] {
                warn!(opcode, "microcode entry redefined; last definition wins");
                words[base..base + steps - self.fetch.len()].fill(0);
            }
            seen[opcode as usize] = true;
            words[base..base + sequence.len()].copy_from_slice(sequence);
        }
        Ok(MicrocodeTable {
            words,
            opcode_bits: self.opcode_bits,
            step_bits: self.step_bits,
            word_bits: self.word_bits,
            fetch_len: self.fetch.len(),
        })
    }

    fn check_sequence(&self, opcode: u64, sequence: &[u64], offset: usize) -> SimResult<()> {
        let capacity = 1usize << self.step_bits;
        if offset + sequence.len() > capacity {
            return Err(SimError::MicrocodeOverflow {
                opcode,
                steps: offset + sequence.len(),
                capacity,
            });
        }
        let word_mask = mask(self.word_bits);
        for (i, &word) in sequence.iter().enumerate() {
            if word == 0 {
                return Err(SimError::EmptyControlWord {
                    opcode,
                    step: offset + i,
                });
            }
            if word & !word_mask != 0 {
                return Err(SimError::ControlWordWidth {
                    word,
                    bits: self.word_bits,
                });
            }
        }
        Ok(())
    }
}
