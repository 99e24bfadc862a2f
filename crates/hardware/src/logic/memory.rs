//! Addressable memories.
//!
//! This module provides the word store and the components built on it:
//! 1. **Memory:** A fixed array of `2^address_width` words, each `width` bits wide.
//! 2. **RAM:** Clocked read-into-latch and optional write, with an output-enable buffer.
//! 3. **IORAM:** RAM whose output buffer drives its own data bus.
//! 4. **ROM:** Combinational lookup, re-read on every address change.
//! 5. **Clocked ROM:** Lookup sampled on the clock's rising edge.
//!
//! Each component owns its `Memory`. Outside code reaches it only through
//! [`Circuit::memory`] and [`Circuit::memory_mut`] with the component's id.

use crate::circuit::{Circuit, Component, ComponentId, Signals};
use crate::common::value::{VALUE_BITS, mask};
use crate::common::{SimError, SimResult};
use crate::net::{Bus, Edge, Wire};

/// Widest supported address bus.
pub const MAX_ADDRESS_BITS: usize = 24;

/// Fixed-size array of words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    words: Vec<u64>,
    address_width: usize,
    width: usize,
}

impl Memory {
    /// Zero-filled memory of `2^address_width` words of `width` bits.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MemoryWidth`] for widths outside `1..=64` and
    /// [`SimError::DecoderTooWide`] for address buses past [`MAX_ADDRESS_BITS`].
    pub fn new(address_width: usize, width: usize) -> SimResult<Self> {
        Self::check_shape(address_width, width)?;
        Ok(Self {
            words: vec![0; 1 << address_width],
            address_width,
            width,
        })
    }

    /// Memory backed by an existing word array, masked to `width` bits.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MemorySize`] unless `words.len() == 2^address_width`, otherwise
    /// as [`Memory::new`].
    pub fn from_words(address_width: usize, width: usize, words: Vec<u64>) -> SimResult<Self> {
        Self::check_shape(address_width, width)?;
        if words.len() != 1 << address_width {
            return Err(SimError::MemorySize {
                words: words.len(),
                address_bits: address_width,
            });
        }
        let m = mask(width);
        Ok(Self {
            words: words.into_iter().map(|w| w & m).collect(),
            address_width,
            width,
        })
    }

    fn check_shape(address_width: usize, width: usize) -> SimResult<()> {
        if width == 0 || width > VALUE_BITS {
            return Err(SimError::MemoryWidth { width });
        }
        if address_width > MAX_ADDRESS_BITS {
            return Err(SimError::DecoderTooWide {
                width: address_width,
                max: MAX_ADDRESS_BITS,
            });
        }
        Ok(())
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the memory holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Bits per word.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Bits per address.
    pub const fn address_width(&self) -> usize {
        self.address_width
    }

    /// Word at `address`, wrapping past the end.
    pub fn read(&self, address: usize) -> u64 {
        self.words[address & (self.words.len() - 1)]
    }

    /// Stores `value` (masked to the word width) at `address`, wrapping past the end.
    pub fn write(&mut self, address: usize, value: u64) {
        let len = self.words.len();
        self.words[address & (len - 1)] = value & mask(self.width);
    }

    /// Copies bytes into consecutive words starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::LoadOutOfRange`] if the image does not fit.
    pub fn load(&mut self, offset: usize, bytes: &[u8]) -> SimResult<()> {
        let end = offset.checked_add(bytes.len());
        if end.is_none_or(|end| end > self.words.len()) {
            return Err(SimError::LoadOutOfRange {
                offset,
                len: bytes.len(),
                size: self.words.len(),
            });
        }
        let m = mask(self.width);
        for (slot, &byte) in self.words[offset..].iter_mut().zip(bytes) {
            *slot = byte as u64 & m;
        }
        Ok(())
    }

    /// Little-endian 16-bit pointer stored in the low bytes of words `address` and
    /// `address + 1`, as used for reset vectors at the top of memory.
    pub fn read_vector(&self, address: usize) -> u16 {
        let lo = self.read(address) & 0xFF;
        let hi = self.read(address + 1) & 0xFF;
        (lo | (hi << 8)) as u16
    }

    /// All words in address order.
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

/// Clocked read/write memory.
#[derive(Debug)]
pub struct Ram {
    address: Bus,
    data: Bus,
    we: Wire,
    latch: Bus,
    memory: Memory,
    delay: u64,
}

impl Component for Ram {
    fn name(&self) -> &'static str {
        "ram"
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        if !signals.rose() {
            return;
        }
        let address = signals.read(&self.address) as usize;
        signals.schedule_write(&self.latch, self.memory.read(address), self.delay);
        if signals.get(self.we) {
            let value = signals.read(&self.data);
            self.memory.write(address, value);
        }
    }

    fn memory(&self) -> Option<&Memory> {
        Some(&self.memory)
    }

    fn memory_mut(&mut self) -> Option<&mut Memory> {
        Some(&mut self.memory)
    }
}

/// Combinational or clocked read-only memory.
#[derive(Debug)]
pub struct Rom {
    address: Bus,
    clk: Option<Wire>,
    data: Bus,
    table: Memory,
    delay: u64,
}

impl Component for Rom {
    fn name(&self) -> &'static str {
        if self.clk.is_some() { "clocked_rom" } else { "rom" }
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        let address = signals.read(&self.address) as usize;
        let word = self.table.read(address);
        match self.clk {
            None => signals.write(&self.data, word),
            Some(_) if signals.rose() => signals.schedule_write(&self.data, word, self.delay),
            Some(_) => {}
        }
    }

    fn memory(&self) -> Option<&Memory> {
        Some(&self.table)
    }

    fn memory_mut(&mut self) -> Option<&mut Memory> {
        Some(&mut self.table)
    }
}

/// Handles returned by [`Circuit::ram`].
#[derive(Clone, Debug)]
pub struct RamPorts {
    /// Component id, for [`Circuit::memory_mut`].
    pub id: ComponentId,
    /// Word read on the last clock edge.
    pub latch: Bus,
    /// Buffered copy of the latch, driven while output-enable is high.
    pub output: Bus,
}

impl Circuit {
    /// Clocked RAM with separate data-in and data-out buses.
    ///
    /// On each rising edge of `clk` the word at `address` is read into the latch, and if
    /// `we` is high `data` is then stored at `address`. `oe` gates the latch onto `output`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::WidthMismatch`] if `address` or `data` do not match the memory's
    /// shape.
    pub fn ram(
        &mut self,
        address: &Bus,
        clk: Wire,
        data: &Bus,
        memory: Memory,
        we: Wire,
        oe: Wire,
    ) -> SimResult<RamPorts> {
        let (id, latch) = self.attach_ram(address, clk, data, memory, we)?;
        let output = self.buffer(&latch, oe)?;
        Ok(RamPorts { id, latch, output })
    }

    /// Bidirectional RAM: the buffered latch drives back onto `data` while `oe` is high.
    ///
    /// # Errors
    ///
    /// As [`Circuit::ram`].
    pub fn ioram(
        &mut self,
        address: &Bus,
        clk: Wire,
        data: &Bus,
        memory: Memory,
        we: Wire,
        oe: Wire,
    ) -> SimResult<RamPorts> {
        let (id, latch) = self.attach_ram(address, clk, data, memory, we)?;
        self.buffer_into(&latch, oe, data)?;
        Ok(RamPorts {
            id,
            latch,
            output: data.clone(),
        })
    }

    fn attach_ram(
        &mut self,
        address: &Bus,
        clk: Wire,
        data: &Bus,
        memory: Memory,
        we: Wire,
    ) -> SimResult<(ComponentId, Bus)> {
        check_shape("ram", address, data, &memory)?;
        let latch = self.bus(data.width());
        let ram = Ram {
            address: address.clone(),
            data: data.clone(),
            we,
            latch: latch.clone(),
            memory,
            delay: self.config().timing.memory_delay,
        };
        let id = self.add_component(ram, &[(clk, Edge::Rising)])?;
        Ok((id, latch))
    }

    /// Combinational ROM: `data` follows `table[address]` with no delay.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::WidthMismatch`] if the buses do not match the table's shape.
    pub fn rom(&mut self, address: &Bus, table: Memory, data: &Bus) -> SimResult<ComponentId> {
        check_shape("rom", address, data, &table)?;
        let sensitivity: Vec<_> = address.iter().map(|w| (w, Edge::Any)).collect();
        let rom = Rom {
            address: address.clone(),
            clk: None,
            data: data.clone(),
            table,
            delay: 0,
        };
        self.add_component(rom, &sensitivity)
    }

    /// ROM sampled on the rising edge of `clk`.
    ///
    /// # Errors
    ///
    /// As [`Circuit::rom`].
    pub fn clocked_rom(
        &mut self,
        address: &Bus,
        clk: Wire,
        table: Memory,
        data: &Bus,
    ) -> SimResult<ComponentId> {
        check_shape("clocked_rom", address, data, &table)?;
        let rom = Rom {
            address: address.clone(),
            clk: Some(clk),
            data: data.clone(),
            table,
            delay: self.config().timing.memory_delay,
        };
        self.add_component(rom, &[(clk, Edge::Rising)])
    }
}

fn check_shape(context: &'static str, address: &Bus, data: &Bus, memory: &Memory) -> SimResult<()> {
    if address.width() != memory.address_width() {
        return Err(SimError::WidthMismatch {
            context,
            expected: memory.address_width(),
            actual: address.width(),
        });
    }
    if data.width() != memory.width() {
        return Err(SimError::WidthMismatch {
            context,
            expected: memory.width(),
            actual: data.width(),
        });
    }
    Ok(())
}
