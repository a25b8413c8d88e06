//! Testing utilities and mock implementations
//!
//! This module provides a register-level simulation of the eDMA controller
//! and request router so the engine can be tested on the host without
//! hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::vec;
use std::vec::Vec;

use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::clock::ClockGate;
use crate::hal::mmio::{DmaHardware, RegisterBlock};
use crate::hal::router::RequestSource;
use crate::internal::constants::{FIRST_ALWAYS_ON_SLOT, MAX_CHANNELS, REQUEST_SLOTS};
use crate::internal::register::dmamux::{CHCFG_ENBL, CHCFG_SOURCE_MASK, chcfg_offset};
use crate::internal::register::edma::*;
use crate::internal::tcd::bits::{csr, iter};
use crate::internal::tcd::TransferDescriptor;

/// Bus address of the simulated RAM
pub const RAM_BASE: u32 = 0x2000_0000;

/// Size of the simulated RAM in bytes
pub const RAM_SIZE: usize = 64 * 1024;

/// Words in the controller register block (up to the end of the last TCD)
const CONTROLLER_WORDS: usize = (TCD_OFFSET + MAX_CHANNELS * TCD_STRIDE) / 4;

/// Upper bound on services performed by `run_until_idle`
const RUN_LIMIT: usize = 1_000_000;

// =============================================================================
// Register Snapshot
// =============================================================================

/// Copy of every simulated register, for before/after comparisons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub controller: Vec<u32>,
    pub router: Vec<u32>,
}

// =============================================================================
// Simulated eDMA
// =============================================================================

struct SimState {
    regs: RegisterSnapshot,
    ram: Vec<u8>,
    next_alloc: u32,
    /// Peripheral request lines currently asserted, by slot
    asserted: [bool; REQUEST_SLOTS as usize],
    /// Channels stalled by a bus error until their TCD is rewritten
    faulted: u32,
    /// Last channel serviced (round-robin arbitration)
    last_served: Option<usize>,
}

/// Register-level eDMA simulator
///
/// Implements [`DmaHardware`] over an in-memory register file and a small
/// bus RAM at [`RAM_BASE`]. Every register access is followed by one
/// arbitration step unless the simulator is paused, so a status poll loop
/// makes progress the way it would against real hardware. One step
/// services one channel for one minor loop.
///
/// Modelled behaviour:
/// - byte-wide command and priority registers; a word write to the command
///   block issues one command per byte lane
/// - fixed-priority and round-robin arbitration; in fixed-priority mode a
///   channel whose priority is shared within its group of 16 latches a
///   channel priority error instead of being serviced
/// - always-on request slots, and peripheral slots driven by
///   [`assert_request`](Self::assert_request)
/// - per-element source/destination strides, last-address adjustments,
///   CITER reload, DONE, INTMAJOR, DREQ and major-loop channel linking
/// - bus errors for accesses outside the simulated RAM, latched in ES/ERR
/// - descriptor consistency errors (NBYTES/CITER, offsets, alignment)
///
/// A step completes a minor loop atomically, so ACTIVE is never observed
/// set. Scatter-gather loading and preemption are not modelled.
///
/// # Example
///
/// ```ignore
/// let sim = SimulatedDma::new();
/// let src = sim.alloc(16);
/// sim.write_bytes(src, &[1; 16]);
///
/// let mut dma: DmaEngine<_, _> = DmaEngine::new(&sim, MockClock::new());
/// dma.init(DmaConfig::default()).unwrap();
/// ```
pub struct SimulatedDma {
    state: RefCell<SimState>,
    paused: Cell<bool>,
}

impl Default for SimulatedDma {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDma {
    /// Create a simulator with reset register values and zeroed RAM
    pub fn new() -> Self {
        let mut controller = vec![0u32; CONTROLLER_WORDS];
        // DCHPRI reset value is the channel number within its group
        for channel in 0..MAX_CHANNELS {
            let offset = dchpri_offset(channel);
            controller[offset / 4] |= ((channel as u8 & DCHPRI_CHPRI_MASK) as u32) << lane_shift(offset);
        }

        Self {
            state: RefCell::new(SimState {
                regs: RegisterSnapshot {
                    controller,
                    router: vec![0u32; MAX_CHANNELS],
                },
                ram: vec![0u8; RAM_SIZE],
                next_alloc: RAM_BASE,
                asserted: [false; REQUEST_SLOTS as usize],
                faulted: 0,
                last_served: None,
            }),
            paused: Cell::new(false),
        }
    }

    // =========================================================================
    // Execution Control
    // =========================================================================

    /// Stop servicing channels on register accesses
    pub fn pause(&self) {
        self.paused.set(true);
    }

    /// Resume servicing channels on register accesses
    pub fn resume(&self) {
        self.paused.set(false);
    }

    /// Perform one arbitration step; returns whether a channel was serviced
    pub fn step(&self) -> bool {
        self.state.borrow_mut().service()
    }

    /// Step until no channel is eligible; returns the number of services
    pub fn run_until_idle(&self) -> usize {
        let mut services = 0;
        while services < RUN_LIMIT && self.step() {
            services += 1;
        }
        services
    }

    fn tick(&self) {
        if !self.paused.get() {
            self.step();
        }
    }

    // =========================================================================
    // Request Lines
    // =========================================================================

    /// Assert a peripheral request line until released
    pub fn assert_request(&self, source: RequestSource) {
        self.state.borrow_mut().asserted[source.slot() as usize] = true;
    }

    /// Release a peripheral request line
    pub fn release_request(&self, source: RequestSource) {
        self.state.borrow_mut().asserted[source.slot() as usize] = false;
    }

    /// Raise a peripheral request `count` times, one service each
    pub fn pulse_request(&self, source: RequestSource, count: usize) {
        for _ in 0..count {
            self.assert_request(source);
            self.step();
            self.release_request(source);
        }
    }

    // =========================================================================
    // Register Inspection
    // =========================================================================

    /// Read a register without advancing the simulation
    pub fn peek(&self, block: RegisterBlock, offset: usize) -> u32 {
        let state = self.state.borrow();
        match block {
            RegisterBlock::Controller if offset == HRS_OFFSET => state.hardware_requests(),
            RegisterBlock::Controller => state.regs.controller[offset / 4],
            RegisterBlock::Router => state.regs.router[offset / 4],
        }
    }

    /// Read one byte of a register without advancing the simulation
    pub fn peek8(&self, block: RegisterBlock, offset: usize) -> u8 {
        (self.peek(block, offset & !3) >> lane_shift(offset)) as u8
    }

    /// Overwrite a register without side effects or simulation
    pub fn poke(&self, block: RegisterBlock, offset: usize, value: u32) {
        let mut state = self.state.borrow_mut();
        match block {
            RegisterBlock::Controller => state.regs.controller[offset / 4] = value,
            RegisterBlock::Router => state.regs.router[offset / 4] = value,
        }
    }

    /// Copy of every register
    pub fn snapshot(&self) -> RegisterSnapshot {
        self.state.borrow().regs.clone()
    }

    // =========================================================================
    // Bus Memory
    // =========================================================================

    /// Reserve `len` bytes of zeroed RAM, 32-byte aligned
    pub fn alloc(&self, len: usize) -> u32 {
        let mut state = self.state.borrow_mut();
        let addr = state.next_alloc;
        let end = addr as usize + len.max(1);
        assert!(
            end <= RAM_BASE as usize + RAM_SIZE,
            "simulated RAM exhausted"
        );
        state.next_alloc = ((end + 31) & !31) as u32;
        addr
    }

    /// Write bytes to RAM
    pub fn write_bytes(&self, addr: u32, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        let start = ram_index(addr, data.len()).expect("address outside simulated RAM");
        state.ram[start..start + data.len()].copy_from_slice(data);
    }

    /// Read bytes from RAM
    pub fn read_bytes(&self, addr: u32, len: usize) -> Vec<u8> {
        let state = self.state.borrow();
        let start = ram_index(addr, len).expect("address outside simulated RAM");
        state.ram[start..start + len].to_vec()
    }

    /// Write a little-endian word to RAM
    pub fn write_u32(&self, addr: u32, value: u32) {
        self.write_bytes(addr, &value.to_le_bytes());
    }

    /// Read a little-endian word from RAM
    pub fn read_u32(&self, addr: u32) -> u32 {
        let bytes = self.read_bytes(addr, 4);
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl DmaHardware for SimulatedDma {
    fn read(&self, block: RegisterBlock, offset: usize) -> u32 {
        let value = match block {
            // Command registers read as zero
            RegisterBlock::Controller if is_command(offset) => 0,
            _ => self.peek(block, offset),
        };
        self.tick();
        value
    }

    fn write(&self, block: RegisterBlock, offset: usize, value: u32) {
        {
            let mut state = self.state.borrow_mut();
            match block {
                RegisterBlock::Controller => state.write_controller(offset, value),
                RegisterBlock::Router => state.regs.router[offset / 4] = value,
            }
        }
        self.tick();
    }

    fn read8(&self, block: RegisterBlock, offset: usize) -> u8 {
        let value = match block {
            RegisterBlock::Controller if is_command(offset) => 0,
            _ => self.peek8(block, offset),
        };
        self.tick();
        value
    }

    fn write8(&self, block: RegisterBlock, offset: usize, value: u8) {
        {
            let mut state = self.state.borrow_mut();
            match block {
                RegisterBlock::Controller => state.write_controller8(offset, value),
                RegisterBlock::Router => {
                    let word = &mut state.regs.router[offset / 4];
                    *word = replace_lane(*word, offset, value);
                }
            }
        }
        self.tick();
    }
}

/// Whether `offset` falls in the byte-wide command block
fn is_command(offset: usize) -> bool {
    (CEEI_OFFSET..=CINT_OFFSET).contains(&offset)
}

/// Bit position of the byte at `offset` within its little-endian word
fn lane_shift(offset: usize) -> u32 {
    (offset % 4) as u32 * 8
}

fn replace_lane(word: u32, offset: usize, value: u8) -> u32 {
    let shift = lane_shift(offset);
    (word & !(0xFF << shift)) | ((value as u32) << shift)
}

/// Index into RAM for an access of `len` bytes at `addr`
fn ram_index(addr: u32, len: usize) -> Option<usize> {
    let start = (addr as u64).checked_sub(RAM_BASE as u64)?;
    if start + len as u64 <= RAM_SIZE as u64 {
        Some(start as usize)
    } else {
        None
    }
}

impl SimState {
    fn reg(&self, offset: usize) -> u32 {
        self.regs.controller[offset / 4]
    }

    fn reg_mut(&mut self, offset: usize) -> &mut u32 {
        &mut self.regs.controller[offset / 4]
    }

    fn reg8(&self, offset: usize) -> u8 {
        (self.reg(offset & !3) >> lane_shift(offset)) as u8
    }

    fn priority(&self, channel: usize) -> u8 {
        self.reg8(dchpri_offset(channel)) & DCHPRI_CHPRI_MASK
    }

    fn csr_mut(&mut self, channel: usize) -> &mut u32 {
        self.reg_mut(tcd_offset(channel, TCD_CSR_BITER))
    }

    fn write_controller(&mut self, offset: usize, value: u32) {
        if is_command(offset) {
            for (lane, byte) in value.to_le_bytes().into_iter().enumerate() {
                self.command(offset + lane, byte);
            }
            return;
        }

        match offset {
            ES_OFFSET | HRS_OFFSET => {}
            INT_OFFSET => *self.reg_mut(INT_OFFSET) &= !value,
            ERR_OFFSET => {
                *self.reg_mut(ERR_OFFSET) &= !value;
                self.sync_error_status();
            }
            _ => {
                self.touch_tcd(offset);
                *self.reg_mut(offset) = value;
            }
        }
    }

    fn write_controller8(&mut self, offset: usize, value: u8) {
        if is_command(offset) {
            self.command(offset, value);
            return;
        }

        let word = offset & !3;
        match word {
            ES_OFFSET | HRS_OFFSET => {}
            INT_OFFSET | ERR_OFFSET => {
                self.write_controller(word, (value as u32) << lane_shift(offset));
            }
            _ => {
                self.touch_tcd(offset);
                let current = self.reg(word);
                *self.reg_mut(word) = replace_lane(current, offset, value);
            }
        }
    }

    /// Rewriting a channel's TCD releases it from a latched fault
    fn touch_tcd(&mut self, offset: usize) {
        if offset >= TCD_OFFSET {
            self.faulted &= !(1 << ((offset - TCD_OFFSET) / TCD_STRIDE));
        }
    }

    fn command(&mut self, offset: usize, value: u8) {
        if value & CMD_NOP != 0 {
            return;
        }
        let target = if value & CMD_ALL != 0 {
            u32::MAX
        } else {
            1u32 << (value & CMD_CHANNEL_MASK)
        };

        match offset {
            CEEI_OFFSET => *self.reg_mut(EEI_OFFSET) &= !target,
            SEEI_OFFSET => *self.reg_mut(EEI_OFFSET) |= target,
            CERQ_OFFSET => *self.reg_mut(ERQ_OFFSET) &= !target,
            SERQ_OFFSET => *self.reg_mut(ERQ_OFFSET) |= target,
            CINT_OFFSET => *self.reg_mut(INT_OFFSET) &= !target,
            CERR_OFFSET => {
                *self.reg_mut(ERR_OFFSET) &= !target;
                self.sync_error_status();
            }
            CDNE_OFFSET | SSRT_OFFSET => {
                for channel in (0..MAX_CHANNELS).filter(|c| target & (1 << c) != 0) {
                    let word = self.csr_mut(channel);
                    if offset == CDNE_OFFSET {
                        *word &= !(csr::DONE as u32);
                    } else {
                        *word |= csr::START as u32;
                    }
                }
            }
            _ => {}
        }
    }

    /// ES reads as clear once no channel has an error latched
    fn sync_error_status(&mut self) {
        if self.reg(ERR_OFFSET) == 0 {
            *self.reg_mut(ES_OFFSET) = 0;
        }
    }

    fn source_requesting(&self, channel: usize) -> bool {
        let chcfg = self.regs.router[chcfg_offset(channel) / 4];
        if chcfg & CHCFG_ENBL == 0 {
            return false;
        }
        let slot = (chcfg & CHCFG_SOURCE_MASK) as u8;
        slot != 0 && (slot >= FIRST_ALWAYS_ON_SLOT || self.asserted[slot as usize])
    }

    fn hardware_requests(&self) -> u32 {
        (0..MAX_CHANNELS)
            .filter(|&c| self.source_requesting(c))
            .fold(0, |mask, c| mask | (1 << c))
    }

    fn eligible(&self, channel: usize) -> bool {
        if self.faulted & (1 << channel) != 0 {
            return false;
        }
        let started = self.reg(tcd_offset(channel, TCD_CSR_BITER)) & csr::START as u32 != 0;
        let enabled = self.reg(ERQ_OFFSET) & (1 << channel) != 0;
        started || (enabled && self.source_requesting(channel))
    }

    fn select(&self) -> Option<usize> {
        let candidates = (0..MAX_CHANNELS).filter(|&c| self.eligible(c));

        if self.reg(CR_OFFSET) & CR_ERCA != 0 {
            let after = self.last_served.map_or(0, |c| c + 1);
            let mut ordered: Vec<usize> = candidates.collect();
            ordered.sort_by_key(|&c| (c + MAX_CHANNELS - after) % MAX_CHANNELS);
            ordered.first().copied()
        } else {
            candidates.max_by_key(|&c| self.priority(c))
        }
    }

    /// Another channel in the same group of 16 shares the channel's priority
    fn priority_conflict(&self, channel: usize) -> bool {
        let group = channel / 16 * 16;
        let priority = self.priority(channel);
        (group..group + 16).any(|c| c != channel && self.priority(c) == priority)
    }

    /// Service one channel for one minor loop
    fn service(&mut self) -> bool {
        if self.reg(CR_OFFSET) & CR_HALT != 0 {
            return false;
        }
        let Some(channel) = self.select() else {
            return false;
        };
        self.last_served = Some(channel);

        if self.reg(CR_OFFSET) & CR_ERCA == 0 && self.priority_conflict(channel) {
            self.latch_error(channel, ES_CPE);
            return true;
        }

        let mut words = [0u32; TCD_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.reg(tcd_offset(channel, i * 4));
        }
        let Some(mut tcd) = TransferDescriptor::decode(&words) else {
            self.latch_error(channel, ES_NCE);
            return true;
        };
        if let Some(cause) = configuration_error(&tcd) {
            self.latch_error(channel, cause);
            return true;
        }

        // ACTIVE is only set for the duration of the minor loop
        tcd.control &= !(csr::START | csr::ACTIVE);

        let size = tcd.element_size.bytes() as usize;
        for _ in 0..tcd.minor_loop_bytes as usize / size {
            let Some(src) = ram_index(tcd.source, size) else {
                self.latch_error(channel, ES_SBE);
                return true;
            };
            let Some(dst) = ram_index(tcd.destination, size) else {
                self.latch_error(channel, ES_DBE);
                return true;
            };
            self.ram.copy_within(src..src + size, dst);
            tcd.source = tcd.source.wrapping_add(tcd.source_offset as i32 as u32);
            tcd.destination = tcd.destination.wrapping_add(tcd.destination_offset as i32 as u32);
        }

        tcd.current_iterations -= 1;
        let bit = 1u32 << channel;
        let mut link = None;
        if tcd.current_iterations == 0 {
            tcd.source = tcd.source.wrapping_add(tcd.source_last_adjust as u32);
            tcd.destination = tcd
                .destination
                .wrapping_add(tcd.destination_last_adjust as u32);
            tcd.current_iterations = tcd.initial_iterations;
            tcd.control |= csr::DONE;

            if tcd.interrupt_on_major() {
                *self.reg_mut(INT_OFFSET) |= bit;
            }
            if tcd.disable_request_on_done() {
                *self.reg_mut(ERQ_OFFSET) &= !bit;
            }
            link = tcd.major_link();
        }

        for (i, word) in tcd.encode().iter().enumerate() {
            *self.reg_mut(tcd_offset(channel, i * 4)) = *word;
        }
        if let Some(target) = link {
            *self.csr_mut(target as usize) |= csr::START as u32;
        }
        true
    }

    fn latch_error(&mut self, channel: usize, cause: u32) {
        let csr_word = self.csr_mut(channel);
        *csr_word &= !((csr::START | csr::ACTIVE) as u32);
        self.faulted |= 1 << channel;
        *self.reg_mut(ERR_OFFSET) |= 1 << channel;
        *self.reg_mut(ES_OFFSET) = ES_VLD | cause | ((channel as u32) << ES_ERRCHN_SHIFT);
        if self.reg(CR_OFFSET) & CR_HOE != 0 {
            *self.reg_mut(CR_OFFSET) |= CR_HALT;
        }
    }
}

/// Consistency checks the controller applies before servicing a channel
fn configuration_error(tcd: &TransferDescriptor) -> Option<u32> {
    let size = tcd.element_size.bytes();
    if tcd.minor_loop_bytes == 0
        || tcd.minor_loop_bytes % size != 0
        || tcd.current_iterations & iter::COUNT_MASK == 0
    {
        Some(ES_NCE)
    } else if tcd.source % size != 0 {
        Some(ES_SAE)
    } else if tcd.destination % size != 0 {
        Some(ES_DAE)
    } else if tcd.source_offset as i32 % size as i32 != 0 {
        Some(ES_SOE)
    } else if tcd.destination_offset as i32 % size as i32 != 0 {
        Some(ES_DOE)
    } else {
        None
    }
}

// =============================================================================
// Mock Clock Gate
// =============================================================================

/// Mock clock gate counting enable/disable calls
#[derive(Debug, Default)]
pub struct MockClock {
    fail: bool,
    enables: usize,
    disables: usize,
}

impl MockClock {
    /// Create a gate that always enables
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate whose enable always fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Successful enable calls
    pub fn enable_count(&self) -> usize {
        self.enables
    }

    /// Disable calls
    pub fn disable_count(&self) -> usize {
        self.disables
    }
}

impl ClockGate for MockClock {
    fn enable(&mut self) -> ConfigResult<()> {
        if self.fail {
            return Err(ConfigError::ClockError);
        }
        self.enables += 1;
        Ok(())
    }

    fn disable(&mut self) {
        self.disables += 1;
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: u64,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total microseconds that were "delayed"
    pub fn elapsed_us(&self) -> u64 {
        self.total_ns / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

// =============================================================================
// Simulator Self-Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::{ElementSize, TransferConfig};
    use crate::hal::router::RequestRouter;
    use crate::internal::register::edma::EdmaRegs;

    fn arm(sim: &SimulatedDma, channel: usize, priority: u8, len: u32) -> u32 {
        let src = sim.alloc(len as usize);
        let dst = sim.alloc(len as usize);
        let desc = TransferConfig::memory_to_memory(channel, src, dst, len, ElementSize::Word)
            .descriptor();
        let regs = EdmaRegs::new(sim);
        regs.write_tcd(channel, &desc.encode());
        regs.set_dchpri(channel, priority);
        RequestRouter::new(sim).bind(channel, RequestSource::ALWAYS_ON_0);
        regs.set_request(channel);
        dst
    }

    #[test]
    fn alloc_is_aligned_and_disjoint() {
        let sim = SimulatedDma::new();
        let a = sim.alloc(5);
        let b = sim.alloc(4);
        assert_eq!(a, RAM_BASE);
        assert_eq!(b, RAM_BASE + 32);

        sim.write_u32(b, 0x1234_5678);
        assert_eq!(sim.read_bytes(b, 4), [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(sim.read_u32(b), 0x1234_5678);
    }

    #[test]
    fn command_registers_act_on_one_or_all_channels() {
        let sim = SimulatedDma::new();
        sim.pause();
        let regs = EdmaRegs::new(&sim);

        regs.set_request(3);
        regs.set_request(31);
        assert_eq!(regs.erq(), (1 << 3) | (1 << 31));
        regs.clear_all_requests();
        assert_eq!(regs.erq(), 0);

        regs.start(2);
        assert_eq!(regs.tcd_csr(2), csr::START);
        assert_eq!(regs.read_tcd(0), [0; TCD_WORDS]);
    }

    #[test]
    fn word_write_to_command_block_issues_each_lane() {
        let sim = SimulatedDma::new();
        sim.pause();
        let regs = EdmaRegs::new(&sim);

        // CEEI, SEEI, CERQ are no-ops; SERQ arms channel 5
        sim.write(
            RegisterBlock::Controller,
            CEEI_OFFSET,
            u32::from_le_bytes([CMD_NOP, CMD_NOP, CMD_NOP, 5]),
        );
        assert_eq!(regs.erq(), 1 << 5);
        assert_eq!(regs.eei(), 0);
        assert_eq!(sim.read(RegisterBlock::Controller, CEEI_OFFSET), 0);
    }

    #[test]
    fn priority_registers_reset_to_channel_number() {
        let sim = SimulatedDma::new();
        sim.pause();
        let regs = EdmaRegs::new(&sim);

        assert_eq!(sim.peek(RegisterBlock::Controller, DCHPRI_OFFSET), 0x0001_0203);
        assert_eq!(regs.dchpri(1), 1);
        assert_eq!(regs.dchpri(17), 1);

        regs.set_dchpri(1, 9);
        assert_eq!(sim.peek8(RegisterBlock::Controller, DCHPRI_OFFSET + 2), 9);
        assert_eq!(regs.dchpri(0), 0);
        assert_eq!(regs.dchpri(2), 2);
    }

    #[test]
    fn fixed_priority_serves_highest_priority_first() {
        let sim = SimulatedDma::new();
        sim.pause();
        arm(&sim, 2, 6, 16);
        arm(&sim, 6, 2, 16);
        let regs = EdmaRegs::new(&sim);

        sim.step();

        assert_eq!(regs.tcd_citer(2), 3);
        assert_eq!(regs.tcd_citer(6), 4);
    }

    #[test]
    fn duplicate_priority_latches_priority_error() {
        let sim = SimulatedDma::new();
        sim.pause();
        // Channel 6 keeps its reset priority of 6
        arm(&sim, 2, 6, 16);
        let regs = EdmaRegs::new(&sim);

        assert!(sim.step());

        assert_eq!(regs.tcd_citer(2), 4);
        assert_eq!(regs.err(), 1 << 2);
        assert_eq!(regs.es(), ES_VLD | ES_CPE | (2 << ES_ERRCHN_SHIFT));
        assert!(!sim.step());
    }

    #[test]
    fn round_robin_ignores_duplicate_priorities() {
        let sim = SimulatedDma::new();
        sim.pause();
        let regs = EdmaRegs::new(&sim);
        regs.set_cr(CR_ERCA);
        arm(&sim, 3, 7, 8);

        sim.run_until_idle();

        assert_eq!(regs.err(), 0);
        assert_ne!(regs.tcd_csr(3) & csr::DONE, 0);
    }

    #[test]
    fn active_clears_after_each_minor_loop() {
        let sim = SimulatedDma::new();
        sim.pause();
        arm(&sim, 0, 0, 16);
        let regs = EdmaRegs::new(&sim);

        sim.step();

        assert_eq!(regs.tcd_citer(0), 3);
        assert_eq!(regs.tcd_csr(0) & (csr::ACTIVE | csr::DONE), 0);
    }

    #[test]
    fn round_robin_alternates_channels() {
        let sim = SimulatedDma::new();
        sim.pause();
        let regs = EdmaRegs::new(&sim);
        regs.set_cr(CR_ERCA);
        arm(&sim, 1, 0, 16);
        arm(&sim, 4, 15, 16);

        sim.step();
        sim.step();

        assert_eq!(regs.tcd_citer(1), 3);
        assert_eq!(regs.tcd_citer(4), 3);
    }

    #[test]
    fn halt_blocks_servicing() {
        let sim = SimulatedDma::new();
        sim.pause();
        EdmaRegs::new(&sim).set_cr(CR_HALT);
        arm(&sim, 0, 0, 8);

        assert!(!sim.step());
        assert_eq!(sim.run_until_idle(), 0);
    }

    #[test]
    fn major_link_starts_target_channel() {
        let sim = SimulatedDma::new();
        sim.pause();
        let src = sim.alloc(4);
        let dst = sim.alloc(4);
        let desc = TransferConfig::memory_to_memory(0, src, dst, 4, ElementSize::Word)
            .with_major_link(9)
            .descriptor();
        let regs = EdmaRegs::new(&sim);
        regs.write_tcd(0, &desc.encode());
        regs.start(0);

        assert!(sim.step());

        assert_ne!(regs.tcd_csr(0) & csr::DONE, 0);
        assert_ne!(regs.tcd_csr(9) & csr::START, 0);
    }

    #[test]
    fn descriptor_errors_are_latched() {
        let sim = SimulatedDma::new();
        sim.pause();
        let regs = EdmaRegs::new(&sim);
        // NBYTES = 0
        regs.set_tcd_word(3, TCD_DOFF_CITER, 1 << 16);
        regs.set_tcd_word(3, TCD_CSR_BITER, (1 << 16) | csr::START as u32);

        sim.step();

        assert_eq!(regs.err(), 1 << 3);
        assert_eq!(regs.es(), ES_VLD | ES_NCE | (3 << ES_ERRCHN_SHIFT));
        assert!(!sim.step());
    }

    #[test]
    fn halt_on_error_sets_halt() {
        let sim = SimulatedDma::new();
        sim.pause();
        let regs = EdmaRegs::new(&sim);
        regs.set_cr(CR_HOE);
        let desc = TransferConfig::memory_to_memory(1, 0x3000_0000, RAM_BASE, 4, ElementSize::Word)
            .descriptor();
        regs.write_tcd(1, &desc.encode());
        regs.start(1);

        sim.step();

        assert_ne!(regs.cr() & CR_HALT, 0);
        assert_ne!(regs.es() & ES_SBE, 0);
    }

    #[test]
    fn hardware_request_status_tracks_lines() {
        let sim = SimulatedDma::new();
        let router = RequestRouter::new(&sim);
        router.bind(0, RequestSource::ALWAYS_ON_2);
        router.bind(1, RequestSource::I2C0);

        assert_eq!(sim.peek(RegisterBlock::Controller, HRS_OFFSET), 1);
        sim.assert_request(RequestSource::I2C0);
        assert_eq!(sim.peek(RegisterBlock::Controller, HRS_OFFSET), 0b11);
    }

    #[test]
    fn poke_and_snapshot() {
        let sim = SimulatedDma::new();
        let before = sim.snapshot();
        sim.poke(RegisterBlock::Router, 8, CHCFG_ENBL | 4);
        assert_ne!(sim.snapshot(), before);
        assert_eq!(sim.peek(RegisterBlock::Router, 8), CHCFG_ENBL | 4);
    }
}
