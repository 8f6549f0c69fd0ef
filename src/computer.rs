//! # The Whole Machine
//!
//! [`Computer`] owns a processor wired to an [`AddressSpace`] with the
//! embedded peripherals mapped, and drives the interrupt router:
//!
//! - `step()` runs one instruction slot, ticks the bus by the cycles it cost
//!   and performs one round of interrupt polling
//! - `tick(n)` interleaves processor, bus and polling one cycle at a time, so
//!   devices observe cycle-accurate timing
//!
//! Each polling round offers at most one interrupt; the source is acknowledged
//! only if the processor accepts the message.

use crate::devices::beeper::{BEEPER_BASE, BEEPER_SIZE};
use crate::devices::rng::{RNG_BASE, RNG_SIZE};
use crate::devices::rtc::{RTC_BASE, RTC_SIZE};
use crate::devices::timer::{TIMER_BASE, TIMER_SIZE};
use crate::devices::{AddressRange, Beeper, BusError, Device, Rng, Rom, Rtc, Timer};
use crate::state::{Snapshot, StateError};
use crate::{AddressSpace, ComputerConfig, ConfigError, DeviceRegistry, MemoryBus, Processor};

/// A complete TR3200 machine.
///
/// # Examples
///
/// ```
/// use tr3200::encode::{self, Arg};
/// use tr3200::{opcodes, Computer, ComputerConfig};
///
/// let mut program = encode::two(opcodes::MOV, 1, Arg::Lit(7));
/// program.extend(encode::three(opcodes::ADD, 1, 1, Arg::Lit(3)));
/// program.extend(encode::zero(opcodes::SLEEP));
///
/// let config = ComputerConfig::default().with_rom(encode::to_bytes(&program));
/// let mut computer = Computer::new(config).unwrap();
///
/// computer.step();
/// computer.step();
/// assert_eq!(computer.processor().register(1), 10);
/// ```
pub struct Computer {
    cpu: Processor<AddressSpace>,
    config: ComputerConfig,
}

impl Computer {
    /// Builds a machine from `config`, with the timer, beeper, RTC and RNG
    /// mapped in that priority order.
    pub fn new(config: ComputerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut bus = AddressSpace::new(config.ram_size, Rom::new(config.rom.clone()));
        let rng = match config.rng_seed {
            Some(seed) => Rng::new(seed),
            None => Rng::from_entropy(),
        };
        bus.register_range(
            AddressRange::with_len(TIMER_BASE, TIMER_SIZE)?,
            Box::new(Timer::new()),
        )?;
        bus.register_range(
            AddressRange::with_len(BEEPER_BASE, BEEPER_SIZE)?,
            Box::new(Beeper::new()),
        )?;
        bus.register_range(
            AddressRange::with_len(RTC_BASE, RTC_SIZE)?,
            Box::new(Rtc::new(config.rtc_epoch)),
        )?;
        bus.register_range(AddressRange::with_len(RNG_BASE, RNG_SIZE)?, Box::new(rng))?;

        tracing::debug!(
            ram = config.ram_size,
            rom = config.rom.len(),
            clock_hz = config.clock_hz,
            "computer created"
        );

        Ok(Self {
            cpu: Processor::new(bus),
            config,
        })
    }

    pub fn config(&self) -> &ComputerConfig {
        &self.config
    }

    pub fn processor(&self) -> &Processor<AddressSpace> {
        &self.cpu
    }

    pub fn processor_mut(&mut self) -> &mut Processor<AddressSpace> {
        &mut self.cpu
    }

    pub fn bus(&self) -> &AddressSpace {
        self.cpu.memory()
    }

    pub fn bus_mut(&mut self) -> &mut AddressSpace {
        self.cpu.memory_mut()
    }

    fn seconds(&self, cycles: u32) -> f64 {
        cycles as f64 / self.config.clock_hz as f64
    }

    /// Runs one instruction slot and returns the cycles it cost.
    pub fn step(&mut self) -> u32 {
        let cycles = self.cpu.step();
        let delta = self.seconds(cycles);
        self.cpu.memory_mut().tick(cycles, delta);
        self.route_interrupt();
        cycles
    }

    /// Advances the whole machine by exactly `n` clock cycles.
    pub fn tick(&mut self, n: u32) {
        let delta = self.seconds(1);
        for _ in 0..n {
            self.cpu.tick(1);
            self.cpu.memory_mut().tick(1, delta);
            self.route_interrupt();
        }
    }

    /// Offers the highest-priority asserted interrupt to the processor.
    ///
    /// Returns true if one was accepted.
    fn route_interrupt(&mut self) -> bool {
        let Some(request) = self.cpu.memory().poll_interrupt() else {
            return false;
        };
        if !self.cpu.send_interrupt(request.message) {
            return false;
        }
        self.cpu.memory_mut().acknowledge(request.source);
        true
    }

    /// Resets the processor and every peripheral. RAM keeps its contents.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.memory_mut().reset_peripherals();
    }

    /// Copies `bytes` into RAM at `addr`.
    pub fn load_ram(&mut self, addr: u32, bytes: &[u8]) {
        self.bus_mut().ram_mut().load(addr, bytes);
    }

    /// Frequency currently programmed into the beeper, in Hz (0 = silent).
    pub fn beep_frequency(&mut self) -> u16 {
        self.bus_mut().read_half(BEEPER_BASE)
    }

    // ========== Devices ==========

    /// Plugs `device` into `slot`.
    pub fn add_device(&mut self, slot: usize, device: Box<dyn Device>) -> Result<(), BusError> {
        self.bus_mut().add_device(slot, device)
    }

    /// Unplugs the device in `slot`.
    pub fn remove_device(&mut self, slot: usize) -> Option<Box<dyn Device>> {
        self.bus_mut().remove_device(slot)
    }

    /// Builds the device registered as `name` and plugs it into `slot`.
    pub fn attach_from_registry(
        &mut self,
        registry: &DeviceRegistry,
        name: &str,
        slot: usize,
    ) -> Result<(), BusError> {
        let device = registry
            .create(name)
            .ok_or_else(|| BusError::UnknownDevice(name.to_string()))?;
        self.add_device(slot, device)
    }

    // ========== Snapshots ==========

    /// Captures processor, RAM, embedded peripherals and every slot device.
    pub fn save_snapshot(&self) -> Snapshot {
        let bus = self.bus();
        Snapshot {
            processor: self.cpu.state(),
            ram: bus.ram().as_slice().to_vec(),
            handlers: bus.save_handlers(),
            slots: bus.save_slots(),
        }
    }

    /// Restores a snapshot taken from a machine with the same RAM size and
    /// device set.
    ///
    /// On error the machine is left exactly as it was, including when a
    /// peripheral rejects its blob.
    pub fn load_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), StateError> {
        let bus = self.bus_mut();
        if snapshot.ram.len() != bus.ram().len() {
            return Err(StateError::RamSize {
                expected: bus.ram().len(),
                actual: snapshot.ram.len(),
            });
        }
        if snapshot.handlers.len() != bus.handler_ids().len() {
            return Err(StateError::UnknownTarget(format!(
                "{} handler blobs for {} handlers",
                snapshot.handlers.len(),
                bus.handler_ids().len()
            )));
        }
        for state in &snapshot.slots {
            if bus.device(state.slot as usize).is_none() {
                return Err(StateError::UnknownTarget(format!("slot {}", state.slot)));
            }
        }

        bus.load_peripherals(&snapshot.handlers, &snapshot.slots)?;
        bus.ram_mut().load(0, &snapshot.ram);
        self.cpu.set_state(&snapshot.processor);
        tracing::debug!(cycles = snapshot.processor.cycles, "snapshot loaded");
        Ok(())
    }
}
