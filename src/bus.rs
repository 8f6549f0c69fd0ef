//! # Address Space
//!
//! [`AddressSpace`] is the machine's memory bus. Every access is masked to 24
//! bits and resolved in priority order:
//!
//! 1. RAM (`0..ram_size`)
//! 2. ROM window (`0x100000..=0x10FFFF`, writes dropped)
//! 3. Registered ranges: embedded peripherals and slot enumeration blocks
//! 4. Unmapped: reads return 0, writes are dropped
//!
//! Ranges never overlap each other nor the RAM and ROM windows; registration
//! rejects any that would. A slot's device and its enumeration block are
//! stored together in the range that maps them, so removing the range removes
//! both in one step.
//!
//! The address space also performs the bus side of the interrupt router:
//! [`AddressSpace::tick`] advances handlers and synchronous devices, and
//! [`AddressSpace::poll_interrupt`] finds the highest-priority asserted
//! interrupt.

use std::collections::BTreeMap;

use crate::devices::rom::{ROM_BASE, ROM_WINDOW_SIZE};
use crate::devices::{
    slot_base, AddressHandler, AddressRange, BusError, Device, EnumerationBlock,
    InterruptRequest, InterruptSource, Ram, RangeId, Rom, ENUMERATION_SIZE, SLOT_COUNT,
};
use crate::memory::ADDRESS_MASK;
use crate::state::{SlotState, StateError};
use crate::MemoryBus;

/// A device together with the block that fronts it.
struct DeviceSlot {
    block: EnumerationBlock,
    device: Box<dyn Device>,
}

enum RangeTarget {
    Handler(Box<dyn AddressHandler>),
    Slot(DeviceSlot),
}

struct MappedRange {
    id: RangeId,
    range: AddressRange,
    target: RangeTarget,
}

/// RAM, ROM and the registered device ranges of one machine.
///
/// # Examples
///
/// ```
/// use tr3200::{AddressSpace, MemoryBus, Rom};
///
/// let mut bus = AddressSpace::new(64 * 1024, Rom::new(vec![0x11, 0x22]));
///
/// bus.write_word(0x2000, 0x1234);
/// assert_eq!(bus.read_word(0x2000), 0x1234);
///
/// // ROM is read-only
/// bus.write_byte(0x100000, 0xFF);
/// assert_eq!(bus.read_byte(0x100000), 0x11);
///
/// // Unmapped
/// assert_eq!(bus.read_byte(0x80_0000), 0);
/// ```
pub struct AddressSpace {
    ram: Ram,
    rom: Rom,
    ranges: BTreeMap<u32, MappedRange>,
    handler_order: Vec<RangeId>,
    next_id: u32,
}

impl AddressSpace {
    /// Creates an address space with `ram_size` bytes of RAM (at most 1 MiB)
    /// and the given ROM image.
    pub fn new(ram_size: usize, rom: Rom) -> Self {
        Self {
            ram: Ram::new(ram_size),
            rom,
            ranges: BTreeMap::new(),
            handler_order: Vec::new(),
            next_id: 0,
        }
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    // ========== Range Registration ==========

    fn check_free(&self, range: &AddressRange) -> Result<(), BusError> {
        let reserved = [
            ("RAM", 0, self.ram.len() as u32),
            ("the ROM window", ROM_BASE, ROM_WINDOW_SIZE as u32),
        ];
        for (window, start, len) in reserved {
            if let Ok(window_range) = AddressRange::with_len(start, len) {
                if range.overlaps(&window_range) {
                    return Err(BusError::ReservedWindow {
                        start: range.start(),
                        end: range.end(),
                        window,
                    });
                }
            }
        }

        // Only the closest range starting at or below our end can overlap.
        if let Some((_, existing)) = self.ranges.range(..=range.end()).next_back() {
            if existing.range.overlaps(range) {
                return Err(BusError::Overlap {
                    start: range.start(),
                    end: range.end(),
                    existing_start: existing.range.start(),
                    existing_end: existing.range.end(),
                });
            }
        }
        Ok(())
    }

    fn insert(&mut self, range: AddressRange, target: RangeTarget) -> Result<RangeId, BusError> {
        if let Err(err) = self.check_free(&range) {
            tracing::warn!(%err, "range registration rejected");
            return Err(err);
        }
        let id = RangeId(self.next_id);
        self.next_id += 1;
        self.ranges.insert(range.start(), MappedRange { id, range, target });
        Ok(id)
    }

    /// Binds `handler` to `range`.
    ///
    /// Fails if the range overlaps RAM, the ROM window or another registered
    /// range; the address space is unchanged in that case. Handlers are polled
    /// for interrupts in registration order, before any device slot.
    pub fn register_range(
        &mut self,
        range: AddressRange,
        handler: Box<dyn AddressHandler>,
    ) -> Result<RangeId, BusError> {
        let id = self.insert(range, RangeTarget::Handler(handler))?;
        self.handler_order.push(id);
        tracing::debug!(
            id = id.0,
            start = range.start(),
            end = range.end(),
            "range registered"
        );
        Ok(id)
    }

    /// Removes a range registered with [`AddressSpace::register_range`] and
    /// returns its handler.
    ///
    /// Device slot ranges are not affected; use
    /// [`AddressSpace::remove_device`] for those.
    pub fn unregister_range(&mut self, id: RangeId) -> Option<Box<dyn AddressHandler>> {
        let start = self
            .ranges
            .iter()
            .find(|(_, r)| r.id == id && matches!(r.target, RangeTarget::Handler(_)))
            .map(|(&start, _)| start)?;
        let mapped = self.ranges.remove(&start)?;
        self.handler_order.retain(|&h| h != id);
        tracing::debug!(id = id.0, start, "range unregistered");
        match mapped.target {
            RangeTarget::Handler(handler) => Some(handler),
            RangeTarget::Slot(_) => None,
        }
    }

    fn handler_mut(&mut self, id: RangeId) -> Option<&mut Box<dyn AddressHandler>> {
        self.ranges
            .values_mut()
            .filter(|r| r.id == id)
            .find_map(|r| match &mut r.target {
                RangeTarget::Handler(h) => Some(h),
                RangeTarget::Slot(_) => None,
            })
    }

    fn handler(&self, id: RangeId) -> Option<&dyn AddressHandler> {
        self.ranges
            .values()
            .filter(|r| r.id == id)
            .find_map(|r| match &r.target {
                RangeTarget::Handler(h) => Some(h.as_ref()),
                RangeTarget::Slot(_) => None,
            })
    }

    /// Ids of the registered handlers, in registration order.
    pub fn handler_ids(&self) -> &[RangeId] {
        &self.handler_order
    }

    // ========== Device Slots ==========

    fn slot_entry(&self, slot: usize) -> Option<&DeviceSlot> {
        if slot >= SLOT_COUNT {
            return None;
        }
        match &self.ranges.get(&slot_base(slot))?.target {
            RangeTarget::Slot(entry) => Some(entry),
            RangeTarget::Handler(_) => None,
        }
    }

    fn slot_entry_mut(&mut self, slot: usize) -> Option<&mut DeviceSlot> {
        if slot >= SLOT_COUNT {
            return None;
        }
        match &mut self.ranges.get_mut(&slot_base(slot))?.target {
            RangeTarget::Slot(entry) => Some(entry),
            RangeTarget::Handler(_) => None,
        }
    }

    /// Plugs `device` into `slot` and maps its enumeration block at
    /// `0x110000 | slot << 8`.
    ///
    /// Fails if the slot does not exist, is occupied, or its block would
    /// overlap a registered range. The device is dropped on failure.
    pub fn add_device(&mut self, slot: usize, device: Box<dyn Device>) -> Result<(), BusError> {
        if slot >= SLOT_COUNT {
            return Err(BusError::SlotOutOfRange(slot));
        }
        if self.slot_entry(slot).is_some() {
            return Err(BusError::SlotOccupied(slot));
        }

        let range = AddressRange::with_len(slot_base(slot), ENUMERATION_SIZE)?;
        let entry = DeviceSlot {
            block: EnumerationBlock::new(),
            device,
        };
        let (dev_type, subtype, vendor) = (
            entry.device.dev_type(),
            entry.device.dev_subtype(),
            entry.device.vendor_id(),
        );
        self.insert(range, RangeTarget::Slot(entry))?;
        tracing::debug!(slot, dev_type, subtype, vendor, "device attached");
        Ok(())
    }

    /// Unplugs the device in `slot`, unmapping its enumeration block.
    ///
    /// Once this returns the device is no longer reachable through the bus.
    pub fn remove_device(&mut self, slot: usize) -> Option<Box<dyn Device>> {
        self.slot_entry(slot)?;
        let mapped = self.ranges.remove(&slot_base(slot))?;
        tracing::debug!(slot, "device detached");
        match mapped.target {
            RangeTarget::Slot(entry) => Some(entry.device),
            RangeTarget::Handler(_) => None,
        }
    }

    /// Returns the device in `slot`.
    pub fn device(&self, slot: usize) -> Option<&dyn Device> {
        self.slot_entry(slot).map(|entry| entry.device.as_ref())
    }

    /// Returns the device in `slot` mutably.
    pub fn device_mut(&mut self, slot: usize) -> Option<&mut (dyn Device + 'static)> {
        self.slot_entry_mut(slot).map(|entry| entry.device.as_mut())
    }

    /// Occupied slots, ascending.
    pub fn occupied_slots(&self) -> Vec<usize> {
        (0..SLOT_COUNT)
            .filter(|&slot| self.slot_entry(slot).is_some())
            .collect()
    }

    // ========== Clock and Interrupts ==========

    /// Advances every handler and every synchronous device.
    pub fn tick(&mut self, cycles: u32, delta: f64) {
        for mapped in self.ranges.values_mut() {
            match &mut mapped.target {
                RangeTarget::Handler(handler) => handler.tick(cycles, delta),
                RangeTarget::Slot(entry) => {
                    if entry.device.is_synchronous() {
                        entry.device.tick(cycles, delta);
                    }
                }
            }
        }
    }

    /// Returns the highest-priority asserted interrupt without acknowledging it.
    ///
    /// Handlers are checked in registration order, then slots ascending.
    pub fn poll_interrupt(&self) -> Option<InterruptRequest> {
        for &id in &self.handler_order {
            if let Some(message) = self.handler(id).and_then(|h| h.does_interrupt()) {
                return Some(InterruptRequest {
                    source: InterruptSource::Handler(id),
                    message,
                });
            }
        }
        (0..SLOT_COUNT).find_map(|slot| {
            let message = self.slot_entry(slot)?.device.does_interrupt()?;
            Some(InterruptRequest {
                source: InterruptSource::Slot(slot),
                message,
            })
        })
    }

    /// Acknowledges the interrupt of `source` after the processor accepted it.
    pub fn acknowledge(&mut self, source: InterruptSource) {
        match source {
            InterruptSource::Handler(id) => {
                if let Some(handler) = self.handler_mut(id) {
                    handler.iack();
                }
            }
            InterruptSource::Slot(slot) => {
                if let Some(entry) = self.slot_entry_mut(slot) {
                    entry.device.iack();
                }
            }
        }
    }

    /// Resets every handler and device. RAM is left untouched.
    pub fn reset_peripherals(&mut self) {
        for mapped in self.ranges.values_mut() {
            match &mut mapped.target {
                RangeTarget::Handler(handler) => handler.reset(),
                RangeTarget::Slot(entry) => {
                    entry.block = EnumerationBlock::new();
                    entry.device.reset();
                }
            }
        }
    }

    // ========== Snapshots ==========

    /// State blobs of the handlers, in registration order.
    pub(crate) fn save_handlers(&self) -> Vec<Vec<u8>> {
        self.handler_order
            .iter()
            .filter_map(|&id| self.handler(id).map(|h| h.save_state()))
            .collect()
    }

    /// Block buffers and device blobs of the occupied slots, ascending.
    pub(crate) fn save_slots(&self) -> Vec<SlotState> {
        (0..SLOT_COUNT)
            .filter_map(|slot| {
                let entry = self.slot_entry(slot)?;
                Some(SlotState {
                    slot: slot as u8,
                    block: entry.block.to_bytes(),
                    device: entry.device.save_state(),
                })
            })
            .collect()
    }

    /// Restores handler and slot state.
    ///
    /// If any peripheral rejects its blob, every peripheral is put back to
    /// the state it had before the call and the error is returned.
    pub(crate) fn load_peripherals(
        &mut self,
        handlers: &[Vec<u8>],
        slots: &[SlotState],
    ) -> Result<(), StateError> {
        let saved_handlers = self.save_handlers();
        let saved_slots = self.save_slots();

        let result = self.apply_peripherals(handlers, slots);
        if result.is_err() {
            if let Err(err) = self.apply_peripherals(&saved_handlers, &saved_slots) {
                tracing::warn!(%err, "peripheral rejected its own saved state");
            }
        }
        result
    }

    fn apply_peripherals(
        &mut self,
        handlers: &[Vec<u8>],
        slots: &[SlotState],
    ) -> Result<(), StateError> {
        for (index, blob) in handlers.iter().enumerate() {
            if let Some(handler) = self.handler_mut_at(index) {
                handler.load_state(blob)?;
            }
        }
        for state in slots {
            if let Some(entry) = self.slot_entry_mut(state.slot as usize) {
                entry.device.load_state(&state.device)?;
                entry.block = EnumerationBlock::from_bytes(state.block);
            }
        }
        Ok(())
    }

    fn handler_mut_at(&mut self, index: usize) -> Option<&mut Box<dyn AddressHandler>> {
        let id = *self.handler_order.get(index)?;
        self.handler_mut(id)
    }
}

impl MemoryBus for AddressSpace {
    fn read_byte(&mut self, addr: u32) -> u8 {
        let addr = addr & ADDRESS_MASK;
        if self.ram.contains(addr) {
            return self.ram.read(addr);
        }
        if self.rom.contains(addr) {
            return self.rom.read(addr);
        }
        match self.ranges.range_mut(..=addr).next_back() {
            Some((&start, mapped)) if mapped.range.contains(addr) => match &mut mapped.target {
                RangeTarget::Handler(handler) => handler.read_byte(addr - start),
                RangeTarget::Slot(entry) => entry.block.read(entry.device.as_ref(), addr - start),
            },
            _ => 0,
        }
    }

    fn write_byte(&mut self, addr: u32, value: u8) {
        let addr = addr & ADDRESS_MASK;
        if self.ram.contains(addr) {
            self.ram.write(addr, value);
            return;
        }
        if self.rom.contains(addr) {
            return;
        }
        if let Some((&start, mapped)) = self.ranges.range_mut(..=addr).next_back() {
            if mapped.range.contains(addr) {
                match &mut mapped.target {
                    RangeTarget::Handler(handler) => handler.write_byte(addr - start, value),
                    RangeTarget::Slot(entry) => {
                        entry.block.write(entry.device.as_mut(), addr - start, value)
                    }
                }
            }
        }
    }
}
