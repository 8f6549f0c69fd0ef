//! Enumeration and control block of a device slot.
//!
//! Every occupied slot gets a 20-byte block at `0x110000 | slot << 8`:
//!
//! | Offset | Access | Content |
//! |--------|--------|---------|
//! | 0x00 | R | presence byte, always 0xFF |
//! | 0x01 | R | device type |
//! | 0x02 | R | device subtype |
//! | 0x03 | R | device id |
//! | 0x04-0x07 | R | vendor id (little-endian) |
//! | 0x08-0x09 | W | command register |
//! | 0x0A-0x13 | RW | data registers A-E (16-bit each) |
//!
//! Writing the low byte of the command register or of a data register only
//! buffers it. Writing the high byte commits the composed 16-bit value: the
//! command is sent to the device once, a data register is forwarded to its
//! setter. A half-word store hits the low byte first, so it commits exactly
//! once.

use super::{get_register, set_register, Device};

/// Address of slot 0's block.
pub const ENUMERATION_BASE: u32 = 0x11_0000;

/// Bytes occupied by each block.
pub const ENUMERATION_SIZE: u32 = 20;

/// Number of device slots.
pub const SLOT_COUNT: usize = 32;

const PRESENT: u8 = 0xFF;
const CMD_LOW: u32 = 0x08;
const CMD_HIGH: u32 = 0x09;
const REGS: u32 = 0x0A;

/// Bytes of buffered writes a block carries between accesses.
pub const BLOCK_STATE_SIZE: usize = 6;

/// First address of the block for `slot`.
pub const fn slot_base(slot: usize) -> u32 {
    ENUMERATION_BASE | ((slot as u32 & 0x1F) << 8)
}

/// Write buffers of one slot's block.
///
/// The block holds no identification of its own: it is always paired with
/// the device it fronts, and reads go straight to the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationBlock {
    cmd_low: u8,
    reg_low: [u8; 5],
}

impl EnumerationBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffered low bytes: the command register first, then A-E.
    pub fn to_bytes(&self) -> [u8; BLOCK_STATE_SIZE] {
        let mut out = [0; BLOCK_STATE_SIZE];
        out[0] = self.cmd_low;
        out[1..].copy_from_slice(&self.reg_low);
        out
    }

    pub fn from_bytes(bytes: [u8; BLOCK_STATE_SIZE]) -> Self {
        let mut reg_low = [0; 5];
        reg_low.copy_from_slice(&bytes[1..]);
        Self {
            cmd_low: bytes[0],
            reg_low,
        }
    }

    /// Reads the byte at `offset` within the block.
    pub fn read(&self, device: &dyn Device, offset: u32) -> u8 {
        match offset {
            0x00 => PRESENT,
            0x01 => device.dev_type(),
            0x02 => device.dev_subtype(),
            0x03 => device.dev_id(),
            0x04..=0x07 => device.vendor_id().to_le_bytes()[(offset - 0x04) as usize],
            // Command register is write-only
            CMD_LOW | CMD_HIGH => 0,
            REGS..=0x13 => {
                let rel = offset - REGS;
                let value = get_register(device, (rel / 2) as usize);
                value.to_le_bytes()[(rel % 2) as usize]
            }
            _ => 0,
        }
    }

    /// Writes the byte at `offset` within the block.
    pub fn write(&mut self, device: &mut dyn Device, offset: u32, value: u8) {
        match offset {
            CMD_LOW => self.cmd_low = value,
            CMD_HIGH => {
                let cmd = u16::from_le_bytes([self.cmd_low, value]);
                tracing::trace!(cmd, "device command");
                device.send_cmd(cmd);
            }
            REGS..=0x13 => {
                let rel = offset - REGS;
                let index = (rel / 2) as usize;
                if rel % 2 == 0 {
                    self.reg_low[index] = value;
                } else {
                    let word = u16::from_le_bytes([self.reg_low[index], value]);
                    set_register(device, index, word);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        cmds: Vec<u16>,
        regs: [u16; 5],
    }

    impl Device for Recorder {
        fn reset(&mut self) {}
        fn send_cmd(&mut self, cmd: u16) {
            self.cmds.push(cmd);
        }
        fn c(&self) -> u16 {
            self.regs[2]
        }
        fn set_c(&mut self, value: u16) {
            self.regs[2] = value;
        }
        fn set_e(&mut self, value: u16) {
            self.regs[4] = value;
        }
        fn dev_type(&self) -> u8 {
            0x03
        }
        fn dev_subtype(&self) -> u8 {
            0x01
        }
        fn dev_id(&self) -> u8 {
            0x02
        }
        fn vendor_id(&self) -> u32 {
            0x1C6C_8B36
        }
    }

    #[test]
    fn test_slot_base() {
        assert_eq!(slot_base(0), 0x11_0000);
        assert_eq!(slot_base(1), 0x11_0100);
        assert_eq!(slot_base(31), 0x11_1F00);
    }

    #[test]
    fn test_identification() {
        let block = EnumerationBlock::new();
        let dev = Recorder::default();

        assert_eq!(block.read(&dev, 0), 0xFF);
        assert_eq!(block.read(&dev, 1), 0x03);
        assert_eq!(block.read(&dev, 2), 0x01);
        assert_eq!(block.read(&dev, 3), 0x02);
        let vendor: Vec<u8> = (4..8).map(|o| block.read(&dev, o)).collect();
        assert_eq!(vendor, 0x1C6C_8B36u32.to_le_bytes());
        assert_eq!(block.read(&dev, 20), 0);
    }

    #[test]
    fn test_command_commits_on_high_byte() {
        let mut block = EnumerationBlock::new();
        let mut dev = Recorder::default();

        block.write(&mut dev, CMD_LOW, 0x34);
        assert!(dev.cmds.is_empty());
        block.write(&mut dev, CMD_HIGH, 0x12);
        assert_eq!(dev.cmds, vec![0x1234]);
        assert_eq!(block.read(&dev, CMD_LOW), 0);
    }

    #[test]
    fn test_register_commits_on_high_byte() {
        let mut block = EnumerationBlock::new();
        let mut dev = Recorder::default();

        // Register C lives at 0x0E-0x0F
        block.write(&mut dev, 0x0E, 0xCD);
        assert_eq!(dev.regs[2], 0);
        block.write(&mut dev, 0x0F, 0xAB);
        assert_eq!(dev.regs[2], 0xABCD);
        assert_eq!(block.read(&dev, 0x0E), 0xCD);
        assert_eq!(block.read(&dev, 0x0F), 0xAB);

        // Register E lives at 0x12-0x13
        block.write(&mut dev, 0x12, 0x01);
        block.write(&mut dev, 0x13, 0x00);
        assert_eq!(dev.regs[4], 1);
    }

    #[test]
    fn test_buffered_bytes_survive_save_and_restore() {
        let mut block = EnumerationBlock::new();
        let mut dev = Recorder::default();
        block.write(&mut dev, CMD_LOW, 0x34);
        block.write(&mut dev, 0x0E, 0xCD);

        let mut restored = EnumerationBlock::from_bytes(block.to_bytes());
        assert_eq!(restored, block);

        restored.write(&mut dev, CMD_HIGH, 0x12);
        restored.write(&mut dev, 0x0F, 0xAB);
        assert_eq!(dev.cmds, vec![0x1234]);
        assert_eq!(dev.regs[2], 0xABCD);
    }
}
