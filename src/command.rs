//! Command frame encoding and response decoding
use bitfield_struct::bitfield;

/// Address of the input range select register (`RANGE_SEL_REG`)
pub const RANGE_SEL_REG: u8 = 0x14;

/// Length of a full command frame in bytes
pub(crate) const FRAME_LEN: usize = 4;
/// Length of the truncated frame used by fast acquisition
pub(crate) const FAST_FRAME_LEN: usize = 2;

pub(crate) type Frame = [u8; FRAME_LEN];
pub(crate) type FastFrame = [u8; FAST_FRAME_LEN];

/// 7 bit operation codes, sent in the upper bits of the first frame byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum OpCode {
    Nop = 0b000_0000,
    Read = 0b010_0100,
    Write = 0b110_1000,
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

#[bitfield(u8)]
struct CommandByte {
    #[bits(1)]
    _zero: bool,

    #[bits(7)]
    opcode: u8,
}

impl From<OpCode> for CommandByte {
    fn from(op: OpCode) -> Self {
        CommandByte::new().with_opcode(u8::from(op))
    }
}

/// Result of a full 32 bit frame exchange.
///
/// `raw` holds the complete output word as received, `code` its upper half
/// (bits 31-16). Depending on the configured output data word the upper half
/// carries the conversion result or a register value; the lower half carries
/// the optional status and parity bits. No attempt is made to interpret
/// either beyond this split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Sample {
    /// The received 32 bit word, most significant byte first
    pub raw: i32,
    /// Bits 31-16 of `raw`
    pub code: u16,
}

impl Sample {
    pub(crate) fn from_be_bytes(bytes: Frame) -> Self {
        let raw = i32::from_be_bytes(bytes);
        Self {
            raw,
            code: (raw >> 16) as u16,
        }
    }
}

/// Frame writing `data` to the register at `addr`
pub(crate) fn write_frame(addr: u8, data: u16) -> Frame {
    let [hi, lo] = data.to_be_bytes();
    [CommandByte::from(OpCode::Write).into(), addr, hi, lo]
}

/// Frame requesting the register at `addr`
pub(crate) fn read_frame(addr: u8) -> Frame {
    [CommandByte::from(OpCode::Read).into(), addr, 0x00, 0x00]
}

/// Frame that clocks out the next output word without side effects
pub(crate) fn nop_frame() -> Frame {
    [CommandByte::from(OpCode::Nop).into(), 0x00, 0x00, 0x00]
}

pub(crate) fn fast_frame() -> FastFrame {
    [CommandByte::from(OpCode::Nop).into(), 0x00]
}

pub(crate) fn decode_fast(bytes: FastFrame) -> i16 {
    i16::from_be_bytes(bytes)
}
