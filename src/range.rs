//! Input ranges and the scale factors derived from them

/// Analog input ranges selectable through the `RANGE_SEL` register.
/// Spans are given for the internal 4.096V reference.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum InputRange {
    /// ±3 × Vref, -12.288V to +12.288V
    Bipolar12V288 = 0x00,
    /// ±2.5 × Vref, -10.24V to +10.24V
    Bipolar10V24 = 0x01,
    /// ±1.5 × Vref, -6.144V to +6.144V
    Bipolar6V144 = 0x02,
    /// ±1.25 × Vref, -5.12V to +5.12V
    Bipolar5V12 = 0x03,
    /// ±0.625 × Vref, -2.56V to +2.56V
    Bipolar2V56 = 0x04,
    /// 3 × Vref, 0V to +12.288V
    Unipolar12V288 = 0x08,
    /// 2.5 × Vref, 0V to +10.24V
    Unipolar10V24 = 0x09,
    /// 1.5 × Vref, 0V to +6.144V
    Unipolar6V144 = 0x0A,
    /// 1.25 × Vref, 0V to +5.12V
    Unipolar5V12 = 0x0B,
}

impl InputRange {
    /// All ranges in register code order
    pub const ALL: [InputRange; 9] = [
        Self::Bipolar12V288,
        Self::Bipolar10V24,
        Self::Bipolar6V144,
        Self::Bipolar5V12,
        Self::Bipolar2V56,
        Self::Unipolar12V288,
        Self::Unipolar10V24,
        Self::Unipolar6V144,
        Self::Unipolar5V12,
    ];

    /// Scale factors for this range
    pub const fn profile(self) -> RangeProfile {
        match self {
            Self::Bipolar12V288 => RangeProfile::new(24.576, 375e-6),
            Self::Bipolar10V24 => RangeProfile::new(20.48, 312.5e-6),
            Self::Bipolar6V144 => RangeProfile::new(12.288, 187.5e-6),
            Self::Bipolar5V12 => RangeProfile::new(10.24, 156.25e-6),
            Self::Bipolar2V56 => RangeProfile::new(5.12, 78.125e-6),
            Self::Unipolar12V288 => RangeProfile::new(12.288, 187.5e-6),
            Self::Unipolar10V24 => RangeProfile::new(10.24, 156.25e-6),
            Self::Unipolar6V144 => RangeProfile::new(6.144, 93.75e-6),
            Self::Unipolar5V12 => RangeProfile::DEFAULT,
        }
    }
}

impl From<InputRange> for u8 {
    fn from(range: InputRange) -> Self {
        range as u8
    }
}

/// Returns the unrecognised code
impl TryFrom<u8> for InputRange {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Bipolar12V288),
            0x01 => Ok(Self::Bipolar10V24),
            0x02 => Ok(Self::Bipolar6V144),
            0x03 => Ok(Self::Bipolar5V12),
            0x04 => Ok(Self::Bipolar2V56),
            0x08 => Ok(Self::Unipolar12V288),
            0x09 => Ok(Self::Unipolar10V24),
            0x0A => Ok(Self::Unipolar6V144),
            0x0B => Ok(Self::Unipolar5V12),
            other => Err(other),
        }
    }
}

/// Full scale span and code weight of the active input range
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct RangeProfile {
    /// Full scale range in volts
    pub full_scale_range: f32,
    /// Voltage of one code step (LSB size) in volts
    pub lsb: f32,
}

impl RangeProfile {
    /// Profile used before any range is selected and for unrecognised codes
    pub const DEFAULT: RangeProfile = RangeProfile::new(5.12, 78.125e-6);

    const fn new(full_scale_range: f32, lsb: f32) -> Self {
        Self {
            full_scale_range,
            lsb,
        }
    }

    /// Profile for a raw `RANGE_SEL` code, falling back to [`RangeProfile::DEFAULT`]
    pub fn from_code(code: u8) -> Self {
        InputRange::try_from(code)
            .map(InputRange::profile)
            .unwrap_or(Self::DEFAULT)
    }

    /// Scale a signed conversion code to volts
    pub fn to_volts(&self, code: i16) -> f32 {
        f32::from(code) * self.lsb
    }
}

impl Default for RangeProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<InputRange> for RangeProfile {
    fn from(range: InputRange) -> Self {
        range.profile()
    }
}
