//! Bus access required by the driver
use embedded_hal::spi::{Operation, SpiDevice};

/// Logical identifiers of the lines wired to the ADC.
///
/// The driver does not touch these itself, they are handed to
/// [`Transport::setup`] so that platform code can configure the pins.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct PinAssignment {
    /// Chip select (~CS)
    pub cs: Option<u8>,
    /// Serial data from the host to the ADC (SDI)
    pub sdi: Option<u8>,
    /// Serial data from the ADC to the host (SDO-0)
    pub sdo: Option<u8>,
    /// Serial clock
    pub sclk: Option<u8>,
    /// Active low reset (~RST)
    pub reset: Option<u8>,
}

impl PinAssignment {
    /// Pin assignment for the four bus lines
    pub const fn new(cs: u8, sdi: u8, sdo: u8, sclk: u8) -> Self {
        Self {
            cs: Some(cs),
            sdi: Some(sdi),
            sdo: Some(sdo),
            sclk: Some(sclk),
            reset: None,
        }
    }

    /// Add the reset line
    pub const fn with_reset(self, reset: u8) -> Self {
        Self {
            reset: Some(reset),
            ..self
        }
    }
}

/// Platform capability the driver uses to talk to the ADC.
///
/// Every driver operation is a single call to
/// [`transaction`](Transport::transaction). Its provided implementation
/// brackets the transfers with [`transaction_begin`](Transport::transaction_begin)
/// and [`transaction_end`](Transport::transaction_end), which default to
/// no-ops for platforms without such a concept.
pub trait Transport {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// One time bus and pin initialization.
    fn setup(&mut self, pins: &PinAssignment) -> Result<(), Self::Error> {
        let _ = pins;
        Ok(())
    }

    /// Start a transaction, e.g. assert chip select.
    fn transaction_begin(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Finish a transaction, e.g. release chip select.
    fn transaction_end(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Full duplex exchange, the received bytes replace the contents of `buf`.
    fn transfer(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Exchange all `frames` in order within one transaction.
    ///
    /// The transaction is closed even if a transfer fails, the first error
    /// is returned.
    fn transaction<const N: usize>(&mut self, frames: [&mut [u8]; N]) -> Result<(), Self::Error> {
        self.transaction_begin()?;
        let mut result = Ok(());
        for frame in frames {
            result = self.transfer(frame);
            if result.is_err() {
                break;
            }
        }
        let end = self.transaction_end();
        result.and(end)
    }
}

/// [`Transport`] over an `embedded-hal` [`SpiDevice`].
///
/// Chip select is handled by the device, e.g. `embedded-hal-bus`'s
/// `ExclusiveDevice` or `RefCellDevice` when the bus is shared. The bus must
/// be configured for SPI mode 0.
pub struct SpiTransport<DEV> {
    spi: DEV,
}

impl<DEV> SpiTransport<DEV>
where
    DEV: SpiDevice,
{
    /// Wrap an SPI device
    pub fn new(spi: DEV) -> Self {
        Self { spi }
    }

    /// Release the SPI device
    pub fn destroy(self) -> DEV {
        self.spi
    }
}

impl<DEV> From<DEV> for SpiTransport<DEV>
where
    DEV: SpiDevice,
{
    fn from(spi: DEV) -> Self {
        Self::new(spi)
    }
}

impl<DEV> Transport for SpiTransport<DEV>
where
    DEV: SpiDevice,
{
    type Error = DEV::Error;

    fn transfer(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.transfer_in_place(buf)
    }

    fn transaction<const N: usize>(&mut self, frames: [&mut [u8]; N]) -> Result<(), Self::Error> {
        self.spi.transaction(&mut frames.map(Operation::TransferInPlace))
    }
}
