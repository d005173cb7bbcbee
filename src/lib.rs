//! Driver for the Texas Instruments ADS8681 16 bit SAR ADC with SPI interface
//!
//! The driver encodes the register read/write and data acquisition frames,
//! decodes the returned output words and scales conversion codes to volts
//! according to the selected input range. Bus access goes through the
//! [`Transport`] trait; [`SpiTransport`] implements it on top of an
//! `embedded-hal` [`SpiDevice`](embedded_hal::spi::SpiDevice), so the ADC
//! can sit on a bus shared through `embedded-hal-bus`.
//!
//! ```
//! use ads8681::{Ads8681, InputRange, Transport};
//!
//! struct Idle;
//! impl Transport for Idle {
//!     type Error = core::convert::Infallible;
//!     fn transfer(&mut self, _buf: &mut [u8]) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! let mut adc = Ads8681::new(Idle);
//! adc.begin()?;
//! adc.set_input_range(InputRange::Bipolar10V24)?;
//! assert_eq!(adc.lsb(), 312.5e-6);
//! let volts = adc.calculate_voltage()?;
//! # assert_eq!(volts, 0.0);
//! # Ok::<(), ads8681::Error<core::convert::Infallible>>(())
//! ```
//!
//! # Features
//!
//! - `defmt-03`: `defmt::Format` on public types and trace logging of bus
//!   traffic.

#![deny(unsafe_code, missing_docs)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

mod ads8681;
mod command;
mod range;
mod transport;

pub use command::{Sample, RANGE_SEL_REG};
pub use range::{InputRange, RangeProfile};
pub use transport::{PinAssignment, SpiTransport, Transport};

/// ADS8681 ADC
pub struct Ads8681<T> {
    transport: T,
    pins: PinAssignment,
    profile: RangeProfile,
    initialized: bool,
}

/// Errors for this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus communication error reported by the [`Transport`]
    Spi(E),
}
