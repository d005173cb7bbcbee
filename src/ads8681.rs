use crate::command::{self, Sample, RANGE_SEL_REG};
use crate::{Ads8681, Error, InputRange, PinAssignment, RangeProfile, Transport};

impl<T, E> Ads8681<T>
where
    T: Transport<Error = E>,
{
    /// Create a new driver without pin information
    pub fn new(transport: T) -> Self {
        Self::with_pins(transport, PinAssignment::default())
    }

    /// Create a new driver, `pins` is passed on to [`Transport::setup`]
    pub fn with_pins(transport: T, pins: PinAssignment) -> Self {
        Self {
            transport,
            pins,
            profile: RangeProfile::DEFAULT,
            initialized: false,
        }
    }

    /// Release the transport
    pub fn destroy(self) -> T {
        self.transport
    }

    /// Run the platform setup. Has to be called before any other operation,
    /// repeated calls do nothing.
    pub fn begin(&mut self) -> Result<(), Error<E>> {
        if self.initialized {
            return Ok(());
        }
        debug!("ads8681: setup");
        self.transport.setup(&self.pins).map_err(Error::Spi)?;
        self.initialized = true;
        Ok(())
    }

    /// Select the analog input range and update the scale factors to match.
    pub fn set_input_range(&mut self, range: InputRange) -> Result<(), Error<E>> {
        self.set_input_range_code(u8::from(range))
    }

    /// Write a raw code to the range select register. Codes that do not
    /// correspond to an [`InputRange`] select [`RangeProfile::DEFAULT`].
    pub fn set_input_range_code(&mut self, code: u8) -> Result<(), Error<E>> {
        self.write_register(RANGE_SEL_REG, u16::from(code))?;
        self.profile = RangeProfile::from_code(code);
        debug!(
            "ads8681: range code {=u8:x}, fsr {=f32} V, lsb {=f32} V",
            code,
            self.profile.full_scale_range,
            self.profile.lsb
        );
        Ok(())
    }

    /// Read back the input range from the range select register.
    /// Returns `None` if the register holds a reserved code.
    pub fn input_range(&mut self) -> Result<Option<InputRange>, Error<E>> {
        // The register byte is shifted out first, RANGE_SEL is its low nibble
        let word = self.read_register(RANGE_SEL_REG)?;
        Ok(InputRange::try_from(((word.code >> 8) & 0x0F) as u8).ok())
    }

    /// Active full scale range in volts
    pub fn full_scale_range(&self) -> f32 {
        self.profile.full_scale_range
    }

    /// Active LSB size in volts
    pub fn lsb(&self) -> f32 {
        self.profile.lsb
    }

    /// Active scale factors
    pub fn profile(&self) -> RangeProfile {
        self.profile
    }

    /// Pins handed to the transport on [`begin`](Self::begin)
    pub fn pins(&self) -> &PinAssignment {
        &self.pins
    }

    /// Read a register.
    ///
    /// The ADC only returns the register contents on the frame following the
    /// read command, so the command is sent twice within one transaction.
    /// The register contents end up in the leading bytes of the returned
    /// word, i.e. the upper byte of [`Sample::code`] for a byte read.
    pub fn read_register(&mut self, addr: u8) -> Result<Sample, Error<E>> {
        let mut frame = command::read_frame(addr);
        let mut latch = frame;
        trace!("ads8681: read {:x}", frame);
        self.transport
            .transaction([&mut latch[..], &mut frame[..]])
            .map_err(Error::Spi)?;
        Ok(Sample::from_be_bytes(frame))
    }

    /// Acquire the full 32 bit output word, conversion result plus status
    /// bits.
    pub fn acquire(&mut self) -> Result<Sample, Error<E>> {
        let mut frame = command::nop_frame();
        let mut dummy = frame;
        self.transport
            .transaction([&mut dummy[..], &mut frame[..]])
            .map_err(Error::Spi)?;
        let sample = Sample::from_be_bytes(frame);
        trace!("ads8681: acquired {=i32:x}", sample.raw);
        Ok(sample)
    }

    /// Acquire only the 16 bit conversion result, as fast as possible.
    ///
    /// > The frame is cut short after 16 clocks. Each call therefore returns
    /// > the result of the conversion started by the previous call, and the
    /// > status bits of the output word are not available.
    pub fn acquire_fast(&mut self) -> Result<i16, Error<E>> {
        let mut frame = command::fast_frame();
        self.transport
            .transaction([&mut frame[..]])
            .map_err(Error::Spi)?;
        Ok(command::decode_fast(frame))
    }

    /// Acquire a conversion with [`acquire_fast`](Self::acquire_fast) and
    /// scale it to volts using the active LSB size.
    pub fn calculate_voltage(&mut self) -> Result<f32, Error<E>> {
        let code = self.acquire_fast()?;
        Ok(self.profile.to_volts(code))
    }

    fn write_register(&mut self, addr: u8, data: u16) -> Result<(), Error<E>> {
        let mut frame = command::write_frame(addr, data);
        trace!("ads8681: write {:x}", frame);
        self.transport
            .transaction([&mut frame[..]])
            .map_err(Error::Spi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    struct FakeError;

    #[derive(Debug, PartialEq)]
    enum Event {
        Setup,
        Begin,
        Transfer(Vec<u8>),
        End,
    }

    /// Records bus activity and answers transfers from a script
    #[derive(Default)]
    struct FakeTransport {
        events: Vec<Event>,
        responses: VecDeque<Vec<u8>>,
        fail_setup: bool,
        fail_begin: bool,
        fail_transfers: bool,
    }

    impl FakeTransport {
        fn replying(responses: &[&[u8]]) -> Self {
            Self {
                responses: responses.iter().map(|r| r.to_vec()).collect(),
                ..Default::default()
            }
        }
    }

    impl Transport for FakeTransport {
        type Error = FakeError;

        fn setup(&mut self, _pins: &PinAssignment) -> Result<(), Self::Error> {
            self.events.push(Event::Setup);
            if self.fail_setup {
                return Err(FakeError);
            }
            Ok(())
        }

        fn transaction_begin(&mut self) -> Result<(), Self::Error> {
            self.events.push(Event::Begin);
            if self.fail_begin {
                return Err(FakeError);
            }
            Ok(())
        }

        fn transaction_end(&mut self) -> Result<(), Self::Error> {
            self.events.push(Event::End);
            Ok(())
        }

        fn transfer(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
            self.events.push(Event::Transfer(buf.to_vec()));
            if self.fail_transfers {
                return Err(FakeError);
            }
            if let Some(rx) = self.responses.pop_front() {
                buf.copy_from_slice(&rx);
            }
            Ok(())
        }
    }

    fn transfer(bytes: &[u8]) -> Event {
        Event::Transfer(bytes.to_vec())
    }

    #[test]
    fn begin_runs_setup_once() {
        let mut adc = Ads8681::new(FakeTransport::default());
        adc.begin().unwrap();
        adc.begin().unwrap();
        assert_eq!(adc.destroy().events, vec![Event::Setup]);
    }

    #[test]
    fn starts_with_default_profile() {
        let adc = Ads8681::new(FakeTransport::default());
        assert_eq!(adc.profile(), RangeProfile::DEFAULT);
        assert_eq!(adc.full_scale_range(), 5.12);
        assert_eq!(adc.lsb(), 78.125e-6);
    }

    #[test]
    fn set_input_range_writes_range_register() {
        let mut adc = Ads8681::new(FakeTransport::default());
        adc.begin().unwrap();
        adc.set_input_range(InputRange::Bipolar5V12).unwrap();
        assert_eq!(adc.full_scale_range(), 10.24);
        assert_eq!(adc.lsb(), 156.25e-6);
        assert_eq!(
            adc.destroy().events,
            vec![
                Event::Setup,
                Event::Begin,
                transfer(&[0xD0, 0x14, 0x00, 0x03]),
                Event::End
            ]
        );
    }

    #[test]
    fn every_range_updates_profile() {
        let mut adc = Ads8681::new(FakeTransport::default());
        for range in InputRange::ALL {
            adc.set_input_range(range).unwrap();
            assert_eq!(adc.profile(), range.profile());
        }
    }

    #[test]
    fn reserved_range_code_falls_back() {
        let mut adc = Ads8681::new(FakeTransport::default());
        adc.set_input_range(InputRange::Bipolar12V288).unwrap();
        assert_eq!(adc.full_scale_range(), 24.576);

        adc.set_input_range_code(0x07).unwrap();
        assert_eq!(adc.full_scale_range(), 5.12);
        assert_eq!(adc.lsb(), 78.125e-6);

        let events = adc.destroy().events;
        assert_eq!(events[4], transfer(&[0xD0, 0x14, 0x00, 0x07]));
    }

    #[test]
    fn read_register_sends_command_twice() {
        let fake = FakeTransport::replying(&[&[0xAA, 0xAA, 0xAA, 0xAA], &[0x0B, 0x00, 0x00, 0x00]]);
        let mut adc = Ads8681::new(fake);
        let word = adc.read_register(RANGE_SEL_REG).unwrap();
        assert_eq!(word.raw, 0x0B00_0000);
        assert_eq!(word.code, 0x0B00);
        assert_eq!(
            adc.destroy().events,
            vec![
                Event::Begin,
                transfer(&[0x48, 0x14, 0x00, 0x00]),
                transfer(&[0x48, 0x14, 0x00, 0x00]),
                Event::End
            ]
        );
    }

    #[test]
    fn input_range_readback() {
        let fake = FakeTransport::replying(&[&[0; 4], &[0x09, 0x00, 0x00, 0x00]]);
        let mut adc = Ads8681::new(fake);
        assert_eq!(adc.input_range().unwrap(), Some(InputRange::Unipolar10V24));

        let fake = FakeTransport::replying(&[&[0; 4], &[0x0B, 0x00, 0x00, 0x00]]);
        let mut adc = Ads8681::new(fake);
        assert_eq!(adc.input_range().unwrap(), Some(InputRange::Unipolar5V12));

        // Only the register byte counts
        let fake = FakeTransport::replying(&[&[0; 4], &[0x00, 0x0B, 0xFF, 0xFF]]);
        let mut adc = Ads8681::new(fake);
        assert_eq!(adc.input_range().unwrap(), Some(InputRange::Bipolar12V288));

        // INTREF_DIS set, reserved range code
        let fake = FakeTransport::replying(&[&[0; 4], &[0x4F, 0x00, 0x00, 0x00]]);
        let mut adc = Ads8681::new(fake);
        assert_eq!(adc.input_range().unwrap(), None);
    }

    #[test]
    fn acquire_decodes_second_frame() {
        let fake = FakeTransport::replying(&[&[0xFF, 0xFF, 0xFF, 0xFF], &[0x00, 0x01, 0x23, 0x45]]);
        let mut adc = Ads8681::new(fake);
        let sample = adc.acquire().unwrap();
        assert_eq!(sample.raw, 0x0001_2345);
        assert_eq!(sample.code, 0x0001);
        assert_eq!(
            adc.destroy().events,
            vec![
                Event::Begin,
                transfer(&[0x00; 4]),
                transfer(&[0x00; 4]),
                Event::End
            ]
        );
    }

    #[test]
    fn acquire_fast_uses_single_short_frame() {
        let fake = FakeTransport::replying(&[&[0xFE, 0x0C]]);
        let mut adc = Ads8681::new(fake);
        assert_eq!(adc.acquire_fast().unwrap(), -500);
        assert_eq!(
            adc.destroy().events,
            vec![Event::Begin, transfer(&[0x00, 0x00]), Event::End]
        );
    }

    #[test]
    fn calculate_voltage_scales_by_lsb() {
        let fake = FakeTransport::replying(&[&[0x01, 0x00]]);
        let mut adc = Ads8681::new(fake);
        let volts = adc.calculate_voltage().unwrap();
        assert!((volts - 0.02).abs() < 1e-6);
    }

    #[test]
    fn acquisition_before_begin_does_not_panic() {
        let mut adc = Ads8681::new(FakeTransport::default());
        assert_eq!(adc.acquire().unwrap(), Sample { raw: 0, code: 0 });
        assert_eq!(adc.acquire_fast().unwrap(), 0);
        assert_eq!(adc.calculate_voltage().unwrap(), 0.0);
    }

    #[test]
    fn failed_transfer_closes_transaction() {
        let fake = FakeTransport {
            fail_transfers: true,
            ..Default::default()
        };
        let mut adc = Ads8681::new(fake);
        adc.set_input_range(InputRange::Bipolar12V288)
            .expect_err("transfer fails");
        assert_eq!(adc.profile(), RangeProfile::DEFAULT);
        assert_eq!(adc.acquire(), Err(Error::Spi(FakeError)));

        let events = adc.destroy().events;
        assert_eq!(
            events,
            vec![
                Event::Begin,
                transfer(&[0xD0, 0x14, 0x00, 0x00]),
                Event::End,
                Event::Begin,
                transfer(&[0x00; 4]),
                Event::End
            ]
        );
    }

    #[test]
    fn failed_setup_can_be_retried() {
        let fake = FakeTransport {
            fail_setup: true,
            ..Default::default()
        };
        let mut adc = Ads8681::new(fake);
        assert_eq!(adc.begin(), Err(Error::Spi(FakeError)));

        let mut fake = adc.destroy();
        fake.fail_setup = false;
        let mut adc = Ads8681::new(fake);
        adc.begin().unwrap();
        adc.begin().unwrap();
        assert_eq!(adc.destroy().events, vec![Event::Setup, Event::Setup]);
    }

    #[test]
    fn setup_error_leaves_driver_uninitialized() {
        let fake = FakeTransport {
            fail_setup: true,
            ..Default::default()
        };
        let mut adc = Ads8681::new(fake);
        adc.begin().expect_err("setup fails");
        adc.begin().expect_err("setup is attempted again");
        assert_eq!(adc.destroy().events, vec![Event::Setup, Event::Setup]);
    }

    #[test]
    fn failed_begin_skips_transfers() {
        let fake = FakeTransport {
            fail_begin: true,
            ..Default::default()
        };
        let mut adc = Ads8681::new(fake);
        assert_eq!(adc.acquire_fast(), Err(Error::Spi(FakeError)));
        adc.set_input_range(InputRange::Bipolar10V24)
            .expect_err("transaction cannot start");
        assert_eq!(adc.profile(), RangeProfile::DEFAULT);
        assert_eq!(adc.destroy().events, vec![Event::Begin, Event::Begin]);
    }
}
