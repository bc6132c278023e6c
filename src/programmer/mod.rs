mod bulk;
mod state;

pub use self::bulk::format_dump_line;
pub use self::state::{
	BusDirection,
	BusState,
};

use crate::config::ProgrammerConfig;
use crate::error::ProgrammerError;
use crate::pins::{
	BitOrder,
	Level,
	PinMode,
};
use crate::timer::{
	Delay,
	TickTimer,
};
use crate::transport::{
	CheckedTransport,
	PinTransport,
};

/// Parallel EEPROM (AT28C16 style) behind a GPIO bridge; addresses go through
/// two cascaded 74HC595 (high byte first)
pub struct Programmer<T: PinTransport, D: Delay = TickTimer> {
	transport: T,
	timer: D,
	config: ProgrammerConfig,
	state: BusState,
	released: bool,
}

impl<T: PinTransport> Programmer<T> {
	/// Programmer busy-waiting on the monotonic clock
	pub fn open(transport: T, config: ProgrammerConfig) -> crate::AResult<Self> {
		let timer = with_context!("monotonic clock unavailable", Ok(TickTimer::new()?))?;
		Self::with_timer(transport, config, timer)
	}
}

impl<T: PinTransport, D: Delay> Programmer<T, D> {
	/// Takes over the bridge and runs the setup sequence
	pub fn with_timer(transport: T, config: ProgrammerConfig, timer: D) -> crate::AResult<Self> {
		config.validate()?;
		let mut programmer = Programmer {
			transport,
			timer,
			config,
			state: BusState::default(),
			released: false,
		};
		if let Err(e) = programmer.setup() {
			// nothing to hand back to
			programmer.released = true;
			return Err(e);
		}
		Ok(programmer)
	}

	// brings every pin into the state `BusState::default()` describes
	fn setup(&mut self) -> crate::AResult<()> {
		let pins = self.config.pins;
		let t = &mut self.transport;

		t.checked_set_pin_mode(pins.shift_data, PinMode::Output)?;
		t.checked_set_pin_mode(pins.shift_clock, PinMode::Output)?;
		t.checked_digital_write(pins.latch_clock, Level::Low)?;
		t.checked_set_pin_mode(pins.latch_clock, PinMode::Output)?;

		// drive the inactive level before enabling the output driver
		t.checked_digital_write(pins.write_enable, Level::High)?;
		t.checked_set_pin_mode(pins.write_enable, PinMode::Output)?;
		t.checked_digital_write(pins.output_enable, Level::High)?;
		t.checked_set_pin_mode(pins.output_enable, PinMode::Output)?;

		for &pin in &pins.data {
			t.checked_set_pin_mode(pin, PinMode::Input)?;
		}

		debug!("bridge set up: /OE and /WE inactive, data bus input");
		Ok(())
	}

	fn idle(&mut self) -> crate::AResult<()> {
		self.set_output_enabled(false)?;
		self.set_mode(BusDirection::Input)?;
		self.transport.checked_digital_write(self.config.pins.write_enable, Level::High)
	}

	/// Leaves the bus idle (output disabled, data lines input) and releases
	/// the bridge.
	pub fn release(mut self) -> crate::AResult<()> {
		self.released = true;
		self.idle()
	}

	pub fn config(&self) -> &ProgrammerConfig {
		&self.config
	}

	pub fn state(&self) -> &BusState {
		&self.state
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	pub fn transport_mut(&mut self) -> &mut T {
		&mut self.transport
	}

	/// Latches `address` into the shift registers unless it is already there.
	///
	/// Returns whether the shift/latch sequence was issued.
	pub fn set_address(&mut self, address: u16) -> crate::AResult<bool> {
		assert!((address as usize) < self.config.capacity, "address 0x{:x} out of range", address);
		let pins = self.config.pins;
		let latch_pulse = self.config.latch_pulse;
		let settle = self.config.address_settle;
		let t = &mut self.transport;
		let timer = &mut self.timer;

		self.state.set_address(address, || {
			t.checked_shift_out(pins.shift_data, pins.shift_clock, BitOrder::MsbFirst, (address >> 8) as u8)?;
			t.checked_shift_out(pins.shift_data, pins.shift_clock, BitOrder::MsbFirst, address as u8)?;
			t.checked_digital_write(pins.latch_clock, Level::High)?;
			timer.delay(latch_pulse);
			t.checked_digital_write(pins.latch_clock, Level::Low)?;
			timer.delay(settle);
			debug!("latched address 0x{:03x}", address);
			Ok(())
		})
	}

	/// Switches all data pins to `direction` unless they already are.
	pub fn set_mode(&mut self, direction: BusDirection) -> crate::AResult<bool> {
		let data = self.config.pins.data;
		let t = &mut self.transport;
		let mode = match direction {
			BusDirection::Input => PinMode::Input,
			BusDirection::Output => PinMode::Output,
		};

		self.state.set_direction(direction, || {
			for &pin in &data {
				t.checked_set_pin_mode(pin, mode)?;
			}
			debug!("data bus now {:?}", direction);
			Ok(())
		})
	}

	/// Drives /OE (active low) unless it already has the requested state.
	pub fn set_output_enabled(&mut self, enabled: bool) -> crate::AResult<bool> {
		let pin = self.config.pins.output_enable;
		let t = &mut self.transport;

		self.state.set_output_enabled(enabled, || {
			t.checked_digital_write(pin, Level::from(!enabled))
		})
	}

	pub fn read_byte(&mut self, address: u16) -> crate::AResult<u8> {
		self.set_address(address)?;
		// release the bus before the EEPROM starts driving it
		self.set_mode(BusDirection::Input)?;
		self.set_output_enabled(true)?;

		let data = self.config.pins.data;
		let mut value = 0u8;
		for bit in (0..8).rev() {
			let level = self.transport.checked_digital_read(data[bit])?;
			value = (value << 1) | (level.is_high() as u8);
		}
		Ok(value)
	}

	pub fn write_byte(&mut self, address: u16, value: u8) -> crate::AResult<()> {
		self.set_address(address)?;
		// EEPROM stops driving the bus before we do
		self.set_output_enabled(false)?;
		self.set_mode(BusDirection::Output)?;

		let pins = self.config.pins;
		let expected = Level::from(value & 0x80 != 0);
		let mut bits = value;
		for &pin in &pins.data {
			self.transport.checked_digital_write(pin, Level::from(bits & 1 != 0))?;
			bits >>= 1;
		}

		self.transport.checked_digital_write(pins.write_enable, Level::Low)?;
		self.timer.delay(self.config.write_pulse);
		self.transport.checked_digital_write(pins.write_enable, Level::High)?;

		match self.wait_for_write(address, expected) {
			Ok(polls) => {
				trace!("wrote 0x{:02x} at 0x{:03x} after {} polls", value, address, polls);
				Ok(())
			},
			Err(e) => {
				// I/O7 might still be an input
				self.state.forget_direction();
				Err(e)
			},
		}
	}

	// data polling: during the internal write cycle the EEPROM outputs the
	// complement of the written bit 7 on I/O7; returns the number of reads
	fn wait_for_write(&mut self, address: u16, expected: Level) -> crate::AResult<u32> {
		let msb = self.config.pins.data[7];
		self.transport.checked_set_pin_mode(msb, PinMode::Input)?;
		self.set_output_enabled(true)?;

		let mut attempts = 0u32;
		loop {
			attempts += 1;
			let level = self.transport.checked_digital_read(msb)?;
			if level == expected {
				break;
			}
			trace!("0x{:03x}: write cycle still running (poll {})", address, attempts);
			if let Some(limit) = self.config.poll_limit {
				if attempts >= limit {
					return Err(ProgrammerError::WriteTimeout {
						address,
						attempts,
					}.into());
				}
			}
		}

		// stop the EEPROM driving I/O7 before taking it back
		self.set_output_enabled(false)?;
		self.transport.checked_set_pin_mode(msb, PinMode::Output)?;
		Ok(attempts)
	}
}

impl<T: PinTransport, D: Delay> Drop for Programmer<T, D> {
	fn drop(&mut self) {
		if !self.released {
			if let Err(e) = self.idle() {
				warn!("Couldn't leave the bus idle: {}", e);
			}
		}
	}
}
