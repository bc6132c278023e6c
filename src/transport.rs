use std::fmt;

use crate::error::ProgrammerError;
use crate::pins::{
	BitOrder,
	Level,
	PinMode,
};

/// Request/response primitives of the GPIO bridge; every call is a blocking
/// round trip to the microcontroller.
pub trait PinTransport {
	fn set_pin_mode(&mut self, pin: u8, mode: PinMode) -> crate::AResult<()>;
	fn digital_write(&mut self, pin: u8, level: Level) -> crate::AResult<()>;
	fn digital_read(&mut self, pin: u8) -> crate::AResult<Level>;
	fn shift_out(&mut self, data_pin: u8, clock_pin: u8, order: BitOrder, value: u8) -> crate::AResult<()>;
}

impl<'a, T: ?Sized + PinTransport> PinTransport for &'a mut T {
	fn set_pin_mode(&mut self, pin: u8, mode: PinMode) -> crate::AResult<()> {
		T::set_pin_mode(*self, pin, mode)
	}
	fn digital_write(&mut self, pin: u8, level: Level) -> crate::AResult<()> {
		T::digital_write(*self, pin, level)
	}
	fn digital_read(&mut self, pin: u8) -> crate::AResult<Level> {
		T::digital_read(*self, pin)
	}
	fn shift_out(&mut self, data_pin: u8, clock_pin: u8, order: BitOrder, value: u8) -> crate::AResult<()> {
		T::shift_out(*self, data_pin, clock_pin, order, value)
	}
}

/// A single transport request, as issued by the programmer
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Request {
	SetPinMode(u8, PinMode),
	DigitalWrite(u8, Level),
	DigitalRead(u8),
	ShiftOut {
		data_pin: u8,
		clock_pin: u8,
		order: BitOrder,
		value: u8,
	},
}

impl Request {
	pub fn is_set_pin_mode(&self) -> bool {
		match self {
			Request::SetPinMode(..) => true,
			_ => false,
		}
	}

	pub fn is_shift_out(&self) -> bool {
		match self {
			Request::ShiftOut { .. } => true,
			_ => false,
		}
	}

	pub fn pin(&self) -> u8 {
		match *self {
			Request::SetPinMode(pin, _) => pin,
			Request::DigitalWrite(pin, _) => pin,
			Request::DigitalRead(pin) => pin,
			Request::ShiftOut { data_pin, .. } => data_pin,
		}
	}
}

impl fmt::Display for Request {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Request::SetPinMode(pin, mode) => write!(f, "setPinMode(pin {}, {:?})", pin, mode),
			Request::DigitalWrite(pin, level) => write!(f, "digitalWrite(pin {}, {:?})", pin, level),
			Request::DigitalRead(pin) => write!(f, "digitalRead(pin {})", pin),
			Request::ShiftOut { data_pin, clock_pin, order, value } => write!(
				f,
				"shiftOut(data pin {}, clock pin {}, {:?}, 0x{:02x})",
				data_pin, clock_pin, order, value,
			),
		}
	}
}

fn failed(request: Request, e: failure::Error) -> failure::Error {
	debug!("{} failed: {:?}", request, e);
	ProgrammerError::TransportFailure {
		request,
		message: e.to_string(),
	}.into()
}

// wraps every failure of the underlying transport into `TransportFailure`
pub(crate) trait CheckedTransport: PinTransport {
	fn checked_set_pin_mode(&mut self, pin: u8, mode: PinMode) -> crate::AResult<()> {
		self.set_pin_mode(pin, mode).map_err(|e| failed(Request::SetPinMode(pin, mode), e))
	}

	fn checked_digital_write(&mut self, pin: u8, level: Level) -> crate::AResult<()> {
		self.digital_write(pin, level).map_err(|e| failed(Request::DigitalWrite(pin, level), e))
	}

	fn checked_digital_read(&mut self, pin: u8) -> crate::AResult<Level> {
		self.digital_read(pin).map_err(|e| failed(Request::DigitalRead(pin), e))
	}

	fn checked_shift_out(&mut self, data_pin: u8, clock_pin: u8, order: BitOrder, value: u8) -> crate::AResult<()> {
		self.shift_out(data_pin, clock_pin, order, value).map_err(|e| failed(Request::ShiftOut {
			data_pin,
			clock_pin,
			order,
			value,
		}, e))
	}
}

impl<T: PinTransport + ?Sized> CheckedTransport for T {}
