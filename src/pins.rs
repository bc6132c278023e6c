use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PinMode {
	Input,
	Output,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Level {
	Low,
	High,
}

impl Level {
	pub fn is_high(self) -> bool {
		self == Level::High
	}
}

impl From<bool> for Level {
	fn from(v: bool) -> Self {
		match v {
			false => Level::Low,
			true => Level::High,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BitOrder {
	MsbFirst,
	LsbFirst,
}

/// Logical role of a bridge pin
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PinRole {
	ShiftData,
	ShiftClock,
	LatchClock,
	/// data line I/O0 .. I/O7
	Data(u8),
	/// active low
	WriteEnable,
	/// active low
	OutputEnable,
}

impl fmt::Display for PinRole {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			PinRole::ShiftData => write!(f, "shift data"),
			PinRole::ShiftClock => write!(f, "shift clock"),
			PinRole::LatchClock => write!(f, "latch clock"),
			PinRole::Data(bit) => write!(f, "data bit {}", bit),
			PinRole::WriteEnable => write!(f, "write enable"),
			PinRole::OutputEnable => write!(f, "output enable"),
		}
	}
}

/// Maps each role to a pin number on the bridge microcontroller
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PinMap {
	pub shift_data: u8,
	pub shift_clock: u8,
	pub latch_clock: u8,
	/// indexed by bit number, `data[0]` is I/O0
	pub data: [u8; 8],
	pub write_enable: u8,
	pub output_enable: u8,
}

impl Default for PinMap {
	// two 74HC595 on D2..D4, I/O0..I/O7 on D5..D12, /WE on D13, /OE on A0
	fn default() -> Self {
		PinMap {
			shift_data: 2,
			shift_clock: 3,
			latch_clock: 4,
			data: [5, 6, 7, 8, 9, 10, 11, 12],
			write_enable: 13,
			output_enable: 14,
		}
	}
}

impl PinMap {
	pub fn pin(&self, role: PinRole) -> u8 {
		match role {
			PinRole::ShiftData => self.shift_data,
			PinRole::ShiftClock => self.shift_clock,
			PinRole::LatchClock => self.latch_clock,
			PinRole::Data(bit) => self.data[bit as usize],
			PinRole::WriteEnable => self.write_enable,
			PinRole::OutputEnable => self.output_enable,
		}
	}

	pub fn roles() -> impl Iterator<Item = PinRole> {
		[PinRole::ShiftData, PinRole::ShiftClock, PinRole::LatchClock].iter().cloned()
			.chain((0..8).map(PinRole::Data))
			.chain([PinRole::WriteEnable, PinRole::OutputEnable].iter().cloned())
	}

	/// bit number if `pin` is one of the data lines
	pub fn data_bit(&self, pin: u8) -> Option<u8> {
		self.data.iter().position(|&p| p == pin).map(|bit| bit as u8)
	}

	/// first pair of roles sharing one physical pin
	pub fn find_conflict(&self) -> Option<(PinRole, PinRole, u8)> {
		let roles: Vec<PinRole> = Self::roles().collect();
		for (i, &a) in roles.iter().enumerate() {
			for &b in &roles[i + 1..] {
				if self.pin(a) == self.pin(b) {
					return Some((a, b, self.pin(a)));
				}
			}
		}
		None
	}
}
