use std::time::Duration;

use crate::pins::PinMap;

/// Chip size, pinout and timing of one programmer setup
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProgrammerConfig {
	/// device size in bytes
	pub capacity: usize,
	/// content of an erased cell
	pub erased_value: u8,
	pub pins: PinMap,
	/// how long the latch clock stays high
	pub latch_pulse: Duration,
	/// minimum /WE low time; zero relies on transport round trips
	pub write_pulse: Duration,
	/// wait after latching a new address
	pub address_settle: Duration,
	/// give up data polling after this many reads (`None`: poll forever)
	pub poll_limit: Option<u32>,
}

impl Default for ProgrammerConfig {
	fn default() -> Self {
		ProgrammerConfig {
			capacity: 2048,
			erased_value: 0xff,
			pins: PinMap::default(),
			latch_pulse: Duration::from_micros(10),
			write_pulse: Duration::from_nanos(0),
			address_settle: Duration::from_nanos(0),
			poll_limit: None,
		}
	}
}

impl ProgrammerConfig {
	pub const ROW_WIDTH: usize = 16;

	pub fn validate(&self) -> crate::AResult<()> {
		ensure!(self.capacity > 0, "capacity must not be zero");
		ensure!(self.capacity % Self::ROW_WIDTH == 0, "capacity {} is not a multiple of {}", self.capacity, Self::ROW_WIDTH);
		ensure!(self.capacity <= 0x1_0000, "capacity {} exceeds the 16-bit address space", self.capacity);
		if let Some((a, b, pin)) = self.pins.find_conflict() {
			bail!("{} and {} both use pin {}", a, b, pin);
		}
		if let Some(limit) = self.poll_limit {
			ensure!(limit > 0, "poll limit must allow at least one read");
		}
		Ok(())
	}

	/// largest useful line count for a dump
	pub fn max_dump_lines(&self) -> usize {
		self.capacity / Self::ROW_WIDTH
	}
}
