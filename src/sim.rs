use std::collections::BTreeMap;

use crate::pins::{
	BitOrder,
	Level,
	PinMap,
	PinMode,
};
use crate::transport::{
	PinTransport,
	Request,
};

/// GPIO bridge with an AT28C16 style EEPROM attached, simulated in memory
//
// shift registers latch on the rising latch clock, bytes are written on the
// rising /WE edge while /OE is inactive, and for `busy_reads` reads after
// each write I/O7 returns the complement of the written bit 7.
pub struct SimulatedBridge {
	pins: PinMap,
	memory: Vec<u8>,
	modes: BTreeMap<u8, PinMode>,
	levels: BTreeMap<u8, Level>,
	shift_register: u16,
	latched: u16,
	busy_reads: u32,
	busy_remaining: u32,
	last_written: u8,
	log: Vec<Request>,
	fail_after: Option<usize>,
}

impl SimulatedBridge {
	/// fresh device, all cells zero
	pub fn new(pins: PinMap, capacity: usize) -> Self {
		SimulatedBridge {
			pins,
			memory: vec![0u8; capacity],
			modes: BTreeMap::new(),
			levels: BTreeMap::new(),
			shift_register: 0,
			latched: 0,
			busy_reads: 0,
			busy_remaining: 0,
			last_written: 0,
			log: Vec::new(),
			fail_after: None,
		}
	}

	/// number of I/O7 reads a write cycle stays busy
	pub fn set_busy_reads(&mut self, reads: u32) {
		self.busy_reads = reads;
	}

	/// every request after the next `n` fails
	pub fn fail_after(&mut self, n: usize) {
		self.fail_after = Some(self.log.len() + n);
	}

	pub fn recover(&mut self) {
		self.fail_after = None;
	}

	pub fn contents(&self) -> &[u8] {
		&self.memory
	}

	pub fn contents_mut(&mut self) -> &mut [u8] {
		&mut self.memory
	}

	pub fn latched_address(&self) -> u16 {
		self.latched
	}

	pub fn mode(&self, pin: u8) -> Option<PinMode> {
		self.modes.get(&pin).cloned()
	}

	pub fn level(&self, pin: u8) -> Level {
		self.levels.get(&pin).cloned().unwrap_or(Level::Low)
	}

	/// requests that succeeded, oldest first
	pub fn requests(&self) -> &[Request] {
		&self.log
	}

	pub fn count<F: Fn(&Request) -> bool>(&self, f: F) -> usize {
		self.log.iter().filter(|&r| f(r)).count()
	}

	pub fn clear_log(&mut self) {
		if let Some(n) = self.fail_after.as_mut() {
			*n = n.saturating_sub(self.log.len());
		}
		self.log.clear();
	}

	fn cell(&self) -> usize {
		self.latched as usize % self.memory.len()
	}

	fn output_enabled(&self) -> bool {
		!self.level(self.pins.output_enable).is_high()
	}

	fn bus_driven_by_bridge(&self) -> bool {
		self.pins.data.iter().all(|&pin| self.mode(pin) == Some(PinMode::Output))
	}

	fn accept(&mut self, request: Request) -> crate::AResult<()> {
		if let Some(n) = self.fail_after {
			ensure!(self.log.len() < n, "bridge not responding to {}", request);
		}
		self.log.push(request);
		Ok(())
	}

	fn write_cycle(&mut self) {
		let value = self.pins.data.iter().enumerate()
			.filter(|&(_, &pin)| self.level(pin).is_high())
			.fold(0u8, |acc, (bit, _)| acc | (1 << bit));
		let cell = self.cell();
		self.memory[cell] = value;
		self.last_written = value;
		self.busy_remaining = self.busy_reads;
	}
}

impl PinTransport for SimulatedBridge {
	fn set_pin_mode(&mut self, pin: u8, mode: PinMode) -> crate::AResult<()> {
		self.accept(Request::SetPinMode(pin, mode))?;
		self.modes.insert(pin, mode);
		Ok(())
	}

	fn digital_write(&mut self, pin: u8, level: Level) -> crate::AResult<()> {
		self.accept(Request::DigitalWrite(pin, level))?;
		let previous = self.levels.insert(pin, level).unwrap_or(Level::Low);
		let rising = previous == Level::Low && level == Level::High;

		if rising && pin == self.pins.latch_clock {
			self.latched = self.shift_register;
		} else if rising && pin == self.pins.write_enable && !self.output_enabled() && self.bus_driven_by_bridge() {
			self.write_cycle();
		}
		Ok(())
	}

	fn digital_read(&mut self, pin: u8) -> crate::AResult<Level> {
		self.accept(Request::DigitalRead(pin))?;
		let bit = match self.pins.data_bit(pin) {
			Some(bit) => bit,
			None => return Ok(self.level(pin)),
		};
		if !self.output_enabled() || self.mode(pin) != Some(PinMode::Input) {
			return Ok(self.level(pin));
		}
		if bit == 7 && self.busy_remaining > 0 {
			self.busy_remaining -= 1;
			return Ok(Level::from(self.last_written & 0x80 == 0));
		}
		Ok(Level::from(self.memory[self.cell()] & (1 << bit) != 0))
	}

	fn shift_out(&mut self, data_pin: u8, clock_pin: u8, order: BitOrder, value: u8) -> crate::AResult<()> {
		ensure!(data_pin == self.pins.shift_data && clock_pin == self.pins.shift_clock,
			"no shift register on pins {}/{}", data_pin, clock_pin
		);
		self.accept(Request::ShiftOut {
			data_pin,
			clock_pin,
			order,
			value,
		})?;
		let value = match order {
			BitOrder::MsbFirst => value,
			BitOrder::LsbFirst => value.reverse_bits(),
		};
		self.shift_register = (self.shift_register << 8) | value as u16;
		Ok(())
	}
}
