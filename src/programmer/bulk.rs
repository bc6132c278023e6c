use std::fmt::Write;

use super::Programmer;
use crate::config::ProgrammerConfig;
use crate::error::ProgrammerError;
use crate::payload::Payload;
use crate::timer::Delay;
use crate::transport::PinTransport;

const ROW: usize = ProgrammerConfig::ROW_WIDTH;

/// One hex dump line (`010: 0A 1B ...`), with an extra gap after the 8th
/// column.
pub fn format_dump_line(address: usize, row: &[u8]) -> String {
	let mut line = format!("{:03X}:", address);
	for (i, b) in row.iter().enumerate() {
		if i == 8 {
			line.push(' ');
		}
		// writing to a String can't fail
		let _ = write!(line, " {:02X}", b);
	}
	line
}

impl<T: PinTransport, D: Delay> Programmer<T, D> {
	fn check_capacity(&self, length: usize) -> crate::AResult<()> {
		if length > self.config.capacity {
			return Err(ProgrammerError::CapacityExceeded {
				length,
				capacity: self.config.capacity,
			}.into());
		}
		Ok(())
	}

	/// Writes `data` to addresses `0..data.len()`, one byte (and one write
	/// cycle) at a time.
	pub fn write_block(&mut self, data: &[u8]) -> crate::AResult<()> {
		self.check_capacity(data.len())?;
		for (address, &b) in data.iter().enumerate() {
			self.write_byte(address as u16, b)?;
			if (address + 1) % 256 == 0 {
				info!("wrote {}/{} bytes", address + 1, data.len());
			}
		}
		info!("wrote {} bytes", data.len());
		Ok(())
	}

	/// Reads `length` bytes from address 0 (clamped to the capacity)
	pub fn read_block(&mut self, length: usize) -> crate::AResult<Vec<u8>> {
		let length = length.min(self.config.capacity);
		let mut buf = Vec::with_capacity(length);
		for address in 0..length {
			buf.push(self.read_byte(address as u16)?);
		}
		Ok(buf)
	}

	pub fn verify(&mut self, data: &[u8]) -> crate::AResult<()> {
		self.check_capacity(data.len())?;
		for (address, &expected) in data.iter().enumerate() {
			let found = self.read_byte(address as u16)?;
			ensure!(found == expected,
				"Verify failed at {:03x}: expected {:02x}, EEPROM has {:02x}", address, expected, found
			);
		}
		info!("verified {} bytes", data.len());
		Ok(())
	}

	/// Hex dump of the first `line_count` rows (clamped to `1..=capacity/16`)
	pub fn dump(&mut self, line_count: usize) -> crate::AResult<String> {
		let line_count = line_count.max(1).min(self.config.max_dump_lines());
		let data = self.read_block(line_count * ROW)?;

		let mut report = String::new();
		for (line, row) in data.chunks(ROW).enumerate() {
			report.push_str(&format_dump_line(line * ROW, row));
			report.push('\n');
		}
		Ok(report)
	}

	/// Fills addresses `0..byte_count` (clamped to the capacity) with the
	/// erased value; returns the number of bytes written.
	pub fn clear(&mut self, byte_count: usize) -> crate::AResult<usize> {
		let byte_count = byte_count.min(self.config.capacity);
		let erased = self.config.erased_value;
		for address in 0..byte_count {
			self.write_byte(address as u16, erased)?;
		}
		info!("cleared {} bytes to 0x{:02x}", byte_count, erased);
		Ok(byte_count)
	}

	/// Burns the payload and returns the dump it asks for
	pub fn run<P: Payload + ?Sized>(&mut self, payload: &P) -> crate::AResult<String> {
		let contents = payload.contents();
		with_context!(("burning {}", payload.name()), self.write_block(&contents))?;
		self.dump(payload.dump_lines())
	}
}
