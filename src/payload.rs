use std::borrow::Cow;

/// Something to burn: the image and how much of it to show afterwards
pub trait Payload {
	fn name(&self) -> Cow<str>;

	/// bytes for addresses `0..contents().len()`
	fn contents(&self) -> Cow<[u8]>;

	/// dump rows to print after writing
	fn dump_lines(&self) -> usize {
		(self.contents().len() + 15) / 16
	}
}

/// Arbitrary image, e.g. loaded from a file
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RawImage {
	pub name: String,
	pub data: Vec<u8>,
}

impl Payload for RawImage {
	fn name(&self) -> Cow<str> {
		Cow::Borrowed(&self.name)
	}

	fn contents(&self) -> Cow<[u8]> {
		Cow::Borrowed(&self.data)
	}
}

/// segments `abcdefg` (bit 6 = a .. bit 0 = g) for 0..9, common cathode
pub const COMMON_CATHODE_DIGITS: [u8; 10] = [
	0x7e, 0x30, 0x6d, 0x79, 0x33,
	0x5b, 0x5f, 0x70, 0x7f, 0x7b,
];

// segment g only
const MINUS: u8 = 0x01;

/// Decoder table for a 4-digit multiplexed seven-segment display.
///
/// Address bits 0..7 are the value to show, bits 8..9 select the digit
/// (ones, tens, hundreds, sign) and bit 10 selects two's complement.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SevenSegmentDecimal {
	pub digits: [u8; 10],
	pub dump_lines: usize,
}

impl Default for SevenSegmentDecimal {
	fn default() -> Self {
		SevenSegmentDecimal {
			digits: COMMON_CATHODE_DIGITS,
			dump_lines: 16,
		}
	}
}

impl SevenSegmentDecimal {
	pub const SIZE: usize = 2048;

	pub fn table(&self) -> Vec<u8> {
		let mut table = vec![0u8; Self::SIZE];

		for value in 0..=255usize {
			table[value] = self.digits[value % 10];
			table[0x100 + value] = self.digits[(value / 10) % 10];
			table[0x200 + value] = self.digits[(value / 100) % 10];
			table[0x300 + value] = 0;
		}

		for value in -128i32..=127 {
			let index = (value as u8) as usize;
			let magnitude = value.abs() as usize;
			table[0x400 + index] = self.digits[magnitude % 10];
			table[0x500 + index] = self.digits[(magnitude / 10) % 10];
			table[0x600 + index] = self.digits[(magnitude / 100) % 10];
			table[0x700 + index] = if value < 0 { MINUS } else { 0 };
		}

		table
	}
}

impl Payload for SevenSegmentDecimal {
	fn name(&self) -> Cow<str> {
		Cow::Borrowed("seven segment decimal table")
	}

	fn contents(&self) -> Cow<[u8]> {
		Cow::Owned(self.table())
	}

	fn dump_lines(&self) -> usize {
		self.dump_lines
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn show(table: &[u8], base: usize, value: u8) -> [u8; 4] {
		let v = value as usize;
		[table[base + 0x300 + v], table[base + 0x200 + v], table[base + 0x100 + v], table[base + v]]
	}

	#[test]
	fn unsigned_digits() {
		let d = COMMON_CATHODE_DIGITS;
		let table = SevenSegmentDecimal::default().table();
		assert_eq!(table.len(), 2048);
		assert_eq!(show(&table, 0, 0), [0, d[0], d[0], d[0]]);
		assert_eq!(show(&table, 0, 42), [0, d[0], d[4], d[2]]);
		assert_eq!(show(&table, 0, 255), [0, d[2], d[5], d[5]]);
	}

	#[test]
	fn signed_digits() {
		let d = COMMON_CATHODE_DIGITS;
		let table = SevenSegmentDecimal::default().table();
		assert_eq!(show(&table, 0x400, 127), [0, d[1], d[2], d[7]]);
		assert_eq!(show(&table, 0x400, 0x80), [MINUS, d[1], d[2], d[8]]);
		assert_eq!(show(&table, 0x400, 0xff), [MINUS, d[0], d[0], d[1]]);
	}

	#[test]
	fn raw_image_dump_lines() {
		let image = RawImage {
			name: "test".into(),
			data: vec![0; 17],
		};
		assert_eq!(image.dump_lines(), 2);
		assert_eq!(image.contents().len(), 17);
	}
}
