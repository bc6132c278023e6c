use failure::Fail;

use crate::transport::Request;

#[derive(Debug, Fail)]
pub enum ProgrammerError {
	/// a bridge request failed; partial hardware state can't be trusted
	#[fail(display = "transport failure on {}: {}", request, message)]
	TransportFailure {
		request: Request,
		message: String,
	},

	/// rejected before touching the hardware
	#[fail(display = "{} bytes don't fit into a {} byte device", length, capacity)]
	CapacityExceeded {
		length: usize,
		capacity: usize,
	},

	/// data polling never saw the written bit 7 value
	#[fail(display = "write at 0x{:03x} didn't complete after {} polls", address, attempts)]
	WriteTimeout {
		address: u16,
		attempts: u32,
	},
}

/// typed kind of a failure, if it (or one of its causes) came from the programmer
pub fn kind_of(e: &failure::Error) -> Option<&ProgrammerError> {
	e.iter_chain().find_map(|cause| cause.downcast_ref::<ProgrammerError>())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn kind_survives_context() {
		let e: failure::Error = ProgrammerError::CapacityExceeded {
			length: 4096,
			capacity: 2048,
		}.into();
		let e: crate::AResult<()> = with_context!("burning image", Err(e));
		let e = e.unwrap_err();
		assert_eq!(e.to_string(), "burning image: 4096 bytes don't fit into a 2048 byte device");
		match kind_of(&e) {
			Some(ProgrammerError::CapacityExceeded { length: 4096, capacity: 2048 }) => (),
			other => panic!("unexpected kind {:?}", other),
		}
	}
}
