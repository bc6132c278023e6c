/// Direction of the shared data lines, seen from the bridge
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BusDirection {
	/// EEPROM may drive the bus
	Input,
	/// bridge drives the bus
	Output,
}

/// Last state successfully pushed to the hardware.
///
/// Every setter takes the transport sequence as a closure, runs it only when
/// the requested state differs from the cached one, and updates the cache
/// only after the sequence succeeded. The return value tells whether the
/// sequence was issued.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BusState {
	// `None` until the first address was latched
	address: Option<u16>,
	// `None` when the data pins may disagree with each other
	direction: Option<BusDirection>,
	output_enabled: bool,
}

impl Default for BusState {
	fn default() -> Self {
		BusState {
			address: None,
			direction: Some(BusDirection::Input),
			output_enabled: false,
		}
	}
}

impl BusState {
	pub fn address(&self) -> Option<u16> {
		self.address
	}

	pub fn direction(&self) -> Option<BusDirection> {
		self.direction
	}

	pub fn output_enabled(&self) -> bool {
		self.output_enabled
	}

	pub(crate) fn set_address<F>(&mut self, address: u16, issue: F) -> crate::AResult<bool>
	where
		F: FnOnce() -> crate::AResult<()>,
	{
		if self.address == Some(address) {
			return Ok(false);
		}
		issue()?;
		self.address = Some(address);
		Ok(true)
	}

	pub(crate) fn set_direction<F>(&mut self, direction: BusDirection, issue: F) -> crate::AResult<bool>
	where
		F: FnOnce() -> crate::AResult<()>,
	{
		if self.direction == Some(direction) {
			return Ok(false);
		}
		issue()?;
		self.direction = Some(direction);
		Ok(true)
	}

	pub(crate) fn set_output_enabled<F>(&mut self, enabled: bool, issue: F) -> crate::AResult<bool>
	where
		F: FnOnce() -> crate::AResult<()>,
	{
		if self.output_enabled == enabled {
			return Ok(false);
		}
		issue()?;
		self.output_enabled = enabled;
		Ok(true)
	}

	// a single data pin was switched behind the cache's back and the switch
	// back failed
	pub(crate) fn forget_direction(&mut self) {
		self.direction = None;
	}
}
