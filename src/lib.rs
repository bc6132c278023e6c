#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod config;
pub mod error;
pub mod payload;
pub mod pins;
pub mod programmer;
pub mod sim;
pub mod timer;
pub mod transport;

pub use self::config::ProgrammerConfig;
pub use self::error::ProgrammerError;
pub use self::payload::Payload;
pub use self::programmer::Programmer;
pub use self::transport::PinTransport;
