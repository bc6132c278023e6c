use std::hint;
use std::io;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// Blocking delays for pulse widths and settle times
pub trait Delay {
	// wait (at least) `ns` nanoseconds; may be a no-op below the timer resolution
	fn delay_ns(&mut self, ns: u64);

	fn delay_us(&mut self, us: u64) {
		self.delay_ns(us.saturating_mul(1_000));
	}

	// millisecond precision doesn't need busy waiting
	fn delay_ms(&mut self, ms: u64) {
		reliable_sleep(Duration::from_millis(ms));
	}

	fn delay(&mut self, duration: Duration) {
		let ms = duration.as_millis() as u64;
		if ms > 0 {
			self.delay_ms(ms);
		}
		let ns = duration.subsec_nanos() % 1_000_000;
		if ns > 0 {
			self.delay_ns(ns as u64);
		}
	}
}

impl<'a, D: ?Sized + Delay> Delay for &'a mut D {
	fn delay_ns(&mut self, ns: u64) {
		D::delay_ns(*self, ns)
	}
	fn delay_us(&mut self, us: u64) {
		D::delay_us(*self, us)
	}
	fn delay_ms(&mut self, ms: u64) {
		D::delay_ms(*self, ms)
	}
}

fn monotonic_ns(clock: libc::clockid_t) -> io::Result<u64> {
	let mut ts = libc::timespec {
		tv_sec: 0,
		tv_nsec: 0,
	};
	if 0 != unsafe { libc::clock_gettime(clock, &mut ts) } {
		return Err(io::Error::last_os_error());
	}
	Ok(ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64)
}

/// Busy-waiting delays on the monotonic clock, in units of its resolution
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TickTimer {
	nanoseconds_per_tick: u64,
}

impl TickTimer {
	const CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;

	pub fn new() -> io::Result<Self> {
		let mut res = libc::timespec {
			tv_sec: 0,
			tv_nsec: 0,
		};
		if 0 != unsafe { libc::clock_getres(Self::CLOCK, &mut res) } {
			return Err(io::Error::last_os_error());
		}
		let nanoseconds_per_tick = res.tv_sec as u64 * 1_000_000_000 + res.tv_nsec as u64;
		debug!("monotonic clock resolution: {}ns", nanoseconds_per_tick);
		Ok(Self::with_resolution(nanoseconds_per_tick))
	}

	pub fn with_resolution(nanoseconds_per_tick: u64) -> Self {
		TickTimer {
			nanoseconds_per_tick: nanoseconds_per_tick.max(1),
		}
	}

	pub fn nanoseconds_per_tick(&self) -> u64 {
		self.nanoseconds_per_tick
	}

	pub fn ticks_for(&self, ns: u64) -> u64 {
		ns / self.nanoseconds_per_tick
	}

	fn now_ns(&self) -> u64 {
		match monotonic_ns(Self::CLOCK) {
			Ok(ns) => ns,
			// clock_getres succeeded in `new`, so the clock exists; a failure
			// here is as fatal as a failing munmap
			Err(e) => panic!("clock_gettime failed: {}", e),
		}
	}
}

impl Delay for TickTimer {
	fn delay_ns(&mut self, ns: u64) {
		let target = self.ticks_for(ns);
		if target == 0 {
			return;
		}
		// measured from call entry, not from the start of the current tick
		let start = self.now_ns();
		let wait = target * self.nanoseconds_per_tick;
		while self.now_ns() - start < wait {
			hint::spin_loop();
		}
	}
}

/// never waits; for simulated hardware
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct NoDelay;

impl Delay for NoDelay {
	fn delay_ns(&mut self, _ns: u64) {}
	fn delay_ms(&mut self, _ms: u64) {}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn tick_conversion() {
		let timer = TickTimer::with_resolution(40);
		assert_eq!(timer.ticks_for(1_000), 25);
		assert_eq!(timer.ticks_for(39), 0);
		assert_eq!(TickTimer::with_resolution(0).nanoseconds_per_tick(), 1);
	}

	#[test]
	fn busy_wait_takes_at_least_requested_time() {
		let mut timer = TickTimer::new().expect("monotonic clock");
		let start = Instant::now();
		timer.delay_us(200);
		assert!(start.elapsed() >= Duration::from_micros(200));
	}

	#[test]
	fn coarse_resolution_delay_is_not_cut_short() {
		let mut timer = TickTimer::with_resolution(1_000_000);
		let mut shortest = Duration::from_secs(1);
		for _ in 0..20 {
			let start = Instant::now();
			timer.delay_ns(1_000_000);
			shortest = shortest.min(start.elapsed());
		}
		assert!(shortest >= Duration::from_millis(1), "shortest delay: {:?}", shortest);
	}

	#[test]
	fn coarse_resolution_rounds_down_to_ticks() {
		let mut timer = TickTimer::with_resolution(100_000);
		let start = Instant::now();
		timer.delay_ns(250_000);
		assert!(start.elapsed() >= Duration::from_micros(200));
	}

	#[test]
	fn millisecond_delay_sleeps() {
		let mut timer = TickTimer::with_resolution(1);
		let start = Instant::now();
		timer.delay_ms(5);
		assert!(start.elapsed() >= Duration::from_millis(5));

		let start = Instant::now();
		timer.delay(Duration::from_micros(3_500));
		assert!(start.elapsed() >= Duration::from_micros(3_500));
	}

	#[test]
	fn reliable_sleep_waits_full_duration() {
		let start = Instant::now();
		reliable_sleep(Duration::from_millis(3));
		assert!(start.elapsed() >= Duration::from_millis(3));
	}

	#[test]
	fn sub_resolution_delay_is_noop() {
		let mut timer = TickTimer::with_resolution(1_000_000);
		let start = Instant::now();
		timer.delay_ns(500);
		assert!(start.elapsed() < Duration::from_millis(1));
	}

	#[test]
	fn split_duration() {
		#[derive(Default)]
		struct Record(Vec<(&'static str, u64)>);
		impl Delay for Record {
			fn delay_ns(&mut self, ns: u64) {
				self.0.push(("ns", ns));
			}
			fn delay_ms(&mut self, ms: u64) {
				self.0.push(("ms", ms));
			}
		}

		let mut rec = Record::default();
		rec.delay(Duration::from_micros(2_010));
		rec.delay(Duration::from_micros(10));
		rec.delay(Duration::from_nanos(0));
		assert_eq!(rec.0, vec![("ms", 2), ("ns", 10_000), ("ns", 10_000)]);
	}
}
