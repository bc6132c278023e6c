#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate at28c16_flash;
use at28c16_flash::*;

use std::fs;
use std::process::exit;
use std::time::Duration;

use at28c16_flash::payload::{
	RawImage,
	SevenSegmentDecimal,
};
use at28c16_flash::sim::SimulatedBridge;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_opt_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	if matches.is_present(name) {
		get_param(matches, name).map(Some)
	} else {
		Ok(None)
	}
}

fn config_from_args(matches: &clap::ArgMatches) -> AResult<ProgrammerConfig> {
	let mut config = ProgrammerConfig::default();
	if let Some(capacity) = get_opt_param(matches, "capacity")? {
		config.capacity = capacity;
	}
	if let Some(us) = get_opt_param(matches, "latch_pulse_us")? {
		config.latch_pulse = Duration::from_micros(us);
	}
	if let Some(ns) = get_opt_param(matches, "write_pulse_ns")? {
		config.write_pulse = Duration::from_nanos(ns);
	}
	config.poll_limit = get_opt_param(matches, "poll_limit")?;
	config.validate()?;
	Ok(config)
}

fn open_bridge(matches: &clap::ArgMatches, config: &ProgrammerConfig) -> AResult<SimulatedBridge> {
	if !matches.is_present("simulate") {
		bail!("no hardware bridge transport is built in; use --simulate or drive `Programmer` with your own `PinTransport`");
	}
	let mut sim = SimulatedBridge::new(config.pins, config.capacity);
	sim.set_busy_reads(get_opt_param(matches, "busy_polls")?.unwrap_or(3));
	warn!("using simulated bridge and EEPROM, nothing is written to hardware");
	Ok(sim)
}

fn burn_table<T: PinTransport>(programmer: &mut Programmer<T>) -> AResult<()> {
	let report = programmer.run(&SevenSegmentDecimal::default())?;
	print!("{}", report);
	Ok(())
}

fn write_file<T: PinTransport>(programmer: &mut Programmer<T>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let path = sub_m.value_of("FILE").ok_or_else(|| format_err!("missing parameter FILE"))?;
	let data = fs::read(path).map_err(|e| failure::Error::from(e).context(format!("reading {}", path)))?;
	let image = RawImage {
		name: path.to_string(),
		data,
	};
	programmer.write_block(&image.data)?;
	programmer.verify(&image.data)?;
	info!("{}: {} bytes written and verified", image.name, image.data.len());
	Ok(())
}

fn dump<T: PinTransport>(programmer: &mut Programmer<T>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let lines = get_opt_param(sub_m, "LINES")?.unwrap_or(16);
	print!("{}", programmer.dump(lines)?);
	Ok(())
}

fn read_file<T: PinTransport>(programmer: &mut Programmer<T>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let path = sub_m.value_of("FILE").ok_or_else(|| format_err!("missing parameter FILE"))?;
	let capacity = programmer.config().capacity;
	let data = programmer.read_block(capacity)?;
	fs::write(path, &data).map_err(|e| failure::Error::from(e).context(format!("writing {}", path)))?;
	info!("{}: saved {} bytes", path, data.len());
	Ok(())
}

fn clear<T: PinTransport>(programmer: &mut Programmer<T>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let bytes = get_opt_param(sub_m, "BYTES")?.unwrap_or(programmer.config().capacity);
	programmer.clear(bytes)?;
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg simulate: --simulate "use a simulated bridge and EEPROM")
		(@arg busy_polls: --("busy-polls") +takes_value "simulated write cycle length in I/O7 polls (default 3)")
		(@arg capacity: --capacity +takes_value "EEPROM size in bytes (default 2048)")
		(@arg latch_pulse_us: --("latch-pulse-us") +takes_value "address latch pulse width in microseconds (default 10)")
		(@arg write_pulse_ns: --("write-pulse-ns") +takes_value "minimum /WE pulse width in nanoseconds (default 0)")
		(@arg poll_limit: --("poll-limit") +takes_value "fail a write after this many polls instead of waiting forever")
		(@subcommand burn_table =>
			(about: "burn the seven segment decimal display table and dump the first 256 bytes")
		)
		(@subcommand write =>
			(about: "write a binary image starting at address 0 and verify it")
			(@arg FILE: +required "image to write")
		)
		(@subcommand dump =>
			(about: "print a hex dump")
			(@arg LINES: "number of 16 byte lines (default 16)")
		)
		(@subcommand read =>
			(about: "save the whole EEPROM content to a file")
			(@arg FILE: +required "file to write")
		)
		(@subcommand clear =>
			(about: "fill with 0xff")
			(@arg BYTES: "number of bytes from address 0 (default: all)")
		)
	).get_matches();

	let config = config_from_args(&matches)?;
	let bridge = open_bridge(&matches, &config)?;
	let mut programmer = Programmer::open(bridge, config)?;

	match matches.subcommand() {
		("burn_table", _) => burn_table(&mut programmer)?,
		("write", Some(sub_m)) => write_file(&mut programmer, sub_m)?,
		("dump", Some(sub_m)) => dump(&mut programmer, sub_m)?,
		("read", Some(sub_m)) => read_file(&mut programmer, sub_m)?,
		("clear", Some(sub_m)) => clear(&mut programmer, sub_m)?,
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}

	programmer.release()
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		if let Some(kind) = error::kind_of(&e) {
			debug!("failure kind: {:?}", kind);
		}
		exit(1);
	}
}
