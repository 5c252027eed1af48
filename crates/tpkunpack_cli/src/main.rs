#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "tpkunpack", about = "Unpack TPK sprite containers into images and animations")]
struct Cli {
	/// Log every pipeline stage.
	#[arg(long, global = true)]
	debug: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the header and record table.
	Info(cmd::info::Args),
	/// Extract every sprite into an output directory.
	Unpack(cmd::unpack::Args),
}

fn main() {
	let cli = Cli::parse();
	init_logger(cli.debug);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> tpkunpack::tpk::Result<()> {
	match command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Unpack(args) => cmd::unpack::run(args),
	}
}

fn init_logger(debug: bool) {
	let level = if debug { "debug" } else { "info" };
	let env = env_logger::Env::default()
		.filter_or("TPKUNPACK_LOG", level)
		.write_style_or("TPKUNPACK_LOG_STYLE", "auto");
	env_logger::Builder::from_env(env).target(env_logger::Target::Stderr).init();
}
