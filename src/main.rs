use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use vellum::format::MappingFormat;

#[derive(Debug, Parser)]
#[command(version, about = "Convert and inspect mapping databases")]
struct Cli {
	/// More log output; can be given twice.
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Convert mappings between the directory, `.json` and `.zip` forms.
	///
	/// Both formats are inferred from the paths.
	Convert {
		input: PathBuf,
		output: PathBuf,
	},
	/// Print the format version and entry counts of a mapping source.
	Info {
		path: PathBuf,
	},
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_logger(cli.verbose)?;

	match cli.command {
		Command::Convert { input, output } => {
			let data = MappingFormat::detect(&input).read(&input)?;
			MappingFormat::detect(&output).write(&data, &output)?;
			info!("converted {input:?} to {output:?}");
		},
		Command::Info { path } => {
			let data = MappingFormat::detect(&path).read(&path)?;

			let fields: usize = data.classes.values().map(|class| class.fields.len()).sum();
			let methods: usize = data.classes.values().map(|class| class.methods.len()).sum();
			let parameters: usize = data.classes.values()
				.flat_map(|class| class.methods.values())
				.map(|method| method.parameters.len())
				.sum();

			println!("format version: {}", data.version);
			println!("packages: {}", data.packages.len());
			println!("classes: {}", data.classes.len());
			println!("fields: {fields}");
			println!("methods: {methods} ({parameters} named or documented parameters)");
		},
	}

	Ok(())
}

fn setup_logger(verbose: u8) -> Result<()> {
	let level = match verbose {
		0 => LevelFilter::Info,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};

	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {message}", record.level(), record.target()))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("failed to initialize logging")
}
