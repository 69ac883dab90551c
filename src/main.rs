use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use png_crc_fix::{Error, PngIO};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "png-crc-fix")]
#[command(about = "Check and repair chunk CRCs of a PNG file in place", long_about = None)]
struct Args {
    /// Report wrong CRCs without modifying the file
    #[arg(short = 'n', long)]
    check: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// PNG file to check and repair
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let (chunks, report) = match PngIO::new().fix_file(&args.file, args.check) {
        Ok(result) => result,
        Err(Error::NotPng) => {
            eprintln!("{}", Error::NotPng);
            return ExitCode::FAILURE;
        }
        Err(Error::Io(e)) => {
            eprintln!("{}: {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    for (index, chunk) in chunks.iter().enumerate() {
        println!("{}", chunk);
        if report.get(index).is_some() {
            if args.check {
                println!("Incorrect CRC");
            } else {
                println!("Corrected CRC");
            }
        }
    }

    if args.check && !report.is_clean() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
