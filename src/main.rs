mod error;
mod logging;
mod parser;
mod processor;
mod serialiser;
mod srt;

use crate::parser::{Parser, Validation};
use crate::processor::{EndTime, ProcessOpts};
use crate::srt::Cue;

use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use tracing::warn;

fn main() {
    logging::init();
    match run(Cli::parse()) {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Convert timestamped transcript text into SRT subtitles")]
struct Cli {
    #[arg(
        value_name = "INPUT",
        help = "The transcript to read from. Use '-' to read from standard input."
    )]
    input: String,
    #[arg(
        value_name = "OUTPUT",
        help = "The SRT file to write to, replacing it if it exists. Use '-' to write to standard output."
    )]
    output: String,
    #[arg(
        long,
        help = "Accept timestamps with out-of-range or single-digit minutes and seconds, and bare second counts."
    )]
    lenient: bool,
    #[arg(
        long,
        value_enum,
        value_name = "POLICY",
        default_value_t = EndTime::Next,
        help = "End each subtitle at the next timestamp, or a fixed duration after its start."
    )]
    end_time: EndTime,
    #[arg(
        short,
        long,
        value_name = "SECS",
        default_value_t = 2,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Duration of subtitles that have no following timestamp."
    )]
    duration: u64,
}

fn run(cli: Cli) -> Result<()> {
    let data = if cli.input == "-" {
        read_input(io::stdin()).context("Failed to read from stdin")?
    } else {
        std::fs::read_to_string(&cli.input)
            .context(format!("Failed to open input file: '{}'", cli.input))?
    };

    let validation = if cli.lenient {
        Validation::Lenient
    } else {
        Validation::Strict
    };
    let opts = ProcessOpts {
        end_time: cli.end_time,
        duration: Duration::from_secs(cli.duration),
    };
    let cues = convert(&data, validation, &opts);
    if cues.is_empty() {
        warn!(input = %cli.input, "No captioned timestamps found, the output will be empty");
    }

    if cli.output == "-" {
        let stdout = io::stdout();
        write_output(&mut stdout.lock(), &cues).context("Failed to write to stdout")?;
        eprintln!(
            "Conversion completed successfully! ({} cues written to stdout)",
            cues.len()
        );
    } else {
        serialiser::serialise(&cues, &cli.output)
            .context(format!("Failed to write output file: '{}'", cli.output))?;
        println!(
            "Conversion completed successfully! ({} cues written to '{}')",
            cues.len(),
            cli.output
        );
    }

    Ok(())
}

fn read_input<R: Read>(mut src: R) -> Result<String> {
    let mut buffer = String::new();
    src.read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn write_output<W: Write>(dst: &mut W, cues: &[Cue]) -> Result<()> {
    let document = serialiser::render(cues)?;
    dst.write_all(&document)?;
    dst.flush()?;
    Ok(())
}

fn convert(data: &str, validation: Validation, opts: &ProcessOpts) -> Vec<Cue> {
    let blocks = Parser::new(validation).parse(data);
    processor::process(blocks, opts)
}
