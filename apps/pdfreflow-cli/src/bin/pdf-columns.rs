//! Split two-column PDF pages into side-by-side panels
//!
//! Output page layout:
//! |1|2|3|4|
//! 1: left column, 2: ruled lines, 3: right column, 4: ruled lines

use clap::{ArgAction, Parser};
use pdfreflow_core::{split_columns_file, ClipMap, SplitOptions, A4_WIDTH, DEFAULT_GRID_WIDTH};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pdf-columns")]
#[command(
    version,
    about = "Lay out the two columns of each PDF page side by side with ruled margins"
)]
struct Args {
    /// Input PDF file (must end in .pdf)
    input: PathBuf,

    /// x-coordinate separating the left and right column
    #[arg(long, default_value_t = A4_WIDTH / 2, overrides_with = "divide")]
    divide: u32,

    /// Spacing of the ruled lines
    #[arg(
        long = "grid_width",
        default_value_t = DEFAULT_GRID_WIDTH,
        overrides_with = "grid_width"
    )]
    grid_width: u32,

    /// Header height kept unsplit for specific pages: page:height[,page:height...]
    #[arg(long, value_parser = parse_clip, action = ArgAction::Append)]
    clip: Vec<ClipMap>,

    /// Output PDF file [default: <input>_converted.pdf]
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_clip(value: &str) -> Result<ClipMap, String> {
    value.parse().map_err(|e: pdfreflow_core::ReflowError| e.to_string())
}

fn main() -> ExitCode {
    let args: Args = match pdfreflow_cli::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    if !pdfreflow_cli::has_pdf_suffix(&args.input) {
        println!("Error: the input file must be a PDF (.pdf).");
        return ExitCode::FAILURE;
    }

    if let Err(e) = pdfreflow_cli::init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut clips = ClipMap::new();
    for map in args.clip {
        clips.extend(map);
    }
    if !clips.is_empty() {
        tracing::info!("Header clips on {} page(s)", clips.len());
        for (page, height) in clips.iter() {
            tracing::debug!("clip: page {} -> {}", page, height);
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| pdfreflow_cli::converted_output_path(&args.input));
    let options = SplitOptions::new()
        .divide(args.divide)
        .grid_width(args.grid_width)
        .clips(clips);

    let result = split_columns_file(&args.input, &output, &options);
    pdfreflow_cli::report_outcome(&args.input, result)
}
