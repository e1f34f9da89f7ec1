use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::LevelFilter;
use std::path::PathBuf;

mod analyzer;
mod config;
mod input;
mod psd;
mod render;
mod signal;

use config::{Config, InputSource, OutputTarget, SignalType};
use input::SampleEncoding;
use psd::{WelchParams, WindowFunction};

/// Plot the power spectral density of a raw scalar or IQ sample capture
#[derive(Parser, Debug)]
#[command(name = "iq-psd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Sample rate in Hz (fractional values are truncated)
    #[arg(short = 's', long = "rate", value_name = "SAMPLE_RATE", value_parser = config::parse_sample_rate)]
    sample_rate: u64,

    /// Signal type
    #[arg(short = 't', long = "type", value_enum, default_value = "iq")]
    signal_type: SignalType,

    /// Sample element encoding (ignored for .wav input)
    #[arg(short = 'd', long = "data-format", value_enum, default_value = "i16")]
    data_format: SampleEncoding,

    /// Output image (.png, .jpg, .bmp, .svg); omit to show a window
    #[arg(short, long, value_name = "OUTPUT_IMAGE")]
    output: Option<PathBuf>,

    /// Input capture file, or - for standard input
    #[arg(short, long, value_name = "INPUT_CAPTURE_FILE", default_value = "-")]
    input: String,

    /// Welch segment length (FFT size)
    #[arg(long, default_value = "256")]
    nfft: usize,

    /// Samples of overlap between Welch segments
    #[arg(long, default_value = "0")]
    noverlap: usize,

    /// Window applied to each segment
    #[arg(long, value_enum, default_value = "hann")]
    window: WindowFunction,

    /// Offset added to the frequency axis in Hz (e.g. the tuner frequency)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    center_freq: f64,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            sample_rate: self.sample_rate,
            signal_type: self.signal_type,
            encoding: self.data_format,
            input: InputSource::from_arg(&self.input),
            output: match self.output {
                Some(path) => OutputTarget::File(path),
                None => OutputTarget::Screen,
            },
            welch: WelchParams {
                nfft: self.nfft,
                noverlap: self.noverlap,
                window: self.window,
            },
            center_freq: self.center_freq,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("winit", LevelFilter::Warn)
        .filter_module("eframe", LevelFilter::Warn)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

/// Bad invocations print the problem and the full usage to stdout, exit 1
fn usage_error(err: clap::Error) -> ! {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => {
            println!("{}", err);
            println!("{}", Args::command().render_help());
            std::process::exit(1);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::try_parse().unwrap_or_else(|err| usage_error(err));

    init_logging(args.verbose);
    let config = args.into_config();
    log::debug!("{:?}", config);

    analyzer::run(&config)
}
