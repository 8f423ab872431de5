use std::{ffi::OsString, path::PathBuf};

use clap::{
    CommandFactory as _, Parser,
    error::{ContextKind, ContextValue, ErrorKind},
};

use crate::foundation::core::{Resolution, Rgb8};

/// Convert Lottie animations to animated GIFs.
#[derive(Parser, Debug)]
#[command(
    name = "lottie2gif",
    version,
    args_override_self = true,
    override_usage = "lottie2gif <file|dir> [<file|dir> ...] [options]",
    after_help = "Examples:\n  lottie2gif input.json\n  lottie2gif input.json -r 600x600\n  \
                  lottie2gif input.json -f 30\n  lottie2gif input.json -r 600x600 -f 30\n  \
                  lottie2gif lottiefolder\n  lottie2gif lottiefolder -r 600x600 -f 30 -b fa7410"
)]
struct Cli {
    /// Lottie files or directories to convert.
    #[arg(value_name = "FILE|DIR")]
    inputs: Vec<PathBuf>,

    /// Output resolution; the animation is scaled to fit, keeping its aspect ratio.
    #[arg(short = 'r', value_name = "WxH", default_value_t = Resolution::default())]
    resolution: Resolution,

    /// Output frame rate.
    #[arg(short = 'f', value_name = "FPS", default_value_t = 30)]
    fps: u32,

    /// Background color as six hex digits; without it the GIF keeps transparency.
    #[arg(short = 'b', value_name = "RRGGBB")]
    background: Option<Rgb8>,

    /// Output file (only when converting a single file).
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Run-wide settings, fixed once the command line is parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub resolution: Resolution,
    pub fps: u32,
    pub background: Option<Rgb8>,
    pub output: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            fps: 30,
            background: None,
            output: None,
        }
    }
}

#[derive(Debug)]
pub enum Invocation {
    /// Convert `inputs` in order.
    Convert {
        config: RunConfig,
        inputs: Vec<PathBuf>,
    },
    /// No inputs were given; the caller prints this text and exits successfully.
    Usage(String),
}

/// Parse a full argument list (program name first).
///
/// Unknown options are reported with a warning and dropped, then parsing starts over. Help,
/// version and malformed values come back as the `clap::Error` to show.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let cli = loop {
        match Cli::try_parse_from(&args) {
            Ok(cli) => break cli,
            Err(err) if err.kind() == ErrorKind::UnknownArgument => {
                let Some(ContextValue::String(unknown)) = err.get(ContextKind::InvalidArg) else {
                    return Err(err);
                };
                let unknown = unknown.clone();
                let Some(idx) = unknown_token_index(&args, &unknown) else {
                    return Err(err);
                };
                tracing::warn!(option = %unknown, "unknown option, ignored");
                args.remove(idx);
            }
            Err(err) => return Err(err),
        }
    };

    if cli.inputs.is_empty() {
        return Ok(Invocation::Usage(Cli::command().render_help().to_string()));
    }
    Ok(Invocation::Convert {
        config: RunConfig {
            resolution: cli.resolution,
            fps: cli.fps,
            background: cli.background,
            output: cli.output,
        },
        inputs: cli.inputs,
    })
}

fn unknown_token_index(args: &[OsString], unknown: &str) -> Option<usize> {
    // clap reports `--name` for `--name=value` and `-x` for `-xvalue`.
    let tokens = || args.iter().enumerate().skip(1);
    tokens()
        .find(|(_, a)| a.to_str() == Some(unknown))
        .or_else(|| {
            tokens().find(|(_, a)| a.to_str().is_some_and(|a| a.starts_with(unknown)))
        })
        .map(|(i, _)| i)
}
