#![forbid(unsafe_code)]

pub mod cli;
pub mod convert;
pub mod encode;
pub mod engine;
pub mod foundation;
pub mod lottie;
pub mod render;
pub mod walk;

pub use cli::{Invocation, RunConfig, parse_args};
pub use convert::{RunReport, convert_file, output_path_for, run};
pub use foundation::core::{Resolution, Rgb8, Size};
pub use foundation::error::{ConvertError, ConvertResult};
