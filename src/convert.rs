use std::path::{Path, PathBuf};

use crate::{
    cli::RunConfig,
    engine::{Session, Shape},
    foundation::error::ConvertResult,
    walk::{self, ResolvedInput},
};

/// Outcome counts of a [`run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// `<name>.json` becomes `<name>.gif` next to the input.
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension("gif")
}

/// Convert one Lottie file to a GIF at `output`.
///
/// The engine session lives for exactly this call and is released on every return path.
#[tracing::instrument(skip(cfg, input, output), fields(input = %input.display()))]
pub fn convert_file(cfg: &RunConfig, input: &Path, output: &Path) -> ConvertResult<()> {
    let session = Session::init()?;
    let mut animation = session.load(input)?;

    let natural = animation.size();
    let scale = natural.fit_scale(cfg.resolution);
    let scaled = natural.scaled(scale);
    animation.set_size(scaled.width, scaled.height)?;
    tracing::debug!(
        natural_w = natural.width,
        natural_h = natural.height,
        scale,
        "scaled to fit {}",
        cfg.resolution
    );

    let mut saver = session.saver();
    if let Some(color) = cfg.background {
        let (w, h) = animation.canvas_pixels();
        saver.background(
            Shape::rect(0.0, 0.0, f64::from(w), f64::from(h)).with_fill(color),
        )?;
    }
    saver.save(animation, output, 0, cfg.fps)?;
    saver.sync()
}

/// Convert every input in order. Failures are logged and counted; they never stop the run.
pub fn run(cfg: &RunConfig, inputs: &[PathBuf]) -> RunReport {
    let mut report = RunReport::default();

    if cfg.output.is_some() && inputs.len() != 1 {
        tracing::warn!("-o only applies to a single input file; ignoring it");
    }

    for raw in inputs {
        let resolved = match walk::resolve_input(raw) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::error!("{err}");
                report.failed += 1;
                continue;
            }
        };

        match resolved {
            ResolvedInput::Directory(dir) => {
                tracing::info!("Directory: {}", dir.display());
                if cfg.output.is_some() && inputs.len() == 1 {
                    tracing::warn!("-o does not apply to a directory input; ignoring it");
                }
                for file in walk::collect_lottie_files(&dir) {
                    let output = output_path_for(&file);
                    convert_and_report(cfg, &file, &output, &mut report);
                }
            }
            // Naming follows the path as given, so a symlinked input gets its GIF next to the
            // link rather than next to the target.
            ResolvedInput::File(_) => {
                if !walk::is_lottie_path(raw) {
                    tracing::warn!("Skipped non-lottie file: {}", raw.display());
                    report.skipped += 1;
                    continue;
                }
                let output = match &cfg.output {
                    Some(out) if inputs.len() == 1 => out.clone(),
                    _ => output_path_for(raw),
                };
                convert_and_report(cfg, raw, &output, &mut report);
            }
        }
    }

    tracing::info!(
        converted = report.converted,
        failed = report.failed,
        skipped = report.skipped,
        "done"
    );
    report
}

fn convert_and_report(cfg: &RunConfig, input: &Path, output: &Path, report: &mut RunReport) {
    tracing::info!("Converting: {}", input.display());
    match convert_file(cfg, input, output) {
        Ok(()) => {
            tracing::info!("Generated: {}", output.display());
            report.converted += 1;
        }
        Err(err) => {
            tracing::error!("Failed to convert {}: {err}", input.display());
            report.failed += 1;
        }
    }
}
