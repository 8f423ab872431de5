use std::path::{Path, PathBuf};

use image::{AnimationDecoder as _, RgbaImage, codecs::gif::GifDecoder};
use lottie2gif::{
    ConvertError, Resolution, Rgb8, RunConfig, convert_file, output_path_for, run,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn copy_fixture(dir: &Path, name: &str) -> PathBuf {
    let dst = dir.join(name);
    std::fs::copy(fixture(name), &dst).unwrap();
    dst
}

fn decode(path: &Path) -> Vec<RgbaImage> {
    let file = std::io::BufReader::new(std::fs::File::open(path).unwrap());
    GifDecoder::new(file)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
        .into_iter()
        .map(|f| f.into_buffer())
        .collect()
}

fn config(w: u32, h: u32, fps: u32) -> RunConfig {
    RunConfig {
        resolution: Resolution::new(w, h).unwrap(),
        fps,
        ..RunConfig::default()
    }
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(&x, y)| x.abs_diff(y) <= 8)
}

#[test]
fn square_scales_to_fit_and_animates() {
    let dir = tempfile::tempdir().unwrap();
    let input = copy_fixture(dir.path(), "square.json");
    let output = output_path_for(&input);

    convert_file(&config(200, 200, 10), &input, &output).unwrap();

    let frames = decode(&output);
    // 15 frames at 30 fps is half a second: five frames at 10 fps.
    assert_eq!(frames.len(), 5);
    for f in &frames {
        assert_eq!(f.dimensions(), (200, 100));
    }

    // Frame 0: the square spans x 20..100 on the scaled canvas.
    assert!(close(frames[0].get_pixel(60, 50).0, [255, 0, 0, 255]));
    assert_eq!(frames[0].get_pixel(2, 2).0[3], 0);
    // Last frame: the square has moved right, past x = 60.
    assert_eq!(frames[4].get_pixel(60, 50).0[3], 0);
    assert!(close(frames[4].get_pixel(120, 50).0, [255, 0, 0, 255]));
}

#[test]
fn background_makes_every_pixel_opaque() {
    let dir = tempfile::tempdir().unwrap();
    let input = copy_fixture(dir.path(), "square.json");
    let output = dir.path().join("with_bg.gif");

    let cfg = RunConfig {
        background: Some(Rgb8::new(0xfa, 0x74, 0x10)),
        ..config(100, 100, 5)
    };
    convert_file(&cfg, &input, &output).unwrap();

    let frames = decode(&output);
    assert!(!frames.is_empty());
    for f in &frames {
        assert_eq!(f.dimensions(), (100, 50));
        assert!(f.pixels().all(|p| p.0[3] == 255));
    }
    assert!(close(frames[0].get_pixel(1, 1).0, [0xfa, 0x74, 0x10, 255]));
}

#[test]
fn scene_with_precomp_parenting_and_unsupported_layers_converts() {
    let dir = tempfile::tempdir().unwrap();
    let input = copy_fixture(dir.path(), "scene.json");
    let output = output_path_for(&input);

    convert_file(&config(120, 90, 25), &input, &output).unwrap();

    let frames = decode(&output);
    assert_eq!(frames.len(), 25);
    assert_eq!(frames[0].dimensions(), (90, 90));
    // The precomp solid covers the canvas center.
    assert_eq!(frames[0].get_pixel(45, 45).0[3], 255);
}

#[test]
fn broken_input_fails_without_writing_an_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = copy_fixture(dir.path(), "broken.json");
    let output = output_path_for(&input);

    let err = convert_file(&RunConfig::default(), &input, &output).unwrap_err();
    assert!(matches!(err, ConvertError::Load(_)), "{err}");
    assert!(!output.exists());
}

#[test]
fn run_continues_past_failures_and_reports_them() {
    let dir = tempfile::tempdir().unwrap();
    let good = copy_fixture(dir.path(), "square.json");
    let bad = copy_fixture(dir.path(), "broken.json");
    let missing = dir.path().join("missing.json");

    let report = run(
        &config(50, 50, 4),
        &[bad.clone(), missing, good.clone()],
    );
    assert_eq!(report.converted, 1);
    assert_eq!(report.failed, 2);
    assert!(!report.is_success());
    assert!(output_path_for(&good).exists());
    assert!(!output_path_for(&bad).exists());
}

#[test]
fn single_file_honours_the_output_override() {
    let dir = tempfile::tempdir().unwrap();
    let input = copy_fixture(dir.path(), "square.json");
    let custom = dir.path().join("out").join("custom.gif");

    let cfg = RunConfig {
        output: Some(custom.clone()),
        ..config(40, 40, 2)
    };
    let report = run(&cfg, &[input.clone()]);
    assert!(report.is_success());
    assert!(custom.exists());
    assert!(!output_path_for(&input).exists());
}

#[test]
fn output_override_is_ignored_for_multiple_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let a = copy_fixture(dir.path(), "square.json");
    let sub = dir.path().join("sub");
    std::fs::create_dir(&sub).unwrap();
    let b = copy_fixture(&sub, "scene.json");
    let custom = dir.path().join("custom.gif");

    let cfg = RunConfig {
        output: Some(custom.clone()),
        ..config(20, 20, 2)
    };
    let report = run(&cfg, &[a.clone(), b.clone()]);
    assert_eq!(report.converted, 2);
    assert!(!custom.exists());
    assert!(output_path_for(&a).exists());
    assert!(output_path_for(&b).exists());
}
