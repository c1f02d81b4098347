//! Runs the `lura` binary end to end.

use std::path::Path;
use std::process::Command;

use image::{Rgba, RgbaImage};

fn lura() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lura"))
}

fn write_gray(path: &Path) {
    RgbaImage::from_pixel(4, 3, Rgba([128, 128, 128, 255])).save(path).unwrap();
}

#[test]
fn test_presets_lists_catalog() {
    let out = lura().arg("presets").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    for id in ["none", "clean", "soft", "dark", "vintage", "film", "warm", "cool"] {
        assert!(text.contains(id), "missing {id}");
    }
}

#[test]
fn test_apply_contrast_to_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("gray.png");
    let output = dir.path().join("out/gray_contrast.png");
    write_gray(&input);

    let status = lura()
        .arg("apply")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--contrast", "2"])
        .status()
        .unwrap();
    assert!(status.success());

    let result = image::open(&output).unwrap().into_rgba8();
    assert_eq!(result.dimensions(), (4, 3));
    assert!(result.pixels().all(|p| p.0 == [129, 129, 129, 255]));
}

#[test]
fn test_apply_rotates_source() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("gray.png");
    let output = dir.path().join("rotated.png");
    write_gray(&input);

    let status = lura()
        .arg("apply")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--rotate", "-90", "--preset", "warm"])
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(image::open(&output).unwrap().into_rgba8().dimensions(), (3, 4));
}

#[test]
fn test_apply_rejects_unknown_preset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("gray.png");
    write_gray(&input);

    let out = lura()
        .arg("apply")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("x.png"))
        .args(["--preset", "sepia"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("sepia"));
}

#[test]
fn test_previews_writes_one_file_per_preset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("gray.png");
    let strip = dir.path().join("strip");
    write_gray(&input);

    let status = lura()
        .arg("previews")
        .arg(&input)
        .arg("--out-dir")
        .arg(&strip)
        .args(["--size", "2"])
        .status()
        .unwrap();
    assert!(status.success());

    let count = std::fs::read_dir(&strip).unwrap().count();
    assert_eq!(count, 8);
    let none = image::open(strip.join("gray_none.png")).unwrap();
    assert_eq!((none.width(), none.height()), (2, 2));
}
