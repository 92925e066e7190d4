use std::env;
use std::path::{Path, PathBuf};

/// Libraries the decoder links against, checked when `FFMPEG_DIR` is set.
const REQUIRED_HEADERS: &[&str] = &["libavformat", "libavcodec", "libswscale", "libavutil"];

fn main() {
    for variable in ["FFMPEG_DIR", "PKG_CONFIG_PATH", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if let Some(ffmpeg_dir) = env::var_os("FFMPEG_DIR").map(PathBuf::from) {
        check_ffmpeg_dir(&ffmpeg_dir);
        return;
    }

    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() == "windows" {
        suggest_vcpkg_install();
    }
}

fn check_ffmpeg_dir(ffmpeg_dir: &Path) {
    let include = ffmpeg_dir.join("include");
    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|library| !include.join(library).is_dir())
        .collect();

    if !missing.is_empty() {
        println!(
            "cargo:warning=FFMPEG_DIR={} is missing headers for {}; scenestill needs the format, codec, and scaling libraries.",
            ffmpeg_dir.display(),
            missing.join(", "),
        );
    }
}

fn suggest_vcpkg_install() {
    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=FFMPEG_DIR is not set. On Windows, install FFmpeg via vcpkg and point FFMPEG_DIR at it."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.is_dir() {
        println!(
            "cargo:warning=Found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to use it.",
            candidate.display(),
        );
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT is set but {} does not exist.",
            candidate.display(),
        );
    }
}
