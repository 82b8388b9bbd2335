//! Recursive batch conversion of a VOX directory tree into a mirrored OBJ
//! tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::convert::{ConvertOptions, convert_file};

/// Converts every `.vox` under `input_dir`, mirroring the directory layout
/// under `output_dir`. One file failing is reported and skipped; the batch
/// keeps going. Returns the number of failed files.
pub fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    opts: &ConvertOptions,
    show_time: bool,
) -> io::Result<usize> {
    println!("[Directories] Scanning input directory tree...");
    let mut files = Vec::new();
    collect_vox_files(input_dir, &mut files)?;
    files.sort();
    log::info!("found {} VOX files under {}", files.len(), input_dir.display());

    let mut failures = 0usize;
    for (idx, input) in files.iter().enumerate() {
        let output = map_output_path(input_dir, output_dir, input);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let start = Instant::now();
        print!("[{}] {} ", idx + 1, input.display());
        match convert_file(input, &output, opts) {
            Ok(()) => {
                if show_time {
                    print!(" ({}ms)", start.elapsed().as_millis());
                }
                println!();
            }
            Err(err) => {
                println!();
                log::error!("{err}");
                failures += 1;
            }
        }
    }
    Ok(failures)
}

/// Depth-first walk collecting files with a `.vox` extension, any case.
fn collect_vox_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_vox_files(&path, out)?;
        } else if is_vox(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_vox(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("vox"))
}

/// Re-roots `input` from `input_dir` to `output_dir` and swaps the
/// extension to `.obj`. Falls back to the bare file name when `input` is
/// not under `input_dir`.
fn map_output_path(input_dir: &Path, output_dir: &Path, input: &Path) -> PathBuf {
    let relative = input
        .strip_prefix(input_dir)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(input.file_name().unwrap_or_default()));
    output_dir.join(relative).with_extension("obj")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vox_extension_matches_any_case() {
        assert!(is_vox(Path::new("a/model.vox")));
        assert!(is_vox(Path::new("a/MODEL.VOX")));
        assert!(is_vox(Path::new("a/model.Vox")));
        assert!(!is_vox(Path::new("a/model.obj")));
        assert!(!is_vox(Path::new("a/vox")));
    }

    #[test]
    fn output_path_mirrors_subtree() {
        let out = map_output_path(
            Path::new("/in"),
            Path::new("/out"),
            Path::new("/in/props/crate.vox"),
        );
        assert_eq!(out, PathBuf::from("/out/props/crate.obj"));
    }

    #[test]
    fn output_path_falls_back_to_file_name() {
        let out = map_output_path(
            Path::new("/in"),
            Path::new("/out"),
            Path::new("/elsewhere/crate.vox"),
        );
        assert_eq!(out, PathBuf::from("/out/crate.obj"));
    }

    #[test]
    fn output_extension_is_replaced_not_appended() {
        let out = map_output_path(Path::new("/in"), Path::new("/out"), Path::new("/in/a.VOX"));
        assert_eq!(out, PathBuf::from("/out/a.obj"));
    }
}
