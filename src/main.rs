//! Minimal terminal front end for the viewer core.
//!
//! Paths given on the command line form the first batch. Commands are read
//! from stdin, one per line.

use image_batch_viewer::{
    FileBlob, IngestReport, ViewController, ViewSnapshot, ViewerConfig, file_utils,
};
use log::warn;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const HELP: &str = "commands: n next, p previous, + zoom in, - zoom out, 0 reset, o <paths..> open, q quit";

fn paths_from_args() -> Vec<PathBuf> {
    std::env::args_os()
        .skip(1)
        .filter(|arg| !arg.to_string_lossy().starts_with('-'))
        .map(PathBuf::from)
        .collect()
}

/// Loads every readable path; unreadable ones are reported and skipped.
fn load_blobs<I: IntoIterator<Item = PathBuf>>(paths: I) -> Vec<FileBlob> {
    paths
        .into_iter()
        .filter_map(|path| match file_utils::load_blob(&path) {
            Ok(blob) => Some(blob),
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
        .collect()
}

fn open_batch(view: &ViewController, paths: Vec<PathBuf>) {
    if paths.is_empty() {
        return;
    }
    let requested = paths.len();
    let report = async_std::task::block_on(view.ingest_batch(load_blobs(paths)));
    print!("{}", batch_summary(requested, &report));
}

/// Summary of an opened batch. `requested` counts every path, including
/// those that could not be read.
fn batch_summary(requested: usize, report: &IngestReport) -> String {
    let mut out = format!(
        "opened {} of {} files ({} not images)\n",
        report.appended, requested, report.filtered
    );
    for failure in &report.failures {
        out.push_str(&format!("  could not decode {}\n", failure.file));
    }
    out
}

fn render(snapshot: &ViewSnapshot) -> String {
    match (&snapshot.current_image, snapshot.position_label()) {
        (Some(image), Some(position)) => {
            let (w, h) = image.zoomed_size(snapshot.zoom.factor());
            format!(
                "{} | {} | zoom {} ({}x{} -> {}x{})",
                position,
                image.name(),
                snapshot.zoom.label(),
                image.width(),
                image.height(),
                w,
                h
            )
        }
        _ => "no images loaded; use `o <paths..>` to open some".to_string(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();
    #[cfg(not(debug_assertions))]
    env_logger::init();

    let config = ViewerConfig::from_env()?;
    let view = ViewController::from_config(&config)?;

    open_batch(&view, paths_from_args());
    println!("{}", HELP);
    println!("{}", render(&view.snapshot()));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        match words.next() {
            Some("n") => {
                view.next();
            }
            Some("p") => {
                view.previous();
            }
            Some("+") => {
                view.zoom_in();
            }
            Some("-") => {
                view.zoom_out();
            }
            Some("0") => {
                view.reset_zoom();
            }
            Some("o") => open_batch(&view, words.map(PathBuf::from).collect()),
            Some("q") => break,
            Some(_) => println!("{}", HELP),
            None => continue,
        }
        println!("{}", render(&view.snapshot()));
        stdout.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use image_batch_viewer::decoder::DecodedImage;
    use image_batch_viewer::{DecodeError, DecodeFailure, ImageHandle, ZoomLevel};

    #[test]
    fn summary_counts_unreadable_paths() {
        let report = IngestReport {
            submitted: 2,
            filtered: 1,
            appended: 1,
            failures: vec![DecodeFailure {
                slot: 1,
                file: "bad.png".to_string(),
                error: DecodeError::WorkerLost {
                    file: "bad.png".to_string(),
                },
            }],
        };
        // Four paths requested, one of which could not be read at all.
        assert_eq!(
            batch_summary(4, &report),
            "opened 1 of 4 files (1 not images)\n  could not decode bad.png\n"
        );
    }

    #[test]
    fn render_uses_zoom_level() {
        let image = ImageHandle::new(DecodedImage {
            name: "a.png".to_string(),
            pixels: RgbaImage::new(10, 5),
        });
        let zoom = ZoomLevel::default().zoom_in().zoom_in().zoom_in();
        let snapshot = ViewSnapshot {
            has_selection: true,
            current_image: Some(image),
            index: 1,
            total: 3,
            zoom,
            zoom_percent: zoom.percent(),
        };
        assert_eq!(
            render(&snapshot),
            "Image 2 / 3 | a.png | zoom 160% (10x5 -> 16x8)"
        );
    }

    #[test]
    fn render_without_images() {
        let snapshot = ViewSnapshot {
            has_selection: false,
            current_image: None,
            index: 0,
            total: 0,
            zoom: ZoomLevel::default(),
            zoom_percent: 100,
        };
        assert!(render(&snapshot).starts_with("no images loaded"));
    }
}
