use image::error::{DecodingError, ImageFormatHint};
use image::{DynamicImage, ImageError, ImageFormat, Rgba, RgbaImage};
use image_batch_viewer::decoder::{DecodeOutcome, DecodedImage};
use image_batch_viewer::{
    DecodeError, DecoderAdapter, FileBlob, ImageDecoder, ImageHandle, RasterDecoder,
    ViewController,
};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn png_blob(name: &str) -> FileBlob {
    FileBlob::new(name, "image/png", png(4, 3))
}

fn raster_view() -> ViewController {
    ViewController::new(DecoderAdapter::new(Arc::new(RasterDecoder), 4).unwrap())
}

fn names(view: &ViewController, total: usize) -> Vec<String> {
    // Walk the ring once from the first image, then restore the selection.
    let start = view.snapshot().index;
    view.go_to(0);
    let mut seen = Vec::new();
    for _ in 0..total {
        seen.push(view.current_image().unwrap().name().to_string());
        view.next();
    }
    view.go_to(start);
    seen
}

/// Holds each decode until the files it depends on have finished, so the
/// completion order can be forced.
struct GatedDecoder {
    waits_for: HashMap<String, Vec<String>>,
    fail: Vec<String>,
    finished: Mutex<Vec<String>>,
    changed: Condvar,
}

impl GatedDecoder {
    fn new(waits_for: &[(&str, &[&str])], fail: &[&str]) -> Self {
        Self {
            waits_for: waits_for
                .iter()
                .map(|(name, deps)| {
                    (
                        name.to_string(),
                        deps.iter().map(|d| d.to_string()).collect(),
                    )
                })
                .collect(),
            fail: fail.iter().map(|f| f.to_string()).collect(),
            finished: Mutex::new(Vec::new()),
            changed: Condvar::new(),
        }
    }

    fn finish_order(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

impl ImageDecoder for GatedDecoder {
    fn decode(&self, blob: &FileBlob) -> DecodeOutcome {
        let deps = self.waits_for.get(&blob.name).cloned().unwrap_or_default();
        let mut finished = self.finished.lock().unwrap();
        while !deps.iter().all(|d| finished.contains(d)) {
            finished = self.changed.wait(finished).unwrap();
        }
        finished.push(blob.name.clone());
        self.changed.notify_all();
        drop(finished);

        if self.fail.contains(&blob.name) {
            return Err(DecodeError::Decode {
                file: blob.name.clone(),
                source: ImageError::Decoding(DecodingError::new(
                    ImageFormatHint::Unknown,
                    "gated failure",
                )),
            });
        }
        Ok(ImageHandle::new(DecodedImage {
            name: blob.name.clone(),
            pixels: RgbaImage::new(1, 1),
        }))
    }
}

#[async_std::test]
async fn batch_order_survives_out_of_order_completion() {
    let decoder = Arc::new(GatedDecoder::new(
        &[("A", &["B", "C"][..]), ("C", &["B"][..])],
        &[],
    ));
    let view = ViewController::new(DecoderAdapter::new(decoder.clone(), 4).unwrap());

    let blobs = ["A", "B", "C"]
        .iter()
        .map(|n| FileBlob::new(*n, "image/png", Vec::new()))
        .collect();
    let report = view.ingest_batch(blobs).await;

    assert_eq!(decoder.finish_order(), ["B", "C", "A"]);
    assert_eq!(report.appended, 3);
    assert_eq!(names(&view, 3), ["A", "B", "C"]);
}

#[async_std::test]
async fn failed_slot_is_skipped_without_reordering() {
    let decoder = Arc::new(GatedDecoder::new(&[("A", &["C"][..])], &["B"]));
    let view = ViewController::new(DecoderAdapter::new(decoder, 4).unwrap());

    let blobs = ["A", "B", "C"]
        .iter()
        .map(|n| FileBlob::new(*n, "image/png", Vec::new()))
        .collect();
    let report = view.ingest_batch(blobs).await;

    assert_eq!(report.appended, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].slot, 1);
    assert_eq!(report.failures[0].file, "B");
    assert_eq!(names(&view, 2), ["A", "C"]);
}

#[async_std::test]
async fn browse_three_images() {
    let view = raster_view();
    let report = view
        .ingest_batch(vec![png_blob("one.png"), png_blob("two.png"), png_blob("three.png")])
        .await;
    assert_eq!(report.appended, 3);
    assert!(report.failures.is_empty());

    let snap = view.snapshot();
    assert!(snap.has_selection);
    assert_eq!((snap.index, snap.total), (0, 3));
    assert_eq!(snap.current_image.unwrap().name(), "one.png");

    assert_eq!(view.previous(), Some(2));
    assert_eq!(view.current_image().unwrap().name(), "three.png");

    view.zoom_in();
    view.zoom_in();
    view.zoom_in();
    assert_eq!(view.snapshot().zoom_percent, 160);
    assert_eq!(view.snapshot().index, 2);

    view.reset_zoom();
    assert_eq!(view.snapshot().zoom_percent, 100);
}

#[async_std::test]
async fn non_image_files_are_filtered_silently() {
    let view = raster_view();
    let report = view
        .ingest_batch(vec![
            png_blob("photo.png"),
            FileBlob::new("readme.txt", "text/plain", b"hello".to_vec()),
        ])
        .await;

    assert_eq!(report.submitted, 1);
    assert_eq!(report.filtered, 1);
    assert!(report.failures.is_empty());

    let snap = view.snapshot();
    assert_eq!((snap.index, snap.total), (0, 1));
}

#[async_std::test]
async fn undecodable_image_is_reported_and_survivor_selected() {
    let view = raster_view();
    let report = view
        .ingest_batch(vec![
            FileBlob::new("broken.jpg", "image/jpeg", b"\xff\xd8 truncated".to_vec()),
            png_blob("fine.png"),
        ])
        .await;

    assert_eq!(report.appended, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file, "broken.jpg");
    assert!(matches!(report.failures[0].error, DecodeError::Decode { .. }));

    let snap = view.snapshot();
    assert_eq!((snap.index, snap.total), (0, 1));
    assert_eq!(snap.current_image.unwrap().name(), "fine.png");
}

#[async_std::test]
async fn second_batch_keeps_index_and_zoom() {
    let view = raster_view();
    view.ingest_batch(vec![png_blob("a.png"), png_blob("b.png")]).await;
    view.next();
    view.zoom_out();

    view.ingest_batch(vec![png_blob("c.png")]).await;
    let snap = view.snapshot();
    assert_eq!(snap.index, 1);
    assert_eq!(snap.total, 3);
    assert_eq!(snap.zoom_percent, 80);
    assert_eq!(snap.current_image.unwrap().name(), "b.png");
}

#[async_std::test]
async fn first_batch_leaves_zoom_alone() {
    let view = raster_view();
    // No selection yet, so zoom requests are ignored.
    assert_eq!(view.zoom_in(), None);

    view.ingest_batch(vec![png_blob("a.png")]).await;
    let snap = view.snapshot();
    assert_eq!(snap.index, 0);
    assert_eq!(snap.zoom_percent, 100);
}

#[async_std::test]
async fn all_failures_leave_collection_empty() {
    let view = raster_view();
    let report = view
        .ingest_batch(vec![FileBlob::new("x.png", "image/png", vec![0, 1, 2])])
        .await;

    assert_eq!(report.appended, 0);
    assert_eq!(report.failures.len(), 1);
    assert!(!view.snapshot().has_selection);
    assert_eq!(view.next(), None);
}

#[async_std::test]
async fn concurrent_batches_settle_independently() {
    let view = raster_view();
    let other = view.clone();
    let second = async_std::task::spawn(async move {
        other
            .ingest_batch(vec![png_blob("b1.png"), png_blob("b2.png")])
            .await
    });
    let r1 = view
        .ingest_batch(vec![png_blob("a1.png"), png_blob("a2.png")])
        .await;
    let r2 = second.await;
    assert_eq!(r1.appended + r2.appended, 4);

    let all = names(&view, 4);
    let pos = |n: &str| all.iter().position(|x| x == n).unwrap();
    assert!(pos("a1.png") + 1 == pos("a2.png"));
    assert!(pos("b1.png") + 1 == pos("b2.png"));
    assert_eq!(view.snapshot().index, 0);
}

/// Panics on one named file, decodes everything else.
struct PanicsOn(&'static str);

impl ImageDecoder for PanicsOn {
    fn decode(&self, blob: &FileBlob) -> DecodeOutcome {
        if blob.name == self.0 {
            panic!("decoder blew up on {}", blob.name);
        }
        Ok(ImageHandle::new(DecodedImage {
            name: blob.name.clone(),
            pixels: RgbaImage::new(1, 1),
        }))
    }
}

#[async_std::test]
async fn panicking_decoder_loses_only_its_slot() {
    let view = ViewController::new(DecoderAdapter::new(Arc::new(PanicsOn("bad")), 4).unwrap());
    let blobs = ["good", "bad", "good2"]
        .iter()
        .map(|n| FileBlob::new(*n, "image/png", Vec::new()))
        .collect();

    let report = async_std::future::timeout(Duration::from_secs(10), view.ingest_batch(blobs))
        .await
        .expect("batch never settled after a decoder panic");

    assert_eq!(report.submitted, 3);
    assert_eq!(report.appended, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].slot, 1);
    assert_eq!(report.failures[0].file, "bad");
    assert!(matches!(
        report.failures[0].error,
        DecodeError::WorkerLost { ref file } if file == "bad"
    ));
    assert_eq!(names(&view, 2), ["good", "good2"]);
    assert_eq!(view.snapshot().index, 0);
}
