use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_stream::StreamExt;

use mrz_fast::mock::MockCamera;
use mrz_fast::{FrameOutcome, MrzScanner, PhotoCrop, ScanSession, ScannerConfig};
use mrz_fast_ocr::{NoopOcrEngine, OcrEngine, OcrError, OcrRequest, OcrResponse};
use mrz_fast_preprocess::InterfaceOrientation;
use mrz_fast_types::{Image, PixelFormat, RawFrame, RawPixelFormat};

const LINE_1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
const LINE_2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";

/// Test double standing in for the recognizer: canned text, optional delay,
/// call counting.
struct FakeOcrEngine {
    text: String,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeOcrEngine {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(text: impl Into<String>, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(text)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for FakeOcrEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn recognize(&self, _: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(OcrResponse::new(self.text.clone()))
    }
}

fn nv21_frame(width: u32, height: u32, rotation: Option<i32>) -> RawFrame {
    let pixels = width as usize * height as usize;
    let chroma = width.div_ceil(2) as usize * height.div_ceil(2) as usize * 2;
    let mut data = vec![200u8; pixels];
    data.extend(vec![128u8; chroma]);
    RawFrame::from_owned(width, height, RawPixelFormat::Nv21, rotation, data).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn live_frame_yields_validated_mrz() {
    let engine = Arc::new(FakeOcrEngine::new(format!(
        "REISEPASS NOISE\n{LINE_1}\n{LINE_2}\n"
    )));
    let scanner = MrzScanner::new(ScannerConfig::default(), engine.clone()).unwrap();

    let outcome = scanner
        .process_frame(nv21_frame(1920, 1080, Some(90)))
        .await
        .unwrap();

    let result = outcome.into_mrz().expect("frame should produce an MRZ");
    assert_eq!(result.lines(), &[LINE_1.to_string(), LINE_2.to_string()]);
    assert_eq!(engine.calls(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn frames_are_dropped_while_a_run_is_in_flight() {
    let engine = Arc::new(FakeOcrEngine::slow(
        format!("{LINE_1}\n{LINE_2}"),
        Duration::from_millis(200),
    ));
    let scanner = Arc::new(MrzScanner::new(ScannerConfig::default(), engine.clone()).unwrap());

    let busy = Arc::clone(&scanner);
    let first = tokio::spawn(async move { busy.process_frame(nv21_frame(1280, 720, Some(90))).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = scanner
        .process_frame(nv21_frame(1280, 720, Some(90)))
        .await
        .unwrap();
    assert_eq!(second, FrameOutcome::Dropped);

    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, FrameOutcome::Mrz(_)));
    // The dropped frame never reached the engine.
    assert_eq!(engine.calls(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn frame_too_small_for_geometry_is_contained() {
    let engine = Arc::new(FakeOcrEngine::new(""));
    let scanner = MrzScanner::new(ScannerConfig::default(), engine.clone()).unwrap();

    let err = scanner
        .process_frame(nv21_frame(2, 2, None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        mrz_fast_types::ScanError::InvalidGeometry { .. }
    ));
    assert_eq!(engine.calls(), 0);

    // The scanner survives the bad frame; the next one processes normally.
    let outcome = scanner
        .process_frame(nv21_frame(1280, 720, Some(90)))
        .await
        .unwrap();
    assert_eq!(outcome, FrameOutcome::NoMrz);
}

#[tokio::test(flavor = "multi_thread")]
async fn session_streams_results_and_stops_on_request() {
    let engine = Arc::new(FakeOcrEngine::new(format!("{LINE_1}\n{LINE_2}")));
    let scanner = Arc::new(MrzScanner::new(ScannerConfig::default(), engine).unwrap());
    let camera = MockCamera::new(100, 640, 480, Some(90), Duration::from_millis(5));

    let (handle, mut results) = ScanSession::spawn(Box::new(camera), scanner);

    let first = tokio::time::timeout(Duration::from_secs(5), results.next())
        .await
        .expect("session should emit a result")
        .expect("stream should not end before a result")
        .expect("result should not be an error");
    assert_eq!(first.line_count(), 2);

    handle.stop();
    let rest = tokio::time::timeout(Duration::from_secs(5), async {
        let mut remaining = 0usize;
        while results.next().await.is_some() {
            remaining += 1;
        }
        remaining
    })
    .await
    .expect("stream should end after stop");
    // At most the results already buffered in the channel leak through.
    assert!(rest <= 4, "got {rest} results after stop");
}

#[tokio::test(flavor = "multi_thread")]
async fn stopped_session_ends_without_results() {
    let scanner = Arc::new(
        MrzScanner::new(ScannerConfig::default(), Arc::new(NoopOcrEngine)).unwrap(),
    );
    let camera = MockCamera::new(1000, 640, 480, Some(90), Duration::from_millis(10));

    let (handle, mut results) = ScanSession::spawn(Box::new(camera), scanner);
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.stop();

    let end = tokio::time::timeout(Duration::from_secs(2), results.next()).await;
    assert!(matches!(end, Ok(None)), "stream should end promptly");
}

#[tokio::test(flavor = "multi_thread")]
async fn photo_capture_orients_bounds_and_crops() {
    let scanner = MrzScanner::new(ScannerConfig::default(), Arc::new(NoopOcrEngine)).unwrap();
    let photo =
        Image::from_owned(1920, 1080, PixelFormat::Gray8, vec![128; 1920 * 1080]).unwrap();

    // Portrait capture rotates the landscape sensor buffer upright, then
    // bounds it to delivery resolution.
    let full = scanner
        .capture_photo(photo.clone(), InterfaceOrientation::Portrait, PhotoCrop::Full)
        .await
        .unwrap();
    assert_eq!(full.width(), 720);
    assert_eq!(full.height(), 1280);

    let cropped = scanner
        .capture_photo(photo, InterfaceOrientation::Portrait, PhotoCrop::Document)
        .await
        .unwrap();
    assert!(cropped.width() <= 720);
    assert!(cropped.height() <= 1280);
}

#[tokio::test(flavor = "multi_thread")]
async fn photo_scan_with_no_recognizable_text_is_empty() {
    let scanner = MrzScanner::new(ScannerConfig::default(), Arc::new(NoopOcrEngine)).unwrap();
    let photo =
        Image::from_owned(1080, 1920, PixelFormat::Rgb8, vec![200; 1080 * 1920 * 3]).unwrap();

    let result = scanner
        .scan_photo(photo, InterfaceOrientation::LandscapeLeft)
        .await
        .unwrap();
    assert!(result.is_empty());
}
