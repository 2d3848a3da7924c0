use std::time::Duration;

use mrz_fast_types::{RawFrame, RawPixelFormat, ScanResult};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};
use tokio_stream::wrappers::ReceiverStream;

use crate::source::{CameraSource, FrameStream};

/// Synthetic camera for tests and the `--mock` demo: emits timer-paced NV21
/// frames containing a dark band in the MRZ region so the geometry and
/// normalization stages have something to chew on.
#[derive(Debug, Clone)]
pub struct MockCamera {
    frame_count: usize,
    width: u32,
    height: u32,
    rotation: Option<i32>,
    interval: Duration,
    torch_on: bool,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self {
            frame_count: 30,
            width: 1280,
            height: 720,
            rotation: Some(90),
            interval: Duration::from_millis(33),
            torch_on: false,
        }
    }
}

impl MockCamera {
    pub fn new(
        frame_count: usize,
        width: u32,
        height: u32,
        rotation: Option<i32>,
        interval: Duration,
    ) -> Self {
        Self {
            frame_count,
            width,
            height,
            rotation,
            interval,
            torch_on: false,
        }
    }

    pub fn torch_on(&self) -> bool {
        self.torch_on
    }

    fn generate_frame(&self, index: usize) -> RawFrame {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut data = vec![200u8; width * height];

        // Dark glyph-like band across the lower quarter of the sensor frame.
        let band_top = height * 3 / 4;
        let band_bottom = band_top + height / 10;
        for row in band_top..band_bottom.min(height) {
            let offset = row * width;
            for col in 0..width {
                data[offset + col] = if (col / 8 + index) % 2 == 0 { 20 } else { 200 };
            }
        }

        // Interleaved VU plane, neutral chroma.
        data.extend(std::iter::repeat_n(
            128u8,
            width.div_ceil(2) * height.div_ceil(2) * 2,
        ));

        let timestamp = self.interval.checked_mul(index as u32);
        RawFrame::from_owned(self.width, self.height, RawPixelFormat::Nv21, self.rotation, data)
            .expect("mock frame construction should not fail")
            .with_frame_index(Some(index as u64))
            .with_timestamp(timestamp)
    }
}

impl CameraSource for MockCamera {
    fn set_torch(&mut self, on: bool) -> ScanResult<()> {
        self.torch_on = on;
        Ok(())
    }

    fn into_stream(self: Box<Self>) -> FrameStream {
        let camera = *self;
        let (tx, rx) = mpsc::channel::<ScanResult<RawFrame>>(1);
        tokio::spawn(async move {
            let mut next_instant = Instant::now();
            for index in 0..camera.frame_count {
                let frame = camera.generate_frame(index);
                if Instant::now() < next_instant {
                    sleep(next_instant - Instant::now()).await;
                }
                next_instant += camera.interval;
                if tx.send(Ok(frame)).await.is_err() {
                    break;
                }
            }
        });
        Box::pin(ReceiverStream::new(rx))
    }
}
