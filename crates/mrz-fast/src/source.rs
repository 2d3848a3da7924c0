use std::pin::Pin;

use futures_core::Stream;
use futures_util::stream::unfold;
use mrz_fast_types::{RawFrame, ScanResult};
use tokio::sync::mpsc::{self, Sender};

pub type FrameStream = Pin<Box<dyn Stream<Item = ScanResult<RawFrame>> + Send>>;

pub type DynCameraSource = Box<dyn CameraSource>;

/// Provider of raw camera frames. Real implementations wrap a platform
/// capture session; tests and demos use [`crate::mock::MockCamera`].
pub trait CameraSource: Send + 'static {
    /// Toggle the torch. Sources without one accept the request and ignore
    /// it, matching how capture stacks treat unsupported flash modes.
    fn set_torch(&mut self, _on: bool) -> ScanResult<()> {
        Ok(())
    }

    fn into_stream(self: Box<Self>) -> FrameStream;
}

/// Bridge a blocking frame producer into a bounded stream. The channel
/// capacity is the only buffering in the frame path; a slow consumer
/// backpressures the producer instead of queueing stale frames.
pub fn spawn_stream_from_channel(
    capacity: usize,
    task: impl FnOnce(Sender<ScanResult<RawFrame>>) + Send + 'static,
) -> FrameStream {
    let (tx, rx) = mpsc::channel(capacity);
    tokio::task::spawn_blocking(move || task(tx));
    let stream = unfold(rx, |mut receiver| async {
        receiver.recv().await.map(|item| (item, receiver))
    });
    Box::pin(stream)
}
