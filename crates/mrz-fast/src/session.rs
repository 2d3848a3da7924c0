use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use futures_util::stream::unfold;
use mrz_fast_types::{MrzResult, ScanResult};
use tokio::sync::{mpsc, watch};
use tokio_stream::StreamExt;
use tracing::warn;

use crate::scanner::{FrameOutcome, MrzScanner};
use crate::source::DynCameraSource;

const RESULT_CHANNEL_CAPACITY: usize = 4;

pub type MrzStream = Pin<Box<dyn Stream<Item = ScanResult<MrzResult>> + Send>>;

/// Handle to a running scan session. `stop` cancels promptly: the drive loop
/// selects on the flag, and a result computed while stopping is discarded
/// instead of delivered. Dropping the handle stops the session too.
pub struct SessionHandle {
    cancel: watch::Sender<bool>,
}

impl SessionHandle {
    pub fn stop(&self) {
        let _ = self.cancel.send(true);
    }
}

/// Drives a camera source through a scanner, emitting only frames that
/// produced MRZ text. Per-frame pipeline errors are contained and logged;
/// a source failure is forwarded once and ends the stream.
pub struct ScanSession;

impl ScanSession {
    pub fn spawn(source: DynCameraSource, scanner: Arc<MrzScanner>) -> (SessionHandle, MrzStream) {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let (tx, rx) = mpsc::channel::<ScanResult<MrzResult>>(RESULT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut frames = source.into_stream();
            loop {
                let item = tokio::select! {
                    changed = cancel_rx.changed() => {
                        // A flipped flag or a dropped handle both end the session.
                        let _ = changed;
                        break;
                    }
                    item = frames.next() => item,
                };

                let Some(item) = item else {
                    break;
                };

                match item {
                    Ok(frame) => match scanner.process_frame(frame).await {
                        Ok(FrameOutcome::Mrz(result)) => {
                            if *cancel_rx.borrow() {
                                break;
                            }
                            if tx.send(Ok(result)).await.is_err() {
                                break;
                            }
                        }
                        Ok(FrameOutcome::NoMrz | FrameOutcome::Dropped) => {}
                        Err(err) => {
                            warn!(error = %err, "frame pipeline failed, skipping frame");
                        }
                    },
                    Err(err) => {
                        let _ = tx.send(Err(err)).await;
                        break;
                    }
                }
            }
        });

        let stream = Box::pin(unfold(rx, |mut receiver| async {
            receiver.recv().await.map(|item| (item, receiver))
        }));

        (SessionHandle { cancel: cancel_tx }, stream)
    }
}
