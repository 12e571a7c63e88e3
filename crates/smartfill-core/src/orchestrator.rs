//! Cross-frame orchestration.
//!
//! Fans scan, fill and undo requests out to every relevant frame of a page
//! concurrently and folds the replies. A frame that is unreachable, errors or
//! misses the deadline never fails the operation: scans and undos drop it,
//! fills report it as one error line.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use smartfill_protocols::{
    ChannelError, FieldDescriptor, FieldValues, FillResult, FrameChannel, FrameId, FrameInfo,
    FrameRequest, FrameResponse, FrameSnapshot, PageContext, TOP_FRAME,
};

/// Aggregated scan of every frame.
#[derive(Debug, Clone, Default)]
pub struct PageScan {
    /// Fields of all frames, each tagged with its frame.
    pub fields: Vec<FieldDescriptor>,
    /// Context of the top-level frame.
    pub context: PageContext,
    pub frames: Vec<FrameInfo>,
    pub frames_scanned: usize,
    pub frames_failed: usize,
}

/// Aggregated fill of every frame.
#[derive(Debug, Clone, Default)]
pub struct FillReport {
    pub result: FillResult,
    /// Snapshots of the frames where at least one field was written.
    pub frames: Vec<FrameSnapshot>,
}

impl FillReport {
    pub fn filled_count(&self) -> usize {
        self.result.filled_count
    }
}

/// Fan-out/fan-in over one page's frames.
pub struct FrameOrchestrator {
    channel: Arc<dyn FrameChannel>,
    frame_timeout: Duration,
}

impl FrameOrchestrator {
    pub fn new(channel: Arc<dyn FrameChannel>, frame_timeout: Duration) -> Self {
        Self {
            channel,
            frame_timeout,
        }
    }

    pub fn tab_id(&self) -> &str {
        self.channel.tab_id()
    }

    async fn frames(&self) -> Result<Vec<FrameInfo>, ChannelError> {
        match tokio::time::timeout(self.frame_timeout, self.channel.frames()).await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::PageUnavailable(format!(
                "frame enumeration timed out after {} ms",
                self.frame_timeout.as_millis()
            ))),
        }
    }

    async fn call(
        &self,
        frame_id: FrameId,
        request: FrameRequest,
    ) -> Result<FrameResponse, ChannelError> {
        let reply = tokio::time::timeout(self.frame_timeout, self.channel.send(frame_id, request))
            .await
            .map_err(|_| ChannelError::Timeout {
                frame_id,
                timeout_ms: self.frame_timeout.as_millis() as u64,
            })??;

        match reply {
            FrameResponse::Error { error } => Err(ChannelError::Remote {
                frame_id,
                message: error,
            }),
            other => Ok(other),
        }
    }

    /// Scan every frame. Enumeration failure yields an empty scan.
    pub async fn scan_all(&self) -> PageScan {
        let frames = match self.frames().await {
            Ok(frames) => frames,
            Err(e) => {
                warn!("Frame enumeration failed for tab {}: {}", self.tab_id(), e);
                return PageScan::default();
            }
        };

        let replies = join_all(
            frames
                .iter()
                .map(|frame| self.call(frame.frame_id, FrameRequest::Scan)),
        )
        .await;

        let mut scan = PageScan::default();
        for (frame, reply) in frames.iter().zip(replies) {
            match reply {
                Ok(FrameResponse::Scan {
                    fields,
                    page_context,
                }) => {
                    scan.frames_scanned += 1;
                    debug!("Frame {} reported {} fields", frame.frame_id, fields.len());
                    scan.fields.extend(fields.into_iter().map(|mut field| {
                        field.frame_id = frame.frame_id;
                        field
                    }));
                    if frame.frame_id == TOP_FRAME {
                        if let Some(context) = page_context {
                            scan.context = context;
                        }
                    }
                }
                Ok(other) => {
                    scan.frames_failed += 1;
                    warn!("Frame {} answered scan with {:?}", frame.frame_id, other);
                }
                Err(e) => {
                    scan.frames_failed += 1;
                    warn!("Scan of frame {} failed: {}", frame.frame_id, e);
                }
            }
        }

        info!(
            "Scanned {} frames of tab {}: {} fields, {} frames failed",
            scan.frames_scanned,
            self.tab_id(),
            scan.fields.len(),
            scan.frames_failed
        );
        scan.frames = frames;
        scan
    }

    /// Route `values` (keyed by page-unique field key) to their frames and
    /// fill them. Empty values mean "leave blank" and are never sent; keys
    /// that match no field are ignored. A frame is only filled while it still
    /// holds the document listed in `scanned`; every frame that is skipped
    /// or fails adds one error to the report.
    pub async fn fill_all(
        &self,
        scanned: &[FrameInfo],
        fields: &[FieldDescriptor],
        values: &FieldValues,
    ) -> FillReport {
        let mut by_frame: BTreeMap<FrameId, FieldValues> = BTreeMap::new();
        for field in fields {
            if let Some(value) = values.get(&field.key()).filter(|v| !v.is_empty()) {
                by_frame
                    .entry(field.frame_id)
                    .or_default()
                    .insert(field.id.clone(), value.clone());
            }
        }

        let mut report = FillReport::default();
        if by_frame.is_empty() {
            return report;
        }

        let documents = match self.frames().await {
            Ok(frames) => frames
                .into_iter()
                .map(|f| (f.frame_id, f.document_id))
                .collect::<HashMap<_, _>>(),
            Err(e) => {
                warn!("Frame enumeration failed for tab {}: {}", self.tab_id(), e);
                report.result.errors.push(e.to_string());
                return report;
            }
        };
        let expected: HashMap<FrameId, &str> = scanned
            .iter()
            .map(|f| (f.frame_id, f.document_id.as_str()))
            .collect();

        let mut targets: Vec<(FrameId, String, FieldValues)> = Vec::with_capacity(by_frame.len());
        for (frame_id, values) in by_frame {
            match documents.get(&frame_id) {
                Some(current) if expected.get(&frame_id) == Some(&current.as_str()) => {
                    targets.push((frame_id, current.clone(), values));
                }
                Some(current) => {
                    warn!(
                        "Frame {} holds document {} which was not scanned, skipping its fill",
                        frame_id, current
                    );
                    report.result.errors.push(format!(
                        "Frame {}: Page changed since the scan, its fields were not filled.",
                        frame_id
                    ));
                }
                None => {
                    warn!("Frame {} disappeared before fill", frame_id);
                    report
                        .result
                        .errors
                        .push(format!("Frame {}: Frame no longer exists.", frame_id));
                }
            }
        }

        let replies = join_all(targets.iter().map(|(frame_id, _, values)| {
            self.call(
                *frame_id,
                FrameRequest::Fill {
                    values: values.clone(),
                },
            )
        }))
        .await;

        for ((frame_id, document_id, _), reply) in targets.into_iter().zip(replies) {
            match reply {
                Ok(FrameResponse::Fill(fill)) => {
                    debug!(
                        "Frame {} filled {} fields ({} errors)",
                        frame_id,
                        fill.result.filled_count,
                        fill.result.errors.len()
                    );
                    report.result.merge(fill.result);
                    if !fill.snapshot.is_empty() {
                        report.frames.push(FrameSnapshot {
                            frame_id,
                            document_id,
                            snapshot: fill.snapshot,
                        });
                    }
                }
                Ok(other) => {
                    warn!("Frame {} answered fill with {:?}", frame_id, other);
                    report
                        .result
                        .errors
                        .push(format!("Frame {}: Unexpected reply to fill.", frame_id));
                }
                Err(e) => {
                    warn!("Fill of frame {} failed: {}", frame_id, e);
                    report.result.errors.push(fill_failure(frame_id, &e));
                }
            }
        }

        info!(
            "Filled {} fields across {} frames of tab {}",
            report.result.filled_count,
            report.frames.len(),
            self.tab_id()
        );
        report
    }

    /// Restore recorded snapshots. Frames whose document changed since the
    /// fill (navigation, reload) are skipped. Returns the number of restored
    /// fields.
    pub async fn undo_all(&self, recorded: &[FrameSnapshot]) -> usize {
        if recorded.is_empty() {
            return 0;
        }

        let documents = match self.frames().await {
            Ok(frames) => frames
                .into_iter()
                .map(|f| (f.frame_id, f.document_id))
                .collect::<HashMap<_, _>>(),
            Err(e) => {
                warn!("Frame enumeration failed for tab {}: {}", self.tab_id(), e);
                return 0;
            }
        };

        let targets: Vec<&FrameSnapshot> = recorded
            .iter()
            .filter(|frame| {
                let current = documents.get(&frame.frame_id);
                if current == Some(&frame.document_id) {
                    true
                } else {
                    info!(
                        "Frame {} changed document since the fill, its snapshot is dropped",
                        frame.frame_id
                    );
                    false
                }
            })
            .collect();

        let replies = join_all(targets.iter().map(|frame| {
            self.call(
                frame.frame_id,
                FrameRequest::Undo {
                    snapshot: frame.snapshot.clone(),
                },
            )
        }))
        .await;

        let mut undone = 0;
        for (frame, reply) in targets.iter().zip(replies) {
            match reply {
                Ok(FrameResponse::Undo { undone: count }) => undone += count,
                Ok(other) => warn!("Frame {} answered undo with {:?}", frame.frame_id, other),
                Err(e) => warn!("Undo of frame {} failed: {}", frame.frame_id, e),
            }
        }
        undone
    }
}

/// User-facing line for a frame that could not be filled.
fn fill_failure(frame_id: FrameId, error: &ChannelError) -> String {
    match error {
        ChannelError::Timeout { .. } => {
            format!("Frame {}: No response from content script.", frame_id)
        }
        ChannelError::Unreachable(_) => {
            format!("Frame {}: Could not reach content script.", frame_id)
        }
        ChannelError::Remote { message, .. } => format!("Frame {}: {}", frame_id, message),
        ChannelError::UnexpectedReply { detail, .. } => {
            format!("Frame {}: Unexpected reply: {}", frame_id, detail)
        }
        ChannelError::PageUnavailable(message) => format!("Frame {}: {}", frame_id, message),
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
