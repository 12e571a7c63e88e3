//! Autofill service.
//!
//! Drives one round: preconditions, scan, resolve, preview, apply, and the
//! undo/history bookkeeping that follows a fill.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, warn};

use smartfill_protocols::{
    field_key, keys, Credential, FieldDescriptor, FieldType, FieldValues, FrameChannel, FrameId,
    FrameInfo, HistoryEntry, HistoryField, PageContext, PreconditionError, Profile, ResolveRequest,
    ResolverError, StateStore, StateStoreExt, ValueResolver,
};

use crate::error::AutofillError;
use crate::history::HistoryStore;
use crate::orchestrator::FrameOrchestrator;
use crate::undo::UndoManager;
use crate::validator;

/// Default per-frame reply deadline.
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Ask the resolver and validate its reply into a value mapping.
pub async fn resolve_values(
    resolver: &dyn ValueResolver,
    request: ResolveRequest,
) -> Result<FieldValues, ResolverError> {
    let raw = resolver.resolve(request).await?;
    validator::extract_values(&raw)
}

/// One proposed value, for review before applying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub key: String,
    pub label: String,
    pub value: String,
    pub frame_id: FrameId,
}

/// Everything needed to apply a resolved fill.
#[derive(Debug, Clone)]
pub struct FillPreview {
    pub tab_id: String,
    pub context: PageContext,
    pub fields: Vec<FieldDescriptor>,
    /// Frames as they were scanned. A frame holding another document by the
    /// time the preview is applied is not filled.
    pub frames: Vec<FrameInfo>,
    /// Values keyed by page-unique field key.
    pub values: FieldValues,
    pub frames_failed: usize,
}

impl FillPreview {
    /// Fields that would receive a non-empty value, in scan order.
    pub fn entries(&self) -> Vec<PreviewEntry> {
        self.fields
            .iter()
            .filter_map(|field| {
                let key = field.key();
                let value = self.values.get(&key).filter(|v| !v.is_empty())?;
                Some(PreviewEntry {
                    label: field.display_label().to_string(),
                    value: value.clone(),
                    frame_id: field.frame_id,
                    key,
                })
            })
            .collect()
    }

    /// Whether applying would touch nothing.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Result of the discovery and resolution phase.
#[derive(Debug, Clone)]
pub enum PrepareOutcome {
    /// No fillable field on any frame.
    NothingToFill,
    Ready(FillPreview),
}

/// Result of applying a preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillOutcome {
    pub filled_count: usize,
    /// Per-field and per-frame failures, then bookkeeping failures.
    pub errors: Vec<String>,
    /// A snapshot was recorded and undo can revert this fill.
    pub undo_available: bool,
    pub history_recorded: bool,
}

/// Releases a tab when an operation ends.
struct TabGuard<'a> {
    busy: &'a Mutex<HashSet<String>>,
    tab_id: String,
}

impl Drop for TabGuard<'_> {
    fn drop(&mut self) {
        self.busy.lock().remove(&self.tab_id);
    }
}

/// The autofill engine facade.
pub struct Autofill {
    store: Arc<dyn StateStore>,
    resolver: Arc<dyn ValueResolver>,
    undo: UndoManager,
    history: HistoryStore,
    frame_timeout: Duration,
    busy: Mutex<HashSet<String>>,
}

impl Autofill {
    pub fn new(store: Arc<dyn StateStore>, resolver: Arc<dyn ValueResolver>) -> Self {
        Self {
            undo: UndoManager::new(store.clone()),
            history: HistoryStore::new(store.clone()),
            store,
            resolver,
            frame_timeout: DEFAULT_FRAME_TIMEOUT,
            busy: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_frame_timeout(mut self, frame_timeout: Duration) -> Self {
        self.frame_timeout = frame_timeout;
        self
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo
    }

    fn orchestrator(&self, channel: Arc<dyn FrameChannel>) -> FrameOrchestrator {
        FrameOrchestrator::new(channel, self.frame_timeout)
    }

    fn acquire(&self, tab_id: &str) -> Result<TabGuard<'_>, AutofillError> {
        let mut busy = self.busy.lock();
        if !busy.insert(tab_id.to_string()) {
            return Err(AutofillError::Busy(tab_id.to_string()));
        }
        Ok(TabGuard {
            busy: &self.busy,
            tab_id: tab_id.to_string(),
        })
    }

    /// Stored credential and profile, or the first missing one.
    pub async fn check_preconditions(&self) -> Result<(Credential, Profile), AutofillError> {
        let credential = self
            .store
            .get_as::<Credential>(keys::API_KEY)
            .await?
            .filter(|c| !c.is_blank())
            .ok_or(PreconditionError::MissingCredential)?;

        let profile = self
            .store
            .get_as::<Profile>(keys::USER_PROFILE)
            .await?
            .filter(Profile::is_complete)
            .ok_or(PreconditionError::IncompleteProfile)?;

        Ok((credential, profile))
    }

    /// Scan the page and resolve values for every field found.
    pub async fn prepare(
        &self,
        channel: Arc<dyn FrameChannel>,
    ) -> Result<PrepareOutcome, AutofillError> {
        let (credential, profile) = self.check_preconditions().await?;
        let _guard = self.acquire(channel.tab_id())?;
        let orchestrator = self.orchestrator(channel);

        let scan = orchestrator.scan_all().await;
        if scan.fields.is_empty() {
            info!("No fillable fields on tab {}", orchestrator.tab_id());
            return Ok(PrepareOutcome::NothingToFill);
        }

        let request = ResolveRequest::new(
            scan.fields.iter().map(FieldDescriptor::simplified).collect(),
            profile,
            scan.context.clone(),
        )
        .with_credential(credential);

        info!(
            "Resolving {} fields with {}",
            scan.fields.len(),
            self.resolver.name()
        );
        let mut values = resolve_values(self.resolver.as_ref(), request).await?;

        // Uploads are never filled, whatever the resolver says.
        for field in scan.fields.iter().filter(|f| f.field_type == FieldType::File) {
            if let Some(value) = values.get_mut(&field.key()) {
                value.clear();
            }
        }

        Ok(PrepareOutcome::Ready(FillPreview {
            tab_id: orchestrator.tab_id().to_string(),
            context: scan.context,
            fields: scan.fields,
            frames: scan.frames,
            values,
            frames_failed: scan.frames_failed,
        }))
    }

    /// Apply a reviewed preview. A fill that writes at least one field
    /// replaces the tab's undo snapshot and is recorded in history.
    pub async fn apply(
        &self,
        channel: Arc<dyn FrameChannel>,
        preview: &FillPreview,
    ) -> Result<FillOutcome, AutofillError> {
        if channel.tab_id() != preview.tab_id {
            warn!(
                "Applying a preview from tab {} to tab {}",
                preview.tab_id,
                channel.tab_id()
            );
        }
        let _guard = self.acquire(channel.tab_id())?;
        let orchestrator = self.orchestrator(channel);

        let report = orchestrator
            .fill_all(&preview.frames, &preview.fields, &preview.values)
            .await;
        let mut outcome = FillOutcome {
            filled_count: report.filled_count(),
            errors: report.result.errors.clone(),
            ..FillOutcome::default()
        };
        if outcome.filled_count == 0 {
            return Ok(outcome);
        }

        // The page is already changed, so bookkeeping failures are reported
        // alongside the count instead of failing the call.
        let written: HashSet<String> = report
            .frames
            .iter()
            .flat_map(|frame| {
                frame
                    .snapshot
                    .entries()
                    .iter()
                    .map(|entry| field_key(frame.frame_id, &entry.field_id))
            })
            .collect();

        match self
            .undo
            .record(orchestrator.tab_id(), &preview.context.url, report.frames)
            .await
        {
            Ok(()) => outcome.undo_available = true,
            Err(e) => {
                warn!(
                    "Failed to save the undo snapshot for tab {}: {}",
                    orchestrator.tab_id(),
                    e
                );
                outcome
                    .errors
                    .push(format!("Undo is not available for this fill: {}", e));
            }
        }

        let fields = preview
            .entries()
            .into_iter()
            .filter(|entry| written.contains(&entry.key))
            .map(|entry| HistoryField {
                key: entry.key,
                label: entry.label,
                value: entry.value,
            })
            .collect();
        match self
            .history
            .record(HistoryEntry::new(preview.context.url.clone(), fields))
            .await
        {
            Ok(()) => outcome.history_recorded = true,
            Err(e) => {
                warn!("Failed to record fill history: {}", e);
                outcome
                    .errors
                    .push(format!("Fill history was not updated: {}", e));
            }
        }

        Ok(outcome)
    }

    /// Revert the tab's most recent fill. Returns the number of restored
    /// fields, 0 when there is nothing to undo.
    pub async fn undo(&self, channel: Arc<dyn FrameChannel>) -> Result<usize, AutofillError> {
        let _guard = self.acquire(channel.tab_id())?;
        let orchestrator = self.orchestrator(channel);
        Ok(self.undo.undo(&orchestrator).await?)
    }
}

#[cfg(test)]
#[path = "autofill_tests.rs"]
mod tests;
