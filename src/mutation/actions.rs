//! Destructive actions: single delete, batch delete, cleanup of incomplete
//! records and the status toggle. Each one goes through the confirmation
//! gate and reloads the list afterwards.

use crate::client::{ApiRequest, HttpMethod};
use crate::error::ClientError;
use crate::gate::{run_sequential, BatchOutcome, ConfirmationGate, Prompt};
use crate::list::ListController;
use crate::resource::{RecordId, ResourceRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The user answered no; nothing was sent
    Declined,
}

/// Confirm and delete one record, then reload.
pub async fn delete_record(
    list: &mut ListController,
    gate: &ConfirmationGate<'_>,
    id: &RecordId,
) -> Result<ActionOutcome, ClientError> {
    let spec = list.spec();
    let record = target_record(list, id).await?;

    let prompt = Prompt::delete(spec.label, &spec.title(&record));
    if !gate.confirm(spec, &record, &prompt).await? {
        return Ok(ActionOutcome::Declined);
    }

    let mut request = ApiRequest::new(HttpMethod::Delete, spec.delete_path_for(id));
    request.authenticated = spec.authenticated;
    list.api().execute(request).await?;
    tracing::info!(resource = spec.name, id = %id, "Record deleted");

    reload(list).await;
    Ok(ActionOutcome::Completed)
}

/// One prompt for the list's whole selection, then sequential deletes. A
/// failure never stops the remaining items. The selection is consumed when
/// the user confirms and kept when they decline.
pub async fn delete_selected(
    list: &mut ListController,
    gate: &ConfirmationGate<'_>,
) -> Result<Option<BatchOutcome>, ClientError> {
    if list.selection().is_empty() {
        return Err(ClientError::EmptySelection);
    }

    let spec = list.spec();
    let prompt = Prompt::delete_many(spec.label, list.selection().len());
    if !gate.confirm_batch(&prompt).await {
        return Ok(None);
    }

    let api = list.api().clone();
    let ids = list.selection_mut().take();
    let outcome = run_sequential(ids, |id| {
        let api = api.clone();
        async move {
            let mut request = ApiRequest::new(HttpMethod::Delete, spec.delete_path_for(&id));
            request.authenticated = spec.authenticated;
            api.execute(request).await.map(|_| ()).map_err(|e| e.user_message())
        }
    })
    .await;

    tracing::info!(
        resource = spec.name,
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "Batch delete finished"
    );

    reload(list).await;
    Ok(Some(outcome))
}

/// Delete every incomplete record the guards allow. Protected and self
/// records are never part of the batch.
pub async fn cleanup_incomplete(
    list: &mut ListController,
    gate: &ConfirmationGate<'_>,
) -> Result<Option<BatchOutcome>, ClientError> {
    let skipped = list.select_incomplete(gate.guard());
    if skipped > 0 {
        tracing::info!(resource = list.spec().name, skipped, "Guarded records left out of cleanup");
    }
    delete_selected(list, gate).await
}

/// Single-field status toggle (employee inactivation): PATCH with no body.
pub async fn toggle_status(
    list: &mut ListController,
    gate: &ConfirmationGate<'_>,
    id: &RecordId,
) -> Result<ActionOutcome, ClientError> {
    let spec = list.spec();
    let path = spec.status_toggle_path_for(id).ok_or(ClientError::Unsupported {
        resource: spec.name,
        action: "status toggle",
    })?;
    let record = target_record(list, id).await?;

    let prompt = Prompt::inactivate(spec.label, &spec.title(&record));
    if !gate.confirm(spec, &record, &prompt).await? {
        return Ok(ActionOutcome::Declined);
    }

    let mut request = ApiRequest::new(HttpMethod::Patch, path);
    request.authenticated = spec.authenticated;
    list.api().execute(request).await?;
    tracing::info!(resource = spec.name, id = %id, "Status toggled");

    reload(list).await;
    Ok(ActionOutcome::Completed)
}

/// The record from the loaded snapshot, or fetched when the list has not
/// been loaded or does not contain it. Guards need its username.
async fn target_record(list: &ListController, id: &RecordId) -> Result<ResourceRecord, ClientError> {
    match list.find(id) {
        Some(record) => Ok(record.clone()),
        None => list.fetch_one(id).await,
    }
}

// The mutation already happened; a failed reload only leaves a stale list
pub(crate) async fn reload(list: &mut ListController) {
    if let Err(e) = list.load().await {
        tracing::warn!(resource = list.spec().name, error = %e, "Reload after mutation failed");
    }
}
