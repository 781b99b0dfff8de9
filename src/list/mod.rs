use futures::future::try_join_all;
use std::collections::HashMap;

use crate::client::{ApiClient, ApiRequest, HttpMethod};
use crate::error::ClientError;
use crate::gate::Guard;
use crate::resource::{AuxiliarySpec, RecordId, ResourceRecord, ResourceSpec, SearchField};
use crate::selection::SelectionSet;

/// In-memory snapshot of one entity's collection plus the auxiliary
/// collections needed to resolve display names.
///
/// The snapshot only changes on a successful `load()`; a failed load leaves
/// the previous state untouched. A successful load also clears the selection.
#[derive(Debug, Clone)]
pub struct ListController {
    api: ApiClient,
    spec: &'static ResourceSpec,
    records: Vec<ResourceRecord>,
    auxiliary: HashMap<&'static str, Vec<ResourceRecord>>,
    incomplete: Vec<ResourceRecord>,
    selection: SelectionSet,
    loaded: bool,
}

impl ListController {
    pub fn new(api: ApiClient, spec: &'static ResourceSpec) -> Self {
        Self {
            api,
            spec,
            records: Vec::new(),
            auxiliary: HashMap::new(),
            incomplete: Vec::new(),
            selection: SelectionSet::new(),
            loaded: false,
        }
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fetch the primary collection and every auxiliary collection in
    /// parallel, then swap them in together.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let primary = fetch_collection(&self.api, self.spec.collection_path, self.spec.authenticated);
        let auxiliary = try_join_all(
            self.spec
                .auxiliary
                .iter()
                .map(|aux| fetch_auxiliary(&self.api, aux)),
        );

        let (records, auxiliary) = match tokio::try_join!(primary, auxiliary) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(resource = self.spec.name, error = %e, "Failed to load collection");
                return Err(e);
            }
        };

        self.incomplete = records
            .iter()
            .filter(|record| self.spec.is_incomplete(record))
            .cloned()
            .collect();
        self.records = records;
        self.auxiliary = auxiliary.into_iter().collect();
        self.selection.clear();
        self.loaded = true;

        tracing::debug!(
            resource = self.spec.name,
            records = self.records.len(),
            incomplete = self.incomplete.len(),
            "Collection loaded"
        );
        Ok(())
    }

    /// Fetch a single record by id (edit forms)
    pub async fn fetch_one(&self, id: &RecordId) -> Result<ResourceRecord, ClientError> {
        let mut request = ApiRequest::new(HttpMethod::Get, self.spec.item_path_for(id));
        request.authenticated = self.spec.authenticated;
        ResourceRecord::from_value(self.api.execute(request).await?)
    }

    /// Fetch the detail view of a record, which may live on its own endpoint.
    /// When that endpoint is keyed by another field, the key is read from the
    /// record first (loaded snapshot, else a single fetch).
    pub async fn fetch_detail(&self, id: &RecordId) -> Result<ResourceRecord, ClientError> {
        let detail_id = match self.spec.detail_id_fields {
            None => id.clone(),
            Some(_) => {
                let record = match self.find(id) {
                    Some(record) => record.clone(),
                    None => self.fetch_one(id).await?,
                };
                self.spec.detail_id(&record).ok_or_else(|| ClientError::UnknownRecord {
                    resource: self.spec.name,
                    id: id.to_string(),
                })?
            }
        };

        let mut request = ApiRequest::new(HttpMethod::Get, self.spec.detail_path_for(&detail_id));
        request.authenticated = self.spec.authenticated;
        ResourceRecord::from_value(self.api.execute(request).await?)
    }

    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    pub fn incomplete(&self) -> &[ResourceRecord] {
        &self.incomplete
    }

    pub fn auxiliary(&self, name: &str) -> &[ResourceRecord] {
        self.auxiliary.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Auxiliary collection backing the relation lookup, if the entity has one
    pub fn relation_collection(&self) -> &[ResourceRecord] {
        self.spec
            .relation
            .map(|relation| self.auxiliary(relation.auxiliary))
            .unwrap_or(&[])
    }

    pub fn relation_name(&self, record: &ResourceRecord) -> Option<String> {
        self.spec.relation_name(record, self.relation_collection())
    }

    pub fn find(&self, id: &RecordId) -> Option<&ResourceRecord> {
        self.records
            .iter()
            .find(|record| self.spec.record_id(record).as_ref() == Some(id))
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    /// Toggle a loaded record in or out of the selection. Protected and self
    /// records are refused.
    pub fn toggle_selected(&mut self, id: &RecordId, guard: &Guard) -> Result<bool, ClientError> {
        let spec = self.spec;
        let record = self
            .records
            .iter()
            .find(|record| spec.record_id(record).as_ref() == Some(id))
            .ok_or_else(|| ClientError::UnknownRecord {
                resource: spec.name,
                id: id.to_string(),
            })?;
        Ok(self.selection.toggle(spec, record, guard)?)
    }

    /// Select every record the guard allows; returns how many were skipped
    pub fn select_all(&mut self, guard: &Guard) -> usize {
        self.selection.select_all(self.spec, &self.records, guard)
    }

    /// Select the incomplete subset, minus guarded records
    pub fn select_incomplete(&mut self, guard: &Guard) -> usize {
        self.selection.clear();
        self.selection.select_all(self.spec, &self.incomplete, guard)
    }

    /// Records matching `term` as a case-insensitive substring in any
    /// searchable field. An empty or blank term matches nothing.
    pub fn search(&self, term: &str) -> Vec<&ResourceRecord> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.records
            .iter()
            .filter(|record| self.matches(record, &needle))
            .collect()
    }

    fn matches(&self, record: &ResourceRecord, needle: &str) -> bool {
        self.spec.search_fields.iter().any(|field| {
            let haystack = match field {
                SearchField::Field(name) => record.text(name),
                SearchField::Relation => self.relation_name(record).unwrap_or_default(),
            };
            haystack.to_lowercase().contains(needle)
        })
    }
}

async fn fetch_collection(
    api: &ApiClient,
    path: &str,
    authenticated: bool,
) -> Result<Vec<ResourceRecord>, ClientError> {
    let mut request = ApiRequest::new(HttpMethod::Get, path);
    request.authenticated = authenticated;
    ResourceRecord::collection(api.execute(request).await?)
}

async fn fetch_auxiliary(
    api: &ApiClient,
    aux: &AuxiliarySpec,
) -> Result<(&'static str, Vec<ResourceRecord>), ClientError> {
    match fetch_collection(api, aux.path, aux.authenticated).await {
        Ok(records) => Ok((aux.name, records)),
        Err(e) if aux.optional => {
            tracing::warn!(collection = aux.name, error = %e, "Optional collection unavailable, using empty list");
            Ok((aux.name, Vec::new()))
        }
        Err(e) => Err(e),
    }
}
