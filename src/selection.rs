use crate::gate::{Guard, GuardRefusal};
use crate::resource::{RecordId, ResourceRecord, ResourceSpec};

/// Identifiers chosen for a batch operation, in selection order.
///
/// Every insertion goes through the guard, so the protected account and the
/// acting user can never be members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    /// Flip membership of `record`. Returns the new state (`true` = selected).
    pub fn toggle(
        &mut self,
        spec: &ResourceSpec,
        record: &ResourceRecord,
        guard: &Guard,
    ) -> Result<bool, GuardRefusal> {
        guard.check(spec, record)?;

        let Some(id) = spec.record_id(record) else {
            return Ok(false);
        };

        if let Some(pos) = self.ids.iter().position(|existing| existing == &id) {
            self.ids.remove(pos);
            Ok(false)
        } else {
            self.ids.push(id);
            Ok(true)
        }
    }

    /// Select every record the guard allows; returns how many were skipped.
    pub fn select_all<'r>(
        &mut self,
        spec: &ResourceSpec,
        records: impl IntoIterator<Item = &'r ResourceRecord>,
        guard: &Guard,
    ) -> usize {
        let mut skipped = 0;
        for record in records {
            match (guard.check(spec, record), spec.record_id(record)) {
                (Ok(()), Some(id)) => {
                    if !self.ids.contains(&id) {
                        self.ids.push(id);
                    }
                }
                _ => skipped += 1,
            }
        }
        skipped
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Hand the ids to a batch operation, leaving the set empty
    pub fn take(&mut self) -> Vec<RecordId> {
        std::mem::take(&mut self.ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CurrentUser;
    use crate::resource::catalog::EMPLOYEES;
    use serde_json::json;

    fn staff() -> Vec<ResourceRecord> {
        [(1, "briadmin"), (2, "ana"), (3, "jperez"), (4, "mgomez")]
            .into_iter()
            .map(|(id, name)| ResourceRecord::from_value(json!({"id": id, "username": name})).unwrap())
            .collect()
    }

    fn guard() -> Guard {
        let me = CurrentUser { id: Some(json!(2)), username: "ana".into(), roles: vec![] };
        Guard::new("briadmin", Some(&me))
    }

    #[test]
    fn select_all_excludes_protected_and_self() {
        let records = staff();
        let mut selection = SelectionSet::new();
        let skipped = selection.select_all(&EMPLOYEES, &records, &guard());

        assert_eq!(skipped, 2);
        assert_eq!(selection.ids(), &[RecordId::from("3"), RecordId::from("4")]);
    }

    #[test]
    fn toggle_refuses_guarded_records() {
        let records = staff();
        let guard = guard();
        let mut selection = SelectionSet::new();

        assert!(matches!(
            selection.toggle(&EMPLOYEES, &records[0], &guard),
            Err(GuardRefusal::Protected { .. })
        ));
        assert!(matches!(
            selection.toggle(&EMPLOYEES, &records[1], &guard),
            Err(GuardRefusal::SelfAction { .. })
        ));
        assert!(selection.is_empty());

        assert_eq!(selection.toggle(&EMPLOYEES, &records[2], &guard), Ok(true));
        assert_eq!(selection.toggle(&EMPLOYEES, &records[2], &guard), Ok(false));
        assert!(selection.is_empty());
    }

    #[test]
    fn take_consumes_the_selection() {
        let records = staff();
        let mut selection = SelectionSet::new();
        selection.select_all(&EMPLOYEES, &records[2..], &guard());
        selection.select_all(&EMPLOYEES, &records[2..], &guard());

        let ids = selection.take();
        assert_eq!(ids.len(), 2);
        assert!(selection.is_empty());
    }
}
