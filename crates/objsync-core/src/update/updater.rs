use objsync_core_types::schema::OP_OBJ_UPDATE;

use super::{UpdateFields, UpdateOptions, UpdateRequest};
use crate::diff::{compare_resolved, ChangeSet, Differ};
use crate::errors::Result;
use crate::log_op_error;
use crate::logging_facility::{ChangeLog, DEFAULT_CHANGE_LOG};
use crate::model::{FieldDescriptor, FieldLookup, Record};
use crate::store::{ensure_writable, Persist, WriteSet};

/// Conditional updater: applies a request field by field and persists
/// only when something changed
///
/// Holds its collaborators by reference; one updater can serve any number
/// of records and stores.
pub struct Updater<'a> {
    lookup: &'a dyn FieldLookup,
    log: &'a dyn ChangeLog,
}

impl<'a> Updater<'a> {
    /// Updater reporting changes to the process-wide `tracing` sink
    pub fn new(lookup: &'a dyn FieldLookup) -> Self {
        Self::with_log(lookup, &DEFAULT_CHANGE_LOG)
    }

    pub fn with_log(lookup: &'a dyn FieldLookup, log: &'a dyn ChangeLog) -> Self {
        Self { lookup, log }
    }

    pub(crate) fn log(&self) -> &'a dyn ChangeLog {
        self.log
    }

    /// Apply `request` to `record`, persisting the dirty fields
    ///
    /// Every field name is resolved before the record is touched, so an
    /// unknown field leaves the record exactly as it was. Changed fields
    /// are then overwritten in memory, one change event is logged, and the
    /// store is asked to write the fields selected by `options`.
    ///
    /// Returns whether any field changed. An unchanged request logs nothing
    /// and never reaches the store.
    ///
    /// # Errors
    ///
    /// * `UnknownField` - A requested field has no descriptor
    /// * `UnsavedPartialWrite` - `record` has no pk and the write set is
    ///   constrained (`Computed` or `Explicit`)
    /// * Any error of the store's `persist`; in-memory changes are kept
    pub fn apply<R, P>(
        &self,
        store: &mut P,
        record: &mut R,
        request: &UpdateRequest,
        options: &UpdateOptions,
    ) -> Result<bool>
    where
        R: Record + ?Sized,
        P: Persist<R> + ?Sized,
    {
        let result = self.apply_inner(store, record, request, options);
        if let Err(err) = &result {
            log_op_error!(OP_OBJ_UPDATE, err.clone(), model = record.model_name());
        }
        result
    }

    fn apply_inner<R, P>(
        &self,
        store: &mut P,
        record: &mut R,
        request: &UpdateRequest,
        options: &UpdateOptions,
    ) -> Result<bool>
    where
        R: Record + ?Sized,
        P: Persist<R> + ?Sized,
    {
        let differ = Differ::new(self.lookup);
        let resolved = request
            .iter()
            .map(|(field, value)| Ok((differ.resolve(record, field)?, value)))
            .collect::<Result<Vec<(FieldDescriptor, _)>>>()?;

        let mut changes = ChangeSet::new();
        for (descriptor, value) in resolved {
            if let Some(change) = compare_resolved(record, &descriptor, value.clone()) {
                changes.push(change);
            }
        }
        if changes.is_empty() {
            return Ok(false);
        }

        self.log
            .record_updated(record.model_name(), record.pk().as_ref(), &changes);

        if options.persist {
            let computed;
            let fields = match &options.update_fields {
                UpdateFields::Computed => {
                    computed = changes.field_names();
                    WriteSet::Fields(&computed)
                }
                UpdateFields::Explicit(names) => WriteSet::Fields(names),
                UpdateFields::All => WriteSet::All,
            };
            ensure_writable(record, fields)?;
            store.persist(record, fields)?;
        }
        Ok(true)
    }
}
