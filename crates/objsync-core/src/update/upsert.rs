use objsync_core_types::schema::OP_OBJ_UPDATE_OR_CREATE;

use super::{UpdateOptions, UpdateRequest, Updater};
use crate::errors::Result;
use crate::log_op_error;
use crate::logging_facility::ChangeLog;
use crate::model::{FieldLookup, Record};
use crate::store::{FindOrCreate, Persist};

/// Result of [`UpsertUpdater::apply_or_create`]
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome<R> {
    pub record: R,
    /// A new record was inserted from lookup and defaults
    pub created: bool,
    /// An existing record had at least one default applied; always false
    /// when `created` is true
    pub changed: bool,
}

/// Find-or-create followed by a conditional update of the found record
pub struct UpsertUpdater<'a> {
    updater: Updater<'a>,
}

impl<'a> UpsertUpdater<'a> {
    pub fn new(lookup: &'a dyn FieldLookup) -> Self {
        Self {
            updater: Updater::new(lookup),
        }
    }

    pub fn with_log(lookup: &'a dyn FieldLookup, log: &'a dyn ChangeLog) -> Self {
        Self {
            updater: Updater::with_log(lookup, log),
        }
    }

    pub fn updater(&self) -> &Updater<'a> {
        &self.updater
    }

    /// Find the `model` record matching `lookup`, creating it from `lookup`
    /// and `defaults` when absent, else applying `defaults` to it
    ///
    /// # Errors
    ///
    /// * `MultipleRecords` - `lookup` matched more than one record
    /// * Any error of [`Updater::apply`] on the found record
    /// * Any error of the store's read or insert
    pub fn apply_or_create<R, S>(
        &self,
        store: &mut S,
        model: &str,
        lookup: &UpdateRequest,
        defaults: &UpdateRequest,
        options: &UpdateOptions,
    ) -> Result<UpsertOutcome<R>>
    where
        R: Record,
        S: FindOrCreate<R> + Persist<R> + ?Sized,
    {
        let (mut record, created) = store
            .find_or_create(model, lookup, defaults)
            .inspect_err(|err| {
                log_op_error!(OP_OBJ_UPDATE_OR_CREATE, err.clone(), model = model);
            })?;

        if created {
            self.updater
                .log()
                .record_created(record.model_name(), record.pk().as_ref());
            return Ok(UpsertOutcome {
                record,
                created: true,
                changed: false,
            });
        }

        let changed = self.updater.apply(store, &mut record, defaults, options)?;
        Ok(UpsertOutcome {
            record,
            created: false,
            changed,
        })
    }
}
