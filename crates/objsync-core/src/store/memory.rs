use std::cell::Cell;
use std::collections::BTreeMap;

use super::{
    coerce_columns, coerce_lookup, ensure_writable, write_columns, AutoStamps, FindOrCreate,
    Persist, WriteSet,
};
use crate::errors::{ObjSyncError, Result};
use crate::model::{DynRecord, ModelSchema, Record, RecordId, Schema, Value};
use crate::update::UpdateRequest;

type Row = BTreeMap<String, Value>;

/// In-memory record store
///
/// Rows hold coerced column values keyed by integer pk. Every row read and
/// every write counts as one query, so tests can assert that a no-op
/// update never reached storage. Not thread-safe; designed for
/// single-threaded use.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    schema: Schema,
    tables: BTreeMap<String, BTreeMap<RecordId, Row>>,
    next_id: BTreeMap<String, i64>,
    queries: Cell<usize>,
    writes: usize,
}

impl MemoryStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of reads and writes issued so far
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    /// Number of writes issued so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn reset_counts(&mut self) {
        self.queries.set(0);
        self.writes = 0;
    }

    /// Insert a new record built from `values`
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel`, `UnknownField` or `InvalidValue` for bad input.
    pub fn create(&mut self, model: &str, values: &UpdateRequest) -> Result<DynRecord> {
        let schema = self.model_schema(model)?;
        let mut record = DynRecord::new(model);
        for (field, value) in values.iter() {
            let descriptor = schema.describe(field)?;
            record.set(&descriptor, value.clone());
        }
        self.persist(&mut record, WriteSet::All)?;
        Ok(record)
    }

    /// Load a record by pk
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if no row has this pk.
    pub fn get(&self, model: &str, pk: &RecordId) -> Result<DynRecord> {
        self.model_schema(model)?;
        self.count_query();
        self.tables
            .get(model)
            .and_then(|rows| rows.get(pk))
            .map(|row| DynRecord::from_parts(model, Some(pk.clone()), row.clone()))
            .ok_or_else(|| ObjSyncError::RecordNotFound {
                model: model.to_string(),
                pk: pk.to_string(),
            })
    }

    /// Records whose stored columns equal every lookup value
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel`, `UnknownField` or `InvalidValue` for bad lookups.
    pub fn filter(&self, model: &str, lookup: &UpdateRequest) -> Result<Vec<DynRecord>> {
        let schema = self.model_schema(model)?;
        let wanted = coerce_lookup(schema, lookup)?;
        self.count_query();
        let Some(rows) = self.tables.get(model) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter(|(_, row)| {
                wanted
                    .iter()
                    .all(|(column, value)| row.get(column).unwrap_or(&Value::Null) == value)
            })
            .map(|(pk, row)| DynRecord::from_parts(model, Some(pk.clone()), row.clone()))
            .collect())
    }

    fn model_schema(&self, model: &str) -> Result<&ModelSchema> {
        self.schema
            .model(model)
            .ok_or_else(|| ObjSyncError::UnknownModel {
                model: model.to_string(),
            })
    }

    fn count_query(&self) {
        self.queries.set(self.queries.get() + 1);
    }

    fn allocate_id(&mut self, model: &str) -> RecordId {
        let next = self.next_id.entry(model.to_string()).or_insert(1);
        let id = *next;
        *next += 1;
        RecordId::Int(id)
    }
}

impl<R: Record + ?Sized> Persist<R> for MemoryStore {
    fn persist(&mut self, record: &mut R, fields: WriteSet<'_>) -> Result<()> {
        ensure_writable(record, fields)?;
        if let WriteSet::Fields([]) = fields {
            return Ok(());
        }
        let model = self.model_schema(record.model_name())?.clone();
        let columns = write_columns(&model, fields)?;
        let existing = record.pk().filter(|pk| {
            self.tables
                .get(model.name())
                .is_some_and(|rows| rows.contains_key(pk))
        });
        if existing.is_none() && fields.is_constrained() {
            return Err(ObjSyncError::Persistence {
                op: "update".to_string(),
                message: format!(
                    "Save with update_fields did not affect any rows ({} {})",
                    model.name(),
                    record.pk().map(|pk| pk.to_string()).unwrap_or_default()
                ),
            });
        }

        let stamps = AutoStamps::for_write(&model, existing.is_none())?;
        let values = coerce_columns(&model, record, &columns, &stamps)?;

        let pk = match existing {
            Some(pk) => pk,
            None => match record.pk() {
                Some(pk) => pk,
                None => self.allocate_id(model.name()),
            },
        };
        let row = self
            .tables
            .entry(model.name().to_string())
            .or_default()
            .entry(pk.clone())
            .or_default();
        row.extend(values);

        stamps.apply_to(record);
        if record.pk().is_none() {
            record.set_pk(pk);
        }
        self.count_query();
        self.writes += 1;
        Ok(())
    }
}

impl FindOrCreate<DynRecord> for MemoryStore {
    fn find_or_create(
        &mut self,
        model: &str,
        lookup: &UpdateRequest,
        defaults: &UpdateRequest,
    ) -> Result<(DynRecord, bool)> {
        let mut found = self.filter(model, lookup)?;
        match found.len() {
            0 => {
                let record = self.create(model, &lookup.merged(defaults))?;
                Ok((record, true))
            }
            1 => Ok((found.remove(0), false)),
            count => Err(ObjSyncError::MultipleRecords {
                model: model.to_string(),
                count,
            }),
        }
    }
}
