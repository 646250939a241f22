//! SQLite record store
//!
//! One table per registered model, keyed by `id INTEGER PRIMARY KEY
//! AUTOINCREMENT`. Every executed statement counts as one query.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::Path;

use objsync_core::store::{
    coerce_columns, coerce_lookup, ensure_writable, write_columns, AutoStamps, FindOrCreate,
    Persist, WriteSet,
};
use objsync_core::{
    DynRecord, FieldType, ModelSchema, ObjSyncError, Record, RecordId, Schema, UpdateRequest,
    Value,
};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use crate::codec::{column_name, column_type, from_sql, quote, record_id_sql, to_sql};
use crate::db;
use crate::errors::{no_rows_affected, sqlite_error, Result};

/// Record store backed by a SQLite connection
pub struct SqliteStore {
    conn: Connection,
    schema: Schema,
    queries: Cell<usize>,
    writes: usize,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure every model has a table
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the database cannot be opened or migrated.
    pub fn open<P: AsRef<Path>>(path: P, schema: Schema) -> Result<Self> {
        Self::from_connection(db::open(path)?, schema)
    }

    /// In-memory database, dropped with the store
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if SQLite fails to initialize.
    pub fn open_in_memory(schema: Schema) -> Result<Self> {
        Self::from_connection(db::open_in_memory()?, schema)
    }

    /// Wrap an existing connection, creating missing model tables
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if a table cannot be created.
    pub fn from_connection(conn: Connection, schema: Schema) -> Result<Self> {
        db::configure(&conn)?;
        for model in schema.models() {
            conn.execute(&create_table_sql(model), [])
                .map_err(sqlite_error("create_table"))?;
        }
        tracing::debug!(models = schema.models().count(), "sqlite store ready");

        Ok(Self {
            conn,
            schema,
            queries: Cell::new(0),
            writes: 0,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of statements executed so far
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    /// Number of record writes so far
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
    /// Returns `UnknownModel`, `UnknownField`, `InvalidValue` or `Persistence`.
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
        let schema = self.model_schema(model)?;
        let sql = format!("{} WHERE id = ?1", select_sql(schema));
        self.query_rows(schema, &sql, vec![record_id_sql(pk)])?
            .pop()
            .ok_or_else(|| ObjSyncError::RecordNotFound {
                model: model.to_string(),
                pk: pk.to_string(),
            })
    }

    /// Records whose stored columns equal every lookup value, in pk order
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel`, `UnknownField`, `InvalidValue` or `Persistence`.
    pub fn filter(&self, model: &str, lookup: &UpdateRequest) -> Result<Vec<DynRecord>> {
        let schema = self.model_schema(model)?;
        let wanted = coerce_lookup(schema, lookup)?;

        let mut clauses = Vec::with_capacity(wanted.len());
        let mut params = Vec::with_capacity(wanted.len());
        for (i, (field, value)) in wanted.iter().enumerate() {
            clauses.push(format!("{} IS ?{}", quote(&column_for(schema, field)?), i + 1));
            params.push(to_sql(value));
        }

        let mut sql = select_sql(schema);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");
        self.query_rows(schema, &sql, params)
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

    fn execute(&self, op: &'static str, sql: &str, params: Vec<SqlValue>) -> Result<usize> {
        tracing::trace!(op, sql, "sqlite execute");
        self.count_query();
        self.conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(sqlite_error(op))
    }

    fn query_rows(
        &self,
        model: &ModelSchema,
        sql: &str,
        params: Vec<SqlValue>,
    ) -> Result<Vec<DynRecord>> {
        tracing::trace!(sql, "sqlite select");
        self.count_query();
        let width = model.fields().len();
        let mut stmt = self.conn.prepare(sql).map_err(sqlite_error("select"))?;
        let rows: Vec<(i64, Vec<SqlValue>)> = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let pk: i64 = row.get(0)?;
                let values = (1..=width)
                    .map(|i| row.get::<_, SqlValue>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok((pk, values))
            })
            .map_err(sqlite_error("select"))?
            .collect::<rusqlite::Result<_>>()
            .map_err(sqlite_error("select"))?;

        rows.into_iter()
            .map(|(pk, values)| decode_row(model, pk, values))
            .collect()
    }

    fn insert_row(
        &self,
        model: &ModelSchema,
        pk: Option<&RecordId>,
        values: &[(String, Value)],
    ) -> Result<RecordId> {
        let mut names = Vec::with_capacity(values.len() + 1);
        let mut params = Vec::with_capacity(values.len() + 1);
        if let Some(pk) = pk {
            names.push("id".to_string());
            params.push(record_id_sql(pk));
        }
        for (field, value) in values {
            names.push(quote(&column_for(model, field)?));
            params.push(to_sql(value));
        }

        let sql = if names.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote(model.name()))
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote(model.name()),
                names.join(", "),
                placeholders(names.len())
            )
        };
        self.execute("insert", &sql, params)?;

        Ok(match pk {
            Some(pk) => pk.clone(),
            None => RecordId::Int(self.conn.last_insert_rowid()),
        })
    }

    /// Rows affected by updating `values` of the row with `pk`
    fn update_row(
        &self,
        model: &ModelSchema,
        pk: &RecordId,
        values: &[(String, Value)],
    ) -> Result<usize> {
        if values.is_empty() {
            let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", quote(model.name()));
            self.count_query();
            let count: i64 = self
                .conn
                .query_row(&sql, [record_id_sql(pk)], |row| row.get(0))
                .map_err(sqlite_error("select"))?;
            return Ok(usize::try_from(count).unwrap_or_default());
        }

        let mut assignments = Vec::with_capacity(values.len());
        let mut params = Vec::with_capacity(values.len() + 1);
        for (i, (field, value)) in values.iter().enumerate() {
            assignments.push(format!("{} = ?{}", quote(&column_for(model, field)?), i + 1));
            params.push(to_sql(value));
        }
        params.push(record_id_sql(pk));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            quote(model.name()),
            assignments.join(", "),
            params.len()
        );
        self.execute("update", &sql, params)
    }
}

impl<R: Record + ?Sized> Persist<R> for SqliteStore {
    fn persist(&mut self, record: &mut R, fields: WriteSet<'_>) -> Result<()> {
        ensure_writable(record, fields)?;
        if let WriteSet::Fields([]) = fields {
            return Ok(());
        }
        let model = self.model_schema(record.model_name())?.clone();
        let columns = write_columns(&model, fields)?;

        match record.pk() {
            Some(pk) => {
                let stamps = AutoStamps::for_write(&model, false)?;
                let values = coerce_columns(&model, record, &columns, &stamps)?;
                if self.update_row(&model, &pk, &values)? > 0 {
                    stamps.apply_to(record);
                } else if fields.is_constrained() {
                    return Err(no_rows_affected(model.name(), &pk));
                } else {
                    // full write of a pk with no row yet
                    let stamps = AutoStamps::for_write(&model, true)?;
                    let values = coerce_columns(&model, record, &columns, &stamps)?;
                    self.insert_row(&model, Some(&pk), &values)?;
                    stamps.apply_to(record);
                }
            }
            None => {
                let stamps = AutoStamps::for_write(&model, true)?;
                let values = coerce_columns(&model, record, &columns, &stamps)?;
                let pk = self.insert_row(&model, None, &values)?;
                stamps.apply_to(record);
                record.set_pk(pk);
            }
        }

        self.writes += 1;
        Ok(())
    }
}

impl FindOrCreate<DynRecord> for SqliteStore {
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

fn create_table_sql(model: &ModelSchema) -> String {
    let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    for def in model.fields() {
        let mut column = format!("{} {}", quote(&column_name(def)), column_type(&def.field_type));
        if let FieldType::ForeignKey { to } = &def.field_type {
            column.push_str(&format!(" REFERENCES {}(id)", quote(to)));
        }
        columns.push(column);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(model.name()),
        columns.join(", ")
    )
}

fn select_sql(model: &ModelSchema) -> String {
    let mut columns = vec!["id".to_string()];
    columns.extend(model.fields().iter().map(|def| quote(&column_name(def))));
    format!("SELECT {} FROM {}", columns.join(", "), quote(model.name()))
}

fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_for(model: &ModelSchema, field: &str) -> Result<String> {
    model
        .get(field)
        .map(column_name)
        .ok_or_else(|| ObjSyncError::UnknownField {
            model: model.name().to_string(),
            field: field.to_string(),
        })
}

fn decode_row(model: &ModelSchema, pk: i64, values: Vec<SqlValue>) -> Result<DynRecord> {
    let mut columns = BTreeMap::new();
    for (def, raw) in model.fields().iter().zip(values) {
        columns.insert(def.name.clone(), from_sql(model.name(), def, raw)?);
    }
    Ok(DynRecord::from_parts(
        model.name(),
        Some(RecordId::Int(pk)),
        columns,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo() -> ModelSchema {
        ModelSchema::new("FooModel")
            .field("text", FieldType::Text)
            .field("foreignkey", FieldType::foreign_key("BarModel"))
    }

    #[test]
    fn test_create_table_sql() {
        assert_eq!(
            create_table_sql(&foo()),
            "CREATE TABLE IF NOT EXISTS \"FooModel\" (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             \"text\" TEXT, \"foreignkey_id\" INTEGER REFERENCES \"BarModel\"(id))"
        );
    }

    #[test]
    fn test_select_sql_uses_identifier_columns() {
        assert_eq!(
            select_sql(&foo()),
            "SELECT id, \"text\", \"foreignkey_id\" FROM \"FooModel\""
        );
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(3), "?1, ?2, ?3");
    }
}
