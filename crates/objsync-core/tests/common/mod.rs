use std::cell::RefCell;

use objsync_core::{
    ChangeLog, ChangeSet, DynRecord, FieldType, MemoryStore, ModelSchema, Record, RecordId,
    Reference, Schema, UpdateRequest, Value,
};

/// FooModel carries one field of every kind; BarModel is only a
/// reference target.
#[allow(dead_code)]
pub fn test_schema() -> Schema {
    Schema::new()
        .with_model(
            ModelSchema::new("FooModel")
                .field("datetime", FieldType::datetime())
                .field("decimal", FieldType::decimal(5, 2))
                .field("slug", FieldType::Text)
                .field("text", FieldType::Text)
                .field("foreignkey", FieldType::foreign_key("BarModel"))
                .field(
                    "created",
                    FieldType::DateTime {
                        auto_now: false,
                        auto_now_add: true,
                    },
                )
                .field(
                    "updated",
                    FieldType::DateTime {
                        auto_now: true,
                        auto_now_add: false,
                    },
                ),
        )
        .with_model(ModelSchema::new("BarModel"))
}

#[allow(dead_code)]
pub fn new_store() -> MemoryStore {
    MemoryStore::new(test_schema())
}

/// Insert a FooModel and reset the store's counters
#[allow(dead_code)]
pub fn create_foo(store: &mut MemoryStore, values: UpdateRequest) -> DynRecord {
    let foo = store.create("FooModel", &values).unwrap();
    store.reset_counts();
    foo
}

/// Insert a BarModel and return a reference to it
#[allow(dead_code)]
pub fn create_bar(store: &mut MemoryStore) -> Reference {
    let bar = store.create("BarModel", &UpdateRequest::new()).unwrap();
    store.reset_counts();
    Reference::new("BarModel", bar.pk().unwrap())
}

/// Reload a record from the store without touching the counters
#[allow(dead_code)]
pub fn reload(store: &mut MemoryStore, record: &DynRecord) -> DynRecord {
    let loaded = store.get(record.model_name(), &record.pk().unwrap()).unwrap();
    store.reset_counts();
    loaded
}

#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum LoggedEvent {
    Updated {
        model: String,
        pk: Option<RecordId>,
        changes: ChangeSet,
    },
    Created {
        model: String,
        pk: Option<RecordId>,
    },
}

/// Change log keeping every event for later assertions
#[derive(Default)]
pub struct RecordingLog {
    events: RefCell<Vec<LoggedEvent>>,
}

#[allow(dead_code)]
impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events.borrow().clone()
    }

    pub fn updates(&self) -> Vec<ChangeSet> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                LoggedEvent::Updated { changes, .. } => Some(changes.clone()),
                LoggedEvent::Created { .. } => None,
            })
            .collect()
    }
}

impl ChangeLog for RecordingLog {
    fn record_updated(&self, model: &str, pk: Option<&RecordId>, changes: &ChangeSet) {
        self.events.borrow_mut().push(LoggedEvent::Updated {
            model: model.to_string(),
            pk: pk.cloned(),
            changes: changes.clone(),
        });
    }

    fn record_created(&self, model: &str, pk: Option<&RecordId>) {
        self.events.borrow_mut().push(LoggedEvent::Created {
            model: model.to_string(),
            pk: pk.cloned(),
        });
    }
}

#[allow(dead_code)]
pub fn text(s: &str) -> Value {
    Value::from(s)
}
