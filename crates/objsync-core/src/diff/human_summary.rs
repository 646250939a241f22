//! Log renderings of a change set.

use objsync_core_types::schema::NULL_REPR;
use serde_json::{json, Map, Value as JsonValue};

use crate::diff::model::ChangeSet;

impl ChangeSet {
    /// Render changes as `[field old->new]` entries, concatenated in change order
    ///
    /// Null sides render as `None`.
    pub fn human_summary(&self) -> String {
        self.iter()
            .map(|c| {
                format!(
                    "[{} {}->{}]",
                    c.field,
                    c.old.as_deref().unwrap_or(NULL_REPR),
                    c.new.as_deref().unwrap_or(NULL_REPR)
                )
            })
            .collect()
    }

    /// Render changes as a JSON object `{field: {"old": .., "new": ..}}`
    ///
    /// Null sides render as JSON `null`.
    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .iter()
            .map(|c| (c.field.clone(), json!({ "old": c.old, "new": c.new })))
            .collect();
        JsonValue::Object(map)
    }
}
