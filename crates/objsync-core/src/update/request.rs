use crate::model::Value;

/// Proposed field values, in insertion order
///
/// Setting a field a second time replaces its value but keeps its original
/// position, so diff order follows first mention.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    entries: Vec<(String, Value)>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`UpdateRequest::insert`]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Field names in insertion order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries of `self` followed by those of `other`, `other` winning on conflict
    pub fn merged(&self, other: &UpdateRequest) -> UpdateRequest {
        let mut merged = self.clone();
        for (field, value) in other.iter() {
            merged.insert(field, value.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for UpdateRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut request = UpdateRequest::new();
        for (field, value) in iter {
            request.insert(field, value);
        }
        request
    }
}
