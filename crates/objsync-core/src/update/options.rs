/// Which fields an update writes through to storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UpdateFields {
    /// The fields the diff found dirty, in diff order
    #[default]
    Computed,
    /// Exactly these fields; an empty list applies in memory and writes nothing
    Explicit(Vec<String>),
    /// Every field, so storage-maintained fields refresh too
    All,
}

/// Per-call options for [`Updater::apply`](super::Updater::apply)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    /// When false, changes are applied in memory and logged but never persisted
    pub persist: bool,
    pub update_fields: UpdateFields,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            persist: true,
            update_fields: UpdateFields::Computed,
        }
    }
}

impl UpdateOptions {
    /// Apply and log without persisting
    pub fn in_memory() -> Self {
        Self {
            persist: false,
            ..Self::default()
        }
    }

    pub fn with_update_fields(mut self, update_fields: UpdateFields) -> Self {
        self.update_fields = update_fields;
        self
    }

    /// Shorthand for `UpdateFields::Explicit`
    pub fn with_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_update_fields(UpdateFields::Explicit(
            fields.into_iter().map(Into::into).collect(),
        ))
    }
}
