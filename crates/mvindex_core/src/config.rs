//! Index engine configuration.

/// How a unique index treats keys that contain NULL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullUniqueness {
    /// Equal keys are allowed when at least one index column is NULL.
    #[default]
    AllowMultiple,
    /// NULL is an ordinary value; equal keys always conflict.
    SingleNull,
    /// Equal keys are allowed only when every index column is NULL.
    AllowMultipleIfAllNull,
}

/// Configuration shared by the indexes of a table.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// NULL handling for unique indexes.
    pub null_uniqueness: NullUniqueness,

    /// Factor applied to the range-index cost estimate.
    pub cost_multiplier: f64,

    /// Whether index creation rejects large-object columns.
    ///
    /// Disabled while reopening existing indexes, which were validated when
    /// first created.
    pub check_column_types: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            null_uniqueness: NullUniqueness::AllowMultiple,
            cost_multiplier: 10.0,
            check_column_types: true,
        }
    }
}

impl IndexConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the NULL handling for unique indexes.
    #[must_use]
    pub const fn null_uniqueness(mut self, policy: NullUniqueness) -> Self {
        self.null_uniqueness = policy;
        self
    }

    /// Sets the cost multiplier.
    #[must_use]
    pub fn cost_multiplier(mut self, multiplier: f64) -> Self {
        self.cost_multiplier = multiplier;
        self
    }

    /// Sets whether large-object columns are rejected at creation.
    #[must_use]
    pub const fn check_column_types(mut self, value: bool) -> Self {
        self.check_column_types = value;
        self
    }
}
