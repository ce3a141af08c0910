//! Error types for anatomia_3d

use thiserror::Error;

/// Errors raised while building a hotspot catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// An entry has an empty id
    #[error("hotspot at index {0} has an empty id")]
    EmptyId(usize),

    /// Two entries share an id
    #[error("duplicate hotspot id: {0}")]
    DuplicateId(String),

    /// An entry has an empty display label
    #[error("hotspot '{0}' has an empty label")]
    EmptyLabel(String),

    /// An entry's vertical band is inverted or not finite
    #[error("hotspot '{id}' has an invalid vertical band [{y_min}, {y_max}]")]
    InvalidBand { id: String, y_min: f32, y_max: f32 },

    /// The catalog source could not be parsed
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for anatomia_3d operations
pub type Result<T> = std::result::Result<T, CatalogError>;
