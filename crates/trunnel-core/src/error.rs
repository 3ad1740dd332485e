pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("series is empty")]
    EmptySeries,

    #[error("\"{name}\" has invalid value: {value}. Values must be finite and >= 0.")]
    InvalidValue { name: String, value: f64 },

    #[error(
        "leaf count {leaf_count} leaves no branches in a series of {series_len} items (need leaf count < series length)"
    )]
    NoBranches {
        leaf_count: usize,
        series_len: usize,
    },

    #[error("duplicate {partition} category \"{name}\"")]
    DuplicateCategory {
        partition: &'static str,
        name: String,
    },

    #[error("invalid config value for {key}: {message}")]
    InvalidConfig { key: &'static str, message: String },

    #[error("invalid data view: {message}")]
    InvalidDataView { message: String },

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
