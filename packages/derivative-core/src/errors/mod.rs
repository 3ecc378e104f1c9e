pub mod types;

pub use types::{DimensionsError, FormatError, KeyError, StorageError, TransformError};
