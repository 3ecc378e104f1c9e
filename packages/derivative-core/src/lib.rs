pub mod constants;
pub mod errors;
pub mod storage;
pub mod transform;
pub mod validation;

// 公開API
pub use constants::{DEFAULT_QUALITY, MAX_PIXELS, RESIZED_FROM_KEY, RESIZE_TAG};
pub use errors::{DimensionsError, FormatError, KeyError, StorageError, TransformError};
pub use storage::{AssetRecord, MemoryObjectStore, ObjectStore, S3ObjectStore};
pub use transform::{decode_image, encode_image, resize_image, ImageFormat};
pub use validation::{
    check_dimensions, parse_key, resolve_content_type, resolve_extension, GrammarMode, ParsedKey,
};
