pub mod dimensions;
pub mod format;
pub mod key;

pub use dimensions::check_dimensions;
pub use format::{resolve_content_type, resolve_extension};
pub use key::{parse_key, GrammarMode, ParsedKey};
