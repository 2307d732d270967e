pub mod dictionary;
pub mod language;
pub mod types;

pub use dictionary::{Dictionary, MAX_ROOT_CHARS, Snapshot};
pub use language::Segmenter;
pub use types::{Segment, WordRoot};
