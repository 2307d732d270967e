pub mod engine;

pub use engine::{SegmentIter, TranslationEngine};
