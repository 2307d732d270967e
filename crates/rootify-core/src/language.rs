use crate::types::Segment;

/// Text segmentation and gloss assembly for a language implementation
pub trait Segmenter: Send + Sync {
    /// Language identifier (ISO 639-1 code: "zh", "ja", ...)
    fn language_code(&self) -> &str;

    /// Break text into segments, left to right
    fn segment(&self, text: &str) -> Vec<Segment>;

    /// Join segment glosses into one string
    fn translate(&self, text: &str) -> String;

    /// True when every segment matched a dictionary entry
    fn is_complete(&self, text: &str) -> bool {
        self.segment(text).iter().all(|s| !s.is_unknown)
    }
}
