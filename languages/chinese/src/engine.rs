use std::iter::FusedIterator;

use rootify_core::{Dictionary, MAX_ROOT_CHARS, Segment, Segmenter, Snapshot};

/// Separator placed between segment glosses by [`TranslationEngine::translate`]
pub const SEPARATOR: char = '_';

/// Greedy longest-match segmenter over a dictionary snapshot.
///
/// The engine owns its snapshot and has no other state, so the same
/// (snapshot, text) pair always produces the same segments.
#[derive(Debug, Clone)]
pub struct TranslationEngine {
    dictionary: Snapshot,
    /// Widest candidate tried at each position, in code points
    window: usize,
}

impl TranslationEngine {
    pub fn new(dictionary: Snapshot) -> Self {
        let window = dictionary.longest_key_chars().min(MAX_ROOT_CHARS);
        tracing::debug!(
            "Translation engine ready: {} roots, window {window}",
            dictionary.entry_count()
        );
        Self { dictionary, window }
    }

    pub fn dictionary(&self) -> &Snapshot {
        &self.dictionary
    }

    /// Lazily segment `text`, left to right
    pub fn segments<'a>(&'a self, text: &'a str) -> SegmentIter<'a> {
        SegmentIter {
            dictionary: &self.dictionary,
            window: self.window,
            rest: text,
        }
    }

    pub fn segment(&self, text: &str) -> Vec<Segment> {
        self.segments(text).collect()
    }

    /// Segment raw bytes, stopping at the first sequence that is not UTF-8
    pub fn segment_bytes(&self, bytes: &[u8]) -> Vec<Segment> {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("Input is not UTF-8 past byte {}", e.valid_up_to());
                std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default()
            }
        };
        self.segment(text)
    }

    /// Glosses joined by `_`; characters without a gloss pass through as-is
    pub fn translate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for (i, segment) in self.segments(text).enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.push_str(segment.display());
        }
        out
    }

    /// Stops at the first unknown character
    pub fn is_complete(&self, text: &str) -> bool {
        self.segments(text).all(|s| !s.is_unknown)
    }
}

impl Segmenter for TranslationEngine {
    fn language_code(&self) -> &str {
        "zh"
    }

    fn segment(&self, text: &str) -> Vec<Segment> {
        TranslationEngine::segment(self, text)
    }

    fn translate(&self, text: &str) -> String {
        TranslationEngine::translate(self, text)
    }

    fn is_complete(&self, text: &str) -> bool {
        TranslationEngine::is_complete(self, text)
    }
}

/// Iterator returned by [`TranslationEngine::segments`]
#[derive(Debug, Clone)]
pub struct SegmentIter<'a> {
    dictionary: &'a Snapshot,
    window: usize,
    rest: &'a str,
}

impl Iterator for SegmentIter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let first = self.rest.chars().next()?;

        // Byte offsets where candidates of 1..=window code points end
        let mut ends = [0usize; MAX_ROOT_CHARS];
        let mut n = 0;
        for (i, c) in self.rest.char_indices().take(self.window) {
            ends[n] = i + c.len_utf8();
            n += 1;
        }

        for &end in ends[..n].iter().rev() {
            let candidate = &self.rest[..end];
            if let Some(english) = self.dictionary.lookup_exact(candidate) {
                self.rest = &self.rest[end..];
                return Some(Segment::known(candidate, english));
            }
        }

        self.rest = &self.rest[first.len_utf8()..];
        Some(Segment::unknown(first))
    }
}

impl FusedIterator for SegmentIter<'_> {}
