use serde::{Deserialize, Serialize};

/// One recognized word and where it sits in the source video (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl WordSegment {
    pub fn new<S: Into<String>>(text: S, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Same timing, different text
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        Self {
            text: text.into(),
            start: self.start,
            end: self.end,
        }
    }
}

/// Ordered word segments for a whole video. Position is the only key that
/// links a word to its translation and its synthesized clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub language: String,
    pub words: Vec<WordSegment>,
}

impl Transcript {
    pub fn new<S: Into<String>>(language: S, words: Vec<WordSegment>) -> Self {
        Self {
            language: language.into(),
            words,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replace every word's text, keeping order and timing.
    /// `texts` must have exactly one entry per word.
    pub fn retext<S: Into<String>>(&self, language: &str, texts: Vec<S>) -> Option<Transcript> {
        if texts.len() != self.words.len() {
            return None;
        }

        let words = self.words
            .iter()
            .zip(texts)
            .map(|(word, text)| word.with_text(text))
            .collect();

        Some(Transcript::new(language, words))
    }
}
