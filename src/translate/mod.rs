// Word-by-word translation
//
// - Languages: the fixed table of accepted target codes
// - Google: the Google Translate backend

pub mod google;
pub mod languages;

use async_trait::async_trait;
use tracing::{info, debug};

pub use google::GoogleTranslator;
pub use languages::{language_name, validate_language, SUPPORTED_LANGUAGES};

use crate::config::TranslateConfig;
use crate::error::{DubError, Result};
use crate::progress::word_progress;
use crate::transcript::Transcript;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one piece of text into the target language
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_default(config: TranslateConfig) -> Result<Box<dyn Translator>> {
        Ok(Box::new(GoogleTranslator::new(config)?))
    }
}

/// Translate stage: validate the code, then one request per word, in order.
/// The first failed word aborts the stage.
pub async fn translate_transcript(
    translator: &dyn Translator,
    transcript: Transcript,
    target_language: &str,
) -> Result<Transcript> {
    let target = validate_language(target_language)?;
    let name = language_name(&target).unwrap_or("unknown");
    info!("Translating {} words into {}", transcript.len(), name);

    let pb = word_progress(transcript.len(), "Translating");
    let mut texts = Vec::with_capacity(transcript.len());

    for word in &transcript.words {
        let translated = translator.translate(&word.text, &target).await?;
        debug!("{} -> {}", word.text, translated);
        texts.push(translated);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let translated = transcript
        .retext(&target, texts)
        .ok_or_else(|| DubError::Translation("Translated word count changed".to_string()))?;

    info!("Translated the transcript into {}", name);
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::WordSegment;
    use mockall::Sequence;
    use tokio_test::{assert_err, assert_ok};

    fn three_words() -> Transcript {
        Transcript::new("en-US", vec![
            WordSegment::new("one", 0.0, 1.0),
            WordSegment::new("two", 1.0, 2.0),
            WordSegment::new("three", 2.0, 3.0),
        ])
    }

    #[tokio::test]
    async fn test_translation_keeps_timestamps_in_order() {
        let mut translator = MockTranslator::new();
        let mut seq = Sequence::new();
        for (src, dst) in [("one", "uno"), ("two", "dos"), ("three", "tres")] {
            translator
                .expect_translate()
                .withf(move |text, lang| text.to_string() == src && lang.to_string() == "es")
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Ok(dst.to_string()));
        }

        let translated = assert_ok!(translate_transcript(&translator, three_words(), "es").await);

        assert_eq!(translated.language, "es");
        assert_eq!(translated.words, vec![
            WordSegment::new("uno", 0.0, 1.0),
            WordSegment::new("dos", 1.0, 2.0),
            WordSegment::new("tres", 2.0, 3.0),
        ]);
    }

    #[tokio::test]
    async fn test_unsupported_language_issues_no_requests() {
        let mut translator = MockTranslator::new();
        translator.expect_translate().times(0);

        let err = assert_err!(translate_transcript(&translator, three_words(), "xx").await);
        assert!(matches!(err, DubError::UnsupportedLanguage(_)));
    }

    #[tokio::test]
    async fn test_single_failure_aborts_the_stage() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .withf(|text, _| text.to_string() == "one")
            .times(1)
            .returning(|_, _| Ok("uno".to_string()));
        translator
            .expect_translate()
            .withf(|text, _| text.to_string() == "two")
            .times(1)
            .returning(|_, _| Err(DubError::Translation("HTTP request failed: timeout".to_string())));
        translator
            .expect_translate()
            .withf(|text, _| text.to_string() == "three")
            .times(0);

        let err = assert_err!(translate_transcript(&translator, three_words(), "es").await);
        assert!(matches!(err, DubError::Translation(_)));
    }

    #[tokio::test]
    async fn test_empty_transcript_translates_to_empty() {
        let translator = MockTranslator::new();
        let translated = assert_ok!(
            translate_transcript(&translator, Transcript::new("en-US", vec![]), "de").await
        );
        assert!(translated.is_empty());
    }
}
