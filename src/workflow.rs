use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::media::{plan_placements, MediaProcessorFactory, MediaProcessorTrait, VideoSource};
use crate::speech::{cleanup_clips, synthesize_transcript, CleanupOutcome, SpeechSynthesizer, SpeechSynthesizerFactory};
use crate::transcribe::{transcribe_video, Transcriber, TranscriberFactory};
use crate::transcript::Transcript;
use crate::translate::{language_name, translate_transcript, validate_language, Translator, TranslatorFactory};

/// Parameters for one dubbing run
#[derive(Debug, Clone)]
pub struct DubRequest {
    pub input: PathBuf,
    pub target_language: String,
    pub voice_language: String,
    pub output: PathBuf,
    pub cleanup: bool,
}

impl DubRequest {
    pub fn new<P: AsRef<Path>, S: Into<String>>(input: P, target_language: S) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            target_language: target_language.into(),
            voice_language: "en".to_string(),
            output: PathBuf::from("output.mp4"),
            cleanup: true,
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone, PartialEq)]
pub struct DubReport {
    pub output: PathBuf,
    pub language_name: String,
    pub word_count: usize,
    pub clip_count: usize,
    pub cleanup: Option<CleanupOutcome>,
}

pub struct Workflow {
    config: Config,
    transcriber: Box<dyn Transcriber>,
    translator: Box<dyn Translator>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    media: Box<dyn MediaProcessorTrait>,
}

impl Workflow {
    pub async fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone())?;
        let translator = TranslatorFactory::create_default(config.translate.clone())?;
        let synthesizer = SpeechSynthesizerFactory::create_default(config.speech.clone())?;
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        // Check dependencies
        media.check_availability().await?;

        Ok(Self::with_services(config, transcriber, translator, synthesizer, media))
    }

    pub fn with_services(
        config: Config,
        transcriber: Box<dyn Transcriber>,
        translator: Box<dyn Translator>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        media: Box<dyn MediaProcessorTrait>,
    ) -> Self {
        Self {
            config,
            transcriber,
            translator,
            synthesizer,
            media,
        }
    }

    /// Transcribe, translate, synthesize, compose and optionally clean up
    pub async fn run(&self, request: &DubRequest) -> Result<DubReport> {
        let target = validate_language(&request.target_language)?;
        let source = VideoSource::open(&request.input)?;

        // Step 1: Load
        let frame_rate = source.frame_rate(self.media.as_ref()).await?;

        // Step 2: Transcribe
        let transcript = self.transcribe(&source).await?;
        let word_count = transcript.len();

        // Step 3: Translate
        let translated = translate_transcript(self.translator.as_ref(), transcript, &target).await?;

        // Step 4: Synthesize
        let clip_dir = &self.config.speech.clip_dir;
        let clips = synthesize_transcript(
            self.synthesizer.as_ref(),
            &translated,
            &request.voice_language,
            clip_dir,
        ).await?;

        // Step 5: Compose
        if clips.is_empty() {
            warn!("Transcript has no words; output will have no audio track");
        }
        let placements = plan_placements(&translated, &clips, frame_rate)?;
        info!("Merging {} clips onto {}", placements.len(), source.path().display());
        self.media.replace_audio(source.path(), &placements, clips.dir(), &request.output).await?;
        info!("Saved the final file: {}", request.output.display());

        // Step 6: Cleanup
        let cleanup = if request.cleanup {
            Some(cleanup_clips(clip_dir).await?)
        } else {
            info!("Keeping clips in {}", clip_dir.display());
            None
        };

        Ok(DubReport {
            output: request.output.clone(),
            language_name: language_name(&target).unwrap_or("unknown").to_string(),
            word_count,
            clip_count: clips.len(),
            cleanup,
        })
    }

    /// Word transcript of a video in the configured recognition language
    pub async fn transcribe_only<P: AsRef<Path>>(&self, input: P) -> Result<Transcript> {
        let source = VideoSource::open(input)?;
        self.transcribe(&source).await
    }

    async fn transcribe(&self, source: &VideoSource) -> Result<Transcript> {
        transcribe_video(self.transcriber.as_ref(), source, &self.config.transcriber.language).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DubError;
    use crate::media::MockMediaProcessorTrait;
    use crate::speech::MockSpeechSynthesizer;
    use crate::transcribe::MockTranscriber;
    use crate::transcript::WordSegment;
    use crate::translate::MockTranslator;
    use assert_fs::prelude::*;

    struct Fixture {
        _root: assert_fs::TempDir,
        video: PathBuf,
        config: Config,
    }

    fn fixture() -> Fixture {
        let root = assert_fs::TempDir::new().unwrap();
        let video = root.child("demo.mp4");
        video.write_binary(b"fake-mp4").unwrap();

        let mut config = Config::default();
        config.speech.clip_dir = root.path().join("temp");

        Fixture {
            video: video.path().to_path_buf(),
            config,
            _root: root,
        }
    }

    fn untouched_services() -> (MockTranscriber, MockTranslator, MockSpeechSynthesizer, MockMediaProcessorTrait) {
        (
            MockTranscriber::new(),
            MockTranslator::new(),
            MockSpeechSynthesizer::new(),
            MockMediaProcessorTrait::new(),
        )
    }

    fn workflow(
        config: Config,
        services: (MockTranscriber, MockTranslator, MockSpeechSynthesizer, MockMediaProcessorTrait),
    ) -> Workflow {
        let (transcriber, translator, synthesizer, media) = services;
        Workflow::with_services(
            config,
            Box::new(transcriber),
            Box::new(translator),
            Box::new(synthesizer),
            Box::new(media),
        )
    }

    #[tokio::test]
    async fn test_full_run() {
        let fx = fixture();
        let (mut transcriber, mut translator, mut synthesizer, mut media) = untouched_services();

        media.expect_probe_frame_rate().times(1).returning(|_| Ok(25.0));
        transcriber
            .expect_transcribe()
            .withf(|media, _, language| media.to_vec() == b"fake-mp4".to_vec() && language.to_string() == "en-US")
            .times(1)
            .returning(|_, _, _| {
                Ok(Transcript::new("en-US", vec![
                    WordSegment::new("good", 0.0, 1.0),
                    WordSegment::new("morning", 1.0, 2.0),
                    WordSegment::new("friends", 2.0, 3.0),
                ]))
            });
        translator
            .expect_translate()
            .times(3)
            .returning(|text, _| Ok(format!("{}-fr", text)));
        synthesizer
            .expect_synthesize()
            .times(3)
            .returning(|_, _| Ok(b"ID3".to_vec()));

        let output = fx.video.with_file_name("dubbed.mp4");
        let expected_output = output.clone();
        let clip_dir = fx.config.speech.clip_dir.clone();
        let expected_work_dir = clip_dir.clone();
        media
            .expect_replace_audio()
            .withf(move |_, placements, work_dir, out| {
                placements.len() == 3
                    && placements.iter().enumerate().all(|(i, p)| p.index == i && p.start == i as f64)
                    && placements.iter().all(|p| p.rate_scale == -25.0)
                    && work_dir.to_path_buf() == expected_work_dir
                    && out.to_path_buf() == expected_output
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let wf = workflow(fx.config.clone(), (transcriber, translator, synthesizer, media));
        let mut request = DubRequest::new(&fx.video, "fr");
        request.output = output.clone();

        let report = wf.run(&request).await.unwrap();

        assert_eq!(report.output, output);
        assert_eq!(report.language_name, "French");
        assert_eq!(report.word_count, 3);
        assert_eq!(report.clip_count, 3);
        assert_eq!(report.cleanup, Some(CleanupOutcome::Removed(3)));
        assert!(!clip_dir.exists());
    }

    #[tokio::test]
    async fn test_keep_clips() {
        let fx = fixture();
        let (mut transcriber, mut translator, mut synthesizer, mut media) = untouched_services();

        media.expect_probe_frame_rate().returning(|_| Ok(30.0));
        transcriber
            .expect_transcribe()
            .returning(|_, _, _| Ok(Transcript::new("en-US", vec![WordSegment::new("hi", 0.2, 0.4)])));
        translator.expect_translate().returning(|_, _| Ok("hallo".to_string()));
        synthesizer.expect_synthesize().returning(|_, _| Ok(b"ID3".to_vec()));
        media.expect_replace_audio().returning(|_, _, _, _| Ok(()));

        let clip_dir = fx.config.speech.clip_dir.clone();
        let wf = workflow(fx.config.clone(), (transcriber, translator, synthesizer, media));
        let mut request = DubRequest::new(&fx.video, "de");
        request.output = fx.video.with_file_name("out.mp4");
        request.cleanup = false;

        let report = wf.run(&request).await.unwrap();
        assert_eq!(report.cleanup, None);
        assert!(clip_dir.join("0.mp3").exists());
    }

    #[tokio::test]
    async fn test_missing_video_makes_no_calls() {
        let fx = fixture();
        let wf = workflow(fx.config.clone(), untouched_services());

        let request = DubRequest::new(fx.video.with_file_name("missing.mp4"), "es");
        let result = wf.run(&request).await;

        assert!(matches!(result, Err(DubError::VideoNotFound(_))));
    }

    #[tokio::test]
    async fn test_unsupported_language_fails_before_any_call() {
        let fx = fixture();
        let wf = workflow(fx.config.clone(), untouched_services());

        let result = wf.run(&DubRequest::new(&fx.video, "xx")).await;

        assert!(matches!(result, Err(DubError::UnsupportedLanguage(_))));
        assert!(!fx.config.speech.clip_dir.exists());
    }

    #[tokio::test]
    async fn test_transcription_failure_aborts_run() {
        let fx = fixture();
        let (mut transcriber, translator, synthesizer, mut media) = untouched_services();

        media.expect_probe_frame_rate().returning(|_| Ok(24.0));
        transcriber
            .expect_transcribe()
            .times(1)
            .returning(|_, _, _| Err(DubError::Transcription("Deepgram API error 401".to_string())));

        let wf = workflow(fx.config.clone(), (transcriber, translator, synthesizer, media));
        let result = wf.run(&DubRequest::new(&fx.video, "es")).await;

        assert!(matches!(result, Err(DubError::Transcription(_))));
    }

    #[tokio::test]
    async fn test_transcribe_only() {
        let fx = fixture();
        let (mut transcriber, translator, synthesizer, media) = untouched_services();
        transcriber
            .expect_transcribe()
            .times(1)
            .returning(|_, _, language| Ok(Transcript::new(language, vec![WordSegment::new("hey", 0.0, 0.1)])));

        let wf = workflow(fx.config.clone(), (transcriber, translator, synthesizer, media));
        let transcript = wf.transcribe_only(&fx.video).await.unwrap();

        assert_eq!(transcript.language, "en-US");
        assert_eq!(transcript.text(), "hey");
    }
}
