use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{DubError, Result};
use super::ClipPlacement;

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Disable audio
    pub fn no_audio(self) -> Self {
        self.arg("-an")
    }

    /// Select a stream for the output
    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.arg("-map").arg(stream)
    }

    /// Read the complex filter graph from a file
    pub fn filter_complex_script<P: AsRef<Path>>(self, script_path: P) -> Self {
        self.arg("-filter_complex_script").arg(script_path.as_ref().to_string_lossy().to_string())
    }

    /// Stop at the end of the shortest stream
    pub fn shortest(self) -> Self {
        self.arg("-shortest")
    }

    async fn run(&self) -> Result<std::process::Output> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| DubError::Media(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(output)
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        self.run().await.map(|_| ())
    }

    /// Execute the command and return its stdout
    pub async fn execute_with_output(&self) -> Result<String> {
        let output = self.run().await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Builder for the ffmpeg/ffprobe invocations the dubbing workflow needs
pub struct MediaCommandBuilder {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(ffmpeg_path: S1, ffprobe_path: S2) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Build frame rate probe command; prints `r_frame_rate` of the first video stream
    pub fn probe_frame_rate<P: AsRef<Path>>(&self, video_path: P) -> MediaCommand {
        MediaCommand::new(&self.ffprobe_path, "Frame rate probe")
            .args(["-v", "error"])
            .args(["-select_streams", "v:0"])
            .args(["-show_entries", "stream=r_frame_rate"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .output(video_path)
    }

    /// Plan the dubbing mux: clips are mixed down in passes of at most
    /// [`MAX_MIX_INPUTS`] inputs into intermediate WAVs under `work_dir`,
    /// then the last pass muxes the mixed track onto the video.
    /// Filter graphs live in script files, never on the command line.
    pub fn replace_audio(
        &self,
        video_path: &Path,
        placements: &[ClipPlacement],
        work_dir: &Path,
        output_path: &Path,
        options: &ReplaceAudioOptions<'_>,
    ) -> Vec<MixStep> {
        if placements.is_empty() {
            let mut cmd = MediaCommand::new(&self.ffmpeg_path, "Audio removal")
                .overwrite()
                .input(video_path)
                .map("0:v")
                .no_audio()
                .video_codec(options.video_codec);
            for option in options.extra {
                cmd = cmd.arg(option);
            }
            return vec![MixStep { script: None, command: cmd.output(output_path) }];
        }

        let mut steps = Vec::new();
        let mut layer: Vec<(PathBuf, u64)> = placements
            .iter()
            .map(|p| (p.path.clone(), delay_ms(p.start)))
            .collect();

        let mut level = 0;
        while layer.len() > MAX_MIX_INPUTS {
            let mut next = Vec::with_capacity(layer.len().div_ceil(MAX_MIX_INPUTS));

            for (k, group) in layer.chunks(MAX_MIX_INPUTS).enumerate() {
                let mix_path = work_dir.join(format!("mix_{}_{}.wav", level, k));
                let script_path = work_dir.join(format!("mix_{}_{}.filter", level, k));
                let delays: Vec<u64> = group.iter().map(|(_, d)| *d).collect();

                let mut cmd = MediaCommand::new(&self.ffmpeg_path, format!("Clip mix {}.{}", level, k))
                    .overwrite();
                for (path, _) in group {
                    cmd = cmd.input(path);
                }
                let cmd = cmd
                    .filter_complex_script(&script_path)
                    .map("[aout]")
                    .audio_codec("pcm_f32le")
                    .output(&mix_path);

                steps.push(MixStep {
                    script: Some((script_path, mix_graph(&delays, options.sample_rate, 0, ""))),
                    command: cmd,
                });
                next.push((mix_path, 0));
            }

            layer = next;
            level += 1;
        }

        let script_path = work_dir.join("final.filter");
        let delays: Vec<u64> = layer.iter().map(|(_, d)| *d).collect();

        let mut cmd = MediaCommand::new(&self.ffmpeg_path, "Audio replacement")
            .overwrite()
            .input(video_path);
        for (path, _) in &layer {
            cmd = cmd.input(path);
        }
        cmd = cmd
            .filter_complex_script(&script_path)
            .map("0:v")
            .map("[aout]")
            .video_codec(options.video_codec)
            .audio_codec(options.audio_codec)
            .shortest();
        for option in options.extra {
            cmd = cmd.arg(option);
        }

        steps.push(MixStep {
            script: Some((script_path, mix_graph(&delays, options.sample_rate, 1, ",apad"))),
            command: cmd.output(output_path),
        });
        steps
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.ffmpeg_path, "Version check")
            .arg("-version")
    }
}

/// Most inputs a single ffmpeg mix pass opens
pub const MAX_MIX_INPUTS: usize = 256;

/// One ffmpeg pass; `script` is written to disk before the command runs
#[derive(Debug, Clone)]
pub struct MixStep {
    pub script: Option<(PathBuf, String)>,
    pub command: MediaCommand,
}

/// Encoder settings for [`MediaCommandBuilder::replace_audio`]
pub struct ReplaceAudioOptions<'a> {
    pub video_codec: &'a str,
    pub audio_codec: &'a str,
    pub sample_rate: u32,
    pub extra: &'a [String],
}

fn delay_ms(start: f64) -> u64 {
    (start.max(0.0) * 1000.0).round() as u64
}

/// Filter graph that delays every input and sums them into `[aout]`.
/// Audio inputs are numbered from `first_input`.
fn mix_graph(delays: &[u64], sample_rate: u32, first_input: usize, tail: &str) -> String {
    let mut graph = String::new();
    let mut labels = String::new();

    for (i, delay) in delays.iter().enumerate() {
        graph.push_str(&format!(
            "[{}:a]aresample={},adelay=delays={}:all=1[a{}];",
            first_input + i,
            sample_rate,
            delay,
            i
        ));
        labels.push_str(&format!("[a{}]", i));
    }

    graph.push_str(&format!(
        "{}amix=inputs={}:duration=longest:normalize=0{}[aout]",
        labels,
        delays.len(),
        tail
    ));
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(index: usize, start: f64) -> ClipPlacement {
        ClipPlacement {
            index,
            path: PathBuf::from(format!("temp/{}.mp3", index)),
            start,
            rate_scale: -30.0,
        }
    }

    fn options() -> ReplaceAudioOptions<'static> {
        ReplaceAudioOptions {
            video_codec: "libx264",
            audio_codec: "aac",
            sample_rate: 44100,
            extra: &[],
        }
    }

    fn plan(placements: &[ClipPlacement]) -> Vec<MixStep> {
        MediaCommandBuilder::new("ffmpeg", "ffprobe").replace_audio(
            Path::new("in.mp4"),
            placements,
            Path::new("temp"),
            Path::new("out.mp4"),
            &options(),
        )
    }

    fn input_count(cmd: &MediaCommand) -> usize {
        cmd.args.iter().filter(|a| *a == "-i").count()
    }

    #[test]
    fn test_mix_graph_delays_each_clip() {
        let graph = mix_graph(&[0, 1250], 44100, 1, ",apad");
        assert_eq!(
            graph,
            "[1:a]aresample=44100,adelay=delays=0:all=1[a0];\
             [2:a]aresample=44100,adelay=delays=1250:all=1[a1];\
             [a0][a1]amix=inputs=2:duration=longest:normalize=0,apad[aout]"
        );
    }

    #[test]
    fn test_replace_audio_command_layout() {
        let steps = plan(&[placement(0, 0.5), placement(1, 1.0)]);
        assert_eq!(steps.len(), 1);

        let step = &steps[0];
        let cmd = &step.command;
        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(&cmd.args[..7], &["-y", "-i", "in.mp4", "-i", "temp/0.mp3", "-i", "temp/1.mp3"]);
        assert!(cmd.args.windows(2).any(|w| w == ["-filter_complex_script", "temp/final.filter"]));
        assert!(cmd.args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert!(cmd.args.windows(2).any(|w| w == ["-map", "[aout]"]));
        assert!(cmd.args.contains(&"-shortest".to_string()));
        assert!(!cmd.args.contains(&"-filter_complex".to_string()));
        assert_eq!(cmd.args.last().unwrap(), "out.mp4");

        let (script_path, graph) = step.script.as_ref().unwrap();
        assert_eq!(script_path, &PathBuf::from("temp/final.filter"));
        assert!(graph.contains("adelay=delays=500:all=1"));
        assert!(graph.contains("adelay=delays=1000:all=1"));
    }

    #[test]
    fn test_long_transcript_stays_within_argument_limits() {
        let placements: Vec<ClipPlacement> = (0..2500).map(|i| placement(i, i as f64 * 0.4)).collect();
        let steps = plan(&placements);

        // 10 batches of up to 256 clips, then the final mux
        assert_eq!(steps.len(), 11);
        for step in &steps {
            assert!(step.command.args.iter().all(|a| a.len() <= 128 * 1024));
            assert!(input_count(&step.command) <= MAX_MIX_INPUTS + 1);
            assert!(step.script.is_some());
        }

        let first = &steps[0];
        assert_eq!(input_count(&first.command), MAX_MIX_INPUTS);
        assert_eq!(first.command.args.last().unwrap(), "temp/mix_0_0.wav");
        let (_, graph) = first.script.as_ref().unwrap();
        assert!(graph.starts_with("[0:a]aresample=44100,adelay=delays=0:all=1[a0];"));
        assert!(graph.ends_with("amix=inputs=256:duration=longest:normalize=0[aout]"));

        // last batch holds the remainder and keeps absolute delays
        let (_, graph) = steps[9].script.as_ref().unwrap();
        assert_eq!(input_count(&steps[9].command), 2500 - 9 * MAX_MIX_INPUTS);
        assert!(graph.contains("adelay=delays=921600:all=1"));

        let last = &steps[10];
        assert_eq!(input_count(&last.command), 11);
        assert!(last.command.args.contains(&"temp/mix_0_9.wav".to_string()));
        assert_eq!(last.command.args.last().unwrap(), "out.mp4");
        let (_, graph) = last.script.as_ref().unwrap();
        assert!(graph.contains("[10:a]aresample=44100,adelay=delays=0:all=1[a9];"));
        assert!(graph.ends_with("amix=inputs=10:duration=longest:normalize=0,apad[aout]"));
    }

    #[test]
    fn test_replace_audio_without_clips_drops_audio() {
        let steps = plan(&[]);
        assert_eq!(steps.len(), 1);

        let cmd = &steps[0].command;
        assert!(steps[0].script.is_none());
        assert!(cmd.args.contains(&"-an".to_string()));
        assert!(!cmd.args.contains(&"-filter_complex_script".to_string()));
    }

    #[test]
    fn test_probe_command() {
        let builder = MediaCommandBuilder::new("ffmpeg", "/opt/bin/ffprobe");
        let cmd = builder.probe_frame_rate("clip.mov");
        assert_eq!(cmd.binary_path, "/opt/bin/ffprobe");
        assert!(cmd.args.windows(2).any(|w| w == ["-show_entries", "stream=r_frame_rate"]));
        assert_eq!(cmd.args.last().unwrap(), "clip.mov");
    }
}
