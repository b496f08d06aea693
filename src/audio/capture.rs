//! cpal-based microphone capture.
//!
//! One recording owns the input stream on a dedicated capture thread;
//! interleaved frames are down-mixed to mono 16-bit samples as they
//! arrive. The thread observes a single-slot stop signal after each poll
//! interval and hands the accumulated buffer back over a completion
//! channel, so the device is closed before transcription starts.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::{oneshot, watch};
use tracing::{info, warn};

/// How one recording ends.
#[derive(Debug)]
pub enum CaptureMode {
    /// Record for a fixed duration.
    Fixed(Duration),
    /// Record until the signal fires.
    UntilStopped(oneshot::Receiver<()>),
}

/// Temporary audio artifact produced by one recording. Consumed exactly
/// once by the transcriber and removed by the orchestrator afterwards.
#[derive(Debug, Clone)]
pub struct VoiceNote {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

/// Capture seam for the orchestrator; mockable in tests.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Record one voice note to a temporary WAV file.
    async fn record(&self, mode: CaptureMode) -> Result<VoiceNote>;
}

/// Default microphone of the host audio system.
pub struct Microphone {
    poll_interval: Duration,
}

impl Microphone {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl Default for Microphone {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSource for Microphone {
    async fn record(&self, mode: CaptureMode) -> Result<VoiceNote> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = oneshot::channel();
        let poll_interval = self.poll_interval;

        thread::spawn(move || {
            let result = capture_blocking(stop_rx, poll_interval);
            let _ = done_tx.send(result);
        });

        info!("recording started");
        let wait = async {
            match mode {
                CaptureMode::Fixed(duration) => tokio::time::sleep(duration).await,
                CaptureMode::UntilStopped(signal) => {
                    // A dropped sender counts as a stop request
                    let _ = signal.await;
                }
            }
        };

        let mut done_rx = done_rx;
        let audio = tokio::select! {
            _ = wait => {
                let _ = stop_tx.send(true);
                done_rx.await.context("capture thread exited unexpectedly")??
            }
            // The thread only finishes on its own when device setup failed
            result = &mut done_rx => {
                result.context("capture thread exited unexpectedly")??
            }
        };

        let path = temp_wav_path()?;
        write_wav(&path, audio.sample_rate, &audio.samples)?;
        info!(
            path = %path.display(),
            samples = audio.samples.len(),
            sample_rate = audio.sample_rate,
            "recording saved"
        );

        Ok(VoiceNote {
            path,
            sample_rate: audio.sample_rate,
            channels: 1,
            bits_per_sample: 16,
        })
    }
}

/// Mono 16-bit buffer collected from the device.
struct RecordedAudio {
    samples: Vec<i16>,
    sample_rate: u32,
}

/// Open the default input device and collect samples until the stop
/// signal flips. Runs on its own thread because cpal streams are not Send.
fn capture_blocking(stop: watch::Receiver<bool>, poll_interval: Duration) -> Result<RecordedAudio> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("no input device available")?;

    let supported = device
        .default_input_config()
        .context("no default input configuration")?;
    let sample_format = supported.sample_format();
    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let config: cpal::StreamConfig = supported.into();

    let samples: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));

    let stream = match sample_format {
        cpal::SampleFormat::F32 => {
            let buffer = samples.clone();
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono = to_mono_i16(data, channels);
                    if let Ok(mut buffer) = buffer.lock() {
                        buffer.extend(mono);
                    }
                },
                |err| warn!(%err, "audio input stream error"),
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let buffer = samples.clone();
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let mono = downmix_i16(data, channels);
                    if let Ok(mut buffer) = buffer.lock() {
                        buffer.extend(mono);
                    }
                },
                |err| warn!(%err, "audio input stream error"),
                None,
            )
        }
        other => anyhow::bail!("unsupported input sample format: {other:?}"),
    }
    .context("failed to open input stream")?;

    stream.play().context("failed to start input stream")?;

    while !*stop.borrow() {
        thread::sleep(poll_interval);
    }

    // Close the device before handing the buffer back
    drop(stream);

    let samples = samples
        .lock()
        .map_err(|_| anyhow::anyhow!("sample buffer poisoned"))?
        .split_off(0);

    Ok(RecordedAudio {
        samples,
        sample_rate,
    })
}

/// Average interleaved float frames down to one 16-bit channel.
fn to_mono_i16(data: &[f32], channels: usize) -> Vec<i16> {
    let channels = channels.max(1);
    data.chunks(channels)
        .map(|frame| {
            let avg = frame.iter().sum::<f32>() / frame.len() as f32;
            (avg.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
        })
        .collect()
}

/// Average interleaved 16-bit frames down to one channel.
fn downmix_i16(data: &[i16], channels: usize) -> Vec<i16> {
    let channels = channels.max(1);
    data.chunks(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|s| i32::from(*s)).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

/// Reserve a unique `.wav` path under the system temp directory. The file
/// outlives this call; the orchestrator removes it after transcription.
fn temp_wav_path() -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("voxcal-")
        .suffix(".wav")
        .tempfile()
        .context("failed to create temporary audio file")?;
    file.into_temp_path()
        .keep()
        .context("failed to persist temporary audio file")
}

/// Write mono 16-bit samples as a WAV file.
fn write_wav(path: &Path, sample_rate: u32, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create WAV file: {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize().context("failed to finalize WAV file")?;

    Ok(())
}
