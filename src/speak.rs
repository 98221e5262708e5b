use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tap::Tap;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SpeakError;
use crate::model::SpeechRequest;
use crate::playback::{AudioOutput, PlaybackStrategy, Player, RodioOutput};
use crate::tts::{HttpTts, TtsService};

pub const MIN_VOLUME: f64 = 0.01;
pub const MAX_VOLUME: f64 = 1.00;

/// Opens the audio output on the playback thread.
pub type OutputFactory = Arc<dyn Fn() -> Box<dyn AudioOutput> + Send + Sync>;

/// `max(0.01, min(1.00, volume))`. NaN ends up at 1.00.
pub fn clamp_volume(volume: f64) -> f64 {
    volume.min(MAX_VOLUME).max(MIN_VOLUME)
}

#[derive(Clone)]
pub struct SpeakTool {
    tts: Arc<dyn TtsService>,
    open_output: OutputFactory,
    tmp_path: PathBuf,
    poll_interval: Duration,
}

impl SpeakTool {
    pub fn new(
        tts: Arc<dyn TtsService>,
        open_output: OutputFactory,
        tmp_path: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        Self {
            tts,
            open_output,
            tmp_path,
            poll_interval,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let tts = HttpTts::new(&config.tts_url, config.request_timeout())?;
        debug!(endpoint = tts.endpoint(), timeout = ?config.request_timeout(), "Configured TTS service");

        Ok(Self::new(
            Arc::new(tts),
            Arc::new(|| -> Box<dyn AudioOutput> { Box::new(RodioOutput::default()) }),
            config.tmp_path.clone(),
            config.poll_interval(),
        ))
    }

    /// Synthesizes and plays `request`, returning a status line. Never fails.
    pub async fn speak(&self, request: SpeechRequest) -> String {
        let text = request.text.clone();

        match self.try_speak(request).await {
            Ok(strategy) => format!("Successfully spoke: '{text}'")
                .tap(|_| info!(?strategy, chars = text.chars().count(), "Spoke")),
            Err(why) => why.to_string().tap(|msg| warn!(%msg, "Failed to speak")),
        }
    }

    async fn try_speak(&self, request: SpeechRequest) -> Result<PlaybackStrategy, SpeakError> {
        let volume = clamp_volume(request.volume);

        let audio = self.tts.synthesize(&request.query()).await?;
        debug!(bytes = audio.len(), volume, "Starting playback");

        #[allow(clippy::cast_possible_truncation)]
        let player = Player::new(volume as f32, self.tmp_path.clone(), self.poll_interval);
        let open_output = Arc::clone(&self.open_output);

        tokio::task::spawn_blocking(move || {
            let mut output = open_output();
            player.play(output.as_mut(), &audio)
        })
        .await
        .map_err(|why| SpeakError::Other(why.to_string()))?
    }
}

impl std::fmt::Debug for SpeakTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeakTool")
            .field("tts", &self.tts)
            .field("tmp_path", &self.tmp_path)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
