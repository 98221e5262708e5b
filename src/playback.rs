use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use crate::error::SpeakError;

pub enum AudioSource<'a> {
    Memory(Bytes),
    File(&'a Path),
}

/// The host audio device as seen by [`Player`].
pub trait AudioOutput {
    /// Opens the device unless it is already open.
    fn ensure_initialized(&mut self) -> Result<(), SpeakError>;
    fn set_volume(&mut self, volume: f32);
    fn load(&mut self, source: AudioSource<'_>) -> Result<(), SpeakError>;
    fn play(&mut self) -> Result<(), SpeakError>;
    fn is_busy(&self) -> bool;
}

/// Default output device through rodio. Not `Send`: open it on the thread
/// that plays.
#[derive(Default)]
pub struct RodioOutput {
    device: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioOutput {
    fn sink(&self) -> Result<&Sink, SpeakError> {
        self.sink
            .as_ref()
            .ok_or_else(|| SpeakError::playback("no audio loaded"))
    }
}

impl AudioOutput for RodioOutput {
    fn ensure_initialized(&mut self) -> Result<(), SpeakError> {
        if self.device.is_none() {
            self.device = Some(OutputStream::try_default().map_err(SpeakError::playback)?);
            debug!("Opened default audio output");
        }

        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;

        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn load(&mut self, source: AudioSource<'_>) -> Result<(), SpeakError> {
        let (_stream, handle) = self
            .device
            .as_ref()
            .ok_or_else(|| SpeakError::playback("audio output is not initialized"))?;

        let sink = Sink::try_new(handle).map_err(SpeakError::playback)?;
        sink.pause();
        sink.set_volume(self.volume);

        match source {
            AudioSource::Memory(audio) => {
                sink.append(Decoder::new(Cursor::new(audio)).map_err(SpeakError::playback)?);
            }
            AudioSource::File(path) => {
                let file = BufReader::new(File::open(path)?);
                sink.append(Decoder::new(file).map_err(SpeakError::playback)?);
            }
        }

        if let Some(previous) = self.sink.replace(sink) {
            previous.stop();
        }

        Ok(())
    }

    fn play(&mut self) -> Result<(), SpeakError> {
        self.sink()?.play();
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStrategy {
    /// Decode straight from the response body.
    Memory,
    /// Spill the body to `speak_<unix-secs>.wav` and play that file.
    File,
}

/// Response body spilled to disk. Removed on drop; removal errors are ignored.
struct TempAudioFile {
    path: PathBuf,
}

impl TempAudioFile {
    fn write(dir: &Path, audio: &[u8]) -> Result<Self, SpeakError> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let path = dir.join(format!("speak_{secs}.wav"));

        std::fs::write(&path, audio)?;
        debug!(path = %path.display(), "Wrote fallback audio file");

        Ok(Self { path })
    }
}

impl Drop for TempAudioFile {
    fn drop(&mut self) {
        if let Err(why) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), %why, "Failed to remove fallback audio file");
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    volume: f32,
    tmp_path: PathBuf,
    poll_interval: Duration,
}

impl Player {
    pub fn new(volume: f32, tmp_path: PathBuf, poll_interval: Duration) -> Self {
        Self {
            volume,
            tmp_path,
            poll_interval,
        }
    }

    /// Plays `audio` to the end, from memory first and from a file if that
    /// fails. Blocks the calling thread.
    pub fn play(
        &self,
        output: &mut dyn AudioOutput,
        audio: &Bytes,
    ) -> Result<PlaybackStrategy, SpeakError> {
        match self.attempt(output, PlaybackStrategy::Memory, audio) {
            Ok(()) => Ok(PlaybackStrategy::Memory),
            Err(why) => {
                warn!(%why, "In-memory playback failed, falling back to file");
                self.attempt(output, PlaybackStrategy::File, audio)
                    .map(|()| PlaybackStrategy::File)
            }
        }
    }

    fn attempt(
        &self,
        output: &mut dyn AudioOutput,
        strategy: PlaybackStrategy,
        audio: &Bytes,
    ) -> Result<(), SpeakError> {
        match strategy {
            PlaybackStrategy::Memory => {
                self.prepare(output)?;
                output.load(AudioSource::Memory(audio.clone()))?;
                self.run(output)
            }
            PlaybackStrategy::File => {
                let file = TempAudioFile::write(&self.tmp_path, audio)?;
                self.prepare(output)?;
                output.load(AudioSource::File(&file.path))?;
                self.run(output)
            }
        }
    }

    fn prepare(&self, output: &mut dyn AudioOutput) -> Result<(), SpeakError> {
        output.ensure_initialized()?;
        output.set_volume(self.volume);
        Ok(())
    }

    fn run(&self, output: &mut dyn AudioOutput) -> Result<(), SpeakError> {
        output.play()?;

        while output.is_busy() {
            std::thread::sleep(self.poll_interval);
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};

    use super::{AudioOutput, AudioSource};
    use crate::error::SpeakError;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Event {
        Init,
        Volume(f32),
        LoadMemory(usize),
        LoadFile { name: String, exists: bool },
        Play,
        Poll,
    }

    #[derive(Clone, Debug, Default)]
    pub struct Recorder {
        events: Arc<Mutex<Vec<Event>>>,
        opened: Arc<Mutex<usize>>,
    }

    impl Recorder {
        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        pub fn opened(&self) -> usize {
            *self.opened.lock().unwrap()
        }

        pub fn open(&self, fail_memory: bool) -> FakeOutput {
            *self.opened.lock().unwrap() += 1;

            FakeOutput {
                recorder: self.clone(),
                fail_memory,
                busy_polls: Cell::new(0),
            }
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    /// Records every call. Stays busy for three polls after `play`.
    pub struct FakeOutput {
        recorder: Recorder,
        fail_memory: bool,
        busy_polls: Cell<usize>,
    }

    impl AudioOutput for FakeOutput {
        fn ensure_initialized(&mut self) -> Result<(), SpeakError> {
            self.recorder.push(Event::Init);
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.recorder.push(Event::Volume(volume));
        }

        fn load(&mut self, source: AudioSource<'_>) -> Result<(), SpeakError> {
            match source {
                AudioSource::Memory(audio) => {
                    if self.fail_memory {
                        return Err(SpeakError::playback("in-memory decode unsupported"));
                    }
                    self.recorder.push(Event::LoadMemory(audio.len()));
                }
                AudioSource::File(path) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.recorder.push(Event::LoadFile {
                        name,
                        exists: path.exists(),
                    });
                }
            }

            Ok(())
        }

        fn play(&mut self) -> Result<(), SpeakError> {
            self.recorder.push(Event::Play);
            self.busy_polls.set(3);
            Ok(())
        }

        fn is_busy(&self) -> bool {
            let left = self.busy_polls.get();
            if left == 0 {
                return false;
            }

            self.recorder.push(Event::Poll);
            self.busy_polls.set(left - 1);
            true
        }
    }
}
