use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::pet::SoundCue;

/// Decoded PCM for one sound cue.
#[derive(Debug, Clone)]
pub struct Sound {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Arc<[i16]>,
}

impl Sound {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            channels,
            sample_rate,
            samples: samples.into(),
        }
    }
}

/// One decoded sound per cue, in [`SoundCue::ALL`] order.
#[derive(Debug, Clone)]
pub struct SoundBank {
    sounds: Vec<Sound>,
}

impl SoundBank {
    pub fn from_sounds(sounds: Vec<Sound>) -> Self {
        assert_eq!(sounds.len(), SoundCue::ALL.len(), "one sound per cue");
        Self { sounds }
    }

    pub fn get(&self, cue: SoundCue) -> &Sound {
        &self.sounds[cue as usize]
    }
}

/// Where the pet's sound cues go.
pub trait AudioSink {
    /// Start `cue`, cutting off whatever is playing.
    fn play(&mut self, cue: SoundCue);
    fn stop_current(&mut self);
}

/// Sink for `quiet` mode: drops every cue.
pub struct Muted;

impl AudioSink for Muted {
    fn play(&mut self, cue: SoundCue) {
        log::trace!("muted cue {}", cue.name());
    }

    fn stop_current(&mut self) {}
}

/// A sound that is playing and can be cut off.
pub trait Voice {
    fn stop(self);
}

/// Something that can start voices, e.g. an output device.
pub trait AudioBackend {
    type Voice: Voice;

    fn start(&mut self, sound: &Sound) -> Result<Self::Voice>;
}

/// Plays cues one at a time: the previous voice is always stopped before
/// the next one starts.
pub struct SoundPlayer<B: AudioBackend> {
    backend: B,
    bank: SoundBank,
    current: Option<B::Voice>,
}

impl<B: AudioBackend> SoundPlayer<B> {
    pub fn new(backend: B, bank: SoundBank) -> Self {
        Self {
            backend,
            bank,
            current: None,
        }
    }
}

impl<B: AudioBackend> AudioSink for SoundPlayer<B> {
    fn play(&mut self, cue: SoundCue) {
        self.stop_current();
        match self.backend.start(self.bank.get(cue)) {
            Ok(voice) => self.current = Some(voice),
            Err(e) => log::warn!("Failed to play {}: {e}", cue.name()),
        }
    }

    fn stop_current(&mut self) {
        if let Some(voice) = self.current.take() {
            voice.stop();
        }
    }
}

/// Sound sink for `config`: muted when quiet, the default output device
/// otherwise. Loads the sound files only when they will be played.
pub fn open(config: &Config) -> Result<Box<dyn AudioSink>> {
    if config.quiet {
        log::info!("Sound disabled (quiet)");
        return Ok(Box::new(Muted));
    }
    open_device(config)
}

#[cfg(feature = "audio")]
fn open_device(config: &Config) -> Result<Box<dyn AudioSink>> {
    let bank = crate::assets::load_sounds(&config.assets)?;
    let backend = rodio_backend::RodioBackend::open(config.volume)?;
    Ok(Box::new(SoundPlayer::new(backend, bank)))
}

#[cfg(not(feature = "audio"))]
fn open_device(_config: &Config) -> Result<Box<dyn AudioSink>> {
    log::warn!("Built without the `audio` feature, sound disabled");
    Ok(Box::new(Muted))
}

#[cfg(feature = "audio")]
mod rodio_backend {
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{AudioBackend, Sound, Voice};
    use crate::error::{NekoError, Result};

    /// Default output device. Dropping it closes the stream.
    pub struct RodioBackend {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        volume: f32,
    }

    impl RodioBackend {
        pub fn open(volume: f32) -> Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| NekoError::Audio(e.to_string()))?;
            log::info!("Audio output opened (volume {volume})");
            Ok(Self {
                _stream: stream,
                handle,
                volume,
            })
        }
    }

    pub struct RodioVoice(Sink);

    impl Voice for RodioVoice {
        fn stop(self) {
            self.0.stop();
        }
    }

    impl AudioBackend for RodioBackend {
        type Voice = RodioVoice;

        fn start(&mut self, sound: &Sound) -> Result<RodioVoice> {
            let sink = Sink::try_new(&self.handle).map_err(|e| NekoError::Audio(e.to_string()))?;
            sink.set_volume(self.volume);
            sink.append(SamplesBuffer::new(
                sound.channels,
                sound.sample_rate,
                sound.samples.to_vec(),
            ));
            Ok(RodioVoice(sink))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NekoError;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeVoice {
        id: usize,
        log: Log,
    }

    impl Voice for FakeVoice {
        fn stop(self) {
            self.log.borrow_mut().push(format!("stop {}", self.id));
        }
    }

    struct FakeBackend {
        started: usize,
        fail: bool,
        log: Log,
    }

    impl AudioBackend for FakeBackend {
        type Voice = FakeVoice;

        fn start(&mut self, sound: &Sound) -> Result<FakeVoice> {
            if self.fail {
                return Err(NekoError::Audio("device gone".into()));
            }
            self.started += 1;
            self.log
                .borrow_mut()
                .push(format!("start {} ({} samples)", self.started, sound.samples.len()));
            Ok(FakeVoice {
                id: self.started,
                log: self.log.clone(),
            })
        }
    }

    fn bank() -> SoundBank {
        SoundBank::from_sounds(
            SoundCue::ALL
                .iter()
                .enumerate()
                .map(|(i, _)| Sound::new(1, 44_100, vec![0; i + 1]))
                .collect(),
        )
    }

    fn player(fail: bool) -> (SoundPlayer<FakeBackend>, Log) {
        let log = Log::default();
        let backend = FakeBackend {
            started: 0,
            fail,
            log: log.clone(),
        };
        (SoundPlayer::new(backend, bank()), log)
    }

    #[test]
    fn bank_is_indexed_by_cue() {
        let bank = bank();
        assert_eq!(bank.get(SoundCue::Idle3).samples.len(), 1);
        assert_eq!(bank.get(SoundCue::Awake).samples.len(), 2);
        assert_eq!(bank.get(SoundCue::Sleep).samples.len(), 3);
    }

    #[test]
    fn previous_voice_stops_before_next_starts() {
        let (mut p, log) = player(false);
        p.play(SoundCue::Idle3);
        p.play(SoundCue::Sleep);
        p.play(SoundCue::Awake);
        assert_eq!(
            *log.borrow(),
            [
                "start 1 (1 samples)",
                "stop 1",
                "start 2 (3 samples)",
                "stop 2",
                "start 3 (2 samples)",
            ]
        );
    }

    #[test]
    fn stop_current_is_idempotent() {
        let (mut p, log) = player(false);
        p.play(SoundCue::Sleep);
        p.stop_current();
        p.stop_current();
        assert_eq!(*log.borrow(), ["start 1 (3 samples)", "stop 1"]);
    }

    #[test]
    fn failed_start_leaves_nothing_playing() {
        let (mut p, log) = player(true);
        p.play(SoundCue::Awake);
        assert!(p.current.is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn quiet_config_mutes() {
        let config = Config {
            quiet: true,
            assets: "nowhere".into(),
            ..Config::default()
        };
        // No device or sound files are touched when quiet.
        let mut sink = open(&config).unwrap();
        sink.play(SoundCue::Sleep);
        sink.stop_current();
    }
}
