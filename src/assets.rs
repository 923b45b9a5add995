//! Sprite and sound files.
//!
//! Assets live as `<dir>/<name>.png` and `<dir>/<name>.wav`. The set of names
//! is closed (see [`Frame::all`] and [`SoundCue::ALL`]) and every one of them
//! must load, so lookups after startup cannot miss.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::error::{NekoError, Result};
use crate::pet::sprite::Frame;

/// Decoded RGBA art for every animation frame.
pub struct SpriteSheet {
    frames: Vec<RgbaImage>,
}

impl SpriteSheet {
    /// Load and decode every frame from `dir`. Fails on the first missing or
    /// broken file.
    pub fn load(dir: &Path) -> Result<Self> {
        let frames = Frame::all()
            .map(|frame| {
                let name = frame.name();
                let bytes = read_asset(dir, &name, "png")?;
                let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
                    .map_err(|source| NekoError::SpriteDecode { name, source })?;
                Ok(img.to_rgba8())
            })
            .collect::<Result<Vec<_>>>()?;
        log::info!("Loaded {} sprites from {}", frames.len(), dir.display());
        Ok(Self { frames })
    }

    pub fn get(&self, frame: Frame) -> &RgbaImage {
        &self.frames[frame.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Frame, &RgbaImage)> {
        Frame::all().zip(&self.frames)
    }
}

/// Decode every sound cue from `dir` to PCM.
#[cfg(feature = "audio")]
pub fn load_sounds(dir: &Path) -> Result<crate::audio::SoundBank> {
    use std::io::Cursor;

    use rodio::{Decoder, Source};

    use crate::audio::{Sound, SoundBank};
    use crate::pet::SoundCue;

    let mut sounds = Vec::with_capacity(SoundCue::ALL.len());
    for cue in SoundCue::ALL {
        let name = cue.name();
        let bytes = read_asset(dir, name, "wav")?;
        let decoder = Decoder::new(Cursor::new(bytes)).map_err(|source| NekoError::SoundDecode {
            name: name.to_string(),
            source,
        })?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<i16> = decoder.collect();
        log::debug!(
            "Decoded {name}: {} samples, {channels} ch @ {sample_rate} Hz",
            samples.len()
        );
        sounds.push(Sound::new(channels, sample_rate, samples));
    }
    log::info!("Loaded {} sounds from {}", sounds.len(), dir.display());
    Ok(SoundBank::from_sounds(sounds))
}

fn read_asset(dir: &Path, name: &str, ext: &str) -> Result<Vec<u8>> {
    let path: PathBuf = dir.join(format!("{name}.{ext}"));
    if !path.is_file() {
        return Err(NekoError::AssetMissing(path));
    }
    fs::read(&path).map_err(|source| NekoError::AssetRead { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::sprite::FRAME_COUNT;
    use image::Rgba;

    fn write_sprites(dir: &Path) {
        for (i, frame) in Frame::all().enumerate() {
            let img = RgbaImage::from_pixel(32, 32, Rgba([i as u8, 0, 0, 255]));
            img.save(dir.join(format!("{}.png", frame.name()))).unwrap();
        }
    }

    #[test]
    fn loads_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        write_sprites(dir.path());
        let sheet = SpriteSheet::load(dir.path()).unwrap();
        assert_eq!(sheet.iter().count(), FRAME_COUNT);
        for (frame, img) in sheet.iter() {
            assert_eq!(img.dimensions(), (32, 32));
            assert_eq!(img.get_pixel(0, 0)[0] as usize, frame.index());
        }
        assert_eq!(sheet.get(Frame::AWAKE).get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn missing_frame_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_sprites(dir.path());
        fs::remove_file(dir.path().join("downleft2.png")).unwrap();
        match SpriteSheet::load(dir.path()) {
            Err(NekoError::AssetMissing(path)) => assert!(path.ends_with("downleft2.png")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loaded an incomplete sheet"),
        }
    }

    #[test]
    fn corrupt_png_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_sprites(dir.path());
        fs::write(dir.path().join("wash1.png"), b"not a png").unwrap();
        match SpriteSheet::load(dir.path()) {
            Err(NekoError::SpriteDecode { name, .. }) => assert_eq!(name, "wash1"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("decoded garbage"),
        }
    }

    #[cfg(feature = "audio")]
    fn write_wav(path: &Path, samples: &[i16]) {
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&44_100u32.to_le_bytes());
        out.extend_from_slice(&(44_100u32 * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        fs::write(path, out).unwrap();
    }

    #[cfg(feature = "audio")]
    #[test]
    fn loads_sounds() {
        use crate::pet::SoundCue;

        let dir = tempfile::tempdir().unwrap();
        for cue in SoundCue::ALL {
            write_wav(&dir.path().join(format!("{}.wav", cue.name())), &[0, 1000, -1000, 0]);
        }
        let bank = load_sounds(dir.path()).unwrap();
        let sound = bank.get(SoundCue::Sleep);
        assert_eq!(sound.channels, 1);
        assert_eq!(sound.sample_rate, 44_100);
        assert_eq!(sound.samples.len(), 4);
    }

    #[cfg(feature = "audio")]
    #[test]
    fn missing_sound_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join("idle3.wav"), &[0; 8]);
        assert!(matches!(
            load_sounds(dir.path()),
            Err(NekoError::AssetMissing(_))
        ));
    }
}
