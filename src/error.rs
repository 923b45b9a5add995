use std::path::PathBuf;

/// Startup failures. All of them are fatal: the pet never runs half-loaded.
#[derive(Debug, thiserror::Error)]
pub enum NekoError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    ConfigEnv { key: String, value: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("missing asset {0}")]
    AssetMissing(PathBuf),

    #[error("failed to read asset {path}: {source}")]
    AssetRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode sprite {name}: {source}")]
    SpriteDecode {
        name: String,
        source: image::ImageError,
    },

    #[cfg(feature = "audio")]
    #[error("failed to decode sound {name}: {source}")]
    SoundDecode {
        name: String,
        source: rodio::decoder::DecoderError,
    },

    #[error("audio: {0}")]
    Audio(String),

    #[error("window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("no monitor available to place the pet on")]
    NoMonitor,

    #[error("gpu: {0}")]
    Gpu(String),
}

pub type Result<T> = std::result::Result<T, NekoError>;
