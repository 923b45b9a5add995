#[cfg(windows)]
pub mod win32;
