//! Asset handling: image decoding/caching and the music boundary.

pub mod audio;
pub mod cache;
pub mod decode;

use std::path::PathBuf;

/// Root of the bundled assets, resolved next to the working directory.
pub fn assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

pub fn images_dir() -> PathBuf {
    assets_dir().join("images")
}

pub fn music_file() -> PathBuf {
    assets_dir().join("music").join("song.mp3")
}
