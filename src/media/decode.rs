use std::path::{Path, PathBuf};

use gdk_pixbuf::Pixbuf;
use thiserror::Error;

/// Images are downscaled so neither dimension exceeds this bound.
pub const MAX_WIDTH: u32 = 720;
pub const MAX_HEIGHT: u32 = 480;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported image format: {0}")]
    Unsupported(PathBuf),
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Strategy for turning an encoded image file into a displayable pixbuf.
/// Variants differ in the formats they accept and in resize quality.
pub trait DecodeBackend {
    fn name(&self) -> &'static str;

    /// Lowercase extension allow-list for directory listings.
    fn extensions(&self) -> &'static [&'static str];

    /// Decodes `path`, downscaled to fit within `max_w` × `max_h` while
    /// preserving the aspect ratio.
    fn decode(&self, path: &Path, max_w: u32, max_h: u32) -> Result<Pixbuf, DecodeError>;
}

/// Picks the best backend compiled into this build.
#[cfg(feature = "rich-images")]
pub fn detect_backend() -> Box<dyn DecodeBackend> {
    Box::new(RichDecoder)
}

#[cfg(not(feature = "rich-images"))]
pub fn detect_backend() -> Box<dyn DecodeBackend> {
    Box::new(BasicDecoder)
}

/// Exact-fit target dimensions, preserving aspect ratio. Images already
/// within the bound are left alone.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let scale = f64::min(max_w as f64 / width as f64, max_h as f64 / height as f64);
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// Integer reduction factor for backends that can only subsample:
/// `ceil(max(w/max_w, h/max_h, 1))`. The reduced image may undershoot
/// the bound but never exceeds it.
pub fn reduction_factor(width: u32, height: u32, max_w: u32, max_h: u32) -> u32 {
    let over = f64::max(
        width as f64 / max_w as f64,
        height as f64 / max_h as f64,
    )
    .max(1.0);
    over.ceil() as u32
}

/// High-quality backend: decodes any common format and resamples with
/// Lanczos3 to an exact fit.
#[cfg(feature = "rich-images")]
pub struct RichDecoder;

#[cfg(feature = "rich-images")]
impl DecodeBackend for RichDecoder {
    fn name(&self) -> &'static str {
        "rich"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png", "gif", "jpg", "jpeg", "bmp", "webp"]
    }

    fn decode(&self, path: &Path, max_w: u32, max_h: u32) -> Result<Pixbuf, DecodeError> {
        use image::GenericImageView;

        let decoded = image::open(path).map_err(|err| match err {
            image::ImageError::IoError(source) => DecodeError::Io {
                path: path.to_path_buf(),
                source,
            },
            image::ImageError::Unsupported(_) => DecodeError::Unsupported(path.to_path_buf()),
            other => DecodeError::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

        let (width, height) = decoded.dimensions();
        let (target_w, target_h) = fit_within(width, height, max_w, max_h);
        let resized = if (target_w, target_h) != (width, height) {
            decoded.resize(target_w, target_h, image::imageops::FilterType::Lanczos3)
        } else {
            decoded
        };

        let width = resized.width() as i32;
        let height = resized.height() as i32;
        let raw = resized.to_rgba8().into_raw();
        Ok(Pixbuf::from_bytes(
            &glib::Bytes::from_owned(raw),
            gdk_pixbuf::Colorspace::Rgb,
            true,
            8,
            width,
            height,
            width * 4,
        ))
    }
}

/// Limited backend: PNG/GIF only, integer-factor downscale.
pub struct BasicDecoder;

impl DecodeBackend for BasicDecoder {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png", "gif"]
    }

    fn decode(&self, path: &Path, max_w: u32, max_h: u32) -> Result<Pixbuf, DecodeError> {
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.extensions().contains(&ext.as_str()));
        if !supported {
            return Err(DecodeError::Unsupported(path.to_path_buf()));
        }

        let pixbuf = Pixbuf::from_file(path).map_err(|err| DecodeError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let factor = reduction_factor(
            pixbuf.width() as u32,
            pixbuf.height() as u32,
            max_w,
            max_h,
        );
        if factor <= 1 {
            return Ok(pixbuf);
        }
        pixbuf
            .scale_simple(
                (pixbuf.width() / factor as i32).max(1),
                (pixbuf.height() / factor as i32).max(1),
                gdk_pixbuf::InterpType::Nearest,
            )
            .ok_or_else(|| DecodeError::Decode {
                path: path.to_path_buf(),
                reason: "downscale failed".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        assert_eq!(fit_within(640, 480, 720, 480), (640, 480));
        assert_eq!(fit_within(1440, 960, 720, 480), (720, 480));
        assert_eq!(fit_within(2880, 480, 720, 480), (720, 120));
        // Extreme aspect ratios never collapse to zero.
        assert_eq!(fit_within(10_000, 2, 720, 480), (720, 1));
    }

    #[test]
    fn reduction_factor_never_exceeds_the_bound() {
        assert_eq!(reduction_factor(640, 480, 720, 480), 1);
        assert_eq!(reduction_factor(721, 480, 720, 480), 2);
        assert_eq!(reduction_factor(1440, 960, 720, 480), 2);
        assert_eq!(reduction_factor(2000, 100, 720, 480), 3);
        for (w, h) in [(721, 480), (1440, 960), (2000, 100), (5000, 5000)] {
            let k = reduction_factor(w, h, 720, 480);
            assert!(w / k <= 720 && h / k <= 480);
        }
    }

    #[test]
    fn basic_decoder_rejects_disallowed_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::File::create(&path).unwrap();
        match BasicDecoder.decode(&path, MAX_WIDTH, MAX_HEIGHT) {
            Err(DecodeError::Unsupported(p)) => assert_eq!(p, path),
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn basic_decoder_reports_corrupt_files_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"this is not a png").unwrap();
        drop(file);

        for _ in 0..2 {
            match BasicDecoder.decode(&path, MAX_WIDTH, MAX_HEIGHT) {
                Err(DecodeError::Decode { path: p, .. }) => assert_eq!(p, path),
                other => panic!("expected Decode error, got {other:?}"),
            }
        }
    }
}
