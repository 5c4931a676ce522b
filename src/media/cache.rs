use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use gdk_pixbuf::Pixbuf;

use super::decode::{DecodeBackend, DecodeError, MAX_HEIGHT, MAX_WIDTH};

/// Decoded, downscaled image plus its natural size. Cloning bumps the
/// pixbuf refcount, it does not copy pixels.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub pixbuf: Pixbuf,
    pub width: i32,
    pub height: i32,
}

/// Memoizing image loader. Entries are keyed by canonical absolute path
/// and never evicted; decode failures are returned but not cached, so a
/// retry after the file is fixed can succeed.
pub struct ImageStore {
    backend: Box<dyn DecodeBackend>,
    max_width: u32,
    max_height: u32,
    entries: RefCell<HashMap<PathBuf, CacheEntry>>,
}

impl ImageStore {
    pub fn new(backend: Box<dyn DecodeBackend>) -> Self {
        Self::with_bounds(backend, MAX_WIDTH, MAX_HEIGHT)
    }

    pub fn with_bounds(backend: Box<dyn DecodeBackend>, max_width: u32, max_height: u32) -> Self {
        ImageStore {
            backend,
            max_width,
            max_height,
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Loads an image, memoized by canonical path. Relative and absolute
    /// spellings of the same file share one entry.
    pub fn load(&self, path: &Path) -> Result<CacheEntry, DecodeError> {
        let canonical = fs::canonicalize(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(entry) = self.entries.borrow().get(&canonical) {
            return Ok(entry.clone());
        }

        let pixbuf = self
            .backend
            .decode(&canonical, self.max_width, self.max_height)
            .inspect_err(|err| {
                glib::g_warning!("surprise", "image load failed: {err}");
            })?;
        let entry = CacheEntry {
            width: pixbuf.width(),
            height: pixbuf.height(),
            pixbuf,
        };
        self.entries
            .borrow_mut()
            .insert(canonical, entry.clone());
        Ok(entry)
    }

    /// Lists decodable files in `directory`, sorted lexicographically.
    /// The allow-list depends on the active backend. A missing or
    /// unreadable directory yields an empty list.
    pub fn list_images(&self, directory: &Path) -> Vec<PathBuf> {
        let reader = match fs::read_dir(directory) {
            Ok(reader) => reader,
            Err(err) => {
                glib::g_warning!(
                    "surprise",
                    "cannot list images in {}: {err}",
                    directory.display()
                );
                return Vec::new();
            }
        };

        let allowed = self.backend.extensions();
        let mut files: Vec<PathBuf> = reader
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.to_ascii_lowercase())
                    .is_some_and(|ext| allowed.contains(&ext.as_str()))
            })
            .collect();
        files.sort();
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::media::decode::BasicDecoder;

    /// Backend double that counts decode attempts and can be told to
    /// fail; lets the cache tests run without real image files.
    struct CountingBackend {
        attempts: Rc<Cell<usize>>,
        fail: bool,
    }

    impl DecodeBackend for CountingBackend {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["png", "gif"]
        }

        fn decode(&self, path: &Path, _max_w: u32, _max_h: u32) -> Result<Pixbuf, DecodeError> {
            self.attempts.set(self.attempts.get() + 1);
            if self.fail {
                return Err(DecodeError::Decode {
                    path: path.to_path_buf(),
                    reason: "forced failure".to_string(),
                });
            }
            Pixbuf::new(gdk_pixbuf::Colorspace::Rgb, false, 8, 4, 4).ok_or_else(|| {
                DecodeError::Decode {
                    path: path.to_path_buf(),
                    reason: "allocation failed".to_string(),
                }
            })
        }
    }

    fn counting_store(fail: bool) -> (ImageStore, Rc<Cell<usize>>) {
        let attempts = Rc::new(Cell::new(0));
        let backend = CountingBackend {
            attempts: attempts.clone(),
            fail,
        };
        (ImageStore::new(Box::new(backend)), attempts)
    }

    #[test]
    fn equivalent_paths_share_one_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::File::create(&path).unwrap();
        let (store, attempts) = counting_store(false);

        let first = store.load(&path).unwrap();
        // A redundant-segment spelling of the same file.
        let detour = dir.path().join(".").join("pic.png");
        let second = store.load(&detour).unwrap();

        assert_eq!(attempts.get(), 1);
        assert_eq!(first.pixbuf, second.pixbuf);
        assert_eq!(first.width, 4);
        assert_eq!(first.height, 4);
    }

    #[test]
    fn failures_are_returned_but_never_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::File::create(&path).unwrap();
        let (store, attempts) = counting_store(true);

        assert!(store.load(&path).is_err());
        assert!(store.load(&path).is_err());
        // Both calls reached the backend: the failure was not memoized.
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn missing_files_surface_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let (store, attempts) = counting_store(false);
        match store.load(&dir.path().join("nope.png")) {
            Err(DecodeError::Io { .. }) => {}
            other => panic!("expected Io error, got {other:?}"),
        }
        assert_eq!(attempts.get(), 0);
    }

    #[test]
    fn listing_filters_by_backend_allow_list_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.GIF", "c.jpg", "notes.txt", "d.png"] {
            std::fs::File::create(dir.path().join(name)).unwrap();
        }
        let store = ImageStore::new(Box::new(BasicDecoder));
        let names: Vec<String> = store
            .list_images(dir.path())
            .into_iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // jpg is outside the basic allow-list; case of the extension is
        // irrelevant; order is lexicographic.
        assert_eq!(names, ["a.GIF", "b.png", "d.png"]);
    }

    #[test]
    fn listing_a_missing_directory_is_empty_not_fatal() {
        let store = ImageStore::new(Box::new(BasicDecoder));
        assert!(store.list_images(Path::new("/no/such/dir")).is_empty());
    }
}
