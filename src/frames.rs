//! Precomputed logo frames loaded from `video_frames.bin`.
//!
//! The asset is optional. A missing or malformed file leaves the store empty
//! and the logo phase falls back to the text identity.

use std::path::{Path, PathBuf};

use log::{error, info, warn};
use oled_display_common::{Bitmap, FrameSet};

use crate::error::FrameStoreError;

/// Asset file name looked up under the install root.
pub const FRAMES_FILE_NAME: &str = "video_frames.bin";

/// Candidate asset locations under `root`, in lookup order.
pub fn candidate_paths(root: &Path) -> [PathBuf; 3] {
    [
        root.join(FRAMES_FILE_NAME),
        root.join("assets").join(FRAMES_FILE_NAME),
        root.join("..").join(FRAMES_FILE_NAME),
    ]
}

/// Directory of the running executable, or `.` if it cannot be determined.
pub fn default_install_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Read and decode one asset file.
pub fn read_frame_set(path: &Path) -> Result<FrameSet, FrameStoreError> {
    let bytes = std::fs::read(path)?;
    Ok(FrameSet::decode(&bytes)?)
}

/// Read-only holder of the loaded frame set.
#[derive(Clone, Default, Debug)]
pub struct FrameStore {
    frames: Option<FrameSet>,
}

impl FrameStore {
    /// Locate and load the asset. Never fails: problems are logged and leave the store empty.
    pub fn load(
        explicit: Option<&Path>,
        install_root: &Path,
    ) -> Self {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match candidate_paths(install_root).into_iter().find(|p| p.is_file()) {
                Some(path) => path,
                None => {
                    warn!("no {FRAMES_FILE_NAME} found under {}, using text logo", install_root.display());
                    return Self::empty();
                }
            },
        };

        match read_frame_set(&path) {
            Ok(frames) => {
                info!(
                    "loaded {} frames ({}x{} @ {} fps) from {}",
                    frames.len(),
                    frames.width(),
                    frames.height(),
                    frames.frames_per_second(),
                    path.display()
                );
                Self::from_frames(frames)
            }
            Err(FrameStoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("frame asset {} not found, using text logo", path.display());
                Self::empty()
            }
            Err(e) => {
                error!("failed to load {}: {e}", path.display());
                Self::empty()
            }
        }
    }

    pub fn empty() -> Self {
        Self { frames: None }
    }

    pub fn from_frames(frames: FrameSet) -> Self {
        Self { frames: Some(frames) }
    }

    /// Frame 0, shown statically as the logo.
    pub fn get_logo(&self) -> Option<&Bitmap> {
        self.frames.as_ref().map(FrameSet::first)
    }

    pub fn frames(&self) -> Option<&FrameSet> {
        self.frames.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn frame_set(first_lit: bool) -> FrameSet {
        let f0 = Bitmap::from_cells(16, 8, std::iter::repeat(first_lit));
        let f1 = Bitmap::from_cells(16, 8, std::iter::repeat(!first_lit));
        FrameSet::new(16, 8, 15.0, vec![f0, f1]).unwrap()
    }

    #[test]
    fn test_candidate_order() {
        let root = Path::new("/opt/oled/bin");
        let paths = candidate_paths(root);
        assert_eq!(paths[0], root.join("video_frames.bin"));
        assert_eq!(paths[1], root.join("assets/video_frames.bin"));
        assert_eq!(paths[2], root.join("../video_frames.bin"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.bin");
        fs::write(&path, frame_set(true).encode()).unwrap();

        let store = FrameStore::load(Some(&path), Path::new("/nonexistent"));
        assert_eq!(store.frames().map(FrameSet::len), Some(2));
        assert_eq!(store.get_logo().map(Bitmap::lit_count), Some(128));
    }

    #[test]
    fn test_load_prefers_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets").join(FRAMES_FILE_NAME), frame_set(false).encode()).unwrap();

        // Only the assets/ candidate exists
        let store = FrameStore::load(None, dir.path());
        assert_eq!(store.get_logo().map(Bitmap::lit_count), Some(0));

        // Root candidate wins once present
        fs::write(dir.path().join(FRAMES_FILE_NAME), frame_set(true).encode()).unwrap();
        let store = FrameStore::load(None, dir.path());
        assert_eq!(store.get_logo().map(Bitmap::lit_count), Some(128));
    }

    #[test]
    fn test_load_parent_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir(&bin).unwrap();
        fs::write(dir.path().join(FRAMES_FILE_NAME), frame_set(true).encode()).unwrap();
        assert!(!FrameStore::load(None, &bin).is_empty());
    }

    #[test]
    fn test_missing_asset_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::load(None, dir.path());
        assert!(store.is_empty());
        assert!(store.get_logo().is_none());

        let store = FrameStore::load(Some(&dir.path().join("missing.bin")), dir.path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_asset_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FRAMES_FILE_NAME);
        let mut bytes = frame_set(true).encode();
        bytes.pop();
        fs::write(&path, bytes).unwrap();

        assert!(FrameStore::load(None, dir.path()).is_empty());
        assert!(matches!(read_frame_set(&path), Err(FrameStoreError::Format(_))));
    }
}
