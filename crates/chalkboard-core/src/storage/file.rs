//! Slots as `.json` files in one directory.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores each slot as `<slot>.json` under a directory.
///
/// Writes go to a sibling `.tmp` file that is renamed over the target, so a
/// crash mid-save leaves the previous board intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| StorageError::io(format!("creating {}", dir.display()), e))?;
        Ok(Self { dir })
    }

    /// `chalkboard/boards` under the platform data directory.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir().or_else(dirs::home_dir).ok_or_else(|| {
            StorageError::io(
                "locating data directory",
                std::io::Error::from(ErrorKind::NotFound),
            )
        })?;
        Self::new(base.join("chalkboard").join("boards"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        // Keep slot names from escaping the directory
        let file: String = slot
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        self.dir.join(file).with_extension("json")
    }
}

impl Storage for FileStorage {
    fn put(&self, slot: &str, json: String) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.slot_path(slot);
        Box::pin(async move {
            let staging = path.with_extension("json.tmp");
            fs::write(&staging, json)
                .map_err(|e| StorageError::io(format!("writing {}", staging.display()), e))?;
            fs::rename(&staging, &path)
                .map_err(|e| StorageError::io(format!("replacing {}", path.display()), e))
        })
    }

    fn get(&self, slot: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let path = self.slot_path(slot);
        Box::pin(async move {
            match fs::read_to_string(&path) {
                Ok(json) => Ok(Some(json)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StorageError::io(format!("reading {}", path.display()), e)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentError, SceneDocument};
    use crate::shapes::{Drawable, Shape, ShapeKind};
    use crate::storage::{block_on, read_document, write_document};
    use kurbo::Point;
    use tempfile::tempdir;

    fn document() -> SceneDocument {
        SceneDocument {
            objects: vec![Drawable::Shape(Shape::new(
                ShapeKind::Hexagon,
                Point::new(0.0, 0.0),
                Point::new(30.0, 20.0),
            ))],
            scale: 2.0,
            offset_x: 10.0,
            offset_y: -10.0,
        }
    }

    #[test]
    fn test_round_trip_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        block_on(write_document(&storage, "retro", &document())).unwrap();
        assert!(dir.path().join("retro.json").exists());
        assert!(!dir.path().join("retro.json.tmp").exists());
        assert_eq!(block_on(read_document(&storage, "retro")).unwrap(), document());
    }

    #[test]
    fn test_missing_file_is_empty_slot() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        assert_eq!(block_on(storage.get("nothing")).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_a_document_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(dir.path().join("broken.json"), "{\"objects\": 3}").unwrap();

        let result = block_on(read_document(&storage, "broken"));
        assert!(matches!(result, Err(StorageError::Document(DocumentError::Json(_)))));
    }

    #[test]
    fn test_slot_names_stay_inside_dir() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        block_on(storage.put("../team/board:1", "{}".to_string())).unwrap();
        assert!(dir.path().join("___team_board_1.json").exists());
        assert_eq!(
            block_on(storage.get("../team/board:1")).unwrap().as_deref(),
            Some("{}")
        );
    }
}
