//! Skeleton file pair naming and scoped file access
//!
//! ```text
//! {root}/{dataset}/{algorithm}-{X:03}x{Y:03}x{Z:03}-upsample-skeleton.pts
//! {root}/{dataset}/{algorithm}-{X:03}x{Y:03}x{Z:03}-endpoint-vectors.vec
//! ```
//!
//! `X, Y, Z` is the downsample resolution the skeletons were thinned at.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SkeletonError};
use crate::formats::{POINTS_EXT, VECTORS_EXT};
use crate::meta::DatasetMeta;

/// Suffix appended to a file name while it is being written
const PARTIAL_SUFFIX: &str = ".partial";

/// The two sibling files that together hold a dataset's skeletons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonPaths {
    pub points: PathBuf,
    pub vectors: PathBuf,
}

impl SkeletonPaths {
    pub fn new(points: impl Into<PathBuf>, vectors: impl Into<PathBuf>) -> Self {
        Self {
            points: points.into(),
            vectors: vectors.into(),
        }
    }

    pub fn for_dataset(meta: &DatasetMeta) -> Self {
        let dir = meta.skeletons.root.join(&meta.name);
        Self::in_dir(
            &dir,
            &meta.skeletons.algorithm,
            meta.skeletons.downsample_resolution,
        )
    }

    /// `downsample_resolution` is `(z, y, x)`; names list it as `x`, `y`, `z`.
    pub fn in_dir(dir: &Path, algorithm: &str, downsample_resolution: [u64; 3]) -> Self {
        let [z, y, x] = downsample_resolution;
        let stem = format!("{algorithm}-{x:03}x{y:03}x{z:03}");
        Self {
            points: dir.join(format!("{stem}-upsample-skeleton.{POINTS_EXT}")),
            vectors: dir.join(format!("{stem}-endpoint-vectors.{VECTORS_EXT}")),
        }
    }

    /// Open both files for reading. Neither handle is returned unless both open.
    pub fn open(&self) -> Result<(BufReader<File>, BufReader<File>)> {
        let points =
            File::open(&self.points).map_err(|e| SkeletonError::file(&self.points, e))?;
        let vectors =
            File::open(&self.vectors).map_err(|e| SkeletonError::file(&self.vectors, e))?;
        Ok((BufReader::new(points), BufReader::new(vectors)))
    }

    pub fn exists(&self) -> bool {
        self.points.is_file() && self.vectors.is_file()
    }

    /// Write both files through `write`, publishing them under their final
    /// names only once `write` has succeeded for both.
    ///
    /// Output goes to `*.partial` siblings first, which are removed on failure.
    /// If the vectors file cannot be moved into place, the points file already
    /// moved is removed again, so neither final name holds the new output.
    pub fn write_with<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>, &mut BufWriter<File>) -> Result<()>,
    {
        for path in [&self.points, &self.vectors] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| SkeletonError::file(parent, e))?;
            }
        }

        let points_tmp = partial_path(&self.points);
        let vectors_tmp = partial_path(&self.vectors);

        let result = Self::write_partials(&points_tmp, &vectors_tmp, write).and_then(|()| {
            fs::rename(&points_tmp, &self.points)
                .map_err(|e| SkeletonError::file(&self.points, e))?;
            fs::rename(&vectors_tmp, &self.vectors).map_err(|e| {
                // Never leave the points file published without its vectors
                let _ = fs::remove_file(&self.points);
                SkeletonError::file(&self.vectors, e)
            })
        });

        if result.is_err() {
            // Best effort cleanup
            let _ = fs::remove_file(&points_tmp);
            let _ = fs::remove_file(&vectors_tmp);
        } else {
            debug!(
                points = %self.points.display(),
                vectors = %self.vectors.display(),
                "wrote skeleton file pair"
            );
        }
        result
    }

    fn write_partials<F>(points_tmp: &Path, vectors_tmp: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>, &mut BufWriter<File>) -> Result<()>,
    {
        let points = File::create(points_tmp).map_err(|e| SkeletonError::file(points_tmp, e))?;
        let vectors =
            File::create(vectors_tmp).map_err(|e| SkeletonError::file(vectors_tmp, e))?;
        let mut points = BufWriter::new(points);
        let mut vectors = BufWriter::new(vectors);

        write(&mut points, &mut vectors)?;

        for (writer, path) in [(points, points_tmp), (vectors, vectors_tmp)] {
            let file = writer
                .into_inner()
                .map_err(|e| SkeletonError::file(path, e.into_error()))?;
            file.sync_all().map_err(|e| SkeletonError::file(path, e))?;
        }
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_naming() {
        let paths = SkeletonPaths::in_dir(Path::new("skeletons/SNEMI3D"), "thinning", [30, 80, 60]);
        assert_eq!(
            paths.points,
            PathBuf::from("skeletons/SNEMI3D/thinning-060x080x030-upsample-skeleton.pts")
        );
        assert_eq!(
            paths.vectors,
            PathBuf::from("skeletons/SNEMI3D/thinning-060x080x030-endpoint-vectors.vec")
        );
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("a/b.pts")),
            PathBuf::from("a/b.pts.partial")
        );
    }

    #[test]
    fn test_open_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SkeletonPaths::in_dir(dir.path(), "thinning", [80, 80, 80]);
        assert!(!paths.exists());
        assert!(matches!(paths.open(), Err(SkeletonError::File { .. })));
    }
}
