//! Dataset metadata
//!
//! Maps a dataset identifier to its physical resolution, grid size and the
//! settings that name its skeleton file pair. Metadata files are TOML:
//!
//! ```toml
//! resolution = [30.0, 6.0, 6.0]   # z, y, x
//! grid_size = [100, 1024, 1024]   # z, y, x
//!
//! [segmentation]
//! path = "raw/SNEMI3D.h5"
//! dataset = "main"
//!
//! [skeletons]
//! root = "skeletons"
//! algorithm = "thinning"
//! downsample_resolution = [80, 80, 80]
//! ```

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkeletonError};
use crate::grid::{GridSize, Resolution};

/// Extension of dataset metadata files
pub const META_EXT: &str = "toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Dataset identifier; defaults to the name the dataset was resolved by
    #[serde(default)]
    pub name: String,
    /// Physical voxel size (z, y, x)
    pub resolution: Resolution,
    /// Grid the skeleton indices are flattened over (z, y, x)
    pub grid_size: GridSize,
    #[serde(default)]
    pub segmentation: Option<SegmentationSource>,
    #[serde(default)]
    pub skeletons: SkeletonSection,
}

/// Where the labeled volume lives. Only carried through; never opened here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationSource {
    pub path: PathBuf,
    /// Dataset inside the container file (first dataset if unset)
    #[serde(default)]
    pub dataset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonSection {
    /// Directory holding one sub-directory per dataset
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Resolution (z, y, x) the volume was downsampled to before thinning
    #[serde(default = "default_downsample_resolution")]
    pub downsample_resolution: [u64; 3],
}

fn default_root() -> PathBuf {
    PathBuf::from("skeletons")
}

fn default_algorithm() -> String {
    "thinning".to_string()
}

fn default_downsample_resolution() -> [u64; 3] {
    [80, 80, 80]
}

impl Default for SkeletonSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            algorithm: default_algorithm(),
            downsample_resolution: default_downsample_resolution(),
        }
    }
}

impl DatasetMeta {
    pub fn new(name: impl Into<String>, resolution: Resolution, grid_size: GridSize) -> Self {
        Self {
            name: name.into(),
            resolution,
            grid_size,
            segmentation: None,
            skeletons: SkeletonSection::default(),
        }
    }

    /// Parse metadata for `dataset` from TOML text.
    pub fn parse(dataset: &str, content: &str) -> Result<Self> {
        let mut meta: Self = toml::from_str(content).map_err(|e| SkeletonError::Metadata {
            dataset: dataset.to_string(),
            message: e.to_string(),
        })?;
        if meta.name.is_empty() {
            meta.name = dataset.to_string();
        }
        Ok(meta)
    }
}

/// Resolves a dataset identifier to its metadata.
pub trait MetadataResolver {
    fn resolve(&self, dataset: &str) -> Result<DatasetMeta>;
}

/// Reads `{meta_dir}/{dataset}.toml`.
#[derive(Debug, Clone)]
pub struct TomlMetadataResolver {
    meta_dir: PathBuf,
}

impl TomlMetadataResolver {
    pub fn new(meta_dir: impl Into<PathBuf>) -> Self {
        Self {
            meta_dir: meta_dir.into(),
        }
    }

    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    pub fn meta_path(&self, dataset: &str) -> PathBuf {
        self.meta_dir.join(format!("{dataset}.{META_EXT}"))
    }
}

impl MetadataResolver for TomlMetadataResolver {
    fn resolve(&self, dataset: &str) -> Result<DatasetMeta> {
        let path = self.meta_path(dataset);
        let content = std::fs::read_to_string(&path).map_err(|e| SkeletonError::Metadata {
            dataset: dataset.to_string(),
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        DatasetMeta::parse(dataset, &content)
    }
}

/// In-memory metadata, for callers that already know their datasets.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataResolver {
    datasets: HashMap<String, DatasetMeta>,
}

impl StaticMetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, meta: DatasetMeta) -> Self {
        self.insert(meta);
        self
    }

    pub fn insert(&mut self, meta: DatasetMeta) {
        self.datasets.insert(meta.name.clone(), meta);
    }
}

impl MetadataResolver for StaticMetadataResolver {
    fn resolve(&self, dataset: &str) -> Result<DatasetMeta> {
        self.datasets
            .get(dataset)
            .cloned()
            .ok_or_else(|| SkeletonError::Metadata {
                dataset: dataset.to_string(),
                message: "unknown dataset".to_string(),
            })
    }
}
