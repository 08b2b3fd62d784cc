//! Deterministic asset file names
//!
//! The art generator writes one image and one trait file per item, named by
//! the item's 1-based index zero-padded to four digits.

use std::path::{Path, PathBuf};

/// File name prefix shared by every generated asset
pub const ASSET_PREFIX: &str = "paras-avatar";

/// Zero-pad an item index to four digits (`7` → `"0007"`)
#[inline]
#[must_use]
pub fn pad_index(index: u32) -> String {
    format!("{index:04}")
}

/// File names for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNames {
    /// 1-based item index
    pub index: u32,
    /// Image file name (`paras-avatar_NNNN_large.png`)
    pub image: String,
    /// Trait file name (`paras-avatar_NNNN.json`)
    pub traits: String,
}

impl AssetNames {
    /// Derive the file names for an item
    #[must_use]
    pub fn for_index(index: u32) -> Self {
        let padded = pad_index(index);
        Self {
            index,
            image: format!("{ASSET_PREFIX}_{padded}_large.png"),
            traits: format!("{ASSET_PREFIX}_{padded}.json"),
        }
    }

    /// Join the names onto the build directory
    #[must_use]
    pub fn resolve(&self, build_path: &Path) -> AssetPaths {
        AssetPaths {
            index: self.index,
            image: build_path.join(&self.image),
            traits: build_path.join(&self.traits),
        }
    }
}

/// Full paths for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// 1-based item index
    pub index: u32,
    /// Image file path
    pub image: PathBuf,
    /// Trait file path
    pub traits: PathBuf,
}
