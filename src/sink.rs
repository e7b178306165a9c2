//! Destinations for generated assets.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{IconError, Result};
use crate::generator::GeneratedAsset;

/// Receives the files of an icon pack.
pub trait AssetSink {
    fn write_asset(&mut self, asset: &GeneratedAsset) -> Result<()>;

    /// Writes every asset in order, stopping at the first failure.
    fn write_all(&mut self, assets: &[GeneratedAsset]) -> Result<()> {
        assets.iter().try_for_each(|asset| self.write_asset(asset))
    }
}

/// Collects assets in memory.
impl AssetSink for Vec<GeneratedAsset> {
    fn write_asset(&mut self, asset: &GeneratedAsset) -> Result<()> {
        self.push(asset.clone());
        Ok(())
    }
}

/// Writes assets as a folder tree under `root`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an asset path below the root, rejecting anything that could
    /// escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        let safe = !relative.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(IconError::config(format!(
                "asset path '{relative}' must stay inside the output directory"
            )));
        }
        Ok(self.root.join(path))
    }
}

impl AssetSink for DirectorySink {
    fn write_asset(&mut self, asset: &GeneratedAsset) -> Result<()> {
        let target = self.resolve(&asset.path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &asset.bytes)?;
        log::debug!("wrote {} ({} bytes)", target.display(), asset.bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sink_creates_folders() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.write_all(&[
            GeneratedAsset::new("ios-assets/icon-20.png", vec![1, 2, 3]),
            GeneratedAsset::new("icon.svg", "<svg/>"),
        ])
        .unwrap();

        assert_eq!(
            fs::read(dir.path().join("ios-assets/icon-20.png")).unwrap(),
            vec![1, 2, 3]
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("icon.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn directory_sink_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.write_asset(&GeneratedAsset::new("a/b.png", vec![1])).unwrap();
        sink.write_asset(&GeneratedAsset::new("a/b.png", vec![2, 2])).unwrap();
        assert_eq!(fs::read(dir.path().join("a/b.png")).unwrap(), vec![2, 2]);
    }

    #[test]
    fn directory_sink_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out"));
        for bad in ["../evil.png", "/etc/evil.png", "a/../../evil.png", "./x.png", ""] {
            let err = sink
                .write_asset(&GeneratedAsset::new(bad, vec![0]))
                .unwrap_err();
            assert!(err.is_config(), "{bad:?} should be rejected");
        }
        assert!(!dir.path().join("evil.png").exists());
    }

    #[test]
    fn vec_sink_keeps_order() {
        let mut sink: Vec<GeneratedAsset> = Vec::new();
        sink.write_all(&[
            GeneratedAsset::new("b", vec![]),
            GeneratedAsset::new("a", vec![]),
        ])
        .unwrap();
        let paths: Vec<_> = sink.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["b", "a"]);
    }
}
