use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Vec<u8>,
}

impl Asset {
    pub fn as_str(&self) -> anyhow::Result<&str> {
        std::str::from_utf8(&self.bytes).context("Asset isn't valid utf-8.")
    }
}

/// Reads files once and keeps them around, keyed by the path they were loaded from.
pub struct Loader {
    root: PathBuf,
    assets: HashMap<PathBuf, Asset>,
}

impl Loader {
    pub fn new() -> Self {
        Self::with_root(".")
    }

    /// Relative paths are resolved against `root`.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            assets: HashMap::new(),
        }
    }

    pub fn path<S: AsRef<Path>>(&self, path: S) -> PathBuf {
        self.root.join(path)
    }

    pub fn get<S: AsRef<Path>>(&self, path: S) -> anyhow::Result<&Asset> {
        self.assets
            .get(path.as_ref())
            .ok_or(anyhow!("{} hasn't been loaded.", path.as_ref().display()))
    }

    pub fn load<S: AsRef<Path>>(&mut self, path: S) -> anyhow::Result<&Asset> {
        let key = path.as_ref().to_path_buf();
        let full_path = self.path(&key);
        let mut file = File::open(&full_path)
            .with_context(|| format!("Couldn't open {}", full_path.display()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        log::debug!("loaded {} ({} bytes)", full_path.display(), bytes.len());

        self.assets.insert(key.clone(), Asset { bytes });
        self.get(key)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tx_asset_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_relative_to_root() {
        let dir = scratch_dir("root");
        File::create(dir.join("hello.txt"))
            .unwrap()
            .write_all(b"hello\nworld")
            .unwrap();

        let mut loader = Loader::with_root(&dir);
        let asset = loader.load("hello.txt").unwrap();
        assert_eq!(asset.as_str().unwrap(), "hello\nworld");
        assert_eq!(loader.get("hello.txt").unwrap().bytes.len(), 11);
    }

    #[test]
    fn unloaded_and_missing_files_are_errors() {
        let dir = scratch_dir("missing");
        let mut loader = Loader::with_root(&dir);
        assert!(loader.get("nope.txt").is_err());
        let err = loader.load("nope.txt").unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn binary_assets_are_not_text() {
        let asset = Asset {
            bytes: vec![0xff, 0xfe],
        };
        assert!(asset.as_str().is_err());
    }
}
