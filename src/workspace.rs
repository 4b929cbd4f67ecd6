//! Paths and lookup for the `netmap/` directory.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

const DIR: &str = "netmap";

/// Walk upward from `start` to find the directory containing `netmap/inventory.json`.
pub fn find_root_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        if inventory_path(dir).exists() {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => bail!("no netmap inventory found; run `netmap init` to create one"),
        }
    }
}

/// Walk upward from the current working directory to find the inventory root.
pub fn find_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    find_root_from(&cwd)
}

pub fn netmap_dir(root: &Path) -> PathBuf {
    root.join(DIR)
}

pub fn inventory_path(root: &Path) -> PathBuf {
    netmap_dir(root).join("inventory.json")
}

pub fn config_path(root: &Path) -> PathBuf {
    netmap_dir(root).join("config.netmap")
}

pub fn log_path(root: &Path) -> PathBuf {
    netmap_dir(root).join("netmap.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init(dir: &Path) {
        fs::create_dir_all(netmap_dir(dir)).unwrap();
        fs::write(inventory_path(dir), "{}").unwrap();
    }

    #[test]
    fn root_is_found_in_the_start_directory() {
        let dir = TempDir::new().unwrap();
        init(dir.path());
        let root = find_root_from(dir.path()).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn root_is_found_from_a_nested_directory() {
        let dir = TempDir::new().unwrap();
        init(dir.path());
        fs::create_dir_all(dir.path().join("site/floor-2")).unwrap();
        let root = find_root_from(&dir.path().join("site/floor-2")).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn missing_inventory_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A bare `netmap/` directory is not an inventory.
        fs::create_dir_all(netmap_dir(dir.path())).unwrap();
        let err = find_root_from(dir.path()).unwrap_err();
        assert!(err.to_string().contains("netmap init"), "error should say how to fix it: {err}");
    }
}
