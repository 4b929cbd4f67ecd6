//! `netmap init`: create an inventory in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use crossterm::style::Stylize;
use tracing::info;

use crate::graph::demo::demo_store;
use crate::graph::store::EntityStore;
use crate::parser::config::{self, Config};
use crate::parser::inventory::{JsonFile, Persistence};
use crate::workspace;

/// Entry point called from `main`.
pub fn run(sample: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    run_in(&root, sample)
}

/// Run init inside `root`. With `sample`, the inventory is seeded with the
/// demo network instead of starting empty.
pub fn run_in(root: &Path, sample: bool) -> Result<()> {
    let inventory_path = workspace::inventory_path(root);
    if inventory_path.exists() {
        bail!("netmap is already initialised (netmap/inventory.json exists).");
    }
    fs::create_dir_all(workspace::netmap_dir(root))?;

    let store = if sample {
        demo_store()?
    } else {
        EntityStore::new()
    };
    JsonFile::new(&inventory_path).save(&store)?;
    println!("  {} netmap/inventory.json", "Created".green().bold());

    // An existing config is a user's edit; keep it.
    let config_path = workspace::config_path(root);
    if !config_path.exists() {
        fs::write(&config_path, config::serialize(&Config::default()))?;
        println!("  {} netmap/config.netmap", "Created".green().bold());
    }

    if sample {
        println!(
            "  {} {} devices across {} profiles",
            "Seeded".cyan().bold(),
            store.devices().len().to_string().green(),
            store.profiles().len().to_string().green()
        );
    }
    info!(root = %root.display(), sample, "inventory initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_empty_inventory_with_default_profile() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path(), false).unwrap();

        let store = JsonFile::new(workspace::inventory_path(dir.path()))
            .load()
            .unwrap();
        assert!(store.devices().is_empty());
        assert_eq!(store.profiles().len(), 1);
        assert!(store.active_profile().is_default());
    }

    #[test]
    fn creates_config_with_defaults() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path(), false).unwrap();
        let content = fs::read_to_string(workspace::config_path(dir.path())).unwrap();
        assert!(content.contains("zoom_step: 1.2"));
        assert_eq!(config::parse(&content).unwrap(), Config::default());
    }

    #[test]
    fn sample_seeds_demo_network() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path(), true).unwrap();
        let store = JsonFile::new(workspace::inventory_path(dir.path()))
            .load()
            .unwrap();
        assert_eq!(store.devices().len(), 3);
        assert!(store.profile("server-room").is_some());
    }

    #[test]
    fn does_not_overwrite_existing_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(workspace::netmap_dir(dir.path())).unwrap();
        fs::write(workspace::config_path(dir.path()), "theme: dark\n").unwrap();
        run_in(dir.path(), false).unwrap();
        let content = fs::read_to_string(workspace::config_path(dir.path())).unwrap();
        assert_eq!(content, "theme: dark\n");
    }

    #[test]
    fn error_if_already_initialised() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path(), false).unwrap();
        assert!(run_in(dir.path(), true).is_err());
    }
}
