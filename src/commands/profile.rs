//! `netmap profile ...`: manage map profiles and device membership.

use std::path::Path;

use anyhow::Result;
use crossterm::style::Stylize;

use crate::commands::{edit_store, load_store};
use crate::graph::error::{StoreError, StoreResult};
use crate::graph::model::Profile;
use crate::graph::store::EntityStore;
use crate::parser::config;
use crate::workspace;

pub fn list(root: &Path) -> Result<()> {
    let store = load_store(root)?;
    for line in profile_lines(&store) {
        println!("  {}", line);
    }
    Ok(())
}

pub fn show(root: &Path, id: &str) -> Result<()> {
    let store = load_store(root)?;
    for line in profile_details(&store, id)? {
        println!("  {}", line);
    }
    Ok(())
}

pub fn add(
    root: &Path,
    id: &str,
    name: &str,
    description: Option<String>,
    background: Option<String>,
) -> Result<()> {
    let config = config::load(&workspace::config_path(root))?;
    let mut profile = Profile::new(id, name);
    profile.description = description;
    profile.background = background;
    profile.config = config.profile_defaults;
    edit_store(root, |store| store.add_profile(profile))?;
    println!("  {} profile `{}`", "Added".green().bold(), id);
    Ok(())
}

pub fn delete(root: &Path, id: &str) -> Result<()> {
    edit_store(root, |store| store.delete_profile(id))?;
    println!("  {} profile `{}`", "Deleted".green().bold(), id);
    Ok(())
}

pub fn assign(root: &Path, device_id: &str, profile_id: &str) -> Result<()> {
    edit_store(root, |store| store.assign_device_to_profile(device_id, profile_id))?;
    println!(
        "  {} `{}` to `{}`",
        "Assigned".green().bold(),
        device_id,
        profile_id
    );
    Ok(())
}

pub fn unassign(root: &Path, device_id: &str, profile_id: &str) -> Result<()> {
    edit_store(root, |store| store.remove_device_from_profile(device_id, profile_id))?;
    println!(
        "  {} `{}` from `{}`",
        "Removed".green().bold(),
        device_id,
        profile_id
    );
    Ok(())
}

pub fn activate(root: &Path, id: &str) -> Result<()> {
    edit_store(root, |store| store.set_active_profile(id))?;
    println!("  {} `{}`", "Active profile".cyan().bold(), id);
    Ok(())
}

fn profile_lines(store: &EntityStore) -> Vec<String> {
    let membership = store.membership();
    store
        .profiles()
        .iter()
        .map(|profile| {
            let marker = if profile.id == store.active_profile_id() {
                "*"
            } else {
                " "
            };
            let count = membership.devices_in_profile(&profile.id).len();
            format!(
                "{marker} {:<14} {:<20} {} device{}",
                profile.id,
                profile.name,
                count,
                if count == 1 { "" } else { "s" }
            )
        })
        .collect()
}

fn profile_details(store: &EntityStore, id: &str) -> StoreResult<Vec<String>> {
    let profile = store
        .profile(id)
        .ok_or_else(|| StoreError::profile_not_found(id))?;
    let mut lines = vec![format!("{} ({})", profile.name, profile.id)];
    if let Some(description) = &profile.description {
        lines.push(description.clone());
    }
    if let Some(background) = &profile.background {
        lines.push(format!("map: {background}"));
    }
    lines.push(format!(
        "layout: {}  auto_arrange: {}  show_labels: {}  theme: {}",
        profile.config.layout.label(),
        profile.config.auto_arrange,
        profile.config.show_labels,
        profile.config.theme.label()
    ));
    for device in store.membership().devices_in_profile(id) {
        let at = device.anchor(id);
        lines.push(format!(
            "  {:<12} {:<7} ({:.1}, {:.1})",
            device.id, device.device_type, at.x, at.y
        ));
    }
    Ok(lines)
}
