pub mod device;
pub mod init;
pub mod list;
pub mod profile;
pub mod view;

use std::path::Path;

use anyhow::Result;

use crate::graph::error::StoreResult;
use crate::graph::store::EntityStore;
use crate::parser::inventory::{JsonFile, Persistence};
use crate::workspace;

fn load_store(root: &Path) -> Result<EntityStore> {
    JsonFile::new(workspace::inventory_path(root)).load()
}

/// Load the inventory, apply one store operation, and save it back. Nothing
/// is written when the operation fails.
fn edit_store<T>(
    root: &Path,
    edit: impl FnOnce(&mut EntityStore) -> StoreResult<T>,
) -> Result<T> {
    let file = JsonFile::new(workspace::inventory_path(root));
    let mut store = file.load()?;
    let out = edit(&mut store)?;
    file.save(&store)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::error::StoreError;
    use crate::graph::model::Profile;
    use tempfile::TempDir;

    #[test]
    fn failed_edit_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        init::run_in(dir.path(), false).unwrap();
        let path = workspace::inventory_path(dir.path());
        let before = std::fs::read_to_string(&path).unwrap();

        let err = edit_store(dir.path(), |store| store.delete_profile("nope")).unwrap_err();
        assert!(err.downcast_ref::<StoreError>().is_some(), "got: {err:#}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn successful_edit_is_saved() {
        let dir = TempDir::new().unwrap();
        init::run_in(dir.path(), false).unwrap();
        edit_store(dir.path(), |store| store.add_profile(Profile::new("lab", "Lab"))).unwrap();
        assert!(load_store(dir.path()).unwrap().profile("lab").is_some());
    }
}
