//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::Confirm;
use std::path::Path;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm replacing an existing export file
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    let message = format!("{} already exists. Overwrite?", path.display());
    confirm_step(&message)
}
