use std::path::PathBuf;

use anyhow::{bail, Result};
use dialoguer::Select;

use kubeconf::KubeConfig;

fn ensure_attended() -> Result<()> {
    if !console::user_attended_stderr() {
        bail!("not running in a terminal, pass the name explicitly");
    }
    Ok(())
}

/// Ask for one of the contexts in `kc`, starting on the current one.
pub fn select_context(kc: &KubeConfig) -> Result<String> {
    let names: Vec<&str> = kc.context_names().into_iter().collect();
    if names.is_empty() {
        bail!("no contexts available");
    }
    ensure_attended()?;

    let current = names
        .iter()
        .position(|name| *name == kc.current_context)
        .unwrap_or(0);

    let index = Select::new()
        .with_prompt("Select a context")
        .items(&names)
        .default(current)
        .interact()?;

    Ok(names[index].to_owned())
}

pub fn select_file(files: &[PathBuf]) -> Result<PathBuf> {
    ensure_attended()?;

    let items: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
    let index = Select::new()
        .with_prompt("Select a kubeconfig file")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(files[index].clone())
}
