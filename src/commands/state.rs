//! `envrunner state show|reset`.

use std::collections::BTreeMap;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::request::{RunForm, SECRET_KEY};
use crate::store::StateStore;

/// Execute `state show`: print every form value, saved or default.
///
/// # Errors
///
/// Returns an error string if the state file is unreadable.
pub fn show(ctx: &ServiceContext, settings: &Settings) -> Result<(), String> {
    let store = StateStore::new(ctx, &settings.state_file);
    let saved = store.entries()?;
    let form = RunForm::from_entries(&saved);
    println!("State file: {}", store.path().display());
    print!("{}", render(&form.to_entries(), &saved));
    Ok(())
}

/// Execute `state reset`.
///
/// # Errors
///
/// Returns an error string if the state file cannot be removed.
pub fn reset(ctx: &ServiceContext, settings: &Settings) -> Result<(), String> {
    let store = StateStore::new(ctx, &settings.state_file);
    store.reset()?;
    println!("Cleared {}", store.path().display());
    Ok(())
}

/// One `key = value` line per entry, masking the access key and marking
/// values not present in `saved`.
fn render(entries: &BTreeMap<String, String>, saved: &BTreeMap<String, String>) -> String {
    let width = entries.keys().map(String::len).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in entries {
        let shown = if key == SECRET_KEY && !value.is_empty() { "********" } else { value };
        let origin = if saved.contains_key(key) { "" } else { "  (default)" };
        out.push_str(&format!("{key:<width$} = {shown}{origin}\n"));
    }
    out
}
