//! Profile, credential and history subcommand handlers.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use smartfill_core::HistoryStore;
use smartfill_protocols::{keys, Credential, Profile, StateStore, StateStoreExt};

use crate::cli::{CredentialAction, HistoryAction, ProfileAction};
use crate::UserError;

async fn load_profile(store: &dyn StateStore) -> Result<Profile, Box<dyn std::error::Error>> {
    Ok(store.get_as::<Profile>(keys::USER_PROFILE).await?.unwrap_or_default())
}

/// Handle profile subcommands.
pub(crate) async fn handle_profile_command(
    store: Arc<dyn StateStore>,
    action: ProfileAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProfileAction::Show => profile_show(store.as_ref()).await,
        ProfileAction::Set { key, value } => profile_set(store.as_ref(), &key, &value).await,
        ProfileAction::Import { file } => profile_import(store.as_ref(), &file).await,
    }
}

async fn profile_show(store: &dyn StateStore) -> Result<(), Box<dyn std::error::Error>> {
    let profile = load_profile(store).await?;
    if profile.is_empty() {
        println!("No profile set. Start with: smartfill profile set name \"Your Name\"");
        return Ok(());
    }

    let width = profile.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in profile.iter() {
        println!("{:<width$}  {}", key, value, width = width);
    }
    if !profile.is_complete() {
        println!("\nProfile is incomplete: set at least your name.");
    }
    Ok(())
}

async fn profile_set(
    store: &dyn StateStore,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !Profile::KNOWN_KEYS.contains(&key) {
        warn!("'{}' is not a standard profile key; storing it anyway", key);
    }

    let mut profile = load_profile(store).await?;
    if value.trim().is_empty() {
        profile.remove(key);
        println!("Removed {}.", key);
    } else {
        profile.set(key, value);
        println!("Set {}.", key);
    }
    store.set_as(keys::USER_PROFILE, &profile).await?;
    Ok(())
}

async fn profile_import(store: &dyn StateStore, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(file).await?;
    let imported: Profile = serde_json::from_str(&raw).map_err(|e| {
        UserError(format!(
            "{} must be a JSON object of string values: {}",
            file.display(),
            e
        ))
    })?;

    let count = imported.iter().count();
    let mut profile = load_profile(store).await?;
    profile.merge(imported);
    store.set_as(keys::USER_PROFILE, &profile).await?;

    info!("Imported {} profile attributes from {}", count, file.display());
    println!("Imported {} attributes.", count);
    Ok(())
}

/// Handle credential subcommands.
pub(crate) async fn handle_credential_command(
    store: Arc<dyn StateStore>,
    action: CredentialAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CredentialAction::Set { key } => {
            let credential = Credential::new(key);
            if credential.is_blank() {
                return Err(UserError("The API key must not be empty.".to_string()).into());
            }
            store.set_as(keys::API_KEY, &credential).await?;
            println!("API key saved.");
            Ok(())
        }
    }
}

/// Handle history subcommands.
pub(crate) async fn handle_history_command(
    store: Arc<dyn StateStore>,
    action: Option<HistoryAction>,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = HistoryStore::new(store);
    match action.unwrap_or(HistoryAction::List {
        format: "table".to_string(),
    }) {
        HistoryAction::List { format } => history_list(&history, &format).await,
        HistoryAction::Clear => {
            history.clear().await?;
            println!("History cleared.");
            Ok(())
        }
    }
}

async fn history_list(history: &HistoryStore, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let entries = history.list().await?;
    if entries.is_empty() {
        println!("No fills recorded.");
        return Ok(());
    }

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            println!("{:<20} {:<7} {}", "WHEN", "FIELDS", "URL");
            println!("{}", "-".repeat(80));
            for entry in entries {
                println!(
                    "{:<20} {:<7} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.fields_count,
                    entry.url
                );
            }
        }
    }
    Ok(())
}
