/*!
 * Command handlers
 *
 * Each handler receives the connector it should talk through; nothing here
 * reaches for a global client.
 */

use std::path::Path;
use thermal_connect::{ThermalConnector, ThermalTransport};
use thermal_proto::{default_profile, default_profiles, Profile};
use tracing::info;

use crate::error::{CliError, Result};

/// Fetch the profile currently applied on the device
pub async fn get<T: ThermalTransport>(connector: &ThermalConnector<T>) -> Result<Profile> {
    Ok(connector.get_current_profile().await.into_result()?)
}

/// Replace the device profile with the one described in a JSON file
pub async fn set<T: ThermalTransport>(
    connector: &ThermalConnector<T>,
    path: &Path,
) -> Result<Profile> {
    let profile = read_profile(path)?;
    info!("Applying profile '{}' from {}", profile.name, path.display());
    Ok(connector.update_profile(profile).await.into_result()?)
}

/// Replace the device profile with one of the built-in profiles
pub async fn apply<T: ThermalTransport>(
    connector: &ThermalConnector<T>,
    name: &str,
) -> Result<Profile> {
    let profile =
        default_profile(name).ok_or_else(|| CliError::UnknownProfile(name.to_string()))?;
    info!("Applying built-in profile '{}'", profile.name);
    Ok(connector.update_profile(profile).await.into_result()?)
}

/// Built-in profiles rendered as a JSON array
pub fn defaults() -> Result<String> {
    Ok(serde_json::to_string_pretty(&default_profiles())?)
}

pub fn read_profile(path: &Path) -> Result<Profile> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn render_profile(profile: &Profile) -> Result<String> {
    Ok(serde_json::to_string_pretty(profile)?)
}
