//! Applying a saved image as the desktop wallpaper via `gsettings`.

use crate::error::{NewswallError, Result};
use std::path::Path;
use tokio::process::Command;

/// Desktop sessions with a known wallpaper schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopEnv {
    /// GNOME Shell.
    Gnome,
    /// Cinnamon. Unknown session names land here too.
    Cinnamon,
}

impl DesktopEnv {
    /// Parses a session name, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("gnome") {
            DesktopEnv::Gnome
        } else {
            DesktopEnv::Cinnamon
        }
    }
}

/// Absolute `file://` URI for a path, spaces escaped for gsettings.
pub fn file_uri(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)?;
    let escaped = absolute.to_string_lossy().replace(' ', "%20");
    Ok(format!("file://{escaped}"))
}

/// Sets the image at `path` as the current wallpaper.
///
/// Only `picture-uri` is required to succeed; the dark variant and the
/// zoom fill mode are applied best-effort.
pub async fn apply(path: &Path, desktop: DesktopEnv) -> Result<()> {
    let uri = file_uri(path)?;
    match desktop {
        DesktopEnv::Gnome => {
            let schema = "org.gnome.desktop.background";
            set_gsettings(schema, "picture-uri", &uri).await?;
            if let Err(e) = set_gsettings(schema, "picture-uri-dark", &uri).await {
                tracing::debug!("optional gsettings key failed: {e}");
            }
            if let Err(e) = set_gsettings(schema, "picture-options", "zoom").await {
                tracing::debug!("optional gsettings key failed: {e}");
            }
        }
        DesktopEnv::Cinnamon => {
            let schema = "org.cinnamon.desktop.background";
            set_gsettings(schema, "picture-uri", &uri).await?;
            if let Err(e) = set_gsettings(schema, "picture-options", "zoom").await {
                tracing::debug!("optional gsettings key failed: {e}");
            }
        }
    }
    Ok(())
}

async fn set_gsettings(schema: &str, key: &str, value: &str) -> Result<()> {
    tracing::debug!(%schema, %key, %value, "gsettings set");
    let output = Command::new("gsettings")
        .args(["set", schema, key, value])
        .output()
        .await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NewswallError::DesktopEnv(format!(
            "gsettings set {schema} {key} failed: {}",
            stderr.trim()
        )));
    }
    Ok(())
}
