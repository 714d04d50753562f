use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use calclock_core::ticker::EventPolicy;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Provider configurations (OAuth credentials)
    #[serde(default)]
    pub providers: Providers,

    /// Render loop and ticker settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Physical panel settings (only used with `--display matrix`)
    #[serde(default)]
    pub matrix: MatrixConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct Providers {
    pub gcal: Option<GcalConfig>,
}

/// OAuth credentials for Google Calendar
#[derive(Debug, Clone, Deserialize)]
pub struct GcalConfig {
    pub client_id: String,
    pub client_secret: String,

    /// Calendar to read events from
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Which of today's events make it into the ticker
    pub events: EventPolicy,

    /// Seconds between calendar refreshes
    pub refresh_secs: u64,

    /// Frames per second for the render loop
    pub fps: u32,

    /// Pixels the ticker moves per frame
    pub scroll_step: i32,

    /// Logical pixel size of the display
    pub width: u32,
    pub height: u32,

    /// Text colors as RGB triples
    pub clock_color: [u8; 3],
    pub ticker_color: [u8; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            events: EventPolicy::default(),
            refresh_secs: 300,
            fps: 30,
            scroll_step: 2,
            width: 256,
            height: 64,
            clock_color: [255, 255, 0],
            ticker_color: [0, 255, 255],
        }
    }
}

/// Physical panel geometry, mirroring the rpi-rgb-led-matrix options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub rows: u32,
    pub cols: u32,
    pub chain_length: u32,
    pub brightness: u8,
    pub hardware_mapping: String,

    /// BDF font used on the panel, and its glyph width in pixels
    pub font: String,
    pub font_width: u32,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            rows: 64,
            cols: 64,
            chain_length: 4,
            brightness: 60,
            hardware_mapping: "adafruit-hat".to_string(),
            font: "/usr/share/fonts/bdf/7x13.bdf".to_string(),
            font_width: 7,
        }
    }
}

/// Tokens for the authenticated Google account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Get the config directory path (~/.config/calclock)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("calclock");
    Ok(config_dir)
}

/// Get the config file path (~/.config/calclock/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the tokens file path (~/.config/calclock/tokens.json)
pub fn tokens_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("tokens.json"))
}

/// Load config from ~/.config/calclock/config.toml
pub fn load_config() -> Result<Config> {
    let path = config_path()?;

    if !path.exists() {
        anyhow::bail!(
            "Config file not found at {}\n\n\
            Create it with your Google OAuth credentials:\n\n\
            [providers.gcal]\n\
            client_id = \"your-client-id.apps.googleusercontent.com\"\n\
            client_secret = \"your-client-secret\"\n\n\
            Then run `calclock auth` to grant calendar access.",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    Ok(config)
}

/// Load tokens from ~/.config/calclock/tokens.json, if any were stored
pub fn load_tokens() -> Result<Option<AccountTokens>> {
    let path = tokens_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read tokens file at {}", path.display()))?;

    let tokens: AccountTokens = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse tokens file at {}", path.display()))?;

    Ok(Some(tokens))
}

/// Save tokens to ~/.config/calclock/tokens.json
pub fn save_tokens(tokens: &AccountTokens) -> Result<()> {
    let path = tokens_path()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
    }

    let contents = serde_json::to_string_pretty(tokens).context("Failed to serialize tokens")?;

    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write tokens file at {}", path.display()))?;

    // Owner-only, since the file holds OAuth tokens
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_defaults_match_original_clock() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.display.refresh_secs, 300);
        assert_eq!(cfg.display.fps, 30);
        assert_eq!(cfg.display.scroll_step, 2);
        assert_eq!(cfg.display.events, EventPolicy::WholeDay);
    }

    #[test]
    fn test_event_policy_parses_from_kebab_case() {
        let cfg: Config = toml::from_str("[display]\nevents = \"active\"").unwrap();
        assert_eq!(cfg.display.events, EventPolicy::Active);

        let cfg: Config = toml::from_str("[display]\nevents = \"whole-day\"").unwrap();
        assert_eq!(cfg.display.events, EventPolicy::WholeDay);
    }

    #[test]
    fn test_gcal_calendar_id_defaults_to_primary() {
        let cfg: Config =
            toml::from_str("[providers.gcal]\nclient_id = \"id\"\nclient_secret = \"secret\"")
                .unwrap();
        assert_eq!(cfg.providers.gcal.unwrap().calendar_id, "primary");
    }
}
