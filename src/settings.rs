use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::overlay::{OverlayStyle, Rgb};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub overlay: OverlayStyle,
    pub text_service: TextServiceSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextServiceSettings {
    pub model: Option<String>,
    pub base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for TextServiceSettings {
    fn default() -> Self {
        Self {
            model: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    overlay: Option<OverlaySettings>,
    text_service: Option<TextServiceFile>,
}

#[derive(Debug, Default, Deserialize)]
struct OverlaySettings {
    mask_color: Option<String>,
    mask_alpha: Option<f32>,
    stroke_color: Option<String>,
    stroke_alpha: Option<f32>,
    stroke_width: Option<f32>,
    highlight_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TextServiceFile {
    model: Option<String>,
    base_url: Option<String>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
}

/// Layers `settings.toml` and `settings.local.toml` from the working directory,
/// then `extra_path` if given. Later files override earlier ones field by field.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut settings = Settings::default();
        settings.merge_str(content)?;
        Ok(settings)
    }

    fn merge_str(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed)
    }

    fn merge(&mut self, incoming: SettingsFile) -> Result<()> {
        if let Some(overlay) = incoming.overlay {
            if let Some(color) = parse_color("overlay.mask_color", overlay.mask_color)? {
                self.overlay.mask_color = color;
            }
            if let Some(alpha) = overlay.mask_alpha {
                self.overlay.mask_alpha = alpha.clamp(0.0, 1.0);
            }
            if let Some(color) = parse_color("overlay.stroke_color", overlay.stroke_color)? {
                self.overlay.stroke_color = color;
            }
            if let Some(alpha) = overlay.stroke_alpha {
                self.overlay.stroke_alpha = alpha.clamp(0.0, 1.0);
            }
            if let Some(width) = overlay.stroke_width {
                if width > 0.0 {
                    self.overlay.stroke_width = Some(width);
                }
            }
            if let Some(color) = parse_color("overlay.highlight_color", overlay.highlight_color)? {
                self.overlay.highlight_color = Some(color);
            }
        }
        if let Some(service) = incoming.text_service {
            if let Some(model) = service.model {
                if !model.trim().is_empty() {
                    self.text_service.model = Some(model);
                }
            }
            if let Some(url) = service.base_url {
                if !url.trim().is_empty() {
                    self.text_service.base_url = url;
                }
            }
            if let Some(secs) = service.connect_timeout_secs {
                if secs > 0 {
                    self.text_service.connect_timeout = Duration::from_secs(secs);
                }
            }
            if let Some(secs) = service.read_timeout_secs {
                if secs > 0 {
                    self.text_service.read_timeout = Duration::from_secs(secs);
                }
            }
        }
        Ok(())
    }
}

fn parse_color(field: &str, value: Option<String>) -> Result<Option<Rgb>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.trim().is_empty() {
        return Ok(None);
    }
    Rgb::from_hex(&value)
        .map(Some)
        .ok_or_else(|| anyhow!("{} must be #rrggbb, got '{}'", field, value))
}
