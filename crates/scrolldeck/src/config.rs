use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::deck::DeckTiming;
use crate::input::InputSettings;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "scrolldeck";

pub const KEYS: &[&str] = &[
    "defaults.theme",
    "defaults.mode",
    "defaults.reduced_motion",
    "timing.settle_ms",
    "timing.stagger_step_ms",
    "timing.glow_offset_px",
    "timing.glow_return_ms",
    "input.wheel_cooldown_ms",
    "input.wheel_threshold",
    "input.swipe_threshold_px",
    "input.key_interval_ms",
    "input.touch_interval_ms",
    "input.click_interval_ms",
];

/// How the deck is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One slide at a time on a horizontal track.
    #[default]
    Deck,
    /// All slides stacked on a scrolling page.
    Scroll,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger_step_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glow_offset_px: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glow_return_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheel_cooldown_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheel_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swipe_threshold_px: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_interval_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_interval_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_interval_ms: Option<u64>,
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("Invalid {key}: {value}. Must be a whole number of milliseconds."))
}

fn parse_px(key: &str, value: &str) -> Result<f32> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => anyhow::bail!("Invalid {key}: {value}. Must be a non-negative number."),
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `scrolldeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# scrolldeck configuration\n{yaml}");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.mode" => {
                let mode = match value {
                    "deck" => Mode::Deck,
                    "scroll" => Mode::Scroll,
                    _ => anyhow::bail!("Invalid mode: {value}. Must be 'deck' or 'scroll'."),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .mode = Some(mode);
            }
            "defaults.reduced_motion" => {
                let on = match value {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => anyhow::bail!("Invalid reduced_motion: {value}. Must be 'true' or 'false'."),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .reduced_motion = Some(on);
            }
            "timing.settle_ms" => {
                let ms = parse_ms(key, value)?;
                if ms == 0 {
                    anyhow::bail!("Invalid timing.settle_ms: 0. Transitions need a settle time.");
                }
                self.timing_mut().settle_ms = Some(ms);
            }
            "timing.stagger_step_ms" => self.timing_mut().stagger_step_ms = Some(parse_ms(key, value)?),
            "timing.glow_offset_px" => self.timing_mut().glow_offset_px = Some(parse_px(key, value)?),
            "timing.glow_return_ms" => self.timing_mut().glow_return_ms = Some(parse_ms(key, value)?),
            "input.wheel_cooldown_ms" => self.input_mut().wheel_cooldown_ms = Some(parse_ms(key, value)?),
            "input.wheel_threshold" => self.input_mut().wheel_threshold = Some(parse_px(key, value)?),
            "input.swipe_threshold_px" => self.input_mut().swipe_threshold_px = Some(parse_px(key, value)?),
            "input.key_interval_ms" => self.input_mut().key_interval_ms = Some(parse_ms(key, value)?),
            "input.touch_interval_ms" => self.input_mut().touch_interval_ms = Some(parse_ms(key, value)?),
            "input.click_interval_ms" => self.input_mut().click_interval_ms = Some(parse_ms(key, value)?),
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {}", KEYS.join(", ")),
        }
        Ok(())
    }

    fn timing_mut(&mut self) -> &mut TimingConfig {
        self.timing.get_or_insert_with(TimingConfig::default)
    }

    fn input_mut(&mut self) -> &mut InputConfig {
        self.input.get_or_insert_with(InputConfig::default)
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn mode(&self) -> Option<Mode> {
        self.defaults.as_ref().and_then(|d| d.mode)
    }

    pub fn reduced_motion(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.reduced_motion)
            .unwrap_or(false)
    }

    /// Deck timing with configured overrides applied.
    pub fn deck_timing(&self) -> DeckTiming {
        let mut timing = DeckTiming::default();
        if let Some(t) = &self.timing {
            if let Some(ms) = t.settle_ms {
                timing.settle = Duration::from_millis(ms.max(1));
            }
            if let Some(ms) = t.stagger_step_ms {
                timing.stagger_step = Duration::from_millis(ms);
            }
            if let Some(px) = t.glow_offset_px {
                timing.glow_offset = px;
            }
            if let Some(ms) = t.glow_return_ms {
                timing.glow_return = Duration::from_millis(ms);
            }
        }
        timing
    }

    /// Input rate limits and thresholds with configured overrides applied.
    pub fn input_settings(&self) -> InputSettings {
        let mut settings = InputSettings::default();
        if let Some(i) = &self.input {
            if let Some(ms) = i.wheel_cooldown_ms {
                settings.wheel_cooldown = Duration::from_millis(ms);
            }
            if let Some(v) = i.wheel_threshold {
                settings.wheel_threshold = v;
            }
            if let Some(px) = i.swipe_threshold_px {
                settings.swipe_threshold = px;
            }
            if let Some(ms) = i.key_interval_ms {
                settings.key_interval = Duration::from_millis(ms);
            }
            if let Some(ms) = i.touch_interval_ms {
                settings.touch_interval = Duration::from_millis(ms);
            }
            if let Some(ms) = i.click_interval_ms {
                settings.click_interval = Duration::from_millis(ms);
            }
        }
        settings
    }
}
