//! Wheel settings and preferences
//!
//! Persisted as one flat JSON document. Missing fields fall back to defaults,
//! so partial documents merge over the defaults. Settings are validated when
//! saved and sanitized (clamped, with a warning) when loaded.

use serde::{Deserialize, Serialize};

use crate::consts::{SAFE_MARGIN_CLAMP_PERCENT, SAFE_MARGIN_LIMIT_PERCENT};
use crate::error::{Result, SpinError};

/// Spin motion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfiguration {
    /// Fewest extra full turns per spin (>= 1)
    pub min_revolutions: u32,
    /// Most extra full turns per spin (>= min)
    pub max_revolutions: u32,
    /// Fixed part of the spin duration (> 0)
    #[serde(rename = "base_duration")]
    pub base_duration_ms: u64,
    /// Added duration per revolution
    #[serde(rename = "duration_per_revolution")]
    pub duration_per_revolution_ms: u64,
    /// Share of each slice edge where the pointer may not stop, in [0, 50)
    pub safe_margin_percent: f64,
}

impl Default for SpinConfiguration {
    fn default() -> Self {
        Self {
            min_revolutions: 10,
            max_revolutions: 20,
            base_duration_ms: 2000,
            duration_per_revolution_ms: 1000,
            safe_margin_percent: 5.0,
        }
    }
}

impl SpinConfiguration {
    /// Duration of a spin with the given revolution count
    pub fn duration_for(&self, revolutions: u32) -> u64 {
        self.base_duration_ms
            .saturating_add(self.duration_per_revolution_ms.saturating_mul(revolutions as u64))
    }

    /// Reject values that would break the animation
    pub fn validate(&self) -> Result<()> {
        if self.min_revolutions < 1 {
            return Err(SpinError::ConfigurationInvalid(
                "min_revolutions must be at least 1".into(),
            ));
        }
        if self.max_revolutions < self.min_revolutions {
            return Err(SpinError::ConfigurationInvalid(format!(
                "max_revolutions ({}) is below min_revolutions ({})",
                self.max_revolutions, self.min_revolutions
            )));
        }
        if self.base_duration_ms == 0 {
            return Err(SpinError::ConfigurationInvalid(
                "base_duration must be positive".into(),
            ));
        }
        let margin = self.safe_margin_percent;
        if !margin.is_finite() || !(0.0..SAFE_MARGIN_LIMIT_PERCENT).contains(&margin) {
            return Err(SpinError::ConfigurationInvalid(format!(
                "safe_margin_percent must be in [0, {}), got {}",
                SAFE_MARGIN_LIMIT_PERCENT, margin
            )));
        }
        Ok(())
    }

    /// Clamp every field to its nearest valid value
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.min_revolutions < 1 {
            log::warn!("min_revolutions {} raised to 1", self.min_revolutions);
            self.min_revolutions = 1;
        }
        if self.max_revolutions < self.min_revolutions {
            log::warn!(
                "max_revolutions {} raised to {}",
                self.max_revolutions,
                self.min_revolutions
            );
            self.max_revolutions = self.min_revolutions;
        }
        if self.base_duration_ms == 0 {
            log::warn!("base_duration 0 replaced by {}", defaults.base_duration_ms);
            self.base_duration_ms = defaults.base_duration_ms;
        }
        let margin = self.safe_margin_percent;
        if !margin.is_finite() {
            log::warn!("safe_margin_percent {} replaced by {}", margin, defaults.safe_margin_percent);
            self.safe_margin_percent = defaults.safe_margin_percent;
        } else if margin < 0.0 {
            log::warn!("safe_margin_percent {} raised to 0", margin);
            self.safe_margin_percent = 0.0;
        } else if margin >= SAFE_MARGIN_LIMIT_PERCENT {
            log::warn!(
                "safe_margin_percent {} lowered to {}",
                margin,
                SAFE_MARGIN_CLAMP_PERCENT
            );
            self.safe_margin_percent = SAFE_MARGIN_CLAMP_PERCENT;
        }
        self
    }
}

/// Sound preferences (volumes are percentages)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub spin_sound_volume: u8,
    pub winner_sound_volume: u8,
    /// Stored for the music track; playback needs uploaded media, so nothing reads it
    pub background_music_volume: u8,
    pub enable_spin_sound: bool,
    pub enable_winner_sound: bool,
    pub background_music_enabled: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            spin_sound_volume: 70,
            winner_sound_volume: 80,
            background_music_volume: 50,
            enable_spin_sound: true,
            enable_winner_sound: true,
            background_music_enabled: false,
        }
    }
}

impl AudioSettings {
    /// Effective spin sound gain (0.0 - 1.0)
    pub fn spin_gain(&self) -> f32 {
        if self.enable_spin_sound {
            percent_to_gain(self.spin_sound_volume)
        } else {
            0.0
        }
    }

    /// Effective winner sound gain (0.0 - 1.0)
    pub fn winner_gain(&self) -> f32 {
        if self.enable_winner_sound {
            percent_to_gain(self.winner_sound_volume)
        } else {
            0.0
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("spin_sound_volume", self.spin_sound_volume),
            ("winner_sound_volume", self.winner_sound_volume),
            ("background_music_volume", self.background_music_volume),
        ] {
            if value > 100 {
                return Err(SpinError::ConfigurationInvalid(format!(
                    "{} must be at most 100, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        for (name, value) in [
            ("spin_sound_volume", &mut self.spin_sound_volume),
            ("winner_sound_volume", &mut self.winner_sound_volume),
            ("background_music_volume", &mut self.background_music_volume),
        ] {
            if *value > 100 {
                log::warn!("{} {} lowered to 100", name, value);
                *value = 100;
            }
        }
        self
    }
}

fn percent_to_gain(percent: u8) -> f32 {
    (percent.min(100) as f32) / 100.0
}

/// Visual preferences (applied to the page, not validated)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub title: String,
    pub title_text_color: String,
    pub title_border_color: String,
    pub title_border_enabled: bool,
    pub title_border_width: u32,
    pub pointer_color: String,
    pub wheel_border_color: String,
    pub spin_button_color: String,
    pub spin_button_text: String,
    pub spin_button_shadow: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            title: "WHEEL OF FORTUNE".to_string(),
            title_text_color: "#000000".to_string(),
            title_border_color: "#000000".to_string(),
            title_border_enabled: false,
            title_border_width: 2,
            pointer_color: "#d9534f".to_string(),
            wheel_border_color: "#ffcc00".to_string(),
            spin_button_color: "#5cb85c".to_string(),
            spin_button_text: "SPIN THE WHEEL".to_string(),
            spin_button_shadow: "#4cae4c".to_string(),
        }
    }
}

impl Appearance {
    /// CSS `text-shadow` outlining the title, or `none` when the border is off
    pub fn title_text_shadow(&self) -> String {
        if !self.title_border_enabled || self.title_border_width == 0 {
            return "none".to_string();
        }
        let w = self.title_border_width;
        let c = &self.title_border_color;
        format!(
            "-{w}px -{w}px 0 {c}, {w}px -{w}px 0 {c}, -{w}px {w}px 0 {c}, {w}px {w}px 0 {c}"
        )
    }

    /// CSS `box-shadow` under the spin button
    pub fn spin_button_box_shadow(&self) -> String {
        format!("0 4px {}", self.spin_button_shadow)
    }
}

/// Complete persisted settings document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSettings {
    #[serde(flatten)]
    pub spin: SpinConfiguration,
    #[serde(flatten)]
    pub audio: AudioSettings,
    #[serde(flatten)]
    pub appearance: Appearance,
}

impl WheelSettings {
    /// Check before saving; invalid settings are rejected, never stored
    pub fn validate(&self) -> Result<()> {
        self.spin.validate()?;
        self.audio.validate()
    }

    /// Repair settings read from storage
    pub fn sanitized(self) -> Self {
        Self {
            spin: self.spin.sanitized(),
            audio: self.audio.sanitized(),
            appearance: self.appearance,
        }
    }
}
