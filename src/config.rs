use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::intensity::IntensityParams;
use crate::analysis::onset::OnsetThresholds;
use crate::choreography::difficulty::Difficulty;
use crate::error::{Error, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    #[serde(default = "default_fine_window_size")]
    pub fine_window_size: usize,
    #[serde(default = "default_fine_hop_size")]
    pub fine_hop_size: usize,
    #[serde(default = "default_focus_seconds")]
    pub focus_seconds: f64,
    #[serde(default = "default_min_intensity")]
    pub min_intensity: f32,
    #[serde(default = "default_min_delta")]
    pub min_delta: f32,
    #[serde(default = "default_merge_seconds")]
    pub merge_seconds: f64,
    #[serde(default = "default_flux_epsilon")]
    pub flux_epsilon: f32,
    #[serde(default = "default_threshold_seconds")]
    pub threshold_seconds: f64,
    #[serde(default = "default_median_seconds")]
    pub median_seconds: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_skill_level")]
    pub skill_level: f32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_difficulties")]
    pub difficulties: Vec<Difficulty>,
    #[serde(default = "default_lead_in_seconds")]
    pub lead_in_seconds: f64,
    /// Replacement pattern-table file; the embedded tables are used otherwise.
    #[serde(default)]
    pub patterns: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            hop_size: default_hop_size(),
            fine_window_size: default_fine_window_size(),
            fine_hop_size: default_fine_hop_size(),
            focus_seconds: default_focus_seconds(),
            min_intensity: default_min_intensity(),
            min_delta: default_min_delta(),
            merge_seconds: default_merge_seconds(),
            flux_epsilon: default_flux_epsilon(),
            threshold_seconds: default_threshold_seconds(),
            median_seconds: default_median_seconds(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            skill_level: default_skill_level(),
            seed: None,
            difficulties: default_difficulties(),
            lead_in_seconds: default_lead_in_seconds(),
            patterns: None,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 || self.fine_window_size < 2 {
            return Err(Error::invalid_input("analysis window sizes must be at least 2"));
        }
        if self.hop_size == 0 || self.fine_hop_size == 0 {
            return Err(Error::invalid_input("analysis hop sizes must be positive"));
        }
        if self.fine_hop_size > self.hop_size {
            return Err(Error::invalid_input(format!(
                "fine_hop_size {} must not exceed hop_size {}",
                self.fine_hop_size, self.hop_size
            )));
        }
        let seconds = [
            ("focus_seconds", self.focus_seconds),
            ("merge_seconds", self.merge_seconds),
            ("threshold_seconds", self.threshold_seconds),
            ("median_seconds", self.median_seconds),
        ];
        for (name, value) in seconds {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::invalid_input(format!(
                    "{} must be a non-negative number (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn onset_thresholds(&self) -> OnsetThresholds {
        OnsetThresholds {
            min_intensity: self.min_intensity,
            min_delta: self.min_delta,
        }
    }

    pub fn intensity_params(&self) -> IntensityParams {
        IntensityParams {
            flux_epsilon: self.flux_epsilon,
            threshold_seconds: self.threshold_seconds,
            median_seconds: self.median_seconds,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.skill_level) {
            return Err(Error::invalid_input(format!(
                "skill level must lie in [0, 1] (got {})",
                self.skill_level
            )));
        }
        if !(self.lead_in_seconds.is_finite() && self.lead_in_seconds >= 0.0) {
            return Err(Error::invalid_input("lead-in must be a non-negative number"));
        }
        if self.difficulties.is_empty() {
            return Err(Error::configuration("no difficulties requested"));
        }
        Ok(())
    }
}

fn default_window_size() -> usize { 4096 }
fn default_hop_size() -> usize { 1024 }
fn default_fine_window_size() -> usize { 1024 }
fn default_fine_hop_size() -> usize { 128 }
fn default_focus_seconds() -> f64 { 0.5 }
fn default_min_intensity() -> f32 { 0.75 }
fn default_min_delta() -> f32 { 0.75 }
fn default_merge_seconds() -> f64 { 0.125 }
fn default_flux_epsilon() -> f32 { 1e-5 }
fn default_threshold_seconds() -> f64 { 1.5 }
fn default_median_seconds() -> f64 { 1.0 }
fn default_skill_level() -> f32 { 0.5 }
fn default_difficulties() -> Vec<Difficulty> { Difficulty::ALL.to_vec() }
fn default_lead_in_seconds() -> f64 { 4.0 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.analysis.window_size, 4096);
        assert_eq!(cfg.analysis.fine_hop_size, 128);
        assert_eq!(cfg.generation.skill_level, 0.5);
        assert_eq!(cfg.generation.difficulties.len(), 5);
        assert!(cfg.generation.seed.is_none());
    }

    #[test]
    fn partial_sections() {
        let cfg: Config = toml::from_str(
            r#"
            [analysis]
            merge_seconds = 0.2

            [generation]
            seed = 7
            difficulties = ["hard", "expert-plus"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.analysis.merge_seconds, 0.2);
        assert_eq!(cfg.analysis.hop_size, 1024);
        assert_eq!(cfg.generation.seed, Some(7));
        assert_eq!(
            cfg.generation.difficulties,
            vec![Difficulty::Hard, Difficulty::ExpertPlus]
        );
    }

    #[test]
    fn rejects_out_of_range_skill() {
        let cfg = GenerationConfig {
            skill_level: 1.5,
            ..GenerationConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejects_zero_hop() {
        let cfg = AnalysisConfig {
            hop_size: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejects_fine_hop_coarser_than_hop() {
        let cfg = AnalysisConfig {
            fine_hop_size: 2048,
            ..AnalysisConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn missing_file_is_none() {
        assert!(load_config(Path::new("/no/such/beatforge.toml")).is_none());
    }
}
