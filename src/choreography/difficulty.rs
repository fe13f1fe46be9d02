use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Expert,
    ExpertPlus,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::ExpertPlus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
            Difficulty::ExpertPlus => "expert-plus",
        }
    }

    fn spacing_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.5,
            Difficulty::Expert => 0.3,
            Difficulty::ExpertPlus => 0.0,
        }
    }

    /// Radius of the thinning merge; more skill means denser levels.
    pub fn merge_radius_seconds(self, skill_level: f32) -> f64 {
        self.spacing_multiplier() * (1.0 - skill_level as f64)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_scales_with_skill() {
        assert_eq!(Difficulty::Easy.merge_radius_seconds(0.0), 1.5);
        assert_eq!(Difficulty::Normal.merge_radius_seconds(0.5), 0.5);
        assert_eq!(Difficulty::Easy.merge_radius_seconds(1.0), 0.0);
        assert_eq!(Difficulty::ExpertPlus.merge_radius_seconds(0.0), 0.0);
    }

    #[test]
    fn easier_levels_merge_wider() {
        for pair in Difficulty::ALL.windows(2) {
            assert!(pair[0].merge_radius_seconds(0.2) >= pair[1].merge_radius_seconds(0.2));
        }
    }

    #[test]
    fn names_match_value_enum() {
        for d in Difficulty::ALL {
            let parsed = Difficulty::from_str(d.name(), true).unwrap();
            assert_eq!(parsed, d);
        }
    }
}
