use beatforge::choreography::difficulty::Difficulty;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_SKILL_LEVEL: f32 = 0.5;

#[derive(Parser, Debug)]
#[command(
    name = "beatforge",
    about = "Detect beats in songs and generate rhythm-game levels from them"
)]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG, AAC), processed one after another
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Difficulty to generate; repeat for several (default: all five)
    #[arg(short = 'd', long = "difficulty", value_enum)]
    pub difficulties: Vec<Difficulty>,

    /// Player skill (0.0-1.0); higher keeps more beats on every difficulty
    #[arg(long, default_value_t = DEFAULT_SKILL_LEVEL)]
    pub skill_level: f32,

    /// Seed for reproducible levels (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Config file (default: ./beatforge.toml, then the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Replacement pattern-table JSON file
    #[arg(long)]
    pub patterns: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeatable_difficulty() {
        let cli = Cli::parse_from([
            "beatforge",
            "-d",
            "hard",
            "--difficulty",
            "expert-plus",
            "song.ogg",
        ]);
        assert_eq!(cli.difficulties, vec![Difficulty::Hard, Difficulty::ExpertPlus]);
        assert_eq!(cli.inputs, vec![PathBuf::from("song.ogg")]);
        assert_eq!(cli.skill_level, DEFAULT_SKILL_LEVEL);
    }

    #[test]
    fn requires_an_input() {
        assert!(Cli::try_parse_from(["beatforge"]).is_err());
    }
}
