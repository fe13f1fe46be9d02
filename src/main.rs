mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use beatforge::audio::decode::decode_audio;
use beatforge::choreography::patterns::PatternLibrary;
use beatforge::config::{self, AnalysisConfig, Config, GenerationConfig};
use beatforge::rng;
use beatforge::song::{process_song, SongDocument};
use cli::{Cli, DEFAULT_SKILL_LEVEL};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect beatforge.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("beatforge.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("beatforge").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("beatforge").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    let cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    // Merge: config values apply only when CLI is at its default
    if cli.skill_level == DEFAULT_SKILL_LEVEL { cli.skill_level = cfg.generation.skill_level; }
    if cli.seed.is_none() { cli.seed = cfg.generation.seed; }
    if cli.difficulties.is_empty() { cli.difficulties = cfg.generation.difficulties.clone(); }
    if cli.patterns.is_none() { cli.patterns = cfg.generation.patterns.clone(); }

    let generation = GenerationConfig {
        skill_level: cli.skill_level,
        seed: cli.seed,
        difficulties: cli.difficulties.clone(),
        lead_in_seconds: cfg.generation.lead_in_seconds,
        patterns: cli.patterns.clone(),
    };
    generation.validate().context("Invalid generation settings")?;
    cfg.analysis.validate().context("Invalid analysis settings")?;

    for input in &cli.inputs {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }
    }

    let library = match generation.patterns {
        Some(ref path) => {
            log::info!("Pattern tables: {}", path.display());
            PatternLibrary::from_file(path)
        }
        None => PatternLibrary::embedded(),
    }
    .context("Failed to load pattern tables")?;

    let seed = generation.seed.unwrap_or_else(rng::random_seed);
    let names: Vec<&str> = generation.difficulties.iter().map(|d| d.name()).collect();
    log::info!("beatforge - beat detection and level generation");
    log::info!("Songs: {}, difficulties: {}", cli.inputs.len(), names.join(", "));
    log::info!("Skill level: {:.2}, seed: {}", generation.skill_level, seed);

    let pb = ProgressBar::new(cli.inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} songs {msg}")?
            .progress_chars("=>-"),
    );

    for input in &cli.inputs {
        pb.set_message(input.display().to_string());
        let document = run_song(input, &cfg.analysis, &generation, &library, seed, &pb)?;
        let out_path = output_path(input, cli.output.as_deref())?;
        write_document(&document, &out_path, cli.pretty)?;
        pb.println(format!(
            "{} -> {} ({:.1} BPM, {} beats)",
            input.display(),
            out_path.display(),
            document.analysis.bpm,
            document.analysis.beats.len()
        ));
        pb.inc(1);
    }

    pb.finish_with_message("done");
    log::info!("Done! {} song(s) processed", cli.inputs.len());
    Ok(())
}

/// Decode and process one song on a worker thread while the spinner turns.
fn run_song(
    input: &Path,
    analysis: &AnalysisConfig,
    generation: &GenerationConfig,
    library: &PatternLibrary,
    seed: u64,
    pb: &ProgressBar,
) -> Result<SongDocument> {
    let source = input.display().to_string();
    let worker_name = format!(
        "song-{}",
        input.file_stem().and_then(|s| s.to_str()).unwrap_or("input")
    );

    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name(worker_name)
            .spawn_scoped(scope, || -> Result<SongDocument> {
                log::info!("Decoding {}...", source);
                let waveform = decode_audio(input)?;
                process_song(&source, &waveform, analysis, generation, library, seed)
                    .with_context(|| format!("Failed to process {}", source))
            })
            .context("Failed to spawn worker thread")?;

        while !handle.is_finished() {
            pb.tick();
            std::thread::sleep(Duration::from_millis(100));
        }
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("Worker thread for {} panicked", source))?
    })
}

fn output_path(input: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Input has no usable file name: {}", input.display()))?;
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok(dir.join(format!("{}.beatforge.json", stem)))
}

fn write_document(document: &SongDocument, path: &Path, pretty: bool) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }
    let json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
