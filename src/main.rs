//! Purewave - band-limited tones and colored noise

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use purewave::config::{self, PurewaveConfig};
use purewave::engine::{self, AudioBackend, MixGraph, OfflineRenderer, Player, Recorder};
use purewave::synth::ToneMode;

mod cli;

use cli::{Cli, Commands, ToneArgs};

/// Samples inspected by `analyze`
const ANALYZE_WINDOW: usize = 4096;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { config: config_path, tone } => {
            let mut cfg = config::load_or_default(&config_path)?;
            apply_tone_args(&mut cfg, &tone);
            let spec = cfg.tone.spec()?;

            let player = Player::open(
                cfg.audio.device.as_deref(),
                Some(cfg.audio.sample_rate),
                Some(cfg.audio.buffer_size),
            )?;
            let sample_rate = player.sample_rate();

            let mut graph = MixGraph::new(player);
            graph.set_gain(cfg.tone.gain_db);
            graph.set_tone_mode(cfg.tone.tone_mode()).await?;
            graph.play(spec).await?;

            println!("Playing {} at {} Hz ({} harmonics)", spec.kind(), spec.frequency_hz(), spec.harmonic_count());
            println!("  Sample rate: {} Hz", sample_rate);
            println!("  Gain: {} dBFS ({:.4} linear)", graph.gain_db(), graph.linear_gain());
            println!("  Mode: {}", mode_name(graph.tone_mode()));
            println!("Press Ctrl-C to stop.");

            let running = Arc::new(AtomicBool::new(true));
            let flag = running.clone();
            ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
                .context("failed to install Ctrl-C handler")?;

            let chain = graph.chain();
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(1)).await;

                // Skip this tick rather than stall the output callback
                let Some(recent) = engine::try_tap_snapshot(&chain) else {
                    continue;
                };
                match engine::peak_frequency(&recent, sample_rate as f64) {
                    Some(hz) => tracing::info!("peak estimate {:.1} Hz", hz),
                    None => tracing::info!("peak estimate: silent"),
                }
            }

            graph.shutdown();
            println!("\nStopped.");
        }

        Commands::Render {
            config: config_path,
            tone,
            duration,
            sample_rate,
            output,
        } => {
            let mut cfg = config::load_or_default(&config_path)?;
            apply_tone_args(&mut cfg, &tone);
            if let Some(duration) = duration {
                cfg.render.duration = duration;
            }
            if let Some(rate) = sample_rate {
                cfg.render.sample_rate = rate;
            }
            cfg.validate()?;

            let spec = cfg.tone.spec()?;
            let gain_db = tone.gain.unwrap_or(cfg.render.gain_db);

            println!(
                "Rendering {} seconds of {} at {} Hz...",
                cfg.render.duration,
                spec.kind(),
                spec.frequency_hz()
            );

            let pcm = OfflineRenderer::new(cfg.render.sample_rate)
                .gain_db(gain_db)
                .tone_mode(cfg.tone.tone_mode())
                .render(&spec, cfg.render.duration)?;

            let recorder = match output {
                Some(output) => Recorder::new(output),
                None => Recorder::in_dir(&cfg.render.output_dir),
            };
            let path = recorder.save(&spec, &pcm)?;

            println!("  Samples: {}", pcm.len());
            println!("Rendered to {:?}", path);
        }

        Commands::Analyze { file } => {
            let (samples, sample_rate) = read_wav(&file).await?;
            let start = samples.len().saturating_sub(ANALYZE_WINDOW);
            let window = &samples[start..];

            println!("{:?}", file);
            println!("  Sample rate: {} Hz", sample_rate);
            println!("  Duration: {:.3} s", samples.len() as f64 / sample_rate as f64);
            match engine::peak_frequency(window, sample_rate as f64) {
                Some(hz) => println!(
                    "  Fundamental: ~{:.1} Hz (bin width {:.2} Hz)",
                    hz,
                    sample_rate as f64 / window.len() as f64
                ),
                None => println!("  Fundamental: none (silent)"),
            }
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            if let Some(name) = engine::default_device_name() {
                println!("Default output: {}\n", name);
            }

            println!("Output devices:");
            let devices = engine::list_output_devices();
            if devices.is_empty() {
                println!("  (none)");
            }
            for (name, config) in devices {
                println!("  - {} ({} Hz, {} ch)", name, config.sample_rate.0, config.channels);
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    print_summary(&cfg);
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../purewave.example.yaml");

            let path = "purewave.yaml";
            if Path::new(path).exists() {
                println!("purewave.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)
                    .with_context(|| format!("failed to write {}", path))?;
                println!("Created purewave.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

/// Command-line values win over the config file
fn apply_tone_args(cfg: &mut PurewaveConfig, args: &ToneArgs) {
    if let Some(waveform) = &args.waveform {
        cfg.tone.waveform = waveform.clone();
    }
    if let Some(frequency) = args.frequency {
        cfg.tone.frequency = frequency;
    }
    if let Some(harmonics) = args.harmonics {
        cfg.tone.harmonics = harmonics;
    }
    if let Some(gain) = args.gain {
        cfg.tone.gain_db = gain;
    }
    if args.raw {
        cfg.tone.clear_tone = false;
    }
    cfg.sanitize();
}

fn mode_name(mode: ToneMode) -> &'static str {
    match mode {
        ToneMode::ClearTone => "clear tone",
        ToneMode::RawTone => "raw tone",
    }
}

fn print_summary(cfg: &PurewaveConfig) {
    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
    println!("  Buffer size: {}", cfg.audio.buffer_size);
    println!(
        "  Device: {}",
        cfg.audio.device.as_deref().unwrap_or("(default)")
    );
    match cfg.tone.spec() {
        Ok(spec) => println!(
            "  Tone: {} at {} Hz, {} harmonics, {} dBFS, {}",
            spec.kind(),
            spec.frequency_hz(),
            spec.harmonic_count(),
            cfg.tone.gain_db,
            mode_name(cfg.tone.tone_mode())
        ),
        Err(e) => println!("  Tone: invalid ({})", e),
    }
    let spec = cfg.tone.spec().ok();
    println!(
        "  Render: {} s at {} Hz, {} dBFS -> {}",
        cfg.render.duration,
        cfg.render.sample_rate,
        cfg.render.gain_db,
        match spec {
            Some(spec) => Path::new(&cfg.render.output_dir)
                .join(spec.file_name(cfg.render.sample_rate))
                .display()
                .to_string(),
            None => cfg.render.output_dir.clone(),
        }
    );
}

/// Read a WAV file as mono f32, keeping the first channel
async fn read_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {:?}", path))?;
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .with_context(|| format!("not a WAV file: {:?}", path))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if interleaved.is_empty() {
        bail!("{:?} contains no samples", path);
    }

    let samples = interleaved.into_iter().step_by(channels).collect();
    Ok((samples, spec.sample_rate))
}
