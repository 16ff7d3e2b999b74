//! spacegen - procedural space game asset generator
//!
//! Generates pixel-art sprites (PNG) and sound effects (WAV) from parameter
//! schemas, palettes and seeds, one at a time or from a TOML manifest.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;

use spacegen::audio::{
    self, BitcrushParams, DistortionParams, FilterParams, GranularParams, PitchShiftParams,
    SampleProcessor, SliceParams, SynthParams,
};
use spacegen::palette::{LEGACY_PALETTES, PALETTE_PRESETS, rgb_to_hex};
use spacegen::params::{ParameterManager, builtin_schema};
use spacegen::seed::{RandomSource, ambient, generate_seed, sample_rng};
use spacegen::sprite::SpriteKind;

use spacegen_cli::overrides::parse_overrides;
use spacegen_cli::render::{DEFAULT_PALETTE, SoundJob, SpriteJob, render_sound, render_sprite};
use spacegen_cli::manifest;

#[derive(Parser)]
#[command(name = "spacegen")]
#[command(about = "Procedural sprite and sound effect generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one sprite or animation
    Sprite {
        /// ship, asteroid, projectile, effect, background, laser or scanner
        kind: String,

        /// Output file stem and item id for seed derivation
        #[arg(short, long)]
        name: Option<String>,

        /// Tier preset from the kind's schema
        #[arg(short, long)]
        preset: Option<String>,

        /// Parameter override, repeatable (e.g. --set size=48)
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Palette preset, legacy palette, or comma-separated hex colors
        #[arg(long, default_value = DEFAULT_PALETTE)]
        palette: String,

        /// Explicit seed (derived from kind/name/variant otherwise)
        #[arg(long)]
        seed: Option<u32>,

        /// Variant used in seed derivation
        #[arg(long)]
        variant: Option<String>,

        /// Randomize parameters within their variance bands
        #[arg(long)]
        randomize: bool,

        /// Pack animation frames into a single sprite sheet
        #[arg(long)]
        sheet: bool,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Render a named sound effect preset
    Sfx {
        /// Preset key (see `spacegen presets`)
        preset: String,

        /// Output file stem
        #[arg(short, long)]
        name: Option<String>,

        /// Random detune amount, e.g. 0.1 for +/-10%
        #[arg(long, default_value_t = 0.0)]
        variation: f32,

        /// Seed for the variation
        #[arg(long)]
        seed: Option<u32>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Render a sound from a JSON synthesis description
    Synth {
        /// JSON file: {"method": "fm", "params": {...}}
        params: PathBuf,

        /// Output file stem (defaults to the params file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Process a WAV sample
    Sample {
        /// Input WAV file
        input: PathBuf,

        /// Operation to apply
        #[arg(value_enum)]
        op: SampleOp,

        /// Operation parameters as inline JSON
        #[arg(long)]
        params: Option<String>,

        /// Seed for granular and shuffled-slice randomness (ambient otherwise)
        #[arg(long)]
        seed: Option<u32>,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Build every asset listed in a manifest
    Build {
        /// Path to the manifest
        #[arg(default_value = "spacegen.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a manifest without generating anything
    Check {
        /// Path to the manifest
        #[arg(default_value = "spacegen.toml")]
        manifest: PathBuf,
    },

    /// Print the seed derived from asset identifiers
    Seed {
        asset_type: String,
        item_id: String,
        #[arg(long, default_value = "default")]
        variant: String,
        #[arg(long, default_value_t = 0)]
        frame: u32,
    },

    /// List palettes
    Palettes,

    /// List sprite tier presets and sound effect presets
    Presets {
        /// Restrict to one sprite kind
        kind: Option<String>,
    },

    /// Print a kind's parameter values and variance bands as JSON
    Params {
        kind: String,

        /// Apply a tier preset first
        #[arg(short, long)]
        preset: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SampleOp {
    Reverse,
    Pitch,
    Granular,
    Slice,
    Filter,
    Distort,
    Crush,
}

/// Registry key the input sample is loaded under
const INPUT: &str = "input";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sprite {
            kind,
            name,
            preset,
            overrides,
            palette,
            seed,
            variant,
            randomize,
            sheet,
            output,
        } => {
            let kind: SpriteKind = kind.parse()?;
            let job = SpriteJob {
                name: name.unwrap_or_else(|| kind.to_string()),
                kind,
                preset,
                palette,
                seed,
                variant,
                randomize,
                sheet,
                params: parse_overrides(&overrides)?,
            };
            for path in render_sprite(&job, &output)? {
                println!("{}", path.display());
            }
        }

        Commands::Sfx {
            preset,
            name,
            variation,
            seed,
            output,
        } => {
            let mut job = SoundJob::preset(name.unwrap_or_else(|| preset.clone()), preset);
            job.variation = variation;
            job.seed = seed;
            for path in render_sound(&job, &output)? {
                println!("{}", path.display());
            }
        }

        Commands::Synth {
            params,
            name,
            output,
        } => {
            let text = std::fs::read_to_string(&params)
                .with_context(|| format!("Failed to read {:?}", params))?;
            let synth: SynthParams = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse synthesis params {:?}", params))?;
            let name = name.unwrap_or_else(|| file_stem(&params));
            for path in render_sound(&SoundJob::synth(name, synth), &output)? {
                println!("{}", path.display());
            }
        }

        Commands::Sample {
            input,
            op,
            params,
            seed,
            output,
        } => {
            let bytes =
                std::fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
            let mut processor = SampleProcessor::new();
            let info = processor.load_bytes(INPUT, &bytes)?;
            tracing::info!(
                "Loaded {:?} ({:.2}s, {} ch, {} Hz)",
                input,
                info.duration,
                info.channels,
                info.sample_rate
            );

            let params = params.as_deref();
            let result = match seed {
                Some(seed) => process_sample(&mut processor, op, params, &mut sample_rng(seed))?,
                None => process_sample(&mut processor, op, params, &mut ambient())?,
            };
            audio::write_wav(&result, &output)?;
            println!("{}", output.display());
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building assets from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let report = manifest::build_all(&config, output.as_deref())?;
            tracing::info!(
                "Build complete: {} sprite(s), {} sound(s), {} file(s)",
                report.sprites,
                report.sounds,
                report.files.len()
            );
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Seed {
            asset_type,
            item_id,
            variant,
            frame,
        } => {
            println!("{}", generate_seed(&asset_type, &item_id, &variant, frame));
        }

        Commands::Palettes => {
            for preset in &PALETTE_PRESETS {
                let p = preset.palette;
                println!(
                    "{:<16} {} {} {} {}  {}",
                    preset.key,
                    rgb_to_hex(p.primary.r, p.primary.g, p.primary.b),
                    rgb_to_hex(p.secondary.r, p.secondary.g, p.secondary.b),
                    rgb_to_hex(p.accent.r, p.accent.g, p.accent.b),
                    rgb_to_hex(p.dark.r, p.dark.g, p.dark.b),
                    preset.description
                );
            }
            for (name, colors) in &LEGACY_PALETTES {
                println!("{:<16} {}  (legacy)", name, colors.join(" "));
            }
        }

        Commands::Presets { kind } => {
            let kinds = match kind {
                Some(kind) => vec![kind.parse::<SpriteKind>()?],
                None => SpriteKind::ALL.to_vec(),
            };
            for kind in kinds {
                let schema = builtin_schema(kind)?;
                let names: Vec<&str> = schema.tier_presets.keys().map(String::as_str).collect();
                println!("{:<12} {}", kind, names.join(", "));
            }
            for category in audio::SFX_CATEGORIES {
                let keys: Vec<&str> = audio::sfx_presets()
                    .iter()
                    .filter(|p| p.category == category)
                    .map(|p| p.key)
                    .collect();
                println!("sfx/{:<8} {}", category, keys.join(", "));
            }
        }

        Commands::Params { kind, preset } => {
            let kind: SpriteKind = kind.parse()?;
            let mut manager = ParameterManager::new(builtin_schema(kind)?);
            if let Some(preset) = preset
                && !manager.load_preset(&preset)
            {
                bail!("Unknown {} preset '{}'", kind, preset);
            }
            println!("{}", manager.export_json()?);
        }
    }

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sound".to_string())
}

/// Parse operation parameters, defaulting every field when none are given
fn op_params<T: DeserializeOwned + Default>(json: Option<&str>) -> Result<T> {
    match json {
        Some(json) => serde_json::from_str(json).context("Invalid --params JSON"),
        None => Ok(T::default()),
    }
}

fn process_sample(
    processor: &mut SampleProcessor,
    op: SampleOp,
    json: Option<&str>,
    rng: &mut impl RandomSource,
) -> Result<audio::AudioBuffer> {
    let name = INPUT.to_string();
    let out = match op {
        SampleOp::Reverse => processor.reverse(INPUT)?,
        SampleOp::Pitch => {
            let params = PitchShiftParams {
                sample_name: name,
                ..op_params(json)?
            };
            processor.pitch_shift(&params)?
        }
        SampleOp::Granular => {
            let params = GranularParams {
                sample_name: name,
                ..op_params(json)?
            };
            processor.granular(&params, rng)?
        }
        SampleOp::Slice => {
            let params = SliceParams {
                sample_name: name,
                ..op_params(json)?
            };
            processor.slice(&params, rng)?
        }
        SampleOp::Filter => {
            let params = FilterParams {
                sample_name: name,
                ..op_params(json)?
            };
            processor.filter(&params)?
        }
        SampleOp::Distort => {
            let params = DistortionParams {
                sample_name: name,
                ..op_params(json)?
            };
            processor.distortion(&params)?
        }
        SampleOp::Crush => {
            let params = BitcrushParams {
                sample_name: name,
                ..op_params(json)?
            };
            processor.bitcrush(&params)?
        }
    };
    Ok(out)
}
