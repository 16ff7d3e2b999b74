//! Single-asset jobs shared by the subcommands and manifest builds
//!
//! A job is fully described by its fields; rendering one reads nothing but
//! the job and writes only under the given output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use spacegen::audio::{self, SoundMetadata, SynthParams};
use spacegen::palette::{Palette, legacy_palette, palette_preset};
use spacegen::params::{ParameterManager, builtin_schema};
use spacegen::seed::{SeededRng, generate_seed, seed_from_str};
use spacegen::sprite::{self, SpriteKind};
use spacegen::GenerationParameters;

/// Palette used when a job names none
pub const DEFAULT_PALETTE: &str = "cyber_blue";

fn default_palette() -> String {
    DEFAULT_PALETTE.to_string()
}

/// Resolve a palette by preset key, legacy grid name, or a comma-separated
/// list of 3-4 hex colors
pub fn resolve_palette(palette: &str) -> Result<Palette> {
    if palette.contains(',') {
        let colors: Vec<&str> = palette.split(',').map(str::trim).collect();
        return Palette::from_hex_list(&colors)
            .with_context(|| format!("Invalid palette color list '{}'", palette));
    }
    palette_preset(palette)
        .or_else(|_| legacy_palette(palette))
        .with_context(|| format!("Unknown palette '{}'", palette))
}

/// One sprite (or animation) to generate
#[derive(Debug, Clone, Deserialize)]
pub struct SpriteJob {
    /// Output file stem, also the item id for seed derivation
    pub name: String,
    pub kind: SpriteKind,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default = "default_palette")]
    pub palette: String,
    /// Explicit seed; derived from kind, name and variant when absent
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub variant: Option<String>,
    /// Apply each parameter's variance band before generating
    #[serde(default)]
    pub randomize: bool,
    /// Pack animation frames into one strip instead of one file per frame
    #[serde(default)]
    pub sheet: bool,
    #[serde(default)]
    pub params: GenerationParameters,
}

impl SpriteJob {
    pub fn new(name: impl Into<String>, kind: SpriteKind) -> Self {
        Self {
            name: name.into(),
            kind,
            preset: None,
            palette: default_palette(),
            seed: None,
            variant: None,
            randomize: false,
            sheet: false,
            params: GenerationParameters::new(),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            generate_seed(
                self.kind.as_str(),
                &self.name,
                self.variant.as_deref().unwrap_or("default"),
                0,
            )
        })
    }

    /// Final parameter set: schema defaults, then preset, then overrides
    pub fn resolve_params(&self) -> Result<GenerationParameters> {
        let mut manager = ParameterManager::new(builtin_schema(self.kind)?);
        if let Some(preset) = &self.preset
            && !manager.load_preset(preset)
        {
            let known: Vec<&str> = manager.preset_names().collect();
            bail!(
                "Unknown {} preset '{}' (available: {})",
                self.kind,
                preset,
                known.join(", ")
            );
        }
        manager.set_multiple(&self.params);
        if self.randomize {
            let mut rng = SeededRng::new(self.seed());
            return Ok(manager.all_randomized(&mut rng));
        }
        Ok(manager.values().clone())
    }
}

/// JSON sidecar written next to every sprite
#[derive(Debug, Serialize)]
pub struct SpriteMetadata<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: SpriteKind,
    pub seed: u32,
    pub palette: &'a str,
    pub frames: usize,
    pub width: u32,
    pub height: u32,
    pub files: Vec<String>,
    pub parameters: &'a GenerationParameters,
    pub generator: &'static str,
    pub version: &'static str,
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Generate a sprite job, returning every file written
pub fn render_sprite(job: &SpriteJob, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let params = job.resolve_params()?;
    let palette = resolve_palette(&job.palette)?;
    let seed = job.seed();
    let frames = sprite::generate(job.kind, &params, &palette, seed)
        .with_context(|| format!("Failed to generate {} '{}'", job.kind, job.name))?;

    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();
    if frames.len() == 1 || job.sheet {
        let path = out_dir.join(format!("{}.png", job.name));
        if frames.len() == 1 {
            sprite::write_png(&frames[0], &path)?;
        } else {
            sprite::write_sprite_sheet(&frames, &path)?;
        }
        written.push(path);
    } else {
        for (i, frame) in frames.iter().enumerate() {
            let path = out_dir.join(format!("{}_{:02}.png", job.name, i));
            sprite::write_png(frame, &path)?;
            written.push(path);
        }
    }

    let meta_path = out_dir.join(format!("{}.json", job.name));
    let metadata = SpriteMetadata {
        name: &job.name,
        kind: job.kind,
        seed,
        palette: &job.palette,
        frames: frames.len(),
        width: frames[0].width,
        height: frames[0].height,
        files: written.iter().map(|p| file_name(p)).collect(),
        parameters: &params,
        generator: "spacegen",
        version: env!("CARGO_PKG_VERSION"),
    };
    write_json(&metadata, &meta_path)?;
    written.push(meta_path);

    info!(
        "Generated {} '{}' ({} frame(s), seed {})",
        job.kind,
        job.name,
        frames.len(),
        seed
    );
    Ok(written)
}

/// One sound effect to render, from a named preset or explicit synth params
#[derive(Debug, Clone, Deserialize)]
pub struct SoundJob {
    pub name: String,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub synth: Option<SynthParams>,
    /// Random detune amount applied to a preset (0 disables)
    #[serde(default)]
    pub variation: f32,
    /// Seed for the variation; derived from the name when absent
    #[serde(default)]
    pub seed: Option<u32>,
}

impl SoundJob {
    pub fn preset(name: impl Into<String>, preset: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preset: Some(preset.into()),
            synth: None,
            variation: 0.0,
            seed: None,
        }
    }

    pub fn synth(name: impl Into<String>, params: SynthParams) -> Self {
        Self {
            name: name.into(),
            preset: None,
            synth: Some(params),
            variation: 0.0,
            seed: None,
        }
    }

    /// Render without touching the filesystem
    pub fn render(&self) -> Result<(audio::AudioBuffer, serde_json::Value)> {
        match (&self.preset, &self.synth) {
            (Some(key), None) => {
                let preset = audio::sfx_preset(key)?;
                let buffer = if self.variation > 0.0 {
                    let seed = self.seed.unwrap_or_else(|| seed_from_str(&self.name));
                    audio::generate_sfx_variation(key, self.variation, &mut SeededRng::new(seed))?
                } else {
                    audio::generate_sfx(key)?
                };
                Ok((buffer, serde_json::to_value(&preset.params)?))
            }
            (None, Some(params)) => {
                let buffer = audio::Synth::default().synthesize(params)?;
                Ok((buffer, serde_json::to_value(params)?))
            }
            (Some(_), Some(_)) => bail!("Sound '{}' sets both preset and synth", self.name),
            (None, None) => bail!("Sound '{}' needs a preset or synth table", self.name),
        }
    }
}

/// Render a sound job to `<name>.wav` plus a metadata sidecar
pub fn render_sound(job: &SoundJob, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let (buffer, parameters) = job.render()?;
    std::fs::create_dir_all(out_dir)?;

    let wav_path = out_dir.join(format!("{}.wav", job.name));
    audio::write_wav(&buffer, &wav_path)?;
    let meta_path = out_dir.join(format!("{}.json", job.name));
    let metadata = SoundMetadata::new(&job.name, "sfx", &buffer).with_parameters(parameters);
    audio::write_metadata(&metadata, &meta_path)?;

    debug!("Peak level {:.3}", buffer.peak());
    info!("Rendered sound '{}' ({:.2}s)", job.name, buffer.duration());
    Ok(vec![wav_path, meta_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacegen::ParamValue;

    #[test]
    fn test_resolve_palette_forms() {
        assert_eq!(resolve_palette("fire").unwrap(), palette_preset("fire").unwrap());
        assert_eq!(resolve_palette("pirate").unwrap(), legacy_palette("pirate").unwrap());
        assert!(resolve_palette("#112233, #445566, #778899").is_ok());
        assert!(resolve_palette("plaid").is_err());
    }

    #[test]
    fn test_seed_derivation() {
        let job = SpriteJob::new("SHIP_001", SpriteKind::Ship);
        assert_eq!(job.seed(), generate_seed("ship", "SHIP_001", "default", 0));
        let pinned = SpriteJob {
            seed: Some(7),
            ..job
        };
        assert_eq!(pinned.seed(), 7);
    }

    #[test]
    fn test_overrides_beat_preset() {
        let mut job = SpriteJob::new("rock", SpriteKind::Asteroid);
        job.preset = Some("boulder".into());
        job.params.set("crater_count", 1);
        let params = job.resolve_params().unwrap();
        assert_eq!(params.get("crater_count"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn test_unknown_preset_fails() {
        let mut job = SpriteJob::new("rock", SpriteKind::Asteroid);
        job.preset = Some("planetoid".into());
        let err = job.resolve_params().unwrap_err().to_string();
        assert!(err.contains("planetoid"), "{}", err);
    }

    #[test]
    fn test_render_sprite_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = SpriteJob::new("bolt", SpriteKind::Projectile);
        job.params.set("frame_count", 3);

        let files = render_sprite(&job, dir.path()).unwrap();
        assert_eq!(files.len(), 4);
        assert!(dir.path().join("bolt_02.png").exists());

        let meta: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("bolt.json")).unwrap())
                .unwrap();
        assert_eq!(meta["type"], "projectile");
        assert_eq!(meta["frames"], 3);
        assert_eq!(meta["files"][0], "bolt_00.png");
    }

    #[test]
    fn test_sound_job_needs_exactly_one_source() {
        let mut job = SoundJob::preset("zap", "laser_basic");
        assert!(job.render().is_ok());
        job.synth = Some(SynthParams::defaults(audio::SynthMethod::Fm));
        assert!(job.render().is_err());
        job.preset = None;
        job.synth = None;
        assert!(job.render().is_err());
    }

    #[test]
    fn test_render_sound_files() {
        let dir = tempfile::tempdir().unwrap();
        let job = SoundJob::synth("beep", SynthParams::defaults(audio::SynthMethod::Additive));
        let files = render_sound(&job, dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        let meta: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files[1]).unwrap()).unwrap();
        assert_eq!(meta["parameters"]["method"], "additive");
    }
}
