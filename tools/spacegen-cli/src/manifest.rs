//! Manifest parsing and batch builds
//!
//! A manifest lists sprite and sound jobs in TOML:
//!
//! ```toml
//! [output]
//! dir = "assets/generated"
//!
//! [[sprite]]
//! name = "ORE_T1_001"
//! kind = "asteroid"
//! preset = "boulder"
//! palette = "mining_orange"
//! params = { ore_type = "iron", size = 48 }
//!
//! [[sound]]
//! name = "pickup"
//! preset = "cargo_pickup"
//! variation = 0.1
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Deserialize;

use crate::render::{SoundJob, SpriteJob, render_sound, render_sprite, resolve_palette};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "sprite")]
    pub sprites: Vec<SpriteJob>,
    #[serde(default, rename = "sound")]
    pub sounds: Vec<SoundJob>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/generated")
}

/// Files produced by a build
#[derive(Debug, Default)]
pub struct BuildReport {
    pub sprites: usize,
    pub sounds: usize,
    pub files: Vec<PathBuf>,
}

pub fn parse_manifest(text: &str) -> Result<Manifest> {
    Ok(toml::from_str(text)?)
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    parse_manifest(&content).with_context(|| format!("Failed to parse manifest: {:?}", path))
}

fn claim_name<'a>(names: &mut HashSet<&'a str>, name: &'a str) -> Result<()> {
    if name.is_empty() {
        bail!("Job with an empty name");
    }
    if !names.insert(name) {
        bail!("Duplicate output name '{}'", name);
    }
    Ok(())
}

/// Check names, presets and palettes without generating anything
pub fn validate(manifest: &Manifest) -> Result<()> {
    let mut names = HashSet::new();
    for job in &manifest.sprites {
        claim_name(&mut names, &job.name)?;
        job.resolve_params()
            .with_context(|| format!("Sprite '{}'", job.name))?;
        resolve_palette(&job.palette).with_context(|| format!("Sprite '{}'", job.name))?;
    }
    for job in &manifest.sounds {
        claim_name(&mut names, &job.name)?;
        match (&job.preset, &job.synth) {
            (Some(key), None) => {
                spacegen::audio::sfx_preset(key)
                    .with_context(|| format!("Sound '{}'", job.name))?;
            }
            (None, Some(_)) => {}
            _ => bail!("Sound '{}' needs exactly one of preset or synth", job.name),
        }
    }
    Ok(())
}

/// Build every job in parallel.
///
/// Jobs are independent and run on the rayon pool.
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<BuildReport> {
    validate(manifest)?;
    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let sprite_files: Result<Vec<Vec<PathBuf>>> = manifest
        .sprites
        .par_iter()
        .map(|job| render_sprite(job, output_dir).with_context(|| format!("Sprite '{}'", job.name)))
        .collect();
    let sound_files: Result<Vec<Vec<PathBuf>>> = manifest
        .sounds
        .par_iter()
        .map(|job| render_sound(job, output_dir).with_context(|| format!("Sound '{}'", job.name)))
        .collect();

    let mut report = BuildReport {
        sprites: manifest.sprites.len(),
        sounds: manifest.sounds.len(),
        files: Vec::new(),
    };
    report.files.extend(sprite_files?.into_iter().flatten());
    report.files.extend(sound_files?.into_iter().flatten());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacegen::SpriteKind;

    const MANIFEST: &str = r#"
[output]
dir = "out"

[[sprite]]
name = "ORE_T1_001"
kind = "asteroid"
preset = "pebble"
palette = "mining_orange"
params = { ore_type = "iron", size = 24 }

[[sprite]]
name = "shot"
kind = "projectile"
sheet = true
params = { frame_count = 2 }

[[sound]]
name = "pickup"
preset = "cargo_pickup"
variation = 0.1

[[sound]]
name = "tone"
[sound.synth]
method = "fm"
[sound.synth.params]
carrier_freq = 880.0
duration = 0.1
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("out"));
        assert_eq!(manifest.sprites.len(), 2);
        assert_eq!(manifest.sprites[0].kind, SpriteKind::Asteroid);
        assert_eq!(manifest.sprites[1].palette, crate::render::DEFAULT_PALETTE);
        assert_eq!(manifest.sounds.len(), 2);
        assert!(manifest.sounds[1].synth.is_some());
        validate(&manifest).unwrap();
    }

    #[test]
    fn test_default_output_dir() {
        let manifest = parse_manifest("").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("assets/generated"));
        assert!(manifest.sprites.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let manifest = parse_manifest(
            r#"
[[sprite]]
name = "a"
kind = "ship"

[[sound]]
name = "a"
preset = "ui_click"
"#,
        )
        .unwrap();
        let err = validate(&manifest).unwrap_err().to_string();
        assert!(err.contains("Duplicate"), "{}", err);
    }

    #[test]
    fn test_unknown_sfx_preset_rejected() {
        let manifest = parse_manifest("[[sound]]\nname = \"x\"\npreset = \"kazoo\"\n").unwrap();
        assert!(validate(&manifest).is_err());
    }

    #[test]
    fn test_build_all() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = parse_manifest(MANIFEST).unwrap();
        let report = build_all(&manifest, Some(dir.path())).unwrap();
        assert_eq!(report.sprites, 2);
        assert_eq!(report.sounds, 2);
        for file in ["ORE_T1_001.png", "shot.png", "pickup.wav", "tone.wav", "tone.json"] {
            assert!(dir.path().join(file).exists(), "{}", file);
        }
        assert_eq!(report.files.len(), 8);
    }
}
