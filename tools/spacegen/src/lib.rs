//! Procedural asset generation for space games
//!
//! Deterministic generators that turn a parameter set, a palette and a seed
//! into pixel-art sprites, plus an offline synthesizer and sample processor
//! for sound effects. Equal inputs always produce byte-identical output.
//!
//! # Sprite Example
//! ```no_run
//! use spacegen::palette::palette_preset;
//! use spacegen::params::{ParameterManager, builtin_schema};
//! use spacegen::seed::generate_default_seed;
//! use spacegen::sprite::*;
//!
//! // Start from the schema defaults and pick a preset
//! let mut manager = ParameterManager::new(builtin_schema(SpriteKind::Asteroid)?);
//! manager.load_preset("boulder");
//! manager.set_value("size", 48);
//!
//! let palette = palette_preset("mining_orange")?;
//! let seed = generate_default_seed("asteroid", "boulder_01");
//! let frames = generate(SpriteKind::Asteroid, manager.values(), &palette, seed)?;
//! write_png(&frames[0], std::path::Path::new("boulder_01.png"))?;
//! # Ok::<(), spacegen::GenError>(())
//! ```
//!
//! # Audio Example
//! ```no_run
//! use spacegen::audio::*;
//! use std::path::Path;
//!
//! // Named preset
//! let laser = generate_sfx("laser_basic")?;
//! write_wav(&laser, Path::new("laser_basic.wav"))?;
//!
//! // Custom FM tone
//! let params = SynthParams::Fm(FmParams::new(880.0, 220.0, 4.0, 0.3));
//! let tone = Synth::default().synthesize(&params)?;
//! write_wav(&tone, Path::new("tone.wav"))?;
//! # Ok::<(), spacegen::GenError>(())
//! ```

pub mod audio;
pub mod error;
pub mod noise;
pub mod palette;
pub mod params;
pub mod seed;
pub mod sprite;

pub use error::{GenError, Result};
pub use palette::Palette;
pub use params::{GenerationParameters, ParamValue, ParameterManager};
pub use seed::SeededRng;
pub use sprite::{FrameSequence, SpriteBuffer, SpriteKind};
