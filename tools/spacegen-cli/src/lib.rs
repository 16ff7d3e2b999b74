//! spacegen-cli library
//!
//! Job descriptions, manifest builds and override parsing used by the
//! `spacegen` binary, exposed so batch tooling can drive them directly.

pub mod manifest;
pub mod overrides;
pub mod render;

pub use manifest::{BuildReport, Manifest, build_all, load_manifest, validate};
pub use render::{SoundJob, SpriteJob, render_sound, render_sprite, resolve_palette};
