//! Lumen Core - surface color lookup for the path tracer.
//!
//! This crate provides:
//!
//! - **Textures**: `Texture` trait plus `SolidColor`, `CheckerTexture`
//!   and `ImageTexture`
//!
//! Image decoding happens elsewhere; `ImageTexture` is built from a pixel
//! buffer that has already been loaded.

pub mod texture;

pub use texture::{
    CheckerTexture, ImageTexture, SolidColor, Texture, TextureError, TextureResult,
};
