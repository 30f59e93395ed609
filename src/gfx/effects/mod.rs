//! Custom pixel shader effects system.
//!
//! This module provides a Rust-idiomatic interface for declaring and using
//! effects backed by pre-compiled pixel shader programs. The programs are
//! opaque; what the crate owns is their parameterization: a constant
//! register file and input sampler slots per effect instance.
//!
//! # Overview
//!
//! To create a custom effect:
//!
//! 1. Compile a pixel shader to a `.cso` file and embed it
//! 2. Define a struct implementing [`PixelShaderEffect`]
//! 3. Register the effect with [`register_effect`]
//! 4. Create instances with [`EffectInstance::create`]
//!
//! The crate's own [`builtins::TileShader`] is registered automatically.

pub mod builtins;
mod instance;
mod registration;
mod traits;

pub use instance::{ConstantValue, EffectInstance};
pub use registration::{EffectId, EffectRegistry, register_effect};
pub use traits::{
    EffectMetadata, EffectProperty, PixelShaderEffect, PropertyDefault, PropertyMetadata,
    PropertyType,
};
