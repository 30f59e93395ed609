//! Process-wide effect registration.

use std::collections::HashMap;
use std::sync::RwLock;

use lazy_static::lazy_static;
use log::debug;

use super::{EffectMetadata, PixelShaderEffect};

/// Unique identifier for an effect type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub u128);

lazy_static! {
    static ref REGISTRY: RwLock<EffectRegistry> = RwLock::new(EffectRegistry::bootstrap());
}

/// Registry for custom pixel shader effects.
///
/// Tracks which effects have been registered so instances can only be
/// created for known shader programs, and so duplicate registration is
/// safely ignored.
#[derive(Default)]
pub struct EffectRegistry {
    registered: HashMap<EffectId, EffectMetadata>,
}

impl EffectRegistry {
    /// The registry with the crate's built-in effects already registered.
    fn bootstrap() -> Self {
        let mut registry = Self::default();
        registry.register::<crate::gfx::effects::builtins::TileShader>();
        registry
    }

    /// Registers a custom effect type.
    ///
    /// Multiple calls with the same effect type are safely ignored.
    pub fn register<E: PixelShaderEffect>(&mut self) {
        if self.registered.contains_key(&E::EFFECT_ID) {
            return;
        }

        let metadata = E::metadata();
        debug!(
            "registered effect {} ({} bytes of shader bytecode)",
            metadata.name,
            metadata.shader_bytecode.len()
        );
        self.registered.insert(E::EFFECT_ID, metadata);
    }

    /// Checks if an effect type has been registered.
    pub fn is_registered<E: PixelShaderEffect>(&self) -> bool {
        self.registered.contains_key(&E::EFFECT_ID)
    }

    /// Metadata for a registered effect.
    pub fn metadata(&self, id: EffectId) -> Option<EffectMetadata> {
        self.registered.get(&id).cloned()
    }
}

/// Registers an effect type with the process-wide registry.
///
/// Built-in effects are registered automatically; this is only needed for
/// effects defined outside this crate.
pub fn register_effect<E: PixelShaderEffect>() {
    let mut registry = REGISTRY.write().unwrap_or_else(|poison| poison.into_inner());
    registry.register::<E>();
}

/// Looks up a registered effect's metadata.
pub(crate) fn registered_metadata(id: EffectId) -> Option<EffectMetadata> {
    let registry = REGISTRY.read().unwrap_or_else(|poison| poison.into_inner());
    registry.metadata(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::effects::builtins::TileShader;

    #[test]
    fn tile_shader_is_registered_at_startup() {
        let metadata = registered_metadata(TileShader::EFFECT_ID).unwrap();
        assert_eq!(metadata.name, "Tile");
        assert!(!metadata.shader_bytecode.is_empty());
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        register_effect::<TileShader>();
        register_effect::<TileShader>();
        assert!(registered_metadata(TileShader::EFFECT_ID).is_some());
    }
}
