//! Effect instance creation and management.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::gfx::brush::Brush;
use crate::runtime::{Result, RuntimeError};

use super::{EffectProperty, PixelShaderEffect, registration};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// A value held in a constant register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantValue {
    Float(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Int(i32),
    UInt(u32),
    Bool(bool),
}

/// A created instance of a custom pixel shader effect.
///
/// The instance owns the effect's constant register file and input sampler
/// slots; property writes land in the registers exactly as the shader
/// program will read them. The effect type must have been registered before
/// creating instances.
///
/// # Example
///
/// ```ignore
/// let mut instance = EffectInstance::<MyEffect>::create()?;
/// instance.set_input(0, Some(brush));
/// instance.update(&MyEffect { intensity: 0.5 })?;
/// ```
pub struct EffectInstance<E: PixelShaderEffect> {
    instance_id: u64,
    constants: Vec<ConstantValue>,
    inputs: Vec<Option<Brush>>,
    _marker: PhantomData<E>,
}

impl<E: PixelShaderEffect> EffectInstance<E> {
    /// Creates a new instance of the effect.
    ///
    /// The constant registers start out holding the defaults declared in the
    /// effect's registration metadata.
    pub fn create() -> Result<Self> {
        let metadata = registration::registered_metadata(E::EFFECT_ID)
            .ok_or(RuntimeError::EffectNotRegistered(E::EFFECT_ID))?;

        let constants = metadata
            .properties
            .iter()
            .enumerate()
            .map(|(index, prop)| constant_of(prop.default.to_property(index as u32)))
            .collect();

        Ok(Self {
            instance_id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            constants,
            inputs: vec![None; E::INPUT_COUNT as usize],
            _marker: PhantomData,
        })
    }

    /// Process-unique identifier of this instance.
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// Sets an input sampler for the effect.
    ///
    /// `None` resets the slot to the element's own rendered output, which is
    /// what most single-input effects sample.
    pub fn set_input(&mut self, index: u32, brush: Option<Brush>) {
        if let Some(slot) = self.inputs.get_mut(index as usize) {
            *slot = brush;
        }
    }

    /// Updates the effect with new property values.
    ///
    /// This reads the properties from the effect struct and uploads them to
    /// the constant registers.
    pub fn update(&mut self, effect_data: &E) -> Result<()> {
        for prop in effect_data.properties() {
            self.set_property(prop)?;
        }
        Ok(())
    }

    /// Writes a single property value into its constant register.
    pub fn set_property(&mut self, prop: EffectProperty) -> Result<()> {
        let index = prop.index() as usize;
        let slot = self
            .constants
            .get_mut(index)
            .ok_or(RuntimeError::InvalidConstantRegister {
                effect: E::EFFECT_ID,
                index: prop.index(),
            })?;
        *slot = constant_of(prop);
        Ok(())
    }

    /// Reads back a constant register.
    pub fn constant(&self, index: u32) -> Option<ConstantValue> {
        self.constants.get(index as usize).copied()
    }

    /// Reads back an input sampler slot.
    pub fn input(&self, index: u32) -> Option<&Brush> {
        self.inputs.get(index as usize).and_then(|slot| slot.as_ref())
    }
}

impl<E: PixelShaderEffect> std::fmt::Debug for EffectInstance<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectInstance")
            .field("instance_id", &self.instance_id)
            .field("constants", &self.constants)
            .finish()
    }
}

fn constant_of(prop: EffectProperty) -> ConstantValue {
    match prop {
        EffectProperty::Float { value, .. } => ConstantValue::Float(value),
        EffectProperty::Float2 { value, .. } => ConstantValue::Float2(value),
        EffectProperty::Float3 { value, .. } => ConstantValue::Float3(value),
        EffectProperty::Float4 { value, .. } => ConstantValue::Float4(value),
        EffectProperty::Int { value, .. } => ConstantValue::Int(value),
        EffectProperty::UInt { value, .. } => ConstantValue::UInt(value),
        EffectProperty::Bool { value, .. } => ConstantValue::Bool(value),
    }
}
