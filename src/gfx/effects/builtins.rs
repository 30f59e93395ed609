//! Built-in effects.
//!
//! The tile effect repeats its input image across the host element's render
//! bounds. The resampling itself happens in the pre-compiled shader program;
//! this module only parameterizes it: constant register 0 carries the tile
//! count, sampler 0 carries the input brush.

use log::debug;

use crate::gfx::Point;
use crate::gfx::brush::Brush;
use crate::gfx::effects::{
    EffectId, EffectInstance, EffectMetadata, EffectProperty, PixelShaderEffect, PropertyDefault,
    PropertyMetadata, PropertyType,
};
use crate::property::{
    self, ChangeCallback, PropertyDescriptor, PropertyKey, PropertyValue,
};
use crate::runtime::{Result, RuntimeError};

/// Identifies the `TileCount` property of [`TileEffect`].
pub const TILE_COUNT_PROPERTY: PropertyKey = PropertyKey {
    owner: "TileEffect",
    name: "TileCount",
};

/// Identifies the `Input` sampler property of [`TileEffect`].
pub const INPUT_PROPERTY: PropertyKey = PropertyKey {
    owner: "TileEffect",
    name: "Input",
};

const TILE_COUNT_REGISTER: u32 = 0;
const INPUT_SAMPLER: u32 = 0;

/// Shader-side state of the tile effect.
///
/// `tile_count` is the number of source-image-sized tiles along each axis;
/// fractional counts are meaningful and produce a partial tile at the edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileShader {
    pub tile_count: Point,
}

impl PixelShaderEffect for TileShader {
    const EFFECT_ID: EffectId = EffectId(0x7f1c_09da_5a34_4c61_93b8_22e0_41d7_a5f3);
    const INPUT_COUNT: u32 = 1;

    fn metadata() -> EffectMetadata {
        EffectMetadata {
            name: "Tile",
            author: "tilefx",
            category: "Tiling",
            description: "Repeats the input image across the element bounds",
            shader_bytecode: include_bytes!("shaders/tile.cso"),
            properties: &[PropertyMetadata {
                name: "TileCount",
                property_type: PropertyType::Vector2,
                default: PropertyDefault::Vector2([0.0, 0.0]),
            }],
        }
    }

    fn properties(&self) -> Vec<EffectProperty> {
        vec![EffectProperty::Float2 {
            index: TILE_COUNT_REGISTER,
            value: [self.tile_count.x, self.tile_count.y],
        }]
    }
}

/// The tile effect as the tree sees it: a [`TileShader`] instance plus the
/// two bindable properties that parameterize it.
///
/// Construction loads the registered shader program and immediately pushes
/// both properties' current (default) values into it. Every later write to
/// `TileCount` or `Input` re-uploads the corresponding register through the
/// property registry's change callback.
#[derive(Debug)]
pub struct TileEffect {
    shader: TileShader,
    input: Option<Brush>,
    instance: EffectInstance<TileShader>,
}

impl TileEffect {
    pub fn new() -> Result<Self> {
        let mut effect = Self {
            shader: TileShader::default(),
            input: None,
            instance: EffectInstance::create()?,
        };
        effect.update_shader_value(TILE_COUNT_PROPERTY)?;
        effect.update_shader_value(INPUT_PROPERTY)?;
        debug!(
            "created tile effect instance {}",
            effect.instance.instance_id()
        );
        Ok(effect)
    }

    pub fn tile_count(&self) -> Point {
        self.shader.tile_count
    }

    pub fn set_tile_count(&mut self, tile_count: Point) -> Result<()> {
        self.set_value(TILE_COUNT_PROPERTY, PropertyValue::Point(tile_count))
    }

    pub fn input(&self) -> Option<&Brush> {
        self.input.as_ref()
    }

    pub fn set_input(&mut self, input: Option<Brush>) -> Result<()> {
        self.set_value(INPUT_PROPERTY, PropertyValue::Brush(input))
    }

    /// The live effect instance, register file included.
    pub fn instance(&self) -> &EffectInstance<TileShader> {
        &self.instance
    }

    /// Writes a property value, firing the registered upload callback when
    /// the value actually changed.
    pub fn set_value(&mut self, key: PropertyKey, value: PropertyValue) -> Result<()> {
        let descriptor = property::descriptor(key)?;
        let old = self.value(key)?;
        if old == value {
            return Ok(());
        }

        self.store(key, value.clone())?;
        if let Some(ChangeCallback::Effect(callback)) = descriptor.on_changed {
            callback(self, &old, &value)?;
        }
        Ok(())
    }

    /// Reads a property's current value.
    pub fn value(&self, key: PropertyKey) -> Result<PropertyValue> {
        match key {
            TILE_COUNT_PROPERTY => Ok(PropertyValue::Point(self.shader.tile_count)),
            INPUT_PROPERTY => Ok(PropertyValue::Brush(self.input.clone())),
            _ => Err(RuntimeError::UnknownProperty {
                owner: key.owner,
                name: key.name,
            }),
        }
    }

    /// Re-fires the upload callback with the property's current value.
    fn update_shader_value(&mut self, key: PropertyKey) -> Result<()> {
        let descriptor = property::descriptor(key)?;
        if let Some(ChangeCallback::Effect(callback)) = descriptor.on_changed {
            let current = self.value(key)?;
            callback(self, &current, &current)?;
        }
        Ok(())
    }

    fn store(&mut self, key: PropertyKey, value: PropertyValue) -> Result<()> {
        match (key, value) {
            (TILE_COUNT_PROPERTY, PropertyValue::Point(point)) => {
                self.shader.tile_count = point;
                Ok(())
            }
            (INPUT_PROPERTY, PropertyValue::Brush(brush)) => {
                self.input = brush;
                Ok(())
            }
            (key, _) => Err(RuntimeError::PropertyTypeMismatch {
                owner: key.owner,
                name: key.name,
            }),
        }
    }
}

fn push_tile_count(
    effect: &mut TileEffect,
    _old: &PropertyValue,
    _new: &PropertyValue,
) -> Result<()> {
    let tile_count = effect.shader.tile_count;
    effect.instance.set_property(EffectProperty::Float2 {
        index: TILE_COUNT_REGISTER,
        value: [tile_count.x, tile_count.y],
    })
}

fn push_input(effect: &mut TileEffect, _old: &PropertyValue, _new: &PropertyValue) -> Result<()> {
    let input = effect.input.clone();
    effect.instance.set_input(INPUT_SAMPLER, input);
    Ok(())
}

pub(crate) fn register_properties(descriptors: &mut Vec<PropertyDescriptor>) {
    descriptors.push(PropertyDescriptor {
        key: TILE_COUNT_PROPERTY,
        default: PropertyValue::Point(Point::new(0.0, 0.0)),
        on_changed: Some(ChangeCallback::Effect(push_tile_count)),
    });
    descriptors.push(PropertyDescriptor {
        key: INPUT_PROPERTY,
        default: PropertyValue::Brush(None),
        on_changed: Some(ChangeCallback::Effect(push_input)),
    });
}
