//! A minimal rendition of dependency-property machinery.
//!
//! Properties are registered once in a process-wide table mapping
//! (owner type, property name) to a default value and an optional change
//! callback; the table is read-only after initialization. Values for
//! *attached* properties do not live on the elements they describe but in
//! side-tables keyed by element identity inside the [`UITree`], so any
//! element can be tagged without changing its type.

use std::collections::HashMap;
use std::marker::PhantomData;

use lazy_static::lazy_static;
use log::debug;

use crate::gfx::Point;
use crate::gfx::brush::Brush;
use crate::gfx::effects::builtins::TileEffect;
use crate::layout::UITree;
use crate::layout::model::UIKey;
use crate::runtime::{Result, RuntimeError};
use crate::tiling::{RepeatXY, TileMode};

/// Identifies a registered property: owning type plus property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub owner: &'static str,
    pub name: &'static str,
}

/// A value carried by a registered property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Point(Point),
    Brush(Option<Brush>),
    Repeat(RepeatXY),
    TileMode(TileMode),
}

/// Change hook fired after a property's stored value actually changes.
#[derive(Clone, Copy)]
pub enum ChangeCallback {
    /// Constant re-upload for a property living on a [`TileEffect`].
    Effect(fn(&mut TileEffect, &PropertyValue, &PropertyValue) -> Result<()>),
    /// Attached-behavior hook for a property set on a tree element.
    Element(fn(&mut UITree, UIKey, &PropertyValue, &PropertyValue) -> Result<()>),
}

/// Registration-time description of a property.
pub struct PropertyDescriptor {
    pub key: PropertyKey,
    pub default: PropertyValue,
    pub on_changed: Option<ChangeCallback>,
}

lazy_static! {
    static ref REGISTRY: HashMap<PropertyKey, PropertyDescriptor> = {
        let mut descriptors = Vec::new();
        crate::gfx::effects::builtins::register_properties(&mut descriptors);
        crate::tiling::register_properties(&mut descriptors);
        debug!("property registry initialized with {} entries", descriptors.len());
        descriptors
            .into_iter()
            .map(|descriptor| (descriptor.key, descriptor))
            .collect()
    };
}

/// Looks up a property's descriptor in the process-wide registry.
pub fn descriptor(key: PropertyKey) -> Result<&'static PropertyDescriptor> {
    REGISTRY.get(&key).ok_or(RuntimeError::UnknownProperty {
        owner: key.owner,
        name: key.name,
    })
}

/// A property's registered default value.
pub fn default_value(key: PropertyKey) -> Result<PropertyValue> {
    Ok(descriptor(key)?.default.clone())
}

/// Conversion between a property's typed value and [`PropertyValue`].
pub trait PropertyConvert: Sized {
    fn into_value(self) -> PropertyValue;
    fn from_value(value: PropertyValue) -> Option<Self>;
}

impl PropertyConvert for Point {
    fn into_value(self) -> PropertyValue {
        PropertyValue::Point(self)
    }

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Point(point) => Some(point),
            _ => None,
        }
    }
}

impl PropertyConvert for Option<Brush> {
    fn into_value(self) -> PropertyValue {
        PropertyValue::Brush(self)
    }

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Brush(brush) => Some(brush),
            _ => None,
        }
    }
}

/// Typed accessor for a property attached to tree elements.
///
/// Reading an element that was never tagged yields the registered default;
/// writing stores into the tree's side-table and fires the registered
/// change callback when the value differs from the previous one.
pub struct AttachedProperty<T> {
    key: PropertyKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T: PropertyConvert + Clone> AttachedProperty<T> {
    pub const fn new(key: PropertyKey) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    pub const fn key(&self) -> PropertyKey {
        self.key
    }

    pub fn get(&self, tree: &UITree, element: UIKey) -> Result<T> {
        let value = match tree.attached_value(self.key, element) {
            Some(value) => value.clone(),
            None => default_value(self.key)?,
        };
        T::from_value(value).ok_or(RuntimeError::PropertyTypeMismatch {
            owner: self.key.owner,
            name: self.key.name,
        })
    }

    pub fn set(&self, tree: &mut UITree, element: UIKey, value: T) -> Result<()> {
        let descriptor = descriptor(self.key)?;
        let old = match tree.attached_value(self.key, element) {
            Some(value) => value.clone(),
            None => descriptor.default.clone(),
        };
        let new = value.into_value();
        if old == new {
            return Ok(());
        }

        tree.set_attached_value(self.key, element, new.clone());
        if let Some(ChangeCallback::Element(callback)) = descriptor.on_changed {
            callback(tree, element, &old, &new)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::UIElement;
    use crate::tiling::{REPEAT_XY, TILE_MODE};

    #[test]
    fn unknown_property_lookup_fails() {
        let key = PropertyKey {
            owner: "Nobody",
            name: "Nothing",
        };
        assert!(matches!(
            descriptor(key),
            Err(RuntimeError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn untagged_elements_read_the_registered_default() {
        let tree = UITree::new(UIElement::control(None));
        assert_eq!(REPEAT_XY.get(&tree, tree.root).unwrap(), RepeatXY::None);
        assert_eq!(TILE_MODE.get(&tree, tree.root).unwrap(), TileMode::None);
    }

    #[test]
    fn setting_an_unchanged_value_fires_no_callback() {
        let mut tree = UITree::new(UIElement::control(None));
        let root = tree.root;
        TILE_MODE.set(&mut tree, root, TileMode::None).unwrap();
        assert!(tree.layout_handlers().is_empty());
    }
}
