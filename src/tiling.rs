//! Attached tiling behaviors.
//!
//! Two attached properties drive everything here. `RepeatXY`, attached to
//! image elements, lazily equips an element with a [`TileEffect`] and keeps
//! the effect's tile count in sync with the element's render size.
//! `Tile.Mode`, attached to controls, scans the control's visual descendants
//! after each layout pass and substitutes a tiled image for any background
//! that shares the control's image brush.

use log::{debug, trace};

use crate::gfx::brush::{Brush, Color, ImageSource};
use crate::gfx::effects::builtins::TileEffect;
use crate::gfx::{Point, Rect, Size};
use crate::layout::model::{
    CacheMode, ElementContent, HorizontalAlignment, Image, RectangleGeometry, Stretch, UIElement,
    UIKey, VerticalAlignment,
};
use crate::layout::{UITree, visitors};
use crate::property::{
    AttachedProperty, ChangeCallback, PropertyConvert, PropertyDescriptor, PropertyKey,
    PropertyValue,
};
use crate::runtime::{Result, RuntimeError};

/// Which axes an image element repeats its source along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatXY {
    #[default]
    None,
    RepeatX,
    RepeatY,
    RepeatXY,
}

impl RepeatXY {
    pub fn is_repeating(&self) -> bool {
        !matches!(self, RepeatXY::None)
    }
}

impl PropertyConvert for RepeatXY {
    fn into_value(self) -> PropertyValue {
        PropertyValue::Repeat(self)
    }

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Repeat(repeat) => Some(repeat),
            _ => None,
        }
    }
}

/// Whether a control's background participates in auto-tiling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileMode {
    #[default]
    None,
    Tile,
}

impl PropertyConvert for TileMode {
    fn into_value(self) -> PropertyValue {
        PropertyValue::TileMode(self)
    }

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::TileMode(mode) => Some(mode),
            _ => None,
        }
    }
}

pub const REPEAT_XY_PROPERTY: PropertyKey = PropertyKey {
    owner: "Image",
    name: "RepeatXY",
};

pub const TILE_MODE_PROPERTY: PropertyKey = PropertyKey {
    owner: "Tile",
    name: "Mode",
};

/// Attach to an image element to tile its source across its bounds.
pub static REPEAT_XY: AttachedProperty<RepeatXY> = AttachedProperty::new(REPEAT_XY_PROPERTY);

/// Attach to a control to substitute tiled images for backgrounds that
/// share the control's image brush.
pub static TILE_MODE: AttachedProperty<TileMode> = AttachedProperty::new(TILE_MODE_PROPERTY);

pub(crate) fn register_properties(descriptors: &mut Vec<PropertyDescriptor>) {
    descriptors.push(PropertyDescriptor {
        key: REPEAT_XY_PROPERTY,
        default: PropertyValue::Repeat(RepeatXY::None),
        on_changed: Some(ChangeCallback::Element(on_repeat_xy_changed)),
    });
    descriptors.push(PropertyDescriptor {
        key: TILE_MODE_PROPERTY,
        default: PropertyValue::TileMode(TileMode::None),
        on_changed: Some(ChangeCallback::Element(on_tile_mode_changed)),
    });
}

fn on_repeat_xy_changed(
    tree: &mut UITree,
    key: UIKey,
    _old: &PropertyValue,
    new: &PropertyValue,
) -> Result<()> {
    if !matches!(tree.slots[key].content, ElementContent::Image(_)) {
        return Err(RuntimeError::AttachTargetMismatch {
            owner: REPEAT_XY_PROPERTY.owner,
            name: REPEAT_XY_PROPERTY.name,
            expected: "image",
        });
    }

    let repeating = matches!(new, PropertyValue::Repeat(repeat) if repeat.is_repeating());
    if !repeating || tree.slots[key].effect.is_some() {
        return Ok(());
    }

    let effect = TileEffect::new()?;
    let element = &mut tree.slots[key];
    element.effect = Some(effect);
    element.cache_mode = Some(CacheMode::BitmapCache);
    tree.add_size_changed_handler(key, recompute_tile_count);
    debug!("attached tile effect to image {key:?}");
    Ok(())
}

/// Tile count is how many whole source-bitmap-sized tiles fit in the
/// element's rendered size, kept as an exact ratio.
fn recompute_tile_count(tree: &mut UITree, key: UIKey, _old: Size, new: Size) -> Result<()> {
    let bitmap = match &tree.slots[key].content {
        ElementContent::Image(image) => image.source.bitmap()?.clone(),
        _ => return Ok(()),
    };

    let tile_count = Point::new(
        new.width / bitmap.pixel_width as f32,
        new.height / bitmap.pixel_height as f32,
    );
    if let Some(effect) = tree.slots[key].effect.as_mut() {
        effect.set_tile_count(tile_count)?;
    }
    Ok(())
}

fn on_tile_mode_changed(
    tree: &mut UITree,
    key: UIKey,
    _old: &PropertyValue,
    new: &PropertyValue,
) -> Result<()> {
    if !matches!(tree.slots[key].content, ElementContent::Control { .. }) {
        return Err(RuntimeError::AttachTargetMismatch {
            owner: TILE_MODE_PROPERTY.owner,
            name: TILE_MODE_PROPERTY.name,
            expected: "control",
        });
    }

    if matches!(new, PropertyValue::TileMode(TileMode::Tile)) {
        tree.add_layout_updated_handler(key, scan_for_tiled_background);
    }
    Ok(())
}

/// Runs after every layout pass for a control whose mode is `Tile`.
///
/// The background is inspected here rather than when the mode is set,
/// because the control's background might not be initialized yet at that
/// point.
fn scan_for_tiled_background(tree: &mut UITree, control: UIKey) -> Result<()> {
    let Some(background) = tree.slots[control].background().cloned() else {
        return Ok(());
    };
    if background.as_image().is_none() {
        trace!("control {control:?} background is not an image brush");
        return Ok(());
    }

    for candidate in visitors::descendants(&tree.slots, control) {
        let brush = match &tree.slots[candidate].content {
            ElementContent::Panel { background } => background.clone(),
            ElementContent::Shape(shape) => shape.fill.clone(),
            _ => continue,
        };
        if try_add_background(tree, candidate, brush, &background)? {
            break;
        }
    }
    Ok(())
}

/// Attempts to put a tiled image behind `element`'s matching background.
///
/// Shapes cannot host child elements, so a matching shape is hollowed out
/// (fill detached to transparent, clip set to its own geometry) and the
/// image goes into the nearest ancestor panel instead.
fn try_add_background(
    tree: &mut UITree,
    element: UIKey,
    brush: Option<Brush>,
    original: &Brush,
) -> Result<bool> {
    if brush.as_ref() != Some(original) {
        return Ok(false);
    }
    let Some(image_brush) = original.as_image() else {
        return Ok(false);
    };
    let source = image_brush.source.clone();

    let mut target = element;
    if matches!(tree.slots[element].content, ElementContent::Shape(_)) {
        detach_shape_fill(tree, element);
        let Some(panel) = visitors::ancestors(&tree.slots, element)
            .into_iter()
            .find(|&ancestor| tree.slots[ancestor].content.is_panel())
        else {
            return Ok(false);
        };
        target = panel;
    }

    if !tree.slots[target].content.is_panel() {
        return Ok(false);
    }
    if first_child_is_tiled_image(tree, target, &source) {
        return Ok(false);
    }

    let image = UIElement {
        content: ElementContent::Image(Image {
            source,
            stretch: Stretch::Fill,
        }),
        horizontal_alignment: HorizontalAlignment::Stretch,
        vertical_alignment: VerticalAlignment::Stretch,
        ..Default::default()
    };
    let inserted = tree.insert_child_at(target, 0, image);
    REPEAT_XY.set(tree, inserted, RepeatXY::RepeatXY)?;
    debug!("inserted tiled background image into panel {target:?}");
    Ok(true)
}

fn detach_shape_fill(tree: &mut UITree, element: UIKey) {
    let element = &mut tree.slots[element];
    let bounds = Rect::new(0.0, 0.0, element.computed_width, element.computed_height);
    if let ElementContent::Shape(shape) = &mut element.content {
        let (radius_x, radius_y) = (shape.radius_x, shape.radius_y);
        shape.fill = Some(Brush::solid(Color::TRANSPARENT));
        element.clip = Some(RectangleGeometry {
            rect: bounds,
            radius_x,
            radius_y,
        });
    }
}

fn first_child_is_tiled_image(tree: &UITree, panel: UIKey, source: &ImageSource) -> bool {
    let Some(&first) = tree.slots[panel].children.first() else {
        return false;
    };
    match tree.slots[first].as_image() {
        Some(image) => image.source == *source,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Size;
    use crate::gfx::brush::Bitmap;
    use crate::gfx::effects::ConstantValue;
    use crate::layout::model::Sizing;
    use crate::runtime::Dispatcher;

    fn decoded_brush(width: u32, height: u32) -> Brush {
        Brush::image(ImageSource::from(Bitmap::new(width, height, "img.png")))
    }

    fn image_element(brush: &Brush) -> UIElement {
        let source = brush.as_image().unwrap().source.clone();
        UIElement::image(source)
    }

    #[test]
    fn repeat_xy_attaches_exactly_one_effect() {
        let brush = decoded_brush(16, 8);
        let mut tree = UITree::new(UIElement::panel(None));
        let image = tree.insert_child(tree.root, image_element(&brush));

        REPEAT_XY.set(&mut tree, image, RepeatXY::RepeatXY).unwrap();
        let first_id = tree.slots[image]
            .effect
            .as_ref()
            .unwrap()
            .instance()
            .instance_id();
        assert_eq!(tree.size_handler_count(image), 1);
        assert_eq!(tree.slots[image].cache_mode, Some(CacheMode::BitmapCache));

        // A second write, even to a different repeating mode, reuses the
        // existing effect.
        REPEAT_XY.set(&mut tree, image, RepeatXY::RepeatX).unwrap();
        let second_id = tree.slots[image]
            .effect
            .as_ref()
            .unwrap()
            .instance()
            .instance_id();
        assert_eq!(first_id, second_id);
        assert_eq!(tree.size_handler_count(image), 1);
    }

    #[test]
    fn repeat_xy_rejects_non_image_elements() {
        let mut tree = UITree::new(UIElement::panel(None));
        let panel = tree.insert_child(tree.root, UIElement::panel(None));
        let result = REPEAT_XY.set(&mut tree, panel, RepeatXY::RepeatXY);
        assert!(matches!(
            result,
            Err(RuntimeError::AttachTargetMismatch { .. })
        ));
    }

    #[test]
    fn tile_count_is_size_over_bitmap_pixels() {
        let brush = decoded_brush(16, 8);
        let mut tree = UITree::new(UIElement::panel(None));
        let image = tree.insert_child(tree.root, image_element(&brush));
        REPEAT_XY.set(&mut tree, image, RepeatXY::RepeatXY).unwrap();

        let mut dispatcher = Dispatcher::new();
        dispatcher
            .run_layout_pass(&mut tree, Size::new(160.0, 24.0))
            .unwrap();

        let effect = tree.slots[image].effect.as_ref().unwrap();
        assert_eq!(effect.tile_count(), Point::new(10.0, 3.0));
        assert_eq!(
            effect.instance().constant(0),
            Some(ConstantValue::Float2([10.0, 3.0]))
        );

        // Resizing recomputes the count from the new rendered size.
        dispatcher
            .run_layout_pass(&mut tree, Size::new(40.0, 12.0))
            .unwrap();
        let effect = tree.slots[image].effect.as_ref().unwrap();
        assert_eq!(effect.tile_count(), Point::new(2.5, 1.5));
    }

    #[test]
    fn undecoded_source_fails_loudly_on_first_resize() {
        let mut tree = UITree::new(UIElement::panel(None));
        let image = tree.insert_child(
            tree.root,
            UIElement::image(ImageSource::unresolved("pending.png")),
        );
        REPEAT_XY.set(&mut tree, image, RepeatXY::RepeatXY).unwrap();

        let mut dispatcher = Dispatcher::new();
        let result = dispatcher.run_layout_pass(&mut tree, Size::new(64.0, 64.0));
        assert!(matches!(
            result,
            Err(RuntimeError::SourceNotDecoded { .. })
        ));
    }

    #[test]
    fn matching_panel_gains_one_image_child() {
        let brush = decoded_brush(16, 8);
        let mut tree = UITree::new(UIElement::control(Some(brush.clone())));
        let control = tree.root;
        let panel = tree.insert_child(control, UIElement::panel(Some(brush.clone())));
        let label = tree.insert_child(panel, UIElement::panel(None));

        TILE_MODE.set(&mut tree, control, TileMode::Tile).unwrap();
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .run_layout_pass(&mut tree, Size::new(320.0, 160.0))
            .unwrap();

        assert_eq!(tree.slots[panel].children.len(), 2);
        let inserted = tree.slots[panel].children[0];
        assert_eq!(tree.slots[panel].children[1], label);
        let image = tree.slots[inserted].as_image().unwrap();
        assert_eq!(image.source, brush.as_image().unwrap().source);
        assert_eq!(image.stretch, Stretch::Fill);
        assert_eq!(
            REPEAT_XY.get(&tree, inserted).unwrap(),
            RepeatXY::RepeatXY
        );
        assert!(tree.slots[inserted].effect.is_some());

        // A second layout pass must not insert a duplicate.
        dispatcher
            .run_layout_pass(&mut tree, Size::new(320.0, 160.0))
            .unwrap();
        assert_eq!(tree.slots[panel].children.len(), 2);
    }

    #[test]
    fn no_matching_descendant_is_a_silent_no_op() {
        let background = decoded_brush(16, 8);
        let other = decoded_brush(16, 8);
        let mut tree = UITree::new(UIElement::control(Some(background)));
        let control = tree.root;
        let panel = tree.insert_child(control, UIElement::panel(Some(other)));

        TILE_MODE.set(&mut tree, control, TileMode::Tile).unwrap();
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .run_layout_pass(&mut tree, Size::new(100.0, 100.0))
            .unwrap();

        assert!(tree.slots[panel].children.is_empty());
    }

    #[test]
    fn solid_background_is_a_silent_no_op() {
        let background = Brush::solid(Color::WHITE);
        let mut tree = UITree::new(UIElement::control(Some(background.clone())));
        let control = tree.root;
        let panel = tree.insert_child(control, UIElement::panel(Some(background)));

        TILE_MODE.set(&mut tree, control, TileMode::Tile).unwrap();
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .run_layout_pass(&mut tree, Size::new(100.0, 100.0))
            .unwrap();

        assert!(tree.slots[panel].children.is_empty());
    }

    #[test]
    fn matching_shape_is_hollowed_out_and_ancestor_panel_tiled() {
        let brush = decoded_brush(16, 8);
        let mut tree = UITree::new(UIElement::control(Some(brush.clone())));
        let control = tree.root;
        let panel = tree.insert_child(control, UIElement::panel(None));
        let rectangle = tree.insert_child(
            panel,
            UIElement::rectangle(Some(brush.clone()), 5.0, 5.0)
                .with_size(Sizing::fixed(120.0), Sizing::fixed(40.0)),
        );

        TILE_MODE.set(&mut tree, control, TileMode::Tile).unwrap();
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .run_layout_pass(&mut tree, Size::new(320.0, 160.0))
            .unwrap();

        let shape = tree.slots[rectangle].as_shape().unwrap();
        let fill = shape.fill.as_ref().unwrap();
        assert_eq!(fill.as_solid(), Some(Color::TRANSPARENT));
        assert_eq!(
            tree.slots[rectangle].clip,
            Some(RectangleGeometry {
                rect: Rect::new(0.0, 0.0, 120.0, 40.0),
                radius_x: 5.0,
                radius_y: 5.0,
            })
        );

        // The image lands in the panel, not the shape.
        assert_eq!(tree.slots[panel].children.len(), 2);
        let inserted = tree.slots[panel].children[0];
        let image = tree.slots[inserted].as_image().unwrap();
        assert_eq!(image.source, brush.as_image().unwrap().source);
        assert!(tree.slots[rectangle].children.is_empty());
    }

    #[test]
    fn shape_without_ancestor_panel_keeps_walking() {
        // The control's only descendant is a shape with no panel between
        // it and the control, so the hollowed shape has nowhere to host
        // the image.
        let brush = decoded_brush(16, 8);
        let mut tree = UITree::new(UIElement::control(Some(brush.clone())));
        let control = tree.root;
        let rectangle =
            tree.insert_child(control, UIElement::rectangle(Some(brush.clone()), 0.0, 0.0));

        TILE_MODE.set(&mut tree, control, TileMode::Tile).unwrap();
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .run_layout_pass(&mut tree, Size::new(64.0, 64.0))
            .unwrap();

        // The fill is still detached at match time, but no image was
        // inserted anywhere.
        let shape = tree.slots[rectangle].as_shape().unwrap();
        assert_eq!(
            shape.fill.as_ref().and_then(|fill| fill.as_solid()),
            Some(Color::TRANSPARENT)
        );
        assert_eq!(tree.slots[control].children.len(), 1);
    }
}
