//! The visual tree and the layout pass that drives size-change events.

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};

use crate::gfx::Size;
use crate::gfx::brush::ImageSource;
use crate::layout::model::{ElementContent, Sizing, UIElement, UIKey};
use crate::property::{PropertyKey, PropertyValue};
use crate::runtime::{LayoutUpdatedHandler, SizeChangedHandler};

pub mod model;
pub mod visitors;

/// The visual tree: element storage plus the side-tables the property
/// system and the dispatcher consult.
///
/// Handler tables hold plain function pointers, so the tree stays plain
/// data and handlers are free to mutate the tree they are handed.
pub struct UITree {
    pub slots: SlotMap<UIKey, UIElement>,
    pub root: UIKey,

    attached: HashMap<PropertyKey, SecondaryMap<UIKey, PropertyValue>>,
    size_handlers: SecondaryMap<UIKey, Vec<SizeChangedHandler>>,
    layout_handlers: Vec<(UIKey, LayoutUpdatedHandler)>,
}

impl UITree {
    pub fn new(root: UIElement) -> Self {
        let mut slots = SlotMap::new();
        let root = slots.insert(root);
        Self {
            slots,
            root,
            attached: HashMap::new(),
            size_handlers: SecondaryMap::new(),
            layout_handlers: Vec::new(),
        }
    }

    /// Appends `element` as the last child of `parent`.
    pub fn insert_child(&mut self, parent: UIKey, element: UIElement) -> UIKey {
        let index = self.slots[parent].children.len();
        self.insert_child_at(parent, index, element)
    }

    /// Inserts `element` as a child of `parent` at the given index.
    pub fn insert_child_at(&mut self, parent: UIKey, index: usize, element: UIElement) -> UIKey {
        let key = self.slots.insert(UIElement {
            parent: Some(parent),
            ..element
        });
        self.slots[parent].children.insert(index, key);
        key
    }

    /// Registers a size-changed handler for `element`.
    pub fn add_size_changed_handler(&mut self, element: UIKey, handler: SizeChangedHandler) {
        if let Some(entry) = self.size_handlers.entry(element) {
            entry.or_insert_with(Vec::new).push(handler);
        }
    }

    /// Registers a handler invoked after every completed layout pass.
    pub fn add_layout_updated_handler(&mut self, element: UIKey, handler: LayoutUpdatedHandler) {
        self.layout_handlers.push((element, handler));
    }

    /// Snapshot of the size-changed handlers for `element`.
    pub(crate) fn size_handlers_for(&self, element: UIKey) -> Vec<SizeChangedHandler> {
        self.size_handlers
            .get(element)
            .map(|handlers| handlers.to_vec())
            .unwrap_or_default()
    }

    pub(crate) fn size_handler_count(&self, element: UIKey) -> usize {
        self.size_handlers
            .get(element)
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }

    /// Snapshot of the layout-updated handlers.
    pub(crate) fn layout_handlers(&self) -> Vec<(UIKey, LayoutUpdatedHandler)> {
        self.layout_handlers.clone()
    }

    pub(crate) fn attached_value(
        &self,
        property: PropertyKey,
        element: UIKey,
    ) -> Option<&PropertyValue> {
        self.attached
            .get(&property)
            .and_then(|table| table.get(element))
    }

    pub(crate) fn set_attached_value(
        &mut self,
        property: PropertyKey,
        element: UIKey,
        value: PropertyValue,
    ) {
        self.attached
            .entry(property)
            .or_default()
            .insert(element, value);
    }
}

/// A size delta reported by [`compute_layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeChange {
    pub key: UIKey,
    pub old: Size,
    pub new: Size,
}

/// Resolves every element's size against its parent, top-down, and reports
/// each element whose computed size changed since the previous pass.
pub fn compute_layout(tree: &mut UITree, viewport: Size) -> Vec<SizeChange> {
    let mut changes = Vec::new();
    let root = tree.root;

    visitors::visit_bfs(&mut tree.slots, root, |slots, key, parent| {
        let parent_size = match parent {
            Some(parent) => Size::new(slots[parent].computed_width, slots[parent].computed_height),
            None => viewport,
        };
        let (parent_x, parent_y) = match parent {
            Some(parent) => (slots[parent].x, slots[parent].y),
            None => (0.0, 0.0),
        };

        let element = &mut slots[key];
        let old = Size::new(element.computed_width, element.computed_height);
        let intrinsic = intrinsic_size(element);
        let new = Size::new(
            resolve_axis(element.width, parent_size.width, intrinsic.width),
            resolve_axis(element.height, parent_size.height, intrinsic.height),
        );

        element.x = parent_x;
        element.y = parent_y;
        element.computed_width = new.width;
        element.computed_height = new.height;

        if old != new {
            changes.push(SizeChange { key, old, new });
        }
    });

    changes
}

fn resolve_axis(sizing: Sizing, parent_px: f32, intrinsic_px: f32) -> f32 {
    match sizing {
        Sizing::Fixed { px } => px,
        Sizing::Grow { min, max } => parent_px.clamp(min, max),
        Sizing::Fit { min, max } => intrinsic_px.clamp(min, max),
        Sizing::Percent { percent } => parent_px * percent,
    }
}

/// An image's natural size, once its source has been decoded. Everything
/// else has no intrinsic size.
fn intrinsic_size(element: &UIElement) -> Size {
    if let ElementContent::Image(image) = &element.content {
        if let ImageSource::Bitmap(bitmap) = &image.source {
            return Size::new(bitmap.pixel_width as f32, bitmap.pixel_height as f32);
        }
    }
    Size::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::brush::Bitmap;
    use crate::layout::model::Sizing;

    #[test]
    fn grow_fills_parent_and_fixed_stays_fixed() {
        let mut tree = UITree::new(UIElement::default());
        let panel = tree.insert_child(
            tree.root,
            UIElement::panel(None).with_size(Sizing::fixed(100.0), Sizing::grow()),
        );
        let child = tree.insert_child(panel, UIElement::panel(None));

        let changes = compute_layout(&mut tree, Size::new(640.0, 480.0));
        assert_eq!(changes.len(), 3);
        assert_eq!(tree.slots[panel].computed_width, 100.0);
        assert_eq!(tree.slots[panel].computed_height, 480.0);
        assert_eq!(tree.slots[child].computed_width, 100.0);
        assert_eq!(tree.slots[child].computed_height, 480.0);
    }

    #[test]
    fn second_pass_with_same_viewport_reports_no_changes() {
        let mut tree = UITree::new(UIElement::default());
        tree.insert_child(tree.root, UIElement::panel(None));

        compute_layout(&mut tree, Size::new(640.0, 480.0));
        let changes = compute_layout(&mut tree, Size::new(640.0, 480.0));
        assert!(changes.is_empty());
    }

    #[test]
    fn fit_image_uses_intrinsic_bitmap_size() {
        let mut tree = UITree::new(UIElement::default());
        let bitmap = Bitmap::new(32, 16, "img.png");
        let image = tree.insert_child(
            tree.root,
            UIElement::image(bitmap.into()).with_size(Sizing::fit(), Sizing::fit()),
        );

        compute_layout(&mut tree, Size::new(640.0, 480.0));
        assert_eq!(tree.slots[image].computed_width, 32.0);
        assert_eq!(tree.slots[image].computed_height, 16.0);
    }
}
