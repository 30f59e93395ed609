//! This module defines geometry, sizing, alignment, and element types for
//! the visual tree the tiling behaviors operate on.

use crate::gfx::Rect;
use crate::gfx::brush::{Brush, ImageSource};
use crate::gfx::effects::builtins::TileEffect;

// ---------- Alignment & stretch ----------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
    #[default]
    Stretch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    #[default]
    Stretch,
}

/// How an image's content is scaled to its layout bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stretch {
    None,
    Fill,
    #[default]
    Uniform,
    UniformToFill,
}

// ---------- Sizing ----------

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sizing {
    /// Fixed pixel size.
    Fixed { px: f32 },
    /// Grow to the parent's size, between [min, max].
    Grow { min: f32, max: f32 },
    /// Fit content between [min, max]. For images this is the decoded
    /// bitmap's intrinsic pixel size.
    Fit { min: f32, max: f32 },
    /// Fraction of the parent's size (0..=1).
    Percent { percent: f32 },
}

impl Sizing {
    pub fn fit() -> Self {
        Sizing::Fit {
            min: 0.0,
            max: f32::INFINITY,
        }
    }

    pub fn grow() -> Self {
        Sizing::Grow {
            min: 0.0,
            max: f32::INFINITY,
        }
    }

    pub fn fixed(px: f32) -> Self {
        Sizing::Fixed { px }
    }

    pub fn percent(percent: f32) -> Self {
        Sizing::Percent { percent }
    }
}

impl Default for Sizing {
    fn default() -> Self {
        Sizing::grow()
    }
}

// ---------- Render state attachments ----------

/// Off-screen render caching modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheMode {
    /// Render the element once into an off-screen bitmap and composite that.
    BitmapCache,
}

/// A rectangular clip, with optional rounded corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectangleGeometry {
    pub rect: Rect,
    pub radius_x: f32,
    pub radius_y: f32,
}

// ---------- Element tree ----------

/// A shape element. Only rectangles carry corner radii.
#[derive(Debug)]
pub struct Shape {
    pub fill: Option<Brush>,
    pub radius_x: f32,
    pub radius_y: f32,
}

/// An image element.
#[derive(Debug)]
pub struct Image {
    pub source: ImageSource,
    pub stretch: Stretch,
}

#[derive(Debug)]
pub enum ElementContent {
    /// A templated control with a background brush.
    Control { background: Option<Brush> },
    /// A layout container with a background brush.
    Panel { background: Option<Brush> },
    Shape(Shape),
    Image(Image),
}

impl ElementContent {
    pub fn is_panel(&self) -> bool {
        matches!(self, ElementContent::Panel { .. })
    }
}

pub type UIKey = slotmap::DefaultKey;

#[derive(Debug)]
pub struct UIElement {
    pub parent: Option<UIKey>,
    pub children: Vec<UIKey>,

    pub content: ElementContent,

    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,

    pub width: Sizing,
    pub height: Sizing,

    pub x: f32,
    pub y: f32,
    pub computed_width: f32,
    pub computed_height: f32,

    /// The element's shader effect, if one has been attached. At most one
    /// per element, created on first need.
    pub effect: Option<TileEffect>,
    pub cache_mode: Option<CacheMode>,
    pub clip: Option<RectangleGeometry>,
}

impl Default for UIElement {
    fn default() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            content: ElementContent::Panel { background: None },
            horizontal_alignment: HorizontalAlignment::default(),
            vertical_alignment: VerticalAlignment::default(),
            width: Sizing::default(),
            height: Sizing::default(),
            x: 0.0,
            y: 0.0,
            computed_width: 0.0,
            computed_height: 0.0,
            effect: None,
            cache_mode: None,
            clip: None,
        }
    }
}

impl UIElement {
    pub fn control(background: Option<Brush>) -> Self {
        Self {
            content: ElementContent::Control { background },
            ..Default::default()
        }
    }

    pub fn panel(background: Option<Brush>) -> Self {
        Self {
            content: ElementContent::Panel { background },
            ..Default::default()
        }
    }

    pub fn rectangle(fill: Option<Brush>, radius_x: f32, radius_y: f32) -> Self {
        Self {
            content: ElementContent::Shape(Shape {
                fill,
                radius_x,
                radius_y,
            }),
            ..Default::default()
        }
    }

    pub fn image(source: ImageSource) -> Self {
        Self {
            content: ElementContent::Image(Image {
                source,
                stretch: Stretch::default(),
            }),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: Sizing, height: Sizing) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// The background brush of a control or panel.
    pub fn background(&self) -> Option<&Brush> {
        match &self.content {
            ElementContent::Control { background } | ElementContent::Panel { background } => {
                background.as_ref()
            }
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match &self.content {
            ElementContent::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match &self.content {
            ElementContent::Shape(shape) => Some(shape),
            _ => None,
        }
    }
}
