//! Paint sources: solid colors, decoded bitmaps, and the brushes that
//! reference them.
//!
//! Brushes are cheap-cloning handles. Two brushes are equal only when they
//! are clones of the *same* brush, never when they merely look alike; the
//! background-substitution scan relies on that identity semantic to decide
//! which descendants share a control's background.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::runtime::{Result, RuntimeError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
}

/// A decoded image with known pixel dimensions.
#[derive(Debug)]
pub struct Bitmap {
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Where the bitmap was decoded from, for diagnostics.
    pub uri: SmolStr,
}

impl Bitmap {
    pub fn new(pixel_width: u32, pixel_height: u32, uri: impl Into<SmolStr>) -> Arc<Self> {
        Arc::new(Self {
            pixel_width,
            pixel_height,
            uri: uri.into(),
        })
    }
}

/// The source of an image element or image brush.
///
/// A source starts out as an unresolved URI and becomes a [`Bitmap`] once the
/// host has decoded it. Querying pixel dimensions before that point is an
/// error surfaced to the caller, not something this crate recovers from.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// Not yet decoded; only the URI is known.
    Unresolved(SmolStr),
    /// Decoded and ready for pixel-size queries.
    Bitmap(Arc<Bitmap>),
}

impl ImageSource {
    pub fn unresolved(uri: impl Into<SmolStr>) -> Self {
        Self::Unresolved(uri.into())
    }

    /// The decoded bitmap behind this source.
    pub fn bitmap(&self) -> Result<&Arc<Bitmap>> {
        match self {
            ImageSource::Bitmap(bitmap) => Ok(bitmap),
            ImageSource::Unresolved(uri) => Err(RuntimeError::SourceNotDecoded {
                uri: uri.clone(),
            }),
        }
    }
}

impl PartialEq for ImageSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ImageSource::Unresolved(a), ImageSource::Unresolved(b)) => a == b,
            (ImageSource::Bitmap(a), ImageSource::Bitmap(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Arc<Bitmap>> for ImageSource {
    fn from(bitmap: Arc<Bitmap>) -> Self {
        Self::Bitmap(bitmap)
    }
}

/// A paint source backed by an image.
#[derive(Debug)]
pub struct ImageBrush {
    pub source: ImageSource,
}

#[derive(Debug)]
enum BrushKind {
    Solid(Color),
    Image(ImageBrush),
}

/// A shared paint source.
///
/// Cloning a brush shares the underlying paint; `==` compares that shared
/// identity rather than the paint's contents.
#[derive(Clone, Debug)]
pub struct Brush(Arc<BrushKind>);

impl Brush {
    pub fn solid(color: Color) -> Self {
        Self(Arc::new(BrushKind::Solid(color)))
    }

    pub fn image(source: ImageSource) -> Self {
        Self(Arc::new(BrushKind::Image(ImageBrush { source })))
    }

    pub fn as_image(&self) -> Option<&ImageBrush> {
        match &*self.0 {
            BrushKind::Image(image) => Some(image),
            BrushKind::Solid(_) => None,
        }
    }

    pub fn as_solid(&self) -> Option<Color> {
        match &*self.0 {
            BrushKind::Solid(color) => Some(*color),
            BrushKind::Image(_) => None,
        }
    }
}

impl PartialEq for Brush {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_equality_is_identity() {
        let a = Brush::solid(Color::WHITE);
        let b = Brush::solid(Color::WHITE);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn image_source_equality() {
        let bitmap = Bitmap::new(4, 4, "img.png");
        let decoded = ImageSource::from(bitmap.clone());
        assert_eq!(decoded, decoded.clone());
        assert_ne!(decoded, ImageSource::from(Bitmap::new(4, 4, "img.png")));
        assert_eq!(
            ImageSource::unresolved("img.png"),
            ImageSource::unresolved("img.png")
        );
        assert_ne!(decoded, ImageSource::unresolved("img.png"));
    }

    #[test]
    fn unresolved_source_has_no_bitmap() {
        let source = ImageSource::unresolved("pending.png");
        assert!(matches!(
            source.bitmap(),
            Err(RuntimeError::SourceNotDecoded { .. })
        ));
    }
}
