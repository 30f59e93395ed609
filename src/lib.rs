//! Pixel-shader image tiling for a retained visual tree.
//!
//! The crate wraps a pre-compiled tile shader program in a
//! [`TileEffect`] with two bindable properties (`Input`, `TileCount`) and
//! provides two attached properties that wire the effect into a visual
//! tree:
//!
//! - [`tiling::REPEAT_XY`] equips an image element with a tile effect and
//!   keeps its tile count equal to rendered-size / source-bitmap-size.
//! - [`tiling::TILE_MODE`] scans a control's descendants after each layout
//!   pass and slips a tiled image underneath any background that shares the
//!   control's image brush.
//!
//! Everything runs synchronously on the caller's thread, driven by the
//! [`runtime::Dispatcher`] event queue.
//!
//! ```
//! use tilefx::{Brush, Bitmap, Dispatcher, Size, TileMode, UIElement, UITree};
//! use tilefx::tiling::TILE_MODE;
//!
//! # fn main() -> tilefx::Result<()> {
//! let background = Brush::image(Bitmap::new(16, 16, "img.png").into());
//! let mut tree = UITree::new(UIElement::control(Some(background.clone())));
//! let control = tree.root;
//! tree.insert_child(control, UIElement::panel(Some(background)));
//!
//! TILE_MODE.set(&mut tree, control, TileMode::Tile)?;
//! Dispatcher::new().run_layout_pass(&mut tree, Size::new(640.0, 480.0))?;
//! # Ok(())
//! # }
//! ```

pub mod gfx;
pub mod layout;
pub mod property;
pub mod runtime;
pub mod tiling;

pub use gfx::brush::{Bitmap, Brush, Color, ImageBrush, ImageSource};
pub use gfx::effects::builtins::TileEffect;
pub use gfx::{Point, Rect, Size};
pub use layout::UITree;
pub use layout::model::{ElementContent, UIElement, UIKey};
pub use runtime::{Dispatcher, Event, Result, RuntimeError};
pub use tiling::{RepeatXY, TileMode};
