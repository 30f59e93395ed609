//! Single-threaded event dispatch.
//!
//! The hosting framework's layout callbacks are modeled as a queue of
//! discrete events drained synchronously on the caller's thread: a layout
//! pass enqueues one `SizeChanged` per resized element followed by a single
//! `LayoutUpdated`, then pumps the queue into the tree's registered
//! handlers. Handlers run to completion before the next event; there is no
//! background work and no locking.

use std::collections::VecDeque;

use log::trace;
use smol_str::SmolStr;
use thiserror::Error;

use crate::gfx::Size;
use crate::gfx::effects::EffectId;
use crate::layout::model::UIKey;
use crate::layout::{self, UITree};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("image source {uri:?} has not been decoded yet")]
    SourceNotDecoded { uri: SmolStr },

    #[error("effect {0:?} is not registered")]
    EffectNotRegistered(EffectId),

    #[error("constant register {index} is out of range for effect {effect:?}")]
    InvalidConstantRegister { effect: EffectId, index: u32 },

    #[error("property {owner}.{name} is not registered")]
    UnknownProperty {
        owner: &'static str,
        name: &'static str,
    },

    #[error("property {owner}.{name} holds a different value type")]
    PropertyTypeMismatch {
        owner: &'static str,
        name: &'static str,
    },

    #[error("property {owner}.{name} can only be attached to {expected} elements")]
    AttachTargetMismatch {
        owner: &'static str,
        name: &'static str,
        expected: &'static str,
    },
}

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

/// A framework event delivered to registered handlers.
#[derive(Debug, Clone, Copy)]
pub enum Event {
    SizeChanged { key: UIKey, old: Size, new: Size },
    LayoutUpdated,
}

/// Reacts to an element's render size changing.
pub type SizeChangedHandler = fn(&mut UITree, UIKey, Size, Size) -> Result<()>;

/// Runs after a layout pass completes, scoped to the element it was
/// registered for.
pub type LayoutUpdatedHandler = fn(&mut UITree, UIKey) -> Result<()>;

/// The UI thread's event queue.
#[derive(Default)]
pub struct Dispatcher {
    queue: VecDeque<Event>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an event without dispatching it.
    pub fn post(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Lays the tree out against `viewport` and synchronously delivers the
    /// resulting `SizeChanged` events plus the closing `LayoutUpdated`.
    ///
    /// The first handler error aborts the pump and surfaces to the caller;
    /// events still queued at that point stay queued.
    pub fn run_layout_pass(&mut self, tree: &mut UITree, viewport: Size) -> Result<()> {
        let changes = layout::compute_layout(tree, viewport);
        trace!("layout pass: {} elements resized", changes.len());
        for change in changes {
            self.post(Event::SizeChanged {
                key: change.key,
                old: change.old,
                new: change.new,
            });
        }
        self.post(Event::LayoutUpdated);
        self.pump(tree)
    }

    /// Drains the queue, dispatching each event to the tree's handlers.
    pub fn pump(&mut self, tree: &mut UITree) -> Result<()> {
        while let Some(event) = self.queue.pop_front() {
            match event {
                Event::SizeChanged { key, old, new } => {
                    if !tree.slots.contains_key(key) {
                        continue;
                    }
                    for handler in tree.size_handlers_for(key) {
                        handler(tree, key, old, new)?;
                    }
                }
                Event::LayoutUpdated => {
                    for (key, handler) in tree.layout_handlers() {
                        if !tree.slots.contains_key(key) {
                            continue;
                        }
                        handler(tree, key)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Point;
    use crate::layout::model::UIElement;
    use crate::property::{PropertyKey, PropertyValue};

    const LAST_SIZE: PropertyKey = PropertyKey {
        owner: "Test",
        name: "LastSize",
    };

    fn record_size(tree: &mut UITree, key: UIKey, _old: Size, new: Size) -> Result<()> {
        let observed = Point::new(new.width, new.height);
        tree.set_attached_value(LAST_SIZE, key, PropertyValue::Point(observed));
        Ok(())
    }

    #[test]
    fn size_changed_fires_only_on_actual_change() {
        let mut tree = UITree::new(UIElement::panel(None));
        let root = tree.root;
        tree.add_size_changed_handler(root, record_size);

        let mut dispatcher = Dispatcher::new();
        dispatcher
            .run_layout_pass(&mut tree, Size::new(200.0, 100.0))
            .unwrap();
        assert_eq!(
            tree.attached_value(LAST_SIZE, root),
            Some(&PropertyValue::Point(Point::new(200.0, 100.0)))
        );

        // Same viewport: nothing resizes, so the handler must not run again.
        let sentinel = PropertyValue::Point(Point::new(-1.0, -1.0));
        tree.set_attached_value(LAST_SIZE, root, sentinel.clone());
        dispatcher
            .run_layout_pass(&mut tree, Size::new(200.0, 100.0))
            .unwrap();
        assert_eq!(tree.attached_value(LAST_SIZE, root), Some(&sentinel));
    }

    fn fail_on_layout(_tree: &mut UITree, _key: UIKey) -> Result<()> {
        Err(RuntimeError::SourceNotDecoded {
            uri: SmolStr::new_static("pending.png"),
        })
    }

    #[test]
    fn handler_errors_surface_to_the_caller() {
        let mut tree = UITree::new(UIElement::panel(None));
        let root = tree.root;
        tree.add_layout_updated_handler(root, fail_on_layout);

        let mut dispatcher = Dispatcher::new();
        let result = dispatcher.run_layout_pass(&mut tree, Size::new(10.0, 10.0));
        assert!(matches!(
            result,
            Err(RuntimeError::SourceNotDecoded { .. })
        ));
    }
}
