use std::collections::VecDeque;

use slotmap::SlotMap;

use crate::layout::model::{UIElement, UIKey};

/// Controls how a depth-first traversal proceeds after visiting a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisitAction {
    Continue,
    SkipChildren,
    Stop,
}

/// Standard breadth-first traversal. Parents are always visited before
/// their children.
pub fn visit_bfs<F>(slots: &mut SlotMap<UIKey, UIElement>, element: UIKey, mut visitor: F)
where
    F: FnMut(&mut SlotMap<UIKey, UIElement>, UIKey, Option<UIKey>),
{
    let mut queue: VecDeque<(UIKey, Option<UIKey>)> = VecDeque::from([(element, None)]);

    while let Some((current, parent)) = queue.pop_front() {
        visitor(slots, current, parent);
        for &child in slots[current].children.iter() {
            queue.push_back((child, Some(current)));
        }
    }
}

/// Pre-order depth-first traversal with early exit.
pub fn visit_dfs<F>(slots: &SlotMap<UIKey, UIElement>, element: UIKey, mut visitor: F)
where
    F: FnMut(&SlotMap<UIKey, UIElement>, UIKey, Option<UIKey>) -> VisitAction,
{
    let mut stack: Vec<(UIKey, Option<UIKey>)> = vec![(element, None)];

    while let Some((current, parent)) = stack.pop() {
        match visitor(slots, current, parent) {
            VisitAction::Stop => return,
            VisitAction::SkipChildren => continue,
            VisitAction::Continue => {}
        }

        // Push children in reverse so they are processed in original order
        for &child in slots[current].children.iter().rev() {
            stack.push((child, Some(current)));
        }
    }
}

/// The visual descendants of `element` in pre-order, excluding `element`
/// itself. A snapshot, so the tree may be mutated while iterating it.
pub fn descendants(slots: &SlotMap<UIKey, UIElement>, element: UIKey) -> Vec<UIKey> {
    let mut order = Vec::new();
    visit_dfs(slots, element, |_, key, parent| {
        if parent.is_some() {
            order.push(key);
        }
        VisitAction::Continue
    });
    order
}

/// The visual ancestors of `element`, nearest first.
pub fn ancestors(slots: &SlotMap<UIKey, UIElement>, element: UIKey) -> Vec<UIKey> {
    let mut chain = Vec::new();
    let mut current = slots[element].parent;
    while let Some(key) = current {
        chain.push(key);
        current = slots[key].parent;
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::UIElement;

    fn tree() -> (SlotMap<UIKey, UIElement>, UIKey, [UIKey; 4]) {
        // root -> (a -> (b, c), d)
        let mut slots: SlotMap<UIKey, UIElement> = SlotMap::new();
        let root = slots.insert(UIElement::default());
        let a = slots.insert(UIElement {
            parent: Some(root),
            ..Default::default()
        });
        let b = slots.insert(UIElement {
            parent: Some(a),
            ..Default::default()
        });
        let c = slots.insert(UIElement {
            parent: Some(a),
            ..Default::default()
        });
        let d = slots.insert(UIElement {
            parent: Some(root),
            ..Default::default()
        });
        slots[root].children = vec![a, d];
        slots[a].children = vec![b, c];
        (slots, root, [a, b, c, d])
    }

    #[test]
    fn descendants_are_preorder_and_exclude_start() {
        let (slots, root, [a, b, c, d]) = tree();
        assert_eq!(descendants(&slots, root), vec![a, b, c, d]);
    }

    #[test]
    fn dfs_stops_early() {
        let (slots, root, [a, ..]) = tree();
        let mut visited = Vec::new();
        visit_dfs(&slots, root, |_, key, _| {
            visited.push(key);
            if key == a {
                VisitAction::Stop
            } else {
                VisitAction::Continue
            }
        });
        assert_eq!(visited, vec![root, a]);
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let (slots, root, [a, b, ..]) = tree();
        assert_eq!(ancestors(&slots, b), vec![a, root]);
        assert!(ancestors(&slots, root).is_empty());
    }
}
