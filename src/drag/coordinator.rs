//! Drag state machine for folder and link reordering.
//!
//! Independent of any event system: the presentation layer forwards
//! start/over/leave/drop/end gestures with element ids, and gets back a
//! [`DropPlan`] when a drop is valid. Folders only drop on folders and links
//! only on links.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Folder,
    Item,
}

impl fmt::Display for DragKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Folder => "folder",
            Self::Item => "item",
        })
    }
}

/// Side of the target the dragged element lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// A validated drop: put `dragged` next to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPlan<Id> {
    pub kind: DragKind,
    pub dragged: Id,
    pub target: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DragState<Id> {
    Idle,
    Dragging { element: Id, kind: DragKind },
}

/// At most one drag in flight, plus the highlighted drop target.
#[derive(Debug, Clone)]
pub struct DragCoordinator<Id> {
    state: DragState<Id>,
    over: Option<Id>,
}

impl<Id> Default for DragCoordinator<Id> {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            over: None,
        }
    }
}

impl<Id: Clone + PartialEq> DragCoordinator<Id> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging `element`. Replaces any drag already in flight.
    pub fn drag_start(&mut self, element: Id, kind: DragKind) {
        self.state = DragState::Dragging { element, kind };
        self.over = None;
    }

    /// Pointer entered `element`. Marks it as drop target when the kinds
    /// match; returns whether it was marked.
    pub fn drag_over(&mut self, element: Id, kind: DragKind) -> bool {
        if self.kind() != Some(kind) {
            return false;
        }
        self.over = Some(element);
        true
    }

    /// Pointer left `element`.
    pub fn drag_leave(&mut self, element: &Id) {
        if self.over.as_ref() == Some(element) {
            self.over = None;
        }
    }

    /// Release over `element`. Clears the affordance, and yields a plan when
    /// `element` is a same-kind target other than the dragged element.
    pub fn drop(&mut self, element: Id, kind: DragKind) -> Option<DropPlan<Id>> {
        self.over = None;
        let DragState::Dragging {
            element: dragged,
            kind: dragged_kind,
        } = &self.state
        else {
            return None;
        };
        if *dragged_kind != kind || *dragged == element {
            return None;
        }
        Some(DropPlan {
            kind,
            dragged: dragged.clone(),
            target: element,
        })
    }

    /// End of gesture, whether or not a drop happened.
    pub fn drag_end(&mut self) {
        self.state = DragState::Idle;
        self.over = None;
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    #[must_use]
    pub const fn dragged(&self) -> Option<&Id> {
        match &self.state {
            DragState::Dragging { element, .. } => Some(element),
            DragState::Idle => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> Option<DragKind> {
        match &self.state {
            DragState::Dragging { kind, .. } => Some(*kind),
            DragState::Idle => None,
        }
    }

    /// Element currently highlighted as drop target.
    #[must_use]
    pub const fn drop_target(&self) -> Option<&Id> {
        self.over.as_ref()
    }
}

/// Where `dragged` lands relative to `target` among `siblings`.
///
/// Dragging forward lands after the target, anything else lands before it.
#[must_use]
pub fn placement<Id: PartialEq>(siblings: &[Id], dragged: &Id, target: &Id) -> Placement {
    let dragged_at = siblings.iter().position(|s| s == dragged);
    let target_at = siblings.iter().position(|s| s == target);
    match (dragged_at, target_at) {
        (Some(d), Some(t)) if d < t => Placement::After,
        _ => Placement::Before,
    }
}

/// Move `list[from]` next to `list[to]` per [`placement`].
///
/// Returns `false` (and leaves `list` alone) for equal or out-of-range
/// indices. Afterwards the moved element sits at index `to`.
pub fn move_adjacent<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= list.len() || to >= list.len() {
        return false;
    }
    let element = list.remove(from);
    // Forward moves shift the target left by one.
    list.insert(to, element);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn full_gesture_yields_plan() {
        let mut drag = DragCoordinator::new();
        drag.drag_start("a", DragKind::Folder);
        assert!(drag.drag_over("b", DragKind::Folder));
        assert_eq!(drag.drop_target(), Some(&"b"));
        let plan = drag.drop("b", DragKind::Folder).unwrap();
        assert_eq!(plan.dragged, "a");
        assert_eq!(plan.target, "b");
        assert_eq!(drag.drop_target(), None);
        drag.drag_end();
        assert!(!drag.is_dragging());
    }

    #[test]
    fn kinds_never_mix() {
        let mut drag = DragCoordinator::new();
        drag.drag_start("folder", DragKind::Folder);
        assert!(!drag.drag_over("link", DragKind::Item));
        assert_eq!(drag.drop_target(), None);
        assert_eq!(drag.drop("link", DragKind::Item), None);

        drag.drag_start("link", DragKind::Item);
        assert_eq!(drag.drop("folder", DragKind::Folder), None);
    }

    #[test]
    fn drop_on_self_or_without_drag_is_ignored() {
        let mut drag = DragCoordinator::new();
        assert_eq!(drag.drop("a", DragKind::Item), None);
        drag.drag_start("a", DragKind::Item);
        assert_eq!(drag.drop("a", DragKind::Item), None);
    }

    #[test]
    fn leave_clears_only_its_own_affordance() {
        let mut drag = DragCoordinator::new();
        drag.drag_start(1, DragKind::Item);
        drag.drag_over(2, DragKind::Item);
        drag.drag_leave(&3);
        assert_eq!(drag.drop_target(), Some(&2));
        drag.drag_leave(&2);
        assert_eq!(drag.drop_target(), None);
    }

    #[test]
    fn drag_end_always_returns_to_idle() {
        let mut drag = DragCoordinator::new();
        drag.drag_start(1, DragKind::Folder);
        drag.drag_over(2, DragKind::Folder);
        drag.drag_end();
        assert_eq!(drag.dragged(), None);
        assert_eq!(drag.drop_target(), None);
        assert_eq!(drag.kind(), None);
    }

    #[test]
    fn placement_follows_direction() {
        let list = ["a", "b", "c"];
        assert_eq!(placement(&list, &"a", &"c"), Placement::After);
        assert_eq!(placement(&list, &"c", &"a"), Placement::Before);
        assert_eq!(placement(&list, &"x", &"a"), Placement::Before);
    }

    #[test]
    fn move_adjacent_examples() {
        let mut forward = vec!['a', 'b', 'c', 'd'];
        assert!(move_adjacent(&mut forward, 0, 2));
        assert_eq!(forward, ['b', 'c', 'a', 'd']);

        let mut backward = vec!['a', 'b', 'c', 'd'];
        assert!(move_adjacent(&mut backward, 3, 1));
        assert_eq!(backward, ['a', 'd', 'b', 'c']);

        let mut untouched = vec![1, 2];
        assert!(!move_adjacent(&mut untouched, 0, 5));
        assert!(!move_adjacent(&mut untouched, 1, 1));
        assert_eq!(untouched, [1, 2]);
    }

    proptest! {
        #[test]
        fn move_adjacent_places_next_to_target(len in 2usize..12, from in 0usize..12, to in 0usize..12) {
            prop_assume!(from < len && to < len && from != to);
            let original: Vec<usize> = (0..len).collect();
            let mut list = original.clone();
            let dragged = original[from];
            let target = original[to];
            let side = placement(&original, &dragged, &target);
            prop_assert!(move_adjacent(&mut list, from, to));

            let d = list.iter().position(|&x| x == dragged).unwrap();
            let t = list.iter().position(|&x| x == target).unwrap();
            match side {
                Placement::After => prop_assert_eq!(d, t + 1),
                Placement::Before => prop_assert_eq!(d + 1, t),
            }
            let rest: Vec<usize> = list.iter().copied().filter(|&x| x != dragged).collect();
            let want: Vec<usize> = original.iter().copied().filter(|&x| x != dragged).collect();
            prop_assert_eq!(rest, want);
        }
    }
}
