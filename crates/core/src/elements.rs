//! Element sequence mutations.
//!
//! Every operation takes the current sequence and returns a new one, or
//! `None` when the call is a no-op (unknown id, boundary move, empty patch).
//! The caller decides what a successful mutation means for history and
//! dirty tracking; a `None` must leave both untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::form::{FormElement, Position};
use crate::types::ElementId;

/// Default position delta applied to duplicated elements, on both axes.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Direction of a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Index of the element with the given id.
pub fn index_of(elements: &[FormElement], id: ElementId) -> Option<usize> {
    elements.iter().position(|el| el.id() == id)
}

/// Append a new element of `element_type`, or insert it at `index` (clamped
/// to the sequence length) when dropped onto a specific slot.
///
/// Returns the new sequence and the id of the created element.
pub fn add(
    elements: &[FormElement],
    element_type: &str,
    index: Option<usize>,
) -> (Vec<FormElement>, ElementId) {
    let element = FormElement::from_template(element_type);
    let id = element.id();
    let mut next = elements.to_vec();
    match index {
        Some(i) => next.insert(i.min(next.len()), element),
        None => next.push(element),
    }
    (next, id)
}

/// Shallow-merge `patch` into the props of element `id`.
///
/// No-op when the id is unknown or the merge would not change anything.
pub fn update(
    elements: &[FormElement],
    id: ElementId,
    patch: &Map<String, Value>,
) -> Option<Vec<FormElement>> {
    let index = index_of(elements, id)?;
    let current = &elements[index].props;
    if patch.iter().all(|(k, v)| current.get(k) == Some(v)) {
        return None;
    }

    let mut next = elements.to_vec();
    for (key, value) in patch {
        next[index].props.insert(key.clone(), value.clone());
    }
    Some(next)
}

/// Remove element `id`. No-op when the id is unknown.
pub fn delete(elements: &[FormElement], id: ElementId) -> Option<Vec<FormElement>> {
    let index = index_of(elements, id)?;
    let mut next = elements.to_vec();
    next.remove(index);
    Some(next)
}

/// Clone element `id` under a fresh identity, shifted by `offset`, directly
/// after the source.
///
/// Returns the new sequence and the id of the copy.
pub fn duplicate(
    elements: &[FormElement],
    id: ElementId,
    offset: f64,
) -> Option<(Vec<FormElement>, ElementId)> {
    let index = index_of(elements, id)?;
    let copy = elements[index].duplicate(offset);
    let copy_id = copy.id();
    let mut next = elements.to_vec();
    next.insert(index + 1, copy);
    Some((next, copy_id))
}

/// Swap element `id` with its neighbour in `direction`.
///
/// No-op when the id is unknown or the element already sits at that end.
pub fn move_element(
    elements: &[FormElement],
    id: ElementId,
    direction: Direction,
) -> Option<Vec<FormElement>> {
    let index = index_of(elements, id)?;
    let target = match direction {
        Direction::Up => index.checked_sub(1)?,
        Direction::Down => {
            if index + 1 >= elements.len() {
                return None;
            }
            index + 1
        }
    };
    let mut next = elements.to_vec();
    next.swap(index, target);
    Some(next)
}

/// How many single-step moves element `id` can make in `direction`.
pub fn room(elements: &[FormElement], id: ElementId, direction: Direction) -> Option<usize> {
    let index = index_of(elements, id)?;
    Some(match direction {
        Direction::Up => index,
        Direction::Down => elements.len() - 1 - index,
    })
}

/// Remove the element at `from` and reinsert it at `to` in one rebuild.
///
/// `to` is clamped to the last index. No-op when `from` is out of range or
/// the element would not move.
pub fn reorder(elements: &[FormElement], from: usize, to: usize) -> Option<Vec<FormElement>> {
    if from >= elements.len() {
        return None;
    }
    let to = to.min(elements.len() - 1);
    if from == to {
        return None;
    }
    let mut next = elements.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Some(next)
}

/// Drop element `id` onto slot `target`. Same result as [`reorder`] from the
/// element's current index.
pub fn move_to_index(
    elements: &[FormElement],
    id: ElementId,
    target: usize,
) -> Option<Vec<FormElement>> {
    let from = index_of(elements, id)?;
    reorder(elements, from, target)
}

/// Overwrite the position hint of element `id`. No-op when unknown or unchanged.
pub fn reposition(
    elements: &[FormElement],
    id: ElementId,
    position: Position,
) -> Option<Vec<FormElement>> {
    let index = index_of(elements, id)?;
    if elements[index].position == position {
        return None;
    }
    let mut next = elements.to_vec();
    next[index].position = position;
    Some(next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
