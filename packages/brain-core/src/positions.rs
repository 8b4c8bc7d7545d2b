//! Dense position bookkeeping for ordered siblings.
//!
//! Every ordered collection (lists in a board, cards in a list, checklist
//! items in a card) keeps `position == index` after each mutation.
use crate::types::{ChecklistItem, KanbanCard, KanbanList};

pub trait Positioned {
    fn set_position(&mut self, position: usize);
}

impl Positioned for KanbanCard {
    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl Positioned for KanbanList {
    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl Positioned for ChecklistItem {
    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// Renumber items to 0..n-1 in their current order.
pub fn reindex<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index);
    }
}

/// Insert at `index`, clamped to the end, and renumber.
/// Returns the index the item actually landed at.
pub fn insert_clamped<T: Positioned>(items: &mut Vec<T>, index: usize, item: T) -> usize {
    let at = index.min(items.len());
    items.insert(at, item);
    reindex(items);
    at
}

/// Remove the first item matching `pred` and renumber the rest.
pub fn remove_where<T: Positioned>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Option<T> {
    let index = items.iter().position(pred)?;
    let removed = items.remove(index);
    reindex(items);
    Some(removed)
}

/// Whether positions are exactly 0..n-1 in order.
pub fn is_dense<T>(items: &[T], position: impl Fn(&T) -> usize) -> bool {
    items.iter().enumerate().all(|(index, item)| position(item) == index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, position: usize) -> ChecklistItem {
        ChecklistItem {
            id: id.to_string(),
            text: id.to_string(),
            completed: false,
            position,
        }
    }

    fn ids(items: &[ChecklistItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_reindex_closes_gaps() {
        let mut items = vec![item("a", 3), item("b", 7), item("c", 7)];
        reindex(&mut items);
        assert!(is_dense(&items, |i| i.position));
    }

    #[test]
    fn test_insert_clamped_past_end() {
        let mut items = vec![item("a", 0), item("b", 1)];
        let at = insert_clamped(&mut items, 99, item("c", 99));
        assert_eq!(at, 2);
        assert_eq!(ids(&items), vec!["a", "b", "c"]);
        assert!(is_dense(&items, |i| i.position));
    }

    #[test]
    fn test_insert_front() {
        let mut items = vec![item("a", 0), item("b", 1)];
        insert_clamped(&mut items, 0, item("c", 0));
        assert_eq!(ids(&items), vec!["c", "a", "b"]);
        assert_eq!(items[2].position, 2);
    }

    #[test]
    fn test_remove_where() {
        let mut items = vec![item("a", 0), item("b", 1), item("c", 2)];
        let removed = remove_where(&mut items, |i| i.id == "a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(ids(&items), vec!["b", "c"]);
        assert!(is_dense(&items, |i| i.position));
        assert!(remove_where(&mut items, |i| i.id == "zzz").is_none());
    }
}
