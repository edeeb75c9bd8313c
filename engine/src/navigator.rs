use crate::types::ResultItem;

/// Active-selection state over the rendered result list.
///
/// `active` is `None` exactly when the list is empty. Movement methods
/// return the index the view should mark, or `None` when the key is a no-op.
#[derive(Debug, Default)]
pub struct KeyboardNavigator {
    items: Vec<ResultItem>,
    active: Option<usize>,
}

impl KeyboardNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Install a new list; the first row becomes active
    pub fn replace(&mut self, items: Vec<ResultItem>) -> Option<usize> {
        self.items = items;
        self.active = if self.items.is_empty() { None } else { Some(0) };
        self.active
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.active = None;
    }

    pub fn move_down(&mut self) -> Option<usize> {
        let last = self.items.len().checked_sub(1)?;
        let next = self.active.map_or(0, |i| (i + 1).min(last));
        self.active = Some(next);
        self.active
    }

    pub fn move_up(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let prev = self.active.map_or(0, |i| i.saturating_sub(1));
        self.active = Some(prev);
        self.active
    }

    /// Pointer moved over row `index`. Returns it only when the selection changed.
    pub fn hover(&mut self, index: usize) -> Option<usize> {
        if index >= self.items.len() || self.active == Some(index) {
            return None;
        }
        self.active = Some(index);
        self.active
    }

    /// Link target of the active row
    pub fn active_target(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.items.get(i))
            .map(ResultItem::href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn items(n: usize) -> Vec<ResultItem> {
        (0..n)
            .map(|i| ResultItem {
                reference: format!("/p{}", i),
                title: format!("Page {}", i),
                snippet_html: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_empty_list_is_noop() {
        let mut nav = KeyboardNavigator::new();
        assert_eq!(nav.move_down(), None);
        assert_eq!(nav.move_up(), None);
        assert_eq!(nav.hover(0), None);
        assert_eq!(nav.active(), None);
        assert_eq!(nav.active_target(), None);
    }

    #[test]
    fn test_arrow_down_clamps() {
        let mut nav = KeyboardNavigator::new();
        assert_eq!(nav.replace(items(3)), Some(0));
        for _ in 0..4 {
            nav.move_down();
        }
        assert_eq!(nav.active(), Some(2));
        assert_eq!(nav.active_target(), Some("/p2"));
    }

    #[test]
    fn test_arrow_up_clamps() {
        let mut nav = KeyboardNavigator::new();
        nav.replace(items(3));
        nav.move_down();
        assert_eq!(nav.move_up(), Some(0));
        assert_eq!(nav.move_up(), Some(0));
    }

    #[test]
    fn test_hover_sets_directly() {
        let mut nav = KeyboardNavigator::new();
        nav.replace(items(5));
        assert_eq!(nav.hover(3), Some(3));
        assert_eq!(nav.hover(3), None);
        assert_eq!(nav.hover(9), None);
        assert_eq!(nav.active(), Some(3));
    }

    #[test]
    fn test_replace_and_clear() {
        let mut nav = KeyboardNavigator::new();
        nav.replace(items(2));
        nav.move_down();
        assert_eq!(nav.replace(items(4)), Some(0));
        nav.clear();
        assert!(nav.is_empty());
        assert_eq!(nav.active(), None);
        assert_eq!(nav.replace(Vec::new()), None);
    }

    #[derive(Debug, Clone)]
    enum Key {
        Up,
        Down,
        Hover(usize),
    }

    fn key_strategy() -> impl Strategy<Value = Key> {
        prop_oneof![
            Just(Key::Up),
            Just(Key::Down),
            (0usize..12).prop_map(Key::Hover),
        ]
    }

    proptest! {
        #[test]
        fn prop_active_index_stays_valid(
            len in 0usize..8,
            keys in prop::collection::vec(key_strategy(), 0..30),
        ) {
            let mut nav = KeyboardNavigator::new();
            nav.replace(items(len));
            for key in keys {
                match key {
                    Key::Up => { nav.move_up(); }
                    Key::Down => { nav.move_down(); }
                    Key::Hover(i) => { nav.hover(i); }
                }
                match nav.active() {
                    Some(i) => prop_assert!(i < len),
                    None => prop_assert_eq!(len, 0),
                }
            }
        }
    }
}
