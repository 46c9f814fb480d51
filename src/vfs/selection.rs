use std::collections::BTreeSet;

/// Keys checked for batch actions.
///
/// Membership is independent of what is currently visible: a key stays
/// selected after navigating away or filtering it out, and is not pruned when
/// the listing changes.
#[derive(Debug, Default, Clone)]
pub struct SelectionModel {
    keys: BTreeSet<String>,
}

impl SelectionModel {
    /// Flip `key`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.keys.remove(key) {
            false
        } else {
            self.keys.insert(key.to_string());
            true
        }
    }

    /// Add every visible file key.
    pub fn select_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a str>) {
        self.keys.extend(visible.into_iter().map(str::to_string));
    }

    /// Remove exactly the visible keys, leaving selections made elsewhere.
    pub fn deselect_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a str>) {
        for key in visible {
            self.keys.remove(key);
        }
    }

    /// Drive the "select all" checkbox: uncheck it when checked, check it
    /// otherwise. Uses the same predicate the checkbox renders from.
    pub fn toggle_all(&mut self, visible: &[&str]) {
        if self.all_checked(visible) {
            self.deselect_all(visible.iter().copied());
        } else {
            self.select_all(visible.iter().copied());
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn count(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Selected keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }

    /// Checked state of the "select all" checkbox: every visible file is
    /// selected. Keys selected in other folders do not count toward it.
    pub fn all_checked(&self, visible: &[&str]) -> bool {
        !visible.is_empty() && visible.iter().all(|k| self.keys.contains(*k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_membership() {
        let mut sel = SelectionModel::default();
        assert!(sel.toggle("a"));
        assert!(sel.is_selected("a"));
        assert!(!sel.toggle("a"));
        assert!(!sel.is_selected("a"));
        assert_eq!(sel.count(), 0);
    }

    #[test]
    fn deselect_all_removes_only_visible_keys() {
        let mut sel = SelectionModel::default();
        sel.toggle("other/hidden.txt");
        sel.select_all(["a", "b"]);
        assert_eq!(sel.count(), 3);
        sel.deselect_all(["a", "b"]);
        assert_eq!(sel.keys(), vec!["other/hidden.txt".to_string()]);
    }

    #[test]
    fn all_checked_requires_every_visible_key() {
        let mut sel = SelectionModel::default();
        assert!(!sel.all_checked(&[]));
        sel.select_all(["a", "b"]);
        assert!(sel.all_checked(&["a", "b"]));
        assert!(!sel.all_checked(&["a", "b", "c"]));
    }

    #[test]
    fn selections_elsewhere_do_not_check_the_box() {
        let mut sel = SelectionModel::default();
        sel.toggle("root.txt");
        let visible = ["docs/readme.md"];
        assert!(!sel.all_checked(&visible));

        sel.toggle_all(&visible);
        assert!(sel.is_selected("docs/readme.md"));
        assert!(sel.all_checked(&visible));

        sel.toggle_all(&visible);
        assert!(!sel.is_selected("docs/readme.md"));
        assert_eq!(sel.keys(), vec!["root.txt".to_string()]);
    }

    #[test]
    fn toggle_all_checks_then_unchecks_visible() {
        let mut sel = SelectionModel::default();
        let visible = ["x", "y"];
        sel.toggle_all(&visible);
        assert!(sel.is_selected("x") && sel.is_selected("y"));
        sel.toggle_all(&visible);
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_all_with_partial_selection_selects_rest() {
        let mut sel = SelectionModel::default();
        sel.toggle("x");
        sel.toggle_all(&["x", "y"]);
        assert_eq!(sel.count(), 2);
    }

    #[test]
    fn clear_empties_everything() {
        let mut sel = SelectionModel::default();
        sel.select_all(["a", "b", "c"]);
        sel.clear();
        assert!(sel.is_empty());
    }
}
