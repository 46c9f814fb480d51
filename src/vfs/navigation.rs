use crate::vfs::path::{breadcrumbs_for, Crumb};

/// Current virtual directory and its breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_path: String,
    pub breadcrumbs: Vec<Crumb>,
}

/// Owns the navigation state. Every transition returns `true` so callers
/// know a listing refresh is due.
#[derive(Debug, Clone)]
pub struct NavigationController {
    state: NavigationState,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new("")
    }
}

impl NavigationController {
    /// Start at `path`; stray leading or trailing slashes are dropped.
    pub fn new(path: &str) -> Self {
        let path = normalize(path);
        Self {
            state: NavigationState {
                breadcrumbs: breadcrumbs_for(&path),
                current_path: path,
            },
        }
    }

    pub fn current_path(&self) -> &str {
        &self.state.current_path
    }

    pub fn breadcrumbs(&self) -> &[Crumb] {
        &self.state.breadcrumbs
    }

    /// Enter the folder whose synthetic key is `folder_key`.
    pub fn navigate_to_folder(&mut self, folder_key: &str) -> bool {
        self.set_path(folder_key);
        true
    }

    /// Jump to a crumb's stored path.
    pub fn navigate_to_breadcrumb(&mut self, path: &str) -> bool {
        self.set_path(path);
        true
    }

    /// Go one level up. Returns `false` at the root.
    pub fn navigate_up(&mut self) -> bool {
        let crumbs = &self.state.breadcrumbs;
        if crumbs.len() < 2 {
            return false;
        }
        let parent = crumbs[crumbs.len() - 2].path.clone();
        self.navigate_to_breadcrumb(&parent)
    }

    fn set_path(&mut self, path: &str) {
        self.state.current_path = path.to_string();
        self.state.breadcrumbs = breadcrumbs_for(path);
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::path::ROOT_LABEL;

    #[test]
    fn starts_at_root_with_root_crumb() {
        let nav = NavigationController::default();
        assert_eq!(nav.current_path(), "");
        assert_eq!(nav.breadcrumbs(), &[Crumb::root()]);
    }

    #[test]
    fn initial_path_is_normalized() {
        let nav = NavigationController::new("/docs//img/");
        assert_eq!(nav.current_path(), "docs/img");
        assert_eq!(nav.breadcrumbs().len(), 3);
    }

    #[test]
    fn navigate_to_folder_round_trips_through_crumbs() {
        for key in ["docs", "docs/img", "a/b/c/d"] {
            let mut nav = NavigationController::default();
            assert!(nav.navigate_to_folder(key));
            let joined = nav
                .breadcrumbs()
                .iter()
                .skip(1)
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join("/");
            assert_eq!(joined, key);
            assert_eq!(nav.breadcrumbs()[0].name, ROOT_LABEL);
        }
    }

    #[test]
    fn navigate_to_breadcrumb_truncates_trail() {
        let mut nav = NavigationController::new("a/b/c");
        let target = nav.breadcrumbs()[1].path.clone();
        nav.navigate_to_breadcrumb(&target);
        assert_eq!(nav.current_path(), "a");
        assert_eq!(nav.breadcrumbs().len(), 2);
    }

    #[test]
    fn navigate_up_stops_at_root() {
        let mut nav = NavigationController::new("a/b");
        assert!(nav.navigate_up());
        assert_eq!(nav.current_path(), "a");
        assert!(nav.navigate_up());
        assert_eq!(nav.current_path(), "");
        assert!(!nav.navigate_up());
    }
}
