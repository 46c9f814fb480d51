//! Flat key list → one directory level of nodes, and path → breadcrumbs.
//!
//! Pure functions only: the same inputs always yield the same output.

use std::cmp::Ordering;
use std::collections::HashSet;

/// Label of the synthetic first breadcrumb.
pub const ROOT_LABEL: &str = "Root";

/// One entry visible at the current directory level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Full object key; for folders, the synthetic prefix of the folder.
    pub key: String,
    /// Single path segment relative to the current path.
    pub name: String,
    pub is_folder: bool,
    /// Byte size. The listing carries no sizes, so this is `None` for keys
    /// coming from the collaborator.
    pub size: Option<u64>,
}

impl Node {
    fn file(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            is_folder: false,
            size: None,
        }
    }

    fn folder(key: String, name: &str) -> Self {
        Self {
            key,
            name: name.to_string(),
            is_folder: true,
            size: None,
        }
    }
}

/// One breadcrumb: a display name and the cumulative path it navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub name: String,
    pub path: String,
}

impl Crumb {
    pub fn root() -> Self {
        Self {
            name: ROOT_LABEL.to_string(),
            path: String::new(),
        }
    }
}

/// Materialize the level of the virtual tree rooted at `current_path`.
///
/// `current_path` is `""` for the root, otherwise a `/`-joined prefix without
/// a trailing slash. Folders come first, then files; each group is ordered by
/// [`locale_cmp`] on the name.
pub fn materialize<S: AsRef<str>>(current_path: &str, keys: &[S]) -> Vec<Node> {
    let prefix = if current_path.is_empty() {
        String::new()
    } else {
        format!("{current_path}/")
    };
    let mut seen_folders: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::new();

    for key in keys {
        let key = key.as_ref();

        if !current_path.is_empty() && key != current_path && !key.starts_with(&prefix) {
            continue;
        }
        // The directory's own marker key. Only applies below the root: an
        // empty key at the root is dropped by the empty-relative check.
        if !current_path.is_empty() && key == current_path {
            continue;
        }

        let relative = key.strip_prefix(prefix.as_str()).unwrap_or(key);
        if relative.is_empty() {
            continue;
        }

        match relative.split_once('/') {
            None => nodes.push(Node::file(key, relative)),
            Some((folder, _)) => {
                if seen_folders.insert(folder) {
                    let folder_key = if current_path.is_empty() {
                        folder.to_string()
                    } else {
                        format!("{current_path}/{folder}")
                    };
                    nodes.push(Node::folder(folder_key, folder));
                }
            }
        }
    }

    nodes.sort_by(|a, b| {
        b.is_folder
            .cmp(&a.is_folder)
            .then_with(|| locale_cmp(&a.name, &b.name))
    });
    nodes
}

/// Case-insensitive name order with lower case ahead of upper case on ties,
/// the way a locale collator orders plain names.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Breadcrumb trail for `path`, always starting with the root crumb.
///
/// Empty segments (leading, trailing or doubled slashes) are skipped.
pub fn breadcrumbs_for(path: &str) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb::root()];
    let mut running = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !running.is_empty() {
            running.push('/');
        }
        running.push_str(segment);
        crumbs.push(Crumb {
            name: segment.to_string(),
            path: running.clone(),
        });
    }
    crumbs
}
