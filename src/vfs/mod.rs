//! The virtual filesystem: folders reconstructed from flat key prefixes.

pub mod navigation;
pub mod path;
pub mod search;
pub mod selection;

pub use navigation::NavigationController;
pub use path::{Crumb, Node};
pub use search::SearchFilter;
pub use selection::SelectionModel;
