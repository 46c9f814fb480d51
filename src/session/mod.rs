//! Stateful workflows that talk to the store: listing refreshes, the
//! preview/edit session, batch mutations and local transfers.

pub mod batch;
pub mod listing;
pub mod preview;
pub mod transfer;

pub use listing::{ListingSession, ListingStatus};
