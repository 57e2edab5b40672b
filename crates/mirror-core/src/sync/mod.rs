//! One-way tree synchronization
//!
//! This module provides:
//! - **engine**: [`TreeSynchronizer`], the enumerate, decide and act pass
//! - **report**: [`SyncAction`], [`SyncReport`] and [`SyncOptions`]

mod engine;
mod report;

pub use engine::TreeSynchronizer;
pub use report::{SyncAction, SyncOptions, SyncReport};

/// Something that can perform one complete synchronization run.
///
/// The scheduler drives implementations of this trait; it never invokes
/// `run` concurrently on the same instance.
pub trait Synchronizer: Send + Sync {
    fn run(&self) -> SyncReport;
}
