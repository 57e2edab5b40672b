//! Shared test utilities for the folder-mirror workspace.
//!
//! This crate provides standardised source/replica fixtures so crate test
//! suites do not each rebuild them. It is a dev-dependency only and is
//! never published.
//!
//! # Modules
//!
//! - [`trees`]: [`TestTrees`] builder with source, replica and log
//!   directories

pub mod trees;

pub use trees::TestTrees;
