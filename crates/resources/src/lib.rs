#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Resource management utilities for envmap
//!
//! Centralizes the permits that bound concurrent work: open asset streams
//! and module installs. Every stream task and install driver acquires its
//! permit through this crate so that shutdown can close the pools in one
//! place.

pub mod limits;
pub mod manager;
pub mod semaphore;

pub use limits::{ResourceAvailability, ResourceLimits};
pub use manager::ResourceManager;
pub use semaphore::{acquire_semaphore_permit, create_semaphore, try_acquire_semaphore_permit};
