#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Remote module installation for envmap
//!
//! The delivery provider is opaque: it can say whether a module is
//! installed, start an install session that reports ordered status events,
//! and list and open the files of an installed module. [`ModuleInstaller`]
//! wraps one provider for one module, folds its status events into a
//! [`ModuleState`](envmap_types::ModuleState) and fans the outcome out to
//! every caller attached to the in-flight install.

mod assets;
mod fs_provider;
mod installer;
mod progress;
mod provider;

pub use assets::ModuleAssets;
pub use fs_provider::FsModuleProvider;
pub use installer::{DoneCallback, ModuleInstaller, ProgressCallback};
pub use progress::{percent, ProgressTracker};
pub use provider::{error_codes, ModuleProvider, SessionEvents, SessionState, SessionStatus};
