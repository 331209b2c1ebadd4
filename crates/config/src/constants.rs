//! Default names shared by the asset pipeline
//!
//! These mirror how the base package and the remote module lay out their
//! environment maps. All of them can be overridden in the `[assets]` section.

/// Name of the on-demand module that carries the bulk of the assets.
pub const MODULE_NAME: &str = "hdr_assets";

/// Logical directory listed in every source.
pub const ASSET_DIR: &str = "hdri_4k";

/// Case-insensitive suffix an entry needs to be offered to the front-end.
pub const ASSET_SUFFIX: &str = ".hdr";

/// Authority token embedded in remote-module identifiers.
pub const AUTHORITY: &str = "envmap.hdrprovider";

/// Bundle asset returned when every source is empty.
pub const FALLBACK_ASSET: &str = "ex.hdr";

/// Directory name used under the platform data dir.
pub const APP_DIR: &str = "envmap";
