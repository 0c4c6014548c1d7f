//! Build metadata and plugin API version accessors.
//!
//! The build script generates `build_info.rs` from `Cargo.toml` metadata so
//! the host and its builtin modules share one source of truth.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Plugin ABI version this host was built against (YYYYMMDD)
pub fn plugin_api_version() -> u32 {
    PLUGIN_API_VERSION
}

/// Major component of a plugin API version (the year)
pub fn api_major(api_version: u32) -> u32 {
    api_version / 10000
}

/// Modules built against the same API year are compatible
pub fn is_api_compatible(module_api_version: u32) -> bool {
    api_major(module_api_version) == api_major(PLUGIN_API_VERSION)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}
