//! Build metadata embedded by `build.rs`.

use serde::Serialize;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => "unknown",
};

const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

const BUILD_TIMESTAMP: &str = match option_env!("VERGEN_BUILD_TIMESTAMP") {
    Some(ts) => ts,
    None => "unknown",
};

/// Where and when this binary was built. Fields are "unknown" when the
/// build ran outside a git checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub branch: &'static str,
    pub sha: &'static str,
    pub dirty: bool,
    pub built_at: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: PKG_VERSION,
        branch: GIT_BRANCH,
        sha: short_sha(GIT_SHA),
        dirty: option_env!("VERGEN_GIT_DIRTY") == Some("true"),
        built_at: BUILD_TIMESTAMP,
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// `{version}+{branch}.{sha}`, with `.dirty` appended for a dirty tree,
/// e.g. `0.1.0+main.abc1234`.
pub fn version_string() -> String {
    let info = build_info();
    let dirty = if info.dirty { ".dirty" } else { "" };
    format!("{}+{}.{}{dirty}", info.version, info.branch, info.sha)
}
