//! Scope construction settings

use serde::Deserialize;

/// Settings for chain caching, accumulator pooling and conflict policy.
///
/// Every field has a default, so a partial TOML table is enough:
///
/// ```toml
/// cache_capacity = 1024
/// allow_nested_function_shadowing = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Maximum number of cached chains per factory
    pub cache_capacity: usize,
    /// Maximum number of cleared accumulators kept by a pool
    pub pool_retained: usize,
    /// Locals of a lambda or local function may reuse names of the enclosing member
    pub allow_nested_function_shadowing: bool,
    /// Assembly that is being compiled, for internal accessibility
    pub source_assembly: u32,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 4096,
            pool_retained: 64,
            allow_nested_function_shadowing: true,
            source_assembly: 0,
        }
    }
}
