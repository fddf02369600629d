//! Configuration loading from tickbench.toml
//!
//! Runner configuration can be specified in a `tickbench.toml` file in the
//! project root. The configuration is automatically discovered by walking
//! up from the current directory; CLI flags override it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tickbench_core::VerifyConfig;

/// Tickbench runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TickConfig {
    /// Target identification strings
    #[serde(default)]
    pub target: TargetConfig,
    /// Benchmark invocation settings
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    /// Verification checks and printed result fields
    #[serde(default)]
    pub verify: VerifyConfig,
    /// Allocator redirection
    #[serde(default)]
    pub allocator: AllocatorConfig,
}

/// Identification strings printed in every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Member company running the benchmark
    #[serde(default = "default_ident")]
    pub member: String,
    /// Target processor name
    #[serde(default = "default_ident")]
    pub processor: String,
    /// Target board or platform name
    #[serde(default = "default_ident")]
    pub platform: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            member: default_ident(),
            processor: default_ident(),
            platform: default_ident(),
        }
    }
}

fn default_ident() -> String {
    "unknown".to_string()
}

/// Benchmark invocation settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchmarkConfig {
    /// Override the programmed iteration count
    #[serde(default)]
    pub iterations: Option<u64>,
}

/// Allocator redirection settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AllocatorConfig {
    /// Route global allocations through the platform allocator for the
    /// duration of the run
    #[serde(default)]
    pub redirect: bool,
}

impl TickConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current
    /// directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("tickbench.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Tickbench Configuration

[target]
# Identification strings printed in every report (clipped to 16 characters)
member = "unknown"
processor = "unknown"
platform = "unknown"

[benchmark]
# Override the programmed iteration count (uncomment to enable)
# iterations = 100

[verify]
# Digest checking mode: "off", "intrusive", or "non-intrusive"
digest = "non-intrusive"
# Print the four generic verification values as integers
verify_int = false
# Reinterpret the verification value pairs as doubles and print them
verify_float = false

[allocator]
# Route global allocations through the platform allocator
redirect = false
"#
        .to_string()
    }
}
