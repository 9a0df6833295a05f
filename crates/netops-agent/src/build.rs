//! Build metadata loading and validation for SONiC and non-SONiC images.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::types::{BuildKind, BuildValidation, NetOpsError, NetOpsResult};

/// Fields every SONiC build must carry.
pub const SONIC_REQUIRED_FIELDS: [&str; 4] = ["version", "platform", "kernel_version", "build_date"];

/// Fields every non-SONiC build must carry.
pub const NON_SONIC_REQUIRED_FIELDS: [&str; 4] =
    ["vendor", "model", "os_version", "firmware_version"];

/// Fields that only produce warnings when absent.
pub const RECOMMENDED_FIELDS: [&str; 3] = ["serial_number", "mac_address", "hostname"];

/// SONiC platform identifiers look like `<arch>-<vendor>_<hwsku>`.
fn sonic_platform_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(x86_64|amd64|arm64|aarch64|armhf)-[a-z0-9]+_[a-z0-9_.\-]+$")
            .expect("static regex")
    })
}

/// Decide the build family from the `type` and `platform` fields.
pub fn classify(build: &Map<String, Value>) -> BuildKind {
    let field = |name: &str| {
        build
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase()
    };
    let build_type = field("type");
    let platform = field("platform");

    if build_type.contains("sonic")
        || platform.contains("sonic")
        || sonic_platform_pattern().is_match(&platform)
    {
        BuildKind::Sonic
    } else {
        BuildKind::NonSonic
    }
}

/// Check required and recommended fields of an already-parsed build object.
pub fn validate_metadata(build: &Map<String, Value>) -> BuildValidation {
    let device_type = classify(build);
    let required: &[&str] = match device_type {
        BuildKind::Sonic => &SONIC_REQUIRED_FIELDS,
        BuildKind::NonSonic => &NON_SONIC_REQUIRED_FIELDS,
    };

    let missing_fields: Vec<String> = required
        .iter()
        .filter(|f| !build.contains_key(**f))
        .map(|f| f.to_string())
        .collect();

    let mut errors = Vec::new();
    if missing_fields.is_empty() {
        tracing::info!("Build metadata validated successfully for {device_type:?} device");
    } else {
        tracing::warn!("Missing required fields: {missing_fields:?}");
        errors.push(format!(
            "Missing required fields: {}",
            missing_fields.join(", ")
        ));
    }

    let warnings = RECOMMENDED_FIELDS
        .iter()
        .filter(|f| !build.contains_key(**f))
        .map(|f| format!("Recommended field missing: {f}"))
        .collect();

    BuildValidation {
        valid: missing_fields.is_empty(),
        device_type,
        errors,
        warnings,
        missing_fields,
        metadata: Value::Object(build.clone()),
    }
}

/// Locates and loads build files under a builds directory.
#[derive(Debug, Clone)]
pub struct BuildCatalog {
    builds_dir: PathBuf,
}

impl BuildCatalog {
    pub fn new(builds_dir: impl Into<PathBuf>) -> Self {
        Self {
            builds_dir: builds_dir.into(),
        }
    }

    pub fn builds_dir(&self) -> &Path {
        &self.builds_dir
    }

    /// Absolute paths are used as-is; relative paths try the builds
    /// directory first, then the working directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = PathBuf::from(path);
        if candidate.is_absolute() {
            return candidate;
        }

        let in_catalog = self.builds_dir.join(&candidate);
        if in_catalog.exists() {
            return in_catalog;
        }

        std::env::current_dir()
            .map(|cwd| cwd.join(&candidate))
            .unwrap_or(candidate)
    }

    /// Load and parse a build file; it must hold a JSON object.
    pub fn load(&self, path: &str) -> NetOpsResult<Map<String, Value>> {
        let resolved = self.resolve(path);
        tracing::debug!("Loading build JSON from: {}", resolved.display());

        if !resolved.exists() {
            return Err(NetOpsError::BuildNotFound(resolved.display().to_string()));
        }

        let contents = std::fs::read_to_string(&resolved)?;
        let value: Value =
            serde_json::from_str(&contents).map_err(|e| NetOpsError::InvalidBuild {
                path: resolved.display().to_string(),
                reason: e.to_string(),
            })?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(NetOpsError::InvalidBuild {
                path: resolved.display().to_string(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Load a build file and validate it.
    pub fn validate(&self, path: &str) -> NetOpsResult<BuildValidation> {
        tracing::info!("Validating build metadata: {path}");
        let build = self.load(path)?;
        Ok(validate_metadata(&build))
    }

    /// Sorted names of the `.json` files in the builds directory.
    pub fn list(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.builds_dir) {
            Ok(entries) => entries,
            Err(_) => {
                tracing::warn!("Builds directory not found: {}", self.builds_dir.display());
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
