//! Runtime configuration: one JSON document, every field optional, environment on top.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::diagram::driver::DriveOpts;
use crate::explain::flow::FlowOpts;
use crate::foundation::error::{PipevizError, PipevizResult};
use crate::generate::gemini::{BASE_URL_VAR, GeminiOpts, MODEL_VAR};
use crate::stages::AnimationOpts;
use crate::stages::gulf_stream::LeaderPolicy;

pub const SEED_VAR: &str = "PIPEVIZ_SEED";
pub const LEADER_POLICY_VAR: &str = "PIPEVIZ_LEADER_POLICY";
pub const TIMEOUT_VAR: &str = "PIPEVIZ_TIMEOUT_MS";
pub const TICK_VAR: &str = "PIPEVIZ_TICK_MS";

/// All knobs, grouped by the component that reads them.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipevizConfig {
    pub animation: AnimationOpts,
    pub flow: FlowOpts,
    pub drive: DriveOpts,
    pub gemini: GeminiOpts,
}

impl PipevizConfig {
    /// Parse from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PipevizResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PipevizError::config(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PipevizResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|e| PipevizError::config(format!("open config '{}': {e}", path.display())))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Defaults, or `path` if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> PipevizResult<Self> {
        let base = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        base.with_overrides(|k| std::env::var(k).ok())
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> PipevizResult<Self> {
        if let Some(v) = lookup(SEED_VAR) {
            self.animation.seed = parse_num(SEED_VAR, &v)?;
        }
        if let Some(v) = lookup(LEADER_POLICY_VAR) {
            self.animation.leader_policy = match v.trim() {
                "uniform" => LeaderPolicy::Uniform,
                "stake_weighted" | "stake-weighted" => LeaderPolicy::StakeWeighted,
                other => {
                    return Err(PipevizError::config(format!(
                        "{LEADER_POLICY_VAR}: unknown policy '{other}'"
                    )));
                }
            };
        }
        if let Some(v) = lookup(TIMEOUT_VAR) {
            self.flow.timeout_ms = parse_num(TIMEOUT_VAR, &v)?;
        }
        if let Some(v) = lookup(TICK_VAR) {
            self.drive.tick_ms = parse_num(TICK_VAR, &v)?;
        }
        if let Some(v) = lookup(MODEL_VAR) {
            self.gemini.model = v;
        }
        if let Some(v) = lookup(BASE_URL_VAR) {
            self.gemini.base_url = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> PipevizResult<()> {
        if self.flow.timeout_ms == 0 {
            return Err(PipevizError::config("flow.timeout_ms must be > 0"));
        }
        if self.drive.tick_ms == 0 {
            return Err(PipevizError::config("drive.tick_ms must be > 0"));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(PipevizError::config("gemini.model must not be empty"));
        }
        if !self.gemini.base_url.starts_with("http") {
            return Err(PipevizError::config(format!(
                "gemini.base_url must be an http(s) URL, got '{}'",
                self.gemini.base_url
            )));
        }
        Ok(())
    }
}

fn parse_num(var: &str, v: &str) -> PipevizResult<u64> {
    v.trim()
        .parse()
        .map_err(|e| PipevizError::config(format!("{var}: '{v}' is not a number: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
