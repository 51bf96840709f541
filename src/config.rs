use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GradeError, GradeResult};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weight of each quality dimension in the base score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub hook: f64,
    pub retention: f64,
    pub clarity: f64,
    pub usefulness_originality: f64,
    pub audience_specific_value: f64,
    pub engagement: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hook: 0.15,
            retention: 0.20,
            clarity: 0.10,
            usefulness_originality: 0.35,
            audience_specific_value: 0.10,
            engagement: 0.10,
        }
    }
}

impl ScoreWeights {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.hook,
            self.retention,
            self.clarity,
            self.usefulness_originality,
            self.audience_specific_value,
            self.engagement,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutConfig {
    pub max_payout_per_1k_views: f64,
    pub min_payout_threshold: f64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            max_payout_per_1k_views: 1.0,
            min_payout_threshold: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 120,
            upload_timeout_secs: 900,
        }
    }
}

impl GeminiConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The API key, or a configuration error naming the variable to set.
    pub fn require_api_key(&self) -> GradeResult<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(GradeError::config(
                "GEMINI_API_KEY not found. Set it in the environment, a .env file, \
                 or `gemini.api_key` in the config file",
            )),
        }
    }
}

/// Upload readiness polling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            timeout_secs: 300,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    pub weights: ScoreWeights,
    pub payout: PayoutConfig,
    pub gemini: GeminiConfig,
    pub polling: PollConfig,
}

impl GraderConfig {
    pub fn load(path: Option<&Path>) -> GradeResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> GradeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GradeError::config(format!("read config {} failed: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| GradeError::config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> GradeResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL").filter(|v| !v.trim().is_empty()) {
            debug!(model = %model, "model overridden from environment");
            self.gemini.model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.gemini.base_url = url;
        }
        if let Some(value) =
            lookup("CLIPGRADE_MAX_PAYOUT_PER_1K_VIEWS").filter(|v| !v.trim().is_empty())
        {
            self.payout.max_payout_per_1k_views =
                parse_f64("CLIPGRADE_MAX_PAYOUT_PER_1K_VIEWS", &value)?;
        }
        if let Some(value) =
            lookup("CLIPGRADE_MIN_PAYOUT_THRESHOLD").filter(|v| !v.trim().is_empty())
        {
            self.payout.min_payout_threshold =
                parse_f64("CLIPGRADE_MIN_PAYOUT_THRESHOLD", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> GradeResult<()> {
        let weights = self.weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(GradeError::config(
                "score weights must be finite and non-negative",
            ));
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(GradeError::config(format!(
                "score weights must sum to 1.0 (got {sum})"
            )));
        }

        let payout = &self.payout;
        if !(0.0..100.0).contains(&payout.min_payout_threshold) {
            return Err(GradeError::config(format!(
                "min_payout_threshold must be in [0, 100) (got {})",
                payout.min_payout_threshold
            )));
        }
        if !payout.max_payout_per_1k_views.is_finite() || payout.max_payout_per_1k_views < 0.0 {
            return Err(GradeError::config(format!(
                "max_payout_per_1k_views must be a non-negative number (got {})",
                payout.max_payout_per_1k_views
            )));
        }

        if self.polling.interval_ms == 0 {
            return Err(GradeError::config("polling.interval_ms must be positive"));
        }
        Ok(())
    }
}

fn parse_f64(name: &str, value: &str) -> GradeResult<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| GradeError::config(format!("{name} must be a number (got {value:?})")))
}
