//! Configuration for relevance extraction and prompt building

use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum extracted content length (characters)
    pub budget_chars: usize,

    /// Results shorter than this fall back to the document head (characters)
    pub min_viable_chars: usize,

    /// Fraction of the budget below which an overflowing section may be truncated in
    pub truncation_eligibility: f64,

    /// Maximum extracted content embedded in a generation prompt (characters)
    pub prompt_preview_chars: usize,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.budget_chars == 0 {
            return Err("budget_chars must be greater than 0".to_string());
        }
        if self.min_viable_chars > self.budget_chars {
            return Err("min_viable_chars cannot exceed budget_chars".to_string());
        }
        if !(0.0..=1.0).contains(&self.truncation_eligibility) {
            return Err(format!(
                "truncation_eligibility {} out of range [0.0, 1.0]",
                self.truncation_eligibility
            ));
        }
        if self.prompt_preview_chars == 0 {
            return Err("prompt_preview_chars must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Same settings with a different budget, keeping the viability floor within it
    pub fn with_budget(mut self, budget_chars: usize) -> Self {
        self.budget_chars = budget_chars;
        self.min_viable_chars = self.min_viable_chars.min(budget_chars);
        self
    }
}

impl Default for ExtractorConfig {
    /// Sized for a free-tier request
    fn default() -> Self {
        Self {
            budget_chars: 15_000,
            min_viable_chars: 1_000,
            truncation_eligibility: 0.8,
            prompt_preview_chars: 8_000,
        }
    }
}

impl ExtractorConfig {
    /// Compact preset: smaller requests for tight quotas
    pub fn compact() -> Self {
        Self {
            budget_chars: 8_000,
            min_viable_chars: 800,
            truncation_eligibility: 0.8,
            prompt_preview_chars: 4_000,
        }
    }

    /// Generous preset: larger slices for models with big context windows
    pub fn generous() -> Self {
        Self {
            budget_chars: 30_000,
            min_viable_chars: 2_000,
            truncation_eligibility: 0.8,
            prompt_preview_chars: 16_000,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
