// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Config loader and validator
//
// Loads chisel.yaml, resolves variable interpolation, and turns the
// raw LLM section into an explicit resolution outcome that callers
// match exhaustively.

mod error;
mod interpolation;
mod raw;
mod source;

pub use error::ConfigError;
pub use source::{ConfigSource, FileSource, StringSource};

/// System prompt sent with every completion request unless overridden.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert coding assistant.\n\n\
Write clean, well-documented code with proper error handling.\n\
ALWAYS wrap code in markdown code blocks with language: ```python, ```javascript, etc.\n\
For edits, return the COMPLETE updated code.\n\
Keep explanations brief.";

/// Which extraction strategy an invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Detect fences as chunks arrive; emit growing artifact updates.
    Live,
    /// Wait for the complete text; emit one artifact for the primary
    /// block.
    Buffered,
    /// Live during streaming plus the buffered summary pass at the end.
    Both,
}

impl std::str::FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Strategy::Live),
            "buffered" => Ok(Strategy::Buffered),
            "both" => Ok(Strategy::Both),
            other => Err(ConfigError::Validation(format!(
                "unknown strategy \"{other}\" (expected live, buffered, or both)"
            ))),
        }
    }
}

/// Resolved endpoint for the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmService {
    pub api_base: String,
    pub api_key: String,
    pub api_model: String,
}

/// Explicit outcome of LLM endpoint resolution.
///
/// Replaces chained truthiness checks on a duck-typed config object:
/// callers match exhaustively and the two failure shapes carry
/// distinct user-visible messages.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmResolution {
    Resolved(LlmService),
    /// Fulfillments exist but none is named "default".
    MissingDefault,
    /// No LLM section at all.
    Unavailable,
}

/// Validated runtime configuration for one agent process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub llm: LlmResolution,
    pub strategy: Strategy,
    pub system_prompt: String,
}

/// Load, interpolate, and validate config from a source.
pub fn load_config(source: &dyn ConfigSource) -> Result<Config, ConfigError> {
    let text = source.load()?;
    let parsed: raw::RawConfig = serde_yaml::from_str(&text)?;

    let llm = match parsed.llm {
        None => LlmResolution::Unavailable,
        Some(section) => match section.fulfillments.get("default") {
            None => LlmResolution::MissingDefault,
            Some(service) => {
                let resolved = LlmService {
                    api_base: interpolation::resolve_variables(&service.api_base)?,
                    api_key: interpolation::resolve_variables(&service.api_key)?,
                    api_model: service.api_model.clone(),
                };
                if resolved.api_base.is_empty() {
                    return Err(ConfigError::Validation(
                        "llm api_base must not be empty".to_string(),
                    ));
                }
                if resolved.api_model.is_empty() {
                    return Err(ConfigError::Validation(
                        "llm api_model must not be empty".to_string(),
                    ));
                }
                LlmResolution::Resolved(resolved)
            }
        },
    };

    let strategy = match parsed.strategy.as_deref() {
        None => Strategy::Live,
        Some(s) => s.parse()?,
    };

    Ok(Config {
        llm,
        strategy,
        system_prompt: parsed
            .system_prompt
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(yaml: &str) -> Result<Config, ConfigError> {
        load_config(&StringSource::new(yaml))
    }

    const FULL: &str = r#"
llm:
  fulfillments:
    default:
      api_base: https://api.example.com/v1
      api_key: sk-test
      api_model: test-model
strategy: both
"#;

    // ---------------------------------------------------------------
    // 1. Full config resolves
    // ---------------------------------------------------------------

    #[test]
    fn full_config_resolves_default_fulfillment() {
        let config = load(FULL).unwrap();
        let LlmResolution::Resolved(service) = &config.llm else {
            panic!("expected resolved, got {:?}", config.llm);
        };
        assert_eq!(service.api_base, "https://api.example.com/v1");
        assert_eq!(service.api_model, "test-model");
        assert_eq!(config.strategy, Strategy::Both);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    // ---------------------------------------------------------------
    // 2. Missing pieces yield the tagged failure variants
    // ---------------------------------------------------------------

    #[test]
    fn missing_llm_section_is_unavailable() {
        let config = load("strategy: live\n").unwrap();
        assert_eq!(config.llm, LlmResolution::Unavailable);
    }

    #[test]
    fn missing_default_fulfillment_is_tagged() {
        let config = load(
            r#"
llm:
  fulfillments:
    backup:
      api_base: https://api.example.com/v1
      api_key: sk-test
      api_model: test-model
"#,
        )
        .unwrap();
        assert_eq!(config.llm, LlmResolution::MissingDefault);
    }

    #[test]
    fn empty_fulfillments_is_tagged_missing_default() {
        let config = load("llm:\n  fulfillments: {}\n").unwrap();
        assert_eq!(config.llm, LlmResolution::MissingDefault);
    }

    // ---------------------------------------------------------------
    // 3. Strategy parsing
    // ---------------------------------------------------------------

    #[test]
    fn strategy_defaults_to_live() {
        let config = load("llm:\n  fulfillments: {}\n").unwrap();
        assert_eq!(config.strategy, Strategy::Live);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = load("strategy: stream\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    // ---------------------------------------------------------------
    // 4. Variable interpolation
    // ---------------------------------------------------------------

    #[test]
    fn api_key_interpolates_from_environment() {
        std::env::set_var("CHISEL_TEST_KEY", "sk-from-env");
        let config = load(
            r#"
llm:
  fulfillments:
    default:
      api_base: https://api.example.com/v1
      api_key: ${CHISEL_TEST_KEY}
      api_model: test-model
"#,
        )
        .unwrap();
        let LlmResolution::Resolved(service) = &config.llm else {
            panic!("expected resolved");
        };
        assert_eq!(service.api_key, "sk-from-env");
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let err = load(
            r#"
llm:
  fulfillments:
    default:
      api_base: https://api.example.com/v1
      api_key: ${CHISEL_TEST_UNSET_VARIABLE}
      api_model: test-model
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedVariable { .. }));
    }

    // ---------------------------------------------------------------
    // 5. Validation and prompt override
    // ---------------------------------------------------------------

    #[test]
    fn empty_api_base_is_rejected() {
        let err = load(
            r#"
llm:
  fulfillments:
    default:
      api_base: ""
      api_key: sk-test
      api_model: test-model
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn system_prompt_override_is_kept() {
        let config = load("system_prompt: Answer in haiku.\n").unwrap();
        assert_eq!(config.system_prompt, "Answer in haiku.");
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = load("llm: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
