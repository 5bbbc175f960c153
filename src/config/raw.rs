// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Raw YAML deserialization types (internal)
//
// Separate from the public Config structs: serde_yaml needs
// Deserialize, and variable interpolation runs between raw and public.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub llm: Option<RawLlmConfig>,
    pub strategy: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawLlmConfig {
    /// Named service fulfillments; the pipeline uses "default".
    #[serde(default)]
    pub fulfillments: HashMap<String, RawLlmService>,
}

#[derive(Debug, Deserialize)]
pub struct RawLlmService {
    pub api_base: String,
    pub api_key: String,
    pub api_model: String,
}
