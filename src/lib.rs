// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

pub mod agent;
pub mod artifact;
pub mod config;
pub mod emitter;
pub mod fence;
pub mod sse;
pub mod upstream;
