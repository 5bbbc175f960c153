// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// CLI entry point
//
// Runs one agent invocation against the configured upstream and prints
// events to stdout as JSON lines. The host runtime normally consumes
// events over its own channel; this binary is the standalone harness.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use chisel::agent::{Agent, EventSink, SinkClosed, TurnInput};
use chisel::artifact::AgentEvent;
use chisel::config::{self, Strategy};
use chisel::upstream::ReqwestHttpSender;

#[derive(Parser)]
#[command(name = "chisel", about = "Streaming code-artifact extraction agent")]
struct Cli {
    /// Path to the chisel.yaml config file
    #[arg(long, default_value = "chisel.yaml", env = "CHISEL_CONFIG")]
    config: String,

    /// Override the configured extraction strategy (live, buffered, both)
    #[arg(long)]
    strategy: Option<String>,

    /// The user message for this turn
    prompt: String,
}

/// Prints each event to stdout as one JSON line and remembers whether
/// the invocation failed.
struct StdoutSink {
    failed: AtomicBool,
}

#[async_trait::async_trait]
impl EventSink for StdoutSink {
    async fn emit(&self, event: AgentEvent) -> Result<(), SinkClosed> {
        if matches!(event, AgentEvent::Failed { .. }) {
            self.failed.store(true, Ordering::SeqCst);
        }
        if let Ok(line) = serde_json::to_string(&event) {
            println!("{line}");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = config::FileSource::new(cli.config);
    let mut config = match config::load_config(&source) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if let Some(strategy) = cli.strategy.as_deref() {
        config.strategy = match strategy.parse::<Strategy>() {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(1);
            }
        };
    }

    let http = match ReqwestHttpSender::new() {
        Ok(sender) => Arc::new(sender),
        Err(e) => {
            tracing::error!("failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let agent = Agent::new(Arc::new(config), http);
    let turn = TurnInput {
        user_message: cli.prompt,
        edit_request: None,
    };

    let sink = StdoutSink {
        failed: AtomicBool::new(false),
    };
    // The stdout sink never closes.
    let _ = agent.run(turn, &sink).await;

    if sink.failed.load(Ordering::SeqCst) {
        std::process::exit(1);
    }
}
