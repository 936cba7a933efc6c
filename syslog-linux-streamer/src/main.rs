/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod config;
mod error;

use crate::config::Config;
use crate::error::StreamerAppError;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use syslog_streamer::{FlowTableBuilder, RuleDescriptor, StreamerOptions, SyslogStreamer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const COMPONENT: &str = "syslog_linux_streamer";
const STREAMER_NAME: &str = "syslog-linux-streamer";
const COMMAND_LINE_RULE: &str = "command line";

#[derive(Parser, Debug)]
#[command(version, about = "Relays syslog messages between UDP ports and files", long_about = None)]
struct StreamerArgs {
    /// JSON5 rule file; relative paths inside it resolve against its directory
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// UDP sources to listen on
    #[arg(short, long, value_name = "HOST[:PORT]", value_delimiter = ',')]
    source: Vec<String>,

    /// File to replay line by line
    #[arg(short, long, value_name = "FILE")]
    read: Option<PathBuf>,

    /// Remote syslog hosts to send to
    #[arg(short, long, value_name = "HOST[:PORT]", value_delimiter = ',')]
    dest: Vec<String>,

    /// Files to append received messages to
    #[arg(short, long, value_name = "FILE")]
    write: Vec<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl StreamerArgs {
    /// The single rule described by `-s`, `-r`, `-d` and `-w`.
    fn command_line_rule(&self) -> Result<RuleDescriptor, StreamerAppError> {
        if self.source.is_empty() && self.read.is_none() {
            return Err(StreamerAppError::NoSource);
        }
        if self.dest.is_empty() && self.write.is_empty() {
            return Err(StreamerAppError::NoDestination);
        }

        let mut rule = RuleDescriptor::default().with_name(COMMAND_LINE_RULE);
        if !self.source.is_empty() {
            rule = rule.with_source_hosts(self.source.iter().cloned());
        }
        if let Some(read) = &self.read {
            rule = rule.with_source_file(read.clone());
        }
        if !self.dest.is_empty() {
            rule = rule.with_dest_hosts(self.dest.iter().cloned());
        }
        if !self.write.is_empty() {
            rule = rule.with_dest_files(self.write.iter().cloned());
        }
        Ok(rule)
    }
}

fn init_logging(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if !verbose => filter,
        _ if verbose => EnvFilter::new("debug"),
        _ => EnvFilter::new("info"),
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_streamer(args: &StreamerArgs) -> Result<SyslogStreamer, StreamerAppError> {
    let (builder, rules, options) = match &args.config {
        Some(path) => {
            let config = Config::load(path)?;
            let options = config.streamer.options()?;
            (FlowTableBuilder::for_config_file(path), config.rules, options)
        }
        None => (
            FlowTableBuilder::new(std::env::current_dir().unwrap_or_default()),
            vec![args.command_line_rule()?],
            StreamerOptions::default(),
        ),
    };

    let routing_table = builder.build(&rules)?;
    Ok(SyslogStreamer::new(STREAMER_NAME, routing_table, options))
}

async fn run(args: StreamerArgs) -> Result<(), StreamerAppError> {
    let mut streamer = load_streamer(&args)?;
    let replay_only = !streamer.routing_table().has_network_sources();

    let report = streamer.start().await?;
    for failure in &report.sink_failures {
        warn!(component = COMPONENT, err = %failure, "sink unavailable");
    }

    if replay_only {
        tokio::select! {
            _ = streamer.wait_for_file_sources() => {
                info!(component = COMPONENT, "all file sources replayed");
            }
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(StreamerAppError::Signal)?;
                info!(component = COMPONENT, "interrupt received");
            }
        }
    } else {
        tokio::signal::ctrl_c()
            .await
            .map_err(StreamerAppError::Signal)?;
        info!(component = COMPONENT, "interrupt received");
    }

    let summary = streamer.shutdown().await?;
    info!(
        component = COMPONENT,
        dispatched = summary.dispatched,
        network_failures = summary.network_failures,
        file_failures = summary.file_failures,
        "relay stopped"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = StreamerArgs::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(component = COMPONENT, err = %err, "relay failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
