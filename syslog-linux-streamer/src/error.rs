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

use std::path::PathBuf;
use syslog_streamer::codec::PriorityParseError;
use syslog_streamer::{ConfigError, StreamerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamerAppError {
    #[error("No source detected")]
    NoSource,

    #[error("No destination detected")]
    NoDestination,

    #[error("unable to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse config file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },

    #[error("invalid packet setting: {0}")]
    Packet(#[from] PriorityParseError),

    #[error("invalid packet setting: {0}")]
    PriEncoding(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Streamer(#[from] StreamerError),

    #[error("unable to listen for the shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}
