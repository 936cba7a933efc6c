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

//! Canonical structured field keys and value-format helpers.

use std::net::SocketAddr;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const STREAMER: &str = "streamer";
pub const RULE: &str = "rule";

pub const SOURCE: &str = "source";
pub const DESTINATION: &str = "destination";
pub const PEER: &str = "peer";
pub const BYTES: &str = "bytes";
pub const PAYLOAD: &str = "payload";

pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_QUEUE_CLOSED: &str = "queue_closed";
pub const REASON_QUEUE_FULL: &str = "queue_full";
pub const REASON_UNKNOWN_SOURCE: &str = "unknown_source";

/// Longest payload prefix rendered into debug events.
pub const PAYLOAD_PREVIEW_LEN: usize = 64;

/// Lossy UTF-8 rendering of at most [`PAYLOAD_PREVIEW_LEN`] payload bytes.
pub fn format_payload_preview(payload: &[u8]) -> String {
    let cut = payload.len().min(PAYLOAD_PREVIEW_LEN);
    let mut preview = String::from_utf8_lossy(&payload[..cut]).into_owned();
    if payload.len() > cut {
        preview.push_str("...");
    }
    preview
}

pub fn format_optional_address(address: Option<SocketAddr>) -> String {
    address
        .map(|address| address.to_string())
        .unwrap_or_else(|| NONE.to_string())
}
