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

//! `name[:port]` token parsing and hostname grammar checks.

use crate::endpoint::{HostPort, DEFAULT_SYSLOG_PORT};
use crate::error::ConfigErrorKind;

const MAX_OCTET: u16 = 255;

/// Four dot-separated decimal octets, 0..=255, no leading zeros.
pub fn is_valid_ipv4(name: &str) -> bool {
    let octets: Vec<&str> = name.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            !octet.is_empty()
                && octet.len() <= 3
                && octet.bytes().all(|b| b.is_ascii_digit())
                && (octet.len() == 1 || !octet.starts_with('0'))
                && octet.parse::<u16>().is_ok_and(|value| value <= MAX_OCTET)
        })
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

/// Dot-separated labels of alphanumerics and inner hyphens.
///
/// A name made only of numeric labels is an address, not a hostname, and has
/// to pass [`is_valid_ipv4`] instead.
pub fn is_valid_hostname(name: &str) -> bool {
    let labels: Vec<&str> = name.split('.').collect();
    let all_numeric = labels
        .iter()
        .all(|label| !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()));

    !all_numeric && labels.iter().all(|label| is_valid_label(label))
}

pub fn is_valid_host(name: &str) -> bool {
    is_valid_ipv4(name) || is_valid_hostname(name)
}

/// Parses `name[:port]`, defaulting the port to 514.
///
/// ```
/// use syslog_streamer::control_plane::parse_host_token;
///
/// let target = parse_host_token("10.0.0.1").unwrap();
/// assert_eq!(target.to_string(), "10.0.0.1:514");
///
/// assert!(parse_host_token("host_name:514").is_err());
/// ```
pub fn parse_host_token(token: &str) -> Result<HostPort, ConfigErrorKind> {
    let token = token.trim();
    let (name, port) = match token.split_once(':') {
        Some((name, port)) => {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigErrorKind::InvalidPort(token.to_string()))?;
            (name.trim(), port)
        }
        None => (token, DEFAULT_SYSLOG_PORT),
    };

    if !is_valid_host(name) {
        return Err(ConfigErrorKind::InvalidHostname(name.to_string()));
    }

    Ok(HostPort::new(name, port))
}
