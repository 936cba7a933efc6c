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

//! HEADER part of an RFC 3164 packet: timestamp and hostname.

use chrono::{DateTime, Local, TimeZone};
use lazy_static::lazy_static;
use std::fmt::{Display, Formatter};

const FALLBACK_HOSTNAME: &str = "localhost";

lazy_static! {
    static ref LOCAL_HOSTNAME: String = hostname::get()
        .ok()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string());
}

/// Name of the machine running the relay.
pub fn local_hostname() -> &'static str {
    LOCAL_HOSTNAME.as_str()
}

/// Formats `Mmm D HH:MM:SS` with a space-padded day of month.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%b %e %H:%M:%S").to_string()
}

fn timestamp_is_valid(timestamp: &str) -> bool {
    timestamp.bytes().all(|byte| (32..=126).contains(&byte))
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    timestamp: String,
    hostname: String,
}

impl Header {
    /// Builds a header, substituting the current local time for a missing or
    /// non-printable timestamp and the local hostname for a missing hostname.
    pub fn new(timestamp: Option<&str>, hostname: Option<&str>) -> Self {
        let timestamp = match timestamp {
            Some(timestamp) if timestamp_is_valid(timestamp) => timestamp.to_string(),
            _ => format_timestamp(&Local::now()),
        };
        let hostname = hostname.unwrap_or_else(|| local_hostname()).to_string();

        Self {
            timestamp,
            hostname,
        }
    }

    pub fn now() -> Self {
        Self::new(None, None)
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.timestamp, self.hostname)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, local_hostname, Header};
    use chrono::{TimeZone, Utc};

    #[test]
    fn single_digit_day_is_space_padded() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 18, 34, 3).unwrap();

        assert_eq!(format_timestamp(&at), "Jun  1 18:34:03");
    }

    #[test]
    fn two_digit_day_and_afternoon_hour() {
        let at = Utc.with_ymd_and_hms(2024, 12, 24, 23, 5, 59).unwrap();

        assert_eq!(format_timestamp(&at), "Dec 24 23:05:59");
    }

    #[test]
    fn caller_timestamp_and_hostname_are_kept() {
        let header = Header::new(Some("Jun  1 18:34:03"), Some("myhost"));

        assert_eq!(header.to_string(), "Jun  1 18:34:03 myhost");
    }

    #[test]
    fn non_printable_timestamp_is_replaced() {
        let header = Header::new(Some("Jun\t1 18:34:03"), Some("myhost"));

        assert_ne!(header.timestamp(), "Jun\t1 18:34:03");
        assert_eq!(header.timestamp().len(), "Mmm DD HH:MM:SS".len());
    }

    #[test]
    fn missing_hostname_uses_local_machine() {
        let header = Header::now();

        assert_eq!(header.hostname(), local_hostname());
        assert!(!header.hostname().is_empty());
    }
}
