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

//! PRI part of an RFC 3164 packet: facility, severity and their combination.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PriorityParseError {
    #[error("unknown facility '{0}'")]
    UnknownFacility(String),
    #[error("facility code {0} is out of range 0..=23")]
    FacilityOutOfRange(u8),
    #[error("unknown severity '{0}'")]
    UnknownSeverity(String),
    #[error("severity code {0} is out of range 0..=7")]
    SeverityOutOfRange(u8),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Facility {
    Kern = 0,
    User = 1,
    Mail = 2,
    Daemon = 3,
    Auth = 4,
    Syslog = 5,
    Lpr = 6,
    News = 7,
    Uucp = 8,
    Cron = 9,
    AuthPriv = 10,
    Ftp = 11,
    Ntp = 12,
    Audit = 13,
    Alert = 14,
    Clock = 15,
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

const FACILITIES: [(Facility, &str); 24] = [
    (Facility::Kern, "kern"),
    (Facility::User, "user"),
    (Facility::Mail, "mail"),
    (Facility::Daemon, "daemon"),
    (Facility::Auth, "auth"),
    (Facility::Syslog, "syslog"),
    (Facility::Lpr, "lpr"),
    (Facility::News, "news"),
    (Facility::Uucp, "uucp"),
    (Facility::Cron, "cron"),
    (Facility::AuthPriv, "authpriv"),
    (Facility::Ftp, "ftp"),
    (Facility::Ntp, "ntp"),
    (Facility::Audit, "audit"),
    (Facility::Alert, "alert"),
    (Facility::Clock, "clock"),
    (Facility::Local0, "local0"),
    (Facility::Local1, "local1"),
    (Facility::Local2, "local2"),
    (Facility::Local3, "local3"),
    (Facility::Local4, "local4"),
    (Facility::Local5, "local5"),
    (Facility::Local6, "local6"),
    (Facility::Local7, "local7"),
];

impl Facility {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        FACILITIES[self as usize].1
    }
}

impl TryFrom<u8> for Facility {
    type Error = PriorityParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FACILITIES
            .get(code as usize)
            .map(|(facility, _)| *facility)
            .ok_or(PriorityParseError::FacilityOutOfRange(code))
    }
}

impl FromStr for Facility {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FACILITIES
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(facility, _)| *facility)
            .ok_or_else(|| PriorityParseError::UnknownFacility(s.to_string()))
    }
}

impl Display for Facility {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

const SEVERITIES: [(Severity, &str); 8] = [
    (Severity::Emergency, "emerg"),
    (Severity::Alert, "alert"),
    (Severity::Critical, "crit"),
    (Severity::Error, "err"),
    (Severity::Warning, "warning"),
    (Severity::Notice, "notice"),
    (Severity::Info, "info"),
    (Severity::Debug, "debug"),
];

impl Severity {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        SEVERITIES[self as usize].1
    }
}

impl TryFrom<u8> for Severity {
    type Error = PriorityParseError;

    fn try_from(code: u8) -> Result<Self, PriorityParseError> {
        SEVERITIES
            .get(code as usize)
            .map(|(severity, _)| *severity)
            .ok_or(PriorityParseError::SeverityOutOfRange(code))
    }
}

impl FromStr for Severity {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let alias = match wanted.as_str() {
            "emergency" | "panic" => "emerg",
            "critical" => "crit",
            "error" => "err",
            "warn" => "warning",
            other => other,
        };
        SEVERITIES
            .iter()
            .find(|(_, name)| *name == alias)
            .map(|(severity, _)| *severity)
            .ok_or_else(|| PriorityParseError::UnknownSeverity(s.to_string()))
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How facility and severity combine into the PRI number.
///
/// `Rfc3164` is `facility * 8 + severity`. `Additive` is `facility + severity`,
/// kept for receivers that were configured against the legacy relay output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PriEncoding {
    #[default]
    Rfc3164,
    Additive,
}

impl FromStr for PriEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rfc3164" => Ok(PriEncoding::Rfc3164),
            "additive" | "legacy" => Ok(PriEncoding::Additive),
            other => Err(format!("unknown PRI encoding '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pri {
    pub facility: Facility,
    pub severity: Severity,
    pub encoding: PriEncoding,
}

impl Pri {
    pub fn new(facility: Facility, severity: Severity) -> Self {
        Self {
            facility,
            severity,
            encoding: PriEncoding::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: PriEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn value(&self) -> u8 {
        match self.encoding {
            PriEncoding::Rfc3164 => self.facility.code() * 8 + self.severity.code(),
            PriEncoding::Additive => self.facility.code() + self.severity.code(),
        }
    }
}

impl Display for Pri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::{Facility, Pri, PriEncoding, PriorityParseError, Severity};

    #[test]
    fn rfc3164_multiplies_facility() {
        let pri = Pri::new(Facility::Local4, Severity::Notice);

        assert_eq!(pri.value(), 165);
        assert_eq!(pri.to_string(), "<165>");
    }

    #[test]
    fn additive_encoding_sums_codes() {
        let pri = Pri::new(Facility::Local4, Severity::Notice).with_encoding(PriEncoding::Additive);

        assert_eq!(pri.to_string(), "<25>");
    }

    #[test]
    fn highest_priority_fits_in_a_byte() {
        let pri = Pri::new(Facility::Local7, Severity::Debug);

        assert_eq!(pri.value(), 191);
    }

    #[test]
    fn facility_codes_cover_zero_through_twenty_three() {
        for code in 0..=23u8 {
            let facility = Facility::try_from(code).expect("in range");
            assert_eq!(facility.code(), code);
            assert_eq!(facility.name().parse::<Facility>(), Ok(facility));
        }
        assert_eq!(
            Facility::try_from(24),
            Err(PriorityParseError::FacilityOutOfRange(24))
        );
    }

    #[test]
    fn severity_accepts_common_aliases() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("info".parse::<Severity>(), Ok(Severity::Info));
        assert!("loud".parse::<Severity>().is_err());
        assert!(Severity::try_from(8).is_err());
    }

    #[test]
    fn severity_codes_cover_zero_through_seven() {
        assert_eq!(Severity::try_from(0), Ok(Severity::Emergency));
        assert_eq!(Severity::try_from(3), Ok(Severity::Error));
        assert_eq!(Severity::try_from(7), Ok(Severity::Debug));
        assert_eq!(
            Severity::try_from(8),
            Err(PriorityParseError::SeverityOutOfRange(8))
        );
    }
}
