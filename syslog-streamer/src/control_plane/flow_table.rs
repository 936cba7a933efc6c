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

//! Flow-table builder and the immutable routing table it produces.

use crate::control_plane::host_token::parse_host_token;
use crate::control_plane::rule_descriptor::RuleDescriptor;
use crate::endpoint::{DestinationEndpoint, HostPort, SourceEndpoint, FILE_SCHEME, LOCAL_SOURCE_HOST};
use crate::error::{ConfigError, ConfigErrorKind};
use crate::observability::events;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

const COMPONENT: &str = "flow_table";

/// Routes contributed by a single rule, before merging.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartialTable {
    pub rule: String,
    pub routes: Vec<(SourceEndpoint, Vec<DestinationEndpoint>)>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteEntry {
    pub source: SourceEndpoint,
    pub destinations: Vec<DestinationEndpoint>,
}

impl RouteEntry {
    pub fn source_key(&self) -> String {
        self.source.identity()
    }
}

/// Validated mapping from source identity to its ordered destinations.
///
/// Keys keep the order in which rules first mention them. Destination lists
/// are the concatenation of every rule naming that source, in rule order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RoutingTable {
    entries: Vec<RouteEntry>,
    index: HashMap<String, usize>,
    partial_tables: Vec<PartialTable>,
}

impl RoutingTable {
    pub fn get(&self, source_key: &str) -> Option<&[DestinationEndpoint]> {
        self.index
            .get(source_key)
            .map(|position| self.entries[*position].destinations.as_slice())
    }

    pub fn source(&self, source_key: &str) -> Option<&SourceEndpoint> {
        self.index
            .get(source_key)
            .map(|position| &self.entries[*position].source)
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(RouteEntry::source_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_network_sources(&self) -> bool {
        self.entries.iter().any(|entry| !entry.source.is_file())
    }

    pub fn has_file_sources(&self) -> bool {
        self.entries.iter().any(|entry| entry.source.is_file())
    }

    /// Per-rule routes as they were before merging.
    pub fn partial_tables(&self) -> &[PartialTable] {
        &self.partial_tables
    }

    fn merge(&mut self, partial: PartialTable) {
        for (source, destinations) in &partial.routes {
            let key = source.identity();
            match self.index.get(&key) {
                Some(position) => self.entries[*position]
                    .destinations
                    .extend(destinations.iter().cloned()),
                None => {
                    self.index.insert(key, self.entries.len());
                    self.entries.push(RouteEntry {
                        source: source.clone(),
                        destinations: destinations.clone(),
                    });
                }
            }
        }
        self.partial_tables.push(partial);
    }

    // Direct self-reference only; A -> B -> A is not detected.
    fn detect_loops(&self) -> Result<(), ConfigError> {
        for entry in &self.entries {
            let key = entry.source_key();
            if entry
                .destinations
                .iter()
                .any(|destination| destination.identity() == key)
            {
                let rule = self
                    .partial_tables
                    .iter()
                    .find(|partial| {
                        partial.routes.iter().any(|(source, destinations)| {
                            source.identity() == key
                                && destinations.iter().any(|d| d.identity() == key)
                        })
                    })
                    .map(|partial| partial.rule.clone())
                    .unwrap_or_default();
                return Err(ConfigError::new(rule, ConfigErrorKind::LoopDetected(key)));
            }
        }
        Ok(())
    }
}

/// Lexically removes `.` segments and folds `..` into its parent, so one file
/// has one `file://` identity. Symlinks are not followed.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

/// Validates rule descriptors and merges them into a [`RoutingTable`].
///
/// Relative file paths resolve against `base_dir`, normally the directory of
/// the configuration file the rules came from.
///
/// ```
/// use syslog_streamer::{FlowTableBuilder, RuleDescriptor};
///
/// let rules = vec![
///     RuleDescriptor::default()
///         .with_source_ports([514])
///         .with_dest_hosts(["localhost:666"]),
///     RuleDescriptor::default()
///         .with_source_ports([514])
///         .with_dest_files(["out.dat"]),
/// ];
///
/// let table = FlowTableBuilder::new("/etc/relay").build(&rules).unwrap();
/// let destinations: Vec<String> = table
///     .get("localhost:514")
///     .unwrap()
///     .iter()
///     .map(|d| d.identity())
///     .collect();
///
/// assert_eq!(
///     destinations,
///     vec!["localhost:666".to_string(), "file:///etc/relay/out.dat".to_string()]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct FlowTableBuilder {
    base_dir: PathBuf,
}

impl FlowTableBuilder {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let base_dir = if base_dir.is_absolute() {
            base_dir
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&base_dir))
                .unwrap_or(base_dir)
        };
        Self {
            base_dir: normalize_path(&base_dir),
        }
    }

    /// Resolves relative paths against the directory holding `config_file`.
    pub fn for_config_file(config_file: impl AsRef<Path>) -> Self {
        let parent = config_file
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(parent)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute path with any `file://` prefix removed.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        let path = match path.to_str().and_then(|raw| raw.strip_prefix(FILE_SCHEME)) {
            Some(stripped) => PathBuf::from(stripped),
            None => path.to_path_buf(),
        };
        if path.is_absolute() {
            normalize_path(&path)
        } else {
            normalize_path(&self.base_dir.join(path))
        }
    }

    pub fn build(&self, rules: &[RuleDescriptor]) -> Result<RoutingTable, ConfigError> {
        debug!(
            event = events::FLOW_TABLE_BUILD_START,
            component = COMPONENT,
            rules = rules.len(),
            base_dir = %self.base_dir.display(),
            "building flow table"
        );

        let result = self.build_inner(rules);
        match &result {
            Ok(table) => info!(
                event = events::FLOW_TABLE_BUILD_OK,
                component = COMPONENT,
                rules = rules.len(),
                sources = table.len(),
                "flow table built"
            ),
            Err(err) => warn!(
                event = events::FLOW_TABLE_BUILD_FAILED,
                component = COMPONENT,
                rule = err.rule.as_str(),
                err = %err,
                "flow table rejected"
            ),
        }
        result
    }

    fn build_inner(&self, rules: &[RuleDescriptor]) -> Result<RoutingTable, ConfigError> {
        let mut table = RoutingTable::default();
        for (index, rule) in rules.iter().enumerate() {
            let partial = self.partial_table(index, rule)?;
            table.merge(partial);
        }
        table.detect_loops()?;
        Ok(table)
    }

    fn partial_table(&self, index: usize, rule: &RuleDescriptor) -> Result<PartialTable, ConfigError> {
        let label = rule.label(index);
        let fail = |kind: ConfigErrorKind| ConfigError::new(label.clone(), kind);

        let sources = match (rule.has_network_source(), rule.has_file_source()) {
            (true, true) => return Err(fail(ConfigErrorKind::ConflictingSource)),
            (false, false) => return Err(fail(ConfigErrorKind::MissingSource)),
            (true, false) => self.network_sources(rule).map_err(&fail)?,
            (false, true) => rule
                .source_file
                .iter()
                .map(|path| SourceEndpoint::File(self.resolve_path(path)))
                .collect(),
        };

        if !rule.has_destination() {
            return Err(fail(ConfigErrorKind::MissingDestination));
        }

        let mut destinations = Vec::new();
        for token in rule.dest_hosts.iter().flatten() {
            let address = parse_host_token(token).map_err(&fail)?;
            destinations.push(DestinationEndpoint::Network(address));
        }
        for path in rule.dest_files.iter().flatten() {
            destinations.push(DestinationEndpoint::File(self.resolve_path(path)));
        }

        Ok(PartialTable {
            rule: label,
            routes: sources
                .into_iter()
                .map(|source| (source, destinations.clone()))
                .collect(),
        })
    }

    fn network_sources(&self, rule: &RuleDescriptor) -> Result<Vec<SourceEndpoint>, ConfigErrorKind> {
        let mut sources: Vec<SourceEndpoint> = Vec::new();
        let ports = rule
            .source_ports
            .iter()
            .flatten()
            .map(|port| HostPort::new(LOCAL_SOURCE_HOST, *port));
        let hosts = rule
            .source_hosts
            .iter()
            .flatten()
            .map(|token| parse_host_token(token))
            .collect::<Result<Vec<_>, _>>()?;

        for address in ports.chain(hosts) {
            let source = SourceEndpoint::Network(address);
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::FlowTableBuilder;
    use crate::control_plane::RuleDescriptor;
    use crate::endpoint::{DestinationEndpoint, HostPort, SourceEndpoint};
    use crate::error::ConfigErrorKind;
    use std::path::PathBuf;

    fn builder() -> FlowTableBuilder {
        FlowTableBuilder::new("/etc/relay")
    }

    fn identities(destinations: &[DestinationEndpoint]) -> Vec<String> {
        destinations.iter().map(DestinationEndpoint::identity).collect()
    }

    #[test]
    fn port_source_binds_localhost_and_fans_out() {
        let rules = vec![RuleDescriptor::default()
            .with_source_ports([514])
            .with_dest_hosts(["localhost:666"])
            .with_dest_files(["output.dat"])];

        let table = builder().build(&rules).expect("valid rules");

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.source("localhost:514"),
            Some(&SourceEndpoint::Network(HostPort::new("localhost", 514)))
        );
        assert_eq!(
            identities(table.get("localhost:514").unwrap()),
            vec!["localhost:666", "file:///etc/relay/output.dat"]
        );
    }

    #[test]
    fn file_source_defaults_destination_port() {
        let rules = vec![RuleDescriptor::default()
            .with_source_file("in.dat")
            .with_dest_hosts(["10.0.0.1"])];

        let table = builder().build(&rules).expect("valid rules");

        assert_eq!(
            identities(table.get("file:///etc/relay/in.dat").unwrap()),
            vec!["10.0.0.1:514"]
        );
        assert!(table.has_file_sources());
        assert!(!table.has_network_sources());
    }

    #[test]
    fn recurring_source_concatenates_in_rule_order() {
        let rules = vec![
            RuleDescriptor::default()
                .with_source_ports([514])
                .with_dest_hosts(["10.0.0.1", "10.0.0.2"]),
            RuleDescriptor::default()
                .with_source_ports([514, 515])
                .with_dest_hosts(["10.0.0.1:600"]),
        ];

        let table = builder().build(&rules).expect("valid rules");

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["localhost:514", "localhost:515"]);
        assert_eq!(
            identities(table.get("localhost:514").unwrap()),
            vec!["10.0.0.1:514", "10.0.0.2:514", "10.0.0.1:600"]
        );
        assert_eq!(table.partial_tables().len(), 2);
    }

    #[test]
    fn duplicate_destinations_survive_merge() {
        let rule = RuleDescriptor::default()
            .with_source_ports([514])
            .with_dest_hosts(["10.0.0.1"]);

        let table = builder().build(&[rule.clone(), rule]).expect("valid rules");

        assert_eq!(
            identities(table.get("localhost:514").unwrap()),
            vec!["10.0.0.1:514", "10.0.0.1:514"]
        );
    }

    #[test]
    fn both_sources_conflict() {
        let rules = vec![RuleDescriptor::default()
            .with_name("both")
            .with_source_ports([514])
            .with_source_file("in.dat")
            .with_dest_hosts(["10.0.0.1"])];

        let err = builder().build(&rules).unwrap_err();

        assert_eq!(err.rule, "both");
        assert_eq!(err.kind, ConfigErrorKind::ConflictingSource);
    }

    #[test]
    fn missing_source_and_destination() {
        let no_source = RuleDescriptor::default().with_dest_hosts(["10.0.0.1"]);
        let no_destination = RuleDescriptor::default().with_source_ports([514]);

        assert_eq!(
            builder().build(&[no_source]).unwrap_err().kind,
            ConfigErrorKind::MissingSource
        );
        assert_eq!(
            builder().build(&[no_destination]).unwrap_err().kind,
            ConfigErrorKind::MissingDestination
        );
    }

    #[test]
    fn invalid_destination_host_names_the_rule() {
        let rules = vec![
            RuleDescriptor::default()
                .with_source_ports([514])
                .with_dest_hosts(["10.0.0.1"]),
            RuleDescriptor::default()
                .with_source_ports([515])
                .with_dest_hosts(["host_name"]),
        ];

        let err = builder().build(&rules).unwrap_err();

        assert_eq!(err.rule, "rule #2");
        assert_eq!(
            err.kind,
            ConfigErrorKind::InvalidHostname("host_name".to_string())
        );
    }

    #[test]
    fn direct_loop_is_rejected_after_merge() {
        let rules = vec![
            RuleDescriptor::default()
                .with_name("fanout")
                .with_source_ports([514])
                .with_dest_hosts(["10.0.0.1"]),
            RuleDescriptor::default()
                .with_name("echo")
                .with_source_ports([514])
                .with_dest_hosts(["localhost:514"]),
        ];

        let err = builder().build(&rules).unwrap_err();

        assert_eq!(err.rule, "echo");
        assert_eq!(
            err.kind,
            ConfigErrorKind::LoopDetected("localhost:514".to_string())
        );
    }

    #[test]
    fn file_loop_is_rejected() {
        let rules = vec![RuleDescriptor::default()
            .with_source_file("/var/log/relay.log")
            .with_dest_files(["file:///var/log/relay.log"])];

        let err = builder().build(&rules).unwrap_err();

        assert_eq!(
            err.kind,
            ConfigErrorKind::LoopDetected("file:///var/log/relay.log".to_string())
        );
    }

    #[test]
    fn file_loop_spelled_with_dot_segments_is_rejected() {
        for source in ["./in.dat", "logs/../in.dat", "file://./in.dat"] {
            let rules = vec![RuleDescriptor::default()
                .with_name("replay")
                .with_source_file(source)
                .with_dest_files(["in.dat"])];

            let err = builder().build(&rules).unwrap_err();

            assert_eq!(err.rule, "replay");
            assert_eq!(
                err.kind,
                ConfigErrorKind::LoopDetected("file:///etc/relay/in.dat".to_string()),
                "source {source}"
            );
        }
    }

    #[test]
    fn relative_paths_are_normalized() {
        let builder = FlowTableBuilder::new("/etc/relay/./conf/..");

        assert_eq!(builder.base_dir(), PathBuf::from("/etc/relay"));
        assert_eq!(
            builder.resolve_path(&PathBuf::from("./logs/../out.dat")),
            PathBuf::from("/etc/relay/out.dat")
        );
        assert_eq!(
            builder.resolve_path(&PathBuf::from("../shared/out.dat")),
            PathBuf::from("/etc/shared/out.dat")
        );
        assert_eq!(
            builder.resolve_path(&PathBuf::from("/../var/./log")),
            PathBuf::from("/var/log")
        );
    }

    #[test]
    fn same_file_written_two_ways_shares_one_identity() {
        let rules = vec![RuleDescriptor::default()
            .with_source_ports([514])
            .with_dest_files(["out.dat", "./logs/../out.dat"])];

        let table = builder().build(&rules).unwrap();

        assert_eq!(
            identities(table.get("localhost:514").unwrap()),
            vec!["file:///etc/relay/out.dat", "file:///etc/relay/out.dat"]
        );
    }

    #[test]
    fn transitive_cycle_is_not_detected() {
        let rules = vec![
            RuleDescriptor::default()
                .with_source_ports([514])
                .with_dest_hosts(["localhost:515"]),
            RuleDescriptor::default()
                .with_source_ports([515])
                .with_dest_hosts(["localhost:514"]),
        ];

        assert!(builder().build(&rules).is_ok());
    }

    #[test]
    fn building_twice_is_identical() {
        let rules = vec![
            RuleDescriptor::default()
                .with_source_ports([514, 600])
                .with_dest_hosts(["10.0.0.1"])
                .with_dest_files(["a.log"]),
            RuleDescriptor::default()
                .with_source_file("in.dat")
                .with_dest_hosts(["10.0.0.2:1514"]),
            RuleDescriptor::default()
                .with_source_ports([600])
                .with_dest_files(["b.log"]),
        ];

        let first = builder().build(&rules).expect("valid rules");
        let second = builder().build(&rules).expect("valid rules");

        assert_eq!(first, second);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            second.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn config_file_directory_anchors_relative_paths() {
        let builder = FlowTableBuilder::for_config_file("/srv/relay/relay.json5");

        assert_eq!(
            builder.resolve_path(&PathBuf::from("logs/out.dat")),
            PathBuf::from("/srv/relay/logs/out.dat")
        );
        assert_eq!(
            builder.resolve_path(&PathBuf::from("file:///abs/out.dat")),
            PathBuf::from("/abs/out.dat")
        );
    }

    #[test]
    fn every_key_has_destinations() {
        let rules = vec![RuleDescriptor::default()
            .with_source_hosts(["127.0.0.1:5514", "127.0.0.1:5515"])
            .with_dest_files(["out.dat"])];

        let table = builder().build(&rules).expect("valid rules");

        assert_eq!(table.len(), 2);
        assert!(table.entries().all(|entry| !entry.destinations.is_empty()));
    }
}
