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

//! Host name to socket address resolution, IPv4 first.

use crate::endpoint::HostPort;
use std::io;
use std::net::SocketAddr;
use tokio::net::lookup_host;

/// Resolves `address`, preferring an IPv4 result over IPv6 so that
/// `localhost` lands on the same family as the egress socket.
pub(crate) async fn resolve(address: &HostPort) -> io::Result<SocketAddr> {
    let mut fallback = None;
    for candidate in lookup_host((address.host.as_str(), address.port)).await? {
        if candidate.is_ipv4() {
            return Ok(candidate);
        }
        fallback.get_or_insert(candidate);
    }

    fallback.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address found for {address}"),
        )
    })
}
