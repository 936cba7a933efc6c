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

//! RFC 3164 packet codec.
//!
//! Pure encoding of `PRI HEADER MSG` into a datagram payload of at most
//! [`MAX_PACKET_LEN`] bytes. Nothing here touches sockets; delivery lives in the
//! data plane.

mod header;
mod msg;
mod packet;
mod priority;

pub use header::{format_timestamp, local_hostname, Header};
pub use msg::{program_name, Msg, MAX_TAG_LEN};
pub use packet::{Packet, PacketTemplate, MAX_PACKET_LEN};
pub use priority::{Facility, Pri, PriEncoding, PriorityParseError, Severity};
