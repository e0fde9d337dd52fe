//! Comparisons between expected and observed BGP state.
//!
//! Comparators never fail: they return what differs as [Discrepancy] values
//! (or nothing), and leave the layout of the final report to the caller.

use crate::{CapabilityState, Detail, DetailMap, EffectiveVrfs, Lookup, PeerRecord, Vrf};

/// A single way in which the device doesn't match an expectation
#[derive(Debug, Clone, PartialEq)]
pub enum Discrepancy {
    /// The VRF table is empty, or the VRF asked for isn't in it
    NotConfigured,
    /// The VRF exists, without any peer
    NoPeers,
    PeerCount { expected: u64, actual: u64 },
    PeerNotFound,
    UnhealthyPeer {
        state: Option<String>,
        in_msg_queue: u64,
        out_msg_queue: u64,
    },
    /// The peer has no route table in this VRF
    RoutesNotConfigured,
    RouteNotFound,
    InvalidRoute { valid: bool, active: bool },
    /// Neither the VRF nor the peer show up among the neighbors
    PeerNotConfigured,
    CapabilityNotFound,
    /// The capability as reported, flags and all
    CapabilityNotOk(Detail),
}

impl From<Discrepancy> for Detail {
    fn from(d: Discrepancy) -> Self {
        match d {
            Discrepancy::NotConfigured => "Not Configured".into(),
            Discrepancy::NoPeers => "No Peers".into(),
            Discrepancy::PeerCount { expected, actual } => {
                format!("Expected: {}, Actual: {}", expected, actual).into()
            }
            Discrepancy::PeerNotFound => DetailMap::from_iter(vec![("peerNotFound", true)]).into(),
            Discrepancy::UnhealthyPeer {
                state,
                in_msg_queue,
                out_msg_queue,
            } => {
                let mut map = DetailMap::new();
                map.insert("peerState", state.as_deref());
                map.insert("inMsgQueue", in_msg_queue);
                map.insert("outMsgQueue", out_msg_queue);
                map.into()
            }
            Discrepancy::RoutesNotConfigured => "Not configured".into(),
            Discrepancy::RouteNotFound => "Not found".into(),
            Discrepancy::InvalidRoute { valid, active } => {
                DetailMap::from_iter(vec![("valid", valid), ("active", active)]).into()
            }
            Discrepancy::PeerNotConfigured => {
                DetailMap::from_iter(vec![("status", "Not configured")]).into()
            }
            Discrepancy::CapabilityNotFound => "not found".into(),
            Discrepancy::CapabilityNotOk(capability) => capability,
        }
    }
}

/// Compares the number of peers across `vrfs` with `expected`
pub fn peer_count(expected: u64, vrfs: &EffectiveVrfs<'_>) -> Option<Discrepancy> {
    match vrfs {
        EffectiveVrfs::NotConfigured => Some(Discrepancy::NotConfigured),
        EffectiveVrfs::Vrfs(vrfs) => {
            let actual = vrfs.iter().map(|(_, vrf)| vrf.peer_count() as u64).sum();
            if actual == expected {
                None
            } else {
                Some(Discrepancy::PeerCount { expected, actual })
            }
        }
    }
}

/// Health of one peer. A missing peer is a discrepancy in itself.
pub fn peer_health(peer: Option<PeerRecord<'_>>) -> Option<Discrepancy> {
    match peer {
        None => Some(Discrepancy::PeerNotFound),
        Some(peer) if peer.is_healthy() => None,
        Some(peer) => Some(Discrepancy::UnhealthyPeer {
            state: peer.state().map(str::to_owned),
            in_msg_queue: peer.in_msg_queue(),
            out_msg_queue: peer.out_msg_queue(),
        }),
    }
}

/// Checks every peer of `vrf`, in the order the device listed them. `Err`
/// means the VRF has no peer at all.
pub fn vrf_health<'a>(vrf: &Vrf<'a>) -> Result<Vec<(&'a str, Discrepancy)>, Discrepancy> {
    let peers = match vrf.peers() {
        Some(peers) if !peers.is_empty() => peers,
        _ => return Err(Discrepancy::NoPeers),
    };
    Ok(peers
        .keys()
        .filter_map(|address| {
            peer_health(vrf.peer(address)).map(|issue| (address.as_str(), issue))
        })
        .collect())
}

/// Checks `prefix` against a route listing of `vrf`
pub fn route_issue(vrf: &Vrf<'_>, prefix: &str) -> Option<Discrepancy> {
    match vrf.route(prefix) {
        Some(route) if route.is_populated() => {
            let (valid, active) = (route.is_valid(), route.is_active());
            if valid && active {
                None
            } else {
                Some(Discrepancy::InvalidRoute { valid, active })
            }
        }
        _ => Some(Discrepancy::RouteNotFound),
    }
}

/// Checks a negotiated capability: it has to be there, and advertised,
/// received and enabled.
pub fn capability_issue(capability: Lookup<'_>) -> Option<Discrepancy> {
    if !capability.is_populated() {
        return Some(Discrepancy::CapabilityNotFound);
    }
    if CapabilityState::from_lookup(capability).is_ok() {
        return None;
    }
    let echoed = capability
        .value()
        .map(Detail::from)
        .unwrap_or(Detail::Null);
    Some(Discrepancy::CapabilityNotOk(echoed))
}
