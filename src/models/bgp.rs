//! Views over BGP command outputs: `show bgp ... summary`, `show bgp neighbors`
//! and the advertised/received route listings.

use serde_json::{Map, Value};

use crate::Lookup;

/// The state a BGP session has to be in to be considered healthy
pub const ESTABLISHED: &str = "Established";

/// The `vrfs` table found at the root of most BGP outputs
#[derive(Debug, Clone, Copy)]
pub struct VrfTable<'a> {
    vrfs: &'a Map<String, Value>,
}

impl<'a> VrfTable<'a> {
    /// Reads the `vrfs` key of `payload`. Returns `None` if it's absent or
    /// isn't a mapping; an empty mapping is returned as an empty table.
    pub fn from_payload(payload: Lookup<'a>) -> Option<Self> {
        payload.get("vrfs").as_object().map(|vrfs| VrfTable { vrfs })
    }

    pub fn is_empty(&self) -> bool {
        self.vrfs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vrfs.len()
    }

    /// VRF names, in the order the device listed them
    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.vrfs.keys().map(|k| k.as_str())
    }

    pub fn vrf(&self, name: &str) -> Option<Vrf<'a>> {
        self.vrfs.get(name).map(|record| Vrf {
            record: Lookup::Found(record),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Vrf<'a>)> {
        self.vrfs.iter().map(|(name, record)| {
            (
                name.as_str(),
                Vrf {
                    record: Lookup::Found(record),
                },
            )
        })
    }
}

/// A single VRF record inside a [VrfTable]
#[derive(Debug, Clone, Copy)]
pub struct Vrf<'a> {
    record: Lookup<'a>,
}

impl<'a> Vrf<'a> {
    /// The `peers` mapping (address => record) of a summary output. `None`
    /// when absent.
    pub fn peers(&self) -> Option<&'a Map<String, Value>> {
        self.record.get("peers").as_object()
    }

    /// Number of peers in the summary, 0 if there's no `peers` key at all
    pub fn peer_count(&self) -> usize {
        self.peers().map(|p| p.len()).unwrap_or(0)
    }

    /// Looks `address` up in the `peers` mapping of a summary output
    pub fn peer(&self, address: &str) -> Option<PeerRecord<'a>> {
        self.peers()
            .and_then(|p| p.get(address))
            .map(|record| PeerRecord {
                record: Lookup::Found(record),
            })
    }

    /// The `peerList` sequence of a `show bgp neighbors` output
    pub fn peer_list(&self) -> Option<&'a Vec<Value>> {
        self.record.get("peerList").as_array()
    }

    /// Finds `address` in the `peerList`. The list carries no index, so
    /// this is a linear scan.
    pub fn find_neighbor(&self, address: &str) -> Option<PeerRecord<'a>> {
        self.peer_list()?
            .iter()
            .find(|p| Lookup::Found(*p).get("peerAddress").as_str() == Some(address))
            .map(|record| PeerRecord {
                record: Lookup::Found(record),
            })
    }

    /// The `bgpRouteEntries` mapping (prefix => entry) of a route listing
    pub fn route_entries(&self) -> Option<&'a Map<String, Value>> {
        self.record.get("bgpRouteEntries").as_object()
    }

    pub fn route(&self, prefix: &str) -> Option<RouteEntry<'a>> {
        self.route_entries()
            .and_then(|r| r.get(prefix))
            .map(|entry| RouteEntry {
                entry: Lookup::Found(entry),
            })
    }
}

/// A BGP peer, either from a summary `peers` mapping or a neighbors `peerList`
#[derive(Debug, Clone, Copy)]
pub struct PeerRecord<'a> {
    record: Lookup<'a>,
}

impl<'a> PeerRecord<'a> {
    pub fn state(&self) -> Option<&'a str> {
        self.record.get("peerState").as_str()
    }

    pub fn in_msg_queue(&self) -> u64 {
        self.record.get("inMsgQueue").as_u64().unwrap_or(0)
    }

    pub fn out_msg_queue(&self) -> u64 {
        self.record.get("outMsgQueue").as_u64().unwrap_or(0)
    }

    pub fn asn(&self) -> Option<&'a str> {
        self.record.get("asn").as_str()
    }

    pub fn prefix_received(&self) -> Option<u64> {
        self.record.get("prefixReceived").as_u64()
    }

    pub fn prefix_accepted(&self) -> Option<u64> {
        self.record.get("prefixAccepted").as_u64()
    }

    /// Established, with nothing waiting in either message queue
    pub fn is_healthy(&self) -> bool {
        self.state() == Some(ESTABLISHED) && self.in_msg_queue() == 0 && self.out_msg_queue() == 0
    }

    /// The `neighborCapabilities` block
    pub fn capabilities(&self) -> Lookup<'a> {
        self.record.get("neighborCapabilities")
    }

    /// A single capability directly under `neighborCapabilities`, e.g.
    /// `fourOctetAsnCap`
    pub fn capability(&self, name: &str) -> Lookup<'a> {
        self.capabilities().get(name)
    }

    /// A single multiprotocol capability, e.g. `ipv4Unicast`
    pub fn multiprotocol_capability(&self, name: &str) -> Lookup<'a> {
        self.capabilities().get("multiprotocolCaps").get(name)
    }
}

/// The advertised/received/enabled flags of a negotiated capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityState {
    pub advertised: bool,
    pub received: bool,
    pub enabled: bool,
}

impl CapabilityState {
    /// Reads the three flags, treating any absent flag as `false`
    pub fn from_lookup(capability: Lookup<'_>) -> Self {
        let flag = |name| capability.get(name).as_bool().unwrap_or(false);
        CapabilityState {
            advertised: flag("advertised"),
            received: flag("received"),
            enabled: flag("enabled"),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.advertised && self.received && self.enabled
    }
}

/// An entry of a `bgpRouteEntries` mapping
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry<'a> {
    entry: Lookup<'a>,
}

impl<'a> RouteEntry<'a> {
    /// Whether the entry carries anything at all. An empty entry is treated
    /// the same as an absent one.
    pub fn is_populated(&self) -> bool {
        self.entry.is_populated()
    }

    /// `routeType.valid` of the first path
    pub fn is_valid(&self) -> bool {
        self.route_type().get("valid").as_bool().unwrap_or(false)
    }

    /// `routeType.active` of the first path
    pub fn is_active(&self) -> bool {
        self.route_type().get("active").as_bool().unwrap_or(false)
    }

    fn route_type(&self) -> Lookup<'a> {
        self.entry.get("bgpRoutePaths").get("0").get("routeType")
    }
}
