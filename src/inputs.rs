//! Input schemas of the checks, as they appear in the catalog.
//!
//! Every input type is deserialized from the catalog and then validated,
//! so a check only ever runs against inputs that make sense. Anything
//! wrong here becomes an [Error::SchemaError], which the check reports with
//! an `error` status instead of a device failure.

use std::{collections::HashSet, fmt, net::IpAddr};

use ipnet::IpNet;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{normalize_capability, Error, Result, VrfSelector, DEFAULT_VRF};

/// Deserializes `inputs` into `T`, reporting problems as schema errors
pub(crate) fn parse_inputs<T: DeserializeOwned>(inputs: &Value) -> Result<T> {
    serde_json::from_value(inputs.clone()).map_err(|e| Error::schema(e.to_string()))
}

/// BGP address family identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Afi {
    Ipv4,
    Ipv6,
    Evpn,
    RtMembership,
    PathSelection,
    LinkState,
}

impl Afi {
    pub fn as_str(&self) -> &'static str {
        match self {
            Afi::Ipv4 => "ipv4",
            Afi::Ipv6 => "ipv6",
            Afi::Evpn => "evpn",
            Afi::RtMembership => "rt-membership",
            Afi::PathSelection => "path-selection",
            Afi::LinkState => "link-state",
        }
    }

    /// Only the IP families are subdivided by SAFI
    pub fn takes_safi(&self) -> bool {
        matches!(self, Afi::Ipv4 | Afi::Ipv6)
    }
}

impl fmt::Display for Afi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BGP subsequent address family identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Safi {
    Unicast,
    Multicast,
    LabeledUnicast,
    SrTe,
}

impl Safi {
    pub fn as_str(&self) -> &'static str {
        match self {
            Safi::Unicast => "unicast",
            Safi::Multicast => "multicast",
            Safi::LabeledUnicast => "labeled-unicast",
            Safi::SrTe => "sr-te",
        }
    }
}

impl fmt::Display for Safi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identifying part of an address family expectation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressFamily {
    pub afi: Afi,
    pub safi: Option<Safi>,
    pub vrf: VrfSelector,
}

impl AddressFamily {
    /// The summary command whose output answers this family
    pub fn summary_command(&self) -> String {
        match self.safi {
            Some(safi) if self.afi.takes_safi() => {
                format!("show bgp {} {} summary vrf {}", self.afi, safi, self.vrf)
            }
            _ => format!("show bgp {} summary", self.afi),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.afi.takes_safi() {
            if self.safi.is_none() {
                return Err(Error::schema(
                    "'safi' must be provided when afi is ipv4 or ipv6",
                ));
            }
        } else if self.safi.is_some() {
            return Err(Error::schema(
                "'safi' must not be provided when afi is not ipv4 or ipv6",
            ));
        } else if !self.vrf.is_default() {
            return Err(Error::schema(
                "'vrf' must be default when afi is not ipv4 or ipv6",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "afi={}", self.afi)?;
        if let Some(safi) = self.safi {
            write!(f, " safi={}", safi)?;
        }
        write!(f, " vrf={}", self.vrf)
    }
}

/// Validates each family, and rejects repeated `(afi, safi, vrf)` triples
fn validate_families<I: IntoIterator<Item = AddressFamily>>(families: I) -> Result<()> {
    let mut seen = HashSet::new();
    for family in families {
        family.validate()?;
        if !seen.insert(family.clone()) {
            return Err(Error::schema(format!(
                "duplicate address family ({}) in inputs",
                family
            )));
        }
    }
    Ok(())
}

/// Positions of `families` in the order their commands are issued: the IP
/// families first, then the others, each group in declaration order.
pub fn command_order(families: &[AddressFamily]) -> Vec<usize> {
    let (ip, other): (Vec<usize>, Vec<usize>) =
        (0..families.len()).partition(|idx| families[*idx].afi.takes_safi());
    ip.into_iter().chain(other).collect()
}

fn default_vrf() -> String {
    DEFAULT_VRF.to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeerCountFamily {
    pub afi: Afi,
    #[serde(default)]
    pub safi: Option<Safi>,
    #[serde(default)]
    pub vrf: VrfSelector,
    pub num_peers: u64,
}

/// Inputs of `VerifyBGPPeerCount`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeerCountInput {
    pub address_families: Vec<PeerCountFamily>,
}

impl PeerCountInput {
    pub fn from_inputs(inputs: &Value) -> Result<Self> {
        let input: Self = parse_inputs(inputs)?;
        if input.address_families.iter().any(|f| f.num_peers == 0) {
            return Err(Error::schema("'num_peers' must be a positive integer"));
        }
        validate_families(input.families())?;
        Ok(input)
    }

    pub fn families(&self) -> Vec<AddressFamily> {
        self.address_families
            .iter()
            .map(|f| AddressFamily {
                afi: f.afi,
                safi: f.safi,
                vrf: f.vrf.clone(),
            })
            .collect()
    }
}

/// Inputs of `VerifyBGPPeersHealth`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeersHealthInput {
    pub address_families: Vec<HealthFamily>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthFamily {
    pub afi: Afi,
    #[serde(default)]
    pub safi: Option<Safi>,
    #[serde(default)]
    pub vrf: VrfSelector,
}

impl PeersHealthInput {
    pub fn from_inputs(inputs: &Value) -> Result<Self> {
        let input: Self = parse_inputs(inputs)?;
        validate_families(input.families())?;
        Ok(input)
    }

    pub fn families(&self) -> Vec<AddressFamily> {
        self.address_families
            .iter()
            .map(|f| AddressFamily {
                afi: f.afi,
                safi: f.safi,
                vrf: f.vrf.clone(),
            })
            .collect()
    }
}

/// Inputs of `VerifyBGPSpecificPeers`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecificPeersInput {
    pub address_families: Vec<SpecificPeersFamily>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecificPeersFamily {
    pub afi: Afi,
    #[serde(default)]
    pub safi: Option<Safi>,
    #[serde(default)]
    pub vrf: VrfSelector,
    pub peers: Vec<IpAddr>,
}

impl SpecificPeersInput {
    pub fn from_inputs(inputs: &Value) -> Result<Self> {
        let input: Self = parse_inputs(inputs)?;
        if input.address_families.iter().any(|f| f.vrf.is_all()) {
            return Err(Error::schema(
                "'all' is not supported as vrf for VerifyBGPSpecificPeers",
            ));
        }
        validate_families(input.families())?;
        Ok(input)
    }

    pub fn families(&self) -> Vec<AddressFamily> {
        self.address_families
            .iter()
            .map(|f| AddressFamily {
                afi: f.afi,
                safi: f.safi,
                vrf: f.vrf.clone(),
            })
            .collect()
    }
}

/// Inputs of `VerifyBGPExchangedRoutes`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExchangedRoutesInput {
    pub bgp_peers: Vec<RoutePeer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutePeer {
    pub peer_address: IpAddr,
    #[serde(default = "default_vrf")]
    pub vrf: String,
    pub advertised_routes: Vec<IpNet>,
    pub received_routes: Vec<IpNet>,
}

impl ExchangedRoutesInput {
    pub fn from_inputs(inputs: &Value) -> Result<Self> {
        let input: Self = parse_inputs(inputs)?;
        for peer in &input.bgp_peers {
            check_vrf_name(&peer.vrf)?;
            for route in peer.advertised_routes.iter().chain(&peer.received_routes) {
                if route.trunc() != *route {
                    return Err(Error::schema(format!("{} has host bits set", route)));
                }
            }
        }
        Ok(input)
    }
}

/// Inputs of `VerifyBGPPeerMPCaps`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiprotocolCapsInput {
    pub bgp_peers: Vec<CapabilityPeer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityPeer {
    pub peer_address: IpAddr,
    #[serde(default = "default_vrf")]
    pub vrf: String,
    /// Already normalized once [MultiprotocolCapsInput::from_inputs] returns
    pub capabilities: Vec<String>,
}

impl MultiprotocolCapsInput {
    pub fn from_inputs(inputs: &Value) -> Result<Self> {
        let mut input: Self = parse_inputs(inputs)?;
        for peer in input.bgp_peers.iter_mut() {
            check_vrf_name(&peer.vrf)?;
            peer.capabilities = peer
                .capabilities
                .iter()
                .map(|c| normalize_capability(c))
                .collect();
        }
        Ok(input)
    }
}

/// Inputs of the single-capability checks (`VerifyBGPPeerASNCap`,
/// `VerifyBGPPeerRouteRefreshCap`)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeersInput {
    pub bgp_peers: Vec<PeerAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeerAddress {
    pub peer_address: IpAddr,
    #[serde(default = "default_vrf")]
    pub vrf: String,
}

impl PeersInput {
    pub fn from_inputs(inputs: &Value) -> Result<Self> {
        let input: Self = parse_inputs(inputs)?;
        for peer in &input.bgp_peers {
            check_vrf_name(&peer.vrf)?;
        }
        Ok(input)
    }
}

fn check_vrf_name(vrf: &str) -> Result<()> {
    if vrf.is_empty() {
        Err(Error::schema("vrf name must not be empty"))
    } else {
        Ok(())
    }
}
