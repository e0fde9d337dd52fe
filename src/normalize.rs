//! Canonicalization of user supplied expectations: capability names and VRF
//! selection.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::{Vrf, VrfTable};

/// Literal used in inputs to select every VRF on the device
pub const ALL_VRFS: &str = "all";

/// VRF used when the inputs don't name one
pub const DEFAULT_VRF: &str = "default";

/// Multiprotocol capability keys as the device reports them, indexed by
/// their folded form (see [fold_capability]).
const MULTIPROTOCOL_CAPABILITIES: &[(&str, &str)] = &[
    ("ipv4unicast", "ipv4Unicast"),
    ("ipv4multicast", "ipv4Multicast"),
    ("ipv4mplslabel", "ipv4MplsLabels"),
    ("ipv4mplslabels", "ipv4MplsLabels"),
    ("ipv4mplsvpn", "ipv4MplsVpn"),
    ("ipv4mvpn", "ipv4Mvpn"),
    ("ipv4flowspec", "ipv4FlowSpec"),
    ("ipv4flowspecvpn", "ipv4FlowSpecVpn"),
    ("ipv4srte", "ipv4SrTe"),
    ("ipv6unicast", "ipv6Unicast"),
    ("ipv6multicast", "ipv6Multicast"),
    ("ipv6mplslabel", "ipv6MplsLabels"),
    ("ipv6mplslabels", "ipv6MplsLabels"),
    ("ipv6mplsvpn", "ipv6MplsVpn"),
    ("ipv6mvpn", "ipv6Mvpn"),
    ("ipv6flowspec", "ipv6FlowSpec"),
    ("ipv6flowspecvpn", "ipv6FlowSpecVpn"),
    ("ipv6srte", "ipv6SrTe"),
    ("l2vpnevpn", "l2VpnEvpn"),
    ("l2vpnvpls", "l2VpnVpls"),
    ("linkstate", "linkState"),
    ("rtmembership", "rtMembership"),
];

/// Lower-cases `name` and drops whitespace, dashes and underscores
pub fn fold_capability(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps a free-form capability name (`"Ipv4 Unicast"`, `"L2vpnEVPN"`,
/// `"ipv4 MPLS labels"`) onto the key the device uses for it. Names that
/// don't match any known capability come back unchanged, so they are
/// reported as not found rather than rejected.
pub fn normalize_capability(name: &str) -> String {
    let folded = fold_capability(name);
    match MULTIPROTOCOL_CAPABILITIES.iter().find(|(f, _)| *f == folded) {
        Some((_, key)) => (*key).to_owned(),
        None => {
            log::debug!("normalize: unknown capability '{}', keeping it as is", name);
            name.to_owned()
        }
    }
}

/// Which VRF(s) an expectation applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VrfSelector {
    Named(String),
    /// The `all` wildcard
    All,
}

impl VrfSelector {
    pub fn parse(s: &str) -> Self {
        if s == ALL_VRFS {
            VrfSelector::All
        } else {
            VrfSelector::Named(s.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VrfSelector::Named(name) => name,
            VrfSelector::All => ALL_VRFS,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, VrfSelector::All)
    }

    pub fn is_default(&self) -> bool {
        self.as_str() == DEFAULT_VRF
    }

    /// Expands this selector against the VRFs present in `table`.
    ///
    /// A missing or empty table, or a named VRF the table doesn't have,
    /// resolves to [EffectiveVrfs::NotConfigured]. The wildcard resolves to
    /// every VRF in the table, in the table's order.
    pub fn resolve<'a>(&self, table: Option<VrfTable<'a>>) -> EffectiveVrfs<'a> {
        let table = match table {
            Some(t) if !t.is_empty() => t,
            _ => return EffectiveVrfs::NotConfigured,
        };
        match self {
            VrfSelector::All => EffectiveVrfs::Vrfs(table.iter().collect()),
            VrfSelector::Named(name) => match table.iter().find(|(n, _)| *n == name.as_str()) {
                Some(entry) => EffectiveVrfs::Vrfs(vec![entry]),
                None => EffectiveVrfs::NotConfigured,
            },
        }
    }
}

impl Default for VrfSelector {
    fn default() -> Self {
        VrfSelector::Named(DEFAULT_VRF.to_owned())
    }
}

impl fmt::Display for VrfSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VrfSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(serde::de::Error::custom("vrf name must not be empty"));
        }
        Ok(VrfSelector::parse(&s))
    }
}

/// The concrete VRFs an expectation ends up being checked against
#[derive(Debug)]
pub enum EffectiveVrfs<'a> {
    NotConfigured,
    Vrfs(Vec<(&'a str, Vrf<'a>)>),
}
