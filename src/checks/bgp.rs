use crate::{
    command_order, compare, AddressFamily, AfiFailures, DetailMap, Discrepancy, EffectiveVrfs,
    ExchangedRoutesInput, MultiprotocolCapsInput, PeerCountInput, PeerFailures, PeersHealthInput,
    PeersInput, Snapshot, SpecificPeersInput, TestResult, VrfTable,
};

/// Lists the neighbors of every VRF, capabilities included
pub const NEIGHBORS_COMMAND: &str = "show bgp neighbors vrf all";

const ROUTES_CAPTION: &str =
    "Following BGP peers are not found or routes are not exchanged properly:";
const MULTIPROTOCOL_CAPTION: &str =
    "Following BGP peer multiprotocol capabilities are not found or not ok:";

/// A capability found directly under `neighborCapabilities`, checked on its
/// own
#[derive(Debug)]
pub struct CapabilityCheck {
    pub key: &'static str,
    pub caption: &'static str,
}

pub const FOUR_OCTET_ASN_CAP: CapabilityCheck = CapabilityCheck {
    key: "fourOctetAsnCap",
    caption: "Following BGP peer four octet asn capabilities are not found or not ok:",
};

pub const ROUTE_REFRESH_CAP: CapabilityCheck = CapabilityCheck {
    key: "routeRefreshCap",
    caption: "Following BGP peer route refresh capabilities are not found or not ok:",
};

pub(crate) fn family_commands(families: &[AddressFamily]) -> Vec<String> {
    command_order(families)
        .into_iter()
        .map(|idx| families[idx].summary_command())
        .collect()
}

pub(crate) fn route_commands(input: &ExchangedRoutesInput) -> Vec<String> {
    let advertised = input.bgp_peers.iter().map(|p| {
        format!(
            "show bgp neighbors {} advertised-routes vrf {}",
            p.peer_address, p.vrf
        )
    });
    let received = input
        .bgp_peers
        .iter()
        .map(|p| format!("show bgp neighbors {} routes vrf {}", p.peer_address, p.vrf));
    advertised.chain(received).collect()
}

/// Walks `families` in command order, handing each one (with its position
/// in the inputs) the table of the payload its command produced.
fn for_each_family<'a, F>(families: &[AddressFamily], snapshot: &'a Snapshot, mut f: F)
where
    F: FnMut(usize, &AddressFamily, Option<VrfTable<'a>>),
{
    for (payload, idx) in command_order(families).into_iter().enumerate() {
        let family = &families[idx];
        log::trace!("bgp: checking {} against output #{}", family, payload);
        f(idx, family, VrfTable::from_payload(snapshot.payload(payload)));
    }
}

fn add_family_failure<I: Into<crate::Detail>>(
    failures: &mut AfiFailures,
    family: &AddressFamily,
    vrf: &str,
    issue: I,
) {
    failures.add(
        family.afi.as_str(),
        family.safi.map(|s| s.as_str()),
        vrf,
        issue,
    );
}

pub(crate) fn verify_peer_count(input: &PeerCountInput, snapshot: &Snapshot) -> TestResult {
    let families = input.families();
    let mut failures = AfiFailures::new();
    for_each_family(&families, snapshot, |idx, family, table| {
        let expected = input.address_families[idx].num_peers;
        let vrfs = family.vrf.resolve(table);
        if let Some(issue) = compare::peer_count(expected, &vrfs) {
            add_family_failure(&mut failures, family, family.vrf.as_str(), issue);
        }
    });
    TestResult::from_failures(failures.into_message())
}

pub(crate) fn verify_peers_health(input: &PeersHealthInput, snapshot: &Snapshot) -> TestResult {
    let families = input.families();
    let mut failures = AfiFailures::new();
    for_each_family(&families, snapshot, |_, family, table| {
        match family.vrf.resolve(table) {
            EffectiveVrfs::NotConfigured => add_family_failure(
                &mut failures,
                family,
                family.vrf.as_str(),
                Discrepancy::NotConfigured,
            ),
            EffectiveVrfs::Vrfs(vrfs) => {
                for (name, vrf) in vrfs {
                    match compare::vrf_health(&vrf) {
                        Err(issue) => add_family_failure(&mut failures, family, name, issue),
                        Ok(issues) if !issues.is_empty() => add_family_failure(
                            &mut failures,
                            family,
                            name,
                            issues.into_iter().collect::<DetailMap>(),
                        ),
                        Ok(_) => {}
                    }
                }
            }
        }
    });
    TestResult::from_failures(failures.into_message())
}

pub(crate) fn verify_specific_peers(input: &SpecificPeersInput, snapshot: &Snapshot) -> TestResult {
    let families = input.families();
    let mut failures = AfiFailures::new();
    for_each_family(&families, snapshot, |idx, family, table| {
        let peers = &input.address_families[idx].peers;
        match family.vrf.resolve(table) {
            EffectiveVrfs::NotConfigured => add_family_failure(
                &mut failures,
                family,
                family.vrf.as_str(),
                Discrepancy::NotConfigured,
            ),
            EffectiveVrfs::Vrfs(vrfs) => {
                for (name, vrf) in vrfs {
                    let issues: DetailMap = peers
                        .iter()
                        .map(|p| p.to_string())
                        .filter_map(|addr| {
                            compare::peer_health(vrf.peer(&addr)).map(|issue| (addr, issue))
                        })
                        .collect();
                    if !issues.is_empty() {
                        add_family_failure(&mut failures, family, name, issues);
                    }
                }
            }
        }
    });
    TestResult::from_failures(failures.into_message())
}

pub(crate) fn verify_exchanged_routes(
    input: &ExchangedRoutesInput,
    snapshot: &Snapshot,
) -> TestResult {
    let received_offset = input.bgp_peers.len();
    let mut failures = PeerFailures::new();
    for (idx, peer) in input.bgp_peers.iter().enumerate() {
        let address = peer.peer_address.to_string();
        let listings = [
            ("advertised_routes", &peer.advertised_routes, idx),
            ("received_routes", &peer.received_routes, received_offset + idx),
        ];

        // both listings need a route table before any route is looked at
        let tables: Option<Vec<_>> = listings
            .iter()
            .map(|(kind, routes, payload)| {
                VrfTable::from_payload(snapshot.payload(*payload))
                    .and_then(|table| table.vrf(&peer.vrf))
                    .filter(|vrf| vrf.route_entries().map(|r| !r.is_empty()).unwrap_or(false))
                    .map(|vrf| (*kind, *routes, vrf))
            })
            .collect();
        let tables = match tables {
            Some(tables) => tables,
            None => {
                log::debug!("bgp: no routes for {} in vrf {}", address, peer.vrf);
                failures.set(&address, &peer.vrf, Discrepancy::RoutesNotConfigured);
                continue;
            }
        };

        for (kind, routes, vrf) in tables {
            let issues: DetailMap = routes
                .iter()
                .map(|r| r.to_string())
                .filter_map(|prefix| {
                    compare::route_issue(&vrf, &prefix).map(|issue| (prefix, issue))
                })
                .collect();
            if !issues.is_empty() {
                failures.add(&address, &peer.vrf, kind, issues);
            }
        }
    }
    TestResult::from_failures(failures.into_message(ROUTES_CAPTION))
}

/// Finds `address` among the neighbors of `vrf` in the neighbors output
fn neighbor<'a>(
    snapshot: &'a Snapshot,
    vrf: &str,
    address: &str,
) -> Option<crate::PeerRecord<'a>> {
    VrfTable::from_payload(snapshot.payload(0))
        .and_then(|table| table.vrf(vrf))
        .and_then(|vrf| vrf.find_neighbor(address))
}

pub(crate) fn verify_multiprotocol_caps(
    input: &MultiprotocolCapsInput,
    snapshot: &Snapshot,
) -> TestResult {
    let mut failures = PeerFailures::new();
    for peer in &input.bgp_peers {
        let address = peer.peer_address.to_string();
        let record = match neighbor(snapshot, &peer.vrf, &address) {
            Some(record) => record,
            None => {
                failures.set(&address, &peer.vrf, Discrepancy::PeerNotConfigured);
                continue;
            }
        };
        for capability in &peer.capabilities {
            let found = record.multiprotocol_capability(capability);
            if let Some(issue) = compare::capability_issue(found) {
                failures.add(&address, &peer.vrf, capability, issue);
            }
        }
    }
    TestResult::from_failures(failures.into_message(MULTIPROTOCOL_CAPTION))
}

pub(crate) fn verify_peer_capability(
    check: &CapabilityCheck,
    input: &PeersInput,
    snapshot: &Snapshot,
) -> TestResult {
    let mut failures = PeerFailures::new();
    for peer in &input.bgp_peers {
        let address = peer.peer_address.to_string();
        match neighbor(snapshot, &peer.vrf, &address) {
            None => failures.set(&address, &peer.vrf, Discrepancy::PeerNotConfigured),
            Some(record) => {
                if let Some(issue) = compare::capability_issue(record.capability(check.key)) {
                    failures.add(&address, &peer.vrf, check.key, issue);
                }
            }
        }
    }
    TestResult::from_failures(failures.into_message(check.caption))
}
