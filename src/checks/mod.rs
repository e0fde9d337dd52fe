//! The checks, and the glue tying their inputs, commands and outputs
//! together.
//!
//! A [Routine] is built from the inputs found in the catalog, which are
//! validated right away. It then tells which commands to collect, and
//! evaluates the payloads collected for those commands, in the same order.

use serde_json::Value;

use crate::{Error, Result, Snapshot, TestResult};

mod bgp;
pub use bgp::*;
mod greent;
pub use greent::*;

/// Catalog module holding the BGP checks
pub const BGP_MODULE: &str = "routing.bgp";

/// Catalog module holding the GreenT checks
pub const GREENT_MODULE: &str = "greent";

/// Every known check, with the catalog module it belongs to
pub const ROUTINES: &[(&str, &str)] = &[
    (BGP_MODULE, "VerifyBGPPeerCount"),
    (BGP_MODULE, "VerifyBGPPeersHealth"),
    (BGP_MODULE, "VerifyBGPSpecificPeers"),
    (BGP_MODULE, "VerifyBGPExchangedRoutes"),
    (BGP_MODULE, "VerifyBGPPeerMPCaps"),
    (BGP_MODULE, "VerifyBGPPeerASNCap"),
    (BGP_MODULE, "VerifyBGPPeerRouteRefreshCap"),
    (GREENT_MODULE, "VerifyGreenTCounters"),
    (GREENT_MODULE, "VerifyGreenT"),
];

/// Returns the catalog module of the check called `name`, if there's one
pub fn module_of(name: &str) -> Option<&'static str> {
    ROUTINES
        .iter()
        .find(|(_, routine)| *routine == name)
        .map(|(module, _)| *module)
}

/// A check, along with its validated inputs
#[derive(Debug, Clone)]
pub enum Routine {
    PeerCount(crate::PeerCountInput),
    PeersHealth(crate::PeersHealthInput),
    SpecificPeers(crate::SpecificPeersInput),
    ExchangedRoutes(crate::ExchangedRoutesInput),
    MultiprotocolCaps(crate::MultiprotocolCapsInput),
    FourOctetAsnCap(crate::PeersInput),
    RouteRefreshCap(crate::PeersInput),
    GreenTCounters,
    GreenT,
}

impl Routine {
    /// Builds the check called `name` out of its catalog `inputs`.
    ///
    /// Unknown names are reported as [Error::UnknownTest], and inputs that
    /// don't fit the check as [Error::SchemaError].
    pub fn from_inputs(name: &str, inputs: &Value) -> Result<Self> {
        let routine = match name {
            "VerifyBGPPeerCount" => Routine::PeerCount(crate::PeerCountInput::from_inputs(inputs)?),
            "VerifyBGPPeersHealth" => {
                Routine::PeersHealth(crate::PeersHealthInput::from_inputs(inputs)?)
            }
            "VerifyBGPSpecificPeers" => {
                Routine::SpecificPeers(crate::SpecificPeersInput::from_inputs(inputs)?)
            }
            "VerifyBGPExchangedRoutes" => {
                Routine::ExchangedRoutes(crate::ExchangedRoutesInput::from_inputs(inputs)?)
            }
            "VerifyBGPPeerMPCaps" => {
                Routine::MultiprotocolCaps(crate::MultiprotocolCapsInput::from_inputs(inputs)?)
            }
            "VerifyBGPPeerASNCap" => Routine::FourOctetAsnCap(crate::PeersInput::from_inputs(inputs)?),
            "VerifyBGPPeerRouteRefreshCap" => {
                Routine::RouteRefreshCap(crate::PeersInput::from_inputs(inputs)?)
            }
            "VerifyGreenTCounters" => {
                expect_no_inputs(name, inputs)?;
                Routine::GreenTCounters
            }
            "VerifyGreenT" => {
                expect_no_inputs(name, inputs)?;
                Routine::GreenT
            }
            _ => return Err(Error::UnknownTest(name.to_owned())),
        };
        log::trace!("checks: built {} with {} command(s)", name, routine.commands().len());
        Ok(routine)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Routine::PeerCount(_) => "VerifyBGPPeerCount",
            Routine::PeersHealth(_) => "VerifyBGPPeersHealth",
            Routine::SpecificPeers(_) => "VerifyBGPSpecificPeers",
            Routine::ExchangedRoutes(_) => "VerifyBGPExchangedRoutes",
            Routine::MultiprotocolCaps(_) => "VerifyBGPPeerMPCaps",
            Routine::FourOctetAsnCap(_) => "VerifyBGPPeerASNCap",
            Routine::RouteRefreshCap(_) => "VerifyBGPPeerRouteRefreshCap",
            Routine::GreenTCounters => "VerifyGreenTCounters",
            Routine::GreenT => "VerifyGreenT",
        }
    }

    /// The commands to collect, in the order [Routine::evaluate] expects
    /// their outputs
    pub fn commands(&self) -> Vec<String> {
        match self {
            Routine::PeerCount(input) => family_commands(&input.families()),
            Routine::PeersHealth(input) => family_commands(&input.families()),
            Routine::SpecificPeers(input) => family_commands(&input.families()),
            Routine::ExchangedRoutes(input) => route_commands(input),
            Routine::MultiprotocolCaps(_)
            | Routine::FourOctetAsnCap(_)
            | Routine::RouteRefreshCap(_) => vec![NEIGHBORS_COMMAND.to_owned()],
            Routine::GreenTCounters => vec![POSTCARD_COUNTERS_COMMAND.to_owned()],
            Routine::GreenT => vec![POSTCARD_PROFILES_COMMAND.to_owned()],
        }
    }

    /// Evaluates the check against `snapshot`, whose i-th payload has to be
    /// the output of the i-th command.
    pub fn evaluate(&self, snapshot: &Snapshot) -> TestResult {
        let expected = self.commands().len();
        if snapshot.len() != expected {
            log::error!(
                "checks: {} expects {} output(s), got {}",
                self.name(),
                expected,
                snapshot.len()
            );
            return TestResult::error(format!(
                "expected {} command output(s), got {}",
                expected,
                snapshot.len()
            ));
        }
        match self {
            Routine::PeerCount(input) => verify_peer_count(input, snapshot),
            Routine::PeersHealth(input) => verify_peers_health(input, snapshot),
            Routine::SpecificPeers(input) => verify_specific_peers(input, snapshot),
            Routine::ExchangedRoutes(input) => verify_exchanged_routes(input, snapshot),
            Routine::MultiprotocolCaps(input) => verify_multiprotocol_caps(input, snapshot),
            Routine::FourOctetAsnCap(input) => {
                verify_peer_capability(&FOUR_OCTET_ASN_CAP, input, snapshot)
            }
            Routine::RouteRefreshCap(input) => {
                verify_peer_capability(&ROUTE_REFRESH_CAP, input, snapshot)
            }
            Routine::GreenTCounters => verify_greent_counters(snapshot),
            Routine::GreenT => verify_greent(snapshot),
        }
    }
}

/// Checks without inputs accept `null` or an empty object
fn expect_no_inputs(name: &str, inputs: &Value) -> Result<()> {
    match inputs {
        Value::Null => Ok(()),
        Value::Object(map) if map.is_empty() => Ok(()),
        _ => Err(Error::schema(format!("{} takes no inputs", name))),
    }
}

/// Builds the check called `name` and evaluates it against `snapshot`.
/// Invalid inputs give an `error` result.
pub fn run(name: &str, snapshot: &Snapshot, inputs: &Value) -> TestResult {
    match Routine::from_inputs(name, inputs) {
        Ok(routine) => routine.evaluate(snapshot),
        Err(err) => {
            log::error!("checks: can't build {}: {}", name, err);
            TestResult::error(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestStatus;
    use serde_json::json;

    #[test]
    fn test_unknown_routine() {
        let res = Routine::from_inputs("VerifyBGPTimers", &Value::Null);
        assert!(matches!(res, Err(Error::UnknownTest(name)) if name == "VerifyBGPTimers"));
        assert_eq!(module_of("VerifyBGPTimers"), None);
        assert_eq!(module_of("VerifyGreenT"), Some(GREENT_MODULE));
    }

    #[test]
    fn test_commands_follow_family_order() {
        let routine = Routine::from_inputs(
            "VerifyBGPPeerCount",
            &json!({"address_families": [
                {"afi": "ipv4", "safi": "unicast", "vrf": "PROD", "num_peers": 2},
                {"afi": "evpn", "num_peers": 2},
                {"afi": "ipv6", "safi": "unicast", "vrf": "default", "num_peers": 3},
            ]}),
        )
        .expect("inputs should be valid");
        assert_eq!(
            routine.commands(),
            vec![
                "show bgp ipv4 unicast summary vrf PROD",
                "show bgp ipv6 unicast summary vrf default",
                "show bgp evpn summary",
            ]
        );
    }

    #[test]
    fn test_payload_count_mismatch() {
        let routine = Routine::from_inputs("VerifyGreenTCounters", &Value::Null).expect("no inputs");
        let res = routine.evaluate(&Snapshot::new(vec![]));
        assert_eq!(res.status, TestStatus::Error);
        assert_eq!(res.messages, vec!["expected 1 command output(s), got 0"]);
    }

    #[test]
    fn test_run_reports_schema_errors() {
        let res = run(
            "VerifyBGPPeersHealth",
            &Snapshot::new(vec![json!({"vrfs": {}})]),
            &json!({"address_families": [{"afi": "ipv4"}]}),
        );
        assert_eq!(res.status, TestStatus::Error);
        assert_eq!(
            res.messages,
            vec!["invalid inputs: 'safi' must be provided when afi is ipv4 or ipv6"]
        );

        let res = run("VerifyGreenT", &Snapshot::default(), &json!({"profile": "x"}));
        assert_eq!(res.status, TestStatus::Error);
    }

    #[test]
    fn test_repeated_runs_agree() {
        let snapshot = Snapshot::new(vec![json!({"vrfs": {"default": {"peers": {
            "10.1.0.1": {"peerState": "Idle"}
        }}}})]);
        let inputs = json!({"address_families": [{"afi": "ipv4", "safi": "unicast"}]});
        let first = run("VerifyBGPPeersHealth", &snapshot, &inputs);
        let second = run("VerifyBGPPeersHealth", &snapshot, &inputs);
        assert_eq!(first, second);
        assert_eq!(first.status, TestStatus::Failure);
    }
}
