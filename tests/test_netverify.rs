//! Integration tests for netverify.
//!
//! For each test, we lay out a [MockSnapshot] directory, and read device
//! outputs back from it, through both async and sync connections.

use netverify::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

mod snapshot_dir;
use snapshot_dir::*;

macro_rules! test_sync_async_request {
    ($id:ident($mock:expr, $device:literal, $cmd:ident($( $params:expr ),*), $response:ident) $test:block) => {
        #[tokio::test(flavor = "multi_thread")]
        async fn $id() {
            let _ = env_logger::try_init();
            let snapshot = $mock;
            let client = Client::for_snapshot_dir(&snapshot.path);
            let mut async_conn = client.connect($device).await.expect("failed to connect client");
            let $response = async_conn.$cmd($($params),*).await;
            $test;

            let mut sync_conn = client.connect_sync($device).expect("failed to connect sync client");
            let $response = sync_conn.$cmd($($params),*);
            $test;
        }
    };

    ($id:ident($mock:expr, $device:literal, $request:literal, $response:ident) $test:block) => {
        test_sync_async_request!($id($mock, $device, send_request($request), $response) $test);
    };
}

const EVPN_SUMMARY: &str = "show bgp evpn summary";
const IPV4_SUMMARY: &str = "show bgp ipv4 unicast summary vrf default";
const COUNTERS: &str = "show monitor telemetry postcard counters";
const PROFILES: &str = "show monitor telemetry postcard policy profile";

fn summary(peers: Value) -> Value {
    json!({"vrfs": {"default": {"vrf": "default", "routerId": "10.1.0.3", "asn": "65120", "peers": peers}}})
}

fn healthy_peer() -> Value {
    json!({"peerState": "Established", "inMsgQueue": 0, "outMsgQueue": 0})
}

/// A leaf with healthy BGP, and no GreenT support
fn leaf_snapshot() -> MockSnapshot {
    MockSnapshot::create()
        .output(
            "leaf1",
            IPV4_SUMMARY,
            summary(json!({"10.1.0.1": healthy_peer(), "10.1.0.2": healthy_peer()})),
        )
        .output(
            "leaf1",
            EVPN_SUMMARY,
            summary(json!({"10.1.0.5": {"peerState": "Idle", "inMsgQueue": 0, "outMsgQueue": 0}})),
        )
        .output(
            "leaf1",
            COUNTERS,
            json!({"errors": ["Command not supported on this hardware platform"]}),
        )
        .output("leaf1", PROFILES, json!({"errors": ["Invalid input (at token 3: 'telemetry')"]}))
}

fn peer_count_routine() -> Routine {
    Routine::from_inputs(
        "VerifyBGPPeerCount",
        &json!({"address_families": [
            {"afi": "evpn", "num_peers": 2},
            {"afi": "ipv4", "safi": "unicast", "num_peers": 2},
        ]}),
    )
    .expect("inputs should be valid")
}

test_sync_async_request!(
    test_send_request(leaf_snapshot(), "leaf1", "show bgp ipv4 unicast summary vrf default", response) {
        let payload = response.expect("failed to send request");
        assert_eq!(payload["vrfs"]["default"]["peers"].as_object().map(|p| p.len()), Some(2));
    }
);

test_sync_async_request!(
    test_missing_command(leaf_snapshot(), "leaf1", "show bgp ipv6 unicast summary vrf default", response) {
        assert!(matches!(response, Err(Error::MissingCommand(cmd)) if cmd == "show bgp ipv6 unicast summary vrf default"));
    }
);

test_sync_async_request!(
    test_unsupported_command(leaf_snapshot(), "leaf1", "show monitor telemetry postcard counters", response) {
        assert!(matches!(response, Err(Error::Unsupported(_))));
    }
);

test_sync_async_request!(
    test_failed_command(leaf_snapshot(), "leaf1", "show monitor telemetry postcard policy profile", response) {
        match response {
            Err(Error::CommandFailed { command, errors }) => {
                assert_eq!(command, PROFILES);
                assert_eq!(errors, vec!["Invalid input (at token 3: 'telemetry')"]);
            }
            other => panic!("unexpected response {:?}", other),
        }
    }
);

// outputs come back in command order (ipv4 first), not in input order
test_sync_async_request!(
    test_collect(leaf_snapshot(), "leaf1", collect(&peer_count_routine()), response) {
        let snapshot = response.expect("failed to collect");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(0, &["vrfs", "default", "peers", "10.1.0.1", "peerState"]).as_str(), Some("Established"));
        assert_eq!(snapshot.get(1, &["vrfs", "default", "peers", "10.1.0.5", "peerState"]).as_str(), Some("Idle"));

        let result = peer_count_routine().evaluate(&snapshot);
        assert_eq!(
            result,
            TestResult::failure("Failures: [{'afi': 'evpn', 'vrfs': {'default': 'Expected: 2, Actual: 1'}}]")
        );
    }
);

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_device() {
    let _ = env_logger::try_init();
    let snapshot = leaf_snapshot();
    let client = Client::for_snapshot_dir(&snapshot.path);
    assert!(matches!(client.connect("spine1").await, Err(Error::IoError(_))));
    assert!(matches!(client.connect_sync("spine1"), Err(Error::IoError(_))));
}

#[tokio::test]
async fn test_devices() {
    let _ = env_logger::try_init();
    let snapshot = leaf_snapshot().device("spine1").device("leaf2");
    // not a device: no json directory in it
    std::fs::create_dir_all(snapshot.path.join("logs")).expect("failed to create dir");
    snapshot.catalog(&json!({}));

    let client = Client::for_snapshot_dir(&snapshot.path);
    let devices = client.devices().await.expect("failed to list devices");
    assert_eq!(devices, vec!["leaf1", "leaf2", "spine1"]);
    assert_eq!(
        client.captured_at().map(|t| t.format("%Y-%m-%d_%H_%M_%S").to_string()),
        Some(CAPTURE_TIME.to_owned())
    );
}

fn catalog_document() -> Value {
    json!({
        "routing.bgp": [
            {"VerifyBGPPeerCount": {"address_families": [{"afi": "ipv4", "safi": "unicast", "num_peers": 2}]}},
            {"VerifyBGPPeersHealth": {"address_families": [{"afi": "evpn"}]}},
            {"VerifyBGPSpecificPeers": {"address_families": [{"afi": "ipv4", "safi": "unicast", "vrf": "all", "peers": ["10.1.0.1"]}]}}
        ],
        "greent": [
            {"VerifyGreenTCounters": null},
            {"VerifyGreenT": null}
        ]
    })
}

fn statuses(report: &DeviceReport) -> Vec<(&str, TestStatus)> {
    report
        .outcomes
        .iter()
        .map(|o| (o.name.as_str(), o.result.status))
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_runner() {
    let _ = env_logger::try_init();
    let snapshot = leaf_snapshot()
        .output("leaf2", IPV4_SUMMARY, summary(json!({"10.1.0.1": healthy_peer()})))
        .output("leaf2", COUNTERS, json!({"grePktSent": 10}))
        .output("leaf2", PROFILES, json!({"profiles": {"default": {}, "edge": {}}}));
    let catalog = Catalog::load(snapshot.catalog(&catalog_document()))
        .await
        .expect("failed to load catalog");
    assert_eq!(catalog.len(), 5);

    let client = Client::for_snapshot_dir(&snapshot.path);
    let devices = client.devices().await.expect("failed to list devices");
    let runner = Runner::new(client, catalog);
    let reports = runner.run(&devices).await;
    assert_eq!(reports.len(), 2);

    let leaf1 = &reports[0];
    assert_eq!(leaf1.device, "leaf1");
    assert_eq!(
        statuses(leaf1),
        vec![
            ("VerifyBGPPeerCount", TestStatus::Success),
            ("VerifyBGPPeersHealth", TestStatus::Failure),
            ("VerifyBGPSpecificPeers", TestStatus::Error),
            ("VerifyGreenTCounters", TestStatus::Skipped),
            ("VerifyGreenT", TestStatus::Error),
        ]
    );
    assert_eq!(
        leaf1.outcomes[1].result.messages,
        vec!["Failures: [{'afi': 'evpn', 'vrfs': {'default': {'10.1.0.5': {'peerState': 'Idle', 'inMsgQueue': 0, 'outMsgQueue': 0}}}}]"]
    );
    assert!(leaf1.has_problems());

    let leaf2 = &reports[1];
    assert_eq!(leaf2.device, "leaf2");
    assert_eq!(
        statuses(leaf2),
        vec![
            ("VerifyBGPPeerCount", TestStatus::Failure),
            ("VerifyBGPPeersHealth", TestStatus::Error),
            ("VerifyBGPSpecificPeers", TestStatus::Error),
            ("VerifyGreenTCounters", TestStatus::Success),
            ("VerifyGreenT", TestStatus::Success),
        ]
    );
    assert_eq!(
        leaf2.outcomes[1].result.messages,
        vec!["no output captured for 'show bgp evpn summary'"]
    );
    assert_eq!(leaf2.outcomes[4].result.messages, vec!["edge policy is created"]);

    // the blocking path agrees with the concurrent one
    assert_eq!(&runner.run_sync("leaf1"), leaf1);
    assert_eq!(&runner.run_sync("leaf2"), leaf2);
}

#[tokio::test]
async fn test_runner_unknown_device() {
    let _ = env_logger::try_init();
    let snapshot = leaf_snapshot();
    let catalog = Catalog::from_value(&catalog_document()).expect("valid catalog");
    let runner = Runner::new(Client::for_snapshot_dir(&snapshot.path), catalog);
    let reports = runner.run(&["spine1".to_owned()]).await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].count(TestStatus::Error), 5);
}

#[test]
fn test_unknown_check_rejects_catalog() {
    let snapshot = MockSnapshot::create();
    let path = snapshot.catalog(&json!({"routing.bgp": [{"VerifyBGPTimers": null}]}));
    assert!(matches!(Catalog::load_sync(path), Err(Error::UnknownTest(_))));
}
