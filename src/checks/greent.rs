use crate::{PostcardCounters, PostcardProfiles, Snapshot, TestResult};

pub const POSTCARD_COUNTERS_COMMAND: &str = "show monitor telemetry postcard counters";
pub const POSTCARD_PROFILES_COMMAND: &str = "show monitor telemetry postcard policy profile";

/// GreenT is working as long as GRE packets go out
pub(crate) fn verify_greent_counters(snapshot: &Snapshot) -> TestResult {
    let counters = PostcardCounters::from_payload(snapshot.payload(0));
    log::trace!(
        "greent: {} sample(s) received, {} GRE packet(s) sent",
        counters.sample_rcvd(),
        counters.gre_pkt_sent()
    );
    if counters.gre_pkt_sent() > 0 {
        TestResult::success()
    } else {
        TestResult::failure("GRE packets are not sent")
    }
}

/// At least one policy profile has to exist besides the default one
pub(crate) fn verify_greent(snapshot: &Snapshot) -> TestResult {
    let profiles = PostcardProfiles::from_payload(snapshot.payload(0)).user_profiles();
    if profiles.is_empty() {
        return TestResult::failure("No GreenT policy is created");
    }
    TestResult::success_with(
        profiles
            .into_iter()
            .map(|name| format!("{} policy is created", name))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use crate::{run, Snapshot, TestResult};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn counters(gre_pkt_sent: u64) -> Value {
        json!({"sampleRcvd": 0, "sampleDiscarded": 0, "multiDstSampleRcvd": 0, "grePktSent": gre_pkt_sent, "sampleSent": 0})
    }

    #[test]
    fn test_greent_counters() {
        let res = run("VerifyGreenTCounters", &Snapshot::new(vec![counters(1)]), &Value::Null);
        assert_eq!(res, TestResult::success());

        let res = run("VerifyGreenTCounters", &Snapshot::new(vec![counters(0)]), &Value::Null);
        assert_eq!(res, TestResult::failure("GRE packets are not sent"));

        let res = run("VerifyGreenTCounters", &Snapshot::new(vec![json!({})]), &json!({}));
        assert_eq!(res, TestResult::failure("GRE packets are not sent"));
    }

    fn profile() -> Value {
        json!({"interfaces": [], "appliedInterfaces": [], "samplePolicy": "default", "failures": {}, "appliedInterfaces6": [], "failures6": {}})
    }

    #[test]
    fn test_greent_policy() {
        let payload = json!({"profiles": {"default": profile(), "testProfile": profile(), "edge": profile()}});
        let res = run("VerifyGreenT", &Snapshot::new(vec![payload]), &Value::Null);
        assert_eq!(
            res,
            TestResult::success_with(vec![
                "testProfile policy is created".to_owned(),
                "edge policy is created".to_owned(),
            ])
        );

        let payload = json!({"profiles": {"default": profile()}});
        let res = run("VerifyGreenT", &Snapshot::new(vec![payload]), &Value::Null);
        assert_eq!(res, TestResult::failure("No GreenT policy is created"));

        // counters output carries no profile at all
        let res = run("VerifyGreenT", &Snapshot::new(vec![counters(1)]), &Value::Null);
        assert_eq!(res, TestResult::failure("No GreenT policy is created"));
    }
}
