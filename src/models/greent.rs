//! Views over GreenT (postcard telemetry) outputs

use crate::Lookup;

/// Profile that exists on every device, and doesn't count as a user policy
pub const DEFAULT_PROFILE: &str = "default";

/// `show monitor telemetry postcard counters`
#[derive(Debug, Clone, Copy)]
pub struct PostcardCounters<'a> {
    payload: Lookup<'a>,
}

impl<'a> PostcardCounters<'a> {
    pub fn from_payload(payload: Lookup<'a>) -> Self {
        PostcardCounters { payload }
    }

    fn counter(&self, name: &str) -> u64 {
        self.payload.get(name).as_u64().unwrap_or(0)
    }

    pub fn gre_pkt_sent(&self) -> u64 {
        self.counter("grePktSent")
    }

    pub fn sample_rcvd(&self) -> u64 {
        self.counter("sampleRcvd")
    }

    pub fn sample_discarded(&self) -> u64 {
        self.counter("sampleDiscarded")
    }

    pub fn sample_sent(&self) -> u64 {
        self.counter("sampleSent")
    }
}

/// `show monitor telemetry postcard policy profile`
#[derive(Debug, Clone, Copy)]
pub struct PostcardProfiles<'a> {
    payload: Lookup<'a>,
}

impl<'a> PostcardProfiles<'a> {
    pub fn from_payload(payload: Lookup<'a>) -> Self {
        PostcardProfiles { payload }
    }

    /// Names of every configured profile, except the built-in default one
    pub fn user_profiles(&self) -> Vec<&'a str> {
        self.payload
            .get("profiles")
            .as_object()
            .map(|profiles| {
                profiles
                    .keys()
                    .map(|k| k.as_str())
                    .filter(|k| *k != DEFAULT_PROFILE)
                    .collect()
            })
            .unwrap_or_default()
    }
}
