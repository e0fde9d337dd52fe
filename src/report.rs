//! Failure reports, and the one place they're turned into text.
//!
//! Every check collects its discrepancies into an ordered tree of [Detail]
//! values, keyed the same way its inputs were keyed. The tree is rendered
//! with Python literal syntax (`{'key': 'value', 'flag': True}`), since the
//! operators and tooling consuming these messages already parse that form.
//! Key order is insertion order, and is part of the output contract.

use std::fmt::{self, Write};

use serde_json::{Number, Value};

/// A node in a failure report
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<Detail>),
    Map(DetailMap),
}

/// An insertion-ordered string-keyed map of [Detail]s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailMap {
    entries: Vec<(String, Detail)>,
}

impl DetailMap {
    pub fn new() -> Self {
        DetailMap::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Detail)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&Detail> {
        self.position(key).map(|pos| &self.entries[pos].1)
    }

    /// Sets `key` to `value`. An existing key keeps its position.
    pub fn insert<K: Into<String>, V: Into<Detail>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(pos) => self.entries[pos].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the map stored under `key`, creating it if needed. A leaf
    /// stored under `key` is replaced by an empty map.
    pub fn map_entry(&mut self, key: &str) -> &mut DetailMap {
        let pos = match self.position(key) {
            Some(pos) => pos,
            None => {
                self.entries.push((key.to_owned(), Detail::Map(DetailMap::new())));
                self.entries.len() - 1
            }
        };
        let slot = &mut self.entries[pos].1;
        if !matches!(slot, Detail::Map(_)) {
            *slot = Detail::Map(DetailMap::new());
        }
        match slot {
            Detail::Map(map) => map,
            _ => unreachable!("slot was just made a map"),
        }
    }

    /// Recursively merges `other` into `self`. Maps present on both sides
    /// are merged, anything else from `other` overwrites.
    pub fn merge(&mut self, other: DetailMap) {
        for (key, value) in other.entries {
            match value {
                Detail::Map(theirs) if matches!(self.get(&key), Some(Detail::Map(_))) => {
                    self.map_entry(&key).merge(theirs);
                }
                value => self.insert(key, value),
            }
        }
    }

    #[inline]
    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl<K: Into<String>, V: Into<Detail>> FromIterator<(K, V)> for DetailMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = DetailMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl From<DetailMap> for Detail {
    fn from(map: DetailMap) -> Self {
        Detail::Map(map)
    }
}

impl From<&str> for Detail {
    fn from(s: &str) -> Self {
        Detail::Text(s.to_owned())
    }
}

impl From<String> for Detail {
    fn from(s: String) -> Self {
        Detail::Text(s)
    }
}

impl From<bool> for Detail {
    fn from(b: bool) -> Self {
        Detail::Bool(b)
    }
}

impl From<u64> for Detail {
    fn from(n: u64) -> Self {
        Detail::Number(n.into())
    }
}

impl From<Option<&str>> for Detail {
    fn from(s: Option<&str>) -> Self {
        s.map(Detail::from).unwrap_or(Detail::Null)
    }
}

impl From<&Value> for Detail {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Detail::Null,
            Value::Bool(b) => Detail::Bool(*b),
            Value::Number(n) => Detail::Number(n.clone()),
            Value::String(s) => Detail::Text(s.clone()),
            Value::Array(items) => Detail::List(items.iter().map(Detail::from).collect()),
            Value::Object(map) => Detail::Map(map.iter().map(|(k, v)| (k.as_str(), Detail::from(v))).collect()),
        }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Null => f.write_str("None"),
            Detail::Bool(true) => f.write_str("True"),
            Detail::Bool(false) => f.write_str("False"),
            Detail::Number(n) => write!(f, "{}", n),
            Detail::Text(s) => write_quoted(f, s),
            Detail::List(items) => {
                f.write_char('[')?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_char(']')
            }
            Detail::Map(map) => write!(f, "{}", map),
        }
    }
}

impl fmt::Display for DetailMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for (idx, (key, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, key)?;
            write!(f, ": {}", value)?;
        }
        f.write_char('}')
    }
}

/// Writes `s` as a Python string literal: single quotes unless the text
/// holds a single quote and no double quote.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

/// Failures of the address-family checks (peer count, peer health, specific
/// peers). One entry per `(afi, safi)` pair, in the order the pair was first
/// reported, each holding a `vrfs` map of VRF => issue.
#[derive(Debug, Default)]
pub struct AfiFailures {
    entries: Vec<((String, Option<String>), DetailMap)>,
}

impl AfiFailures {
    pub fn new() -> Self {
        AfiFailures::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records `issue` for `vrf` under the `(afi, safi)` entry. The entry
    /// omits `safi` entirely when there is none.
    pub fn add<I: Into<Detail>>(&mut self, afi: &str, safi: Option<&str>, vrf: &str, issue: I) {
        let key = (afi.to_owned(), safi.map(|s| s.to_owned()));
        let pos = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(pos) => pos,
            None => {
                let mut entry = DetailMap::new();
                entry.insert("afi", afi);
                if let Some(safi) = safi {
                    entry.insert("safi", safi);
                }
                entry.insert("vrfs", DetailMap::new());
                self.entries.push((key, entry));
                self.entries.len() - 1
            }
        };
        self.entries[pos].1.map_entry("vrfs").insert(vrf, issue);
    }

    /// Renders the report as `Failures: [...]`, or `None` if nothing failed
    pub fn into_message(self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let list = Detail::List(self.entries.into_iter().map(|(_, e)| Detail::Map(e)).collect());
        Some(format!("Failures: {}", list))
    }
}

/// Failures of the per-peer checks (route exchange and capabilities), laid
/// out as `{'bgp_peers': {peer: {vrf: ...}}}`.
#[derive(Debug, Default)]
pub struct PeerFailures {
    peers: DetailMap,
}

impl PeerFailures {
    pub fn new() -> Self {
        PeerFailures::default()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Replaces whatever was recorded for `peer` in `vrf` with `issue`
    pub fn set<I: Into<Detail>>(&mut self, peer: &str, vrf: &str, issue: I) {
        self.peers.map_entry(peer).insert(vrf, issue);
    }

    /// Records `issue` under `key` inside the `vrf` map of `peer`
    pub fn add<I: Into<Detail>>(&mut self, peer: &str, vrf: &str, key: &str, issue: I) {
        self.peers.map_entry(peer).map_entry(vrf).insert(key, issue);
    }

    /// Merges a whole `{vrf: {...}}` subtree into `peer`
    pub fn merge(&mut self, peer: &str, subtree: DetailMap) {
        self.peers.map_entry(peer).merge(subtree);
    }

    /// Renders the report under `caption`, or `None` if nothing failed
    pub fn into_message(self, caption: &str) -> Option<String> {
        if self.peers.is_empty() {
            return None;
        }
        let mut root = DetailMap::new();
        root.insert("bgp_peers", self.peers);
        Some(format!("{}\n{}", caption, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_render_scalars() {
        assert_eq!(Detail::Null.to_string(), "None");
        assert_eq!(Detail::from(true).to_string(), "True");
        assert_eq!(Detail::from(false).to_string(), "False");
        assert_eq!(Detail::from(200_u64).to_string(), "200");
        assert_eq!(Detail::from("Not found").to_string(), "'Not found'");
        assert_eq!(Detail::from("it's").to_string(), "\"it's\"");
        assert_eq!(Detail::from("a'b\"c").to_string(), "'a\\'b\"c'");
        assert_eq!(Detail::from("line\nnext\\").to_string(), "'line\\nnext\\\\'");
    }

    #[test]
    fn test_render_json_keeps_order() {
        let value = json!({"advertised": false, "received": true, "enabled": false, "extra": [1, null]});
        assert_eq!(
            Detail::from(&value).to_string(),
            "{'advertised': False, 'received': True, 'enabled': False, 'extra': [1, None]}"
        );
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut map = DetailMap::new();
        map.insert("b", "1");
        map.insert("a", "2");
        map.insert("b", "3");
        assert_eq!(map.to_string(), "{'b': '3', 'a': '2'}");
    }

    #[test]
    fn test_map_entry_replaces_leaf() {
        let mut map = DetailMap::new();
        map.insert("default", "Not configured");
        map.map_entry("default").insert("advertised_routes", DetailMap::new());
        assert_eq!(map.to_string(), "{'default': {'advertised_routes': {}}}");
    }

    #[test]
    fn test_merge() {
        let mut left: DetailMap = vec![("x", Detail::from(DetailMap::from_iter(vec![("a", "1")])))]
            .into_iter()
            .collect();
        let right: DetailMap = vec![
            ("x", Detail::from(DetailMap::from_iter(vec![("b", "2")]))),
            ("y", Detail::from("3")),
        ]
        .into_iter()
        .collect();
        left.merge(right);
        assert_eq!(left.to_string(), "{'x': {'a': '1', 'b': '2'}, 'y': '3'}");
    }

    #[test]
    fn test_afi_failures() {
        let mut failures = AfiFailures::new();
        assert!(failures.is_empty());
        failures.add("ipv4", Some("unicast"), "PROD", "Expected: 3, Actual: 2");
        failures.add("evpn", None, "default", "Not Configured");
        failures.add("ipv4", Some("unicast"), "default", "No Peers");
        assert_eq!(
            failures.into_message().expect("should have failed"),
            "Failures: [{'afi': 'ipv4', 'safi': 'unicast', 'vrfs': {'PROD': 'Expected: 3, Actual: 2', 'default': 'No Peers'}}, \
             {'afi': 'evpn', 'vrfs': {'default': 'Not Configured'}}]"
        );
        assert!(AfiFailures::new().into_message().is_none());
    }

    #[test]
    fn test_peer_failures() {
        let mut failures = PeerFailures::new();
        failures.add("172.30.11.1", "default", "fourOctetAsnCap", "not found");
        failures.set("172.30.11.10", "MGMT", DetailMap::from_iter(vec![("status", "Not configured")]));
        assert_eq!(
            failures.into_message("Caption:").expect("should have failed"),
            "Caption:\n{'bgp_peers': {'172.30.11.1': {'default': {'fourOctetAsnCap': 'not found'}}, \
             '172.30.11.10': {'MGMT': {'status': 'Not configured'}}}}"
        );
    }
}
