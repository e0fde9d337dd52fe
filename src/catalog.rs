//! Test catalogs.
//!
//! A catalog is a JSON document mapping a module to the checks to run from
//! it, each check being a single-key object holding its inputs:
//!
//! ```json
//! {
//!     "routing.bgp": [
//!         {"VerifyBGPPeerCount": {"address_families": [{"afi": "evpn", "num_peers": 2}]}},
//!         {"VerifyBGPPeerASNCap": {"bgp_peers": [{"peer_address": "172.30.11.1"}]}}
//!     ],
//!     "greent": [
//!         {"VerifyGreenTCounters": null}
//!     ]
//! }
//! ```
//!
//! Inputs are kept as is; they're validated when the check is built, so a
//! bad input only fails its own check.

use std::{path::Path, str::FromStr};

use serde_json::Value;

use crate::{module_of, Error, Result, Routine, TestResult};

/// One check listed in a catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub module: String,
    pub name: String,
    pub inputs: Value,
}

impl CatalogEntry {
    /// Builds the [Routine] for this entry
    pub fn routine(&self) -> Result<Routine> {
        Routine::from_inputs(&self.name, &self.inputs)
    }

    /// Same as [CatalogEntry::routine], with errors turned into an `error`
    /// [TestResult]
    pub fn routine_or_error(&self) -> std::result::Result<Routine, TestResult> {
        self.routine().map_err(|err| {
            log::error!("catalog: invalid entry {}: {}", self.name, err);
            TestResult::error(err.to_string())
        })
    }
}

/// The ordered checks of a catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads the catalog in `path`
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        log::trace!("catalog: loaded {}", path.as_ref().display());
        content.parse()
    }

    /// Reads the catalog in `path`, blocking
    pub fn load_sync<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::trace!("catalog: loaded {}", path.as_ref().display());
        content.parse()
    }

    /// Builds a catalog out of an already decoded document
    pub fn from_value(document: &Value) -> Result<Self> {
        let modules = document
            .as_object()
            .ok_or_else(|| Error::InvalidCatalog("top level must be an object".into()))?;
        let mut entries = Vec::new();
        for (module, checks) in modules {
            let checks = checks.as_array().ok_or_else(|| {
                Error::InvalidCatalog(format!("'{}' must hold a list of checks", module))
            })?;
            for check in checks {
                entries.push(parse_entry(module, check)?);
            }
        }
        Ok(Catalog { entries })
    }
}

impl FromStr for Catalog {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(s)?;
        Catalog::from_value(&document)
    }
}

fn parse_entry(module: &str, check: &Value) -> Result<CatalogEntry> {
    let (name, inputs) = match check.as_object() {
        Some(map) if map.len() == 1 => map
            .iter()
            .next()
            .ok_or_else(|| Error::InvalidCatalog(format!("empty check in '{}'", module)))?,
        _ => {
            return Err(Error::InvalidCatalog(format!(
                "checks in '{}' must be single-key objects",
                module
            )))
        }
    };
    match module_of(name) {
        None => Err(Error::UnknownTest(name.clone())),
        Some(expected) if expected != module => Err(Error::InvalidCatalog(format!(
            "{} belongs to '{}', not '{}'",
            name, expected, module
        ))),
        Some(_) => Ok(CatalogEntry {
            module: module.to_owned(),
            name: name.clone(),
            inputs: inputs.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestStatus;

    const CATALOG: &str = r#"{
        "routing.bgp": [
            {"VerifyBGPPeerCount": {"address_families": [{"afi": "evpn", "num_peers": 2}]}},
            {"VerifyBGPPeersHealth": {"address_families": [{"afi": "ipv4"}]}}
        ],
        "greent": [
            {"VerifyGreenTCounters": null},
            {"VerifyGreenT": null}
        ]
    }"#;

    #[test]
    fn test_parse_keeps_order() {
        let catalog: Catalog = CATALOG.parse().expect("catalog should parse");
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "VerifyBGPPeerCount",
                "VerifyBGPPeersHealth",
                "VerifyGreenTCounters",
                "VerifyGreenT"
            ]
        );
        assert_eq!(catalog.entries()[2].module, "greent");
        assert_eq!(catalog.entries()[2].inputs, Value::Null);
    }

    #[test]
    fn test_bad_inputs_only_fail_their_check() {
        let catalog: Catalog = CATALOG.parse().expect("catalog should parse");
        assert!(catalog.entries()[0].routine().is_ok());
        let res = catalog.entries()[1]
            .routine_or_error()
            .expect_err("safi is missing");
        assert_eq!(res.status, TestStatus::Error);
    }

    #[test]
    fn test_unknown_routine_rejects_catalog() {
        let res: Result<Catalog> = r#"{"routing.bgp": [{"VerifyBGPTimers": null}]}"#.parse();
        assert!(matches!(res, Err(Error::UnknownTest(name)) if name == "VerifyBGPTimers"));
    }

    #[test]
    fn test_malformed_catalogs() {
        for doc in [
            r#"[]"#,
            r#"{"greent": {"VerifyGreenT": null}}"#,
            r#"{"greent": [{"VerifyGreenT": null, "VerifyGreenTCounters": null}]}"#,
            r#"{"greent": ["VerifyGreenT"]}"#,
            r#"{"routing.bgp": [{"VerifyGreenT": null}]}"#,
        ] {
            let res: Result<Catalog> = doc.parse();
            assert!(matches!(res, Err(Error::InvalidCatalog(_))), "{}", doc);
        }
        let res: Result<Catalog> = "{".parse();
        assert!(matches!(res, Err(Error::JsonError(_))));
    }
}
