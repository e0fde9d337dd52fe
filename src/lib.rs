//! Library to verify the state of network devices against a catalog of
//! checks, using command outputs collected from them.
//!
//! ## Examples
//! ```no_run
//! use netverify::*;
//!
//! // create the client over a snapshot directory
//! let client = Client::for_snapshot_dir("./snapshot_2024-01-31_17_05_09");
//!
//! // we can either run a single check by hand
//! async fn check_peers(client: &Client) -> Result<()> {
//!     let mut connection = client.connect("leaf1").await?;
//!
//!     let inputs = serde_json::json!({
//!         "address_families": [{"afi": "ipv4", "safi": "unicast", "vrf": "all"}]
//!     });
//!     let routine = Routine::from_inputs("VerifyBGPPeersHealth", &inputs)?;
//!     let snapshot = connection.collect(&routine).await?;
//!     let result = routine.evaluate(&snapshot);
//!     println!("{}: {}", routine.name(), result);
//!     Ok(())
//! }
//!
//! // or run a whole catalog on every device
//! async fn check_all(client: Client) -> Result<()> {
//!     let devices = client.devices().await?;
//!     let catalog = Catalog::load("catalog.json").await?;
//!     for report in Runner::new(client, catalog).run(&devices).await {
//!         for outcome in &report.outcomes {
//!             println!("{} {}: {}", report.device, outcome.name, outcome.result);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Checks are pure: [Routine::evaluate] (or [run]) only looks at the
//! [Snapshot] it is given, so they can be fed outputs from anywhere.

mod catalog;
pub use catalog::*;

mod checks;
pub use checks::*;

mod client;
pub use client::*;

mod compare;
pub use compare::*;

mod connection;
pub use connection::*;

mod error;
pub use error::*;

mod inputs;
pub use inputs::*;

mod models;
pub use models::*;

mod normalize;
pub use normalize::*;

mod report;
pub use report::*;

mod result;
pub use result::*;

mod runner;
pub use runner::*;

mod snapshot;
pub use snapshot::*;
