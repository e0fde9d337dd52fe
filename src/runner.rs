//! Runs a [Catalog] against the devices of a snapshot.
//!
//! Devices are independent of each other, so each one gets its own tokio
//! task and its own [Connection](crate::Connection). Within a device,
//! checks run in catalog order.

use std::sync::Arc;

use crate::{Catalog, CatalogEntry, Client, Error, Routine, TestResult, TestStatus};

/// The result of one catalog entry on one device
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub module: String,
    pub name: String,
    pub result: TestResult,
}

/// Everything that ran on one device, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    pub device: String,
    pub outcomes: Vec<CheckOutcome>,
}

impl DeviceReport {
    fn new(device: &str) -> Self {
        DeviceReport {
            device: device.to_owned(),
            outcomes: Vec::new(),
        }
    }

    fn push(&mut self, entry: &CatalogEntry, result: TestResult) {
        self.outcomes.push(CheckOutcome {
            module: entry.module.clone(),
            name: entry.name.clone(),
            result,
        });
    }

    /// Same `result` for every entry of `catalog`
    fn all(device: &str, catalog: &Catalog, result: TestResult) -> Self {
        let mut report = DeviceReport::new(device);
        for entry in catalog.entries() {
            report.push(entry, result.clone());
        }
        report
    }

    /// Number of outcomes with `status`
    pub fn count(&self, status: TestStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.status == status)
            .count()
    }

    /// Whether anything failed or couldn't be evaluated
    pub fn has_problems(&self) -> bool {
        self.count(TestStatus::Failure) > 0 || self.count(TestStatus::Error) > 0
    }
}

/// Evaluates a catalog over a snapshot directory
pub struct Runner {
    client: Arc<Client>,
    catalog: Arc<Catalog>,
}

impl Runner {
    pub fn new(client: Client, catalog: Catalog) -> Self {
        Runner {
            client: Arc::new(client),
            catalog: Arc::new(catalog),
        }
    }

    /// Runs the catalog on every device in `devices`, concurrently. Reports
    /// come back in the order of `devices`.
    pub async fn run(&self, devices: &[String]) -> Vec<DeviceReport> {
        let handles: Vec<_> = devices
            .iter()
            .map(|device| {
                let client = self.client.clone();
                let catalog = self.catalog.clone();
                let device = device.clone();
                tokio::spawn(async move { run_device(&client, &catalog, &device).await })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (device, handle) in devices.iter().zip(handles) {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(err) => {
                    log::error!("runner: evaluation of {} aborted: {}", device, err);
                    reports.push(DeviceReport::all(
                        device,
                        &self.catalog,
                        TestResult::error(format!("evaluation aborted: {}", err)),
                    ));
                }
            }
        }
        reports
    }

    /// Runs the catalog on `device`, blocking
    pub fn run_sync(&self, device: &str) -> DeviceReport {
        let mut conn = match self.client.connect_sync(device) {
            Ok(conn) => conn,
            Err(err) => return unreachable_device(device, &self.catalog, err),
        };
        let mut report = DeviceReport::new(device);
        for entry in self.catalog.entries() {
            let result = match entry.routine_or_error() {
                Err(result) => result,
                Ok(routine) => match conn.collect(&routine) {
                    Ok(snapshot) => routine.evaluate(&snapshot),
                    Err(err) => collection_error(device, &routine, err),
                },
            };
            report.push(entry, result);
        }
        report
    }
}

/// Runs every check of `catalog` on `device`
pub async fn run_device(client: &Client, catalog: &Catalog, device: &str) -> DeviceReport {
    let mut conn = match client.connect(device).await {
        Ok(conn) => conn,
        Err(err) => return unreachable_device(device, catalog, err),
    };
    let mut report = DeviceReport::new(device);
    for entry in catalog.entries() {
        let result = match entry.routine_or_error() {
            Err(result) => result,
            Ok(routine) => match conn.collect(&routine).await {
                Ok(snapshot) => routine.evaluate(&snapshot),
                Err(err) => collection_error(device, &routine, err),
            },
        };
        log::trace!("runner: {}: {} => {}", device, entry.name, result.status);
        report.push(entry, result);
    }
    report
}

fn unreachable_device(device: &str, catalog: &Catalog, err: Error) -> DeviceReport {
    log::error!("runner: can't open {}: {}", device, err);
    DeviceReport::all(device, catalog, TestResult::error(err.to_string()))
}

/// Commands the device can't run skip the check; anything else is an error
fn collection_error(device: &str, routine: &Routine, err: Error) -> TestResult {
    match err {
        Error::Unsupported(_) => {
            log::debug!("runner: {}: skipping {}: {}", device, routine.name(), err);
            TestResult::skipped(err.to_string())
        }
        _ => {
            log::error!("runner: {}: {} failed: {}", device, routine.name(), err);
            TestResult::error(err.to_string())
        }
    }
}
