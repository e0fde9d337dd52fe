use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use netverify::{Catalog, Client, Runner, TestStatus};

#[derive(Parser)]
#[command(name = "netverify")]
#[command(about = "Verify collected device state against a test catalog", version)]
struct Args {
    /// Snapshot directory, holding one `<device>/json/` directory per device
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Test catalog (JSON)
    #[arg(short, long)]
    catalog: PathBuf,

    /// Only check this device (repeatable). Defaults to every device found
    #[arg(short, long = "device")]
    devices: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match verify(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every check passed or was skipped
async fn verify(args: Args) -> netverify::Result<bool> {
    let catalog = Catalog::load(&args.catalog).await?;
    let client = Client::for_snapshot_dir(&args.snapshot);
    let devices = if args.devices.is_empty() {
        client.devices().await?
    } else {
        args.devices
    };

    match client.captured_at() {
        Some(at) => println!("Snapshot {} (captured {})", args.snapshot.display(), at),
        None => println!("Snapshot {}", args.snapshot.display()),
    }
    println!("{} check(s) on {} device(s)", catalog.len(), devices.len());

    let reports = Runner::new(client, catalog).run(&devices).await;
    let mut clean = true;
    for report in &reports {
        for outcome in &report.outcomes {
            println!(
                "{} {} {}",
                report.device, outcome.name, outcome.result.status
            );
            for message in &outcome.result.messages {
                println!("    {}", message);
            }
        }
        clean &= !report.has_problems();
    }

    let total = |status| reports.iter().map(|r| r.count(status)).sum::<usize>();
    println!(
        "success: {}, failure: {}, error: {}, skipped: {}",
        total(TestStatus::Success),
        total(TestStatus::Failure),
        total(TestStatus::Error),
        total(TestStatus::Skipped)
    );
    Ok(clean)
}
