use std::sync::Arc;
use std::time::Duration;

use checkin::CheckInService;
use checkin::remote::{HttpAttendanceApi, is_api_reachable};
use checkin::store::FileQueueStore;
use checkin::types::CheckInOutcome;
use common::config::Config;

mod providers;

const USAGE: &str = "usage: checkin-cli <checkin CODE | sync | pending | status>";

#[tokio::main]
async fn main() {
    let config = Config::init(".env");
    common::logger::init_logger(&config.log_level, &config.log_file);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    // A terminal has no OS connectivity signal; probe the API instead.
    let online = is_api_reachable(&config.api_base_url, 5).await;
    log::info!("startup connectivity probe: online={online}");

    let service = CheckInService::new(
        Arc::new(FileQueueStore::new(&config.queue_file)),
        Arc::new(providers::EnvLocationProvider),
        Arc::new(HttpAttendanceApi::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
        )),
        config.student_id,
        Duration::from_secs(config.location_timeout_secs),
        online,
    )
    .await;

    let exit = match command.as_str() {
        "checkin" => match args.get(1) {
            Some(code) => run_check_in(&service, code).await,
            None => {
                eprintln!("{USAGE}");
                2
            }
        },
        "sync" => run_sync(&service).await,
        "pending" => {
            println!("{} pending check-in(s)", service.pending_count().await);
            0
        }
        "status" => {
            println!(
                "online: {} | syncing: {} | pending: {}",
                service.is_online(),
                service.is_syncing(),
                service.pending_count().await
            );
            0
        }
        other => {
            eprintln!("unknown command '{other}'\n{USAGE}");
            2
        }
    };
    std::process::exit(exit);
}

async fn run_check_in(service: &CheckInService, code: &str) -> i32 {
    match service.check_in(code).await {
        Ok(CheckInOutcome::Success {
            already_checked_in: false,
        }) => {
            println!("Attendance recorded.");
            0
        }
        Ok(CheckInOutcome::Success {
            already_checked_in: true,
        }) => {
            println!("You had already checked in for this session.");
            0
        }
        Ok(CheckInOutcome::Queued { .. }) => {
            println!(
                "You appear to be offline. Check-in saved locally ({} pending) and will sync once you are back online.",
                service.pending_count().await
            );
            0
        }
        Err(e) => {
            eprintln!("Check-in failed: {e}");
            1
        }
    }
}

async fn run_sync(service: &CheckInService) -> i32 {
    if !service.is_online() {
        eprintln!("Cannot sync: the attendance API is unreachable.");
        return 1;
    }
    let report = service.sync_queue().await;
    println!(
        "Sync complete: {} delivered, {} could not be delivered.",
        report.success_count, report.fail_count
    );
    if service.pending_count().await > 0 {
        println!(
            "{} check-in(s) still pending; they will be retried on the next sync.",
            service.pending_count().await
        );
    }
    0
}
