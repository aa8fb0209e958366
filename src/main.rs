use std::path::Path;

use aws_config::{BehaviorVersion, Region};
use clap::Parser;
use serde_json::Value;

use qs_backup_lib::backup::BackupRunner;
use qs_backup_lib::cli::Cli;
use qs_backup_lib::quicksight::QuickSightRest;
use qs_backup_lib::store::S3Store;

fn main() {
    let cli = Cli::parse();

    // init logger
    let mut env_logger = env_logger::builder();
    if let Some(level) = cli.verbose {
        env_logger.filter_level(level);
    }
    env_logger.try_init().expect("env_logger should not fail");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!(target: "cli", "Starting the async runtime failed: {e}");
            std::process::exit(1);
        }
    };

    let sdk_config = runtime.block_on(
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cli.region.clone()))
            .load(),
    );

    if cli.dry_run {
        log::warn!(target: "cli", "Running in dry-run mode");
    }

    let event = cli.event.as_deref().map(read_event).unwrap_or(Value::Null);

    let api = QuickSightRest::new(&sdk_config, &cli.region, runtime.handle().clone());
    let store = S3Store::new(&sdk_config, cli.bucket.clone(), runtime.handle().clone());
    let runner = BackupRunner::new(api, store, cli.runner_config());

    let result = runner.handle(&event);
    println!(
        "{}",
        serde_json::to_string(&result).expect("invocation result should be serializable")
    );
}

fn read_event(path: &Path) -> Value {
    let parsed = std::fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_slice(&raw).map_err(|e| e.to_string()));

    match parsed {
        Ok(event) => event,
        Err(e) => {
            log::warn!(target: "cli", "Ignoring unreadable event {}: {e}", path.display());
            Value::Null
        }
    }
}
