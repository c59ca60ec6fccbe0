//! Command handlers.

use super::commands::Commands;
use ferry::{
    Credentials, Engine, FerryConfig, FerryResult, Invocation, MigrationError, MigrationErrorKind,
    Response, drive_until_done, handle, handle_json,
};
use std::io::Read;
use tracing::info;

fn connect(config: FerryConfig) -> FerryResult<Engine> {
    let credentials = Credentials::from_env()?;
    Engine::connect(config, &credentials)
}

fn print_json<T: serde::Serialize>(value: &T) -> FerryResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| {
        MigrationError::new(MigrationErrorKind::Aborted(format!(
            "Failed to render response: {}",
            e
        )))
    })?;
    println!("{}", rendered);
    Ok(())
}

/// Execute a command. Returns whether it succeeded.
pub async fn execute(command: Commands, config: FerryConfig) -> FerryResult<bool> {
    let invocation = match command {
        Commands::Run {
            collection,
            batch_size,
        } => {
            let budget = config.budget.migrate();
            let engine = connect(config)?;
            let summary =
                drive_until_done(engine.migrator(), &collection, batch_size, budget).await?;
            info!(
                migrated = summary.migrated,
                failed = summary.failed,
                remaining = summary.remaining,
                "Run finished"
            );
            print_json(&summary)?;
            return Ok(summary.remaining == 0);
        }
        Commands::Invoke { request } => {
            let request = match request {
                Some(request) => request,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer).map_err(|e| {
                        MigrationError::new(MigrationErrorKind::Aborted(format!(
                            "Failed to read request from stdin: {}",
                            e
                        )))
                    })?;
                    buffer
                }
            };
            let response = handle_json(&request, || connect(config)).await;
            return finish(&response);
        }
        Commands::Status => Invocation::status(),
        Commands::Migrate {
            collection,
            batch_size,
            offset,
        } => Invocation::migrate(collection)
            .with_batch_size(batch_size)
            .with_offset(offset),
        Commands::Cleanup {
            execute,
            yes,
            batch_size,
            sample,
        } => {
            if execute && !yes {
                return Err(MigrationError::new(MigrationErrorKind::DeletionNotConfirmed).into());
            }
            let invocation = Invocation::cleanup()
                .with_dry_run(!execute)
                .with_batch_size(batch_size);
            match sample {
                Some(sample) => invocation.with_sample_limit(sample),
                None => invocation,
            }
        }
    };

    let response = handle(&invocation, || connect(config)).await;
    finish(&response)
}

fn finish(response: &Response) -> FerryResult<bool> {
    print_json(response)?;
    Ok(response.success)
}
