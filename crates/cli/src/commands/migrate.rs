use kiosk_db::migrations;

use crate::commands::{run_with_database, CommandResult};

pub fn run() -> CommandResult {
    let outcome = run_with_database("migrate", |_config, pool| async move {
        migrations::status(&pool).await.map_err(|error| ("migration_status", error.to_string(), 5u8))
    });

    match outcome {
        Ok((known, applied)) => CommandResult::success(
            "migrate",
            format!("applied pending migrations ({applied}/{known} applied)"),
        ),
        Err(result) => result,
    }
}
