pub mod config;
pub mod doctor;
pub mod migrate;
pub mod recommend;
pub mod seed;

use kiosk_core::config::{AppConfig, LoadOptions};
use kiosk_db::{connect_with_settings, migrations, DbPool};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

/// `(error_class, message, exit_code)` for a failed command step.
pub(crate) type StepError = (&'static str, String, u8);

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    fn from_step(command: &str, (error_class, message, exit_code): StepError) -> Self {
        Self::failure(command, error_class, message, exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads config and builds a current-thread runtime, or explains why not.
pub(crate) fn prepare(command: &str) -> Result<(AppConfig, Runtime), CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })?;

    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        })?;

    Ok((config, runtime))
}

/// Connects and brings the schema up to date.
pub(crate) async fn open_database(config: &AppConfig) -> Result<DbPool, StepError> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

    migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string(), 5u8))?;
    Ok(pool)
}

/// Runs `step` against a migrated pool and closes the pool afterwards.
pub(crate) fn run_with_database<T, F, Fut>(command: &str, step: F) -> Result<T, CommandResult>
where
    F: FnOnce(AppConfig, DbPool) -> Fut,
    Fut: std::future::Future<Output = Result<T, StepError>>,
{
    let (config, runtime) = prepare(command)?;

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let outcome = step(config, pool.clone()).await;
        pool.close().await;
        outcome
    });

    result.map_err(|error| CommandResult::from_step(command, error))
}

#[cfg(test)]
mod tests {
    use super::CommandResult;

    #[test]
    fn failure_payload_carries_error_class_and_no_data() {
        let result = CommandResult::failure("seed", "migration", "boom", 5);
        let payload: serde_json::Value =
            serde_json::from_str(&result.output).expect("failure output is json");

        assert_eq!(result.exit_code, 5);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "migration");
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn success_payload_embeds_data_when_present() {
        let result = CommandResult::success_with_data(
            "recommend",
            "done",
            Some(serde_json::json!({"trending": []})),
        );
        let payload: serde_json::Value =
            serde_json::from_str(&result.output).expect("success output is json");

        assert_eq!(payload["status"], "ok");
        assert!(payload["error_class"].is_null());
        assert_eq!(payload["data"]["trending"], serde_json::json!([]));
    }
}
