use std::sync::Arc;

use slotboard_core::config::{AppConfig, ConfigError, LoadOptions};
use slotboard_slack::events::board_dispatcher;
use slotboard_slack::socket::{NoopSocketTransport, ReconnectPolicy, SocketModeRunner};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub slack_runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    Ok(bootstrap_with_config(config))
}

/// Wires the Slack runner for an already loaded config.
pub fn bootstrap_with_config(config: AppConfig) -> Application {
    let dispatcher = board_dispatcher(config.limits, config.locale.default);
    info!(
        event_name = "system.bootstrap.dispatcher_ready",
        correlation_id = "bootstrap",
        handlers = dispatcher.handler_count(),
        default_locale = config.locale.default.code(),
        max_variants = config.limits.max_variants,
        max_places = config.limits.max_places,
        "slack event dispatcher configured"
    );

    let slack_runner = SocketModeRunner::new(
        Arc::new(NoopSocketTransport),
        dispatcher,
        ReconnectPolicy::default(),
    );

    Application { config, slack_runner }
}

#[cfg(test)]
mod tests {
    use slotboard_core::config::{ConfigOverrides, LoadOptions};
    use slotboard_core::locale::Locale;

    use crate::bootstrap::bootstrap;

    #[tokio::test]
    async fn bootstrap_fails_fast_without_required_slack_tokens() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                slack_app_token: Some("invalid-token".to_string()),
                slack_bot_token: Some("xoxb-valid".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("slack.app_token"));
    }

    #[tokio::test]
    async fn bootstrap_applies_overrides_and_starts_runner() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                slack_app_token: Some("xapp-test".to_string()),
                slack_bot_token: Some("xoxb-test".to_string()),
                default_locale: Some(Locale::Uk),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with valid overrides");

        assert_eq!(app.config.locale.default, Locale::Uk);
        app.slack_runner.start().await.expect("noop transport should drain immediately");
    }
}
