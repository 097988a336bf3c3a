use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use slotboard_core::codec::{decode, encode};
use slotboard_core::engine::{create, enter};
use slotboard_core::Identity;
use tracing::{error, info};

#[derive(Clone, Debug, Default)]
pub struct HealthState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub codec: HealthCheck,
    pub checked_at: String,
}

pub fn router() -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState)
}

pub async fn spawn(bind_address: &str, port: u16) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router()).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(_state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let codec = codec_check();
    let ready = codec.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "slotboard-server runtime initialized".to_string(),
        },
        codec,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

/// Runs one join through encode and decode and checks the board survives unchanged.
fn codec_check() -> HealthCheck {
    let board = create(Some("health".to_string()), Some("probe".to_string()), 2, 2);
    let board = match enter(&board, 1, &Identity::with_handle("@probe")) {
        Ok(board) => board,
        Err(rejection) => {
            return HealthCheck {
                status: "degraded",
                detail: format!("probe join rejected: {rejection}"),
            }
        }
    };

    match decode(&encode(&board)) {
        Ok(decoded) if decoded == board => {
            HealthCheck { status: "ready", detail: "board round trip succeeded".to_string() }
        }
        Ok(_) => HealthCheck {
            status: "degraded",
            detail: "board round trip changed the board".to_string(),
        },
        Err(failure) => {
            HealthCheck { status: "degraded", detail: format!("board decode failed: {failure}") }
        }
    }
}
