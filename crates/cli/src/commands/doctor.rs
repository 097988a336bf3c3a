use secrecy::ExposeSecret;
use serde::Serialize;
use slotboard_core::codec::{decode, encode};
use slotboard_core::config::{AppConfig, LoadOptions};
use slotboard_core::engine::{create, join_place};
use slotboard_core::Identity;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_slack_tokens(&config));
            checks.push(check_largest_board(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["slack_token_readiness", "largest_board_round_trip"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_slack_tokens(config: &AppConfig) -> DoctorCheck {
    if config.slack.app_token.expose_secret() == config.slack.bot_token.expose_secret() {
        return DoctorCheck {
            name: "slack_token_readiness",
            status: CheckStatus::Fail,
            details: "app token and bot token must differ".to_string(),
        };
    }

    DoctorCheck {
        name: "slack_token_readiness",
        status: CheckStatus::Pass,
        details: "token prefixes validated by config contract".to_string(),
    }
}

/// Fills the biggest board the limits allow and checks it survives encode and decode.
fn check_largest_board(config: &AppConfig) -> DoctorCheck {
    let limits = config.limits;
    let count = limits.max_variants.min(limits.max_total_places / limits.min_places.max(1)).max(1);
    let capacity = limits.max_places.min(limits.max_total_places / count).max(1);

    let mut board =
        create(Some("doctor".to_string()), Some("readiness probe".to_string()), count, capacity);
    for slot in 0..count {
        let probe = Identity::with_handle(format!("@probe{slot}"));
        if let Some(next) = join_place(&board, slot, &probe) {
            board = next;
        }
    }

    let encoded = encode(&board);
    match decode(&encoded) {
        Ok(decoded) if decoded == board => DoctorCheck {
            name: "largest_board_round_trip",
            status: CheckStatus::Pass,
            details: format!(
                "{count}x{capacity} board round-trips ({} characters)",
                encoded.chars().count()
            ),
        },
        Ok(_) => DoctorCheck {
            name: "largest_board_round_trip",
            status: CheckStatus::Fail,
            details: "decoded board differs from the encoded one".to_string(),
        },
        Err(failure) => DoctorCheck {
            name: "largest_board_round_trip",
            status: CheckStatus::Fail,
            details: format!("decode failed: {failure}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
