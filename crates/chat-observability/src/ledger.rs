use std::time::Duration;

use metrics::{counter, histogram};

pub fn record_ledger_rpc_call(operation: &str, status: &str, duration: Duration) {
    counter!(
        "chat_ledger_rpc_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "chat_ledger_rpc_duration_seconds",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_ledger_connection(status: &str) {
    counter!(
        "chat_ledger_connections_total",
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_submission_stage(stage: &str, status: &str, duration: Duration) {
    counter!(
        "chat_submission_stage_total",
        "stage" => stage.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "chat_submission_stage_duration_seconds",
        "stage" => stage.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}
