use metrics::{counter, gauge};

pub fn record_backfill(status: &str, records: usize) {
    counter!("chat_backfill_total", "status" => status.to_string()).increment(1);
    if status == "ok" {
        counter!("chat_backfill_records_total").increment(records as u64);
    }
}

/// `outcome` is one of `admitted`, `foreign_receiver`, `stale`, `invalid`.
pub fn record_live_event(outcome: &str) {
    counter!("chat_live_events_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_subscription_transition(transition: &str) {
    counter!(
        "chat_subscription_transitions_total",
        "transition" => transition.to_string()
    )
    .increment(1);
}

pub fn record_cache_size(records: usize) {
    gauge!("chat_cache_records").set(records as f64);
}
