//! Polling loop keeping tracked price history warm.

use std::sync::Arc;
use std::time::Duration;

use coinfolio_core::MessageSink;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::main_lib::AppState;

/// Run cycles every `period` until Ctrl-C.
pub async fn run_until_shutdown(state: Arc<AppState>, period: Duration) {
    info!(
        "Polling {} {} pair(s) every {}s",
        state.tracked_pairs.len(),
        state.decoder.venue(),
        period.as_secs()
    );
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = chrono::Utc::now().timestamp();
                run_cycle(&state, now).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }
    drain_messages(&state);
}

/// One processing cycle: refresh every tracked pair up to `now`, then
/// drain and report the queued messages.
///
/// A failing pair is reported and does not stop the others.
pub async fn run_cycle(state: &AppState, now: i64) -> usize {
    let mut refreshed = 0;
    for pair in &state.tracked_pairs {
        match state
            .price_cache
            .get_historical_price(pair, now, state.history_start)
            .await
        {
            Ok(entry) => {
                refreshed += 1;
                info!("{} close at {}: {}", pair, entry.time, entry.close);
            }
            Err(e) => {
                state
                    .warnings
                    .error(format!("Could not refresh price history of {}: {}", pair, e));
            }
        }
    }
    drain_messages(state);
    refreshed
}

/// Empty both queues. The aggregator already logged each message when it
/// was raised, so only the counts are reported here.
fn drain_messages(state: &AppState) -> (usize, usize) {
    let warnings = state.warnings.consume_warning_messages().len();
    let errors = state.warnings.consume_error_messages().len();
    debug!("Drained {} warning(s) and {} error(s)", warnings, errors);
    (warnings, errors)
}
