//! Record id generation.
//!
//! Ids have the form `<category>_<unix-nanos>`. The nanosecond component is strictly
//! increasing within the process, so two inserts in the same clock tick still get
//! distinct ids.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_NANOS: AtomicI64 = AtomicI64::new(0);

fn next_nanos() -> i64 {
    let now = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1_000));
    let mut last = LAST_NANOS.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_NANOS.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// Generates a new record id for the given category.
pub fn generate_record_id(category: &str) -> String {
    format!("{}_{}", category, next_nanos())
}
