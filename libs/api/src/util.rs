use std::sync::atomic::{AtomicU64, Ordering};

/// Текущее Unix-время в миллисекундах.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn now_nanos() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}

/// Generates message ids of the form `<unix-nanos>-<counter>`.
///
/// The counter alone makes ids unique for the lifetime of one generator.
/// Ids are opaque: they do not sort in publish order and must not be
/// compared to decide which message is newer.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    counter: AtomicU64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", now_nanos())
    }
}
