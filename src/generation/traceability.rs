use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out placeholder requirement links until a requirements system
/// supplies the real identifier.
pub struct TraceabilityIssuer {
    prefix: String,
    next: AtomicU64,
}

impl TraceabilityIssuer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    pub fn issue(&self, supplied: Option<&str>) -> String {
        match supplied.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let n = self.next.fetch_add(1, Ordering::Relaxed);
                format!("{}-{:04}", self.prefix, n)
            }
        }
    }
}
