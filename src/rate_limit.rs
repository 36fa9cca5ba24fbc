use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-email throttle for forgot-password requests using a fixed window.
pub struct ForgotPasswordLimiter {
    /// lowercased email -> (count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    limit: u32,
    window: Duration,
}

impl ForgotPasswordLimiter {
    pub fn new(limit: u32, window_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Count a request. Returns Ok(()) or Err with retry-after seconds.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(email.trim().to_lowercase())
            .or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= self.limit {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed));
        }

        *count += 1;
        Ok(())
    }

    /// Drop entries whose window has already closed.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) <= self.window);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
