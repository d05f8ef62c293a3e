//! Per-domain politeness state (spec §3/§4.3). Created on first encounter
//! with a domain, mutated only on dispatch (`record_dispatch`) and on result
//! report (`record_success`/`record_error`).

/// All timestamps are epoch milliseconds, supplied by the caller so the
/// scheduler stays deterministic and testable without real sleeps.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainState {
    pub last_fetch_at: Option<i64>,
    pub request_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub backoff_until: Option<i64>,
    pub total_response_time_ms: u64,
    pub bytes_downloaded: u64,
}

impl DomainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff dispatching to this domain right now would violate
    /// politeness: the minimum per-domain delay (with jitter) or an active
    /// backoff window.
    pub fn is_ready(&self, now_ms: i64, effective_min_delay_ms: i64) -> bool {
        if let Some(backoff_until) = self.backoff_until {
            if now_ms < backoff_until {
                return false;
            }
        }

        match self.last_fetch_at {
            Some(last) => now_ms - last >= effective_min_delay_ms,
            None => true,
        }
    }

    /// Records a dispatch: bumps `lastFetchAt` and `requestCount`.
    pub fn record_dispatch(&mut self, now_ms: i64) {
        self.last_fetch_at = Some(now_ms);
        self.request_count += 1;
    }

    /// Records a successful fetch report.
    pub fn record_success(&mut self, response_time_ms: u64, content_size: u64) {
        self.success_count += 1;
        self.total_response_time_ms += response_time_ms;
        self.bytes_downloaded += content_size;
    }

    /// Records a failed fetch report and extends the backoff window to
    /// `now + min(minDomainDelayMs * errorBackoffMultiplier^errorCount,
    /// maxDomainDelayMs)` (spec §4.3), which is non-decreasing across
    /// successive failures until it saturates at `max_domain_delay_ms`.
    pub fn record_error(
        &mut self,
        now_ms: i64,
        min_domain_delay_ms: u64,
        max_domain_delay_ms: u64,
        multiplier: f64,
    ) {
        self.error_count += 1;

        let factor = multiplier.powi(self.error_count as i32);
        let backoff_ms = ((min_domain_delay_ms as f64) * factor).min(max_domain_delay_ms as f64);

        self.backoff_until = Some(now_ms + backoff_ms.round() as i64);
    }

    /// Clears error/backoff state on a successful report (spec §4.3:
    /// `errorCount = 0; backoffUntil = 0`).
    pub fn record_success_reset(&mut self) {
        self.error_count = 0;
        self.backoff_until = None;
    }

    pub fn avg_response_time_ms(&self) -> Option<f64> {
        if self.success_count == 0 {
            None
        } else {
            Some(self.total_response_time_ms as f64 / self.success_count as f64)
        }
    }
}
