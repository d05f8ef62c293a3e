//! Run statistics and the progress projection derived from them (spec §3,
//! §4.3 result-report algorithm).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Cumulative count of URLs ever admitted to the Frontier.
    pub urls_queued: u64,
    pub urls_fetched: u64,
    pub urls_failed: u64,
    pub bytes_downloaded: u64,
    pub avg_response_time_ms: f64,
    pub pages_per_minute: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub percentage: u32,
    pub estimated_seconds_remaining: i64,
}

impl Stats {
    /// Applies a successful fetch report: `urlsFetched += 1`, accumulates
    /// bytes, and updates the rolling mean response time.
    pub fn record_success(&mut self, response_time_ms: u64, content_size: u64) {
        self.urls_fetched += 1;
        self.bytes_downloaded += content_size;

        let n = self.urls_fetched as f64;
        self.avg_response_time_ms =
            (self.avg_response_time_ms * (n - 1.0) + response_time_ms as f64) / n;
    }

    pub fn record_failure(&mut self) {
        self.urls_failed += 1;
    }

    /// Recomputes `pagesPerMinute` from `startedAt` (epoch ms), per
    /// spec §4.3: `urlsFetched / ((now - startedAt) / 60000)`.
    pub fn recompute_pages_per_minute(&mut self, now_ms: i64, started_at_ms: Option<i64>) {
        self.pages_per_minute = match started_at_ms {
            Some(started) if now_ms > started => {
                let minutes_elapsed = (now_ms - started) as f64 / 60_000.0;
                if minutes_elapsed > 0.0 {
                    self.urls_fetched as f64 / minutes_elapsed
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };
    }
}

impl Progress {
    /// Recomputes `percentage` and `estimatedSecondsRemaining`, per
    /// spec §4.3.
    pub fn recompute(&mut self, stats: &Stats, queue_size: usize) {
        let processed = stats.urls_fetched + stats.urls_failed;
        let denominator = stats.urls_queued.max(1);
        self.percentage = ((100 * processed) as f64 / denominator as f64).round() as u32;

        self.estimated_seconds_remaining = if stats.pages_per_minute > 0.0 {
            (60.0 * queue_size as f64 / stats.pages_per_minute).round() as i64
        } else {
            -1
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_success_updates_rolling_mean() {
        let mut stats = Stats::default();
        stats.record_success(100, 2048);
        stats.record_success(200, 2048);
        assert_eq!(stats.urls_fetched, 2);
        assert_eq!(stats.bytes_downloaded, 4096);
        assert_eq!(stats.avg_response_time_ms, 150.0);
    }

    #[test]
    fn pages_per_minute_zero_without_started_at() {
        let mut stats = Stats::default();
        stats.urls_fetched = 5;
        stats.recompute_pages_per_minute(10_000, None);
        assert_eq!(stats.pages_per_minute, 0.0);
    }

    #[test]
    fn pages_per_minute_from_elapsed_time() {
        let mut stats = Stats::default();
        stats.urls_fetched = 2;
        stats.recompute_pages_per_minute(60_000, Some(0));
        assert_eq!(stats.pages_per_minute, 2.0);
    }

    #[test]
    fn progress_without_rate_reports_unknown_eta() {
        let mut stats = Stats::default();
        stats.urls_queued = 10;
        let mut progress = Progress::default();
        progress.recompute(&stats, 10);
        assert_eq!(progress.estimated_seconds_remaining, -1);
        assert_eq!(progress.percentage, 0);
    }

    #[test]
    fn progress_percentage_tracks_processed_fraction() {
        let mut stats = Stats::default();
        stats.urls_queued = 4;
        stats.urls_fetched = 1;
        stats.urls_failed = 1;
        let mut progress = Progress::default();
        progress.recompute(&stats, 2);
        assert_eq!(progress.percentage, 50);
    }
}
