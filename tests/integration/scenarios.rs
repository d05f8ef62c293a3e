//! The six literal end-to-end scenarios of spec §8, driving the
//! `Coordinator` directly — no HTTP hop, same as the teacher's integration
//! suite drives its own crawler directly rather than through a process
//! boundary.

use ripplectl::coordinator::{Coordinator, ResultReport};
use ripplectl::run::RunStatus;

fn report(url: &str, depth: u32, status: u16) -> ResultReport {
    ResultReport {
        url: url.to_string(),
        depth,
        status: Some(status),
        error: None,
        content_hash: None,
        content_size: Some(2048),
        response_time_ms: Some(100),
        discovered_urls: Vec::new(),
    }
}

/// 1. Empty-queue dispatch: a fresh run started with nothing seeded
/// completes immediately on its first `request-work`.
#[test]
fn empty_queue_dispatch() {
    let mut coordinator = Coordinator::new("scenario-1".to_string(), 0);
    coordinator.start(0).unwrap();

    let result = coordinator.request_work(Some(5), 1000);
    assert!(result.urls.is_empty());
    assert_eq!(result.queue_size, 0);
    assert_eq!(coordinator.status(), RunStatus::Completed);
}

/// 2. Basic admit + dispatch: three seeds, one a post-normalization
/// duplicate, dispatch returns the other two across distinct domains.
#[test]
fn basic_admit_and_dispatch() {
    let mut coordinator = Coordinator::new("scenario-2".to_string(), 0);
    let outcome = coordinator.seed(
        &[
            "https://a.test/p1".to_string(),
            "https://B.test/P1/".to_string(),
            "https://a.test/p1#x".to_string(),
        ],
        0,
        0,
        0,
    );
    assert_eq!(outcome.admitted, 2);
    assert_eq!(outcome.rejected, 0);
    assert_eq!(outcome.queue_size, 2);

    coordinator.start(0).unwrap();
    let result = coordinator.request_work(Some(10), 0);

    let mut urls: Vec<String> = result.urls.iter().map(|u| u.url.to_string()).collect();
    urls.sort();
    assert_eq!(urls, vec!["https://a.test/p1", "https://b.test/P1"]);
    assert_eq!(result.queue_size, 0);
}

/// 3. Politeness: an immediate second dispatch returns nothing because
/// both domains were just fetched; reporting success for both then shows
/// up correctly in aggregate stats.
#[test]
fn politeness_then_stats() {
    let mut coordinator = Coordinator::new("scenario-3".to_string(), 0);
    coordinator.seed(
        &["https://a.test/p1".to_string(), "https://b.test/p1".to_string()],
        0,
        0,
        0,
    );
    coordinator.start(0).unwrap();
    let first = coordinator.request_work(Some(10), 0);
    assert_eq!(first.urls.len(), 2);

    let second = coordinator.request_work(Some(10), 0);
    assert!(second.urls.is_empty());
    assert_eq!(second.queue_size, 0);

    coordinator.report_result(report("https://a.test/p1", 0, 200), 1000);
    coordinator.report_result(report("https://b.test/p1", 0, 200), 1000);

    let stats = coordinator.stats_snapshot();
    assert_eq!(stats.stats.urls_fetched, 2);
    assert_eq!(stats.stats.bytes_downloaded, 4096);
    assert_eq!(stats.stats.avg_response_time_ms, 100.0);
}

/// 4. Backoff: a failure bans the domain for at least
/// `minDomainDelayMs * errorBackoffMultiplier`, growing on a second
/// failure, capped at `maxDomainDelayMs`.
#[test]
fn backoff_grows_and_caps() {
    let mut coordinator = Coordinator::new("scenario-4".to_string(), 0);
    coordinator.seed(
        &[
            "https://x.test/p1".to_string(),
            "https://x.test/p2".to_string(),
            "https://x.test/p3".to_string(),
        ],
        0,
        0,
        0,
    );
    coordinator.start(0).unwrap();

    let first = coordinator.request_work(Some(1), 0);
    assert_eq!(first.urls.len(), 1);
    coordinator.report_result(report("https://x.test/p1", 0, 500), 0);

    // Banned until at least now + 2000ms (minDomainDelayMs=1000 * multiplier^1=2).
    let still_banned = coordinator.request_work(Some(1), 1999);
    assert!(still_banned.urls.is_empty());

    let after_first_ban = coordinator.request_work(Some(1), 2000);
    assert_eq!(after_first_ban.urls.len(), 1);
    coordinator.report_result(report("https://x.test/p2", 0, 500), 2000);

    // Second failure: ban extends to >= 2000 + 4000 = 6000.
    let still_banned_again = coordinator.request_work(Some(1), 5999);
    assert!(still_banned_again.urls.is_empty());

    let after_second_ban = coordinator.request_work(Some(1), 6000);
    assert_eq!(after_second_ban.urls.len(), 1);
}

/// 5. Discovery with depth: only the same-domain discovered URL is
/// admitted, at the corrected depth; a grandchild exceeding `maxDepth` is
/// rejected.
#[test]
fn discovery_respects_depth_and_scope() {
    let mut coordinator = Coordinator::new("scenario-5".to_string(), 0);
    coordinator
        .configure(None, &serde_json::json!({"crawlBehavior": {"maxDepth": 1}}), 0)
        .unwrap();
    coordinator.seed(&["https://a.test/".to_string()], 0, 0, 0);
    coordinator.start(0).unwrap();
    coordinator.request_work(Some(10), 0);

    let mut first = report("https://a.test/", 0, 200);
    first.discovered_urls = vec![
        "https://a.test/x".to_string(),
        "https://other.test/y".to_string(),
    ];
    coordinator.report_result(first, 1000);

    assert_eq!(coordinator.frontier_size(), 1);

    let second_batch = coordinator.request_work(Some(10), 2000);
    assert_eq!(second_batch.urls.len(), 1);
    assert_eq!(second_batch.urls[0].url.as_str(), "https://a.test/x");
    assert_eq!(second_batch.urls[0].depth, 1);

    let mut second = report("https://a.test/x", 1, 200);
    second.discovered_urls = vec!["https://a.test/x/child".to_string()];
    coordinator.report_result(second, 3000);

    assert_eq!(coordinator.frontier_size(), 0);
}

/// 6. Pause/resume: dispatch halts while paused and resumes without
/// disturbing `startedAt`.
#[test]
fn pause_then_resume() {
    let mut coordinator = Coordinator::new("scenario-6".to_string(), 0);
    coordinator.seed(
        &["https://a.test/p1".to_string(), "https://b.test/p1".to_string()],
        0,
        0,
        0,
    );
    coordinator.start(100).unwrap();

    coordinator.pause(500).unwrap();
    let while_paused = coordinator.request_work(Some(10), 600);
    assert!(while_paused.urls.is_empty());

    coordinator.resume(900).unwrap();
    let after_resume = coordinator.request_work(Some(10), 1000);
    assert_eq!(after_resume.urls.len(), 2);

    let stats = coordinator.stats_snapshot();
    assert_eq!(stats.started_at, Some(100));
}
