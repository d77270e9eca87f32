//! Behavioral tests for WorkflowReminderScheduler

use beads_config::ReminderConfig;
use beads_reminder::{ReminderDecision, SkipReason, WorkflowReminderScheduler};
use beads_tracker::{Issue, TrackerError};
use std::sync::atomic::{AtomicUsize, Ordering};

fn scheduler(interval: u32) -> WorkflowReminderScheduler {
    WorkflowReminderScheduler::new(
        "session-1",
        ReminderConfig {
            reminder_interval: interval,
            ..Default::default()
        },
    )
    .unwrap()
}

fn one_issue() -> Result<Vec<Issue>, TrackerError> {
    Ok(vec![Issue::new("x-1", "Fix bug")])
}

fn no_issues() -> Result<Vec<Issue>, TrackerError> {
    Ok(Vec::new())
}

/// Tiny deterministic generator for event sequences
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_scenario_a_reminds_after_interval() {
    let mut s = scheduler(3);
    for _ in 0..3 {
        s.on_tool_completed("other");
    }

    let decision = s.on_before_request(|| async { one_issue() }).await;

    let reminder = decision.reminder().expect("expected a reminder");
    assert_eq!(reminder.items().len(), 1);
    assert_eq!(reminder.items()[0].id, "x-1");
    assert!(reminder.render().contains("- **x-1**: Fix bug"));
    assert_eq!(s.state().calls_since_last_reminder(), 0);
}

#[tokio::test]
async fn test_scenario_b_recent_tracked_tool_suppresses() {
    let mut s = scheduler(3);
    s.on_tool_completed("other");
    s.on_tool_completed("other");
    s.on_tool_completed("beads");
    s.on_tool_completed("other");

    let decision = s.on_before_request(|| async { one_issue() }).await;

    assert_eq!(decision, ReminderDecision::Skip(SkipReason::RecentlyUsed));
    assert_eq!(s.state().calls_since_last_reminder(), 4);
}

#[tokio::test]
async fn test_scenario_c_throttle_after_firing() {
    let mut s = scheduler(2);
    s.on_tool_completed("other");
    s.on_tool_completed("other");
    assert!(s.on_before_request(|| async { one_issue() }).await.is_remind());

    s.on_tool_completed("other");
    let decision = s.on_before_request(|| async { one_issue() }).await;

    assert_eq!(decision.skip_reason(), Some(SkipReason::Throttled));
}

#[tokio::test]
async fn test_scenario_d_query_timeout_is_swallowed() {
    let mut s = scheduler(1);
    s.on_tool_completed("other");

    let decision = s
        .on_before_request(|| async { Err::<Vec<Issue>, _>(TrackerError::Timeout(10)) })
        .await;

    assert_eq!(decision.skip_reason(), Some(SkipReason::QueryFailed));
    // Nothing fired, so the throttle is still open for the next request
    assert_eq!(s.state().calls_since_last_reminder(), 1);
}

// ============================================================================
// Gates
// ============================================================================

#[tokio::test]
async fn test_no_active_work_skips() {
    let mut s = scheduler(1);
    s.on_tool_completed("other");

    let decision = s.on_before_request(|| async { no_issues() }).await;
    assert_eq!(decision.skip_reason(), Some(SkipReason::NoActiveWork));
}

#[tokio::test]
async fn test_disabled_is_a_no_op() {
    let mut s = WorkflowReminderScheduler::new(
        "s",
        ReminderConfig {
            enabled: false,
            reminder_interval: 1,
            ..Default::default()
        },
    )
    .unwrap();

    s.on_tool_completed("other");
    assert!(s.state().recent_tools().is_empty());
    assert_eq!(s.state().calls_since_last_reminder(), 0);

    let decision = s.on_before_request(|| async { one_issue() }).await;
    assert_eq!(decision.skip_reason(), Some(SkipReason::Disabled));
}

#[tokio::test]
async fn test_query_not_run_when_cheap_gates_skip() {
    let calls = AtomicUsize::new(0);
    let mut s = scheduler(3);

    s.on_tool_completed("other");
    let decision = s
        .on_before_request(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            one_issue()
        })
        .await;
    assert_eq!(decision.skip_reason(), Some(SkipReason::Throttled));

    s.on_tool_completed("beads");
    s.on_tool_completed("other");
    let decision = s
        .on_before_request(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            one_issue()
        })
        .await;
    assert_eq!(decision.skip_reason(), Some(SkipReason::RecentlyUsed));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_tracked_tool_leaves_window_then_reminds() {
    let mut s = WorkflowReminderScheduler::new(
        "s",
        ReminderConfig {
            recent_tool_threshold: 2,
            reminder_interval: 3,
            ..Default::default()
        },
    )
    .unwrap();

    s.on_tool_completed("beads");
    s.on_tool_completed("other");
    s.on_tool_completed("other");

    assert_eq!(s.state().recent_tools(), vec!["other", "other"]);
    assert!(s.state().ever_used_tracked_tool());
    assert!(s.on_before_request(|| async { one_issue() }).await.is_remind());
}

#[tokio::test]
async fn test_display_cap_and_more_summary() {
    let mut s = WorkflowReminderScheduler::new(
        "s",
        ReminderConfig {
            reminder_interval: 1,
            max_displayed_items: 2,
            ..Default::default()
        },
    )
    .unwrap();
    s.on_tool_completed("other");

    let decision = s
        .on_before_request(|| async {
            Ok::<_, TrackerError>(vec![
                Issue::new("a-1", "One"),
                Issue::new("a-2", "Two"),
                Issue::new("a-3", "Three"),
                Issue::new("a-4", "Four"),
            ])
        })
        .await;

    let reminder = decision.reminder().unwrap();
    assert_eq!(reminder.items().len(), 2);
    assert_eq!(reminder.hidden(), 2);
    assert!(reminder.render().contains("- ... and 2 more"));
}

// ============================================================================
// Properties over generated sequences
// ============================================================================

#[tokio::test]
async fn test_window_bound_and_counter_properties() {
    let tools = ["beads", "read_file", "edit_file", "bash", "grep"];

    for seed in 0..20u64 {
        let mut rng = Lcg(seed);
        let window = (rng.next() % 6 + 1) as usize;
        let interval = (rng.next() % 5 + 1) as u32;
        let mut s = WorkflowReminderScheduler::new(
            "prop",
            ReminderConfig {
                recent_tool_threshold: window,
                reminder_interval: interval,
                ..Default::default()
            },
        )
        .unwrap();

        let mut history: Vec<&str> = Vec::new();
        let mut calls_since_fire: Option<u32> = None;

        for _ in 0..200 {
            if rng.next() % 3 == 0 {
                let before = s.state().calls_since_last_reminder();
                let recent_tracked = s.state().recent_tools().contains(&"beads");
                let has_work = rng.next() % 2 == 0;

                let decision = s
                    .on_before_request(|| async move {
                        if has_work {
                            one_issue()
                        } else {
                            no_issues()
                        }
                    })
                    .await;

                if decision.is_remind() {
                    // Throttle: never within interval - 1 calls of a prior fire
                    if let Some(n) = calls_since_fire {
                        assert!(n >= interval, "seed {}: fired after {} calls", seed, n);
                    }
                    assert!(before >= interval);
                    assert!(!recent_tracked, "seed {}: fired with tracked tool in window", seed);
                    assert!(has_work);
                    assert_eq!(s.state().calls_since_last_reminder(), 0);
                    calls_since_fire = Some(0);
                } else {
                    assert_eq!(s.state().calls_since_last_reminder(), before);
                }
            } else {
                let tool = tools[(rng.next() % tools.len() as u64) as usize];
                let before = s.state().calls_since_last_reminder();
                s.on_tool_completed(tool);
                history.push(tool);
                if let Some(n) = calls_since_fire.as_mut() {
                    *n += 1;
                }

                assert_eq!(s.state().calls_since_last_reminder(), before + 1);
                let recent = s.state().recent_tools();
                assert!(recent.len() <= window);
                let start = history.len().saturating_sub(window);
                assert_eq!(recent, history[start..].to_vec());
            }
        }
    }
}
