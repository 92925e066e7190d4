//! Rolling window and baseline tracker tests.

use scenestill::{Baseline, PacketSizeTracker, RollingWindow};

// ── RollingWindow ──────────────────────────────────────────────────

#[test]
fn window_evicts_oldest_first() {
    let mut window = RollingWindow::new(3);
    assert_eq!(window.push(1), None);
    assert_eq!(window.push(2), None);
    assert_eq!(window.push(3), None);
    assert_eq!(window.push(4), Some(1));
    assert_eq!(window.push(5), Some(2));
    assert_eq!(window.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
}

#[test]
fn window_length_never_exceeds_capacity() {
    let mut window = RollingWindow::new(4);
    for value in 0..100 {
        window.push(value);
        assert!(window.len() <= window.capacity());
    }
    assert_eq!(window.len(), 4);
}

#[test]
fn window_mean_tracks_evictions() {
    let mut window = RollingWindow::new(2);
    assert_eq!(window.mean(), None);
    window.push(10);
    assert_eq!(window.mean(), Some(10.0));
    window.push(20);
    assert_eq!(window.mean(), Some(15.0));
    window.push(40);
    assert_eq!(window.mean(), Some(30.0));
}

#[test]
fn window_median_odd_and_even() {
    let mut window = RollingWindow::new(4);
    assert_eq!(window.median(), None);
    for value in [9, 1, 5] {
        window.push(value);
    }
    assert_eq!(window.median(), Some(5.0));
    window.push(7);
    assert_eq!(window.median(), Some(6.0));
}

#[test]
fn zero_capacity_is_bumped_to_one() {
    let mut window = RollingWindow::new(0);
    assert_eq!(window.capacity(), 1);
    window.push(3);
    assert_eq!(window.push(4), Some(3));
}

// ── PacketSizeTracker ──────────────────────────────────────────────

#[test]
fn tracker_is_insufficient_until_window_minus_one() {
    let mut tracker = PacketSizeTracker::new(5);
    for _ in 0..4 {
        assert_eq!(tracker.observe(1_000), Baseline::Insufficient);
    }
    assert_eq!(tracker.observe(1_000), Baseline::Mean(1_000.0));
}

#[test]
fn tracker_baseline_excludes_current_packet() {
    let mut tracker = PacketSizeTracker::new(3);
    tracker.observe(100);
    tracker.observe(300);
    let baseline = tracker.observe(1_000_000);
    assert_eq!(baseline, Baseline::Mean(200.0));
}

#[test]
fn tracker_averages_only_the_last_window() {
    let mut tracker = PacketSizeTracker::new(3);
    for size in [1_000_000, 10, 20, 30] {
        tracker.observe(size);
    }
    // Window now holds 10, 20, 30.
    assert_eq!(tracker.observe(0).value(), Some(20.0));
    assert_eq!(tracker.window().len(), 3);
}
