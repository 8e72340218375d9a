use std::time::Duration;

use tokio::time::{self, Instant};

use super::{Liveness, LivenessPolicy, Verdict};

const INTERVAL: Duration = Duration::from_secs(30);
const WINDOW: Duration = Duration::from_secs(60);
const SWEEP: Duration = Duration::from_secs(10);

fn heartbeat() -> LivenessPolicy {
    LivenessPolicy::Heartbeat { interval: INTERVAL }
}

fn sliding_ttl() -> LivenessPolicy {
    LivenessPolicy::SlidingTtl {
        window: WINDOW,
        sweep_interval: SWEEP,
    }
}

#[test]
fn check_period_follows_the_policy() {
    assert_eq!(heartbeat().check_period(), INTERVAL);
    assert_eq!(sliding_ttl().check_period(), SWEEP);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_pings_then_expires_without_pong() {
    let mut liveness = Liveness::new(&heartbeat(), Instant::now());

    time::advance(INTERVAL).await;
    assert_eq!(liveness.on_tick(Instant::now()), Verdict::SendPing);

    // no pong before the next tick
    time::advance(INTERVAL).await;
    assert_eq!(liveness.on_tick(Instant::now()), Verdict::Expired);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_survives_while_pongs_arrive() {
    let mut liveness = Liveness::new(&heartbeat(), Instant::now());

    for _ in 0..5 {
        time::advance(INTERVAL).await;
        assert_eq!(liveness.on_tick(Instant::now()), Verdict::SendPing);
        liveness.on_pong();
    }
}

#[tokio::test(start_paused = true)]
async fn heartbeat_ignores_envelope_activity() {
    let mut liveness = Liveness::new(&heartbeat(), Instant::now());

    time::advance(INTERVAL).await;
    assert_eq!(liveness.on_tick(Instant::now()), Verdict::SendPing);

    // envelopes are not pongs
    liveness.on_activity(Instant::now());
    time::advance(INTERVAL).await;
    assert_eq!(liveness.on_tick(Instant::now()), Verdict::Expired);
}

#[tokio::test(start_paused = true)]
async fn sliding_ttl_expires_when_idle() {
    let mut liveness = Liveness::new(&sliding_ttl(), Instant::now());

    for _ in 0..5 {
        time::advance(SWEEP).await;
        assert_eq!(liveness.on_tick(Instant::now()), Verdict::Alive);
    }
    time::advance(SWEEP).await;
    assert_eq!(liveness.on_tick(Instant::now()), Verdict::Expired);
}

#[tokio::test(start_paused = true)]
async fn sliding_ttl_activity_defers_expiry() {
    let mut liveness = Liveness::new(&sliding_ttl(), Instant::now());

    // one envelope per half window keeps the connection alive forever
    for _ in 0..8 {
        time::advance(WINDOW / 2).await;
        assert_eq!(liveness.on_tick(Instant::now()), Verdict::Alive);
        liveness.on_activity(Instant::now());
    }

    // silence runs the window out
    time::advance(WINDOW).await;
    assert_eq!(liveness.on_tick(Instant::now()), Verdict::Expired);
}

#[tokio::test(start_paused = true)]
async fn sliding_ttl_ignores_pongs() {
    let mut liveness = Liveness::new(&sliding_ttl(), Instant::now());

    time::advance(WINDOW / 2).await;
    liveness.on_pong();
    time::advance(WINDOW / 2).await;
    assert_eq!(liveness.on_tick(Instant::now()), Verdict::Expired);
}
