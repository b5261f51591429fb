//! Progress reporting for long line-of-position builds.
//!
//! Components
//! -----------------
//! * [`IterTimer`] – Tracks per-step durations and keeps an exponential moving average,
//!   so the message of the bar stays readable when steps fluctuate.
//! * [`fmt_dur`] – Human-readable [`Duration`], e.g. `"253µs"`, `"42ms"`, `"3.14s"`.
//! * [`lop_progress_bar`] – Styled [`ProgressBar`] shared by the builders.
//!
//! Design notes
//! -----------------
//! * The EMA update rule is `ema ← α·dt + (1–α)·ema`, `α ∈ (0,1]`.
//!   The first tick initializes the average to the first duration.
//! * This module is enabled only with the `progress` feature.
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

pub struct IterTimer {
    last: Instant,
    ema_ns: f64,
    alpha: f64,
    count: u64,
}

impl IterTimer {
    pub fn new(alpha: f64) -> Self {
        Self {
            last: Instant::now(),
            ema_ns: 0.0,
            alpha,
            count: 0,
        }
    }

    #[inline]
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        self.count += 1;

        let dt_ns = dt.as_nanos() as f64;
        self.ema_ns = if self.count == 1 {
            dt_ns
        } else {
            self.alpha * dt_ns + (1.0 - self.alpha) * self.ema_ns
        };

        dt
    }

    #[inline]
    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.ema_ns as u64)
        }
    }
}

#[inline]
pub fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else {
        let ms = d.as_millis();
        if ms < 1_000 {
            format!("{ms}ms")
        } else {
            let s = d.as_secs_f32();
            format!("{s:.2}s")
        }
    }
}

/// Bar of `total` steps with the crate's template, ticking every 200 ms.
pub fn lop_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total.max(1));
    pb.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}",
        )
        .expect("indicatif template"),
    );
    pb.enable_steady_tick(Duration::from_millis(200));
    pb
}

#[cfg(test)]
mod progress_bar_test {
    use super::*;

    #[test]
    fn test_fmt_dur() {
        assert_eq!(fmt_dur(Duration::from_micros(253)), "253µs");
        assert_eq!(fmt_dur(Duration::from_millis(42)), "42ms");
        assert_eq!(fmt_dur(Duration::from_millis(3140)), "3.14s");
    }

    #[test]
    fn test_iter_timer_average() {
        let mut timer = IterTimer::new(0.2);
        assert_eq!(timer.avg(), Duration::from_nanos(0));
        let first = timer.tick();
        assert_eq!(timer.avg().as_nanos(), first.as_nanos());
        timer.tick();
        assert_eq!(timer.count, 2);
    }
}
