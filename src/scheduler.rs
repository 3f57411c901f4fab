//! Fixed-rate updates and optionally capped rendering on one thread.
//!
//! The event loop asks [`FrameScheduler::tick`] what to run every time it
//! wakes, and [`FrameScheduler::next_deadline`] when to wake next.

use std::time::{Duration, Instant};

/// Upper bound on update steps run in a single tick.
pub const MAX_UPDATES_PER_TICK: u32 = 8;
/// Update and render rates are clamped to this range.
pub const MIN_RATE_HZ: f64 = 1.0;
pub const MAX_RATE_HZ: f64 = 10_000.0;
/// Elapsed time per tick is clamped to this, so a stall (debugger, window
/// drag) does not turn into a burst of catch-up updates.
pub const MAX_TICK_DELTA: Duration = Duration::from_millis(250);

/// What the app should run for one pass through the event loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Number of fixed-step updates to run, in order, before rendering.
    pub updates: u32,
    /// Step size for each update, in seconds.
    pub update_dt: f32,
    /// Time since the previous render if a render is due this tick.
    pub render_dt: Option<f32>,
}

/// Drives the update and render phases.
///
/// Updates run at a fixed rate independent of rendering. Rendering runs
/// every tick when uncapped, otherwise at most once per render interval.
#[derive(Clone, Debug)]
pub struct FrameScheduler {
    update_interval: Duration,
    render_interval: Option<Duration>,
    accumulator: Duration,
    last_tick: Option<Instant>,
    last_render: Option<Instant>,
}

impl FrameScheduler {
    /// `render_rate_hz` of `None` renders as fast as the loop spins, as does
    /// a rate that is not positive. Rates are clamped to
    /// `MIN_RATE_HZ..=MAX_RATE_HZ`.
    pub fn new(update_rate_hz: f64, render_rate_hz: Option<f64>) -> Self {
        Self {
            update_interval: rate_interval(update_rate_hz),
            render_interval: render_rate_hz.filter(|hz| *hz > 0.0).map(rate_interval),
            accumulator: Duration::ZERO,
            last_tick: None,
            last_render: None,
        }
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn render_interval(&self) -> Option<Duration> {
        self.render_interval
    }

    /// Advances the clock to `now` and decides what to run.
    ///
    /// The first tick only establishes the baseline: it renders but runs no
    /// updates.
    pub fn tick(&mut self, now: Instant) -> FrameTick {
        let elapsed = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).min(MAX_TICK_DELTA),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);

        self.accumulator += elapsed;
        let mut updates = 0;
        while self.accumulator >= self.update_interval && updates < MAX_UPDATES_PER_TICK {
            self.accumulator -= self.update_interval;
            updates += 1;
        }
        if updates == MAX_UPDATES_PER_TICK {
            self.accumulator = self.accumulator.min(self.update_interval);
        }

        let render_due = match (self.render_interval, self.last_render) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        };

        let render_dt = if render_due {
            let dt = self
                .last_render
                .map(|last| now.saturating_duration_since(last).as_secs_f32())
                .unwrap_or(0.0);
            self.last_render = Some(now);
            Some(dt)
        } else {
            None
        };

        FrameTick {
            updates,
            update_dt: self.update_interval.as_secs_f32(),
            render_dt,
        }
    }

    /// When the loop next has work to do, or `None` if it should spin.
    pub fn next_deadline(&self) -> Option<Instant> {
        let render_interval = self.render_interval?;
        let next_render = self.last_render.map(|last| last + render_interval)?;
        let next_update = self
            .last_tick
            .map(|last| last + self.update_interval.saturating_sub(self.accumulator));

        Some(match next_update {
            Some(update) => update.min(next_render),
            None => next_render,
        })
    }
}

fn rate_interval(rate_hz: f64) -> Duration {
    let hz = if rate_hz.is_nan() {
        MIN_RATE_HZ
    } else {
        rate_hz.clamp(MIN_RATE_HZ, MAX_RATE_HZ)
    };
    Duration::from_secs_f64(1.0 / hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_tick_renders_without_updates() {
        let mut scheduler = FrameScheduler::new(100.0, Some(100.0));
        let tick = scheduler.tick(Instant::now());
        assert_eq!(tick.updates, 0);
        assert_eq!(tick.render_dt, Some(0.0));
    }

    #[test]
    fn updates_run_at_fixed_rate() {
        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(100.0, None);
        scheduler.tick(start);

        let tick = scheduler.tick(start + ms(35));
        assert_eq!(tick.updates, 3);
        assert!((tick.update_dt - 0.01).abs() < 1e-6);

        // 5 ms left over + 5 ms more = one more step
        let tick = scheduler.tick(start + ms(40));
        assert_eq!(tick.updates, 1);
    }

    #[test]
    fn uncapped_renders_every_tick() {
        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(100.0, None);
        for i in 0..5 {
            assert!(scheduler.tick(start + ms(i)).render_dt.is_some());
        }
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn capped_render_waits_for_interval() {
        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(100.0, Some(50.0));
        assert!(scheduler.tick(start).render_dt.is_some());
        assert!(scheduler.tick(start + ms(10)).render_dt.is_none());

        let tick = scheduler.tick(start + ms(20));
        let dt = tick.render_dt.unwrap();
        assert!((dt - 0.02).abs() < 1e-6);

        let deadline = scheduler.next_deadline().unwrap();
        assert!(deadline <= start + ms(40));
        assert!(deadline > start + ms(20));
    }

    #[test]
    fn out_of_range_rates_are_clamped() {
        let slow = FrameScheduler::new(1e-30, Some(1e-30));
        assert_eq!(slow.update_interval(), Duration::from_secs(1));
        assert_eq!(slow.render_interval(), Some(Duration::from_secs(1)));

        let fast = FrameScheduler::new(f64::INFINITY, Some(1e12));
        assert_eq!(fast.update_interval(), Duration::from_micros(100));
        assert_eq!(fast.render_interval(), Some(Duration::from_micros(100)));

        let nan = FrameScheduler::new(f64::NAN, Some(f64::NAN));
        assert_eq!(nan.update_interval(), Duration::from_secs(1));
        assert_eq!(nan.render_interval(), None);

        assert_eq!(FrameScheduler::new(100.0, Some(0.0)).render_interval(), None);
        assert_eq!(FrameScheduler::new(100.0, Some(-5.0)).render_interval(), None);
    }

    #[test]
    fn stalls_are_clamped() {
        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(100.0, None);
        scheduler.tick(start);

        let tick = scheduler.tick(start + Duration::from_secs(10));
        assert_eq!(tick.updates, MAX_UPDATES_PER_TICK);

        // The backlog was dropped, not deferred
        let tick = scheduler.tick(start + Duration::from_secs(10) + ms(1));
        assert!(tick.updates <= 1);
    }
}
