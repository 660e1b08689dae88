//! Frame scheduling.
//!
//! The host calls [`FrameScheduler::run_frame`] once per display refresh.
//! Every animation started on the scheduler is stepped and rendered once
//! per call until its [`FrameHandle`] is stopped.

use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
    time::{Duration, Instant},
};

use tracing::{debug, trace};

/// Something advanced and redrawn once per frame.
pub trait Animate {
    fn step(&mut self);
    fn render(&mut self);
}

/// Owned registration of one animation with a [`FrameScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Runs registered animations on every frame.
#[derive(Default)]
pub struct FrameScheduler {
    next_id: u64,
    tasks: Vec<(FrameHandle, Rc<RefCell<dyn Animate>>)>,
    frames: u64,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("active", &self.tasks.iter().map(|(h, _)| h).collect::<Vec<_>>())
            .field("frames", &self.frames)
            .finish()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `target` on every following frame.
    pub fn start<A: Animate + 'static>(&mut self, target: Rc<RefCell<A>>) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        let target: Rc<RefCell<dyn Animate>> = target;
        self.tasks.push((handle, target));
        debug!(?handle, "animation started");
        handle
    }

    /// Cancel a scheduled animation. Returns `false` if it was not running,
    /// so stopping twice is harmless.
    pub fn stop(&mut self, handle: FrameHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(h, _)| *h != handle);
        let stopped = self.tasks.len() != before;
        if stopped {
            debug!(?handle, "animation stopped");
        }
        stopped
    }

    pub fn is_active(&self, handle: FrameHandle) -> bool {
        self.tasks.iter().any(|(h, _)| *h == handle)
    }

    /// Number of scheduled animations.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Step then render every scheduled animation once. Returns how many ran.
    pub fn run_frame(&mut self) -> usize {
        self.frames += 1;
        let mut ran = 0;
        for (handle, task) in &self.tasks {
            // Only reachable if the host holds a borrow across frames.
            let Ok(mut task) = task.try_borrow_mut() else {
                trace!(?handle, "animation busy, skipping frame");
                continue;
            };
            task.step();
            task.render();
            ran += 1;
        }
        ran
    }
}

/// Fixed refresh cadence for the host loop.
///
/// A late frame is not compensated: the next deadline is measured from when
/// the late frame actually ran.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    interval: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now,
        }
    }

    /// Clock ticking `fps` times per second.
    pub fn from_fps(fps: u32, now: Instant) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1), now)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a frame is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Record that a frame ran at `now`.
    pub fn mark(&mut self, now: Instant) {
        self.next = now + self.interval;
    }

    /// Time left until the next frame, zero if overdue.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        steps: usize,
        renders: usize,
        log: Vec<&'static str>,
    }

    impl Animate for Counter {
        fn step(&mut self) {
            self.steps += 1;
            self.log.push("step");
        }

        fn render(&mut self) {
            self.renders += 1;
            self.log.push("render");
        }
    }

    #[test]
    fn test_step_runs_before_render() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let mut scheduler = FrameScheduler::new();
        scheduler.start(counter.clone());
        scheduler.run_frame();
        scheduler.run_frame();
        assert_eq!(counter.borrow().log, ["step", "render", "step", "render"]);
    }

    #[test]
    fn test_no_renders_after_stop() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.start(counter.clone());

        for _ in 0..3 {
            scheduler.run_frame();
        }
        assert_eq!(counter.borrow().renders, 3);

        assert!(scheduler.stop(handle));
        for _ in 0..5 {
            assert_eq!(scheduler.run_frame(), 0);
        }
        assert_eq!(counter.borrow().renders, 3);
        assert_eq!(counter.borrow().steps, 3);
        assert!(!scheduler.is_active(handle));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.start(Rc::new(RefCell::new(Counter::default())));
        assert!(scheduler.stop(handle));
        assert!(!scheduler.stop(handle));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_stopping_one_leaves_others_running() {
        let a = Rc::new(RefCell::new(Counter::default()));
        let b = Rc::new(RefCell::new(Counter::default()));
        let mut scheduler = FrameScheduler::new();
        let ha = scheduler.start(a.clone());
        let hb = scheduler.start(b.clone());
        assert_ne!(ha, hb);

        scheduler.stop(ha);
        scheduler.run_frame();
        assert_eq!(a.borrow().renders, 0);
        assert_eq!(b.borrow().renders, 1);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.frames(), 1);
    }

    #[test]
    fn test_busy_animation_is_skipped() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let mut scheduler = FrameScheduler::new();
        scheduler.start(counter.clone());
        let guard = counter.borrow_mut();
        assert_eq!(scheduler.run_frame(), 0);
        drop(guard);
        assert_eq!(scheduler.run_frame(), 1);
    }

    #[test]
    fn test_frame_clock_does_not_compensate() {
        let start = Instant::now();
        let mut clock = FrameClock::from_fps(50, start);
        assert_eq!(clock.interval(), Duration::from_millis(20));
        assert!(clock.is_due(start));

        let late = start + Duration::from_millis(55);
        clock.mark(late);
        assert!(!clock.is_due(late + Duration::from_millis(19)));
        assert!(clock.is_due(late + Duration::from_millis(20)));
        assert_eq!(clock.remaining(late), Duration::from_millis(20));
        assert_eq!(clock.remaining(late + Duration::from_secs(1)), Duration::ZERO);
    }
}
