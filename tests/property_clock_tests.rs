use chart_clock::animation::{Animation, Clip};
use chart_clock::bridge::{FrameBridge, LEGACY_SECONDS_THRESHOLD, UpdateInterval};
use chart_clock::clock::ClockOverride;
use chart_clock::core::{FrameTick, Theme, Viewport};
use chart_clock::engine::{HeadlessChart, HeadlessEngine};
use chart_clock::host::ManualTimeline;
use chart_clock::render::Canvas;
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

struct LifetimeClip {
    lifetime: u32,
    steps: Rc<Cell<u32>>,
    destroyed: Rc<Cell<u32>>,
}

impl Clip for LifetimeClip {
    fn step(&mut self, _time: f64, _delta: f64) -> bool {
        self.steps.set(self.steps.get() + 1);
        self.steps.get() >= self.lifetime
    }

    fn on_destroy(&mut self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

proptest! {
    #[test]
    fn clips_step_once_per_frame_until_they_finish(
        lifetimes in prop::collection::vec(1u32..12, 1..24),
        frames in 1u32..16
    ) {
        let mut animation = Animation::new();
        ClockOverride::install(Some(&mut animation)).expect("install");
        animation.start();

        let counters: Vec<_> = lifetimes
            .iter()
            .map(|&lifetime| {
                let steps = Rc::new(Cell::new(0));
                let destroyed = Rc::new(Cell::new(0));
                animation.add_clip(Box::new(LifetimeClip {
                    lifetime,
                    steps: steps.clone(),
                    destroyed: destroyed.clone(),
                }));
                (lifetime, steps, destroyed)
            })
            .collect();

        for frame in 1..=frames {
            let tick = FrameTick::new(f64::from(frame) * 16.0, 16.0);
            ClockOverride::advance(&mut animation, tick, true).expect("advance");
        }

        for (lifetime, steps, destroyed) in &counters {
            prop_assert_eq!(steps.get(), (*lifetime).min(frames));
            prop_assert_eq!(destroyed.get(), u32::from(*lifetime <= frames));
        }
        let alive = counters.iter().filter(|(lifetime, _, _)| *lifetime > frames).count();
        prop_assert_eq!(animation.clip_count(), alive);
    }

    #[test]
    fn accumulator_fires_exactly_when_interval_is_reached(
        deltas in prop::collection::vec(0u32..60, 1..64),
        interval in 1u32..200
    ) {
        let timeline = ManualTimeline::new();
        let bridge: FrameBridge<HeadlessChart> = FrameBridge::new();
        bridge
            .start(
                &mut HeadlessEngine::new(),
                Canvas::new(Viewport::new(4, 4)).expect("canvas"),
                &Theme::light(),
                &timeline,
            )
            .expect("start");

        let fired = Rc::new(Cell::new(0u32));
        let counter = fired.clone();
        bridge
            .register_callback(
                move |_chart: &mut HeadlessChart| {
                    counter.set(counter.get() + 1);
                    Ok(())
                },
                UpdateInterval::millis(f64::from(interval)),
            )
            .expect("register");

        let mut expected_fires = 0u32;
        let mut expected_acc = 0u32;
        for delta in deltas {
            timeline.advance(f64::from(delta)).expect("frame");
            expected_acc += delta;
            if expected_acc >= interval {
                expected_fires += 1;
                expected_acc = 0;
            }
            let accumulated = bridge.accumulated_millis().expect("registered");
            prop_assert_eq!(accumulated, f64::from(expected_acc));
            prop_assert!(accumulated < f64::from(interval));
        }
        prop_assert_eq!(fired.get(), expected_fires);
    }

    #[test]
    fn legacy_interval_splits_at_threshold(value in 0.0f64..10_000.0) {
        let millis = UpdateInterval::from_legacy(value).as_millis();
        if value < LEGACY_SECONDS_THRESHOLD {
            prop_assert!((millis - value * 1_000.0).abs() <= 1e-9);
        } else {
            prop_assert_eq!(millis, value);
        }
    }
}
