use chart_clock::ChartError;
use chart_clock::animation::{
    Animation, AnimationEvent, AnimationListener, Clip, DriverKind, FnClip,
};
use chart_clock::clock::{ClockOverride, InstallOutcome};
use chart_clock::core::FrameTick;
use chart_clock::host::ManualTimeline;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Finishes after `frames` steps and counts its own steps and destroys.
struct CountedClip {
    frames: u32,
    steps: Rc<Cell<u32>>,
    destroyed: Rc<Cell<u32>>,
}

impl Clip for CountedClip {
    fn step(&mut self, _time: f64, _delta: f64) -> bool {
        self.steps.set(self.steps.get() + 1);
        self.steps.get() >= self.frames
    }

    fn on_destroy(&mut self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

fn counted(frames: u32) -> (CountedClip, Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let steps = Rc::new(Cell::new(0));
    let destroyed = Rc::new(Cell::new(0));
    (
        CountedClip {
            frames,
            steps: steps.clone(),
            destroyed: destroyed.clone(),
        },
        steps,
        destroyed,
    )
}

struct RecordingListener {
    events: Rc<RefCell<Vec<AnimationEvent>>>,
}

impl AnimationListener for RecordingListener {
    fn id(&self) -> &str {
        "recorder"
    }

    fn on_event(&mut self, event: AnimationEvent) {
        self.events.borrow_mut().push(event);
    }
}

fn installed() -> Animation {
    let mut animation = Animation::new();
    ClockOverride::install(Some(&mut animation)).expect("install");
    animation.start();
    animation
}

#[test]
fn install_replaces_native_timer() {
    let mut animation = Animation::new();
    assert_eq!(animation.driver_kind(), DriverKind::Native);

    let outcome = ClockOverride::install(Some(&mut animation)).expect("install");
    assert_eq!(outcome, InstallOutcome::Installed);
    assert_eq!(animation.driver_kind(), DriverKind::External);
}

#[test]
fn install_is_idempotent() {
    let mut animation = installed();
    let steps = Rc::new(Cell::new(0));
    let counter = steps.clone();
    animation.add_clip(Box::new(FnClip::new(move |_, _| {
        counter.set(counter.get() + 1);
        false
    })));

    let outcome = ClockOverride::install(Some(&mut animation)).expect("second install");
    assert_eq!(outcome, InstallOutcome::AlreadyInstalled);

    ClockOverride::advance(&mut animation, FrameTick::new(16.0, 16.0), true).expect("advance");
    assert_eq!(steps.get(), 1);
}

#[test]
fn install_fails_fast_without_driver() {
    let err = ClockOverride::install(None).expect_err("missing driver");
    assert!(matches!(err, ChartError::MissingAnimationDriver));
}

#[test]
fn install_rejects_disposed_driver() {
    let mut animation = Animation::new();
    animation.dispose();
    let err = ClockOverride::install(Some(&mut animation)).expect_err("disposed driver");
    assert!(matches!(err, ChartError::MalformedAnimationDriver(_)));
}

#[test]
fn install_keeps_running_state_and_clips() {
    let mut animation = Animation::new();
    animation.start();
    let (clip, steps, _) = counted(10);
    let id = animation.add_clip(Box::new(clip));

    ClockOverride::install(Some(&mut animation)).expect("install");
    assert!(animation.is_running());
    assert!(animation.has_clip(id));

    ClockOverride::advance(&mut animation, FrameTick::new(16.0, 16.0), false).expect("advance");
    assert_eq!(steps.get(), 1);
}

#[test]
fn start_after_install_schedules_no_native_frames() {
    let mut animation = installed();
    let (clip, steps, _) = counted(10);
    animation.add_clip(Box::new(clip));

    assert!(animation.is_running());
    assert!(animation.poll().is_none());
    assert_eq!(steps.get(), 0);
}

#[test]
fn advance_requires_installed_override() {
    let mut animation = Animation::new();
    animation.start();
    let err = ClockOverride::advance(&mut animation, FrameTick::new(16.0, 16.0), true)
        .expect_err("native driver");
    assert!(matches!(err, ChartError::MalformedAnimationDriver(_)));
}

#[test]
fn advance_rejects_negative_delta() {
    let mut animation = installed();
    let err = ClockOverride::advance(&mut animation, FrameTick::new(16.0, -1.0), true)
        .expect_err("negative delta");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn each_live_clip_steps_once_per_advance() {
    let mut animation = installed();
    let counters: Vec<_> = (0..3)
        .map(|_| {
            let (clip, steps, _) = counted(100);
            animation.add_clip(Box::new(clip));
            steps
        })
        .collect();

    let report =
        ClockOverride::advance(&mut animation, FrameTick::new(16.0, 16.0), true).expect("advance");
    assert_eq!(report.stepped, 3);
    assert_eq!(report.remaining, 3);
    assert!(counters.iter().all(|steps| steps.get() == 1));
}

#[test]
fn clip_finishing_mid_traversal_does_not_skip_its_successor() {
    let mut animation = installed();
    let (first, first_steps, _) = counted(5);
    let (middle, middle_steps, middle_destroyed) = counted(1);
    let (last, last_steps, _) = counted(5);
    animation.add_clip(Box::new(first));
    let middle_id = animation.add_clip(Box::new(middle));
    let last_id = animation.add_clip(Box::new(last));

    let report =
        ClockOverride::advance(&mut animation, FrameTick::new(16.0, 16.0), true).expect("advance");

    assert_eq!(report.stepped, 3);
    assert_eq!(report.finished.as_slice(), &[middle_id]);
    assert_eq!(first_steps.get(), 1);
    assert_eq!(middle_steps.get(), 1);
    assert_eq!(last_steps.get(), 1);
    assert_eq!(middle_destroyed.get(), 1);
    assert!(!animation.has_clip(middle_id));
    assert!(animation.has_clip(last_id));
}

#[test]
fn finished_clip_is_never_stepped_again() {
    let mut animation = installed();
    let (clip, steps, destroyed) = counted(2);
    animation.add_clip(Box::new(clip));

    for frame in 1..=5 {
        let time = f64::from(frame) * 16.0;
        ClockOverride::advance(&mut animation, FrameTick::new(time, 16.0), true)
            .expect("advance");
    }

    assert_eq!(steps.get(), 2);
    assert_eq!(destroyed.get(), 1);
    assert_eq!(animation.clip_count(), 0);
}

#[test]
fn clips_receive_host_time_and_delta() {
    let mut animation = installed();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    animation.add_clip(Box::new(FnClip::new(move |time, delta| {
        sink.borrow_mut().push((time, delta));
        false
    })));

    ClockOverride::advance(&mut animation, FrameTick::new(1_000.0, 33.0), false).expect("advance");
    ClockOverride::advance(&mut animation, FrameTick::new(1_040.0, 40.0), false).expect("advance");

    assert_eq!(*seen.borrow(), vec![(1_000.0, 33.0), (1_040.0, 40.0)]);
}

#[test]
fn notify_flag_gates_frame_side_effects() {
    let mut animation = installed();
    let hook_calls = Rc::new(Cell::new(0));
    let hook_counter = hook_calls.clone();
    animation.set_frame_hook(move |_| hook_counter.set(hook_counter.get() + 1));
    let events = Rc::new(RefCell::new(Vec::new()));
    animation
        .register_listener(Box::new(RecordingListener {
            events: events.clone(),
        }))
        .expect("listener");

    let quiet =
        ClockOverride::advance(&mut animation, FrameTick::new(16.0, 16.0), false).expect("quiet");
    assert!(!quiet.notified);
    assert_eq!(hook_calls.get(), 0);
    assert!(events.borrow().is_empty());

    let loud =
        ClockOverride::advance(&mut animation, FrameTick::new(32.0, 16.0), true).expect("loud");
    assert!(loud.notified);
    assert_eq!(hook_calls.get(), 1);
    assert_eq!(
        *events.borrow(),
        vec![AnimationEvent::Frame { delta: 16.0 }]
    );
}

#[test]
fn advance_from_reads_current_timeline_tick() {
    let timeline = ManualTimeline::new();
    timeline.advance(25.0).expect("frame");

    let mut animation = installed();
    let seen = Rc::new(Cell::new((0.0, 0.0)));
    let sink = seen.clone();
    animation.add_clip(Box::new(FnClip::new(move |time, delta| {
        sink.set((time, delta));
        false
    })));

    ClockOverride::advance_from(&mut animation, &timeline, true).expect("advance");
    assert_eq!(seen.get(), (25.0, 25.0));
}

#[test]
fn removed_clip_skips_destroy_hook() {
    let mut animation = installed();
    let (clip, _, destroyed) = counted(3);
    let id = animation.add_clip(Box::new(clip));

    assert!(animation.remove_clip(id));
    ClockOverride::advance(&mut animation, FrameTick::new(16.0, 16.0), true).expect("advance");
    assert_eq!(destroyed.get(), 0);
    assert!(!animation.remove_clip(id));
}
