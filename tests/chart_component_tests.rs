use chart_clock::api::{ChartComponent, ChartComponentConfig};
use chart_clock::bridge::{BridgeState, UpdateInterval};
use chart_clock::core::{Theme, Viewport};
use chart_clock::engine::{ChartHandle, HeadlessChart, HeadlessEngine, SetOptionOpts};
use chart_clock::host::ManualTimeline;
use chart_clock::render::NullTextureSink;
use chart_clock::{ChartError, ChartResult};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

fn bar_option() -> serde_json::Value {
    json!({ "animationDuration": 64, "series": [{ "data": [3, 6] }] })
}

fn component(config: ChartComponentConfig) -> ChartComponent<HeadlessEngine, NullTextureSink> {
    ChartComponent::new(HeadlessEngine::new(), NullTextureSink::default(), config)
        .expect("component")
}

#[test]
fn start_uploads_first_frame_at_configured_size() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(bar_option()).with_size(48, 24));

    chart.start(&timeline).expect("start");

    assert_eq!(chart.state(), BridgeState::Active);
    let texture = chart.texture();
    assert_eq!(texture.upload_count, 1);
    assert_eq!(texture.last_viewport, Some(Viewport::new(48, 24)));
    assert_eq!(texture.last_pixels.len(), 48 * 24 * 4);
}

#[test]
fn every_host_frame_reuploads_texture() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(bar_option()));
    chart.start(&timeline).expect("start");

    timeline.run_frames(3, 16.0).expect("frames");
    assert_eq!(chart.texture().upload_count, 4);
}

#[test]
fn animation_completes_on_host_time() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(bar_option()));
    chart.start(&timeline).expect("start");

    timeline.advance(32.0).expect("halfway");
    let halfway = chart
        .bridge()
        .with_chart(|handle| handle.series_values(0))
        .expect("active");
    assert!(halfway[0] > 0.0 && halfway[0] < 3.0);

    timeline.advance(32.0).expect("done");
    let done = chart
        .bridge()
        .with_chart(|handle| handle.series_values(0))
        .expect("active");
    assert_eq!(done, vec![3.0, 6.0]);
}

#[test]
fn theme_from_config_paints_background() {
    let timeline = ManualTimeline::new();
    let config = ChartComponentConfig::from_json_str(r#"{ "theme": "dark", "width": 8, "height": 8 }"#)
        .expect("config");
    let mut chart = component(config);
    chart.start(&timeline).expect("start");

    let background = Theme::dark().background().to_rgba8();
    assert_eq!(&chart.texture().last_pixels[..4], &background);
}

#[test]
fn legacy_update_interval_is_read_as_seconds() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(bar_option()));
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    chart
        .update(
            move |_handle: &mut HeadlessChart| {
                counter.set(counter.get() + 1);
                Ok(())
            },
            0.1,
        )
        .expect("update");
    chart.start(&timeline).expect("start");

    timeline.run_frames(6, 16.0).expect("frames");
    assert_eq!(fired.get(), 0);
    timeline.advance(16.0).expect("frame");
    assert_eq!(fired.get(), 1);
}

#[test]
fn update_every_with_explicit_millis() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(bar_option()));
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    chart
        .update_every(
            move |_handle: &mut HeadlessChart| {
                counter.set(counter.get() + 1);
                Ok(())
            },
            UpdateInterval::millis(20.0),
        )
        .expect("update");
    chart.start(&timeline).expect("start");

    timeline.run_frames(4, 10.0).expect("frames");
    assert_eq!(fired.get(), 2);
}

#[test]
fn update_callback_can_push_new_data() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(json!({
        "animation": false,
        "series": [{ "data": [1] }]
    })));
    let mut next = 1.0;
    chart
        .update_every(
            move |handle: &mut HeadlessChart| -> ChartResult<()> {
                next += 1.0;
                handle.set_option(
                    &json!({ "series": [{ "data": [next] }] }),
                    &SetOptionOpts::default(),
                )
            },
            UpdateInterval::millis(16.0),
        )
        .expect("update");
    chart.start(&timeline).expect("start");

    timeline.run_frames(2, 16.0).expect("frames");
    let values = chart
        .bridge()
        .with_chart(|handle| handle.series_values(0))
        .expect("active");
    assert_eq!(values, vec![3.0]);
}

#[test]
fn update_now_runs_before_first_frame() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(bar_option()));
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    chart
        .update(
            move |_handle: &mut HeadlessChart| {
                counter.set(counter.get() + 1);
                Ok(())
            },
            1_000.0,
        )
        .expect("update");
    chart.update_now();
    assert!(chart.config().update_now);

    chart.start(&timeline).expect("start");
    assert_eq!(fired.get(), 1);
    assert_eq!(timeline.frames_dispatched(), 0);
}

#[test]
fn failed_start_installs_no_texture_hook() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(bar_option()));
    chart
        .update(
            |_handle: &mut HeadlessChart| Err(ChartError::InvalidData("no data yet".to_owned())),
            1_000.0,
        )
        .expect("update");
    chart.update_now();

    let err = chart.start(&timeline).expect_err("first callback fails");
    assert!(matches!(err, ChartError::InvalidData(_)));
    assert_eq!(chart.state(), BridgeState::Uninitialized);
    assert!(!chart.bridge().has_frame_hook());
    assert_eq!(timeline.subscriber_count(), 0);
    let uploads_after_failure = chart.texture().upload_count;
    timeline.advance(16.0).expect("frame");
    assert_eq!(chart.texture().upload_count, uploads_after_failure);

    chart
        .update(|_handle: &mut HeadlessChart| Ok(()), 1_000.0)
        .expect("replace callback");
    chart.start(&timeline).expect("retry");
    assert_eq!(chart.state(), BridgeState::Active);
    assert!(chart.bridge().has_frame_hook());
    assert_eq!(chart.engine().init_count(), 2);

    let uploads_after_start = chart.texture().upload_count;
    timeline.advance(16.0).expect("frame");
    assert_eq!(chart.texture().upload_count, uploads_after_start + 1);
}

#[test]
fn set_option_before_start_merges_into_initial_option() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(json!({
        "animation": false,
        "series": [{ "data": [1, 2] }]
    })));
    chart
        .set_option(json!({ "title": "load" }), SetOptionOpts::default())
        .expect("merge");
    assert_eq!(chart.config().option["title"], "load");
    assert_eq!(chart.config().option["animation"], false);

    chart.start(&timeline).expect("start");
    let values = chart
        .bridge()
        .with_chart(|handle| handle.series_values(0))
        .expect("active");
    assert_eq!(values, vec![1.0, 2.0]);
}

#[test]
fn set_option_after_start_forwards_merged_opts() {
    let timeline = ManualTimeline::new();
    let mut chart = component(
        ChartComponentConfig::new(json!({ "animation": false, "series": [{ "data": [1] }] }))
            .with_option_opts(SetOptionOpts::default().lazy_update(true)),
    );
    chart.start(&timeline).expect("start");

    chart
        .set_option(
            json!({ "series": [{ "data": [9] }] }),
            SetOptionOpts::default().not_merge(true),
        )
        .expect("forward");

    assert_eq!(chart.config().option_opts.not_merge, Some(true));
    assert_eq!(chart.config().option_opts.lazy_update, Some(true));
    let (option, repaint) = chart
        .bridge()
        .with_chart(|handle| (handle.option().clone(), handle.needs_repaint()))
        .expect("active");
    assert_eq!(option, json!({ "series": [{ "data": [9] }] }));
    assert!(!repaint);
}

#[test]
fn destroy_stops_frames_and_is_idempotent() {
    let timeline = ManualTimeline::new();
    let mut chart = component(ChartComponentConfig::new(bar_option()));
    chart.start(&timeline).expect("start");

    chart.destroy();
    chart.destroy();
    assert_eq!(chart.state(), BridgeState::Disposed);
    assert_eq!(timeline.subscriber_count(), 0);

    timeline.run_frames(2, 16.0).expect("frames");
    assert_eq!(chart.texture().upload_count, 1);

    let err = chart
        .set_option(json!({}), SetOptionOpts::default())
        .expect_err("disposed");
    assert!(matches!(err, ChartError::InvalidLifecycle { .. }));
    assert!(chart.start(&timeline).is_err());
}

#[test]
fn engine_without_animation_fails_to_start() {
    let timeline = ManualTimeline::new();
    let mut chart: ChartComponent<HeadlessEngine, NullTextureSink> = ChartComponent::new(
        HeadlessEngine::without_animation(),
        NullTextureSink::default(),
        ChartComponentConfig::default(),
    )
    .expect("component");

    let err = chart.start(&timeline).expect_err("no driver");
    assert!(matches!(err, ChartError::MissingAnimationDriver));
    assert_eq!(chart.state(), BridgeState::Uninitialized);
    assert_eq!(chart.texture().upload_count, 0);
    assert_eq!(timeline.subscriber_count(), 0);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let result = ChartComponent::new(
        HeadlessEngine::new(),
        NullTextureSink::default(),
        ChartComponentConfig::default().with_size(0, 10),
    );
    assert!(matches!(
        result,
        Err(ChartError::InvalidViewport { width: 0, height: 10 })
    ));
}
