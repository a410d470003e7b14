//! Drives a headless chart from a manual timeline for two seconds of host
//! time, pushing a new data point twice per second.

use chart_clock::api::{ChartComponent, ChartComponentConfig};
use chart_clock::engine::{ChartHandle, HeadlessChart, HeadlessEngine, SetOptionOpts};
use chart_clock::host::ManualTimeline;
use chart_clock::render::NullTextureSink;
use chart_clock::telemetry::init_default_tracing;
use chart_clock::ChartResult;
use serde_json::json;

fn main() -> ChartResult<()> {
    let _ = init_default_tracing();

    let config = ChartComponentConfig::new(json!({
        "animationDuration": 300,
        "series": [{ "data": [12, 18, 9] }]
    }))
    .with_theme("dark")
    .with_size(320, 180);

    let mut component = ChartComponent::new(HeadlessEngine::new(), NullTextureSink::default(), config)?;
    let mut step = 0.0_f64;
    component.update(
        move |chart: &mut HeadlessChart| {
            step += 1.0;
            chart.set_option(
                &json!({ "series": [{ "data": [12.0 + step, 18.0 - step, 9.0 + step * 2.0] }] }),
                &SetOptionOpts::default(),
            )
        },
        0.5,
    )?;
    component.update_now();

    let timeline = ManualTimeline::new();
    component.start(&timeline)?;
    timeline.run_frames(120, 1_000.0 / 60.0)?;

    let values = component
        .bridge()
        .with_chart(|chart| chart.series_values(0))
        .unwrap_or_default();
    let snapshot = component.bridge().snapshot();
    println!(
        "frames={} callbacks={} uploads={} values={values:?}",
        snapshot.ticks_seen,
        snapshot.callbacks_fired,
        component.texture().upload_count
    );

    component.destroy();
    Ok(())
}
