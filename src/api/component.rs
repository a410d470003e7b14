use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::bridge::{BridgeState, FrameBridge, UpdateInterval};
use crate::engine::{ChartEngine, ChartHandle, SetOptionOpts, merge_option};
use crate::error::{ChartError, ChartResult};
use crate::host::HostTimeline;
use crate::render::{Canvas, TextureSink};

use super::ChartComponentConfig;

/// Chart exposed to a scene as a texture that advances with the host timeline.
///
/// The component owns the engine, the texture sink and one [`FrameBridge`].
/// After `start`, every host frame advances the chart's animation, fires the
/// update callback when due, and re-uploads the painted canvas.
pub struct ChartComponent<E: ChartEngine, S> {
    engine: E,
    config: ChartComponentConfig,
    texture: Rc<RefCell<S>>,
    bridge: FrameBridge<E::Handle>,
}

impl<E, S> ChartComponent<E, S>
where
    E: ChartEngine,
    E::Handle: 'static,
    S: TextureSink + 'static,
{
    pub fn new(engine: E, texture: S, config: ChartComponentConfig) -> ChartResult<Self> {
        config.validate()?;
        let bridge = FrameBridge::new();
        bridge.set_invoke_immediately(config.update_now);
        Ok(Self {
            engine,
            config,
            texture: Rc::new(RefCell::new(texture)),
            bridge,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ChartComponentConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> BridgeState {
        self.bridge.state()
    }

    #[must_use]
    pub fn bridge(&self) -> &FrameBridge<E::Handle> {
        &self.bridge
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn texture(&self) -> Ref<'_, S> {
        self.texture.borrow()
    }

    /// Merges `opts` over the stored option opts and forwards `option` to
    /// the chart. Before `start` the option is folded into the configured
    /// initial option instead.
    pub fn set_option(&mut self, option: Value, opts: SetOptionOpts) -> ChartResult<()> {
        let merged = opts.merged_over(self.config.option_opts);
        match self.bridge.state() {
            BridgeState::Uninitialized => {
                if merged.replaces() || !self.config.option.is_object() {
                    self.config.option = option;
                } else {
                    merge_option(&mut self.config.option, &option);
                }
            }
            BridgeState::Active => {
                self.bridge
                    .with_chart(|chart| chart.set_option(&option, &merged))
                    .ok_or(ChartError::InvalidLifecycle {
                        operation: "set_option",
                        state: BridgeState::Active,
                    })??;
            }
            state @ BridgeState::Disposed => {
                return Err(ChartError::InvalidLifecycle {
                    operation: "set_option",
                    state,
                });
            }
        }
        self.config.option_opts = merged;
        Ok(())
    }

    /// Registers the periodic update callback. `interval` is unitless: values
    /// below 50 are seconds, anything else milliseconds.
    pub fn update(
        &mut self,
        callback: impl FnMut(&mut E::Handle) -> ChartResult<()> + 'static,
        interval: f64,
    ) -> ChartResult<()> {
        self.update_every(callback, UpdateInterval::from_legacy(interval))
    }

    /// Registers the periodic update callback with an explicit unit.
    pub fn update_every(
        &mut self,
        callback: impl FnMut(&mut E::Handle) -> ChartResult<()> + 'static,
        interval: UpdateInterval,
    ) -> ChartResult<()> {
        self.bridge.register_callback(callback, interval)
    }

    /// Runs the update callback once during `start`, before the first frame.
    pub fn update_now(&mut self) {
        self.config.update_now = true;
        self.bridge.set_invoke_immediately(true);
    }

    /// Creates the chart on a fresh canvas, applies the configured option,
    /// uploads the first frame and subscribes to `timeline`.
    pub fn start(&mut self, timeline: &dyn HostTimeline) -> ChartResult<()> {
        self.config.validate()?;
        let surface = Canvas::new(self.config.viewport())?;
        let theme = self.config.theme();

        let option = self.config.option.clone();
        let opts = self.config.option_opts;
        let texture = self.texture.clone();
        self.bridge.start_with(
            &mut self.engine,
            surface,
            &theme,
            timeline,
            move |chart: &mut E::Handle| {
                if !option.is_null() {
                    chart.set_option(&option, &opts)?;
                }
                texture.borrow_mut().upload(chart.surface()?)
            },
        )?;
        if self.bridge.state() == BridgeState::Active {
            let texture = self.texture.clone();
            self.bridge.set_frame_hook(move |chart: &mut E::Handle| {
                texture.borrow_mut().upload(chart.surface()?)
            })?;
        }
        debug!(
            width = self.config.width,
            height = self.config.height,
            theme = %self.config.theme,
            "chart component started"
        );
        Ok(())
    }

    /// Stops frame delivery and disposes the chart. Safe to call at any time.
    pub fn destroy(&mut self) {
        self.bridge.stop();
    }
}
