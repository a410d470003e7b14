use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::animation::{Animation, Clip, ClipId, Stage};
use crate::core::Theme;
use crate::error::{ChartError, ChartResult};
use crate::render::{Canvas, RectPrimitive};

use super::{ChartEngine, ChartHandle, SetOptionOpts, merge_option};

const DEFAULT_ANIMATION_DURATION_MS: f64 = 1_000.0;
const PLOT_PADDING_PX: f64 = 8.0;

/// Minimal in-process chart engine.
///
/// It understands just enough of a chart option to animate and paint bar
/// series: every `series[i].data` entry becomes a bar, and value changes are
/// tweened over `animationDuration` ms by clips on the chart's animation
/// driver.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    without_animation: bool,
    init_count: usize,
}

impl HeadlessEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces handles that expose no animation driver.
    #[must_use]
    pub fn without_animation() -> Self {
        Self {
            without_animation: true,
            init_count: 0,
        }
    }

    #[must_use]
    pub fn init_count(&self) -> usize {
        self.init_count
    }
}

impl ChartEngine for HeadlessEngine {
    type Handle = HeadlessChart;

    fn init(&mut self, surface: Canvas, theme: &Theme) -> ChartResult<HeadlessChart> {
        theme.validate()?;
        self.init_count += 1;

        let scene = Rc::new(RefCell::new(Scene::default()));
        let dirty = Rc::new(Cell::new(true));
        let animation = if self.without_animation {
            None
        } else {
            let mut animation = Animation::new().with_stage(Box::new(SceneStage {
                dirty: dirty.clone(),
            }));
            // Charts start their animation loop as soon as they exist.
            animation.start();
            Some(animation)
        };

        debug!(
            width = surface.width(),
            height = surface.height(),
            theme = theme.name(),
            animated = animation.is_some(),
            "headless chart initialized"
        );
        Ok(HeadlessChart {
            canvas: surface,
            theme: theme.clone(),
            option: Value::Null,
            scene,
            dirty,
            animation,
            tweens: Vec::new(),
            disposed: false,
            paint_count: 0,
        })
    }
}

#[derive(Debug, Default)]
struct Scene {
    series: Vec<Vec<f64>>,
}

impl Scene {
    fn ensure_series(&mut self, index: usize, len: usize) -> &mut Vec<f64> {
        if self.series.len() <= index {
            self.series.resize_with(index + 1, Vec::new);
        }
        let values = &mut self.series[index];
        values.resize(len, 0.0);
        values
    }
}

struct SceneStage {
    dirty: Rc<Cell<bool>>,
}

impl Stage for SceneStage {
    fn update(&mut self) {
        self.dirty.set(true);
    }
}

/// Tweens one series from its displayed values to new targets.
struct TweenClip {
    scene: Rc<RefCell<Scene>>,
    series: usize,
    from: Vec<f64>,
    to: Vec<f64>,
    elapsed: f64,
    duration: f64,
}

impl Clip for TweenClip {
    fn step(&mut self, _time: f64, delta: f64) -> bool {
        self.elapsed += delta;
        let progress = (self.elapsed / self.duration).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - progress).powi(3);

        let mut scene = self.scene.borrow_mut();
        let values = scene.ensure_series(self.series, self.to.len());
        let done = progress >= 1.0;
        for (index, value) in values.iter_mut().enumerate() {
            let from = self.from.get(index).copied().unwrap_or(0.0);
            *value = if done {
                self.to[index]
            } else {
                from + (self.to[index] - from) * eased
            };
        }
        done
    }
}

/// Chart instance created by [`HeadlessEngine`].
pub struct HeadlessChart {
    canvas: Canvas,
    theme: Theme,
    option: Value,
    scene: Rc<RefCell<Scene>>,
    dirty: Rc<Cell<bool>>,
    animation: Option<Animation>,
    /// In-flight tween per series index.
    tweens: Vec<Option<ClipId>>,
    disposed: bool,
    paint_count: usize,
}

impl HeadlessChart {
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Currently displayed values of series `index`.
    #[must_use]
    pub fn series_values(&self, index: usize) -> Vec<f64> {
        self.scene
            .borrow()
            .series
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn paint_count(&self) -> usize {
        self.paint_count
    }

    #[must_use]
    pub fn needs_repaint(&self) -> bool {
        self.dirty.get()
    }

    fn sync_scene(&mut self, opts: SetOptionOpts) {
        let animated = self.option.get("animation").and_then(Value::as_bool) != Some(false);
        let duration = self
            .option
            .get("animationDuration")
            .and_then(Value::as_f64)
            .filter(|duration| duration.is_finite() && *duration > 0.0)
            .unwrap_or(DEFAULT_ANIMATION_DURATION_MS);

        let targets = series_targets(&self.option);
        for series in targets.len()..self.tweens.len() {
            self.cancel_tween(series);
        }
        self.tweens.resize(targets.len(), None);
        {
            let mut scene = self.scene.borrow_mut();
            scene.series.truncate(targets.len());
        }

        for (series, to) in targets.into_iter().enumerate() {
            // A retarget starts from the displayed values.
            self.cancel_tween(series);
            let from = {
                let mut scene = self.scene.borrow_mut();
                scene.ensure_series(series, to.len()).clone()
            };
            if from == to {
                continue;
            }
            match self.animation.as_mut() {
                Some(animation) if animated => {
                    self.tweens[series] = Some(animation.add_clip(Box::new(TweenClip {
                        scene: self.scene.clone(),
                        series,
                        from,
                        to,
                        elapsed: 0.0,
                        duration,
                    })));
                }
                _ => {
                    self.scene.borrow_mut().series[series] = to;
                }
            }
        }

        if !opts.is_lazy() {
            self.dirty.set(true);
        }
    }

    fn cancel_tween(&mut self, series: usize) {
        let Some(id) = self.tweens.get_mut(series).and_then(Option::take) else {
            return;
        };
        if let Some(animation) = self.animation.as_mut() {
            animation.remove_clip(id);
        }
    }

    fn paint(&mut self) -> ChartResult<()> {
        self.canvas.fill(self.theme.background())?;

        let scene = self.scene.borrow();
        let slots: usize = scene.series.iter().map(Vec::len).max().unwrap_or(0);
        let series_count = scene.series.len();
        if slots > 0 && series_count > 0 {
            let peak = scene
                .series
                .iter()
                .flatten()
                .fold(0.0_f64, |peak, value| peak.max(value.abs()))
                .max(f64::EPSILON);

            let width = f64::from(self.canvas.width()) - PLOT_PADDING_PX * 2.0;
            let height = f64::from(self.canvas.height()) - PLOT_PADDING_PX * 2.0;
            let slot_width = width.max(0.0) / slots as f64;
            let bar_width = slot_width / series_count as f64;
            let baseline = PLOT_PADDING_PX + height.max(0.0);

            for (series_index, values) in scene.series.iter().enumerate() {
                let color = self.theme.series_color(series_index);
                for (slot, value) in values.iter().enumerate() {
                    let bar_height = (value.max(0.0) / peak) * height.max(0.0);
                    let x = PLOT_PADDING_PX + slot as f64 * slot_width
                        + series_index as f64 * bar_width;
                    self.canvas.fill_rect(RectPrimitive::new(
                        x,
                        baseline - bar_height,
                        bar_width,
                        bar_height,
                        color,
                    ))?;
                }
            }
        }

        self.paint_count += 1;
        self.dirty.set(false);
        Ok(())
    }

    fn ensure_live(&self) -> ChartResult<()> {
        if self.disposed {
            return Err(ChartError::InvalidData(
                "chart handle is disposed".to_owned(),
            ));
        }
        Ok(())
    }
}

impl ChartHandle for HeadlessChart {
    fn set_option(&mut self, option: &Value, opts: &SetOptionOpts) -> ChartResult<()> {
        self.ensure_live()?;
        if opts.replaces() || !self.option.is_object() {
            self.option = option.clone();
        } else {
            merge_option(&mut self.option, option);
        }
        self.sync_scene(*opts);
        Ok(())
    }

    fn option(&self) -> &Value {
        &self.option
    }

    fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    fn animation_mut(&mut self) -> Option<&mut Animation> {
        self.animation.as_mut()
    }

    fn surface(&mut self) -> ChartResult<&Canvas> {
        self.ensure_live()?;
        if self.dirty.get() {
            self.paint()?;
        }
        Ok(&self.canvas)
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(animation) = self.animation.as_mut() {
            animation.dispose();
        }
        self.scene.borrow_mut().series.clear();
        self.tweens.clear();
        self.disposed = true;
        debug!(paints = self.paint_count, "headless chart disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl std::fmt::Debug for HeadlessChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessChart")
            .field("viewport", &self.canvas.viewport())
            .field("theme", &self.theme)
            .field("animation", &self.animation)
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Numeric targets of every series; `{ "value": n }` entries are accepted and
/// anything non-numeric counts as zero.
fn series_targets(option: &Value) -> Vec<Vec<f64>> {
    let Some(series) = option.get("series").and_then(Value::as_array) else {
        return Vec::new();
    };
    series
        .iter()
        .map(|entry| {
            entry
                .get("data")
                .and_then(Value::as_array)
                .map(|data| {
                    data.iter()
                        .map(|point| {
                            point
                                .as_f64()
                                .or_else(|| point.get("value").and_then(Value::as_f64))
                                .unwrap_or(0.0)
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect()
}
