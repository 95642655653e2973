//! Chart ownership
//!
//! [`ChartRenderer`] owns at most one live chart on a [`ChartSurface`] and
//! always destroys the previous chart before creating the next one. Drawing
//! itself is left to the surface: SVG files natively, a canvas in the browser.

use super::error::{ReportError, ReportResult};
use super::types::TrendsResponse;

/// RGBA colour as the browser page writes it (`rgba(r, g, b, a)`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba()` notation
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Visual configuration of the trends chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Legend text for the single series
    pub series_label: String,
    pub border_color: Rgba,
    pub fill_color: Rgba,
    pub border_width: u32,
    /// Fill the area under the line
    pub fill: bool,
    pub grid_color: Rgba,
    pub legend_color: Rgba,
    /// Y axis starts at zero regardless of the data
    pub begin_at_zero: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            series_label: "Count".to_string(),
            border_color: Rgba::new(75, 192, 192, 1.0),
            fill_color: Rgba::new(75, 192, 192, 0.2),
            border_width: 1,
            fill: true,
            grid_color: Rgba::WHITE,
            legend_color: Rgba::WHITE,
            begin_at_zero: true,
        }
    }
}

/// Everything a surface needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub style: ChartStyle,
}

impl ChartSpec {
    /// Build a line chart spec with the default style
    pub fn line(labels: Vec<String>, values: Vec<f64>) -> ReportResult<Self> {
        if labels.len() != values.len() {
            return Err(ReportError::LengthMismatch {
                labels: labels.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            labels,
            values,
            style: ChartStyle::default(),
        })
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// Tooltip text for the point at `index`
    pub fn tooltip(&self, index: usize) -> Option<String> {
        self.values
            .get(index)
            .map(|value| tooltip_label(&self.style.series_label, *value))
    }

    /// Y axis bounds; starts at zero when `begin_at_zero` is set
    pub fn y_bounds(&self) -> (f64, f64) {
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);

        if !max.is_finite() || !min.is_finite() {
            return (0.0, 1.0);
        }

        let low = if self.style.begin_at_zero { min.min(0.0) } else { min };
        let high = if max > low { max } else { low + 1.0 };
        (low, high)
    }
}

impl From<TrendsResponse> for ChartSpec {
    fn from(response: TrendsResponse) -> Self {
        let (labels, values) = response.into_parts();
        Self {
            labels,
            values,
            style: ChartStyle::default(),
        }
    }
}

/// Format a count the way a JavaScript number prints: `2`, not `2.0`
pub fn format_count(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Tooltip line for one data point, e.g. `Count: 42`
pub fn tooltip_label(series_label: &str, value: f64) -> String {
    format!("{}: {}", series_label, format_count(value))
}

/// A drawing target that can create and destroy charts
pub trait ChartSurface {
    /// Handle to a chart living on this surface
    type Handle;

    /// Draw a new chart
    fn create(&mut self, spec: &ChartSpec) -> ReportResult<Self::Handle>;

    /// Release a chart and everything it holds on the surface
    fn destroy(&mut self, handle: Self::Handle);
}

/// Owns the single chart instance shown on a surface
pub struct ChartRenderer<S: ChartSurface> {
    surface: S,
    current: Option<S::Handle>,
    generation: u64,
}

impl<S: ChartSurface> ChartRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            current: None,
            generation: 0,
        }
    }

    /// Replace the current chart with one built from `labels` and `values`
    pub fn render(&mut self, labels: Vec<String>, values: Vec<f64>) -> ReportResult<&S::Handle> {
        let spec = ChartSpec::line(labels, values)?;
        self.render_spec(&spec)
    }

    /// Replace the current chart with one built from `spec`
    ///
    /// The previous chart is destroyed before the new one is created. If
    /// creation fails the renderer is left without a chart.
    pub fn render_spec(&mut self, spec: &ChartSpec) -> ReportResult<&S::Handle> {
        if let Some(previous) = self.current.take() {
            tracing::debug!(generation = self.generation, "Destroying previous chart");
            self.surface.destroy(previous);
        }

        let handle = self.surface.create(spec)?;
        self.generation += 1;

        tracing::debug!(
            generation = self.generation,
            points = spec.values.len(),
            "Chart created"
        );

        Ok(&*self.current.insert(handle))
    }

    /// Destroy the current chart, if any
    pub fn teardown(&mut self) {
        if let Some(handle) = self.current.take() {
            tracing::debug!(generation = self.generation, "Tearing down chart");
            self.surface.destroy(handle);
        }
    }

    /// Give up ownership of the current chart without destroying it
    pub fn detach(&mut self) -> Option<S::Handle> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&S::Handle> {
        self.current.as_ref()
    }

    pub fn has_chart(&self) -> bool {
        self.current.is_some()
    }

    /// Number of charts created so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: ChartSurface> Drop for ChartRenderer<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Surface call as seen by [`RecordingSurface`]
    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceEvent {
        Create { id: u64, labels: Vec<String>, values: Vec<f64> },
        Destroy { id: u64 },
    }

    /// Surface that records every call and tracks live charts
    #[derive(Clone, Default)]
    pub struct RecordingSurface {
        pub events: Arc<Mutex<Vec<SurfaceEvent>>>,
        pub live: Arc<Mutex<Vec<u64>>>,
        pub max_live: Arc<Mutex<usize>>,
        pub fail_next_create: bool,
        next_id: u64,
    }

    impl RecordingSurface {
        pub fn events(&self) -> Vec<SurfaceEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn live_count(&self) -> usize {
            self.live.lock().unwrap().len()
        }

        pub fn max_live(&self) -> usize {
            *self.max_live.lock().unwrap()
        }

        pub fn destroy_count(&self) -> usize {
            self.events()
                .iter()
                .filter(|e| matches!(e, SurfaceEvent::Destroy { .. }))
                .count()
        }
    }

    impl ChartSurface for RecordingSurface {
        type Handle = u64;

        fn create(&mut self, spec: &ChartSpec) -> ReportResult<u64> {
            if self.fail_next_create {
                self.fail_next_create = false;
                return Err(ReportError::Render("surface unavailable".to_string()));
            }

            self.next_id += 1;
            let id = self.next_id;

            self.events.lock().unwrap().push(SurfaceEvent::Create {
                id,
                labels: spec.labels.clone(),
                values: spec.values.clone(),
            });

            let mut live = self.live.lock().unwrap();
            live.push(id);
            let mut max_live = self.max_live.lock().unwrap();
            *max_live = (*max_live).max(live.len());

            Ok(id)
        }

        fn destroy(&mut self, handle: u64) {
            self.events
                .lock()
                .unwrap()
                .push(SurfaceEvent::Destroy { id: handle });
            self.live.lock().unwrap().retain(|id| *id != handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingSurface, SurfaceEvent};
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_render_creates_without_destroy() {
        let surface = RecordingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());

        let handle = *renderer.render(labels(&["a", "b"]), vec![1.0, 2.0]).unwrap();

        assert_eq!(
            surface.events(),
            vec![SurfaceEvent::Create {
                id: handle,
                labels: labels(&["a", "b"]),
                values: vec![1.0, 2.0],
            }]
        );
        assert!(renderer.has_chart());
    }

    #[test]
    fn test_rerender_destroys_previous_once_before_create() {
        let surface = RecordingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());

        let first = *renderer.render(labels(&["x"]), vec![5.0]).unwrap();
        let second = *renderer.render(labels(&["a", "b"]), vec![1.0, 2.0]).unwrap();

        let events = surface.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], SurfaceEvent::Destroy { id: first });
        assert_eq!(
            events[2],
            SurfaceEvent::Create {
                id: second,
                labels: labels(&["a", "b"]),
                values: vec![1.0, 2.0],
            }
        );
        assert_eq!(surface.destroy_count(), 1);
        assert_eq!(renderer.current(), Some(&second));
    }

    #[test]
    fn test_never_more_than_one_live_chart() {
        let surface = RecordingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());

        for i in 0..5 {
            renderer.render(labels(&["a"]), vec![i as f64]).unwrap();
            assert_eq!(surface.live_count(), 1);
        }

        assert_eq!(surface.max_live(), 1);
        assert_eq!(surface.destroy_count(), 4);
        assert_eq!(renderer.generation(), 5);
    }

    #[test]
    fn test_teardown_and_drop_destroy_chart() {
        let surface = RecordingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());
        renderer.render(labels(&["a"]), vec![1.0]).unwrap();

        renderer.teardown();
        assert!(!renderer.has_chart());
        assert_eq!(surface.live_count(), 0);

        // Teardown with no chart is a no-op
        renderer.teardown();
        assert_eq!(surface.destroy_count(), 1);

        renderer.render(labels(&["b"]), vec![2.0]).unwrap();
        drop(renderer);
        assert_eq!(surface.live_count(), 0);
        assert_eq!(surface.destroy_count(), 2);
    }

    #[test]
    fn test_detach_keeps_chart_alive() {
        let surface = RecordingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());
        renderer.render(labels(&["a"]), vec![1.0]).unwrap();

        assert_eq!(renderer.detach(), Some(1));
        drop(renderer);

        assert_eq!(surface.destroy_count(), 0);
        assert_eq!(surface.live_count(), 1);
    }

    #[test]
    fn test_failed_create_leaves_no_chart() {
        let surface = RecordingSurface::default();
        let probe = surface.clone();
        let mut renderer = ChartRenderer::new(surface);

        renderer.render(labels(&["a"]), vec![1.0]).unwrap();
        renderer.surface_mut().fail_next_create = true;

        assert!(matches!(
            renderer.render(labels(&["b"]), vec![2.0]),
            Err(ReportError::Render(_))
        ));
        assert!(!renderer.has_chart());
        assert_eq!(probe.live_count(), 0);
    }

    #[test]
    fn test_mismatched_input_keeps_current_chart() {
        let surface = RecordingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());
        renderer.render(labels(&["a"]), vec![1.0]).unwrap();

        assert!(matches!(
            renderer.render(labels(&["a", "b"]), vec![1.0]),
            Err(ReportError::LengthMismatch { .. })
        ));
        assert!(renderer.has_chart());
        assert_eq!(surface.destroy_count(), 0);
    }

    #[test]
    fn test_default_style() {
        let style = ChartStyle::default();
        assert_eq!(style.series_label, "Count");
        assert_eq!(style.border_color.to_css(), "rgba(75, 192, 192, 1)");
        assert_eq!(style.fill_color.to_css(), "rgba(75, 192, 192, 0.2)");
        assert_eq!(style.grid_color, Rgba::WHITE);
        assert!(style.fill);
        assert!(style.begin_at_zero);
    }

    #[test]
    fn test_tooltip_label() {
        let spec = ChartSpec::line(labels(&["a", "b"]), vec![1.0, 2.5]).unwrap();
        assert_eq!(spec.tooltip(0).as_deref(), Some("Count: 1"));
        assert_eq!(spec.tooltip(1).as_deref(), Some("Count: 2.5"));
        assert_eq!(spec.tooltip(2), None);
    }

    #[test]
    fn test_y_bounds_start_at_zero() {
        let spec = ChartSpec::line(labels(&["a", "b"]), vec![10.0, 40.0]).unwrap();
        assert_eq!(spec.y_bounds(), (0.0, 40.0));

        let flat = ChartSpec::line(labels(&["a"]), vec![0.0]).unwrap();
        assert_eq!(flat.y_bounds(), (0.0, 1.0));

        let empty = ChartSpec::line(Vec::new(), Vec::new()).unwrap();
        assert_eq!(empty.y_bounds(), (0.0, 1.0));
    }
}
