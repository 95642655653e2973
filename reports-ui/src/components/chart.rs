//! Chart Component
//!
//! Line chart drawn on an HTML5 Canvas. [`CanvasSurface`] plugs into
//! `ChartRenderer`, which destroys the old chart before each new one.

use trend_reports::{format_count, ChartSpec, ChartSurface, ReportError, ReportResult};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

const BACKGROUND: &str = "#1f2937"; // gray-800
const MUTED_TEXT: &str = "#9ca3af"; // gray-400
const TOOLTIP_BACKGROUND: &str = "rgba(0, 0, 0, 0.8)";

// Margins
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 40.0;

const Y_TICKS: usize = 5;
const MAX_X_LABELS: usize = 10;
const POINT_RADIUS: f64 = 3.0;

/// Plot area inside the canvas and the mapping from data to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
struct Plot {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    y_min: f64,
    y_max: f64,
    points: usize,
}

impl Plot {
    fn new(canvas_width: f64, canvas_height: f64, spec: &ChartSpec) -> Self {
        let (y_min, y_max) = spec.y_bounds();
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: (canvas_width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (canvas_height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
            y_min,
            y_max,
            points: spec.values.len(),
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Horizontal position of the point at `index`; a lone point is centred
    fn x(&self, index: usize) -> f64 {
        if self.points <= 1 {
            return self.left + self.width / 2.0;
        }
        self.left + (index as f64 / (self.points - 1) as f64) * self.width
    }

    /// Vertical position of `value` (inverted because canvas y grows downward)
    fn y(&self, value: f64) -> f64 {
        self.top + ((self.y_max - value) / (self.y_max - self.y_min)) * self.height
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Index of the point closest to `x` horizontally
    fn nearest(&self, x: f64) -> Option<usize> {
        match self.points {
            0 => None,
            1 => Some(0),
            n => {
                let step = self.width / (n - 1) as f64;
                let index = ((x - self.left) / step).round().max(0.0) as usize;
                Some(index.min(n - 1))
            }
        }
    }

    /// Every how many points an x label is drawn
    fn label_step(&self) -> usize {
        self.points.div_ceil(MAX_X_LABELS).max(1)
    }
}

/// A chart currently drawn on the canvas, with its hover listeners
pub struct CanvasChart {
    points: usize,
    on_move: Closure<dyn FnMut(MouseEvent)>,
    on_leave: Closure<dyn FnMut(MouseEvent)>,
}

impl CanvasChart {
    pub fn points(&self) -> usize {
        self.points
    }
}

/// The `reportChart` canvas as a chart surface
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> ReportResult<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| ReportError::Render("canvas has no 2d context".to_string()))?;

        Ok(Self { canvas, ctx })
    }

    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }
}

impl ChartSurface for CanvasSurface {
    type Handle = CanvasChart;

    fn create(&mut self, spec: &ChartSpec) -> ReportResult<CanvasChart> {
        let (width, height) = self.size();
        let plot = Plot::new(width, height, spec);
        draw_chart(&self.ctx, width, height, spec, &plot, None);

        let on_move = {
            let ctx = self.ctx.clone();
            let canvas = self.canvas.clone();
            let spec = spec.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                let (x, y) = pointer_position(&canvas, &event);
                let hover = if plot.contains(x, y) { plot.nearest(x) } else { None };
                draw_chart(&ctx, width, height, &spec, &plot, hover);
            })
        };

        let on_leave = {
            let ctx = self.ctx.clone();
            let spec = spec.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
                draw_chart(&ctx, width, height, &spec, &plot, None);
            })
        };

        let listeners: [(&str, &JsValue); 2] = [
            ("mousemove", on_move.as_ref()),
            ("mouseleave", on_leave.as_ref()),
        ];
        attach_all(&self.canvas, &listeners).map_err(ReportError::Render)?;

        Ok(CanvasChart {
            points: spec.values.len(),
            on_move,
            on_leave,
        })
    }

    fn destroy(&mut self, chart: CanvasChart) {
        self.canvas.remove_listener("mousemove", chart.on_move.as_ref());
        self.canvas.remove_listener("mouseleave", chart.on_leave.as_ref());

        let (width, height) = self.size();
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }
}

/// Something event listeners can be attached to
trait ListenerTarget<F: ?Sized> {
    fn add_listener(&self, event: &str, callback: &F) -> Result<(), String>;
    fn remove_listener(&self, event: &str, callback: &F);
}

impl ListenerTarget<JsValue> for HtmlCanvasElement {
    fn add_listener(&self, event: &str, callback: &JsValue) -> Result<(), String> {
        self.add_event_listener_with_callback(event, callback.unchecked_ref())
            .map_err(|e| format!("{:?}", e))
    }

    fn remove_listener(&self, event: &str, callback: &JsValue) {
        let _ = self.remove_event_listener_with_callback(event, callback.unchecked_ref());
    }
}

/// Attach every listener or none; on failure the ones already attached are
/// removed, since their closures are dropped with the error
fn attach_all<T, F>(target: &T, listeners: &[(&str, &F)]) -> Result<(), String>
where
    T: ListenerTarget<F>,
    F: ?Sized,
{
    for (attached, (event, callback)) in listeners.iter().enumerate() {
        if let Err(e) = target.add_listener(event, callback) {
            for (event, callback) in &listeners[..attached] {
                target.remove_listener(event, callback);
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Pointer position in canvas pixels, correcting for CSS scaling
fn pointer_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f64, f64) {
    let scale_x = match canvas.client_width() {
        0 => 1.0,
        w => canvas.width() as f64 / w as f64,
    };
    let scale_y = match canvas.client_height() {
        0 => 1.0,
        h => canvas.height() as f64 / h as f64,
    };
    (event.offset_x() as f64 * scale_x, event.offset_y() as f64 * scale_y)
}

/// Draw the whole chart, with a tooltip for `hover` if set
fn draw_chart(
    ctx: &CanvasRenderingContext2d,
    width: f64,
    height: f64,
    spec: &ChartSpec,
    plot: &Plot,
    hover: Option<usize>,
) {
    let style = &spec.style;

    // Clear canvas
    ctx.set_fill_style(&BACKGROUND.into());
    ctx.fill_rect(0.0, 0.0, width, height);

    if spec.values.is_empty() {
        ctx.set_fill_style(&"#6b7280".into());
        ctx.set_font("16px sans-serif");
        ctx.set_text_align("center");
        let _ = ctx.fill_text("No data for selected range", width / 2.0, height / 2.0);
        return;
    }

    // Horizontal grid lines and y-axis labels
    ctx.set_stroke_style(&style.grid_color.to_css().into());
    ctx.set_line_width(1.0);
    ctx.set_font("12px sans-serif");
    ctx.set_text_align("right");
    for i in 0..=Y_TICKS {
        let value = plot.y_min + (i as f64 / Y_TICKS as f64) * (plot.y_max - plot.y_min);
        let y = plot.y(value);
        ctx.begin_path();
        ctx.move_to(plot.left, y);
        ctx.line_to(plot.right(), y);
        ctx.stroke();

        ctx.set_fill_style(&MUTED_TEXT.into());
        let _ = ctx.fill_text(&format_count(value), plot.left - 8.0, y + 4.0);
    }

    // Vertical grid lines and x-axis labels
    ctx.set_text_align("center");
    for (i, label) in spec.labels.iter().enumerate().step_by(plot.label_step()) {
        let x = plot.x(i);
        ctx.begin_path();
        ctx.move_to(x, plot.top);
        ctx.line_to(x, plot.bottom());
        ctx.stroke();

        ctx.set_fill_style(&MUTED_TEXT.into());
        let _ = ctx.fill_text(label, x, height - 12.0);
    }

    // Area under the line
    if style.fill {
        ctx.set_fill_style(&style.fill_color.to_css().into());
        ctx.begin_path();
        ctx.move_to(plot.x(0), plot.y(plot.y_min));
        for (i, value) in spec.values.iter().enumerate() {
            ctx.line_to(plot.x(i), plot.y(*value));
        }
        ctx.line_to(plot.x(spec.values.len() - 1), plot.y(plot.y_min));
        ctx.close_path();
        ctx.fill();
    }

    // Line
    ctx.set_stroke_style(&style.border_color.to_css().into());
    ctx.set_line_width(style.border_width as f64);
    ctx.begin_path();
    for (i, value) in spec.values.iter().enumerate() {
        if i == 0 {
            ctx.move_to(plot.x(i), plot.y(*value));
        } else {
            ctx.line_to(plot.x(i), plot.y(*value));
        }
    }
    ctx.stroke();

    // Points
    ctx.set_fill_style(&style.fill_color.to_css().into());
    for (i, value) in spec.values.iter().enumerate() {
        let radius = if hover == Some(i) { POINT_RADIUS * 1.5 } else { POINT_RADIUS };
        ctx.begin_path();
        let _ = ctx.arc(plot.x(i), plot.y(*value), radius, 0.0, std::f64::consts::PI * 2.0);
        ctx.fill();
        ctx.stroke();
    }

    draw_legend(ctx, width, spec);

    if let Some(index) = hover {
        draw_tooltip(ctx, width, spec, plot, index);
    }
}

/// Series swatch and label centred above the plot
fn draw_legend(ctx: &CanvasRenderingContext2d, width: f64, spec: &ChartSpec) {
    let style = &spec.style;
    ctx.set_font("12px sans-serif");
    let text_width = ctx
        .measure_text(&style.series_label)
        .map(|m| m.width())
        .unwrap_or(40.0);

    let box_size = 12.0;
    let x = (width - box_size - 6.0 - text_width) / 2.0;
    let y = 12.0;

    ctx.set_fill_style(&style.fill_color.to_css().into());
    ctx.fill_rect(x, y, box_size, box_size);
    ctx.set_stroke_style(&style.border_color.to_css().into());
    ctx.set_line_width(style.border_width as f64);
    ctx.stroke_rect(x, y, box_size, box_size);

    ctx.set_fill_style(&style.legend_color.to_css().into());
    ctx.set_text_align("left");
    let _ = ctx.fill_text(&style.series_label, x + box_size + 6.0, y + 10.0);
}

/// Date label and `Count: n` in a box above the hovered point
fn draw_tooltip(
    ctx: &CanvasRenderingContext2d,
    width: f64,
    spec: &ChartSpec,
    plot: &Plot,
    index: usize,
) {
    let (Some(title), Some(body)) = (spec.labels.get(index), spec.tooltip(index)) else {
        return;
    };

    ctx.set_font("12px sans-serif");
    let text_width = [title.as_str(), body.as_str()]
        .iter()
        .filter_map(|text| ctx.measure_text(text).ok())
        .map(|m| m.width())
        .fold(0.0, f64::max);

    let padding = 6.0;
    let box_width = text_width + padding * 2.0;
    let box_height = 36.0;
    let x = (plot.x(index) - box_width / 2.0).clamp(0.0, (width - box_width).max(0.0));
    let y = (plot.y(spec.values[index]) - box_height - 8.0).max(0.0);

    ctx.set_fill_style(&TOOLTIP_BACKGROUND.into());
    ctx.fill_rect(x, y, box_width, box_height);

    ctx.set_fill_style(&"#ffffff".into());
    ctx.set_text_align("left");
    let _ = ctx.fill_text(title, x + padding, y + 14.0);
    let _ = ctx.fill_text(&body, x + padding, y + 30.0);
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use trend_reports::ChartRenderer;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas() -> HtmlCanvasElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
        canvas.set_width(400);
        canvas.set_height(200);
        canvas
    }

    #[wasm_bindgen_test]
    fn test_rerender_replaces_chart() {
        let surface = CanvasSurface::new(canvas()).unwrap();
        let mut renderer = ChartRenderer::new(surface);

        let chart = renderer
            .render(vec!["a".into(), "b".into()], vec![1.0, 2.0])
            .unwrap();
        assert_eq!(chart.points(), 2);

        let chart = renderer.render(vec!["c".into()], vec![3.0]).unwrap();
        assert_eq!(chart.points(), 1);
        assert_eq!(renderer.generation(), 2);

        renderer.teardown();
        assert!(!renderer.has_chart());
    }
}
