//! SVG chart surface
//!
//! Renders the trends chart to an SVG file with plotters. Destroying a chart
//! removes its file, so the output path only ever holds the live chart.

use plotters::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::chart::{format_count, tooltip_label, ChartSpec, ChartSurface, Rgba};
use super::error::{ReportError, ReportResult};

/// Canvas background (gray-800), dark enough for white grid lines
const BACKGROUND: RGBColor = RGBColor(31, 41, 55);

/// Secondary text colour (gray-400)
const MUTED_TEXT: RGBColor = RGBColor(156, 163, 175);

/// Radius of the hover target around each point
const TOOLTIP_RADIUS: u32 = 6;

/// A chart written to disk by [`SvgSurface`]
#[derive(Debug, Clone, PartialEq)]
pub struct SvgChart {
    path: PathBuf,
    points: usize,
}

impl SvgChart {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data points drawn
    pub fn points(&self) -> usize {
        self.points
    }
}

/// Writes charts as SVG files
#[derive(Debug, Clone)]
pub struct SvgSurface {
    output: PathBuf,
    width: u32,
    height: u32,
}

impl SvgSurface {
    pub fn new(output: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output: output.into(),
            width,
            height,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Render `spec` into an SVG document
    pub fn render_to_string(&self, spec: &ChartSpec) -> ReportResult<String> {
        let mut svg = String::new();
        let mut hover_points: Vec<(i32, i32, String)> = Vec::new();

        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            root.fill(&BACKGROUND).map_err(render_error)?;

            if spec.values.is_empty() {
                let style = ("sans-serif", 16).into_font().color(&MUTED_TEXT);
                let center = (self.width as i32 / 2 - 80, self.height as i32 / 2);
                root.draw(&Text::new("No data for selected range", center, style))
                    .map_err(render_error)?;
                root.present().map_err(render_error)?;
            } else {
                let style = &spec.style;
                let (y_min, y_max) = spec.y_bounds();
                let headroom = (y_max - y_min) * 0.05;
                let x_max = spec.labels.len().saturating_sub(1).max(1);

                let grid = plot_color(style.grid_color);
                let legend = plot_color(style.legend_color);
                let border = plot_color(style.border_color);
                let fill = plot_color(style.fill_color);

                let mut chart = ChartBuilder::on(&root)
                    .margin(20)
                    .x_label_area_size(60)
                    .y_label_area_size(60)
                    .build_cartesian_2d(0usize..x_max, y_min..y_max + headroom)
                    .map_err(render_error)?;

                chart
                    .configure_mesh()
                    .x_labels(spec.labels.len().min(10))
                    .y_labels(10)
                    .light_line_style(ShapeStyle::from(&grid).stroke_width(1))
                    .bold_line_style(ShapeStyle::from(&grid).stroke_width(1))
                    .axis_style(ShapeStyle::from(&grid).stroke_width(1))
                    .label_style(("sans-serif", 12, &MUTED_TEXT))
                    .x_label_formatter(&|x| spec.labels.get(*x).cloned().unwrap_or_default())
                    .y_label_formatter(&|y| format_count(*y))
                    .draw()
                    .map_err(render_error)?;

                let data: Vec<(usize, f64)> = spec.values.iter().copied().enumerate().collect();
                let border_style = ShapeStyle::from(&border).stroke_width(style.border_width);

                let series = if style.fill {
                    chart
                        .draw_series(
                            AreaSeries::new(data.iter().copied(), y_min, fill)
                                .border_style(border_style),
                        )
                        .map_err(render_error)?
                } else {
                    chart
                        .draw_series(LineSeries::new(data.iter().copied(), border_style))
                        .map_err(render_error)?
                };

                series.label(style.series_label.as_str()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill.filled())
                });

                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperMiddle)
                    .label_font(("sans-serif", 14, &legend))
                    .background_style(&TRANSPARENT)
                    .border_style(&TRANSPARENT)
                    .draw()
                    .map_err(render_error)?;

                for (x, y) in &data {
                    let (px, py) = chart.backend_coord(&(*x, *y));
                    hover_points.push((px, py, tooltip_label(&style.series_label, *y)));
                }

                root.present().map_err(render_error)?;
            }
        }

        Ok(attach_tooltips(svg, &hover_points))
    }
}

impl ChartSurface for SvgSurface {
    type Handle = SvgChart;

    fn create(&mut self, spec: &ChartSpec) -> ReportResult<SvgChart> {
        let svg = self.render_to_string(spec)?;

        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.output, svg)?;

        tracing::info!("Chart written to {:?}", self.output);

        Ok(SvgChart {
            path: self.output.clone(),
            points: spec.values.len(),
        })
    }

    fn destroy(&mut self, handle: SvgChart) {
        match fs::remove_file(&handle.path) {
            Ok(()) => tracing::debug!("Removed chart {:?}", handle.path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove chart {:?}: {}", handle.path, e),
        }
    }
}

fn plot_color(color: Rgba) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, color.a)
}

fn render_error<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}

/// Add invisible hover targets carrying `<title>` tooltips before `</svg>`
fn attach_tooltips(mut svg: String, points: &[(i32, i32, String)]) -> String {
    if points.is_empty() {
        return svg;
    }

    let mut group = String::from("<g class=\"tooltips\">\n");
    for (x, y, text) in points {
        group.push_str(&format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"transparent\"><title>{}</title></circle>\n",
            x,
            y,
            TOOLTIP_RADIUS,
            escape_xml(text)
        ));
    }
    group.push_str("</g>\n");

    match svg.rfind("</svg>") {
        Some(pos) => svg.insert_str(pos, &group),
        None => svg.push_str(&group),
    }
    svg
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::chart::ChartRenderer;
    use tempfile::tempdir;

    fn spec(labels: &[&str], values: &[f64]) -> ChartSpec {
        ChartSpec::line(
            labels.iter().map(|s| s.to_string()).collect(),
            values.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn test_render_contains_tooltips_and_labels() {
        let surface = SvgSurface::new("unused.svg", 800, 400);
        let svg = surface
            .render_to_string(&spec(&["2024-01-01", "2024-01-02"], &[1.0, 2.0]))
            .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<title>Count: 1</title>"));
        assert!(svg.contains("<title>Count: 2</title>"));
        assert!(svg.contains("2024-01-01"));
        assert!(svg.contains("Count"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_empty_data() {
        let surface = SvgSurface::new("unused.svg", 800, 400);
        let svg = surface.render_to_string(&spec(&[], &[])).unwrap();

        assert!(svg.contains("No data for selected range"));
        assert!(!svg.contains("<title>"));
    }

    #[test]
    fn test_create_and_destroy_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("chart.svg");
        let mut surface = SvgSurface::new(&path, 640, 320);

        let chart = surface.create(&spec(&["a", "b", "c"], &[3.0, 0.0, 7.0])).unwrap();
        assert_eq!(chart.path(), path.as_path());
        assert_eq!(chart.points(), 3);
        assert!(path.exists());

        surface.destroy(chart.clone());
        assert!(!path.exists());

        // Destroying twice is harmless
        surface.destroy(chart);
    }

    #[test]
    fn test_renderer_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let mut renderer = ChartRenderer::new(SvgSurface::new(&path, 640, 320));

        renderer
            .render(vec!["a".to_string()], vec![1.0])
            .unwrap();
        renderer
            .render(vec!["b".to_string(), "c".to_string()], vec![4.0, 5.0])
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Count: 5"));
        assert!(!content.contains("Count: 1<"));

        renderer.teardown();
        assert!(!path.exists());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\">"), "a&lt;b &amp; &quot;c&quot;&gt;");
    }
}
