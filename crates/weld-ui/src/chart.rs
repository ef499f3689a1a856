//! SVG trend chart of per-weld peak forces.
//!
//! The x axis is the weld number (chronological rank among processed files,
//! starting at 1), the y axis is force in newtons over a fixed range. Samples
//! outside the range are clipped, matching a fixed-limit plot.

use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;
use weld_core::error::Result;
use weld_core::formatting::format_number;
use weld_core::models::BatchResult;
use weld_core::settings::ChartOptions;

const SHOULDER_COLOR: &str = "#1f77b4"; // tab:blue
const PROBE_COLOR: &str = "#d62728"; // tab:red
const GRID_OPACITY: f64 = 0.4;
const Y_TICKS: usize = 5;

/// Canvas geometry for the chart.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    /// Spacing of x-axis ticks in welds for large batches.
    pub x_tick_step: usize,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 500.0,
            margin_left: 100.0,
            margin_right: 40.0,
            margin_top: 60.0,
            margin_bottom: 80.0,
            x_tick_step: 48,
        }
    }
}

impl ChartLayout {
    fn plot_left(&self) -> f64 {
        self.margin_left
    }

    fn plot_right(&self) -> f64 {
        self.width - self.margin_right
    }

    fn plot_top(&self) -> f64 {
        self.margin_top
    }

    fn plot_bottom(&self) -> f64 {
        self.height - self.margin_bottom
    }

    /// Tick spacing for a batch of `n` welds: the configured step once the
    /// batch spans at least two steps, else roughly ten ticks.
    fn tick_step(&self, n: usize) -> usize {
        if n >= 2 * self.x_tick_step {
            self.x_tick_step.max(1)
        } else {
            (n / 10).max(1)
        }
    }
}

// ── SvgChart ──────────────────────────────────────────────────────────────────

/// Renders a [`BatchResult`] as a two-series line chart.
#[derive(Debug, Clone, Default)]
pub struct SvgChart {
    pub layout: ChartLayout,
}

impl SvgChart {
    pub fn new(layout: ChartLayout) -> Self {
        Self { layout }
    }

    /// Render the chart to an SVG document.
    pub fn render(&self, result: &BatchResult, options: &ChartOptions) -> String {
        let l = &self.layout;
        let n = result.len();
        let x_hi = (n.max(1) + 1) as f64;
        let map_x = |x: f64| l.plot_left() + x / x_hi * (l.plot_right() - l.plot_left());
        let map_y = |y: f64| {
            l.plot_bottom()
                - (y - options.y_min) / (options.y_max - options.y_min)
                    * (l.plot_bottom() - l.plot_top())
        };
        let label = options.mode.label();

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"##,
            w = l.width,
            h = l.height
        );
        let _ = writeln!(svg, r##"<rect width="100%" height="100%" fill="white"/>"##);
        let _ = writeln!(
            svg,
            r##"<defs><clipPath id="plot"><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}"/></clipPath></defs>"##,
            l.plot_left(),
            l.plot_top(),
            l.plot_right() - l.plot_left(),
            l.plot_bottom() - l.plot_top()
        );

        // Grid and y-axis ticks.
        for i in 0..=Y_TICKS {
            let value = options.y_min + (options.y_max - options.y_min) * i as f64 / Y_TICKS as f64;
            let y = map_y(value);
            let _ = writeln!(
                svg,
                r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#b0b0b0" stroke-opacity="{GRID_OPACITY}"/>"##,
                l.plot_left(),
                l.plot_right()
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="end">{}</text>"##,
                l.plot_left() - 8.0,
                y + 4.0,
                format_number(value, 0)
            );
        }

        // Grid and x-axis ticks.
        let step = l.tick_step(n);
        let mut tick = 0usize;
        while (tick as f64) <= x_hi {
            let x = map_x(tick as f64);
            let _ = writeln!(
                svg,
                r##"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="#b0b0b0" stroke-opacity="{GRID_OPACITY}"/>"##,
                l.plot_top(),
                l.plot_bottom()
            );
            let ty = l.plot_bottom() + 16.0;
            let _ = writeln!(
                svg,
                r##"<text x="{x:.1}" y="{ty:.1}" font-size="11" text-anchor="end" transform="rotate(-45 {x:.1} {ty:.1})">{tick}</text>"##
            );
            tick += step;
        }

        // Plot frame.
        let _ = writeln!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"##,
            l.plot_left(),
            l.plot_top(),
            l.plot_right() - l.plot_left(),
            l.plot_bottom() - l.plot_top()
        );

        // Series.
        let series = [
            (format!("{label} Shoulder Force"), SHOULDER_COLOR, result.shoulder_peaks()),
            (format!("{label} Probe Force"), PROBE_COLOR, result.probe_peaks()),
        ];
        let _ = writeln!(svg, r##"<g clip-path="url(#plot)">"##);
        for (_, color, values) in &series {
            let points: Vec<Option<(f64, f64)>> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| v.is_finite().then(|| (map_x((i + 1) as f64), map_y(v))))
                .collect();
            let d = path_data(&points);
            if !d.is_empty() {
                let _ = writeln!(
                    svg,
                    r##"<path d="{d}" fill="none" stroke="{color}" stroke-width="1"/>"##
                );
            }
            for (x, y) in points.iter().flatten() {
                let _ = writeln!(
                    svg,
                    r##"<circle cx="{x:.1}" cy="{y:.1}" r="1.5" fill="{color}"/>"##
                );
            }
        }
        let _ = writeln!(svg, "</g>");

        // Legend, top right inside the plot.
        let lx = l.plot_right() - 230.0;
        let ly = l.plot_top() + 12.0;
        let _ = writeln!(
            svg,
            r##"<rect x="{lx:.1}" y="{ly:.1}" width="218" height="54" fill="white" stroke="#cccccc"/>"##
        );
        for (i, (name, color, _)) in series.iter().enumerate() {
            let y = ly + 18.0 + 20.0 * i as f64;
            let _ = writeln!(
                svg,
                r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{color}" stroke-width="2"/>"##,
                lx + 10.0,
                lx + 40.0
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" font-size="13">{}</text>"##,
                lx + 48.0,
                y + 4.0,
                escape_xml(name)
            );
        }

        // Title and axis labels.
        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="{:.1}" font-size="20" text-anchor="middle">{}</text>"##,
            l.width / 2.0,
            l.margin_top / 2.0 + 8.0,
            escape_xml(&options.title)
        );
        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle">Weld #</text>"##,
            (l.plot_left() + l.plot_right()) / 2.0,
            l.height - 16.0
        );
        let cy = (l.plot_top() + l.plot_bottom()) / 2.0;
        let _ = writeln!(
            svg,
            r##"<text x="24" y="{cy:.1}" font-size="14" text-anchor="middle" transform="rotate(-90 24 {cy:.1})">{label} Force (N)</text>"##
        );
        svg.push_str("</svg>\n");
        svg
    }

    /// Render and write the chart, creating parent directories if needed.
    pub fn write_to(&self, path: &Path, result: &BatchResult, options: &ChartOptions) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render(result, options))?;
        debug!("Chart with {} welds written to {}", result.len(), path.display());
        Ok(())
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// SVG path commands joining consecutive points; a gap starts a new subpath.
fn path_data(points: &[Option<(f64, f64)>]) -> String {
    let mut d = String::new();
    let mut pen_down = false;
    for point in points {
        match point {
            Some((x, y)) => {
                let cmd = if pen_down { 'L' } else { 'M' };
                if !d.is_empty() {
                    d.push(' ');
                }
                let _ = write!(d, "{cmd}{x:.1},{y:.1}");
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    d
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
