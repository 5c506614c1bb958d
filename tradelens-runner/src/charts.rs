//! HTML chart sink — one self-contained page per series.
//!
//! Each page holds the title and an inline SVG chart with axis labels, so it
//! opens in any browser without scripts or network access. Points are laid
//! out evenly in series order; the y range always includes zero.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use tradelens_core::{ChartSeries, ChartSink, SeriesKind};

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to write chart {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Writes `<dir>/<series.name>.html` for every emitted series.
#[derive(Debug)]
pub struct HtmlChartSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl HtmlChartSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

impl ChartSink for HtmlChartSink {
    type Error = ChartError;

    fn emit(&mut self, series: &ChartSeries) -> Result<(), ChartError> {
        let path = self.dir.join(format!("{}.html", series.name));
        std::fs::write(&path, render_html(series)).map_err(|source| ChartError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), points = series.points.len(), "chart written");
        self.written.push(path);
        Ok(())
    }
}

// ─── Rendering ──────────────────────────────────────────────────────

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 64.0;
const Y_TICKS: usize = 5;
const MAX_X_LABELS: usize = 8;

/// Full HTML document for one series.
pub fn render_html(series: &ChartSeries) -> String {
    let title = escape(&series.title);
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2em;color:#222}\
         h1{font-size:1.3em}svg text{font-size:12px;fill:#444}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{title}</h1>");
    html.push_str(&render_svg(series));
    let _ = writeln!(html, "<p>{} point(s)</p>", series.points.len());
    html.push_str("</body>\n</html>\n");
    html
}

/// Inline SVG for one series.
pub fn render_svg(series: &ChartSeries) -> String {
    let mut svg = String::with_capacity(2048);
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" role=\"img\" aria-label=\"{}\">",
        escape(&series.title)
    );

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let bottom = MARGIN_TOP + plot_h;

    // axis titles
    let _ = writeln!(
        svg,
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
        MARGIN_LEFT + plot_w / 2.0,
        HEIGHT - 12.0,
        escape(&series.x_label)
    );
    let _ = writeln!(
        svg,
        "<text x=\"16\" y=\"{:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 16 {:.1})\">{}</text>",
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0,
        escape(&series.y_label)
    );

    if series.points.is_empty() {
        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">No data</text>",
            MARGIN_LEFT + plot_w / 2.0,
            MARGIN_TOP + plot_h / 2.0
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    let (lo, hi) = y_range(&series.y_values());
    let y_of = |y: f64| MARGIN_TOP + (hi - y) / (hi - lo) * plot_h;
    let n = series.points.len();
    let slot = plot_w / n as f64;
    let x_of = |i: usize| MARGIN_LEFT + slot * (i as f64 + 0.5);

    // grid and y tick labels
    for k in 0..=Y_TICKS {
        let v = lo + (hi - lo) * k as f64 / Y_TICKS as f64;
        let y = y_of(v);
        let _ = writeln!(
            svg,
            "<line x1=\"{MARGIN_LEFT}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#e5e5e5\"/>",
            WIDTH - MARGIN_RIGHT
        );
        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{v:.2}</text>",
            MARGIN_LEFT - 6.0,
            y + 4.0
        );
    }

    // zero line and axes
    let zero = y_of(0.0);
    let _ = writeln!(
        svg,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{zero:.1}\" x2=\"{:.1}\" y2=\"{zero:.1}\" stroke=\"#999\"/>",
        WIDTH - MARGIN_RIGHT
    );
    let _ = writeln!(
        svg,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{bottom:.1}\" stroke=\"#999\"/>"
    );

    match series.kind {
        SeriesKind::Line => {
            let points: Vec<String> = series
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{:.1},{:.1}", x_of(i), y_of(p.y)))
                .collect();
            let _ = writeln!(
                svg,
                "<polyline fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"2\" points=\"{}\"/>",
                points.join(" ")
            );
        }
        SeriesKind::Bar => {
            let bar_w = (slot * 0.7).max(1.0);
            for (i, p) in series.points.iter().enumerate() {
                let y = y_of(p.y);
                let (top, height) = if p.y >= 0.0 {
                    (y, zero - y)
                } else {
                    (zero, y - zero)
                };
                let fill = if p.y >= 0.0 { "#2ca02c" } else { "#d62728" };
                let _ = writeln!(
                    svg,
                    "<rect x=\"{:.1}\" y=\"{top:.1}\" width=\"{bar_w:.1}\" height=\"{height:.1}\" fill=\"{fill}\"><title>{}: {:.2}</title></rect>",
                    x_of(i) - bar_w / 2.0,
                    p.x,
                    p.y
                );
            }
        }
    }

    // x tick labels, thinned to at most MAX_X_LABELS
    let step = n.div_ceil(MAX_X_LABELS).max(1);
    for (i, p) in series.points.iter().enumerate() {
        if i % step != 0 && i != n - 1 {
            continue;
        }
        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            x_of(i),
            bottom + 18.0,
            escape(&p.x.to_string())
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Value range padded to include zero and to be non-empty.
fn y_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(0.0_f64, f64::min);
    let hi = values.iter().copied().fold(0.0_f64, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
