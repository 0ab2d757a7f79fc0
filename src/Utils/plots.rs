//! Comparison plots: calculated curves as lines, experimental data as markers.
//!
//! [`PlotRenderer`] is the sink the pipeline talks to; [`SvgPlotRenderer`] draws with
//! plotters into one SVG file. Points with a non-finite coordinate are not drawn, and
//! a line is broken wherever such a point occurs.
use log::{info, warn};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("nothing to plot")]
    NoSeries,
    #[error("series '{label}' has {x} x values and {y} y values")]
    LengthMismatch { label: String, x: usize, y: usize },
    #[error("invalid axis range {0:?}")]
    InvalidRange((f64, f64)),
    #[error("drawing failed: {0}")]
    Drawing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesStyle {
    Line,
    Markers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub style: SeriesStyle,
}

impl Series {
    pub fn line(label: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            label: label.to_string(),
            x,
            y,
            style: SeriesStyle::Line,
        }
    }

    pub fn markers(label: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            label: label.to_string(),
            x,
            y,
            style: SeriesStyle::Markers,
        }
    }

    /// contiguous runs of finite points; a non-finite point ends the current run
    pub fn finite_segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (&x, &y) in self.x.iter().zip(self.y.iter()) {
            if x.is_finite() && y.is_finite() {
                current.push((x, y));
            } else if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub legend: bool,
    /// fixed ratio of one y unit to one x unit on screen; `None` fills the canvas
    pub aspect: Option<f64>,
    /// canvas size in pixels; with an aspect ratio set the width is derived from the height
    pub size: (u32, u32),
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            x_range: (0.0, 1.0),
            y_range: (0.0, 1.0),
            legend: true,
            aspect: None,
            size: (800, 600),
        }
    }
}

impl PlotOptions {
    /// canvas size honouring the aspect ratio
    pub fn canvas_size(&self) -> (u32, u32) {
        match self.aspect {
            Some(aspect) if aspect > 0.0 => {
                let (_, height) = self.size;
                let x_span = self.x_range.1 - self.x_range.0;
                let y_span = self.y_range.1 - self.y_range.0;
                // label areas are kept outside the square plotting region
                let plot_height = height.saturating_sub(100) as f64;
                let plot_width = plot_height * x_span / (y_span * aspect);
                ((plot_width.round() as u32).saturating_add(100), height)
            }
            _ => self.size,
        }
    }

    fn validate(&self) -> Result<(), PlotError> {
        for range in [self.x_range, self.y_range] {
            if !(range.0.is_finite() && range.1.is_finite() && range.0 < range.1) {
                return Err(PlotError::InvalidRange(range));
            }
        }
        Ok(())
    }
}

/// presentation sink for paired numeric series
pub trait PlotRenderer {
    fn render(&self, series: &[Series], options: &PlotOptions) -> Result<(), PlotError>;
}

fn check_series(series: &[Series]) -> Result<(), PlotError> {
    if series.is_empty() {
        return Err(PlotError::NoSeries);
    }
    for s in series {
        if s.x.len() != s.y.len() {
            return Err(PlotError::LengthMismatch {
                label: s.label.clone(),
                x: s.x.len(),
                y: s.y.len(),
            });
        }
    }
    Ok(())
}

/// renders into a single SVG file
#[derive(Debug, Clone)]
pub struct SvgPlotRenderer {
    pub path: PathBuf,
}

impl SvgPlotRenderer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

fn drawing<E: std::fmt::Debug>(e: E) -> PlotError {
    PlotError::Drawing(format!("{:?}", e))
}

const PALETTE: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

impl PlotRenderer for SvgPlotRenderer {
    fn render(&self, series: &[Series], options: &PlotOptions) -> Result<(), PlotError> {
        check_series(series)?;
        options.validate()?;
        let size = options.canvas_size();
        let root = SVGBackend::new(&self.path, size).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(options.title.as_str(), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(
                options.x_range.0..options.x_range.1,
                options.y_range.0..options.y_range.1,
            )
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .x_desc(options.x_label.as_str())
            .y_desc(options.y_label.as_str())
            .draw()
            .map_err(drawing)?;

        for (i, s) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let segments = s.finite_segments();
            match s.style {
                SeriesStyle::Line => {
                    if segments.is_empty() {
                        warn!("line series '{}' has no finite points and is not drawn", s.label);
                    }
                    for (k, segment) in segments.into_iter().enumerate() {
                        let drawn = chart
                            .draw_series(LineSeries::new(segment, color.stroke_width(2)))
                            .map_err(drawing)?;
                        if k == 0 {
                            drawn.label(s.label.as_str()).legend(move |(x, y)| {
                                PathElement::new(vec![(x, y), (x + 20, y)], color)
                            });
                        }
                    }
                }
                SeriesStyle::Markers => {
                    let points: Vec<(f64, f64)> = segments.into_iter().flatten().collect();
                    chart
                        .draw_series(
                            points
                                .into_iter()
                                .map(|p| Circle::new(p, 4, color.filled())),
                        )
                        .map_err(drawing)?
                        .label(s.label.as_str())
                        .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
                }
            }
        }

        if options.legend {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .draw()
                .map_err(drawing)?;
        }
        root.present().map_err(drawing)?;
        info!("plot written to {}", self.path.display());
        Ok(())
    }
}
