//! Chart values and terminal rendering.
//!
//! A [`Chart`] is a plain value describing what to draw: labelled series and
//! shaded uncertainty bands over a date axis. Models build charts, front-ends
//! decide how to show them. [`render_ascii`] is the built-in text renderer:
//!
//! - uncertainty bands: `:`
//! - lines: `*`, `+`, `#` (cycled per line series)
//! - observed points: `o`

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ForecastError, Result};
use crate::normalize::{parse_flexible_date, parse_locale_number};
use crate::table::RawTable;

const LINE_GLYPHS: [char; 3] = ['*', '+', '#'];
const POINT_GLYPH: char = 'o';
const BAND_GLYPH: char = ':';

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesStyle {
    Line,
    Points,
}

/// A labelled sequence of dated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub style: SeriesStyle,
    pub points: Vec<(NaiveDate, f64)>,
}

/// One vertical slice of a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub lower: f64,
    pub upper: f64,
}

/// A shaded region between a lower and an upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub label: String,
    pub points: Vec<BandPoint>,
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub bands: Vec<Band>,
}

impl Chart {
    /// Empty chart with the default `Data` / `Wartość` axis labels.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: "Data".to_string(),
            y_label: "Wartość".to_string(),
            series: Vec::new(),
            bands: Vec::new(),
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn add_series(&mut self, label: impl Into<String>, style: SeriesStyle, points: Vec<(NaiveDate, f64)>) {
        self.series.push(Series {
            label: label.into(),
            style,
            points,
        });
    }

    pub fn add_band(&mut self, label: impl Into<String>, points: Vec<BandPoint>) {
        self.bands.push(Band {
            label: label.into(),
            points,
        });
    }

    /// Multi-line chart of raw table columns against a date column.
    ///
    /// Values are normalized the same way the dataset builder does it; rows
    /// whose date or value does not parse are skipped.
    pub fn comparative(
        table: &RawTable,
        date_column: &str,
        columns: &[&str],
        title: impl Into<String>,
    ) -> Result<Chart> {
        let dates = table
            .column(date_column)
            .ok_or_else(|| ForecastError::MissingColumn(date_column.to_string()))?;
        let mut chart = Chart::new(title);

        for &column in columns {
            let values = table
                .column(column)
                .ok_or_else(|| ForecastError::MissingColumn(column.to_string()))?;
            let mut points: Vec<(NaiveDate, f64)> = dates
                .iter()
                .zip(values)
                .filter_map(|(d, v)| Some((parse_flexible_date(d)?, parse_locale_number(v)?)))
                .collect();
            points.sort_by_key(|(d, _)| *d);
            debug!(column, points = points.len(), "comparative series");
            chart.add_series(column, SeriesStyle::Line, points);
        }
        Ok(chart)
    }

    /// Earliest and latest date across series and bands.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|(d, _)| *d))
            .chain(self.bands.iter().flat_map(|b| b.points.iter().map(|p| p.date)));
        let mut range: Option<(NaiveDate, NaiveDate)> = None;
        for d in dates {
            range = Some(match range {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
        range
    }

    /// Smallest and largest value across series and bands.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for s in &self.series {
            for &(_, y) in &s.points {
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
        for b in &self.bands {
            for p in &b.points {
                min_y = min_y.min(p.lower);
                max_y = max_y.max(p.upper);
            }
        }
        if min_y.is_finite() && max_y.is_finite() {
            Some((min_y, max_y))
        } else {
            None
        }
    }

    /// Total number of plotted values.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum::<usize>()
            + self.bands.iter().map(|b| b.points.len()).sum::<usize>()
    }
}

/// Render a chart on a fixed-size character grid.
///
/// Output is deterministic: a title line, a range header, `height` grid rows
/// of exactly `width` characters, then one legend line per series or band.
pub fn render_ascii(chart: &Chart, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    out.push_str(&chart.title);
    out.push('\n');

    let (Some((d_min, d_max)), Some((y_min, y_max))) = (chart.date_range(), chart.value_range()) else {
        out.push_str("(brak danych)\n");
        return out;
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let x_span = ((d_max - d_min).num_days() as f64).max(1.0);
    let to_x = |d: NaiveDate| map_x((d - d_min).num_days() as f64, x_span, width);
    let to_y = |y: f64| map_y(y, y_min, y_max, height);

    let mut grid = vec![vec![' '; width]; height];

    for band in &chart.bands {
        for p in &band.points {
            let x = to_x(p.date);
            let (top, bottom) = (to_y(p.upper), to_y(p.lower));
            for row in grid.iter_mut().take(bottom + 1).skip(top) {
                row[x] = BAND_GLYPH;
            }
        }
    }

    let mut legend = Vec::new();
    for band in &chart.bands {
        legend.push(format!("  {BAND_GLYPH} {}", band.label));
    }

    let mut line_index = 0;
    for series in chart.series.iter().filter(|s| s.style == SeriesStyle::Line) {
        let glyph = LINE_GLYPHS[line_index % LINE_GLYPHS.len()];
        line_index += 1;
        let mut prev: Option<(usize, usize)> = None;
        for &(d, y) in &series.points {
            let cell = (to_x(d), to_y(y));
            match prev {
                Some(start) => draw_line(&mut grid, start, cell, glyph),
                None => grid[cell.1][cell.0] = glyph,
            }
            prev = Some(cell);
        }
        legend.push(format!("  {glyph} {}", series.label));
    }

    for series in chart.series.iter().filter(|s| s.style == SeriesStyle::Points) {
        for &(d, y) in &series.points {
            grid[to_y(y)][to_x(d)] = POINT_GLYPH;
        }
        legend.push(format!("  {POINT_GLYPH} {}", series.label));
    }

    out.push_str(&format!(
        "{}=[{d_min}, {d_max}] | {}=[{y_min:.2}, {y_max:.2}]\n",
        chart.x_label, chart.y_label
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for line in legend {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 { span * frac } else { min.abs().max(1.0) * frac };
    (min - pad, max + pad)
}

fn map_x(offset_days: f64, span_days: f64, width: usize) -> usize {
    let u = (offset_days / span_days).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // row 0 is the top of the chart
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Bresenham line; overwrites empty and band cells only.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), glyph: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            if *cell == ' ' || *cell == BAND_GLYPH {
                *cell = glyph;
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        let txt = render_ascii(&Chart::new("Pusto"), 20, 5);
        assert_eq!(txt, "Pusto\n(brak danych)\n");
    }

    #[test]
    fn grid_has_requested_shape() {
        let mut chart = Chart::new("Test");
        chart.add_series("y", SeriesStyle::Line, vec![(d(2023, 1, 1), 1.0), (d(2023, 1, 11), 2.0)]);
        chart.add_series("obs", SeriesStyle::Points, vec![(d(2023, 1, 6), 1.5)]);
        let txt = render_ascii(&chart, 20, 6);
        let lines: Vec<&str> = txt.lines().collect();

        // title + header + grid + two legend lines
        assert_eq!(lines.len(), 2 + 6 + 2);
        assert!(lines[2..8].iter().all(|l| l.chars().count() == 20));
        assert!(txt.contains('o'));
        assert!(txt.contains('*'));
        assert_eq!(lines[8], "  * y");
        assert_eq!(lines[9], "  o obs");
    }

    #[test]
    fn line_drawn_over_band() {
        let mut chart = Chart::new("Pasmo");
        let band = (1..=10)
            .map(|i| BandPoint { date: d(2023, 1, i), lower: 0.0, upper: 2.0 })
            .collect();
        chart.add_band("Niepewność", band);
        chart.add_series("yhat", SeriesStyle::Line, (1..=10).map(|i| (d(2023, 1, i), 1.0)).collect());
        let txt = render_ascii(&chart, 10, 7);
        let middle = txt.lines().nth(2 + 3).unwrap();
        assert_eq!(middle, "**********");
        assert!(txt.lines().nth(2).unwrap().contains(':'));
    }

    #[test]
    fn comparative_skips_unparsable_rows() {
        let table = RawTable::from_rows(
            &["Data", "A", "B"],
            vec![
                vec!["2023-01-02", "1,5", "3"],
                vec!["2023-01-01", "x", "2"],
                vec!["bad", "2", "2"],
            ],
        );
        let chart = Chart::comparative(&table, "Data", &["A", "B"], "Porównanie").unwrap();
        assert_eq!(chart.series[0].points, vec![(d(2023, 1, 2), 1.5)]);
        assert_eq!(chart.series[1].points, vec![(d(2023, 1, 1), 2.0), (d(2023, 1, 2), 3.0)]);

        let err = Chart::comparative(&table, "Data", &["C"], "x").unwrap_err();
        assert!(matches!(err, ForecastError::MissingColumn(_)));
    }
}
