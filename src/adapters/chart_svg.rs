//! SVG rendering for price history charts.

use crate::domain::app_config::ChartConfig;
use crate::domain::chart::{ChartPoint, PriceChart};
use crate::domain::error::ScrapError;
use crate::ports::chart_port::ChartPort;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 80.0;
const Y_TICKS: usize = 5;
const LINE_HEIGHT: f64 = 16.0;

pub struct SvgChartAdapter {
    width: f64,
    height: f64,
}

impl SvgChartAdapter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self::new(config.width, config.height)
    }

    pub fn render(&self, chart: &PriceChart) -> String {
        let plot = PlotArea {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: self.width - MARGIN_LEFT - MARGIN_RIGHT,
            height: self.height - MARGIN_TOP - MARGIN_BOTTOM,
            start: chart.range.start(),
            span_days: chart.range.span_days().max(1) as f64,
            y_min: chart.y_min,
            y_max: chart.y_max,
        };
        let (w, h) = (self.width, self.height);

        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" \
             viewBox=\"0 0 {w:.0} {h:.0}\" font-family=\"sans-serif\" font-size=\"12\">\n"
        );
        svg.push_str(&format!("<rect width=\"{w:.0}\" height=\"{h:.0}\" fill=\"white\"/>\n"));
        svg.push_str(&multiline_text(
            &chart.title,
            w / 2.0,
            24.0,
            r#"text-anchor="middle" font-size="16" font-weight="bold""#,
        ));

        svg.push_str(&y_axis(&plot));
        svg.push_str(&x_axis(&plot, chart));

        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
             fill=\"none\" stroke=\"black\"/>\n",
            plot.left, plot.top, plot.width, plot.height
        ));

        let polyline: Vec<String> = step_points(&chart.points, chart.range.end())
            .iter()
            .map(|(date, price)| format!("{:.1},{:.1}", plot.x(*date), plot.y(*price)))
            .collect();
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"2\" points=\"{}\"/>\n",
            polyline.join(" ")
        ));
        for point in &chart.points {
            svg.push_str(&format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"#1f77b4\"/>\n",
                plot.x(point.date),
                plot.y(point.price)
            ));
        }

        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
            plot.left + plot.width / 2.0,
            h - 12.0,
            escape_xml(&chart.x_label)
        ));
        let mid = plot.top + plot.height / 2.0;
        svg.push_str(&format!(
            "<text x=\"18\" y=\"{mid:.1}\" text-anchor=\"middle\" \
             transform=\"rotate(-90 18 {mid:.1})\">{}</text>\n",
            escape_xml(&chart.y_label)
        ));

        svg.push_str("</svg>\n");
        svg
    }
}

/// Evenly spaced price labels with horizontal grid lines.
fn y_axis(plot: &PlotArea) -> String {
    let mut out = String::new();
    for i in 0..Y_TICKS {
        let price = plot.y_min + (plot.y_max - plot.y_min) * i as f64 / (Y_TICKS - 1) as f64;
        let y = plot.y(price);
        out.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#e0e0e0\"/>\n",
            plot.left,
            plot.right()
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">${price:.2}</text>\n",
            plot.left - 8.0,
            y + 4.0
        ));
    }
    out
}

/// A grid line per month; labels only where visible.
fn x_axis(plot: &PlotArea, chart: &PriceChart) -> String {
    let mut out = String::new();
    for tick in &chart.ticks {
        let x = plot.x(tick.date);
        out.push_str(&format!(
            "<line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#f0f0f0\"/>\n",
            plot.top,
            plot.bottom()
        ));
        if tick.visible {
            out.push_str(&multiline_text(
                &tick.label,
                x,
                plot.bottom() + 18.0,
                r#"text-anchor="middle""#,
            ));
        }
    }
    out
}

impl ChartPort for SvgChartAdapter {
    fn write(&self, chart: &PriceChart, output_path: &Path) -> Result<(), ScrapError> {
        let svg = self.render(chart);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(ScrapError::Io)?;
        }
        fs::write(output_path, svg).map_err(ScrapError::Io)?;
        tracing::info!(path = %output_path.display(), points = chart.points.len(), "chart written");
        Ok(())
    }
}

struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    start: NaiveDate,
    span_days: f64,
    y_min: f64,
    y_max: f64,
}

impl PlotArea {
    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn x(&self, date: NaiveDate) -> f64 {
        let days = (date - self.start).num_days() as f64;
        self.left + days / self.span_days * self.width
    }

    fn y(&self, price: f64) -> f64 {
        let range = self.y_max - self.y_min;
        if range > 0.0 {
            self.top + (self.y_max - price) / range * self.height
        } else {
            self.top + self.height / 2.0
        }
    }
}

/// Vertices of a post-step line: each price holds until the next date, and
/// the last one holds until `end`.
fn step_points(points: &[ChartPoint], end: NaiveDate) -> Vec<(NaiveDate, f64)> {
    let mut steps = Vec::with_capacity(points.len() * 2 + 1);
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            steps.push((point.date, points[i - 1].price));
        }
        steps.push((point.date, point.price));
    }
    if let Some(last) = points.last().filter(|p| p.date < end) {
        steps.push((end, last.price));
    }
    steps
}

fn multiline_text(text: &str, x: f64, y: f64, attrs: &str) -> String {
    let spans: String = text
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let dy = if i == 0 { 0.0 } else { LINE_HEIGHT };
            format!(
                "<tspan x=\"{x:.1}\" dy=\"{dy:.0}\">{}</tspan>",
                escape_xml(line)
            )
        })
        .collect();
    format!("<text x=\"{x:.1}\" y=\"{y:.1}\" {attrs}>{spans}</text>\n")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::date_range::DateRange;
    use crate::domain::price_record::PriceRecord;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_chart(material: &str) -> PriceChart {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        let history = vec![
            PriceRecord::new("Zubicks", material, 3.10, "lb", date(2024, 1, 1)),
            PriceRecord::new("Zubicks", material, 3.25, "lb", date(2024, 2, 1)),
        ];
        PriceChart::build("Zubicks", material, range, &history).unwrap()
    }

    #[test]
    fn step_points_hold_previous_price() {
        let points = vec![
            ChartPoint {
                date: date(2024, 1, 1),
                price: 3.10,
            },
            ChartPoint {
                date: date(2024, 2, 1),
                price: 3.25,
            },
        ];
        let steps = step_points(&points, date(2024, 3, 31));
        assert_eq!(
            steps,
            vec![
                (date(2024, 1, 1), 3.10),
                (date(2024, 2, 1), 3.10),
                (date(2024, 2, 1), 3.25),
                (date(2024, 3, 31), 3.25),
            ]
        );
    }

    #[test]
    fn step_points_stop_at_range_end() {
        let points = vec![ChartPoint {
            date: date(2024, 3, 31),
            price: 1.0,
        }];
        assert_eq!(step_points(&points, date(2024, 3, 31)).len(), 1);
    }

    #[test]
    fn render_contains_title_axes_and_line() {
        let svg = SvgChartAdapter::new(960, 720).render(&sample_chart("Copper"));

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="960""#));
        assert!(svg.contains(">Zubicks Purchase Price for</tspan>"));
        assert!(svg.contains(">Copper</tspan>"));
        assert!(svg.contains("Price per Pound"));
        assert!(svg.contains(">Date</text>"));
        assert!(svg.contains("<polyline"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(">Jan</tspan>"));
        assert!(svg.contains("$3.00"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn material_names_are_escaped() {
        let svg = SvgChartAdapter::new(960, 720).render(&sample_chart("Copper & <Brass>"));
        assert!(svg.contains("Copper &amp; &lt;Brass&gt;"));
        assert!(!svg.contains("Copper & <Brass>"));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("nested/charts/copper.svg");

        let adapter = SvgChartAdapter::new(640, 480);
        adapter.write(&sample_chart("Copper"), &output_path).unwrap();

        let contents = fs::read_to_string(&output_path).unwrap();
        assert!(contents.contains("<svg"));
    }
}
