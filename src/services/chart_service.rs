use plotters::prelude::*;

use crate::api::coinbase::PriceResponse;
use crate::models::{ChartConfig, ChartSeries};
use crate::utils::errors::{ChartError, CycleError};
use crate::utils::format::format_currency;
use crate::utils::page::{Node, Page, Surface};

/// Samples kept per coin per cycle
pub const MAX_SAMPLES: usize = 24;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;

/// Turn a price response into a chart series.
///
/// Keeps the first [`MAX_SAMPLES`] hourly samples in the order the API
/// returned them (most recent first). `label` maps a unix timestamp to its
/// display string.
pub fn build_series<F>(
    coin_id: &str,
    response: &PriceResponse,
    label: F,
) -> Result<ChartSeries, CycleError>
where
    F: Fn(i64) -> Option<String>,
{
    let samples = response.hourly();
    let samples = &samples[..samples.len().min(MAX_SAMPLES)];

    let mut labels = Vec::with_capacity(samples.len());
    let mut data = Vec::with_capacity(samples.len());

    for (index, sample) in samples.iter().enumerate() {
        let text = label(sample.timestamp()).ok_or_else(|| CycleError::InvalidTimestamp {
            coin: coin_id.to_string(),
            value: sample.timestamp(),
        })?;

        let price = sample
            .price()
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| CycleError::InvalidPrice {
                coin: coin_id.to_string(),
                index,
                value: sample.price().to_string(),
            })?;

        labels.push(text);
        data.push(price);
    }

    Ok(ChartSeries {
        coin_id: coin_id.to_string(),
        labels,
        data,
        symbol: response.symbol().to_string(),
    })
}

/// Draw a single-series line chart into a new surface with id `coin_id`,
/// appended as the last child of the page's chart section.
///
/// Existing children are left alone; clearing is up to the caller.
pub fn render_chart(
    page: &mut Page,
    coin_id: &str,
    labels: &[String],
    data: &[f64],
    symbol: &str,
) -> Result<(), ChartError> {
    let container = page.chart_section_mut()?;

    if labels.len() != data.len() {
        return Err(ChartError::MismatchedSeries {
            labels: labels.len(),
            data: data.len(),
        });
    }

    let svg = draw_line_chart(labels, data, symbol)?;
    container.append(Node::Surface(Surface {
        id: coin_id.to_string(),
        config: ChartConfig::line(labels, data, symbol),
        svg,
    }));

    Ok(())
}

/// Y bounds fitted to the data with 10% padding. Zero is not forced into range.
fn y_range(data: &[f64]) -> (f64, f64) {
    let (min, max) = data
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min > max {
        return (0.0, 1.0);
    }

    // Flat series still get a visible band
    let span = (max - min).max(max.abs() * 1e-3).max(1e-8);
    let padding = span * 0.1;
    (min - padding, max + padding)
}

fn draw_line_chart(labels: &[String], data: &[f64], symbol: &str) -> Result<String, ChartError> {
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Draw(format!("Failed to fill canvas: {}", e)))?;

        let (y_min, y_max) = y_range(data);
        let x_max = u32::try_from(data.len().saturating_sub(1)).unwrap_or(u32::MAX).max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption(symbol, ("sans-serif", 24.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(0u32..x_max, y_min..y_max)
            .map_err(|e| ChartError::Draw(format!("Failed to build chart: {}", e)))?;

        let x_label_formatter = |x: &u32| {
            usize::try_from(*x)
                .ok()
                .and_then(|i| labels.get(i))
                .cloned()
                .unwrap_or_default()
        };
        let y_label_formatter = |y: &f64| format_currency(*y);

        chart
            .configure_mesh()
            .x_labels(labels.len().clamp(2, 12))
            .x_label_formatter(&x_label_formatter)
            .y_label_formatter(&y_label_formatter)
            .x_desc("Time")
            .draw()
            .map_err(|e| ChartError::Draw(format!("Failed to draw mesh: {}", e)))?;

        let points = data
            .iter()
            .enumerate()
            .filter_map(|(i, price)| u32::try_from(i).ok().map(|x| (x, *price)));

        chart
            .draw_series(LineSeries::new(points, &BLUE))
            .map_err(|e| ChartError::Draw(format!("Failed to draw line: {}", e)))?
            .label(symbol)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| ChartError::Draw(format!("Failed to draw legend: {}", e)))?;

        root.present()
            .map_err(|e| ChartError::Draw(format!("Failed to render chart: {}", e)))?;
    }

    Ok(svg)
}
