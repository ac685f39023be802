//! Chart generation models

use serde::Serialize;

/// Series fed to the renderer for one coin in one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub coin_id: String,
    /// Time-of-day labels, parallel to `data`
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    /// Base currency code shown as the series name
    pub symbol: String,
}

/// Declarative description of a line chart, serialized next to the SVG
/// so a page script can rebuild the chart client-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: &'static str,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub y: YAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxis {
    pub begin_at_zero: bool,
    pub ticks: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticks {
    /// Tick label format; only `"currency"` is produced
    pub format: &'static str,
}

impl ChartConfig {
    pub const LINE_COLOR: &'static str = "blue";

    /// Single-series line chart with currency ticks and a data-fitted Y axis
    pub fn line(labels: &[String], data: &[f64], symbol: &str) -> Self {
        Self {
            kind: "line",
            data: ChartData {
                labels: labels.to_vec(),
                datasets: vec![Dataset {
                    label: symbol.to_string(),
                    data: data.to_vec(),
                    border_color: Self::LINE_COLOR,
                    fill: false,
                }],
            },
            options: ChartOptions {
                responsive: true,
                scales: Scales {
                    y: YAxis {
                        begin_at_zero: false,
                        ticks: Ticks { format: "currency" },
                    },
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_line_config_json_shape() {
        let config = ChartConfig::line(&["1:00:00 PM".to_string()], &[64000.5], "BTC");
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "line",
                "data": {
                    "labels": ["1:00:00 PM"],
                    "datasets": [{
                        "label": "BTC",
                        "data": [64000.5],
                        "borderColor": "blue",
                        "fill": false
                    }]
                },
                "options": {
                    "responsive": true,
                    "scales": { "y": { "beginAtZero": false, "ticks": { "format": "currency" } } }
                }
            })
        );
    }
}
