//! Data models shared by the chart renderer and the refresh driver

pub mod chart;

pub use chart::{ChartConfig, ChartSeries};
