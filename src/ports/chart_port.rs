//! Chart output port trait.

use crate::domain::chart::PriceChart;
use crate::domain::error::ScrapError;
use std::path::Path;

/// Port for writing rendered price charts.
pub trait ChartPort {
    fn write(&self, chart: &PriceChart, output_path: &Path) -> Result<(), ScrapError>;
}
