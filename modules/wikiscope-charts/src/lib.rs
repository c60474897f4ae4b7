pub mod builders;
pub mod spec;
pub mod stats;
pub mod word_cloud;

pub use spec::{ChartLayout, ChartSpec};
pub use stats::{outlier_table, percentile, word_count_summary, OutlierTable, WordCountSummary};
pub use word_cloud::{render_word_cloud, word_cloud, CloudRasterizer, Raster, WordCloudSpec};
