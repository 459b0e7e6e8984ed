//! Merged browsing model for escolar
//!
//! Joins the previous and current snapshots on school/GRE/municipio, applies
//! the cascading GRE and municipio filters, and derives the dashboard views:
//! the indicator mean/delta summary, the per-school delta table, the grouped
//! comparison chart and the positional indicator groups.
//!
//! UI layout and chart styling stay out; the output is data plus a static
//! Chart.js page.

mod chart;
mod error;
mod html;
mod model;

pub use chart::{ChartData, ChartKind, ChartOptions, ChartSpec, Dataset};
pub use error::{DashboardError, Result};
pub use html::render_page;
pub use model::{
    Dashboard, DashboardOptions, Filter, IndicatorGroup, MetricSummary, SchoolDelta,
};
