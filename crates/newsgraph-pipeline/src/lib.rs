//! Filtering, layout and series building for the fake-news retweet and
//! document-similarity dashboards.

pub mod analysis;
pub mod error;
pub mod graph;
pub mod overlay;
pub mod pipeline;
pub mod series;
pub mod store;
pub mod tables;
pub mod util;
pub mod views;

pub use error::PipelineError;
pub use pipeline::{Dashboard, Output, Request, View};
pub use store::{GraphKind, GraphStore, Language};
pub use views::Rendered;
