pub mod bands;
pub mod components;
pub mod filter;
pub mod layout;
pub mod metrics;
pub mod model;

pub use bands::{ClusterBand, ClusterBounds};
pub use components::remove_singles;
pub use filter::{filter_to_clusters, resolve_selection};
pub use layout::{geo_layout, spring_layout, temporal_layout, ForceParams, Layout, Position};
pub use metrics::{edge_width, node_size};
pub use model::GraphModel;
