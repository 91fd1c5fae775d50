mod client;
mod projection;

pub use client::{AnalyticsClient, PathNode, PathResult, RankedLocation};
pub use projection::{ProjectionInfo, ProjectionName, DEFAULT_PROJECTION};
