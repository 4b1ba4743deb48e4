#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dag;
pub mod error;
pub mod graph;
pub mod layout;
pub mod layout_dump;
pub mod store;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use dag::{DagEngine, DagreEngine};
pub use error::{Error, Result};
pub use graph::{DiagramGraph, Point, PositionMap, RawId, RawRelationship, RawResource, normalize};
pub use layout::{
    Container, ContainerKind, Layout, LayoutStrategy, Partition, Viewport, compute_layout,
    partition,
};
pub use store::{MemoryStore, PositionStore};
