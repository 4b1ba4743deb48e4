pub(crate) mod clusters;
mod hierarchy;
mod layered;
mod tiered;

pub use clusters::{Partition, partition};
pub use tiered::{CONTAINER_TYPES, Tier, classify, is_container_type};

use tracing::debug;

use crate::config::LayoutConfig;
use crate::dag::DagEngine;
use crate::error::Result;
use crate::graph::{DiagramGraph, PositionMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStrategy {
    /// Account and network containers with members on a fixed grid.
    Hierarchical,
    /// Flat viewport-filling grid sorted into architectural tiers.
    TieredGrid,
    /// One layered flow over the whole graph.
    Layered,
    /// Per-cluster layered flows with isolated nodes gridded below.
    Smart,
}

impl LayoutStrategy {
    pub fn name(self) -> &'static str {
        match self {
            LayoutStrategy::Hierarchical => "hierarchical",
            LayoutStrategy::TieredGrid => "tiered",
            LayoutStrategy::Layered => "layered",
            LayoutStrategy::Smart => "smart",
        }
    }
}

/// Canvas dimensions the tiered grid fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(1280.0, 800.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Account,
    Network,
}

impl ContainerKind {
    pub fn name(self) -> &'static str {
        match self {
            ContainerKind::Account => "account",
            ContainerKind::Network => "network",
        }
    }
}

/// A rendered container rectangle. Containers are emitted parent before
/// child so renderers can paint them back to front.
#[derive(Debug, Clone)]
pub struct Container {
    pub id: String,
    pub label: String,
    pub kind: ContainerKind,
    pub parent: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Resource ids that sit directly inside this container.
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub positions: PositionMap,
    pub containers: Vec<Container>,
}

/// Computes node positions (and containers, for the hierarchical strategy)
/// for a normalized graph. Pure apart from the engine call: the same input
/// always produces the same output.
pub fn compute_layout(
    graph: &DiagramGraph,
    strategy: LayoutStrategy,
    saved: Option<&PositionMap>,
    viewport: Viewport,
    engine: &dyn DagEngine,
    config: &LayoutConfig,
) -> Result<Layout> {
    debug!(
        "computing {} layout for {} nodes / {} edges",
        strategy.name(),
        graph.nodes.len(),
        graph.edges.len()
    );
    match strategy {
        LayoutStrategy::Hierarchical => {
            Ok(hierarchy::layout_hierarchical(graph, saved, &config.hierarchy))
        }
        LayoutStrategy::TieredGrid => Ok(Layout {
            positions: tiered::layout_tiered_grid(graph, viewport, &config.tiered),
            containers: Vec::new(),
        }),
        LayoutStrategy::Layered => Ok(Layout {
            positions: layered::layout_layered(graph, engine, &config.layered)?,
            containers: Vec::new(),
        }),
        LayoutStrategy::Smart => Ok(Layout {
            positions: layered::layout_smart(graph, engine, &config.layered)?,
            containers: Vec::new(),
        }),
    }
}

/// Axis-aligned bounding box accumulator shared by the container layouts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    pub(crate) fn empty() -> Self {
        Bounds {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    pub(crate) fn extend_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x + width);
        self.max_y = self.max_y.max(y + height);
    }

    pub(crate) fn extend_bounds(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub(crate) fn padded(self, pad_x: f32, pad_y: f32) -> Bounds {
        Bounds {
            min_x: self.min_x - pad_x,
            min_y: self.min_y - pad_y,
            max_x: self.max_x + pad_x,
            max_y: self.max_y + pad_y,
        }
    }

    /// Grows the box down and to the right until it meets the floor size.
    pub(crate) fn with_min_size(self, min_width: f32, min_height: f32) -> Bounds {
        Bounds {
            max_x: self.max_x.max(self.min_x + min_width),
            max_y: self.max_y.max(self.min_y + min_height),
            ..self
        }
    }

    pub(crate) fn min_x(&self) -> f32 {
        self.min_x
    }

    pub(crate) fn min_y(&self) -> f32 {
        self.min_y
    }

    pub(crate) fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub(crate) fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(0.0)
    }
}
