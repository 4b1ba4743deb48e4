use crate::error::{Error, Result};
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDirection {
    LeftRight,
    RightLeft,
    TopBottom,
    BottomTop,
}

impl RankDirection {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "lr" => Some(RankDirection::LeftRight),
            "rl" => Some(RankDirection::RightLeft),
            "tb" => Some(RankDirection::TopBottom),
            "bt" => Some(RankDirection::BottomTop),
            _ => None,
        }
    }

    fn rankdir(self) -> &'static str {
        match self {
            RankDirection::LeftRight => "lr",
            RankDirection::RightLeft => "rl",
            RankDirection::TopBottom => "tb",
            RankDirection::BottomTop => "bt",
        }
    }
}

/// One node handed to the ranking engine. `order` is a stable tiebreak for
/// nodes that land in the same rank.
#[derive(Debug, Clone)]
pub struct DagNodeSpec {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub order: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DagEdgeSpec {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct DagOptions {
    pub direction: RankDirection,
    pub node_sep: f32,
    pub rank_sep: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for DagOptions {
    fn default() -> Self {
        DagOptions {
            direction: RankDirection::LeftRight,
            node_sep: 40.0,
            rank_sep: 80.0,
            margin_x: 8.0,
            margin_y: 8.0,
        }
    }
}

/// Node center produced by the engine.
#[derive(Debug, Clone)]
pub struct DagPlacement {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

/// Narrow seam over the layered-graph primitive so layouts can be tested
/// against a scripted engine.
pub trait DagEngine {
    fn layout_dag(
        &self,
        nodes: &[DagNodeSpec],
        edges: &[DagEdgeSpec],
        options: &DagOptions,
    ) -> Result<Vec<DagPlacement>>;
}

/// Production engine backed by the dagre port.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagreEngine;

impl DagEngine for DagreEngine {
    fn layout_dag(
        &self,
        nodes: &[DagNodeSpec],
        edges: &[DagEdgeSpec],
        options: &DagOptions,
    ) -> Result<Vec<DagPlacement>> {
        if nodes.is_empty() {
            return Ok(Vec::new());
        }
        // The port panics on some degenerate inputs instead of returning an
        // error, so the boundary has to absorb unwinds.
        match catch_unwind(AssertUnwindSafe(|| run_dagre(nodes, edges, options))) {
            Ok(result) => result,
            Err(_) => Err(Error::engine("layered-graph primitive panicked")),
        }
    }
}

fn run_dagre(
    nodes: &[DagNodeSpec],
    edges: &[DagEdgeSpec],
    options: &DagOptions,
) -> Result<Vec<DagPlacement>> {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(options.direction.rankdir().to_string());
    graph_config.nodesep = Some(options.node_sep);
    graph_config.ranksep = Some(options.rank_sep);
    graph_config.marginx = Some(options.margin_x);
    graph_config.marginy = Some(options.margin_y);
    dagre_graph.set_graph(graph_config);

    for spec in nodes {
        let mut node = DagreNode::default();
        node.width = spec.width;
        node.height = spec.height;
        node.order = spec.order;
        dagre_graph.set_node(spec.id.clone(), Some(node));
    }

    let known: HashSet<&str> = nodes.iter().map(|spec| spec.id.as_str()).collect();
    let mut seen_edges: HashSet<(String, String)> = HashSet::new();
    for edge in edges {
        if !known.contains(edge.from.as_str()) || !known.contains(edge.to.as_str()) {
            continue;
        }
        if edge.from == edge.to {
            continue;
        }
        if !seen_edges.insert((edge.from.clone(), edge.to.clone())) {
            continue;
        }
        let _ = dagre_graph.set_edge(&edge.from, &edge.to, Some(DagreEdge::default()), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut placements = Vec::with_capacity(nodes.len());
    for spec in nodes {
        let Some(node) = dagre_graph.node(&spec.id) else {
            return Err(Error::engine(format!(
                "engine produced no coordinates for node {}",
                spec.id
            )));
        };
        if !node.x.is_finite() || !node.y.is_finite() {
            return Err(Error::engine(format!(
                "engine produced non-finite coordinates for node {}",
                spec.id
            )));
        }
        placements.push(DagPlacement {
            id: spec.id.clone(),
            x: node.x,
            y: node.y,
        });
    }
    Ok(placements)
}
