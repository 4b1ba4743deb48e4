use std::collections::HashSet;

use tracing::debug;

use crate::config::LayeredConfig;
use crate::dag::{DagEdgeSpec, DagEngine, DagNodeSpec, DagOptions, RankDirection};
use crate::error::Result;
use crate::graph::{DiagramGraph, Point, PositionMap};

use super::{Bounds, clusters};

struct SubsetLayout {
    /// Top-left node corners, normalized so the subset's bounding box
    /// starts at (0, 0).
    placements: Vec<(String, Point)>,
    width: f32,
    height: f32,
}

fn dag_options(config: &LayeredConfig) -> DagOptions {
    DagOptions {
        direction: RankDirection::from_token(&config.rank_direction)
            .unwrap_or(RankDirection::LeftRight),
        node_sep: config.node_sep,
        rank_sep: config.rank_sep,
        margin_x: config.margin_x,
        margin_y: config.margin_y,
    }
}

/// Runs the layered engine over a subset of the graph's nodes. Edges with
/// an endpoint outside the subset are skipped. The result is normalized to
/// a (0, 0) origin so callers can place the block anywhere.
fn layout_subset(
    graph: &DiagramGraph,
    ids: &[String],
    engine: &dyn DagEngine,
    config: &LayeredConfig,
) -> Result<SubsetLayout> {
    let subset: HashSet<&str> = ids.iter().map(String::as_str).collect();

    let nodes: Vec<DagNodeSpec> = ids
        .iter()
        .map(|id| DagNodeSpec {
            id: id.clone(),
            width: config.node_width,
            height: config.node_height,
            order: graph.node_order(id),
        })
        .collect();

    let mut edges = Vec::new();
    for edge in &graph.edges {
        if subset.contains(edge.source_id.as_str()) && subset.contains(edge.target_id.as_str()) {
            edges.push(DagEdgeSpec {
                from: edge.source_id.clone(),
                to: edge.target_id.clone(),
            });
        }
    }

    let centers = engine.layout_dag(&nodes, &edges, &dag_options(config))?;

    let mut bounds = Bounds::empty();
    let mut corners: Vec<(String, Point)> = Vec::with_capacity(centers.len());
    for placement in centers {
        let x = placement.x - config.node_width / 2.0;
        let y = placement.y - config.node_height / 2.0;
        bounds.extend_rect(x, y, config.node_width, config.node_height);
        corners.push((placement.id, Point::new(x, y)));
    }

    let (origin_x, origin_y) = if bounds.is_empty() {
        (0.0, 0.0)
    } else {
        (bounds.min_x(), bounds.min_y())
    };
    let placements = corners
        .into_iter()
        .map(|(id, point)| (id, Point::new(point.x - origin_x, point.y - origin_y)))
        .collect();

    Ok(SubsetLayout {
        placements,
        width: bounds.width(),
        height: bounds.height(),
    })
}

/// Lays out the whole graph as one layered flow, anchored at the configured
/// origin.
pub(super) fn layout_layered(
    graph: &DiagramGraph,
    engine: &dyn DagEngine,
    config: &LayeredConfig,
) -> Result<PositionMap> {
    let mut positions = PositionMap::new();
    if graph.is_empty() {
        return Ok(positions);
    }
    let ids: Vec<String> = graph.node_ids().map(str::to_string).collect();
    let subset = layout_subset(graph, &ids, engine, config)?;
    for (id, point) in subset.placements {
        positions.insert(
            id,
            Point::new(point.x + config.origin_x, point.y + config.origin_y),
        );
    }
    Ok(positions)
}

/// Smart layout: each connected cluster gets its own layered flow, the
/// clusters line up left to right, and isolated nodes fall into a compact
/// grid below the cluster row. Any cluster failing the engine fails the
/// whole layout so a partial arrangement is never applied.
pub(super) fn layout_smart(
    graph: &DiagramGraph,
    engine: &dyn DagEngine,
    config: &LayeredConfig,
) -> Result<PositionMap> {
    let mut positions = PositionMap::new();
    if graph.is_empty() {
        return Ok(positions);
    }

    let partition = clusters::partition(graph);
    let cluster_y = config.origin_y;
    let mut cluster_x = config.origin_x;

    for (index, cluster) in partition.clusters.iter().enumerate() {
        let subset = layout_subset(graph, cluster, engine, config)?;
        debug!(
            "cluster {index}: {} nodes in a {:.0}x{:.0} flow",
            cluster.len(),
            subset.width,
            subset.height
        );
        for (id, point) in subset.placements {
            positions.insert(
                id,
                Point::new(
                    cluster_x + config.cluster_inset + point.x,
                    cluster_y + config.cluster_inset + point.y,
                ),
            );
        }
        let slot_width = subset.width + config.cluster_inset + config.cluster_margin_x;
        cluster_x += slot_width + config.cluster_gap;
    }

    let isolated_y = cluster_y + config.isolated_offset_y;
    let per_row = config.isolated_per_row.max(1);
    for (index, id) in partition.isolated.iter().enumerate() {
        let col = index % per_row;
        let row = index / per_row;
        positions.insert(
            id.clone(),
            Point::new(
                config.origin_x + col as f32 * config.isolated_step_x,
                isolated_y + row as f32 * config.isolated_step_y,
            ),
        );
    }

    Ok(positions)
}
