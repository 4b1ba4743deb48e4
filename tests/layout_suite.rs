use std::path::Path;

use archflow_layout::{
    DagreEngine, DiagramGraph, LayoutConfig, LayoutStrategy, MemoryStore, Point, PositionStore,
    RawRelationship, RawResource, Viewport, compute_layout, normalize, partition,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Fixture {
    resources: Vec<RawResource>,
    relationships: Vec<RawRelationship>,
}

fn load_fixture(name: &str) -> DiagramGraph {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let fixture: Fixture = serde_json::from_str(&input).expect("fixture parse failed");
    normalize(&fixture.resources, &fixture.relationships)
}

#[test]
fn all_fixtures_lay_out_under_every_strategy() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "dangling_edge.json",
        "islands.json",
        "multi_account.json",
        "pair.json",
        "two_tier_app.json",
    ];
    let engine = DagreEngine;
    let config = LayoutConfig::default();

    for name in candidates {
        let graph = load_fixture(name);
        assert!(!graph.is_empty(), "{name}: fixture has no nodes");
        for strategy in [
            LayoutStrategy::Hierarchical,
            LayoutStrategy::Layered,
            LayoutStrategy::Smart,
        ] {
            let layout = compute_layout(
                &graph,
                strategy,
                None,
                Viewport::default(),
                &engine,
                &config,
            )
            .expect("layout failed");
            assert_eq!(
                layout.positions.len(),
                graph.nodes.len(),
                "{name}: every node needs a position"
            );
            for (id, point) in &layout.positions {
                assert!(
                    point.x.is_finite() && point.y.is_finite(),
                    "{name}/{id}: non-finite position"
                );
            }
        }
    }
}

#[test]
fn empty_input_produces_an_empty_layout() {
    let graph = normalize(&[], &[]);
    let config = LayoutConfig::default();
    for strategy in [
        LayoutStrategy::Hierarchical,
        LayoutStrategy::TieredGrid,
        LayoutStrategy::Layered,
        LayoutStrategy::Smart,
    ] {
        let layout = compute_layout(
            &graph,
            strategy,
            None,
            Viewport::default(),
            &DagreEngine,
            &config,
        )
        .unwrap();
        assert!(layout.positions.is_empty());
        assert!(layout.containers.is_empty());
    }
}

#[test]
fn a_linked_pair_forms_a_single_cluster() {
    let graph = load_fixture("pair.json");
    let parts = partition(&graph);
    assert_eq!(parts.clusters.len(), 1);
    assert!(parts.isolated.is_empty());

    let layout = compute_layout(
        &graph,
        LayoutStrategy::Smart,
        None,
        Viewport::default(),
        &DagreEngine,
        &LayoutConfig::default(),
    )
    .unwrap();
    assert_eq!(layout.positions.len(), 2);
    assert_ne!(layout.positions["web"], layout.positions["db"]);
}

#[test]
fn unconnected_nodes_grid_below_the_cluster_row() {
    let graph = load_fixture("islands.json");
    let parts = partition(&graph);
    assert!(parts.clusters.is_empty());
    assert_eq!(parts.isolated.len(), 3);

    let config = LayoutConfig::default();
    let layout = compute_layout(
        &graph,
        LayoutStrategy::Smart,
        None,
        Viewport::default(),
        &DagreEngine,
        &config,
    )
    .unwrap();
    let expected_y = config.layered.origin_y + config.layered.isolated_offset_y;
    assert_eq!(
        layout.positions["s3-1"],
        Point::new(config.layered.origin_x, expected_y)
    );
    assert_eq!(
        layout.positions["s3-2"].x,
        config.layered.origin_x + config.layered.isolated_step_x
    );
    assert_eq!(layout.positions["s3-3"].y, expected_y);
}

#[test]
fn dangling_relationships_never_break_the_layout() {
    let graph = load_fixture("dangling_edge.json");
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1, "dangling relationships are dropped");

    let layout = compute_layout(
        &graph,
        LayoutStrategy::Smart,
        None,
        Viewport::default(),
        &DagreEngine,
        &LayoutConfig::default(),
    )
    .unwrap();
    assert_eq!(layout.positions.len(), 2);
}

#[test]
fn tiered_grid_leaves_containers_out() {
    let graph = load_fixture("two_tier_app.json");
    let layout = compute_layout(
        &graph,
        LayoutStrategy::TieredGrid,
        None,
        Viewport::default(),
        &DagreEngine,
        &LayoutConfig::default(),
    )
    .unwrap();
    assert_eq!(layout.positions.len(), graph.nodes.len() - 1);
    assert!(!layout.positions.contains_key("vpc-1"));
    assert!(layout.containers.is_empty());
}

#[test]
fn hierarchical_containers_nest_and_enclose() {
    let graph = load_fixture("multi_account.json");
    let config = LayoutConfig::default();
    let layout = compute_layout(
        &graph,
        LayoutStrategy::Hierarchical,
        None,
        Viewport::default(),
        &DagreEngine,
        &config,
    )
    .unwrap();

    let ids: Vec<&str> = layout.containers.iter().map(|c| c.id.as_str()).collect();
    for expected in [
        "account-111111111111",
        "account-222222222222",
        "account-unknown",
        "network-vpc-a",
        "network-vpc-b",
    ] {
        assert!(ids.contains(&expected), "missing container {expected}");
    }

    for (index, container) in layout.containers.iter().enumerate() {
        if let Some(parent_id) = &container.parent {
            let parent_index = layout
                .containers
                .iter()
                .position(|c| &c.id == parent_id)
                .expect("parent container exists");
            assert!(
                parent_index < index,
                "parent {parent_id} emitted after child {}",
                container.id
            );
            let parent = &layout.containers[parent_index];
            assert!(container.x >= parent.x && container.y >= parent.y);
            assert!(container.x + container.width <= parent.x + parent.width);
            assert!(container.y + container.height <= parent.y + parent.height);
        }
    }

    let vpc_a = layout
        .containers
        .iter()
        .find(|c| c.id == "network-vpc-a")
        .unwrap();
    for id in ["app-1", "app-2"] {
        let point = layout.positions[id];
        assert!(point.x >= vpc_a.x && point.y >= vpc_a.y);
        assert!(point.x + config.hierarchy.cell_width <= vpc_a.x + vpc_a.width);
        assert!(point.y + config.hierarchy.cell_height <= vpc_a.y + vpc_a.height);
    }
}

#[test]
fn saved_positions_survive_reload_and_reshape_containers() {
    let graph = load_fixture("multi_account.json");
    let config = LayoutConfig::default();
    let fresh = compute_layout(
        &graph,
        LayoutStrategy::Hierarchical,
        None,
        Viewport::default(),
        &DagreEngine,
        &config,
    )
    .unwrap();

    let mut store = PositionStore::new(MemoryStore::new());
    store.save(&fresh.positions);

    // A drag merges one node's position and leaves the rest alone.
    store.save_node("app-1", Point::new(5000.0, 4000.0));
    let saved = store.load();
    assert_eq!(saved.len(), graph.nodes.len());
    assert_eq!(saved["app-2"], fresh.positions["app-2"]);

    let relaid = compute_layout(
        &graph,
        LayoutStrategy::Hierarchical,
        Some(&saved),
        Viewport::default(),
        &DagreEngine,
        &config,
    )
    .unwrap();
    assert_eq!(relaid.positions["app-1"], Point::new(5000.0, 4000.0));
    assert_eq!(relaid.positions["app-2"], fresh.positions["app-2"]);

    // The dragged node's container stretched out to keep enclosing it.
    let vpc_a = relaid
        .containers
        .iter()
        .find(|c| c.id == "network-vpc-a")
        .unwrap();
    let dragged = relaid.positions["app-1"];
    assert!(dragged.x >= vpc_a.x && dragged.y >= vpc_a.y);
    assert!(dragged.x + config.hierarchy.cell_width <= vpc_a.x + vpc_a.width);
    assert!(dragged.y + config.hierarchy.cell_height <= vpc_a.y + vpc_a.height);
}

#[test]
fn one_level_undo_restores_the_prior_arrangement() {
    let graph = load_fixture("pair.json");
    let first = compute_layout(
        &graph,
        LayoutStrategy::Smart,
        None,
        Viewport::default(),
        &DagreEngine,
        &LayoutConfig::default(),
    )
    .unwrap();

    let mut store = PositionStore::new(MemoryStore::new());
    store.save(&first.positions);

    // A second layout run snapshots the current map before overwriting it.
    let current = store.load();
    store.save_previous(&current);
    let mut moved = first.positions.clone();
    moved.insert("web".to_string(), Point::new(999.0, 999.0));
    store.save(&moved);
    assert_eq!(store.load()["web"], Point::new(999.0, 999.0));

    let restored = store.undo().expect("snapshot exists");
    assert_eq!(restored, first.positions);
    assert_eq!(store.load(), first.positions);
    assert!(store.undo().is_none(), "undo is single-level");
}

#[test]
fn layouts_are_reproducible_across_runs() {
    let config = LayoutConfig::default();
    for name in ["multi_account.json", "two_tier_app.json"] {
        let first = compute_layout(
            &load_fixture(name),
            LayoutStrategy::Smart,
            None,
            Viewport::default(),
            &DagreEngine,
            &config,
        )
        .unwrap();
        let second = compute_layout(
            &load_fixture(name),
            LayoutStrategy::Smart,
            None,
            Viewport::default(),
            &DagreEngine,
            &config,
        )
        .unwrap();
        assert_eq!(first.positions, second.positions, "{name}: not reproducible");
    }
}
