use std::collections::HashMap;

use tracing::debug;

use crate::config::HierarchyConfig;
use crate::graph::{DiagramGraph, Point, PositionMap, Resource};

use super::{Bounds, Container, ContainerKind, Layout};

const UNKNOWN_ACCOUNT: &str = "unknown";
const NO_NETWORK: &str = "no-vpc";

struct NetworkGroup<'a> {
    /// `None` for members that sit directly in the account.
    key: Option<String>,
    members: Vec<&'a Resource>,
}

struct AccountGroup<'a> {
    key: String,
    groups: Vec<NetworkGroup<'a>>,
    group_index: HashMap<String, usize>,
}

/// Groups nodes by account, then by network within each account. Group
/// order is the first occurrence of each key in the node list, so layouts
/// are stable across runs.
fn group_by_ownership(graph: &DiagramGraph) -> Vec<AccountGroup<'_>> {
    let mut accounts: Vec<AccountGroup<'_>> = Vec::new();
    let mut account_index: HashMap<String, usize> = HashMap::new();

    for node in &graph.nodes {
        let account_key = node
            .account_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string());
        let account_slot = *account_index.entry(account_key.clone()).or_insert_with(|| {
            accounts.push(AccountGroup {
                key: account_key.clone(),
                groups: Vec::new(),
                group_index: HashMap::new(),
            });
            accounts.len() - 1
        });

        let AccountGroup {
            groups,
            group_index,
            ..
        } = &mut accounts[account_slot];
        let network_key = node
            .network_id
            .clone()
            .unwrap_or_else(|| NO_NETWORK.to_string());
        let group_slot = *group_index.entry(network_key).or_insert_with(|| {
            groups.push(NetworkGroup {
                key: node.network_id.clone(),
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[group_slot].members.push(node);
    }

    accounts
}

/// Two-level account/network layout. With a saved position map covering
/// every node, containers are rebuilt around the saved positions; otherwise
/// members land on a fresh fixed grid.
pub(super) fn layout_hierarchical(
    graph: &DiagramGraph,
    saved: Option<&PositionMap>,
    config: &HierarchyConfig,
) -> Layout {
    if graph.is_empty() {
        return Layout::default();
    }
    if let Some(saved) = saved {
        if !saved.is_empty() && graph.nodes.iter().all(|node| saved.contains_key(&node.id)) {
            debug!("hierarchical layout reusing {} saved positions", saved.len());
            return layout_from_saved(graph, saved, config);
        }
    }
    layout_fresh_grid(graph, config)
}

fn layout_fresh_grid(graph: &DiagramGraph, config: &HierarchyConfig) -> Layout {
    let accounts = group_by_ownership(graph);
    let columns = config.columns.max(1);
    let mut positions = PositionMap::new();
    let mut containers: Vec<Container> = Vec::new();

    let mut account_x = config.account_origin_x;
    let account_y = config.account_origin_y;

    for account in &accounts {
        let account_container_id = format!("account-{}", account.key);
        let mut network_containers: Vec<Container> = Vec::new();
        let mut slot_y = config.network_start_y;
        let mut max_child_width = 0.0f32;

        for group in &account.groups {
            let rows = group.members.len().div_ceil(columns).max(1);
            // Network boxes keep the full-grid width even when sparsely
            // filled, so stacked networks line up.
            let width = (columns as f32 * config.cell_width
                + (columns as f32 + 1.0) * config.cell_gap)
                .max(config.network_min_width);
            let height = (rows as f32 * config.cell_height
                + (rows as f32 + 1.0) * config.cell_gap
                + config.network_height_pad)
                .max(config.network_min_height);

            match &group.key {
                Some(network_id) => {
                    let origin_x = account_x + config.network_inset_x;
                    let origin_y = account_y + slot_y;
                    for (index, member) in group.members.iter().enumerate() {
                        let col = index % columns;
                        let row = index / columns;
                        positions.insert(
                            member.id.clone(),
                            Point::new(
                                origin_x
                                    + config.cell_gap
                                    + col as f32 * (config.cell_width + config.cell_gap),
                                origin_y
                                    + config.network_member_offset_y
                                    + row as f32 * (config.cell_height + config.cell_gap),
                            ),
                        );
                    }
                    network_containers.push(Container {
                        id: format!("network-{network_id}"),
                        label: network_id.clone(),
                        kind: ContainerKind::Network,
                        parent: Some(account_container_id.clone()),
                        x: origin_x,
                        y: origin_y,
                        width,
                        height,
                        nodes: group.members.iter().map(|member| member.id.clone()).collect(),
                    });
                }
                None => {
                    for (index, member) in group.members.iter().enumerate() {
                        let col = index % columns;
                        let row = index / columns;
                        positions.insert(
                            member.id.clone(),
                            Point::new(
                                account_x
                                    + config.direct_inset_x
                                    + config.cell_gap
                                    + col as f32 * (config.cell_width + config.cell_gap),
                                account_y
                                    + slot_y
                                    + row as f32 * (config.cell_height + config.cell_gap),
                            ),
                        );
                    }
                }
            }

            slot_y += height + config.network_gap;
            max_child_width = max_child_width.max(width);
        }

        containers.push(Container {
            id: account_container_id,
            label: account.key.clone(),
            kind: ContainerKind::Account,
            parent: None,
            x: account_x,
            y: account_y,
            width: max_child_width + config.account_pad_width,
            height: slot_y + config.account_pad_bottom,
            nodes: direct_member_ids(account),
        });
        containers.append(&mut network_containers);

        account_x += max_child_width + config.account_pad_width + config.account_gap;
    }

    Layout {
        positions,
        containers,
    }
}

fn layout_from_saved(
    graph: &DiagramGraph,
    saved: &PositionMap,
    config: &HierarchyConfig,
) -> Layout {
    let accounts = group_by_ownership(graph);
    let mut positions = PositionMap::new();
    for node in &graph.nodes {
        if let Some(point) = saved.get(&node.id) {
            positions.insert(node.id.clone(), *point);
        }
    }

    let mut containers: Vec<Container> = Vec::new();
    for account in &accounts {
        let account_container_id = format!("account-{}", account.key);
        let mut network_containers: Vec<Container> = Vec::new();
        let mut account_bounds = Bounds::empty();

        for group in &account.groups {
            let mut member_bounds = Bounds::empty();
            for member in &group.members {
                if let Some(point) = positions.get(&member.id) {
                    member_bounds.extend_rect(
                        point.x,
                        point.y,
                        config.cell_width,
                        config.cell_height,
                    );
                }
            }
            if member_bounds.is_empty() {
                continue;
            }
            match &group.key {
                Some(network_id) => {
                    let padded = member_bounds
                        .padded(config.network_pad_x, config.network_pad_y)
                        .with_min_size(config.network_floor_width, config.network_floor_height);
                    account_bounds.extend_bounds(&padded);
                    network_containers.push(Container {
                        id: format!("network-{network_id}"),
                        label: network_id.clone(),
                        kind: ContainerKind::Network,
                        parent: Some(account_container_id.clone()),
                        x: padded.min_x(),
                        y: padded.min_y(),
                        width: padded.width(),
                        height: padded.height(),
                        nodes: group.members.iter().map(|member| member.id.clone()).collect(),
                    });
                }
                None => account_bounds.extend_bounds(&member_bounds),
            }
        }

        if account_bounds.is_empty() {
            continue;
        }
        let padded = account_bounds
            .padded(config.account_pad_x, config.account_pad_y)
            .with_min_size(config.account_floor_width, config.account_floor_height);
        containers.push(Container {
            id: account_container_id,
            label: account.key.clone(),
            kind: ContainerKind::Account,
            parent: None,
            x: padded.min_x(),
            y: padded.min_y(),
            width: padded.width(),
            height: padded.height(),
            nodes: direct_member_ids(account),
        });
        containers.append(&mut network_containers);
    }

    Layout {
        positions,
        containers,
    }
}

fn direct_member_ids(account: &AccountGroup<'_>) -> Vec<String> {
    account
        .groups
        .iter()
        .filter(|group| group.key.is_none())
        .flat_map(|group| group.members.iter().map(|member| member.id.clone()))
        .collect()
}
