use crate::config::TieredConfig;
use crate::graph::{DiagramGraph, Point, PositionMap, Resource};

use super::Viewport;

/// Resource types rendered as containers rather than cards. These stay out
/// of the tiered grid entirely.
pub const CONTAINER_TYPES: &[&str] = &[
    "vpc",
    "subnet",
    "internet-gateway",
    "nat-gateway",
    "route-table",
    "network-acl",
];

/// Horizontal bands of the tiered grid, ordered top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Entry,
    Compute,
    Application,
    Data,
    Storage,
    Operations,
}

impl Tier {
    pub fn name(self) -> &'static str {
        match self {
            Tier::Entry => "entry",
            Tier::Compute => "compute",
            Tier::Application => "application",
            Tier::Data => "data",
            Tier::Storage => "storage",
            Tier::Operations => "operations",
        }
    }
}

const TIER_KEYWORDS: &[(Tier, &[&str])] = &[
    (
        Tier::Entry,
        &[
            "gateway",
            "cloudfront",
            "route53",
            "load-balancer",
            "alb",
            "elb",
            "waf",
        ],
    ),
    (
        Tier::Compute,
        &["ec2", "lambda", "ecs", "eks", "fargate", "batch", "instance"],
    ),
    (
        Tier::Application,
        &[
            "beanstalk",
            "apprunner",
            "step-functions",
            "sns",
            "sqs",
            "eventbridge",
            "app",
            "service",
        ],
    ),
    (
        Tier::Data,
        &[
            "rds",
            "aurora",
            "dynamodb",
            "redshift",
            "elasticache",
            "neptune",
            "database",
            "db",
        ],
    ),
    (
        Tier::Storage,
        &["s3", "efs", "fsx", "glacier", "backup", "bucket", "storage"],
    ),
    (
        Tier::Operations,
        &[
            "cloudwatch",
            "cloudtrail",
            "monitoring",
            "logging",
            "ssm",
            "iam",
            "kms",
            "secrets",
            "config",
        ],
    ),
];

/// True for types that render as containers in the hierarchical view.
pub fn is_container_type(resource_type: &str) -> bool {
    let lowered = resource_type.to_lowercase();
    CONTAINER_TYPES.iter().any(|candidate| lowered == *candidate)
}

/// Assigns a tier by matching the resource type, then the name, against the
/// keyword table. First matching tier wins; anything unmatched counts as
/// compute.
pub fn classify(resource: &Resource) -> Tier {
    let type_lowered = resource.resource_type.to_lowercase();
    for (tier, keywords) in TIER_KEYWORDS {
        if keywords.iter().any(|keyword| type_lowered.contains(keyword)) {
            return *tier;
        }
    }
    if let Some(name) = &resource.name {
        let name_lowered = name.to_lowercase();
        for (tier, keywords) in TIER_KEYWORDS {
            if keywords.iter().any(|keyword| name_lowered.contains(keyword)) {
                return *tier;
            }
        }
    }
    Tier::Compute
}

/// Places every non-container resource on a tier-sorted grid sized to fill
/// the viewport. Nodes in the same tier keep their input order.
pub(super) fn layout_tiered_grid(
    graph: &DiagramGraph,
    viewport: Viewport,
    config: &TieredConfig,
) -> PositionMap {
    let mut positions = PositionMap::new();
    let mut placeable: Vec<&Resource> = graph
        .nodes
        .iter()
        .filter(|node| !is_container_type(&node.resource_type))
        .collect();
    if placeable.is_empty() {
        return positions;
    }
    placeable.sort_by_key(|node| classify(node));

    let count = placeable.len();
    let available_width = (viewport.width - config.margin * 2.0).max(config.min_cell_width);
    let available_height = (viewport.height - config.margin * 2.0).max(config.min_cell_height);
    let aspect_ratio = available_width / available_height;

    let mut cols = (count as f32 * aspect_ratio).sqrt().ceil() as usize;
    cols = cols.max(count.min(config.min_columns)).max(1);
    let rows = count.div_ceil(cols);

    let cell_width = (available_width / cols as f32).max(config.min_cell_width);
    let cell_height = (available_height / rows as f32).max(config.min_cell_height);

    for (index, node) in placeable.iter().enumerate() {
        let col = index % cols;
        let row = index / cols;
        let x = config.margin + col as f32 * cell_width + (cell_width - config.node_width) / 2.0;
        let y = config.margin + row as f32 * cell_height + (cell_height - config.node_height) / 2.0;
        positions.insert(node.id.clone(), Point::new(x, y));
    }
    positions
}
