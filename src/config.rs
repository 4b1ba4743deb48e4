use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hierarchical account/network layout tuning. All lengths are pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Fixed column count for member grids inside a container.
    pub columns: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    pub cell_gap: f32,
    /// Width every network container gets in fresh-grid mode.
    pub network_min_width: f32,
    pub network_min_height: f32,
    /// Extra height added above the member rows for the container header.
    pub network_height_pad: f32,
    /// Vertical offset of the first member row inside a network container.
    pub network_member_offset_y: f32,
    /// Horizontal inset of network containers inside their account.
    pub network_inset_x: f32,
    /// Vertical offset of the first network slot inside an account.
    pub network_start_y: f32,
    /// Vertical gap between stacked network slots.
    pub network_gap: f32,
    /// Horizontal inset for members placed directly in the account.
    pub direct_inset_x: f32,
    pub account_origin_x: f32,
    pub account_origin_y: f32,
    /// Width an account adds around its widest child.
    pub account_pad_width: f32,
    pub account_pad_bottom: f32,
    /// Horizontal gap between adjacent account containers.
    pub account_gap: f32,
    /// Saved-position mode: padding around member bounding boxes.
    pub network_pad_x: f32,
    pub network_pad_y: f32,
    pub account_pad_x: f32,
    pub account_pad_y: f32,
    /// Saved-position mode: minimum container sizes.
    pub network_floor_width: f32,
    pub network_floor_height: f32,
    pub account_floor_width: f32,
    pub account_floor_height: f32,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        HierarchyConfig {
            columns: 5,
            cell_width: 160.0,
            cell_height: 140.0,
            cell_gap: 20.0,
            network_min_width: 900.0,
            network_min_height: 400.0,
            network_height_pad: 80.0,
            network_member_offset_y: 70.0,
            network_inset_x: 60.0,
            network_start_y: 120.0,
            network_gap: 40.0,
            direct_inset_x: 80.0,
            account_origin_x: 40.0,
            account_origin_y: 40.0,
            account_pad_width: 120.0,
            account_pad_bottom: 30.0,
            account_gap: 40.0,
            network_pad_x: 30.0,
            network_pad_y: 50.0,
            account_pad_x: 40.0,
            account_pad_y: 60.0,
            network_floor_width: 200.0,
            network_floor_height: 150.0,
            account_floor_width: 300.0,
            account_floor_height: 200.0,
        }
    }
}

/// Viewport-filling tiered grid tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieredConfig {
    /// Margin kept clear on every viewport edge.
    pub margin: f32,
    pub min_cell_width: f32,
    pub min_cell_height: f32,
    pub node_width: f32,
    pub node_height: f32,
    /// Column floor so small graphs still spread horizontally.
    pub min_columns: usize,
}

impl Default for TieredConfig {
    fn default() -> Self {
        TieredConfig {
            margin: 40.0,
            min_cell_width: 120.0,
            min_cell_height: 100.0,
            node_width: 90.0,
            node_height: 70.0,
            min_columns: 6,
        }
    }
}

/// Layered (flow-direction) layout tuning, including the per-cluster
/// packing used by the smart strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayeredConfig {
    /// Rank direction token: "lr", "rl", "tb" or "bt".
    pub rank_direction: String,
    pub node_width: f32,
    pub node_height: f32,
    pub node_sep: f32,
    pub rank_sep: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Top-left corner of the whole layered arrangement.
    pub origin_x: f32,
    pub origin_y: f32,
    /// Inset of a cluster's content inside its slot.
    pub cluster_inset: f32,
    /// Trailing margins a cluster slot adds beyond its content.
    pub cluster_margin_x: f32,
    pub cluster_margin_y: f32,
    /// Horizontal gap between cluster slots.
    pub cluster_gap: f32,
    pub isolated_per_row: usize,
    pub isolated_step_x: f32,
    pub isolated_step_y: f32,
    /// Vertical drop of the isolated-node grid below the cluster row.
    pub isolated_offset_y: f32,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        LayeredConfig {
            rank_direction: "lr".to_string(),
            node_width: 90.0,
            node_height: 70.0,
            node_sep: 40.0,
            rank_sep: 80.0,
            margin_x: 20.0,
            margin_y: 20.0,
            origin_x: 50.0,
            origin_y: 150.0,
            cluster_inset: 40.0,
            cluster_margin_x: 50.0,
            cluster_margin_y: 30.0,
            cluster_gap: 100.0,
            isolated_per_row: 8,
            isolated_step_x: 110.0,
            isolated_step_y: 90.0,
            isolated_offset_y: 400.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub hierarchy: HierarchyConfig,
    pub tiered: TieredConfig,
    pub layered: LayeredConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            hierarchy: HierarchyConfig::default(),
            tiered: TieredConfig::default(),
            layered: LayeredConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HierarchyConfigFile {
    columns: Option<usize>,
    cell_width: Option<f32>,
    cell_height: Option<f32>,
    cell_gap: Option<f32>,
    network_min_width: Option<f32>,
    network_min_height: Option<f32>,
    network_height_pad: Option<f32>,
    network_member_offset_y: Option<f32>,
    network_inset_x: Option<f32>,
    network_start_y: Option<f32>,
    network_gap: Option<f32>,
    direct_inset_x: Option<f32>,
    account_origin_x: Option<f32>,
    account_origin_y: Option<f32>,
    account_pad_width: Option<f32>,
    account_pad_bottom: Option<f32>,
    account_gap: Option<f32>,
    network_pad_x: Option<f32>,
    network_pad_y: Option<f32>,
    account_pad_x: Option<f32>,
    account_pad_y: Option<f32>,
    network_floor_width: Option<f32>,
    network_floor_height: Option<f32>,
    account_floor_width: Option<f32>,
    account_floor_height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TieredConfigFile {
    margin: Option<f32>,
    min_cell_width: Option<f32>,
    min_cell_height: Option<f32>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    min_columns: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayeredConfigFile {
    rank_direction: Option<String>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_sep: Option<f32>,
    rank_sep: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
    origin_x: Option<f32>,
    origin_y: Option<f32>,
    cluster_inset: Option<f32>,
    cluster_margin_x: Option<f32>,
    cluster_margin_y: Option<f32>,
    cluster_gap: Option<f32>,
    isolated_per_row: Option<usize>,
    isolated_step_x: Option<f32>,
    isolated_step_y: Option<f32>,
    isolated_offset_y: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    hierarchy: Option<HierarchyConfigFile>,
    tiered: Option<TieredConfigFile>,
    layered: Option<LayeredConfigFile>,
}

/// Loads the layout configuration, merging an optional JSON file over the
/// built-in defaults. Absent fields keep their defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(hierarchy) = parsed.hierarchy {
        if let Some(v) = hierarchy.columns {
            config.layout.hierarchy.columns = v.max(1);
        }
        if let Some(v) = hierarchy.cell_width {
            config.layout.hierarchy.cell_width = v;
        }
        if let Some(v) = hierarchy.cell_height {
            config.layout.hierarchy.cell_height = v;
        }
        if let Some(v) = hierarchy.cell_gap {
            config.layout.hierarchy.cell_gap = v;
        }
        if let Some(v) = hierarchy.network_min_width {
            config.layout.hierarchy.network_min_width = v;
        }
        if let Some(v) = hierarchy.network_min_height {
            config.layout.hierarchy.network_min_height = v;
        }
        if let Some(v) = hierarchy.network_height_pad {
            config.layout.hierarchy.network_height_pad = v;
        }
        if let Some(v) = hierarchy.network_member_offset_y {
            config.layout.hierarchy.network_member_offset_y = v;
        }
        if let Some(v) = hierarchy.network_inset_x {
            config.layout.hierarchy.network_inset_x = v;
        }
        if let Some(v) = hierarchy.network_start_y {
            config.layout.hierarchy.network_start_y = v;
        }
        if let Some(v) = hierarchy.network_gap {
            config.layout.hierarchy.network_gap = v;
        }
        if let Some(v) = hierarchy.direct_inset_x {
            config.layout.hierarchy.direct_inset_x = v;
        }
        if let Some(v) = hierarchy.account_origin_x {
            config.layout.hierarchy.account_origin_x = v;
        }
        if let Some(v) = hierarchy.account_origin_y {
            config.layout.hierarchy.account_origin_y = v;
        }
        if let Some(v) = hierarchy.account_pad_width {
            config.layout.hierarchy.account_pad_width = v;
        }
        if let Some(v) = hierarchy.account_pad_bottom {
            config.layout.hierarchy.account_pad_bottom = v;
        }
        if let Some(v) = hierarchy.account_gap {
            config.layout.hierarchy.account_gap = v;
        }
        if let Some(v) = hierarchy.network_pad_x {
            config.layout.hierarchy.network_pad_x = v;
        }
        if let Some(v) = hierarchy.network_pad_y {
            config.layout.hierarchy.network_pad_y = v;
        }
        if let Some(v) = hierarchy.account_pad_x {
            config.layout.hierarchy.account_pad_x = v;
        }
        if let Some(v) = hierarchy.account_pad_y {
            config.layout.hierarchy.account_pad_y = v;
        }
        if let Some(v) = hierarchy.network_floor_width {
            config.layout.hierarchy.network_floor_width = v;
        }
        if let Some(v) = hierarchy.network_floor_height {
            config.layout.hierarchy.network_floor_height = v;
        }
        if let Some(v) = hierarchy.account_floor_width {
            config.layout.hierarchy.account_floor_width = v;
        }
        if let Some(v) = hierarchy.account_floor_height {
            config.layout.hierarchy.account_floor_height = v;
        }
    }

    if let Some(tiered) = parsed.tiered {
        if let Some(v) = tiered.margin {
            config.layout.tiered.margin = v;
        }
        if let Some(v) = tiered.min_cell_width {
            config.layout.tiered.min_cell_width = v;
        }
        if let Some(v) = tiered.min_cell_height {
            config.layout.tiered.min_cell_height = v;
        }
        if let Some(v) = tiered.node_width {
            config.layout.tiered.node_width = v;
        }
        if let Some(v) = tiered.node_height {
            config.layout.tiered.node_height = v;
        }
        if let Some(v) = tiered.min_columns {
            config.layout.tiered.min_columns = v.max(1);
        }
    }

    if let Some(layered) = parsed.layered {
        if let Some(v) = layered.rank_direction {
            config.layout.layered.rank_direction = v;
        }
        if let Some(v) = layered.node_width {
            config.layout.layered.node_width = v;
        }
        if let Some(v) = layered.node_height {
            config.layout.layered.node_height = v;
        }
        if let Some(v) = layered.node_sep {
            config.layout.layered.node_sep = v;
        }
        if let Some(v) = layered.rank_sep {
            config.layout.layered.rank_sep = v;
        }
        if let Some(v) = layered.margin_x {
            config.layout.layered.margin_x = v;
        }
        if let Some(v) = layered.margin_y {
            config.layout.layered.margin_y = v;
        }
        if let Some(v) = layered.origin_x {
            config.layout.layered.origin_x = v;
        }
        if let Some(v) = layered.origin_y {
            config.layout.layered.origin_y = v;
        }
        if let Some(v) = layered.cluster_inset {
            config.layout.layered.cluster_inset = v;
        }
        if let Some(v) = layered.cluster_margin_x {
            config.layout.layered.cluster_margin_x = v;
        }
        if let Some(v) = layered.cluster_margin_y {
            config.layout.layered.cluster_margin_y = v;
        }
        if let Some(v) = layered.cluster_gap {
            config.layout.layered.cluster_gap = v;
        }
        if let Some(v) = layered.isolated_per_row {
            config.layout.layered.isolated_per_row = v.max(1);
        }
        if let Some(v) = layered.isolated_step_x {
            config.layout.layered.isolated_step_x = v;
        }
        if let Some(v) = layered.isolated_step_y {
            config.layout.layered.isolated_step_y = v;
        }
        if let Some(v) = layered.isolated_offset_y {
            config.layout.layered.isolated_offset_y = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.hierarchy.columns, 5);
        assert_eq!(config.layout.tiered.min_columns, 6);
        assert_eq!(config.layout.layered.rank_direction, "lr");
    }

    #[test]
    fn file_overrides_merge_over_defaults() {
        let path = std::env::temp_dir().join(format!(
            "archflow-config-test-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{
                "hierarchy": { "columns": 3, "networkMinWidth": 700 },
                "layered": { "rankDirection": "tb" }
            }"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layout.hierarchy.columns, 3);
        assert_eq!(config.layout.hierarchy.network_min_width, 700.0);
        assert_eq!(config.layout.hierarchy.cell_width, 160.0);
        assert_eq!(config.layout.layered.rank_direction, "tb");
        assert_eq!(config.layout.tiered.margin, 40.0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "archflow-config-bad-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_config(Some(&path)).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
