use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// JSON view of a computed layout, for tooling and snapshot tests.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub strategy: String,
    pub positions: Vec<PositionDump>,
    pub containers: Vec<ContainerDump>,
}

#[derive(Debug, Serialize)]
pub struct PositionDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct ContainerDump {
    pub id: String,
    pub label: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<String>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, strategy: &str) -> Self {
        let positions = layout
            .positions
            .iter()
            .map(|(id, point)| PositionDump {
                id: id.clone(),
                x: point.x,
                y: point.y,
            })
            .collect();
        let containers = layout
            .containers
            .iter()
            .map(|container| ContainerDump {
                id: container.id.clone(),
                label: container.label.clone(),
                kind: container.kind.name().to_string(),
                parent: container.parent.clone(),
                x: container.x,
                y: container.y,
                width: container.width,
                height: container.height,
                nodes: container.nodes.clone(),
            })
            .collect();
        LayoutDump {
            strategy: strategy.to_string(),
            positions,
            containers,
        }
    }
}

/// Writes the dump to the given path, or to stdout for `None` or `-`.
pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &Layout,
    strategy: &str,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, strategy);
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        _ => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Point;
    use crate::layout::{Container, ContainerKind};

    #[test]
    fn dump_preserves_container_order_and_kind_names() {
        let mut layout = Layout::default();
        layout
            .positions
            .insert("web".to_string(), Point::new(1.0, 2.0));
        layout.containers.push(Container {
            id: "account-a".to_string(),
            label: "a".to_string(),
            kind: ContainerKind::Account,
            parent: None,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            nodes: Vec::new(),
        });
        layout.containers.push(Container {
            id: "network-v".to_string(),
            label: "v".to_string(),
            kind: ContainerKind::Network,
            parent: Some("account-a".to_string()),
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 50.0,
            nodes: vec!["web".to_string()],
        });

        let dump = LayoutDump::from_layout(&layout, "hierarchical");
        assert_eq!(dump.strategy, "hierarchical");
        assert_eq!(dump.containers[0].kind, "account");
        assert_eq!(dump.containers[1].parent.as_deref(), Some("account-a"));

        let encoded = serde_json::to_string(&dump).unwrap();
        assert!(encoded.contains("\"network-v\""));
        // Top-level containers leave the parent field out entirely.
        let account_fragment = encoded.split("network-v").next().unwrap();
        assert!(!account_fragment.contains("\"parent\""));
    }
}
