use std::collections::HashMap;

use tracing::debug;

use crate::graph::DiagramGraph;

/// Connected components of the diagram, split into clusters (two or more
/// nodes) and isolated singletons. Both lists follow first-occurrence order
/// of the input nodes.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub clusters: Vec<Vec<String>>,
    pub isolated: Vec<String>,
    membership: HashMap<String, usize>,
}

impl Partition {
    /// Index into `clusters` for the node, `None` for isolated nodes.
    pub fn cluster_of(&self, node_id: &str) -> Option<usize> {
        self.membership.get(node_id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.clusters.iter().map(Vec::len).sum::<usize>() + self.isolated.len()
    }
}

struct DisjointSet {
    parent: HashMap<String, String>,
    rank: HashMap<String, usize>,
}

impl DisjointSet {
    fn new() -> Self {
        DisjointSet {
            parent: HashMap::new(),
            rank: HashMap::new(),
        }
    }

    fn find(&mut self, id: &str) -> String {
        let parent = match self.parent.get(id) {
            Some(parent) => parent.clone(),
            None => {
                self.parent.insert(id.to_string(), id.to_string());
                return id.to_string();
            }
        };
        if parent == id {
            return parent;
        }
        let root = self.find(&parent);
        // Path compression keeps repeated finds near constant time.
        self.parent.insert(id.to_string(), root.clone());
        root
    }

    fn union(&mut self, a: &str, b: &str) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        let rank_a = self.rank.get(&root_a).copied().unwrap_or(0);
        let rank_b = self.rank.get(&root_b).copied().unwrap_or(0);
        if rank_a < rank_b {
            self.parent.insert(root_a, root_b);
        } else if rank_a > rank_b {
            self.parent.insert(root_b, root_a);
        } else {
            self.parent.insert(root_b, root_a.clone());
            self.rank.insert(root_a, rank_a + 1);
        }
    }
}

/// Partitions the graph into connected components via union-find. A node
/// with no surviving edges is isolated even if the raw input mentioned it
/// in a dangling relationship.
pub fn partition(graph: &DiagramGraph) -> Partition {
    let mut sets = DisjointSet::new();
    for edge in &graph.edges {
        sets.union(&edge.source_id, &edge.target_id);
    }

    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    for node in &graph.nodes {
        let root = sets.find(&node.id);
        let index = *group_index.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(node.id.clone());
    }

    let mut clusters = Vec::new();
    let mut isolated = Vec::new();
    let mut membership = HashMap::new();
    for group in groups {
        if group.len() >= 2 {
            for id in &group {
                membership.insert(id.clone(), clusters.len());
            }
            clusters.push(group);
        } else if let Some(id) = group.into_iter().next() {
            isolated.push(id);
        }
    }

    debug!(
        "partitioned {} nodes into {} clusters and {} isolated",
        graph.nodes.len(),
        clusters.len(),
        isolated.len()
    );

    Partition {
        clusters,
        isolated,
        membership,
    }
}
