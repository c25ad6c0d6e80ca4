//! Static network topology served to the topology widget.

use serde::{Deserialize, Serialize};

/// Role of a node in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Plant,
    Substation,
    LoadCenter,
}

/// One node with its fixed layout position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
}

/// Directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyLink {
    pub source: String,
    pub target: String,
}

/// The full network graph the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub nodes: Vec<TopologyNode>,
    pub links: Vec<TopologyLink>,
}

impl Topology {
    /// The reference grid: four plants feeding five substations feeding
    /// four load centers, laid out left to right.
    pub fn reference_grid() -> Self {
        fn node(id: &str, name: &str, kind: NodeKind, x: f64, y: f64) -> TopologyNode {
            TopologyNode {
                id: id.to_string(),
                name: name.to_string(),
                kind,
                x,
                y,
            }
        }
        fn link(source: &str, target: &str) -> TopologyLink {
            TopologyLink {
                source: source.to_string(),
                target: target.to_string(),
            }
        }

        let nodes = vec![
            node("plant-1", "Thermal Plant 1", NodeKind::Plant, 100.0, 80.0),
            node("plant-2", "Thermal Plant 2", NodeKind::Plant, 100.0, 160.0),
            node("plant-3", "Hydro Plant", NodeKind::Plant, 100.0, 240.0),
            node("plant-4", "Wind Farm", NodeKind::Plant, 100.0, 320.0),
            node("sub-1", "Substation North", NodeKind::Substation, 300.0, 100.0),
            node("sub-2", "Substation Central", NodeKind::Substation, 300.0, 200.0),
            node("sub-3", "Substation South", NodeKind::Substation, 300.0, 300.0),
            node("sub-4", "Substation East", NodeKind::Substation, 400.0, 150.0),
            node("sub-5", "Substation West", NodeKind::Substation, 400.0, 250.0),
            node("load-1", "Industrial Park", NodeKind::LoadCenter, 600.0, 80.0),
            node("load-2", "City Center", NodeKind::LoadCenter, 600.0, 160.0),
            node("load-3", "Harbor District", NodeKind::LoadCenter, 600.0, 240.0),
            node("load-4", "Rail Hub", NodeKind::LoadCenter, 600.0, 320.0),
        ];

        let links = vec![
            link("plant-1", "sub-1"),
            link("plant-2", "sub-2"),
            link("plant-3", "sub-3"),
            link("plant-4", "sub-3"),
            link("sub-1", "sub-4"),
            link("sub-2", "sub-4"),
            link("sub-2", "sub-5"),
            link("sub-3", "sub-5"),
            link("sub-4", "load-1"),
            link("sub-4", "load-2"),
            link("sub-5", "load-3"),
            link("sub-5", "load-4"),
        ];

        Self { nodes, links }
    }
}
