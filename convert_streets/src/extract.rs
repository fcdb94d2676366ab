use std::collections::BTreeMap;

use geom::LonLat;
use sgutil::{Counter, Timer};

use crate::osm::{self, NodeID, WayID};
use crate::osm_reader::{Document, Node, Way};
use crate::ConvertError;

/// A geographic point retained for the batch. Immutable once built; junction-ness lives in the
/// separate `Counter` from `count_touches`.
#[derive(Clone, Debug)]
pub struct Point {
    pub lon_lat: LonLat,
    /// Empty if the node is unnamed
    pub name: String,
}

#[derive(Debug)]
pub struct Road {
    pub nodes: Vec<NodeID>,
    /// Empty if the way is unnamed
    pub name: String,
}

#[derive(Debug)]
pub struct OsmExtract {
    pub points: BTreeMap<NodeID, Point>,
    /// In document order. Later roads overwrite earlier edges on the same endpoints, so the order
    /// here is part of the contract.
    pub roads: Vec<(WayID, Road)>,
}

impl OsmExtract {
    pub fn new() -> Self {
        Self {
            points: BTreeMap::new(),
            roads: Vec::new(),
        }
    }

    pub fn handle_node(&mut self, id: NodeID, node: Node) {
        let name = node.tags.get(osm::NAME).cloned().unwrap_or_default();
        self.points.insert(
            id,
            Point {
                lon_lat: node.lon_lat,
                name,
            },
        );
    }

    /// Returns true if the way was kept as a road.
    pub fn handle_way(&mut self, id: WayID, way: Way) -> bool {
        // Ways with the highway tag are roads, whatever the value; everything else is parks,
        // buildings, and other stuff we don't care about.
        if !way.tags.contains_key(osm::HIGHWAY) {
            return false;
        }
        let name = way.tags.get(osm::NAME).cloned().unwrap_or_default();
        self.roads.push((
            id,
            Road {
                nodes: way.nodes,
                name,
            },
        ));
        true
    }
}

impl Default for OsmExtract {
    fn default() -> Self {
        Self::new()
    }
}

pub fn extract_roads(doc: Document, timer: &mut Timer) -> Result<OsmExtract, ConvertError> {
    let mut out = OsmExtract::new();

    timer.start_iter("processing OSM nodes", doc.nodes.len());
    for (id, node) in doc.nodes {
        timer.next();
        out.handle_node(id, node);
    }

    let num_ways = doc.ways.len();
    timer.start_iter("processing OSM ways", num_ways);
    for (id, way) in doc.ways {
        timer.next();
        out.handle_way(id, way);
    }
    info!("{} of {} ways are roads", out.roads.len(), num_ways);

    // The input is assumed pre-validated, but a road pointing at a node we never saw would break
    // contraction. Surface it instead of skipping.
    for (way, road) in &out.roads {
        for node in &road.nodes {
            if !out.points.contains_key(node) {
                return Err(ConvertError::DanglingNodeRef {
                    way: *way,
                    node: *node,
                });
            }
        }
    }

    Ok(out)
}

/// How many consecutive-pair slots in retained roads touch each point. Both members of every
/// adjacent pair count, so an interior node of a single road already reaches 2; anything above 1
/// becomes an intersection.
pub fn count_touches(roads: &[(WayID, Road)]) -> Counter<NodeID> {
    let mut counts = Counter::new();
    for (_, road) in roads {
        for pair in road.nodes.windows(2) {
            counts.inc(pair[0]);
            counts.inc(pair[1]);
        }
    }
    counts
}
