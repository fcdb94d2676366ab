//! Extracts a simplified road-network graph from raw OpenStreetMap XML: intersections become
//! nodes, stretches of road between them become edges weighted by geodesic length along the
//! original way. The result is flat tabular data, written as CSV by `export`.

#[macro_use]
extern crate log;

use geom::{LonLat, NonConvergence};
use sgutil::Timer;
use thiserror::Error;

use crate::osm::{NodeID, WayID};

pub mod export;
pub mod extract;
pub mod graph;
pub mod osm;
pub mod osm_reader;

pub use crate::extract::{count_touches, extract_roads, OsmExtract};
pub use crate::graph::{contract_roads, RoadGraph};

/// Everything that can sink a batch. The input is assumed pre-validated, so all of these mean a
/// broken fixture or upstream extract, not something to recover from.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("reading input failed")]
    Io(#[from] std::io::Error),
    #[error("invalid XML")]
    Xml(#[from] roxmltree::Error),
    #[error("a {element} is missing or has an unreadable {attribute}")]
    MalformedRecord { element: String, attribute: String },
    #[error("duplicate {id}, your .osm is corrupt")]
    DuplicateId { id: String },
    #[error("{way} references {node}, which doesn't exist")]
    DanglingNodeRef { way: WayID, node: NodeID },
    #[error("geodesic distance from {a} to {b} along {way} has no solution")]
    Geodesic {
        way: WayID,
        a: LonLat,
        b: LonLat,
        source: NonConvergence,
    },
}

/// Create a `RoadGraph` from an `.osm.xml` file.
pub fn osm_to_road_graph(
    osm_input_path: &str,
    timer: &mut Timer,
) -> Result<RoadGraph, ConvertError> {
    timer.start(format!("read {}", osm_input_path));
    let raw_xml = fs_err::read_to_string(osm_input_path)?;
    timer.stop(format!("read {}", osm_input_path));

    let doc = osm_reader::read(&raw_xml, timer)?;
    let extract = extract_roads(doc, timer)?;
    let counts = count_touches(&extract.roads);
    contract_roads(&extract, &counts, timer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodePair;

    // Two streets crossing at node 2, plus a building sharing a corner with one of them.
    #[test]
    fn two_crossing_streets() {
        let xml = r#"<?xml version="1.0"?>
<osm>
  <node id="1" lat="40.5008" lon="-74.4474"/>
  <node id="2" lat="40.5018" lon="-74.4474"/>
  <node id="3" lat="40.5028" lon="-74.4474"/>
  <node id="4" lat="40.5018" lon="-74.4484"/>
  <node id="5" lat="40.5018" lon="-74.4464"/>
  <way id="10">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="highway" v="residential"/>
    <tag k="name" v="College Ave"/>
  </way>
  <way id="11">
    <nd ref="4"/>
    <nd ref="2"/>
    <nd ref="5"/>
    <tag k="highway" v="tertiary"/>
  </way>
  <way id="12">
    <nd ref="1"/>
    <nd ref="4"/>
    <tag k="building" v="yes"/>
  </way>
</osm>"#;

        let mut timer = Timer::throwaway();
        let doc = osm_reader::read(xml, &mut timer).unwrap();
        let extract = extract_roads(doc, &mut timer).unwrap();
        let counts = count_touches(&extract.roads);
        let graph = contract_roads(&extract, &counts, &mut timer).unwrap();

        // Only the crossing node is a junction; way 12 isn't a road, so nodes 1 and 4 stay
        // boring.
        assert_eq!(
            graph.intersections.keys().cloned().collect::<Vec<_>>(),
            vec![NodeID(2)]
        );
        assert_eq!(
            graph.edges.keys().cloned().collect::<Vec<_>>(),
            vec![
                NodePair(NodeID(1), NodeID(2)),
                NodePair(NodeID(2), NodeID(3)),
                NodePair(NodeID(2), NodeID(4)),
                NodePair(NodeID(2), NodeID(5)),
            ]
        );
        let first = &graph.edges[&NodePair(NodeID(1), NodeID(2))];
        assert_eq!(first.way, WayID(10));
        assert_eq!(first.name, "College Ave");
        assert_eq!(graph.edges[&NodePair(NodeID(2), NodeID(4))].name, "");
    }
}
