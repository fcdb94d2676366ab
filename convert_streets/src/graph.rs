use std::collections::BTreeMap;

use geom::{Distance, LonLat};
use sgutil::{Counter, Timer};

use crate::extract::{OsmExtract, Point};
use crate::osm::{NodeID, WayID};
use crate::ConvertError;

/// An unordered pair of endpoints, stored smaller id first, so it can key the edge table.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct NodePair(pub NodeID, pub NodeID);

impl NodePair {
    pub fn new(a: NodeID, b: NodeID) -> NodePair {
        if a <= b {
            NodePair(a, b)
        } else {
            NodePair(b, a)
        }
    }
}

#[derive(Debug)]
pub struct Edge {
    pub way: WayID,
    /// Accumulated geodesic length along the original way between the two endpoints
    pub dist: Distance,
    /// Empty if the way is unnamed
    pub name: String,
}

pub struct RoadGraph {
    /// Only points with more than one pair-touch survive contraction.
    pub intersections: BTreeMap<NodeID, Point>,
    pub edges: BTreeMap<NodePair, Edge>,
}

/// Walk every road, collapsing runs of non-junction points into single distance-weighted edges.
/// An interior point of a single road already touches two adjacent pairs, so in practice almost
/// every interior point closes an edge.
pub fn contract_roads(
    extract: &OsmExtract,
    counts: &Counter<NodeID>,
    timer: &mut Timer,
) -> Result<RoadGraph, ConvertError> {
    let mut edges: BTreeMap<NodePair, Edge> = BTreeMap::new();

    timer.start_iter("contracting roads", extract.roads.len());
    for (way, road) in &extract.roads {
        timer.next();
        // A lone point can't form an edge
        if road.nodes.len() < 2 {
            continue;
        }

        let mut segment_start = road.nodes[0];
        let mut dist = Distance::ZERO;
        let mut prev = extract.points[&segment_start].lon_lat;
        for v in &road.nodes[1..road.nodes.len() - 1] {
            let pt = extract.points[v].lon_lat;
            dist += hop_dist(*way, prev, pt)?;
            prev = pt;
            if counts.get(*v) > 1 {
                insert_edge(
                    &mut edges,
                    NodePair::new(segment_start, *v),
                    *way,
                    dist,
                    road.name.clone(),
                    timer,
                );
                segment_start = *v;
                dist = Distance::ZERO;
            }
        }

        // The last node always closes an edge, whatever its count.
        let last = *road.nodes.last().unwrap();
        dist += hop_dist(*way, prev, extract.points[&last].lon_lat)?;
        insert_edge(
            &mut edges,
            NodePair::new(segment_start, last),
            *way,
            dist,
            road.name.clone(),
            timer,
        );
    }

    let intersections = extract
        .points
        .iter()
        .filter(|(id, _)| counts.get(**id) > 1)
        .map(|(id, pt)| (*id, pt.clone()))
        .collect();

    Ok(RoadGraph {
        intersections,
        edges,
    })
}

// Insertion is last-write-wins in road document order.
fn insert_edge(
    edges: &mut BTreeMap<NodePair, Edge>,
    pair: NodePair,
    way: WayID,
    dist: Distance,
    name: String,
    timer: &mut Timer,
) {
    if let Some(prev) = edges.insert(pair, Edge { way, dist, name }) {
        timer.warn(format!(
            "{} replaces the edge {} made between nodes {} and {}",
            way, prev.way, pair.0 .0, pair.1 .0
        ));
    }
}

fn hop_dist(way: WayID, a: LonLat, b: LonLat) -> Result<Distance, ConvertError> {
    a.gps_dist_meters(b)
        .map_err(|source| ConvertError::Geodesic { way, a, b, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{count_touches, Road};

    fn fixture(points: Vec<(i64, f64, f64)>, roads: Vec<(i64, Vec<i64>)>) -> OsmExtract {
        let mut out = OsmExtract::new();
        for (id, lon, lat) in points {
            out.points.insert(
                NodeID(id),
                Point {
                    lon_lat: LonLat::new(lon, lat),
                    name: String::new(),
                },
            );
        }
        for (id, nodes) in roads {
            out.roads.push((
                WayID(id),
                Road {
                    nodes: nodes.into_iter().map(NodeID).collect(),
                    name: String::new(),
                },
            ));
        }
        out
    }

    fn four_points() -> Vec<(i64, f64, f64)> {
        vec![
            (1, -74.4474, 40.5008),
            (2, -74.4474, 40.5018),
            (3, -74.4464, 40.5018),
            (4, -74.4464, 40.5028),
        ]
    }

    #[test]
    fn single_road_splits_at_every_interior_node() {
        let extract = fixture(four_points(), vec![(10, vec![1, 2, 3, 4])]);
        let counts = count_touches(&extract.roads);
        let graph = contract_roads(&extract, &counts, &mut Timer::throwaway()).unwrap();

        // Both interior nodes reach a touch count of 2 from this road alone, so the "> 1" test
        // fires at each of them.
        assert_eq!(
            graph.edges.keys().cloned().collect::<Vec<_>>(),
            vec![
                NodePair(NodeID(1), NodeID(2)),
                NodePair(NodeID(2), NodeID(3)),
                NodePair(NodeID(3), NodeID(4)),
            ]
        );
        assert_eq!(
            graph.intersections.keys().cloned().collect::<Vec<_>>(),
            vec![NodeID(2), NodeID(3)]
        );
    }

    #[test]
    fn accumulates_hops_between_junctions() {
        let extract = fixture(four_points(), vec![(10, vec![1, 2, 3, 4])]);
        // Touch counts that never mark a junction, so the whole road is one edge
        let counts = Counter::new();
        let graph = contract_roads(&extract, &counts, &mut Timer::throwaway()).unwrap();

        assert_eq!(graph.edges.len(), 1);
        assert!(graph.intersections.is_empty());
        let edge = &graph.edges[&NodePair::new(NodeID(1), NodeID(4))];

        let pt = |id: i64| extract.points[&NodeID(id)].lon_lat;
        let expected = pt(1).gps_dist_meters(pt(2)).unwrap()
            + pt(2).gps_dist_meters(pt(3)).unwrap()
            + pt(3).gps_dist_meters(pt(4)).unwrap();
        assert_eq!(edge.dist, expected);
    }

    #[test]
    fn later_road_overwrites_edge() {
        let extract = fixture(
            four_points(),
            vec![(10, vec![1, 2]), (20, vec![2, 1])],
        );
        let counts = count_touches(&extract.roads);
        let graph = contract_roads(&extract, &counts, &mut Timer::throwaway()).unwrap();

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[&NodePair::new(NodeID(2), NodeID(1))].way, WayID(20));
    }

    #[test]
    fn degenerate_roads_are_skipped() {
        let extract = fixture(four_points(), vec![(10, vec![1]), (20, vec![])]);
        let counts = count_touches(&extract.roads);
        let graph = contract_roads(&extract, &counts, &mut Timer::throwaway()).unwrap();

        assert!(graph.edges.is_empty());
        assert!(graph.intersections.is_empty());
    }

    #[test]
    fn zero_length_edge() {
        // Both endpoints coincide; the edge survives with a distance of exactly 0.
        let extract = fixture(
            vec![(1, -74.4474, 40.5008), (2, -74.4474, 40.5008)],
            vec![(10, vec![1, 2])],
        );
        let counts = count_touches(&extract.roads);
        let graph = contract_roads(&extract, &counts, &mut Timer::throwaway()).unwrap();

        assert_eq!(
            graph.edges[&NodePair::new(NodeID(1), NodeID(2))].dist,
            Distance::ZERO
        );
    }
}
