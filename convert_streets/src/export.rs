use std::io::Write;

use anyhow::Result;

use crate::graph::RoadGraph;

/// Writes the graph as CSV. Downstream consumers key off the header and column order, so changing
/// either is a breaking change.
pub fn write_csv<W: Write>(graph: &RoadGraph, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&["type", "id", "lat/u", "lon/v", "-/dist", "name"])?;
    for (id, pt) in &graph.intersections {
        out.serialize((
            "node",
            id,
            pt.lon_lat.latitude,
            pt.lon_lat.longitude,
            "",
            &pt.name,
        ))?;
    }
    for (pair, edge) in &graph.edges {
        out.serialize(("edge", edge.way, pair.0, pair.1, edge.dist, &edge.name))?;
    }
    out.flush()?;
    Ok(())
}
