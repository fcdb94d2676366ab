#[macro_use]
extern crate log;

use anyhow::Result;
use structopt::StructOpt;

use convert_streets::{export, osm_to_road_graph};
use sgutil::{prettyprint_usize, Timer};

#[derive(StructOpt)]
#[structopt(
    name = "convert_streets",
    about = "Extracts a simplified road graph from OSM XML and writes it as CSV"
)]
struct Flags {
    /// OSM XML file to read
    #[structopt(long = "osm")]
    osm: String,

    /// CSV file to write
    #[structopt(long = "output")]
    output: String,
}

fn main() -> Result<()> {
    sgutil::logger::setup();
    let flags = Flags::from_args();

    let mut timer = Timer::new(format!("convert {} to a road graph", flags.osm));
    let graph = osm_to_road_graph(&flags.osm, &mut timer)?;

    timer.start(format!("write {}", flags.output));
    let file = fs_err::File::create(&flags.output)?;
    export::write_csv(&graph, file)?;
    timer.stop(format!("write {}", flags.output));
    timer.done();

    info!(
        "Wrote {} intersections and {} edges to {}",
        prettyprint_usize(graph.intersections.len()),
        prettyprint_usize(graph.edges.len()),
        flags.output
    );
    Ok(())
}
