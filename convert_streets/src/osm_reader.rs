use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use geom::LonLat;
use sgutil::{prettyprint_usize, Tags, Timer};

use crate::osm::{NodeID, WayID};
use crate::ConvertError;

// Per https://wiki.openstreetmap.org/wiki/OSM_XML#Certainties_and_Uncertainties, we assume
// elements come in order: nodes, ways, then relations. Relations aren't used at all.

#[derive(Debug)]
pub struct Document {
    pub nodes: BTreeMap<NodeID, Node>,
    /// In document order. Last-write-wins in the edge table depends on it.
    pub ways: Vec<(WayID, Way)>,
}

#[derive(Debug)]
pub struct Node {
    pub lon_lat: LonLat,
    pub tags: Tags,
}

#[derive(Debug)]
pub struct Way {
    /// Raw references; ingestion validates that they all resolve.
    pub nodes: Vec<NodeID>,
    pub tags: Tags,
}

pub fn read(raw_string: &str, timer: &mut Timer) -> Result<Document, ConvertError> {
    timer.start("parse XML");
    let tree = roxmltree::Document::parse(raw_string)?;
    timer.stop("parse XML");

    let mut doc = Document {
        nodes: BTreeMap::new(),
        ways: Vec::new(),
    };
    let mut way_ids: BTreeSet<WayID> = BTreeSet::new();

    timer.start("scrape objects");
    for obj in tree.descendants() {
        if !obj.is_element() {
            continue;
        }
        match obj.tag_name().name() {
            "node" => {
                let id = NodeID(parse_attribute(obj, "id")?);
                if doc.nodes.contains_key(&id) {
                    return Err(ConvertError::DuplicateId { id: id.to_string() });
                }
                let lon_lat = LonLat::new(
                    parse_attribute(obj, "lon")?,
                    parse_attribute(obj, "lat")?,
                );
                let tags = read_tags(obj)?;
                doc.nodes.insert(id, Node { lon_lat, tags });
            }
            "way" => {
                let id = WayID(parse_attribute(obj, "id")?);
                if !way_ids.insert(id) {
                    return Err(ConvertError::DuplicateId { id: id.to_string() });
                }
                let tags = read_tags(obj)?;
                let mut nodes = Vec::new();
                for child in obj.children() {
                    if child.tag_name().name() == "nd" {
                        nodes.push(NodeID(parse_attribute(child, "ref")?));
                    }
                }
                doc.ways.push((id, Way { nodes, tags }));
            }
            _ => {}
        }
    }
    timer.stop("scrape objects");
    timer.note(format!(
        "Found {} nodes, {} ways",
        prettyprint_usize(doc.nodes.len()),
        prettyprint_usize(doc.ways.len())
    ));

    Ok(doc)
}

fn parse_attribute<T: FromStr>(
    obj: roxmltree::Node,
    attribute: &str,
) -> Result<T, ConvertError> {
    obj.attribute(attribute)
        .and_then(|x| x.parse::<T>().ok())
        .ok_or_else(|| ConvertError::MalformedRecord {
            element: obj.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

fn read_tags(obj: roxmltree::Node) -> Result<Tags, ConvertError> {
    let mut tags = Tags::new(BTreeMap::new());
    for child in obj.children() {
        if child.tag_name().name() != "tag" {
            continue;
        }
        let key = parse_attribute::<String>(child, "k")?;
        // Filter out really useless data
        if key.starts_with("tiger:") || key.starts_with("old_name:") {
            continue;
        }
        tags.insert(key, parse_attribute::<String>(child, "v")?);
    }
    Ok(tags)
}
