//! GML-3.1.1-Kodierung der Feature-Geometrien (WFS 1.1.0).

use super::tree::Element;
use super::{GML_NS, escape};
use crate::core::{Geometry, Path};
use anyhow::{Context, Result, bail};
use glam::DVec2;

/// Schreibt eine Geometrie als GML-Element mit `gml:`-Präfix.
///
/// `srs_name` wird nur am äußersten Element ausgegeben.
pub fn write_geometry(output: &mut String, geometry: &Geometry, srs_name: Option<&str>) {
    let srs = srs_name
        .map(|srs| format!(" srsName=\"{}\"", escape(srs)))
        .unwrap_or_default();

    match geometry {
        Geometry::Point(point) => {
            output.push_str(&format!("<gml:Point{}>", srs));
            write_pos(output, *point);
            output.push_str("</gml:Point>");
        }
        Geometry::LineString(path) => {
            output.push_str(&format!("<gml:LineString{}>", srs));
            write_pos_list(output, path);
            output.push_str("</gml:LineString>");
        }
        Geometry::Polygon(rings) => {
            output.push_str(&format!("<gml:Polygon{}>", srs));
            write_rings(output, rings);
            output.push_str("</gml:Polygon>");
        }
        Geometry::MultiPoint(points) => {
            output.push_str(&format!("<gml:MultiPoint{}>", srs));
            for point in points {
                output.push_str("<gml:pointMember><gml:Point>");
                write_pos(output, *point);
                output.push_str("</gml:Point></gml:pointMember>");
            }
            output.push_str("</gml:MultiPoint>");
        }
        Geometry::MultiLineString(paths) => {
            output.push_str(&format!("<gml:MultiCurve{}>", srs));
            for path in paths {
                output.push_str("<gml:curveMember><gml:LineString>");
                write_pos_list(output, path);
                output.push_str("</gml:LineString></gml:curveMember>");
            }
            output.push_str("</gml:MultiCurve>");
        }
        Geometry::MultiPolygon(polygons) => {
            output.push_str(&format!("<gml:MultiSurface{}>", srs));
            for rings in polygons {
                output.push_str("<gml:surfaceMember><gml:Polygon>");
                write_rings(output, rings);
                output.push_str("</gml:Polygon></gml:surfaceMember>");
            }
            output.push_str("</gml:MultiSurface>");
        }
    }
}

fn write_rings(output: &mut String, rings: &[Path]) {
    for (index, ring) in rings.iter().enumerate() {
        let tag = if index == 0 { "exterior" } else { "interior" };
        output.push_str(&format!("<gml:{}><gml:LinearRing>", tag));
        write_pos_list(output, ring);
        output.push_str(&format!("</gml:LinearRing></gml:{}>", tag));
    }
}

fn write_pos(output: &mut String, point: DVec2) {
    output.push_str(&format!(
        "<gml:pos srsDimension=\"2\">{} {}</gml:pos>",
        point.x, point.y
    ));
}

fn write_pos_list(output: &mut String, path: &[DVec2]) {
    let coords = path
        .iter()
        .map(|p| format!("{} {}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");
    output.push_str(&format!(
        "<gml:posList srsDimension=\"2\">{}</gml:posList>",
        coords
    ));
}

/// Ob ein Element eine GML-Geometrie ist, die `read_geometry` versteht.
pub fn is_geometry(element: &Element) -> bool {
    element.namespace.as_deref() == Some(GML_NS)
        && matches!(
            element.name.as_str(),
            "Point"
                | "LineString"
                | "Curve"
                | "Polygon"
                | "Surface"
                | "MultiPoint"
                | "MultiCurve"
                | "MultiLineString"
                | "MultiSurface"
                | "MultiPolygon"
        )
}

/// Liest eine GML-Geometrie.
pub fn read_geometry(element: &Element) -> Result<Geometry> {
    match element.name.as_str() {
        "Point" => Ok(Geometry::Point(read_point(element)?)),
        "LineString" | "Curve" => Ok(Geometry::LineString(read_path(element)?)),
        "Polygon" | "Surface" => Ok(Geometry::Polygon(read_rings(element)?)),
        "MultiPoint" => {
            let mut points = Vec::new();
            for member in members(element, &["pointMember", "pointMembers"]) {
                points.push(read_point(member)?);
            }
            Ok(Geometry::MultiPoint(points))
        }
        "MultiCurve" | "MultiLineString" => {
            let mut paths = Vec::new();
            for member in members(element, &["curveMember", "lineStringMember", "curveMembers"]) {
                paths.push(read_path(member)?);
            }
            Ok(Geometry::MultiLineString(paths))
        }
        "MultiSurface" | "MultiPolygon" => {
            let mut polygons = Vec::new();
            for member in members(element, &["surfaceMember", "polygonMember", "surfaceMembers"])
            {
                polygons.push(read_rings(member)?);
            }
            Ok(Geometry::MultiPolygon(polygons))
        }
        other => bail!("Nicht unterstützte GML-Geometrie: {}", other),
    }
}

/// Geometrie-Kinder aller Member-Elemente (ein Member kann mehrere enthalten).
fn members<'a>(element: &'a Element, member_names: &[&str]) -> Vec<&'a Element> {
    element
        .children
        .iter()
        .filter(|child| member_names.contains(&child.name.as_str()))
        .flat_map(|member| member.children.iter())
        .collect()
}

fn read_point(element: &Element) -> Result<DVec2> {
    let pos = element
        .child("pos")
        .or_else(|| element.child("coordinates"))
        .with_context(|| format!("<{}> ohne <pos>", element.name))?;
    let coords = parse_coordinates(pos)?;
    coords
        .first()
        .copied()
        .with_context(|| format!("<{}> ohne Koordinate", element.name))
}

fn read_path(element: &Element) -> Result<Path> {
    if let Some(pos_list) = element.child("posList") {
        return parse_coordinates(pos_list);
    }
    let mut path = Vec::new();
    for pos in element.children_named("pos") {
        path.extend(parse_coordinates(pos)?);
    }
    if path.is_empty() {
        bail!("<{}> ohne Koordinaten", element.name);
    }
    Ok(path)
}

fn read_rings(polygon: &Element) -> Result<Vec<Path>> {
    let mut rings = Vec::new();
    for boundary in polygon
        .children
        .iter()
        .filter(|child| child.name == "exterior" || child.name == "interior")
    {
        let ring = boundary
            .first_child()
            .with_context(|| format!("<{}> ohne LinearRing", boundary.name))?;
        rings.push(read_path(ring)?);
    }
    if rings.is_empty() {
        bail!("Polygon ohne Ringe");
    }
    Ok(rings)
}

/// Parst `pos`/`posList`-Text unter Beachtung von `srsDimension`.
/// Dritte Dimension wird verworfen.
fn parse_coordinates(element: &Element) -> Result<Vec<DVec2>> {
    let dimension = match element.attribute("srsDimension") {
        Some(value) => value
            .parse::<usize>()
            .with_context(|| format!("Ungültige srsDimension: '{}'", value))?,
        None => 2,
    };
    if dimension < 2 {
        bail!("srsDimension muss mindestens 2 sein");
    }

    let values = element
        .text()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Koordinate '{}' ist keine Zahl", s))
        })
        .collect::<Result<Vec<f64>>>()?;

    if values.len() % dimension != 0 {
        bail!(
            "{} Werte passen nicht zu srsDimension {}",
            values.len(),
            dimension
        );
    }

    Ok(values
        .chunks(dimension)
        .map(|chunk| DVec2::new(chunk[0], chunk[1]))
        .collect())
}
