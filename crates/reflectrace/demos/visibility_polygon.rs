//! Projects a full-cone visibility polygon from a fixed origin against a
//! small scene and prints the ordered, provenance-tagged vertices.

use nalgebra::vector;
use reflectrace::engine::ReflectionEngine;
use reflectrace::surface::ReflectiveSide;
use reflectrace::{ConeKind, GeomConfig, PlaneSurface, ScreenBounds, Segment, SourcePoint};

fn main() {
    tracing_subscriber::fmt::init();

    let wall = PlaneSurface::reflective("wall", Segment::new(vector![600.0, 200.0], vector![600.0, 400.0]), ReflectiveSide::Left);

    let mut engine = ReflectionEngine::<PlaneSurface>::new(GeomConfig::default(), reflectrace::SearchLimits::default());
    engine.set_all_surfaces(vec![wall]);

    let bounds = ScreenBounds::new(0.0, 0.0, 1280.0, 720.0);
    let polygon = engine
        .get_visibility(vector![400.0, 300.0], ConeKind::Full, bounds, None)
        .expect("no excluded surface in this demo");

    println!("{} polygon vertices:", polygon.len());
    for vertex in &polygon {
        print_vertex(vertex);
    }
}

fn print_vertex(v: &SourcePoint) {
    let p = v.compute_xy();
    match v.surface_id() {
        Some(id) => println!("  ({:.1}, {:.1}) on {id}", p.x, p.y),
        None => println!("  ({:.1}, {:.1}) {}", p.x, p.y, v.key()),
    }
}
