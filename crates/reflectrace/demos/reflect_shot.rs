//! Traces one shot through a single planned reflection and prints the
//! resulting trajectory segments, for eyeballing the merged/divergence
//! output without a renderer attached.

use nalgebra::vector;
use reflectrace::surface::{ReflectiveSide, SurfaceId};
use reflectrace::{GeomConfig, PlaneSurface, ReflectionEngine, SearchLimits, Segment};

fn main() {
    tracing_subscriber::fmt::init();

    let mirror = PlaneSurface::reflective("mirror", Segment::new(vector![200.0, 0.0], vector![200.0, 200.0]), ReflectiveSide::Left);

    let mut engine = ReflectionEngine::<PlaneSurface>::new(GeomConfig::default(), SearchLimits::default());
    engine.set_all_surfaces(vec![mirror]);
    engine.set_planned_surfaces(vec![SurfaceId::new("mirror")]);
    engine.set_player(vector![100.0, 100.0]);
    engine.set_cursor(vector![300.0, 100.0]);

    let result = engine.get_full_trajectory();
    println!("fully_aligned = {}", result.fully_aligned);
    for segment in &result.merged.segments {
        println!(
            "  {:?} -> {:?} surface={:?} can_reflect={}",
            segment.start, segment.end, segment.surface, segment.can_reflect
        );
    }
}
