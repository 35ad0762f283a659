//! Example: Place and relax CVT generators on the unit square
//!
//! Demonstrates the full pipeline: boundary placement, interior seeding and
//! Lloyd relaxation.

use cvt_mesh::*;

fn main() {
    println!("CVT Generator Placement Example");
    println!("===============================\n");

    let square = HalfEdgeDomain::polygon(
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ],
        vec![true; 4],
    )
    .expect("Invalid domain");

    let config = MesherConfigBuilder::new()
        .seed(42)
        .refine(4)
        .unwrap()
        .lloyd_iterations(20)
        .unwrap()
        .build()
        .unwrap();

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Refinement: {}", config.refine);
    println!("  Spacing factor: {}", config.spacing_factor);
    println!("  Corner angle: {} deg", config.corner_angle);
    println!();

    let mut mesh = CvtMesher::new(square, config)
        .meshing()
        .expect("Failed to place generators");

    println!("Generators:");
    println!("  Boundary: {}", mesh.boundary().generators.len());
    println!("  Corner: {}", mesh.boundary().corner_generators.len());
    println!("  Interior: {}", mesh.movable_count());
    println!("  Reference length h0: {:.4}", mesh.boundary().reference_length());
    println!();

    let report = mesh.relax(config.lloyd_options());
    println!(
        "Relaxation: {} steps, last error {:.6}, converged={}",
        report.iterations, report.error, report.converged
    );

    println!("\nSample interior generators:");
    for p in mesh.movable_generators().iter().take(5) {
        println!("  ({:.4}, {:.4})", p.x, p.y);
    }
}
