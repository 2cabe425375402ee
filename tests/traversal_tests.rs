//! Integration tests for geometry traversal: path lengths, vertex draws
//! and the maximum-path-length scan.

use nugeom::core::{EngineConfig, GeomAnalyzer, GeomEngine, Ray, VertexSample};
use nugeom::geom::BoxTree;
use nugeom::material::IsotopeId;
use nugeom::util::DVec3;

use rand::rngs::StdRng;
use rand::SeedableRng;

const OXYGEN_CUBE: &str = r#"{
    "units": {"length": "m", "density": "kg_m3"},
    "materials": [
        {"name": "Oxygen", "density": 1.0, "a": 16, "z": 8}
    ],
    "volumes": [
        {"name": "World", "material": "Oxygen", "center": [0, 0, 0], "half": [10, 10, 10]}
    ]
}"#;

const LAYERED_DETECTOR: &str = r#"{
    "units": {"length": "m", "density": "kg_m3"},
    "materials": [
        {"name": "Water", "density": 1.0, "composition": [
            {"a": 1, "z": 1, "fraction": 0.112},
            {"a": 16, "z": 8, "fraction": 0.888}
        ]},
        {"name": "Iron", "density": 7.87, "a": 56, "z": 26}
    ],
    "volumes": [
        {"name": "World", "material": "Water", "center": [0, 0, 0], "half": [10, 10, 10]},
        {"name": "Core", "material": "Iron", "center": [0, 0, 0], "half": [2, 2, 2], "parent": "World"}
    ]
}"#;

fn oxygen_engine() -> GeomEngine<BoxTree> {
    let tree = BoxTree::from_json_str(OXYGEN_CUBE).expect("Failed to parse geometry");
    GeomEngine::new(tree)
}

#[test]
fn test_cube_chord_path_length() {
    let engine = oxygen_engine();
    let o16 = IsotopeId::new(16, 8);

    let ray = Ray::new(DVec3::new(-20.0, 0.0, 0.0), DVec3::X).expect("Failed to build ray");
    let lengths = engine.path_lengths(ray).expect("Traversal failed");

    // unit density, so the weighted length is the 20 m chord
    assert!((lengths.get(o16) - 20.0).abs() < 1e-6, "got {}", lengths.get(o16));
    assert_eq!(lengths.len(), 1);
}

#[test]
fn test_miss_gives_all_zero() {
    let engine = oxygen_engine();
    let ray = Ray::new(DVec3::new(-20.0, 15.0, 0.0), DVec3::X).expect("Failed to build ray");
    let lengths = engine.path_lengths(ray).expect("Traversal failed");
    assert!(lengths.are_all_zero());
}

#[test]
fn test_path_lengths_idempotent() {
    let engine = oxygen_engine();
    let ray = Ray::new(DVec3::new(-20.0, 3.0, 4.0), DVec3::X).expect("Failed to build ray");

    let first = engine.path_lengths(ray).expect("Traversal failed");
    let second = engine.path_lengths(ray).expect("Traversal failed");
    let pairs_first: Vec<_> = first.iter().collect();
    let pairs_second: Vec<_> = second.iter().collect();
    assert_eq!(pairs_first, pairs_second);
}

#[test]
fn test_unregistered_target_not_in_path() {
    let engine = oxygen_engine();
    let h1 = IsotopeId::new(1, 1);
    let ray = Ray::new(DVec3::new(-20.0, 0.0, 0.0), DVec3::X).expect("Failed to build ray");

    let mut rng = StdRng::seed_from_u64(7);
    let got = engine
        .sample_vertex(ray, h1, &mut rng)
        .expect("Vertex sampling failed");
    assert_eq!(got, VertexSample::NotInPath);
}

#[test]
fn test_layered_detector_path_lengths() {
    let tree = BoxTree::from_json_str(LAYERED_DETECTOR).expect("Failed to parse geometry");
    let engine = GeomEngine::new(tree);

    let ray = Ray::new(DVec3::new(-20.0, 0.0, 0.0), DVec3::X).expect("Failed to build ray");
    let lengths = engine.path_lengths(ray).expect("Traversal failed");

    let h1 = IsotopeId::new(1, 1);
    let o16 = IsotopeId::new(16, 8);
    let fe56 = IsotopeId::new(56, 26);

    // water shells: 2 x 8 m at density 1; iron core: 4 m at density 7.87
    println!(
        "H1 {}  O16 {}  Fe56 {}",
        lengths.get(h1),
        lengths.get(o16),
        lengths.get(fe56)
    );
    assert!((lengths.get(h1) - 16.0).abs() < 1e-6);
    assert!((lengths.get(o16) - 16.0).abs() < 1e-6);
    assert!((lengths.get(fe56) - 4.0 * 7.87).abs() < 1e-6);
}

#[test]
fn test_vertex_positions_uniform_along_chord() {
    let engine = oxygen_engine();
    let o16 = IsotopeId::new(16, 8);
    let ray = Ray::new(DVec3::new(-20.0, 0.0, 0.0), DVec3::X).expect("Failed to build ray");

    let mut rng = StdRng::seed_from_u64(20260823);
    let n = 2000;
    let mut xs = Vec::with_capacity(n);
    for _ in 0..n {
        match engine.sample_vertex(ray, o16, &mut rng).expect("Vertex sampling failed") {
            VertexSample::Found(p) => {
                assert!(p.x >= -10.0 - 2e-3 && p.x <= 10.0 + 2e-3, "vertex at {}", p.x);
                xs.push(p.x);
            }
            other => panic!("expected a vertex, got {:?}", other),
        }
    }

    // Kolmogorov-Smirnov distance against the uniform CDF on [-10, 10]
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut d_max: f64 = 0.0;
    for (i, &x) in xs.iter().enumerate() {
        let cdf = ((x + 10.0) / 20.0).clamp(0.0, 1.0);
        let lo = i as f64 / n as f64;
        let hi = (i + 1) as f64 / n as f64;
        d_max = d_max.max((cdf - lo).abs()).max((hi - cdf).abs());
    }
    println!("KS distance: {}", d_max);
    assert!(d_max < 0.05, "vertex positions not uniform, D = {}", d_max);
}

#[test]
fn test_scan_bounds_cube_diagonal() {
    let tree = BoxTree::from_json_str(OXYGEN_CUBE).expect("Failed to parse geometry");
    let config = EngineConfig {
        surface_points: 60,
        surface_rays: 60,
        ..EngineConfig::default()
    };
    let engine = GeomEngine::with_config(tree, config);
    let o16 = IsotopeId::new(16, 8);

    let table = engine.max_path_lengths_par(11).expect("Scan failed");
    let m = table.get(o16);
    println!("max path length estimate: {}", m);

    // a face-to-face chord is 20 m, the main diagonal 20 * sqrt(3)
    assert!(m > 20.0, "estimate {} below the straight chord", m);
    assert!(m <= 20.0 * 3.0_f64.sqrt() + 1e-6, "estimate {} above the diagonal", m);
}

#[test]
fn test_scan_sees_buried_core() {
    let tree = BoxTree::from_json_str(LAYERED_DETECTOR).expect("Failed to parse geometry");
    let config = EngineConfig {
        surface_points: 60,
        surface_rays: 60,
        ..EngineConfig::default()
    };
    let engine = GeomEngine::with_config(tree, config);

    let table = engine.max_path_lengths_par(11).expect("Scan failed");
    let fe56 = IsotopeId::new(56, 26);

    // some probe ray must pierce the 4 m iron core near its diagonal
    assert!(table.get(fe56) > 4.0 * 7.87 * 0.9, "iron max {}", table.get(fe56));
    assert!(table.get(IsotopeId::new(16, 8)) > 16.0);
}

#[test]
fn test_trait_object_surface() {
    let engine = oxygen_engine();
    let analyzer: Box<dyn GeomAnalyzer> = Box::new(engine);
    let o16 = IsotopeId::new(16, 8);

    assert!(analyzer.isotopes().contains(o16));

    let ray = Ray::new(DVec3::new(0.0, 0.0, -30.0), DVec3::Z).expect("Failed to build ray");
    let lengths = analyzer.path_lengths(ray).expect("Traversal failed");
    assert!((lengths.get(o16) - 20.0).abs() < 1e-6);

    let mut rng = StdRng::seed_from_u64(5);
    let maxpl = analyzer
        .max_path_length(o16, &mut rng)
        .expect("Scan failed");
    assert!(maxpl >= 20.0);
}
