//! End-to-end event generation: flux through geometry to event records.

use nugeom::core::{EngineConfig, GeomEngine, MaxPathTable, PointAnalyzer};
use nugeom::driver::McJob;
use nugeom::event::{EventRecord, EventStatus};
use nugeom::flux::{FluxDriver, FluxSpec, MonoFlux};
use nugeom::geom::BoxTree;
use nugeom::material::IsotopeId;
use nugeom::util::DVec3;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use tempfile::NamedTempFile;

const WATER_CUBE: &str = r#"{
    "units": {"length": "m", "density": "kg_m3"},
    "materials": [
        {"name": "Water", "density": 1.0, "composition": [
            {"a": 1, "z": 1, "fraction": 0.112},
            {"a": 16, "z": 8, "fraction": 0.888}
        ]}
    ],
    "volumes": [
        {"name": "World", "material": "Water", "center": [0, 0, 0], "half": [10, 10, 10]}
    ]
}"#;

const IRON_CUBE: &str = r#"{
    "units": {"length": "m", "density": "kg_m3"},
    "materials": [
        {"name": "Iron", "density": 7.87, "a": 56, "z": 26}
    ],
    "volumes": [
        {"name": "World", "material": "Iron", "center": [0, 0, 0], "half": [5, 5, 5]}
    ]
}"#;

fn water_engine() -> GeomEngine<BoxTree> {
    let tree = BoxTree::from_json_str(WATER_CUBE).expect("Failed to parse geometry");
    let config = EngineConfig {
        surface_points: 60,
        surface_rays: 60,
        ..EngineConfig::default()
    };
    GeomEngine::with_config(tree, config)
}

fn upstream_mono(pdg: i32, energy: f64) -> Box<dyn FluxDriver> {
    let flux = MonoFlux::new(pdg, energy, DVec3::new(0.0, 0.0, -25.0), DVec3::Z)
        .expect("Failed to build flux");
    Box::new(flux)
}

#[test]
fn test_mono_job_end_to_end() {
    let mut job = McJob::new(Box::new(water_engine()), upstream_mono(14, 2.5));
    let mut rng = StdRng::seed_from_u64(1);
    job.configure(&mut rng).expect("Configuration failed");

    let mut generated = 0u64;
    let mut events = Vec::new();
    while generated < 25 {
        let event = job
            .next_event(3, generated, &mut rng)
            .expect("Generation failed")
            .expect("Flux should never exhaust");
        assert_eq!(event.run, 3);
        assert_eq!(event.probe, 14);
        assert!((event.energy - 2.5).abs() < 1e-12);
        // on-axis beam: vertices sit on the z axis inside the cube
        assert!(event.vertex.x.abs() < 1e-9 && event.vertex.y.abs() < 1e-9);
        assert!(event.vertex.z >= -10.0 - 2e-3 && event.vertex.z <= 10.0 + 2e-3);
        let code = event.target.code();
        assert!(code == IsotopeId::new(1, 1).code() || code == IsotopeId::new(16, 8).code());
        if event.status == EventStatus::Generated {
            generated += 1;
        }
        events.push(event);
    }

    let monitor = job.monitor();
    println!(
        "trials {} accepted {} blocked {}",
        monitor.trials(),
        monitor.accepted(),
        monitor.blocked()
    );
    assert_eq!(monitor.accepted(), 25);
    assert_eq!(monitor.blocked() + monitor.accepted(), events.len() as u64);
    assert!(monitor.trials() >= events.len() as u64);
}

#[test]
fn test_low_energy_beam_hits_pauli_blocking() {
    // 0.3 GeV on iron: most toy recoils fall below the 0.257 GeV Fermi sea
    let tree = BoxTree::from_json_str(IRON_CUBE).expect("Failed to parse geometry");
    let config = EngineConfig {
        surface_points: 40,
        surface_rays: 40,
        ..EngineConfig::default()
    };
    let engine = GeomEngine::with_config(tree, config);

    let mut job = McJob::new(Box::new(engine), upstream_mono(14, 0.3));
    let mut rng = StdRng::seed_from_u64(77);
    job.configure(&mut rng).expect("Configuration failed");

    let mut generated = 0u64;
    while generated < 10 {
        let event = job
            .next_event(0, generated, &mut rng)
            .expect("Generation failed")
            .expect("Flux should never exhaust");
        if event.status == EventStatus::Generated {
            generated += 1;
        }
    }
    println!("blocked {} for 10 accepted", job.monitor().blocked());
    assert!(job.monitor().blocked() > 0);
}

#[test]
fn test_event_stream_round_trip() {
    let mut job = McJob::new(Box::new(water_engine()), upstream_mono(-14, 1.2));
    let mut rng = StdRng::seed_from_u64(4);
    job.configure(&mut rng).expect("Configuration failed");

    let mut written = Vec::new();
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for index in 0..10u64 {
        let event = job
            .next_event(1, index, &mut rng)
            .expect("Generation failed")
            .expect("Flux should never exhaust");
        writeln!(file, "{}", event.to_json()).expect("Failed to write event");
        written.push(event);
    }
    file.flush().expect("Failed to flush");

    let text = std::fs::read_to_string(file.path()).expect("Failed to read back");
    let read: Vec<EventRecord> = text
        .lines()
        .map(|line| {
            let value = serde_json::from_str(line).expect("Bad JSON line");
            EventRecord::from_json(&value).expect("Bad event record")
        })
        .collect();

    assert_eq!(read.len(), written.len());
    for (a, b) in read.iter().zip(written.iter()) {
        assert_eq!(a.run, b.run);
        assert_eq!(a.index, b.index);
        assert_eq!(a.probe, b.probe);
        assert_eq!(a.target, b.target);
        assert_eq!(a.status, b.status);
        assert!((a.vertex - b.vertex).length() < 1e-12);
    }
}

#[test]
fn test_scan_table_round_trip() {
    let engine = water_engine();
    let lengths = engine.max_path_lengths_par(9).expect("Scan failed");
    let table = MaxPathTable::from_lengths(lengths, 60, 60);

    let file = NamedTempFile::new().expect("Failed to create temp file");
    table.save(file.path()).expect("Failed to save table");
    let loaded = MaxPathTable::load(file.path()).expect("Failed to load table");

    assert_eq!(loaded.surface_points(), 60);
    assert_eq!(loaded.surface_rays(), 60);
    for (id, length) in table.lengths().iter() {
        assert!(
            (loaded.get(id) - length).abs() < 1e-12,
            "mismatch for {}",
            id
        );
    }

    // a supplied table must reproduce the scanned probability scale
    let mut job = McJob::new(Box::new(water_engine()), upstream_mono(14, 2.0));
    job.use_max_paths(loaded.lengths().clone());
    let mut rng = StdRng::seed_from_u64(2);
    job.configure(&mut rng).expect("Configuration failed");
    assert!((job.prob_scale() - table.total() * 2.0).abs() < 1e-9);
}

#[test]
fn test_histogram_flux_end_to_end() {
    let mut flux_file = NamedTempFile::new().expect("Failed to create temp file");
    write!(
        flux_file,
        r#"{{"spectra": {{"numu": {{"edges": [0.5, 1.0, 2.0, 3.0], "contents": [0.0, 1.0, 0.5]}}}}}}"#
    )
    .expect("Failed to write flux file");
    flux_file.flush().expect("Failed to flush");

    let spec_text = format!("{},14[numu]", flux_file.path().display());
    let spec = FluxSpec::parse(&spec_text).expect("Failed to parse flux spec");
    let flux = spec
        .build(DVec3::new(0.0, 0.0, -25.0), DVec3::Z, None)
        .expect("Failed to build flux driver");
    assert!((flux.max_energy() - 3.0).abs() < 1e-12);

    let mut job = McJob::new(Box::new(water_engine()), flux);
    let mut rng = StdRng::seed_from_u64(31);
    job.configure(&mut rng).expect("Configuration failed");

    for index in 0..15u64 {
        let event = job
            .next_event(0, index, &mut rng)
            .expect("Generation failed")
            .expect("Flux should never exhaust");
        assert_eq!(event.probe, 14);
        // the first bin is empty, so no energy below 1 GeV is ever drawn
        assert!(event.energy >= 1.0 && event.energy <= 3.0, "energy {}", event.energy);
    }
}

#[test]
fn test_point_analyzer_matches_free_target_mix() {
    let mix = PointAnalyzer::parse("1000080160[0.888],1000010010[0.112]")
        .expect("Failed to parse target mix");
    let mut job = McJob::new(Box::new(mix), upstream_mono(14, 1.0));
    let mut rng = StdRng::seed_from_u64(6);
    job.configure(&mut rng).expect("Configuration failed");

    // mono flux on a point target interacts every time
    let mut h1 = 0u32;
    let mut o16 = 0u32;
    for index in 0..400u64 {
        let event = job
            .next_event(0, index, &mut rng)
            .expect("Generation failed")
            .expect("Flux should never exhaust");
        assert_eq!(event.vertex, DVec3::new(0.0, 0.0, -25.0));
        if event.target == IsotopeId::new(1, 1) {
            h1 += 1;
        } else if event.target == IsotopeId::new(16, 8) {
            o16 += 1;
        }
    }
    assert_eq!(h1 + o16, 400);
    // targets drawn by mass fraction, 0.112 vs 0.888
    let h1_share = h1 as f64 / 400.0;
    println!("H1 share: {}", h1_share);
    assert!(h1_share > 0.05 && h1_share < 0.19, "H1 share {}", h1_share);
}
