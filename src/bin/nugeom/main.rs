//! nugeom CLI - Event generation and geometry inspection tool.

use nugeom::core::{
    EngineConfig, GeomAnalyzer, GeomEngine, MaxPathTable, PathLengthList, PointAnalyzer, Ray,
};
use nugeom::driver::McJob;
use nugeom::event::EventStatus;
use nugeom::flux::FluxSpec;
use nugeom::geom::{BoxTree, VolumeNavigator};
use nugeom::util::units;
use nugeom::util::DVec3;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing_subscriber::prelude::*;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "off",
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Gen command - generate events
        "gen" | "g" => cmd_gen(&filtered_args[1..]),

        // Scan command - precompute maximum path lengths
        "scan" | "s" => cmd_scan(&filtered_args[1..]),

        // Paths command - march one ray
        "paths" | "p" => {
            if filtered_args.len() < 4 {
                eprintln!("Error: missing arguments");
                eprintln!("Usage: nugeom-cli paths <geometry> <ox,oy,oz> <dx,dy,dz> [--json]");
                std::process::exit(1);
            }
            cmd_paths(
                filtered_args[1],
                filtered_args[2],
                filtered_args[3],
                &filtered_args[4..],
            );
        }

        // Isotopes command - list the registered isotope set
        "isotopes" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing geometry argument");
                eprintln!("Usage: nugeom-cli isotopes <geometry>");
                std::process::exit(1);
            }
            cmd_isotopes(filtered_args[1], &filtered_args[2..]);
        }

        // Version
        "version" | "V" | "--version" => print_version(),

        // Help
        "help" | "h" | "-h" | "--help" => print_help(),

        _ => {
            eprintln!("Unknown command: {}", filtered_args[0]);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr));
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn print_help() {
    println!("nugeom-cli - neutrino event generation toolkit");
    println!();
    println!("USAGE:");
    println!("    nugeom-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    g, gen      -g <geom> -f <flux> -n <count>   Generate events");
    println!("    s, scan     -g <geom> -o <table>             Precompute max path lengths");
    println!("    p, paths    <geom> <origin> <dir> [--json]   Path lengths along one ray");
    println!("    i, isotopes <geom>                           List the isotope set");
    println!("    V, version                                   Show version and build info");
    println!("    h, help                                      Show this help");
    println!();
    println!("GEOMETRY:");
    println!("    <geom> is either a JSON box-tree file or a comma-separated target mix");
    println!("    of PDG ion codes with mass fractions, e.g. 1000080160[0.95],1000010010[0.05]");
    println!();
    println!("GEN/SCAN OPTIONS:");
    println!("    -g <geom>      Geometry file or target mix (required)");
    println!("    -f <flux>      Flux: CODE[ENERGY] for mono-energetic, or");
    println!("                   FILE,CODE[NAME],... binding histogram spectra (gen only)");
    println!("    -t <name>      Top volume to restrict traversal to");
    println!("    -L <unit>      Geometry length unit when the file declares none [mm]");
    println!("    -D <unit>      Geometry density unit when the file declares none [g_cm3]");
    println!("    -n <count>     Number of events to generate [100]");
    println!("    -r <run>       Run number [0]");
    println!("    -s <seed>      Random seed [0]");
    println!("    -m <table>     Max-path-length table file; skips the geometry scan (gen)");
    println!("    -o <out>       gen: output prefix, writes <out>.<run>.jsonl [events]");
    println!("                   scan: table file to write (required)");
    println!("    -p <points>    Scan points per surface face [200] (scan)");
    println!("    -R <rays>      Scan rays per surface point [200] (scan)");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress all log output");
    println!();
    println!("EXAMPLES:");
    println!("    nugeom-cli gen -g detector.json -f '14[2.5]' -n 1000 -r 7 -o run7");
    println!("    nugeom-cli gen -g detector.json -f 'flux.json,14[numu],-14[numubar]' -n 500");
    println!("    nugeom-cli gen -g '1000080160[0.888],1000010010[0.112]' -f '14[1.0]' -n 100");
    println!("    nugeom-cli scan -g detector.json -o detector.maxpl.json -p 400 -R 400");
    println!("    nugeom-cli paths detector.json 0,0,-2000 0,0,1");
    println!("    nugeom-cli -v isotopes detector.json");
    println!();
    println!("NOTES:");
    println!("    - Flux rays start upstream of the geometry along +z");
    println!("    - Pauli-blocked candidates are written flagged and regenerated");
}

fn print_version() {
    println!(
        "nugeom-cli {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("NUGEOM_BUILD_DATE").unwrap_or("unknown"),
        option_env!("NUGEOM_BUILD_TIME").unwrap_or("unknown"),
    );
}

// ============================================================================
// Geometry loading shared by all commands
// ============================================================================

/// A geometry argument resolves to the full engine or the point analyzer.
enum LoadedGeom {
    Tree(GeomEngine<BoxTree>),
    Point(PointAnalyzer),
}

impl LoadedGeom {
    fn load(spec: &str, top: Option<&str>, lunit: &str, dunit: &str, config: EngineConfig) -> Self {
        if Path::new(spec).exists() {
            let mut tree = match BoxTree::from_json_file_with_units(spec, lunit, dunit) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Failed to load geometry {}: {}", spec, e);
                    std::process::exit(1);
                }
            };
            if let Some(name) = top {
                if let Err(e) = tree.set_top(name) {
                    eprintln!("Failed to set top volume: {}", e);
                    std::process::exit(1);
                }
            }
            LoadedGeom::Tree(GeomEngine::with_config(tree, config))
        } else {
            match PointAnalyzer::parse(spec) {
                Ok(p) => LoadedGeom::Point(p),
                Err(e) => {
                    eprintln!("'{}' is neither a geometry file nor a target mix: {}", spec, e);
                    std::process::exit(1);
                }
            }
        }
    }

    fn analyzer(&self) -> &dyn GeomAnalyzer {
        match self {
            LoadedGeom::Tree(engine) => engine,
            LoadedGeom::Point(point) => point,
        }
    }

    fn into_analyzer(self) -> Box<dyn GeomAnalyzer> {
        match self {
            LoadedGeom::Tree(engine) => Box::new(engine),
            LoadedGeom::Point(point) => Box::new(point),
        }
    }

    /// Flux rays enter along +z; start far enough upstream to clear the
    /// whole geometry.
    fn flux_start(&self) -> DVec3 {
        match self {
            LoadedGeom::Tree(engine) => {
                let bbox = engine.navigator().bounding_box();
                let center = bbox.center();
                let clearance = bbox.size().length().max(1.0);
                DVec3::new(center.x, center.y, bbox.min.z - clearance)
            }
            LoadedGeom::Point(_) => DVec3::ZERO,
        }
    }

    fn scan(&self, seed: u64) -> nugeom::Result<PathLengthList> {
        match self {
            // rayon scan for real geometries, trivial path for target mixes
            LoadedGeom::Tree(engine) => engine.max_path_lengths_par(seed),
            LoadedGeom::Point(point) => {
                let mut rng = StdRng::seed_from_u64(seed);
                point.max_path_lengths(&mut rng)
            }
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_gen(args: &[&str]) {
    let mut geometry: Option<&str> = None;
    let mut flux_spec: Option<&str> = None;
    let mut top: Option<&str> = None;
    let mut table_file: Option<&str> = None;
    let mut lunit = units::DEFAULT_LENGTH_UNIT;
    let mut dunit = units::DEFAULT_DENSITY_UNIT;
    let mut count: u64 = 100;
    let mut run: u32 = 0;
    let mut seed: u64 = 0;
    let mut prefix = "events";

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "-g" => geometry = Some(next_value(args, &mut i, "-g")),
            "-f" => flux_spec = Some(next_value(args, &mut i, "-f")),
            "-t" => top = Some(next_value(args, &mut i, "-t")),
            "-m" => table_file = Some(next_value(args, &mut i, "-m")),
            "-L" => lunit = next_value(args, &mut i, "-L"),
            "-D" => dunit = next_value(args, &mut i, "-D"),
            "-n" => count = parse_num(next_value(args, &mut i, "-n"), "-n"),
            "-r" => run = parse_num(next_value(args, &mut i, "-r"), "-r"),
            "-s" => seed = parse_num(next_value(args, &mut i, "-s"), "-s"),
            "-o" => prefix = next_value(args, &mut i, "-o"),
            other => unknown_option(other, "gen"),
        }
        i += 1;
    }

    let Some(geometry) = geometry else {
        eprintln!("Error: gen requires a geometry (-g)");
        std::process::exit(1);
    };
    let Some(flux_spec) = flux_spec else {
        eprintln!("Error: gen requires a flux spec (-f)");
        std::process::exit(1);
    };

    let spec = match FluxSpec::parse(flux_spec) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Bad flux spec '{}': {}", flux_spec, e);
            std::process::exit(1);
        }
    };

    let geom = LoadedGeom::load(geometry, top, lunit, dunit, EngineConfig::default());
    let flux = match spec.build(geom.flux_start(), DVec3::Z, None) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to build flux driver: {}", e);
            std::process::exit(1);
        }
    };

    let mut job = McJob::new(geom.into_analyzer(), flux);
    if let Some(path) = table_file {
        match MaxPathTable::load(path) {
            Ok(table) => job.use_max_paths(table.lengths().clone()),
            Err(e) => {
                eprintln!("Failed to load max path table {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    if let Err(e) = job.configure(&mut rng) {
        eprintln!("Job configuration failed: {}", e);
        std::process::exit(1);
    }

    let out_path = format!("{}.{}.jsonl", prefix, run);
    let file = match File::create(&out_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to create {}: {}", out_path, e);
            std::process::exit(1);
        }
    };
    let mut out = BufWriter::new(file);

    let mut generated: u64 = 0;
    while generated < count {
        let event = match job.next_event(run, generated, &mut rng) {
            Ok(Some(ev)) => ev,
            Ok(None) => {
                eprintln!("Flux exhausted after {} events", generated);
                break;
            }
            Err(e) => {
                eprintln!("Event generation failed: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = writeln!(out, "{}", event.to_json()) {
            eprintln!("Failed to write {}: {}", out_path, e);
            std::process::exit(1);
        }
        if event.status == EventStatus::Generated {
            generated += 1;
        }
    }
    if let Err(e) = out.flush() {
        eprintln!("Failed to write {}: {}", out_path, e);
        std::process::exit(1);
    }

    job.monitor().summarize();
    println!(
        "Wrote {} events ({} Pauli-blocked candidates) to {}",
        generated,
        job.monitor().blocked(),
        out_path
    );
}

fn cmd_scan(args: &[&str]) {
    let mut geometry: Option<&str> = None;
    let mut top: Option<&str> = None;
    let mut lunit = units::DEFAULT_LENGTH_UNIT;
    let mut dunit = units::DEFAULT_DENSITY_UNIT;
    let mut seed: u64 = 0;
    let mut out_file: Option<&str> = None;
    let mut config = EngineConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "-g" => geometry = Some(next_value(args, &mut i, "-g")),
            "-t" => top = Some(next_value(args, &mut i, "-t")),
            "-L" => lunit = next_value(args, &mut i, "-L"),
            "-D" => dunit = next_value(args, &mut i, "-D"),
            "-s" => seed = parse_num(next_value(args, &mut i, "-s"), "-s"),
            "-o" => out_file = Some(next_value(args, &mut i, "-o")),
            "-p" => config.surface_points = parse_num(next_value(args, &mut i, "-p"), "-p"),
            "-R" => config.surface_rays = parse_num(next_value(args, &mut i, "-R"), "-R"),
            other => unknown_option(other, "scan"),
        }
        i += 1;
    }

    let Some(geometry) = geometry else {
        eprintln!("Error: scan requires a geometry (-g)");
        std::process::exit(1);
    };
    let Some(out_file) = out_file else {
        eprintln!("Error: scan requires an output table file (-o)");
        std::process::exit(1);
    };

    let geom = LoadedGeom::load(geometry, top, lunit, dunit, config);
    let lengths = match geom.scan(seed) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Geometry scan failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("Maximum path lengths:");
    for (id, length) in lengths.iter() {
        println!("  {:>12}  {:<10} {:.6}", id.code(), id.to_string(), length);
    }

    let table = MaxPathTable::from_lengths(lengths, config.surface_points, config.surface_rays);
    if let Err(e) = table.save(out_file) {
        eprintln!("Failed to write {}: {}", out_file, e);
        std::process::exit(1);
    }
    println!("Wrote max path length table to {}", out_file);
}

fn cmd_paths(geometry: &str, origin_arg: &str, dir_arg: &str, rest: &[&str]) {
    let mut top: Option<&str> = None;
    let mut lunit = units::DEFAULT_LENGTH_UNIT;
    let mut dunit = units::DEFAULT_DENSITY_UNIT;
    let mut json_mode = false;

    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "-t" => top = Some(next_value(rest, &mut i, "-t")),
            "-L" => lunit = next_value(rest, &mut i, "-L"),
            "-D" => dunit = next_value(rest, &mut i, "-D"),
            "--json" | "-j" => json_mode = true,
            other => unknown_option(other, "paths"),
        }
        i += 1;
    }

    let origin = parse_vec3(origin_arg);
    let dir = parse_vec3(dir_arg);
    let ray = match Ray::new(origin, dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Bad ray: {}", e);
            std::process::exit(1);
        }
    };

    let geom = LoadedGeom::load(geometry, top, lunit, dunit, EngineConfig::default());
    let lengths = match geom.analyzer().path_lengths(ray) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Traversal failed: {}", e);
            std::process::exit(1);
        }
    };

    if json_mode {
        println!("{}", lengths.to_json());
        return;
    }

    println!("Ray: origin ({}, {}, {})  dir ({}, {}, {})",
        origin.x, origin.y, origin.z, dir.x, dir.y, dir.z);
    println!();
    println!("Density-weighted path lengths:");
    for (id, length) in lengths.iter() {
        println!("  {:>12}  {:<10} {:.6}", id.code(), id.to_string(), length);
    }
    println!();
    println!("Total: {:.6}", lengths.total());
}

fn cmd_isotopes(geometry: &str, rest: &[&str]) {
    let mut top: Option<&str> = None;
    let mut lunit = units::DEFAULT_LENGTH_UNIT;
    let mut dunit = units::DEFAULT_DENSITY_UNIT;

    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "-t" => top = Some(next_value(rest, &mut i, "-t")),
            "-L" => lunit = next_value(rest, &mut i, "-L"),
            "-D" => dunit = next_value(rest, &mut i, "-D"),
            other => unknown_option(other, "isotopes"),
        }
        i += 1;
    }

    let geom = LoadedGeom::load(geometry, top, lunit, dunit, EngineConfig::default());
    let set = geom.analyzer().isotopes();

    println!("Registered isotopes ({}):", set.len());
    for id in set.iter() {
        println!("  {:>12}  {:<8} A={:<3} Z={}", id.code(), id.to_string(), id.a(), id.z());
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

fn next_value<'a>(args: &[&'a str], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(v) => v,
        None => {
            eprintln!("Error: {} requires a value", flag);
            std::process::exit(1);
        }
    }
}

fn parse_num<T: std::str::FromStr>(text: &str, flag: &str) -> T {
    match text.parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Error: bad value '{}' for {}", text, flag);
            std::process::exit(1);
        }
    }
}

fn parse_vec3(text: &str) -> DVec3 {
    let parts: Vec<f64> = text
        .split(',')
        .map(|p| match p.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                eprintln!("Error: bad vector '{}', expected x,y,z", text);
                std::process::exit(1);
            }
        })
        .collect();
    if parts.len() != 3 {
        eprintln!("Error: bad vector '{}', expected x,y,z", text);
        std::process::exit(1);
    }
    DVec3::new(parts[0], parts[1], parts[2])
}

fn unknown_option(opt: &str, command: &str) -> ! {
    eprintln!("Unknown option for {}: {}", command, opt);
    std::process::exit(1);
}
