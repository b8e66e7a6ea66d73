use std::path::PathBuf;
use std::process;

use phantom_config::Simulation;
use phantom_core::error::Result;

enum Source {
    Json(PathBuf),
    Ron(PathBuf),
}

#[derive(Default)]
struct Dumps {
    tree: bool,
    cuts: bool,
    volumes: bool,
    types: bool,
}

impl Dumps {
    fn any(&self) -> bool {
        self.tree || self.cuts || self.volumes || self.types
    }
}

fn print_usage() {
    eprintln!("Usage: phantom-inspect [OPTIONS]");
    eprintln!("  --json <path>     Load a JSON configuration");
    eprintln!("  --ron <path>      Load a RON configuration");
    eprintln!("  --output <path>   Write the loaded configuration as JSON");
    eprintln!("  --tree            Print the volume hierarchy");
    eprintln!("  --cuts            Print global and per-region production cuts");
    eprintln!("  --volumes         Print every volume");
    eprintln!("  --types           Print the registered volume types");
    eprintln!("Without a dump flag the full summary is printed.");
}

fn next_path(args: &[String], i: usize, flag: &str) -> PathBuf {
    match args.get(i) {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("{} expects a path", flag);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut source: Option<Source> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut dumps = Dumps::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                i += 1;
                source = Some(Source::Json(next_path(&args, i, "--json")));
            }
            "--ron" => {
                i += 1;
                source = Some(Source::Ron(next_path(&args, i, "--ron")));
            }
            "--output" => {
                i += 1;
                output_path = Some(next_path(&args, i, "--output"));
            }
            "--tree" => dumps.tree = true,
            "--cuts" => dumps.cuts = true,
            "--volumes" => dumps.volumes = true,
            "--types" => dumps.types = true,
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    if let Err(e) = inspect(source, output_path.as_ref(), &dumps) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
}

fn inspect(source: Option<Source>, output: Option<&PathBuf>, dumps: &Dumps) -> Result<()> {
    let mut sim = Simulation::default();
    match source {
        Some(Source::Json(path)) => sim.from_json_file(&path)?,
        Some(Source::Ron(path)) => sim.from_ron_file(&path)?,
        None => log::info!("No configuration given, inspecting the default one"),
    }

    if !dumps.any() {
        print!("{}", sim.summary()?);
    }
    if dumps.types {
        print!("{}", sim.volume_manager.describe_volume_types());
    }
    if dumps.volumes {
        println!("{}", sim.volume_manager.dump_volumes());
    }
    if dumps.tree {
        print!("{}", sim.volume_manager.dump_tree()?);
    }
    if dumps.cuts {
        print!("{}", sim.physics_manager.dump_production_cuts());
    }

    if let Some(path) = output {
        sim.to_json_file(path)?;
    }
    Ok(())
}
