use std::path::PathBuf;
use std::time::Instant;

use cube_solver::Tables;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let dir = match args.len() {
        1 => PathBuf::from("tables"),
        2 => PathBuf::from(&args[1]),
        _ => {
            eprintln!("Usage: build_tables [table-dir]\n\nDefault table-dir is ./tables.");
            std::process::exit(2);
        }
    };

    let started = Instant::now();
    let tables = match Tables::load_or_build(&dir) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to build tables: {e}");
            std::process::exit(1);
        }
    };

    println!("Tables ready in {:.2}s at {}", started.elapsed().as_secs_f64(), dir.display());
    println!("  twist_udslice_prune:       max depth {}", tables.twist_udslice_prune.max_depth());
    println!("  flip_udslice_prune:        max depth {}", tables.flip_udslice_prune.max_depth());
    println!("  corner_perm_udslice_prune: max depth {}", tables.corner_perm_udslice_prune.max_depth());
    println!("  ud_edge_udslice_prune:     max depth {}", tables.ud_edge_udslice_prune.max_depth());
}
