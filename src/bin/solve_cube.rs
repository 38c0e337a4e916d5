use std::path::PathBuf;
use std::time::Instant;

use cube_solver::{CubieCube, Move, Solver};

fn usage() -> ! {
    eprintln!(
        "Usage: solve_cube [--tables DIR] --facelets STRING\n\
                solve_cube [--tables DIR] MOVE [MOVE ...]\n\n\
         Solves the state reached by applying the scramble MOVEs to the\n\
         solved cube (standard notation: U U2 U' R ...), or the state given\n\
         as a 54-character facelet string in U R F D L B order.\n\
         Tables are loaded from DIR (default ./tables), building them on\n\
         first use."
    );
    std::process::exit(2);
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut table_dir = PathBuf::from("tables");
    let mut facelets: Option<String> = None;
    let mut scramble: Vec<Move> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tables" => match args.next() {
                Some(dir) => table_dir = PathBuf::from(dir),
                None => usage(),
            },
            "--facelets" => match args.next() {
                Some(s) => facelets = Some(s),
                None => usage(),
            },
            word => match word.parse::<Move>() {
                Ok(m) => scramble.push(m),
                Err(e) => {
                    eprintln!("{e}");
                    usage();
                }
            },
        }
    }

    if facelets.is_some() == !scramble.is_empty() {
        // exactly one input form, please
        usage();
    }

    let solver = match Solver::from_cache_dir(&table_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to prepare tables: {e}");
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    let result = match &facelets {
        Some(s) => solver.solve_facelets(s),
        None => {
            let mut cube = CubieCube::SOLVED;
            for &m in scramble.iter() {
                cube.apply_move(m);
            }
            solver.solve(&cube)
        }
    };

    match result {
        Ok(solution) if solution.is_empty() => println!("Already solved."),
        Ok(solution) => {
            println!("{solution}");
            println!(
                "{} moves ({} phase 1, {} phase 2) in {:.3}s",
                solution.len(),
                solution.phase1_length,
                solution.len() - solution.phase1_length,
                started.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
