use std::env;
use std::fs;
use std::io;
use std::io::Write;

use anyhow::Error;
use clap::App;
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use satori::config::SolverConfig;
use satori::solver::Solver;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

pub fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("satori")
        .version(env!("SATORI_VERSION"))
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .get_matches();

    // All logging goes out as DIMACS comment lines, so piping the output stays valid.
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("SATORI_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();

    info!("This is satori {}", env!("SATORI_VERSION"));
    info!(
        "  {} build - {}",
        env!("SATORI_PROFILE"),
        env!("SATORI_RUSTC_VERSION")
    );

    let mut config = SolverConfig::default();

    if let Ok(seed) = env::var("SATORI_SEED") {
        config.branch_seed = seed.parse()?;
        info!("Branching RNG seeded with {}", config.branch_seed);
    }

    let mut solver = Solver::with_config(&config);

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    solver.add_dimacs_cnf(file)?;

    if solver.solve() {
        println!("s SATISFIABLE");
        print!("v");
        for lit in solver.model().unwrap() {
            print!(" {}", lit);
        }
        println!(" 0");
    } else {
        println!("s UNSATISFIABLE");
    }

    Ok(0)
}
