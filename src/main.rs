use std::process;
use std::time::Instant;

use clap::{App, Arg, ArgGroup};
use prettytable::{Cell, Row, Table};
use separator::Separatable;

use pushbox_solver::config::Strategy;
use pushbox_solver::level::Level;
use pushbox_solver::solver::{Outcome, SolverOk};
use pushbox_solver::{LoadLevel, Solve};

fn main() {
    env_logger::init();

    let matches = App::new("pushbox-solver")
        .version("0.1")
        .arg(
            Arg::with_name("bfs")
                .long("--bfs")
                .help("breadth-first search (move-optimal)"),
        )
        .arg(
            Arg::with_name("dfs")
                .long("--dfs")
                .help("depth-first search (finds some solution)"),
        )
        .arg(
            Arg::with_name("ucs")
                .long("--ucs")
                .help("uniform-cost search (move-optimal)"),
        )
        .arg(
            Arg::with_name("astar")
                .long("--astar")
                .help("A* search (move-optimal, default)"),
        )
        .group(
            ArgGroup::with_name("strategy")
                .arg("bfs")
                .arg("dfs")
                .arg("ucs")
                .arg("astar"),
        )
        .arg(
            Arg::with_name("all")
                .long("--all")
                .conflicts_with("strategy")
                .help("run every strategy and print a comparison table"),
        )
        .arg(
            Arg::with_name("max-nodes")
                .long("--max-nodes")
                .takes_value(true)
                .help("give up after expanding this many states"),
        )
        .arg(
            Arg::with_name("frames")
                .long("--frames")
                .help("print the solution as board snapshots"),
        )
        .arg(
            Arg::with_name("status")
                .long("--status")
                .help("print progress while searching"),
        )
        .arg(Arg::with_name("file").required(true))
        .get_matches();

    let path = matches.value_of("file").unwrap();
    let max_nodes = matches.value_of("max-nodes").map(|value| {
        value.parse().unwrap_or_else(|_| {
            println!("--max-nodes must be a number");
            process::exit(1);
        })
    });

    let level = path.load_level().unwrap_or_else(|err| {
        println!("Can't load level {}: {}", path, err);
        process::exit(1);
    });

    if matches.is_present("all") {
        run_all(&level, path, max_nodes);
        return;
    }

    let strategy = if matches.is_present("bfs") {
        Strategy::Bfs
    } else if matches.is_present("dfs") {
        Strategy::Dfs
    } else if matches.is_present("ucs") {
        Strategy::Ucs
    } else {
        Strategy::AStar
    };

    println!("Solving {} using {}...", path, strategy);
    let (solver_ok, millis) = run(&level, strategy, max_nodes, matches.is_present("status"));

    match solver_ok.outcome {
        Outcome::Solved(ref moves) => {
            println!("Found solution: {}", moves);
            println!("Moves: {}", moves.move_cnt());
            println!("Pushes: {}", moves.push_cnt());
            if matches.is_present("frames") {
                println!("{}", level.format_solution(moves, true));
            }
        }
        Outcome::Unsolvable => println!("No solution"),
        Outcome::ResourceExhausted => println!("Node limit reached"),
    }
    print!("{}", solver_ok.stats);
    eprintln!("Runtime of {}: {} ms", strategy, millis.separated_string());
}

fn run(level: &Level, strategy: Strategy, max_nodes: Option<u64>, status: bool) -> (SolverOk, u64) {
    let started = Instant::now();
    let solver_ok = level
        .solve_bounded(strategy, max_nodes, status)
        .unwrap_or_else(|err| {
            println!("Invalid level: {}", err);
            process::exit(1);
        });
    // separator doesn't support u128
    let millis = started.elapsed().as_millis() as u64;
    (solver_ok, millis)
}

fn run_all(level: &Level, path: &str, max_nodes: Option<u64>) {
    println!("Solving {} using every strategy...", path);

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("strategy"),
        Cell::new("result"),
        Cell::new("moves"),
        Cell::new("pushes"),
        Cell::new("created"),
        Cell::new("visited"),
        Cell::new("time [ms]"),
    ]));

    for &strategy in &Strategy::ALL {
        let (solver_ok, millis) = run(level, strategy, max_nodes, false);
        let (result, moves, pushes) = match solver_ok.outcome {
            Outcome::Solved(ref moves) => (
                "solved",
                moves.move_cnt().to_string(),
                moves.push_cnt().to_string(),
            ),
            Outcome::Unsolvable => ("no solution", "-".to_string(), "-".to_string()),
            Outcome::ResourceExhausted => ("node limit", "-".to_string(), "-".to_string()),
        };
        table.add_row(Row::new(vec![
            Cell::new(&strategy.to_string()),
            Cell::new(result),
            Cell::new(&moves),
            Cell::new(&pushes),
            Cell::new(&solver_ok.stats.total_created().separated_string()),
            Cell::new(&solver_ok.stats.total_unique_visited().separated_string()),
            Cell::new(&millis.separated_string()),
        ]));
    }

    table.printstd();
}
