// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
// Additional warnings that are allow by default (`rustc -W help`)
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused)]

pub mod config;
pub mod data;
pub mod level;
pub mod map;
pub mod map_formatter;
pub mod moves;
pub mod parser;
pub mod solution_formatter;
pub mod solver;
pub mod state;
pub mod vec2d;

mod fs;

use std::error::Error;

use crate::config::Strategy;
use crate::level::Level;
use crate::solver::{SolverErr, SolverOk};

pub trait LoadLevel {
    fn load_level(&self) -> Result<Level, Box<dyn Error>>;
}

pub trait Solve {
    fn solve_bounded(
        &self,
        strategy: Strategy,
        max_nodes: Option<u64>,
        print_status: bool,
    ) -> Result<SolverOk, SolverErr>;

    fn solve(&self, strategy: Strategy, print_status: bool) -> Result<SolverOk, SolverErr> {
        self.solve_bounded(strategy, None, print_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::moves::Moves;
    use crate::solver::Outcome;

    const OPTIMAL_STRATEGIES: [Strategy; 3] = [Strategy::Bfs, Strategy::Ucs, Strategy::AStar];

    const SIMPLEST: &str = "
#####
#@$.#
#####
";

    const ONE_WAY: &str = "
###
#.#
# #
# #
#$#
#@#
###
";

    const CHICANE: &str = "
#######
#.    #
# $@  #
#     #
#######
";

    const THREE_BOXES: &str = "
#######
#     #
# $$$ #
# ... #
#  @  #
#######
";

    const NO_SOLUTION: &str = "
#####
#@$ #
#  .#
#####
";

    fn solve_to_moves(level: &Level, strategy: Strategy) -> Moves {
        let ok = level.solve(strategy, false).unwrap();
        match ok.outcome {
            Outcome::Solved(moves) => moves,
            ref other => panic!("{} did not solve the level: {:?}", strategy, other),
        }
    }

    #[test]
    fn optimal_strategies_agree_and_dfs_is_no_better() {
        for &level_str in &[SIMPLEST, ONE_WAY, CHICANE, THREE_BOXES] {
            let level: Level = level_str.parse().unwrap();

            let mut optimal_costs = Vec::new();
            for &strategy in &OPTIMAL_STRATEGIES {
                let moves = solve_to_moves(&level, strategy);
                assert!(
                    level.map.is_solved(&level.replay(&moves)),
                    "{} returned a sequence that does not solve the level",
                    strategy
                );
                optimal_costs.push(moves.move_cnt());
            }
            assert!(
                optimal_costs.iter().all(|&c| c == optimal_costs[0]),
                "optimal strategies disagree: {:?}",
                optimal_costs
            );

            let dfs_moves = solve_to_moves(&level, Strategy::Dfs);
            assert!(level.map.is_solved(&level.replay(&dfs_moves)));
            assert!(dfs_moves.move_cnt() >= optimal_costs[0]);
        }
    }

    #[test]
    fn known_optimal_costs() {
        let costs = [(SIMPLEST, 1), (ONE_WAY, 3), (CHICANE, 4)];
        for &(level_str, expected) in &costs {
            let level: Level = level_str.parse().unwrap();
            let moves = solve_to_moves(&level, Strategy::Bfs);
            assert_eq!(moves.move_cnt(), expected);
        }
    }

    #[test]
    fn deterministic_across_runs() {
        let level: Level = THREE_BOXES.parse().unwrap();
        for &strategy in &Strategy::ALL {
            let first = solve_to_moves(&level, strategy);
            let second = solve_to_moves(&level, strategy);
            assert_eq!(first.to_string(), second.to_string());
        }
    }

    #[test]
    fn zero_boxes_solved_immediately() {
        let level: Level = "####\n#@ #\n####".parse().unwrap();
        for &strategy in &Strategy::ALL {
            let ok = level.solve(strategy, false).unwrap();
            match ok.outcome {
                Outcome::Solved(ref moves) => assert_eq!(moves.move_cnt(), 0),
                ref other => panic!("{}: {:?}", strategy, other),
            }
            assert_eq!(ok.stats.total_unique_visited(), 1);
        }
    }

    #[test]
    fn unsolvable_level() {
        let level: Level = NO_SOLUTION.parse().unwrap();
        for &strategy in &Strategy::ALL {
            let ok = level.solve(strategy, false).unwrap();
            assert_eq!(ok.outcome, Outcome::Unsolvable, "{}", strategy);
        }
    }

    #[test]
    fn node_budget_is_respected() {
        let level: Level = ONE_WAY.parse().unwrap();
        for &strategy in &Strategy::ALL {
            let ok = level.solve_bounded(strategy, Some(1), false).unwrap();
            assert_eq!(ok.outcome, Outcome::ResourceExhausted, "{}", strategy);
            assert_eq!(ok.stats.total_unique_visited(), 1);
        }
    }

    #[test]
    fn loading_level_from_file() {
        let level = "levels/02-one-way.txt".load_level().unwrap();
        let moves = solve_to_moves(&level, Strategy::Bfs);
        assert_eq!(moves.to_string(), "UUU");
    }
}
