mod deadlock;
mod level;
mod search;

pub use self::search::Stats;

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use fnv::FnvHashSet;
use log::debug;

use crate::config::Strategy;
use crate::data::{MapCell, Pos, DIRECTIONS, MAX_BOXES};
use crate::level::Level;
use crate::map::GoalMap;
use crate::moves::{Move, Moves};
use crate::state::State;
use crate::vec2d::Vec2d;
use crate::Solve;

use self::level::SolverLevel;
use self::search::{Frontier, SearchNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverErr {
    IncompleteBorder,
    UnreachableBoxes,
    UnreachableGoals,
    TooMany,
    BoxesGoals,
}

impl Display for SolverErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            SolverErr::IncompleteBorder => write!(f, "Incomplete border"),
            SolverErr::UnreachableBoxes => write!(
                f,
                "Unreachable boxes - some boxes are not on goal but can't be reached"
            ),
            SolverErr::UnreachableGoals => write!(
                f,
                "Unreachable goals - some goals don't have a box but can't be reached"
            ),
            SolverErr::TooMany => write!(f, "More than 254 reachable boxes or goals"),
            SolverErr::BoxesGoals => write!(f, "Different number of reachable boxes and goals"),
        }
    }
}

impl Error for SolverErr {}

/// How a search ended. `Unsolvable` and `ResourceExhausted` are normal
/// outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved(Moves),
    Unsolvable,
    ResourceExhausted,
}

impl Outcome {
    pub fn moves(&self) -> Option<&Moves> {
        match *self {
            Outcome::Solved(ref moves) => Some(moves),
            _ => None,
        }
    }
}

pub struct SolverOk {
    pub outcome: Outcome,
    pub stats: Stats,
    pub(crate) strategy: Strategy,
}

impl SolverOk {
    fn new(outcome: Outcome, stats: Stats, strategy: Strategy) -> Self {
        Self {
            outcome,
            stats,
            strategy,
        }
    }

    pub fn moves(&self) -> Option<&Moves> {
        self.outcome.moves()
    }
}

impl Debug for SolverOk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Solved(ref moves) => {
                writeln!(f, "{}: {} moves", self.strategy, moves.move_cnt())?
            }
            Outcome::Unsolvable => writeln!(f, "{}: no solution", self.strategy)?,
            Outcome::ResourceExhausted => writeln!(f, "{}: node limit reached", self.strategy)?,
        }
        write!(f, "{}", self.stats)
    }
}

impl Solve for Level {
    fn solve_bounded(
        &self,
        strategy: Strategy,
        max_nodes: Option<u64>,
        print_status: bool,
    ) -> Result<SolverOk, SolverErr> {
        debug!("Processing level...");
        let solver_level = process_level(self)?;
        debug!("Processed level");
        Ok(search(&solver_level, strategy, max_nodes, print_status))
    }
}

fn process_level(level: &Level) -> Result<SolverLevel, SolverErr> {
    // Guarantees we have here:
    // - the player exists and therefore the map is at least 1x1
    // - rows and cols are <= 255
    // Do some more low level checking so we can omit some checks later.

    // make sure the level is surrounded by wall
    let mut to_visit = vec![level.state.player_pos];
    let mut visited = level.map.grid.create_scratchpad(false);

    while let Some(cur) = to_visit.pop() {
        visited[cur] = true;

        let (r, c) = (i32::from(cur.r), i32::from(cur.c));
        let neighbors = [(r + 1, c), (r - 1, c), (r, c + 1), (r, c - 1)];
        for &(nr, nc) in &neighbors {
            // the player-reachable region is the only place that needs real
            // bounds checks - everything else is surrounded by walls after this
            if !level.map.grid.in_bounds(nr, nc) {
                // we got out of bounds without hitting a wall
                return Err(SolverErr::IncompleteBorder);
            }

            let new_pos = Pos::new(nr as u8, nc as u8);
            if !visited[new_pos] && level.map.grid[new_pos] != MapCell::Wall {
                to_visit.push(new_pos);
            }
        }
    }

    // make sure all relevant game elements are reachable
    let mut reachable_goals = Vec::new();
    let mut reachable_boxes = Vec::new();
    for &pos in &level.state.boxes {
        if visited[pos] {
            reachable_boxes.push(pos);
        } else if !level.map.goals.contains(&pos) {
            return Err(SolverErr::UnreachableBoxes);
        }
    }
    for &pos in &level.map.goals {
        if visited[pos] {
            reachable_goals.push(pos);
        } else if !level.state.boxes.contains(&pos) {
            return Err(SolverErr::UnreachableGoals);
        }
    }

    // make sure all non-reachable cells are walls
    // to avoid errors with code that iterates through all non-walls
    let mut processed_grid = level.map.grid.clone();
    for r in 0..processed_grid.rows() {
        for c in 0..processed_grid.cols() {
            let pos = Pos::new(r, c);
            if !visited[pos] {
                processed_grid[pos] = MapCell::Wall;
            }
        }
    }

    if reachable_boxes.len() != reachable_goals.len() {
        return Err(SolverErr::BoxesGoals);
    }

    // only 254 because 255 is used to represent empty in the box index grid
    if reachable_boxes.len() > MAX_BOXES {
        return Err(SolverErr::TooMany);
    }

    let processed_map = GoalMap::new(processed_grid, reachable_goals);
    let clean_state = State::new(level.state.player_pos, reachable_boxes);
    let dead_cells = deadlock::find_dead_cells(&processed_map);
    Ok(SolverLevel::new(processed_map, clean_state, dead_cells))
}

/// The single search driver - the strategies only differ in the frontier
/// and in how a node's priority is computed.
fn search(
    level: &SolverLevel,
    strategy: Strategy,
    max_nodes: Option<u64>,
    print_status: bool,
) -> SolverOk {
    debug!("Search called with {}", strategy);

    let mut stats = Stats::new();
    let mut arena: Vec<SearchNode> = Vec::new();
    let mut visited: FnvHashSet<State> = FnvHashSet::default();
    let mut frontier = Frontier::new(strategy);

    let start = SearchNode::new(level.state.clone(), None, None, 0);
    stats.add_created(&start);
    if deadlock::is_deadlocked(&level.map, &level.dead_cells, &start.state) {
        debug!("Initial state is deadlocked");
        stats.add_deadlocked(&start);
        return SolverOk::new(Outcome::Unsolvable, stats, strategy);
    }
    let priority = node_priority(strategy, &level.map, &start);
    arena.push(start);
    frontier.push(0, priority);

    while let Some(index) = frontier.pop() {
        if visited.contains(&arena[index].state) {
            stats.add_reached_duplicate(&arena[index]);
            continue;
        }

        if let Some(max) = max_nodes {
            if visited.len() as u64 >= max {
                debug!("Node budget exhausted");
                return SolverOk::new(Outcome::ResourceExhausted, stats, strategy);
            }
        }

        visited.insert(arena[index].state.clone());
        if stats.add_unique_visited(&arena[index]) && print_status {
            println!("Visited new depth: {}", arena[index].dist);
            println!("{:?}", stats);
        }

        if level.map.is_solved(&arena[index].state) {
            debug!("Solved, backtracking moves");
            return SolverOk::new(
                Outcome::Solved(backtrack_moves(&arena, index)),
                stats,
                strategy,
            );
        }

        let cur_dist = arena[index].dist;
        for (neighbor_state, mov) in expand(&level.map, &arena[index].state, &level.dead_cells) {
            let next = SearchNode::new(neighbor_state, Some(index), Some(mov), cur_dist + 1);
            if visited.contains(&next.state) {
                stats.add_reached_duplicate(&next);
                continue;
            }
            if deadlock::is_deadlocked(&level.map, &level.dead_cells, &next.state) {
                stats.add_deadlocked(&next);
                continue;
            }
            stats.add_created(&next);
            let priority = node_priority(strategy, &level.map, &next);
            arena.push(next);
            frontier.push(arena.len() - 1, priority);
        }
    }

    SolverOk::new(Outcome::Unsolvable, stats, strategy)
}

fn node_priority(strategy: Strategy, map: &GoalMap, node: &SearchNode) -> u32 {
    match strategy {
        // insertion order is all that matters for queue and stack
        Strategy::Bfs | Strategy::Dfs => 0,
        Strategy::Ucs => node.dist,
        Strategy::AStar => node.dist + heuristic(map, &node.state),
    }
}

/// Legal successors with their move labels, in fixed direction order.
fn expand(map: &GoalMap, state: &State, dead_cells: &Vec2d<bool>) -> Vec<(State, Move)> {
    let mut new_states = Vec::new();

    let mut box_grid = map.grid.create_scratchpad(255u8);
    for (i, b) in state.boxes.iter().enumerate() {
        box_grid[*b] = i as u8;
    }

    for &dir in &DIRECTIONS {
        let new_player_pos = state.player_pos + dir;
        if map.grid[new_player_pos] == MapCell::Wall {
            continue;
        }

        let box_index = box_grid[new_player_pos];
        if box_index == 255 {
            // walk
            new_states.push((
                State::new(new_player_pos, state.boxes.clone()),
                Move::new(dir, false),
            ));
        } else {
            let push_dest = new_player_pos + dir;
            // dead covers walls too
            if box_grid[push_dest] == 255 && !dead_cells[push_dest] {
                // push
                let mut new_boxes = state.boxes.clone();
                new_boxes[box_index as usize] = push_dest;
                new_states.push((State::new(new_player_pos, new_boxes), Move::new(dir, true)));
            }
        }
    }

    new_states
}

/// Sum of each box's Manhattan distance to its nearest goal. Never
/// overestimates the number of remaining moves, so A* stays optimal.
pub(crate) fn heuristic(map: &GoalMap, state: &State) -> u32 {
    let mut goal_dist_sum = 0;
    for box_pos in &state.boxes {
        let mut min = u16::max_value();
        for goal in &map.goals {
            let dist = box_pos.dist(*goal);
            if dist < min {
                min = dist;
            }
        }
        goal_dist_sum += u32::from(min);
    }
    goal_dist_sum
}

fn backtrack_moves(arena: &[SearchNode], index: usize) -> Moves {
    let mut moves = Vec::new();
    let mut cur = index;
    while let Some(prev) = arena[cur].prev {
        let mov = arena[cur].mov.expect("non-root node without a move");
        moves.push(mov);
        cur = prev;
    }
    moves.reverse();
    Moves::new(moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_boxes() {
        let level = r"
########
#@$.#$.#
########
";
        let level: Level = level.parse().unwrap();
        assert_eq!(
            process_level(&level).unwrap_err(),
            SolverErr::UnreachableBoxes
        );
    }

    #[test]
    fn incomplete_border() {
        let level = r"
####
#@$.
####
";
        let level: Level = level.parse().unwrap();
        assert_eq!(
            process_level(&level).unwrap_err(),
            SolverErr::IncompleteBorder
        );
    }

    #[test]
    fn mismatched_counts() {
        let level = r"
######
#@$$.#
######
";
        let level: Level = level.parse().unwrap();
        assert_eq!(process_level(&level).unwrap_err(), SolverErr::BoxesGoals);
    }

    #[test]
    fn satisfied_unreachable_pair_is_ok() {
        let level = r"
########
#@$.#*##
########
";
        let level: Level = level.parse().unwrap();
        let solver_level = process_level(&level).unwrap();
        // the unreachable pair is dropped from the search entirely
        assert_eq!(solver_level.state.boxes.len(), 1);
        assert_eq!(solver_level.map.goals.len(), 1);
    }

    #[test]
    fn dead_cells_in_processed_level() {
        let level = r"
#####
##@##
##$##
#  .#
#####";
        let level: Level = level.parse().unwrap();
        let solver_level = process_level(&level).unwrap();
        let expected = r"
11111
11111
11011
11001
11111
"
        .trim_start_matches('\n');
        assert_eq!(solver_level.dead_cells.to_string(), expected);
    }

    #[test]
    fn expanding_walks_and_pushes() {
        let level = r"
 ####
#    #
# @ *#
# $  #
#   .#
 ####
";
        let level: Level = level.parse().unwrap();
        let solver_level = process_level(&level).unwrap();
        let successors = expand(
            &solver_level.map,
            &solver_level.state,
            &solver_level.dead_cells,
        );
        let labels: Vec<_> = successors.iter().map(|(_, mov)| mov.to_string()).collect();
        assert_eq!(labels, ["u", "D", "l", "r"]);
    }

    #[test]
    fn expanding_blocked_pushes() {
        let level = r"
 ####
# $  #
# @$*#
# $  #
# ...#
 ####
";
        let level: Level = level.parse().unwrap();
        let solver_level = process_level(&level).unwrap();
        let successors = expand(
            &solver_level.map,
            &solver_level.state,
            &solver_level.dead_cells,
        );
        let labels: Vec<_> = successors.iter().map(|(_, mov)| mov.to_string()).collect();
        // up: push into the top wall, right: push into another box
        assert_eq!(labels, ["D", "l"]);
    }

    #[test]
    fn heuristic_is_zero_on_goal_states() {
        let level: Level = "#####\n#@ *#\n#####".parse().unwrap();
        assert_eq!(heuristic(&level.map, &level.state), 0);
    }

    #[test]
    fn heuristic_never_overestimates() {
        let levels = [
            "#####\n#@$.#\n#####",
            "#######\n#.    #\n# $@  #\n#     #\n#######",
            "#######\n#     #\n# $$$ #\n# ... #\n#  @  #\n#######",
        ];
        for &level in &levels {
            let level: Level = level.parse().unwrap();
            let h = heuristic(&level.map, &level.state);
            let ok = level.solve(Strategy::Bfs, false).unwrap();
            let optimal = ok.moves().expect("level should be solvable").move_cnt();
            assert!(h <= optimal as u32, "h = {} > optimal = {}", h, optimal);
        }
    }
}
