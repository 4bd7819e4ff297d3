use std::fmt::{self, Debug, Display, Formatter};

use crate::data::{MapCell, Pos};
use crate::map_formatter::MapFormatter;
use crate::state::State;
use crate::vec2d::Vec2d;

#[derive(Clone, PartialEq, Eq)]
pub struct GoalMap {
    pub grid: Vec2d<MapCell>,
    pub goals: Vec<Pos>,
}

impl GoalMap {
    pub(crate) fn new(grid: Vec2d<MapCell>, goals: Vec<Pos>) -> Self {
        GoalMap { grid, goals }
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.grid[pos] == MapCell::Wall
    }

    pub fn is_goal(&self, pos: Pos) -> bool {
        self.grid[pos] == MapCell::Goal
    }

    /// All boxes on goals - not the other way around so levels
    /// with satisfied but unreachable pairs still count as solved.
    pub fn is_solved(&self, state: &State) -> bool {
        state.boxes.iter().all(|&pos| self.grid[pos] == MapCell::Goal)
    }

    pub fn format_with_state<'a>(&'a self, state: &'a State) -> MapFormatter<'a> {
        MapFormatter::new(&self.grid, Some(state))
    }
}

impl Display for GoalMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", MapFormatter::new(&self.grid, None))
    }
}

impl Debug for GoalMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use crate::level::Level;

    #[test]
    fn formatting_map() {
        let xsb_level: &str = r"
*###*
#@$.#
*###*#
"
        .trim_start_matches('\n');
        let xsb_map: &str = r"
.###.
#  .#
.###.#
"
        .trim_start_matches('\n');

        let level: Level = xsb_level.parse().unwrap();
        assert_eq!(format!("{}", level.map), xsb_map);
        assert_eq!(format!("{:?}", level.map), xsb_map);
    }

    #[test]
    fn solved_and_lookups() {
        let level: Level = "#####\n#@$.#\n#####".parse().unwrap();
        assert!(level.map.is_wall(crate::data::Pos::new(0, 0)));
        assert!(level.map.is_goal(crate::data::Pos::new(1, 3)));
        assert!(!level.map.is_solved(&level.state));

        let solved: Level = "#####\n#@ *#\n#####".parse().unwrap();
        assert!(solved.map.is_solved(&solved.state));
    }
}
