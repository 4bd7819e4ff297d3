use std::fmt::{self, Debug, Display, Formatter};

use crate::data::MapCell;
use crate::map::GoalMap;
use crate::map_formatter::MapFormatter;
use crate::moves::Moves;
use crate::solution_formatter::SolutionFormatter;
use crate::state::State;

#[derive(Clone)]
pub struct Level {
    pub map: GoalMap,
    pub state: State,
}

impl Level {
    pub(crate) fn new(map: GoalMap, state: State) -> Self {
        Level { map, state }
    }

    pub fn xsb(&self) -> MapFormatter<'_> {
        self.map.format_with_state(&self.state)
    }

    pub fn format_solution<'a>(&'a self, moves: &'a Moves, include_steps: bool) -> SolutionFormatter<'a> {
        SolutionFormatter::new(&self.map, &self.state, moves, include_steps)
    }

    /// Applies a move sequence to the initial state.
    /// Illegal sequences are a caller bug, not an input error.
    pub fn replay(&self, moves: &Moves) -> State {
        let mut player_pos = self.state.player_pos;
        let mut boxes = self.state.boxes.clone();
        for &mov in moves {
            let new_player_pos = player_pos + mov.dir;
            debug_assert!(self.map.grid[new_player_pos] != MapCell::Wall);
            if mov.is_push {
                let push_dest = new_player_pos + mov.dir;
                debug_assert!(self.map.grid[push_dest] != MapCell::Wall);
                debug_assert!(!boxes.contains(&push_dest));
                let pushed = boxes
                    .iter_mut()
                    .find(|b| **b == new_player_pos)
                    .expect("push move without a box ahead of the player");
                *pushed = push_dest;
            } else {
                debug_assert!(!boxes.contains(&new_player_pos));
            }
            player_pos = new_player_pos;
        }
        State::new(player_pos, boxes)
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.xsb())
    }
}

impl Debug for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.xsb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::Dir;
    use crate::moves::Move;

    #[test]
    fn formatting_level() {
        let xsb: &str = r"
*###*
#@$.#
*###*#
"
        .trim_start_matches('\n');

        let level: Level = xsb.parse().unwrap();
        assert_eq!(level.to_string(), xsb);
        assert_eq!(level.xsb().to_string(), xsb);
        assert_eq!(format!("{}", level), xsb);
        assert_eq!(format!("{:?}", level), xsb);
    }

    #[test]
    fn replaying_moves() {
        let level: Level = r"
#######
#.    #
# $@  #
#     #
#######
"
        .parse()
        .unwrap();

        let moves = Moves::new(vec![
            Move::new(Dir::Left, true),
            Move::new(Dir::Down, false),
            Move::new(Dir::Left, false),
            Move::new(Dir::Up, true),
        ]);
        let end = level.replay(&moves);
        assert!(level.map.is_solved(&end));
        assert_eq!(end.player_pos, crate::data::Pos::new(2, 1));
    }

    #[test]
    fn replaying_nothing() {
        let level: Level = "#####\n#@$.#\n#####".parse().unwrap();
        assert_eq!(level.replay(&Moves::default()), level.state);
    }
}
