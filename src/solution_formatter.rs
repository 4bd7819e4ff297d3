use std::fmt::{self, Debug, Display, Formatter};

use crate::map::GoalMap;
use crate::moves::Moves;
use crate::state::State;

/// Renders a solution as a sequence of board snapshots. With `include_steps`
/// every move gets a snapshot, otherwise only pushes do.
pub struct SolutionFormatter<'a> {
    map: &'a GoalMap,
    initial_state: &'a State,
    moves: &'a Moves,
    include_steps: bool,
}

impl<'a> SolutionFormatter<'a> {
    pub(crate) fn new(
        map: &'a GoalMap,
        initial_state: &'a State,
        moves: &'a Moves,
        include_steps: bool,
    ) -> Self {
        Self {
            map,
            initial_state,
            moves,
            include_steps,
        }
    }
}

impl Display for SolutionFormatter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.map.format_with_state(self.initial_state))?;
        let mut last_state = self.initial_state.clone();
        for &mov in self.moves {
            let new_player_pos = last_state.player_pos + mov.dir;
            let new_boxes = last_state
                .boxes
                .iter()
                .map(|&b| if b == new_player_pos { b + mov.dir } else { b })
                .collect();
            let new_state = State::new(new_player_pos, new_boxes);
            if mov.is_push || self.include_steps {
                writeln!(f, "{}", self.map.format_with_state(&new_state))?;
            }
            last_state = new_state;
        }
        Ok(())
    }
}

impl Debug for SolutionFormatter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
