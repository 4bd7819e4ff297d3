use std::fmt::{self, Display, Formatter};

use crate::data::Pos;
use crate::map::GoalMap;
use crate::state::State;
use crate::vec2d::Vec2d;

/// A validated level with its precomputed dead cells.
/// Walls are marked dead so one lookup covers both cases.
#[derive(Debug, Clone)]
pub(crate) struct SolverLevel {
    pub(crate) map: GoalMap,
    pub(crate) state: State,
    pub(crate) dead_cells: Vec2d<bool>,
}

impl SolverLevel {
    pub(crate) fn new(map: GoalMap, state: State, dead_cells: Vec2d<bool>) -> Self {
        Self {
            map,
            state,
            dead_cells,
        }
    }

    #[allow(unused)]
    pub(crate) fn is_dead(&self, pos: Pos) -> bool {
        self.dead_cells[pos]
    }
}

impl Display for SolverLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.map.format_with_state(&self.state))
    }
}
