use std::fmt::{self, Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Bfs,
    Dfs,
    Ucs,
    AStar,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [Strategy::Bfs, Strategy::Dfs, Strategy::Ucs, Strategy::AStar];
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Strategy::Bfs => write!(f, "bfs"),
            Strategy::Dfs => write!(f, "dfs"),
            Strategy::Ucs => write!(f, "ucs"),
            Strategy::AStar => write!(f, "a-star"),
        }
    }
}
