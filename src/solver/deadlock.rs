use crate::data::{Dir, MapCell, Pos, DIRECTIONS};
use crate::map::GoalMap;
use crate::state::State;
use crate::vec2d::Vec2d;

/// Marks every cell from which a box can never reach a goal.
///
/// Simulates "unpushing" a box backward from every goal: a cell is alive if
/// a box on it can be pulled to an already-alive cell with room for the
/// player behind it. This overapproximates the live cells (it ignores other
/// boxes and player reachability) so it never marks a live cell dead.
/// Walls stay marked dead so one lookup covers both cases.
pub(crate) fn find_dead_cells(map: &GoalMap) -> Vec2d<bool> {
    let mut dead = map.grid.create_scratchpad(true);

    let mut to_visit = Vec::new();
    for &goal in &map.goals {
        dead[goal] = false;
        to_visit.push(goal);
    }

    while let Some(cur) = to_visit.pop() {
        for &dir in &DIRECTIONS {
            let (dr, dc) = dir.offset();
            // the only solver code that needs bounds checks - goals can sit
            // right next to the outer border
            let box_r = i32::from(cur.r) - i32::from(dr);
            let box_c = i32::from(cur.c) - i32::from(dc);
            let player_r = box_r - i32::from(dr);
            let player_c = box_c - i32::from(dc);
            if !map.grid.in_bounds(box_r, box_c) || !map.grid.in_bounds(player_r, player_c) {
                continue;
            }

            let box_pos = Pos::new(box_r as u8, box_c as u8);
            let player_pos = Pos::new(player_r as u8, player_c as u8);
            if map.grid[box_pos] != MapCell::Wall
                && map.grid[player_pos] != MapCell::Wall
                && dead[box_pos]
            {
                dead[box_pos] = false;
                to_visit.push(box_pos);
            }
        }
    }

    dead
}

/// True if the state can never reach a solution: a box sits on a dead cell,
/// or a frozen cluster holds a box off goal. Must never flag a state from
/// which a solution is still reachable, so only walls and provably frozen
/// boxes count as blockers.
pub(crate) fn is_deadlocked(map: &GoalMap, dead_cells: &Vec2d<bool>, state: &State) -> bool {
    // goal cells are always alive, so this only triggers for boxes off goal
    if state.boxes.iter().any(|&b| dead_cells[b]) {
        return true;
    }

    let mut box_grid = map.grid.create_scratchpad(false);
    for &b in &state.boxes {
        box_grid[b] = true;
    }

    for &b in &state.boxes {
        if map.grid[b] != MapCell::Goal {
            let mut on_path = map.grid.create_scratchpad(false);
            if is_frozen(map, &box_grid, &mut on_path, b) {
                return true;
            }
        }
    }
    false
}

/// A box is frozen when it is blocked along both axes. Boxes on the current
/// proof path count as frozen: if every box of a cluster is blocked while
/// the others stand still, no box can ever move first.
fn is_frozen(map: &GoalMap, box_grid: &Vec2d<bool>, on_path: &mut Vec2d<bool>, pos: Pos) -> bool {
    on_path[pos] = true;
    let frozen = blocked_along(map, box_grid, on_path, pos, Dir::Up, Dir::Down)
        && blocked_along(map, box_grid, on_path, pos, Dir::Left, Dir::Right);
    on_path[pos] = false;
    frozen
}

fn blocked_along(
    map: &GoalMap,
    box_grid: &Vec2d<bool>,
    on_path: &mut Vec2d<bool>,
    pos: Pos,
    side_a: Dir,
    side_b: Dir,
) -> bool {
    // pushing along an axis needs both neighbor cells at once - one for the
    // player, one for the box - so one permanently occupied side is enough
    for &side in &[side_a, side_b] {
        let neighbor = pos + side;
        if map.grid[neighbor] == MapCell::Wall {
            return true;
        }
        if box_grid[neighbor] && (on_path[neighbor] || is_frozen(map, box_grid, on_path, neighbor))
        {
            return true;
        }
    }
    false
}
