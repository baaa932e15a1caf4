#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Hiding Wumpus simulation.
//!
//! The world owns the grid and both agent bodies. It never plans paths or
//! makes decisions; it validates and executes [`Command`] values and reports
//! what happened as [`Event`] values.

use std::time::Duration;

use hiding_wumpus_core::{AgentRole, CellCoord, CellPoint, Command, Event, NeighborMode};
use tracing::warn;

mod body;
mod grid;

pub use body::Body;
pub use grid::Grid;

const DEFAULT_GRID_SIZE: u32 = 20;
const DEFAULT_TILE_LENGTH: f32 = 30.0;
const DEFAULT_HEADER_HEIGHT: f32 = 100.0;
const DEFAULT_SPEED: f32 = 4.0;

/// Represents the authoritative Hiding Wumpus world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    seeker: Body,
    hider: Body,
    elapsed: Duration,
}

impl World {
    /// Creates a world with the default 20x20 grid and both agents in opposite corners.
    #[must_use]
    pub fn new() -> Self {
        let grid = Grid::new(DEFAULT_GRID_SIZE, DEFAULT_TILE_LENGTH, DEFAULT_HEADER_HEIGHT);
        let mut world = Self {
            seeker: Body::new(seeker_start(), DEFAULT_SPEED),
            hider: Body::new(hider_start(DEFAULT_GRID_SIZE), DEFAULT_SPEED),
            grid,
            elapsed: Duration::ZERO,
        };
        world.refresh_visibility();
        world
    }

    fn body_mut(&mut self, role: AgentRole) -> &mut Body {
        match role {
            AgentRole::Seeker => &mut self.seeker,
            AgentRole::Hider => &mut self.hider,
        }
    }

    fn refresh_visibility(&mut self) {
        let seeker = self.seeker.cell();
        let hider = self.hider.cell();
        self.grid.update_visibility(seeker, hider);
    }

    fn clamp_to_grid(&self, position: CellPoint) -> CellPoint {
        let upper = (self.grid.size() as f32 - 1e-3).max(0.0);
        let clamp = |value: f32| {
            if value.is_finite() {
                value.clamp(0.0, upper)
            } else {
                0.0
            }
        };
        CellPoint::new(clamp(position.column()), clamp(position.row()))
    }

    fn invalidate_crossing_paths(
        &mut self,
        crosses: impl Fn(&Body) -> bool,
        out_events: &mut Vec<Event>,
    ) {
        for role in [AgentRole::Seeker, AgentRole::Hider] {
            let body = self.body_mut(role);
            let Some(target) = body.target() else {
                continue;
            };
            if crosses(body) {
                body.drop_path();
                out_events.push(Event::PathInvalidated { role, target });
            }
        }
    }

    fn path_is_valid(&self, role: AgentRole, target: CellCoord, path: &[CellCoord]) -> bool {
        let view = self.grid.view();
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            return false;
        };
        if first != query::agent_cell(self, role) || last != target {
            return false;
        }
        if !view.contains(first) || path.iter().skip(1).any(|&cell| !view.is_walkable(cell)) {
            return false;
        }
        path.windows(2).all(|pair| {
            pair[0].chebyshev_distance(pair[1]) == 1
                && view
                    .neighbors(pair[0], NeighborMode::Walkable)
                    .any(|cell| cell == pair[1])
        })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Centre of the top-left cell, where the seeker starts each round.
#[must_use]
pub fn seeker_start() -> CellPoint {
    CellCoord::new(0, 0).center()
}

/// Centre of the bottom-right cell, where the hider starts each round.
#[must_use]
pub fn hider_start(size: u32) -> CellPoint {
    let last = size.saturating_sub(1);
    CellCoord::new(last, last).center()
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid {
            size,
            tile_length,
            header_height,
        } => {
            world.grid = Grid::new(size, tile_length, header_height);
            world.seeker.place(seeker_start());
            world.hider.place(hider_start(size));
            world.elapsed = Duration::ZERO;
            world.refresh_visibility();
            out_events.push(Event::GridConfigured { size });
        }
        Command::ToggleWall { cell } => {
            let Some(is_wall) = world.grid.toggle_wall(cell) else {
                out_events.push(Event::WallToggleRejected { cell });
                return;
            };
            out_events.push(Event::WallToggled { cell, is_wall });
            if is_wall {
                world.invalidate_crossing_paths(
                    |body| body.remaining_path_contains(cell),
                    out_events,
                );
            }
            world.refresh_visibility();
        }
        Command::ClearWalls => {
            world.grid.clear_walls();
            world.refresh_visibility();
            out_events.push(Event::WallsReplaced { wall_count: 0 });
        }
        Command::SetWalls { cells } => {
            let ignored = world.grid.replace_walls(&cells);
            if ignored > 0 {
                warn!(ignored, size = world.grid.size(), "wall cells outside the grid were ignored");
            }
            let mut walls: Vec<CellCoord> = world.grid.wall_cells().collect();
            walls.sort_unstable();
            world.invalidate_crossing_paths(
                |body| {
                    body.remaining_path()
                        .iter()
                        .any(|cell| walls.binary_search(cell).is_ok())
                },
                out_events,
            );
            world.refresh_visibility();
            out_events.push(Event::WallsReplaced {
                wall_count: world.grid.wall_count(),
            });
        }
        Command::PlaceAgent { role, position } => {
            let position = world.clamp_to_grid(position);
            let body = world.body_mut(role);
            body.place(position);
            let cell = body.cell();
            world.refresh_visibility();
            out_events.push(Event::AgentPlaced { role, cell });
        }
        Command::AssignPath { role, target, path } => {
            if !world.path_is_valid(role, target, &path) {
                out_events.push(Event::PathRejected { role, target });
                return;
            }
            let length = path.len();
            world.body_mut(role).assign_path(target, path);
            out_events.push(Event::PathAssigned {
                role,
                target,
                length,
            });
        }
        Command::ClearTarget { role } => {
            world.body_mut(role).clear_target();
            out_events.push(Event::TargetCleared { role });
        }
        Command::SetSpeed { role, speed } => {
            if speed.is_finite() && speed > 0.0 {
                world.body_mut(role).set_speed(speed);
                out_events.push(Event::SpeedChanged { role, speed });
            } else {
                out_events.push(Event::SpeedRejected { role });
            }
        }
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            let seconds = dt.as_secs_f32();
            for role in [AgentRole::Seeker, AgentRole::Hider] {
                let body = world.body_mut(role);
                let from = body.cell();
                let arrived = body.integrate(seconds);
                let to = body.cell();
                if from != to {
                    out_events.push(Event::AgentEnteredCell { role, from, to });
                }
                if arrived {
                    out_events.push(Event::AgentArrived { role, cell: to });
                }
            }

            world.refresh_visibility();
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Body, Grid, World};
    use hiding_wumpus_core::{AgentRole, CellCoord, GridView};

    /// Provides read-only access to the world's grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Borrowed view over walls and visibility for systems.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Provides read-only access to an agent's body.
    #[must_use]
    pub fn body(world: &World, role: AgentRole) -> &Body {
        match role {
            AgentRole::Seeker => &world.seeker,
            AgentRole::Hider => &world.hider,
        }
    }

    /// Cell currently occupied by the agent.
    #[must_use]
    pub fn agent_cell(world: &World, role: AgentRole) -> CellCoord {
        body(world, role).cell()
    }

    /// Simulated time accumulated by ticks since the grid was configured.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Wall cells in row-major order.
    #[must_use]
    pub fn wall_cells(world: &World) -> Vec<CellCoord> {
        world.grid.wall_cells().collect()
    }

    /// Reports whether both agents occupy the same cell.
    #[must_use]
    pub fn agents_share_cell(world: &World) -> bool {
        agent_cell(world, AgentRole::Seeker) == agent_cell(world, AgentRole::Hider)
    }
}
