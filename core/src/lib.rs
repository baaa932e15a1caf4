#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hiding Wumpus simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and the round driver submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values.
//! Systems read the grid through the borrowed [`GridView`] and answer with
//! [`Decision`] values through the [`Policy`] trait.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod grid;

pub use grid::{bresenham_line, CellState, GridView, LineCells, NeighborMode, Neighbors};

/// Identifies which of the two agents a command or event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentRole {
    /// The pursuer that tries to share a cell with the hider.
    Seeker,
    /// The evader that tries to stay out of the seeker's sight.
    Hider,
}

impl AgentRole {
    /// Returns the role of the other agent.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Seeker => Self::Hider,
            Self::Hider => Self::Seeker,
        }
    }

    /// Lower-case label used in logs and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Seeker => "seeker",
            Self::Hider => "hider",
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Equality, ordering and hashing are purely positional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell (the `x` axis).
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell (the `y` axis).
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev distance, the step count when diagonal moves are allowed.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Returns the coordinate displaced by the provided offset, if it stays non-negative.
    ///
    /// Upper bounds are not checked; callers validate against their grid.
    #[must_use]
    pub fn offset(self, column_delta: i32, row_delta: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        Some(CellCoord::new(column, row))
    }

    /// Continuous position of the cell's centre.
    #[must_use]
    pub fn center(self) -> CellPoint {
        CellPoint::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

/// Continuous position measured in cell units.
///
/// Cell `(c, r)` spans `[c, c + 1) x [r, r + 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellPoint {
    column: f32,
    row: f32,
}

impl CellPoint {
    /// Creates a new continuous position.
    #[must_use]
    pub const fn new(column: f32, row: f32) -> Self {
        Self { column, row }
    }

    /// Horizontal component measured in cells.
    #[must_use]
    pub const fn column(&self) -> f32 {
        self.column
    }

    /// Vertical component measured in cells.
    #[must_use]
    pub const fn row(&self) -> f32 {
        self.row
    }

    /// Truncates the position to the containing cell.
    ///
    /// Negative and NaN components saturate to zero.
    #[must_use]
    pub fn to_cell(self) -> CellCoord {
        CellCoord::new(self.column as u32, self.row as u32)
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: CellPoint) -> f32 {
        let dc = self.column - other.column;
        let dr = self.row - other.row;
        (dc * dc + dr * dr).sqrt()
    }
}

/// Hop distance stored by distance fields.
///
/// `Unreachable` is a distinct tag rather than a sentinel number so that
/// scoring code can filter it explicitly. Every finite distance orders before
/// `Unreachable`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Distance {
    /// Minimum number of hops from the nearest source.
    Finite(u32),
    /// No source reaches the cell.
    Unreachable,
}

impl Distance {
    /// Returns the finite hop count, if any.
    #[must_use]
    pub const fn finite(self) -> Option<u32> {
        match self {
            Self::Finite(value) => Some(value),
            Self::Unreachable => None,
        }
    }

    /// Reports whether the distance is finite.
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        matches!(self, Self::Finite(_))
    }
}

impl Default for Distance {
    fn default() -> Self {
        Self::Unreachable
    }
}

/// Reasons a movement target may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum TargetError {
    /// The requested cell lies outside the grid.
    #[error("cell ({}, {}) lies outside the grid", .cell.column(), .cell.row())]
    OutOfBounds {
        /// Cell that was requested.
        cell: CellCoord,
    },
    /// The requested cell is a wall.
    #[error("cell ({}, {}) is a wall", .cell.column(), .cell.row())]
    Wall {
        /// Cell that was requested.
        cell: CellCoord,
    },
    /// The pathfinder exhausted its frontier without reaching the cell.
    #[error("no path from ({}, {}) to ({}, {})", .from.column(), .from.row(), .to.column(), .to.row())]
    NoPath {
        /// Cell the agent occupied when planning.
        from: CellCoord,
        /// Cell that was requested.
        to: CellCoord,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the grid with the provided dimensions, clearing walls and paths.
    ConfigureGrid {
        /// Number of cells along each edge of the square grid.
        size: u32,
        /// Side length of a cell in screen pixels, used only by renderers.
        tile_length: f32,
        /// Height of the screen strip above the grid in pixels, used only by renderers.
        header_height: f32,
    },
    /// Flips the wall flag of a single cell.
    ToggleWall {
        /// Cell whose wall flag should flip.
        cell: CellCoord,
    },
    /// Turns every wall cell back into open floor.
    ClearWalls,
    /// Replaces the wall layout wholesale, as a level load does.
    SetWalls {
        /// Cells that become walls; every other cell becomes floor.
        cells: Vec<CellCoord>,
    },
    /// Teleports an agent to a continuous position and drops its path.
    PlaceAgent {
        /// Agent to move.
        role: AgentRole,
        /// Destination measured in cell units.
        position: CellPoint,
    },
    /// Hands an agent a freshly planned path towards a target cell.
    AssignPath {
        /// Agent receiving the path.
        role: AgentRole,
        /// Cell the path leads to.
        target: CellCoord,
        /// Cells from the agent's current cell to the target, both inclusive.
        path: Vec<CellCoord>,
    },
    /// Drops an agent's target and path so it stays put.
    ClearTarget {
        /// Agent to halt.
        role: AgentRole,
    },
    /// Changes how fast an agent walks, in cells per second.
    SetSpeed {
        /// Agent whose speed changes.
        role: AgentRole,
        /// New speed in cells per second.
        speed: f32,
    },
    /// Advances motion and visibility by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the grid was rebuilt.
    GridConfigured {
        /// Number of cells along each edge.
        size: u32,
    },
    /// Confirms that a wall flag flipped.
    WallToggled {
        /// Cell that changed.
        cell: CellCoord,
        /// Wall flag after the change.
        is_wall: bool,
    },
    /// Reports that a wall toggle referenced a cell outside the grid.
    WallToggleRejected {
        /// Cell that was requested.
        cell: CellCoord,
    },
    /// Confirms that the wall layout was replaced.
    WallsReplaced {
        /// Number of wall cells after the replacement.
        wall_count: usize,
    },
    /// Reports that a wall change cut through an agent's remaining path.
    ///
    /// The world keeps the target but drops the path; the owner must re-plan.
    PathInvalidated {
        /// Agent whose path was dropped.
        role: AgentRole,
        /// Target the dropped path led to.
        target: CellCoord,
    },
    /// Confirms that an agent accepted a new path.
    PathAssigned {
        /// Agent that accepted the path.
        role: AgentRole,
        /// Cell the path leads to.
        target: CellCoord,
        /// Number of cells in the path, endpoints included.
        length: usize,
    },
    /// Reports that a path was refused because it was malformed.
    PathRejected {
        /// Agent that refused the path.
        role: AgentRole,
        /// Cell the refused path led to.
        target: CellCoord,
    },
    /// Confirms that an agent dropped its target.
    TargetCleared {
        /// Agent that halted.
        role: AgentRole,
    },
    /// Confirms that an agent was teleported.
    AgentPlaced {
        /// Agent that moved.
        role: AgentRole,
        /// Cell containing the new position.
        cell: CellCoord,
    },
    /// Reports that an agent's continuous position crossed into another cell.
    AgentEnteredCell {
        /// Agent that moved.
        role: AgentRole,
        /// Cell the agent left.
        from: CellCoord,
        /// Cell the agent entered.
        to: CellCoord,
    },
    /// Reports that an agent reached the final waypoint of its path.
    AgentArrived {
        /// Agent that arrived.
        role: AgentRole,
        /// Cell containing the final waypoint.
        cell: CellCoord,
    },
    /// Confirms a speed change.
    SpeedChanged {
        /// Agent whose speed changed.
        role: AgentRole,
        /// New speed in cells per second.
        speed: f32,
    },
    /// Reports that a speed change was refused because the value was not a positive number.
    SpeedRejected {
        /// Agent whose speed stayed unchanged.
        role: AgentRole,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
}

/// Short label describing why a policy decided what it did.
///
/// Renderers may show it above the agent; nothing in the simulation reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Thought {
    /// The seeker is still frozen after a round reset.
    Frozen,
    /// The seeker can see the hider and heads for it.
    Tracking,
    /// The seeker lost sight recently and searches near the last sighting.
    Predicting,
    /// The seeker heads for the cell it has not observed for longest.
    Exploring,
    /// A randomly chosen walkable cell was used after other choices failed.
    Wandering,
    /// The hider is unseen and already on its chosen spot.
    Safe,
    /// The hider is moving to a better hiding spot.
    Fleeing,
    /// No target could be set this tick.
    Stuck,
    /// The agent does not make decisions.
    Idle,
}

impl Thought {
    /// Text a renderer may show above the agent.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::Tracking => "I see you!",
            Self::Predicting => "where did you go?",
            Self::Exploring => "exploring",
            Self::Wandering => "wandering",
            Self::Safe => "I'm safe",
            Self::Fleeing => "uh oh",
            Self::Stuck => "I can't go anywhere",
            Self::Idle => "",
        }
    }
}

/// Outcome of a single decision tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Leave the current target and path untouched.
    Keep {
        /// Reason for keeping the current plan.
        thought: Thought,
    },
    /// A new target was accepted through the targeter.
    Retarget {
        /// Cell the agent now heads for.
        cell: CellCoord,
        /// Reason for choosing the cell.
        thought: Thought,
    },
}

impl Decision {
    /// Reason attached to the decision.
    #[must_use]
    pub const fn thought(&self) -> Thought {
        match self {
            Self::Keep { thought } | Self::Retarget { thought, .. } => *thought,
        }
    }

    /// Cell chosen by the decision, if it retargeted.
    #[must_use]
    pub const fn target(&self) -> Option<CellCoord> {
        match self {
            Self::Keep { .. } => None,
            Self::Retarget { cell, .. } => Some(*cell),
        }
    }
}

/// Read-only inputs handed to a policy on each decision tick.
#[derive(Clone, Copy, Debug)]
pub struct DecisionContext<'a> {
    /// Grid walls and current visibility flags.
    pub grid: GridView<'a>,
    /// Cell occupied by the deciding agent.
    pub own_cell: CellCoord,
    /// Continuous position of the deciding agent.
    pub own_position: CellPoint,
    /// Cell occupied by the other agent.
    pub opponent_cell: CellCoord,
    /// Target the deciding agent currently walks towards, if any.
    pub current_target: Option<CellCoord>,
    /// Simulated time elapsed since the round started.
    pub elapsed: Duration,
}

/// Decision-making capability plugged into an agent at construction time.
///
/// `decide` receives a targeter that plans a path to a cell and installs it,
/// returning `false` when the cell is invalid or unreachable. Policies test
/// reachability lazily through it and must bound their retries.
pub trait Policy: std::fmt::Debug {
    /// Chooses what the agent should do this decision tick.
    fn decide(
        &mut self,
        context: &DecisionContext<'_>,
        targeter: &mut dyn FnMut(CellCoord) -> bool,
    ) -> Decision;

    /// Advances internal timers every frame, including frames without a decision.
    fn advance(&mut self, _dt: Duration) {}

    /// Restores the per-round state after the agents were repositioned.
    fn reset_round(&mut self) {}

    /// Reports whether the agent currently ignores decisions and stays still.
    fn is_frozen(&self) -> bool {
        false
    }
}
