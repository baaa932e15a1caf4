#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round driver that wires the world, the pathfinder and both policies together.
//!
//! Motion advances on every fixed step while each agent only decides once
//! per think interval. Both rates run from the same synchronous
//! [`Simulation::step`] call; nothing blocks and nothing runs in parallel.

use std::time::Duration;

use hiding_wumpus_core::{
    AgentRole, CellCoord, CellPoint, Command, Decision, DecisionContext, Event, Policy,
    TargetError, Thought,
};
use hiding_wumpus_system_hiding::HiderPolicy;
use hiding_wumpus_system_pathfinding::{ExtraCosts, Pathfinder};
use hiding_wumpus_system_pursuit::PursuitPolicy;
use hiding_wumpus_world::{self as world, query, World};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

mod config;
mod level;

pub use config::{ConfigError, SimulationConfig, MAX_GRID_SIZE};
pub use level::Level;

/// Mixed into the configured seed so both policies draw independent streams.
const HIDER_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Policy for an agent that never picks a target on its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoldPosition;

impl Policy for HoldPosition {
    fn decide(
        &mut self,
        _context: &DecisionContext<'_>,
        _targeter: &mut dyn FnMut(CellCoord) -> bool,
    ) -> Decision {
        Decision::Keep {
            thought: Thought::Idle,
        }
    }
}

/// Metrics of a single round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RoundOutcome {
    /// Whether the seeker caught the hider before the time limit.
    pub caught: bool,
    /// Fixed steps simulated.
    pub steps: u64,
    /// Simulated seconds the round lasted.
    pub time_elapsed: f32,
    /// Cells the seeker entered.
    pub path_length: u32,
    /// Manhattan distance between the agents when the round ended.
    pub final_distance: u32,
    /// Simulated seconds the hider spent on cells the seeker could see.
    pub exposure_time: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct RoundStats {
    steps: u64,
    elapsed: Duration,
    path_length: u32,
    exposure: Duration,
}

#[derive(Debug)]
struct Agent {
    policy: Box<dyn Policy>,
    think_timer: Duration,
    thought: Thought,
}

impl Agent {
    fn new(policy: Box<dyn Policy>) -> Self {
        Self {
            policy,
            think_timer: Duration::ZERO,
            thought: Thought::Idle,
        }
    }
}

/// Owns one world and drives rounds of hide and seek on it.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    pathfinder: Pathfinder,
    extra_costs: ExtraCosts,
    seeker: Agent,
    hider: Agent,
    timestep: Duration,
    think_interval: Duration,
    stats: RoundStats,
    rounds_played: u32,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation with the pursuit seeker and the scoring hider.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let seeker = PursuitPolicy::new(config.pursuit, config.seed);
        let hider = HiderPolicy::new(config.hiding, config.seed ^ HIDER_SEED_SALT);
        Self::with_policies(config, Box::new(seeker), Box::new(hider))
    }

    /// Creates a simulation with caller-provided policies.
    pub fn with_policies(
        config: SimulationConfig,
        seeker: Box<dyn Policy>,
        hider: Box<dyn Policy>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let timestep = config.timestep()?;
        let think_interval = config.think_interval()?;

        let mut simulation = Self {
            config,
            world: World::new(),
            pathfinder: Pathfinder::new(),
            extra_costs: ExtraCosts::new(),
            seeker: Agent::new(seeker),
            hider: Agent::new(hider),
            timestep,
            think_interval,
            stats: RoundStats::default(),
            rounds_played: 0,
            events: Vec::new(),
        };
        simulation.configure_grid(config.grid_size);
        simulation.apply(Command::SetSpeed {
            role: AgentRole::Seeker,
            speed: config.seeker_speed,
        });
        simulation.apply(Command::SetSpeed {
            role: AgentRole::Hider,
            speed: config.hider_speed,
        });
        simulation.reset_round();
        Ok(simulation)
    }

    /// Configuration the simulation was built with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Pathfinder holding the diagnostics of the most recent search.
    #[must_use]
    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    /// Policy driving the agent.
    #[must_use]
    pub fn policy(&self, role: AgentRole) -> &dyn Policy {
        self.agent(role).policy.as_ref()
    }

    /// Thought attached to the agent's latest decision.
    #[must_use]
    pub fn thought(&self, role: AgentRole) -> Thought {
        self.agent(role).thought
    }

    /// Simulated time since the current round started.
    #[must_use]
    pub fn round_elapsed(&self) -> Duration {
        self.stats.elapsed
    }

    /// Rounds completed through [`Simulation::run_round`].
    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Removes and returns the events gathered since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, Event> {
        self.events.drain(..)
    }

    /// Replaces the per-cell surcharges applied to every path search.
    pub fn set_extra_costs(&mut self, extra_costs: ExtraCosts) {
        self.extra_costs = extra_costs;
    }

    /// Plans a path from the agent's cell to `cell` and installs it.
    ///
    /// On failure the agent keeps its current target and path.
    pub fn set_target(&mut self, role: AgentRole, cell: CellCoord) -> Result<(), TargetError> {
        let from = query::agent_cell(&self.world, role);
        let path = self.pathfinder.plan(
            query::grid_view(&self.world),
            from,
            cell,
            &self.extra_costs,
        )?;
        self.assign_path(role, cell, path)
    }

    /// Drops the agent's target and path.
    pub fn clear_target(&mut self, role: AgentRole) {
        self.apply(Command::ClearTarget { role });
    }

    /// Teleports the agent, clamping the position onto the grid.
    pub fn place_agent(&mut self, role: AgentRole, position: CellPoint) {
        self.apply(Command::PlaceAgent { role, position });
    }

    /// Changes the agent's speed; returns `false` for non-positive or non-finite speeds.
    pub fn set_speed(&mut self, role: AgentRole, speed: f32) -> bool {
        let start = self.events.len();
        self.apply(Command::SetSpeed { role, speed });
        self.events[start..]
            .iter()
            .any(|event| matches!(event, Event::SpeedChanged { .. }))
    }

    /// Flips the wall flag of `cell` and re-plans every active target.
    ///
    /// Returns `false` when the cell lies outside the grid.
    pub fn toggle_wall(&mut self, cell: CellCoord) -> bool {
        let start = self.events.len();
        self.apply(Command::ToggleWall { cell });
        let toggled = self.events[start..]
            .iter()
            .any(|event| matches!(event, Event::WallToggled { .. }));
        if toggled {
            self.replan_targets();
        }
        toggled
    }

    /// Replaces the wall layout and re-plans every active target.
    pub fn set_walls(&mut self, cells: Vec<CellCoord>) {
        self.apply(Command::SetWalls { cells });
        self.replan_targets();
    }

    /// Removes every wall and re-plans every active target.
    pub fn clear_walls(&mut self) {
        self.apply(Command::ClearWalls);
        self.replan_targets();
    }

    /// Applies a saved level: walls, seeker position and seeker target.
    ///
    /// A target that can no longer be reached leaves the seeker without a path.
    pub fn load_level(&mut self, level: &Level) -> Result<(), ConfigError> {
        config::grid_size(level.grid_size)?;
        if level.grid_size != query::grid(&self.world).size() {
            self.configure_grid(level.grid_size);
        }

        self.apply(Command::SetWalls {
            cells: level.wall_cells().collect(),
        });
        self.place_agent(AgentRole::Seeker, level.seeker_position());
        match level.target() {
            Some(target) => {
                if let Err(error) = self.set_target(AgentRole::Seeker, target) {
                    warn!(%error, "level target is not reachable");
                    self.clear_target(AgentRole::Seeker);
                }
            }
            None => self.clear_target(AgentRole::Seeker),
        }
        info!(
            grid_size = level.grid_size,
            walls = level.walls.len(),
            "level loaded"
        );
        Ok(())
    }

    /// Captures the layout and the seeker's position and target.
    #[must_use]
    pub fn level_snapshot(&self) -> Level {
        let seeker = query::body(&self.world, AgentRole::Seeker);
        let position = seeker.position();
        Level {
            grid_size: query::grid(&self.world).size(),
            walls: query::wall_cells(&self.world)
                .into_iter()
                .map(|cell| [cell.column(), cell.row()])
                .collect(),
            npc_position: [position.column(), position.row()],
            target_position: seeker.target().map(|cell| [cell.column(), cell.row()]),
        }
    }

    /// Puts both agents back in their corners and restarts the policies.
    ///
    /// The pursuit policy freezes the seeker as part of its own reset.
    pub fn reset_round(&mut self) {
        let size = query::grid(&self.world).size();
        self.place_agent(AgentRole::Seeker, world::seeker_start());
        self.place_agent(AgentRole::Hider, world::hider_start(size));
        for agent in [&mut self.seeker, &mut self.hider] {
            agent.policy.reset_round();
            agent.think_timer = Duration::ZERO;
            agent.thought = Thought::Idle;
        }
        self.stats = RoundStats::default();
        debug!(size, "round reset");
    }

    /// Reports whether the unfrozen seeker shares a cell with the hider.
    #[must_use]
    pub fn is_caught(&self) -> bool {
        !self.seeker.policy.is_frozen() && query::agents_share_cell(&self.world)
    }

    /// Advances one fixed timestep.
    pub fn step(&mut self) {
        self.step_by(self.timestep);
    }

    /// Advances by `dt`: timers and decisions first, then motion.
    pub fn step_by(&mut self, dt: Duration) {
        for role in [AgentRole::Seeker, AgentRole::Hider] {
            let interval = self.think_interval;
            let agent = self.agent_mut(role);
            agent.policy.advance(dt);
            agent.think_timer = agent.think_timer.saturating_add(dt);
            if agent.think_timer >= interval {
                agent.think_timer = Duration::ZERO;
                self.think(role);
            }
        }

        let start = self.events.len();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let entered = self.events[start..]
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::AgentEnteredCell {
                        role: AgentRole::Seeker,
                        ..
                    }
                )
            })
            .count();
        self.stats.steps += 1;
        self.stats.elapsed = self.stats.elapsed.saturating_add(dt);
        self.stats.path_length = self
            .stats
            .path_length
            .saturating_add(u32::try_from(entered).unwrap_or(u32::MAX));

        let hider = query::agent_cell(&self.world, AgentRole::Hider);
        if query::grid_view(&self.world).is_visible_to_seeker(hider) {
            self.stats.exposure = self.stats.exposure.saturating_add(dt);
        }
    }

    /// Metrics of the round so far.
    #[must_use]
    pub fn outcome(&self) -> RoundOutcome {
        let seeker = query::agent_cell(&self.world, AgentRole::Seeker);
        let hider = query::agent_cell(&self.world, AgentRole::Hider);
        RoundOutcome {
            caught: self.is_caught(),
            steps: self.stats.steps,
            time_elapsed: self.stats.elapsed.as_secs_f32(),
            path_length: self.stats.path_length,
            final_distance: seeker.manhattan_distance(hider),
            exposure_time: self.stats.exposure.as_secs_f32(),
        }
    }

    /// Resets and runs one round until a catch or the time limit.
    pub fn run_round(&mut self) -> RoundOutcome {
        self.reset_round();
        self.rounds_played = self.rounds_played.saturating_add(1);
        let round = self.rounds_played;
        info!(round, "round started");

        let max_steps = self.config.max_steps();
        while self.stats.steps < max_steps {
            self.events.clear();
            self.step();
            if self.is_caught() {
                break;
            }
        }
        self.events.clear();

        let outcome = self.outcome();
        info!(
            round,
            caught = outcome.caught,
            steps = outcome.steps,
            time_elapsed = outcome.time_elapsed,
            path_length = outcome.path_length,
            "round finished"
        );
        outcome
    }

    /// Runs `rounds` rounds back to back.
    pub fn run_batch(&mut self, rounds: u32) -> Vec<RoundOutcome> {
        let outcomes: Vec<RoundOutcome> = (0..rounds).map(|_| self.run_round()).collect();
        let caught = outcomes.iter().filter(|outcome| outcome.caught).count();
        info!(rounds, caught, "batch finished");
        outcomes
    }

    fn agent(&self, role: AgentRole) -> &Agent {
        match role {
            AgentRole::Seeker => &self.seeker,
            AgentRole::Hider => &self.hider,
        }
    }

    fn agent_mut(&mut self, role: AgentRole) -> &mut Agent {
        match role {
            AgentRole::Seeker => &mut self.seeker,
            AgentRole::Hider => &mut self.hider,
        }
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn configure_grid(&mut self, size: u32) {
        self.config.grid_size = size;
        self.apply(Command::ConfigureGrid {
            size,
            tile_length: self.config.tile_length(),
            header_height: self.config.header_height,
        });
    }

    fn assign_path(
        &mut self,
        role: AgentRole,
        target: CellCoord,
        path: Vec<CellCoord>,
    ) -> Result<(), TargetError> {
        let from = query::agent_cell(&self.world, role);
        let start = self.events.len();
        self.apply(Command::AssignPath { role, target, path });
        let assigned = self.events[start..]
            .iter()
            .any(|event| matches!(event, Event::PathAssigned { .. }));
        if assigned {
            Ok(())
        } else {
            Err(TargetError::NoPath { from, to: target })
        }
    }

    fn replan_targets(&mut self) {
        for role in [AgentRole::Seeker, AgentRole::Hider] {
            let Some(target) = query::body(&self.world, role).target() else {
                continue;
            };
            if let Err(error) = self.set_target(role, target) {
                debug!(role = role.label(), %error, "dropping target after wall edit");
                self.clear_target(role);
            }
        }
    }

    fn think(&mut self, role: AgentRole) {
        let agent = match role {
            AgentRole::Seeker => &mut self.seeker,
            AgentRole::Hider => &mut self.hider,
        };
        let grid = query::grid_view(&self.world);
        let body = query::body(&self.world, role);
        let own_cell = body.cell();
        let context = DecisionContext {
            grid,
            own_cell,
            own_position: body.position(),
            opponent_cell: query::agent_cell(&self.world, role.opponent()),
            current_target: body.target(),
            elapsed: self.stats.elapsed,
        };

        let pathfinder = &mut self.pathfinder;
        let extra_costs = &self.extra_costs;
        let mut planned: Option<(CellCoord, Vec<CellCoord>)> = None;
        let decision = agent.policy.decide(&context, &mut |cell| {
            match pathfinder.plan(grid, own_cell, cell, extra_costs) {
                Ok(path) => {
                    planned = Some((cell, path));
                    true
                }
                Err(error) => {
                    trace!(%error, "target refused");
                    false
                }
            }
        });
        agent.thought = decision.thought();
        debug!(
            role = role.label(),
            thought = ?decision.thought(),
            target = ?decision.target(),
            "decided"
        );

        let Decision::Retarget { cell, .. } = decision else {
            return;
        };
        let result = match planned {
            Some((target, path)) if target == cell => self.assign_path(role, target, path),
            _ => self.set_target(role, cell),
        };
        if let Err(error) = result {
            warn!(role = role.label(), %error, "decided target could not be installed");
        }
    }
}
