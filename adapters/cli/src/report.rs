use std::io::{self, Write};

use hiding_wumpus_core::{AgentRole, CellCoord};
use hiding_wumpus_system_simulation::RoundOutcome;
use hiding_wumpus_world::{query, World};

const CSV_HEADER: &str = "round,caught,steps,time_elapsed,path_length,final_distance,exposure_time";

/// Writes one CSV row per round, numbered from 1.
pub(crate) fn write_csv<W: Write>(mut out: W, outcomes: &[RoundOutcome]) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for (index, outcome) in outcomes.iter().enumerate() {
        writeln!(
            out,
            "{},{},{},{:.3},{},{},{:.3}",
            index + 1,
            outcome.caught,
            outcome.steps,
            outcome.time_elapsed,
            outcome.path_length,
            outcome.final_distance,
            outcome.exposure_time,
        )?;
    }
    out.flush()
}

/// Draws the grid row by row: `#` wall, `S`/`H` agents, `*` path, `.` floor.
pub(crate) fn render_ascii(world: &World, path: &[CellCoord]) -> String {
    let view = query::grid_view(world);
    let seeker = query::agent_cell(world, AgentRole::Seeker);
    let hider = query::agent_cell(world, AgentRole::Hider);

    let mut rendered = String::with_capacity(view.cell_count() + view.size() as usize);
    for cell in view.cells() {
        let glyph = if cell == seeker {
            'S'
        } else if cell == hider {
            'H'
        } else if view.is_wall(cell) {
            '#'
        } else if path.contains(&cell) {
            '*'
        } else {
            '.'
        };
        rendered.push(glyph);
        if cell.column() + 1 == view.size() {
            rendered.push('\n');
        }
    }
    rendered
}
