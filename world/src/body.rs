//! Continuous agent motion along discrete paths.

use glam::Vec2;
use hiding_wumpus_core::{CellCoord, CellPoint};

/// Physical state of one agent: where it stands and where it walks.
///
/// The path stores cells; the agent walks between their centres.
#[derive(Clone, Debug)]
pub struct Body {
    position: Vec2,
    target: Option<CellCoord>,
    path: Vec<CellCoord>,
    path_index: usize,
    speed: f32,
}

impl Body {
    pub(crate) fn new(position: CellPoint, speed: f32) -> Self {
        Self {
            position: to_vec(position),
            target: None,
            path: Vec::new(),
            path_index: 0,
            speed,
        }
    }

    /// Continuous position measured in cell units.
    #[must_use]
    pub fn position(&self) -> CellPoint {
        CellPoint::new(self.position.x, self.position.y)
    }

    /// Cell containing the agent's position.
    #[must_use]
    pub fn cell(&self) -> CellCoord {
        self.position().to_cell()
    }

    /// Target the agent is heading for, if any.
    #[must_use]
    pub fn target(&self) -> Option<CellCoord> {
        self.target
    }

    /// Full path assigned with the current target, empty when there is none.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Index of the waypoint the agent currently walks towards.
    #[must_use]
    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// Waypoints not reached yet.
    #[must_use]
    pub fn remaining_path(&self) -> &[CellCoord] {
        self.path.get(self.path_index..).unwrap_or(&[])
    }

    /// Walking speed in cells per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Reports whether waypoints remain on the path.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.path_index < self.path.len()
    }

    pub(crate) fn place(&mut self, position: CellPoint) {
        self.position = to_vec(position);
        self.clear_target();
    }

    pub(crate) fn assign_path(&mut self, target: CellCoord, path: Vec<CellCoord>) {
        self.target = Some(target);
        self.path = path;
        self.path_index = 0;
    }

    pub(crate) fn clear_target(&mut self) {
        self.target = None;
        self.drop_path();
    }

    pub(crate) fn drop_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
    }

    pub(crate) fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub(crate) fn remaining_path_contains(&self, cell: CellCoord) -> bool {
        self.remaining_path().contains(&cell)
    }

    /// Moves along the path by `speed * dt`, carrying leftover distance past waypoints.
    ///
    /// Returns `true` when the final waypoint was reached during this call.
    pub(crate) fn integrate(&mut self, dt: f32) -> bool {
        if !self.is_moving() {
            return false;
        }

        let mut budget = (self.speed * dt).max(0.0);
        while let Some(&cell) = self.path.get(self.path_index) {
            let waypoint = to_vec(cell.center());
            let offset = waypoint - self.position;
            let distance = offset.length();

            if distance <= budget {
                self.position = waypoint;
                budget -= distance;
                self.path_index += 1;
                continue;
            }

            if budget > 0.0 {
                self.position += offset / distance * budget;
            }
            break;
        }

        !self.is_moving()
    }
}

fn to_vec(point: CellPoint) -> Vec2 {
    Vec2::new(point.column(), point.row())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path(length: u32) -> Vec<CellCoord> {
        (0..length).map(|column| CellCoord::new(column, 0)).collect()
    }

    #[test]
    fn walks_at_constant_speed() {
        let mut body = Body::new(CellPoint::new(0.5, 0.5), 2.0);
        body.assign_path(CellCoord::new(3, 0), straight_path(4));

        assert!(!body.integrate(0.5));
        assert!((body.position().column() - 1.5).abs() < 1e-5);
        assert_eq!(body.cell(), CellCoord::new(1, 0));
    }

    #[test]
    fn large_steps_carry_over_waypoints() {
        let mut fine = Body::new(CellPoint::new(0.5, 0.5), 4.0);
        let mut coarse = fine.clone();
        fine.assign_path(CellCoord::new(5, 0), straight_path(6));
        coarse.assign_path(CellCoord::new(5, 0), straight_path(6));

        for _ in 0..10 {
            let _ = fine.integrate(0.05);
        }
        let _ = coarse.integrate(0.5);

        assert!((fine.position().column() - coarse.position().column()).abs() < 1e-4);
    }

    #[test]
    fn reports_arrival_once_path_is_exhausted() {
        let mut body = Body::new(CellPoint::new(0.5, 0.5), 10.0);
        body.assign_path(CellCoord::new(2, 0), straight_path(3));

        assert!(body.integrate(1.0));
        assert_eq!(body.cell(), CellCoord::new(2, 0));
        assert!(!body.is_moving());
        assert!(!body.integrate(1.0));
    }

    #[test]
    fn recentres_before_walking_from_cell_corner() {
        let mut body = Body::new(CellPoint::new(0.0, 0.0), 1.0);
        body.assign_path(CellCoord::new(1, 0), straight_path(2));

        let _ = body.integrate(0.5);
        assert_eq!(body.path_index(), 0);
        assert_eq!(body.remaining_path().len(), 2);
    }

    #[test]
    fn placing_drops_target_and_path() {
        let mut body = Body::new(CellPoint::new(0.5, 0.5), 1.0);
        body.assign_path(CellCoord::new(2, 0), straight_path(3));

        body.place(CellPoint::new(4.5, 4.5));

        assert_eq!(body.target(), None);
        assert!(body.path().is_empty());
        assert_eq!(body.cell(), CellCoord::new(4, 4));
    }
}
