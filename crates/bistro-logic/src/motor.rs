//! Agent motor: continuous movement along a discrete cell path.
//!
//! The motor knows nothing about what kind of agent it carries. Controllers
//! ask it to `move_to` a cell, the clock calls `advance` every tick, and the
//! controller checks `arrived_at` to decide when a leg is done.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::GridWorld;
use crate::ids::GridPos;
use crate::pathfinding::Pathfinder;

/// Distance (in tiles) under which an agent snaps onto its waypoint.
pub const ARRIVAL_EPSILON: f32 = 0.1;

/// Outcome of a `move_to` request. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Already walking to this target; nothing changed.
    EnRoute,
    /// A path was found and the agent is walking.
    Started,
    /// The agent already stands on the target.
    Arrived,
    /// No path right now; the agent stays put and should retry later.
    Blocked,
}

/// Movement state shared by staff and customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motor {
    pub x: f32,
    pub y: f32,
    /// Remaining waypoints, consumed front to back.
    pub path: VecDeque<GridPos>,
    /// Tiles per second.
    pub speed: f32,
    pub moving: bool,
    /// Cell of the last accepted `move_to`.
    pub target: Option<GridPos>,
}

impl Motor {
    pub fn new(at: GridPos, speed: f32) -> Self {
        Self {
            x: at.x as f32,
            y: at.y as f32,
            path: VecDeque::new(),
            speed,
            moving: false,
            target: None,
        }
    }

    /// The cell the agent is currently standing in (rounded position).
    pub fn cell(&self) -> GridPos {
        GridPos::new(self.x.round() as i32, self.y.round() as i32)
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Plan a walk to `target` from the current cell. An agent already
    /// between cells finishes its current step first and plans from there.
    pub fn move_to(
        &mut self,
        grid: &GridWorld,
        pathfinder: &mut Pathfinder,
        target: GridPos,
    ) -> MoveOutcome {
        if self.moving && self.target == Some(target) {
            return MoveOutcome::EnRoute;
        }

        if let (true, Some(&next)) = (self.moving, self.path.front()) {
            let Some(rest) = pathfinder.find_path(grid, next, target) else {
                return MoveOutcome::Blocked;
            };
            self.target = Some(target);
            self.path = std::iter::once(next).chain(rest).collect();
            return MoveOutcome::Started;
        }

        match pathfinder.find_path(grid, self.cell(), target) {
            Some(path) => {
                self.target = Some(target);
                if path.is_empty() {
                    self.snap_to(target);
                    MoveOutcome::Arrived
                } else {
                    self.path = path.into();
                    self.moving = true;
                    MoveOutcome::Started
                }
            }
            None => MoveOutcome::Blocked,
        }
    }

    /// Step along the path by `speed * dt` tiles.
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 || !self.moving {
            return;
        }

        let Some(&waypoint) = self.path.front() else {
            self.moving = false;
            return;
        };

        let dx = waypoint.x as f32 - self.x;
        let dy = waypoint.y as f32 - self.y;
        let distance = (dx * dx + dy * dy).sqrt();
        let step = self.speed * dt;

        if distance < ARRIVAL_EPSILON || step >= distance {
            self.x = waypoint.x as f32;
            self.y = waypoint.y as f32;
            self.path.pop_front();
            if self.path.is_empty() {
                self.moving = false;
            }
        } else {
            self.x += dx / distance * step;
            self.y += dy / distance * step;
        }
    }

    /// True once the agent has stopped on `target`.
    pub fn arrived_at(&self, target: GridPos) -> bool {
        !self.moving && self.cell() == target
    }

    /// Drop the current path and stand still.
    pub fn stop(&mut self) {
        self.path.clear();
        self.moving = false;
    }

    fn snap_to(&mut self, cell: GridPos) {
        self.x = cell.x as f32;
        self.y = cell.y as f32;
        self.stop();
    }
}
