//! Pure pathfinding over the occupancy grid.
//!
//! `Pathfinder` runs a breadth-first search over 4-connected cells and keeps
//! a small bounded cache of results. The cache is tied to the grid revision
//! it was filled from and is dropped as soon as the grid changes.

use std::collections::{HashMap, VecDeque};

use crate::grid::GridWorld;
use crate::ids::GridPos;

/// BFS pathfinder with a revision-scoped path cache.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    /// (from, to) → cached result, including "no path".
    cache: HashMap<(GridPos, GridPos), Option<Vec<GridPos>>>,
    cache_capacity: usize,
    /// Grid revision the cache entries were computed against.
    cached_revision: u64,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::with_cache(256)
    }

    /// Build a pathfinder with a specific cache capacity.
    pub fn with_cache(cache_capacity: usize) -> Self {
        Self {
            cache: HashMap::new(),
            cache_capacity,
            cached_revision: 0,
        }
    }

    /// Find a path from `from` to `goal`.
    ///
    /// The returned cells exclude `from` and end with `goal`; the path is
    /// empty when `from == goal`. The goal itself is always enterable, so an
    /// agent can walk up to a stove or table. Returns `None` if unreachable.
    pub fn find_path(&mut self, grid: &GridWorld, from: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
        if from == goal {
            return Some(vec![]);
        }

        if grid.revision() != self.cached_revision {
            self.cache.clear();
            self.cached_revision = grid.revision();
        }

        let key = (from, goal);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let result = bfs(grid, from, goal);

        if self.cache_capacity > 0 {
            if self.cache.len() >= self.cache_capacity {
                // Evict an arbitrary entry (HashMap iteration order)
                if let Some(&evict_key) = self.cache.keys().next() {
                    self.cache.remove(&evict_key);
                }
            }
            self.cache.insert(key, result.clone());
        }

        result
    }

    /// Number of cached results.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Uncached breadth-first search; first-found shortest path wins ties.
pub fn bfs(grid: &GridWorld, from: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
    if from == goal {
        return Some(vec![]);
    }
    let start = grid.cell_index(from)?;
    let goal_idx = grid.cell_index(goal)?;

    let cell_count = (grid.size() * grid.size()) as usize;
    let mut parent: Vec<Option<usize>> = vec![None; cell_count];
    let mut visited = vec![false; cell_count];
    let mut queue = VecDeque::new();
    visited[start] = true;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        let current_idx = grid.cell_index(current)?;
        for next in current.neighbors() {
            let Some(next_idx) = grid.cell_index(next) else {
                continue;
            };
            if visited[next_idx] || !(next == goal || grid.is_walkable(next)) {
                continue;
            }
            visited[next_idx] = true;
            parent[next_idx] = Some(current_idx);
            if next_idx == goal_idx {
                return Some(reconstruct(grid.size(), &parent, start, goal_idx));
            }
            queue.push_back(next);
        }
    }

    None
}

fn reconstruct(size: i32, parent: &[Option<usize>], start: usize, goal: usize) -> Vec<GridPos> {
    let mut path = Vec::new();
    let mut node = goal;
    while node != start {
        path.push(GridPos::new(node as i32 % size, node as i32 / size));
        match parent[node] {
            Some(prev) => node = prev,
            None => break,
        }
    }
    path.reverse();
    path
}
