//! Identifier newtypes and grid coordinates.
//!
//! Every entity in the simulation is addressed by a small integer id issued
//! in creation order, so "iterate in id order" is the same as "iterate in
//! creation order". Grid cells and agents hold ids, never references.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// A piece of furniture (table, stove, counter, garden, decor).
    FurnitureId,
    "furniture"
);
id_type!(
    /// A hired staff member.
    StaffId,
    "staff"
);
id_type!(
    /// A customer; doubles as the OrderBoard key.
    CustomerId,
    "customer"
);

/// Hands out monotonically increasing ids for one id space.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next raw id value; never reused.
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The value `allocate` would return next.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// Integer cell coordinate on the restaurant grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbours in pathfinding order.
    pub fn neighbors(self) -> [GridPos; 4] {
        [
            GridPos::new(self.x, self.y + 1),
            GridPos::new(self.x + 1, self.y),
            GridPos::new(self.x, self.y - 1),
            GridPos::new(self.x - 1, self.y),
        ]
    }

    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
