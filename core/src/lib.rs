#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared vocabulary for the Mazebound engine.
//!
//! This crate defines the coordinate and identifier types that connect the
//! authoritative field, the pure systems, and the adapters. It carries no
//! engine logic: the grid, connectivity, and scheduling live in
//! `mazebound-world`, which consumes these types.

use serde::{Deserialize, Serialize};

/// Cardinal movement directions on the 4-connected block lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing x.
    West,
    /// Movement toward increasing x.
    East,
    /// Movement toward decreasing y.
    North,
    /// Movement toward increasing y.
    South,
}

impl Direction {
    /// All four directions in the engine's fixed expansion order.
    ///
    /// Breadth-first expansion and collision scans both visit neighbors in
    /// this order, which pins tie-breaking and keeps replays deterministic.
    pub const CARDINALS: [Direction; 4] = [
        Direction::West,
        Direction::East,
        Direction::North,
        Direction::South,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
        }
    }
}

/// Location of a single block expressed as x and y grid indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the block.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the block.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Coordinate one step in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// upper bounds are the owning grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<GridCoord> {
        match direction {
            Direction::West => self.x.checked_sub(1).map(|x| GridCoord::new(x, self.y)),
            Direction::East => self.x.checked_add(1).map(|x| GridCoord::new(x, self.y)),
            Direction::North => self.y.checked_sub(1).map(|y| GridCoord::new(self.x, y)),
            Direction::South => self.y.checked_add(1).map(|y| GridCoord::new(self.x, y)),
        }
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// The two kinds of terrain a block may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Traversable terrain that permits occupancy and path expansion.
    Floor,
    /// Impassable terrain that blocks movement and path expansion.
    Wall,
}

impl BlockKind {
    /// Reports whether the kind permits occupancy and path expansion.
    #[must_use]
    pub const fn is_floor(self) -> bool {
        matches!(self, BlockKind::Floor)
    }

    /// Character used when rendering an unoccupied block of this kind.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            BlockKind::Floor => '.',
            BlockKind::Wall => '#',
        }
    }
}

/// Unique identifier assigned to an occupant by the field that registered it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Resolution of a single character turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnCommand {
    /// Spend the turn without acting.
    Wait,
    /// Attempt one step in the given direction.
    Move(Direction),
    /// Ask the surrounding driver to shut the game down.
    Quit,
}

/// Resolution of a collision handler invoked when two occupants meet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionResponse {
    /// No reaction to the contact.
    Ignore,
    /// Strike the other party for the given amount of damage.
    Attack {
        /// Damage delivered to the other party.
        damage: i32,
    },
}

/// Stat table attached to a character mold.
///
/// The values originate in the external balance catalog; the engine only
/// reads them when instantiating characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Hit points a fresh character starts with.
    pub max_hp: i32,
    /// Damage dealt by one strike.
    pub attack: i32,
    /// Amount subtracted from the readiness timer each tick.
    pub agility: i32,
}

/// Template describing one enemy species, consumed from the data catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyMold {
    /// Species name shown in combat reports.
    pub name: String,
    /// Character rendered on the grid dump.
    pub glyph: char,
    /// Stats applied to each spawned instance.
    pub stats: StatBlock,
}

/// Template describing one item, consumed from the data catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMold {
    /// Item name shown in pickup reports.
    pub name: String,
    /// Character rendered on the grid dump.
    pub glyph: char,
    /// Magnitude of the item's effect, interpreted by the consumer.
    pub power: i32,
}

#[cfg(test)]
mod tests {
    use super::{BlockKind, Direction, GridCoord, ItemMold, ObjectId, StatBlock};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn step_respects_quadrant_edges() {
        let origin = GridCoord::new(0, 0);
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(origin.step(Direction::North), None);
        assert_eq!(origin.step(Direction::East), Some(GridCoord::new(1, 0)));
        assert_eq!(origin.step(Direction::South), Some(GridCoord::new(0, 1)));
    }

    #[test]
    fn opposite_is_involutive() {
        for direction in Direction::CARDINALS {
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let a = GridCoord::new(1, 1);
        let b = GridCoord::new(4, 3);
        assert_eq!(a.manhattan_distance(b), 5);
        assert_eq!(b.manhattan_distance(a), 5);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn object_id_round_trips_through_bincode() {
        assert_round_trip(&ObjectId::new(42));
    }

    #[test]
    fn grid_coord_round_trips_through_bincode() {
        assert_round_trip(&GridCoord::new(7, 3));
    }

    #[test]
    fn block_kind_round_trips_through_bincode() {
        assert_round_trip(&BlockKind::Wall);
    }

    #[test]
    fn item_mold_round_trips_through_bincode() {
        let mold = ItemMold {
            name: "herb".to_string(),
            glyph: '!',
            power: 20,
        };
        assert_round_trip(&mold);
        let stats = StatBlock {
            max_hp: 12,
            attack: 3,
            agility: 8,
        };
        assert_round_trip(&stats);
    }
}
