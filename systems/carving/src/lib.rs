#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Maze carving for dungeon floors.
//!
//! A floor starts as an open grid. Carving plants the fixed pillar lattice on
//! the odd/odd cells, roots the connectivity map at a random even/even entry,
//! and then spends a wall budget on random odd-parity cells, probing the map
//! after every wall. The first wall that disconnects the exit is reverted and
//! carving stops, so a finished floor is always walkable end to end. Stairs
//! land on the entry and exit when carving completes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use mazebound_core::{BlockKind, GridCoord, ObjectId};
use mazebound_world::{Field, FieldError, Occupant};

/// Walls attempted after the pillar pass.
pub const WALL_BUDGET: u32 = 100;

/// Random placements tried before giving up on a free cell.
const PLACEMENT_RETRIES: u32 = 1000;

/// Carving parameters for one floor.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Grid width in blocks; at least 5.
    pub width: u32,
    /// Grid height in blocks; at least 5.
    pub height: u32,
    /// Floor number stamped on the produced field.
    pub floor: u32,
    /// Seed for the carving stream.
    pub seed: u64,
    /// Walls attempted after the pillar pass.
    pub wall_budget: u32,
}

impl Config {
    /// Parameters with the standard wall budget.
    #[must_use]
    pub const fn new(width: u32, height: u32, floor: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            floor,
            seed,
            wall_budget: WALL_BUDGET,
        }
    }
}

/// A carved floor together with its endpoints.
#[derive(Debug)]
pub struct CarvedMaze {
    /// The finished field, connectivity rooted at the entry.
    pub field: Field,
    /// Entry cell; carries the downward stair.
    pub entry: GridCoord,
    /// Exit cell; carries the upward stair.
    pub exit: GridCoord,
}

/// Errors reported by carving and placement.
#[derive(Debug, Error)]
pub enum CarveError {
    /// The requested grid cannot hold the pillar lattice.
    #[error("grid {width}x{height} is too small to carve; need at least 5x5")]
    GridTooSmall {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// No free cell was found within the retry budget.
    #[error("no free cell found within {PLACEMENT_RETRIES} attempts")]
    NoFreeCell,
    /// A field mutation failed.
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Carves one floor from the given parameters.
pub fn carve(config: &Config) -> Result<CarvedMaze, CarveError> {
    if config.width < 5 || config.height < 5 {
        return Err(CarveError::GridTooSmall {
            width: config.width,
            height: config.height,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut field = Field::new(config.width, config.height, config.floor);

    let entry = random_even_cell(&mut rng, config.width, config.height);
    let exit = distinct_even_cell(&mut rng, config.width, config.height, entry)?;

    // Pillar lattice: every odd/odd cell. Entry and exit have even
    // coordinates and are never touched.
    for y in (1..config.height).step_by(2) {
        for x in (1..config.width).step_by(2) {
            field.set_block_kind(GridCoord::new(x, y), BlockKind::Wall)?;
        }
    }

    field.generate_connectivity(entry);

    for _ in 0..config.wall_budget {
        let cell = random_odd_parity_cell(&mut rng, config.width, config.height);
        if field.block_kind(cell) != Some(BlockKind::Floor) {
            continue;
        }
        field.set_block_kind(cell, BlockKind::Wall)?;
        if field.distance_from_origin(exit).is_none() {
            field.set_block_kind(cell, BlockKind::Floor)?;
            break;
        }
    }

    let _ = field.add_object_at(entry, Occupant::stair(false))?;
    let _ = field.add_object_at(exit, Occupant::stair(true))?;

    Ok(CarvedMaze { field, entry, exit })
}

/// Places an occupant on a random free even/even floor cell.
///
/// A cell qualifies when it is a floor block with no occupants and, once the
/// connectivity map has been generated, is reachable from the origin.
pub fn place_object_random(
    field: &mut Field,
    rng: &mut impl Rng,
    occupant: Occupant,
) -> Result<ObjectId, CarveError> {
    for _ in 0..PLACEMENT_RETRIES {
        let cell = random_even_cell(rng, field.width(), field.height());
        if field.block_kind(cell) != Some(BlockKind::Floor) {
            continue;
        }
        if !field.occupants_at(cell).is_empty() {
            continue;
        }
        if field.is_connectivity_generated() && field.distance_from_origin(cell).is_none() {
            continue;
        }
        return Ok(field.add_object_at(cell, occupant)?);
    }
    Err(CarveError::NoFreeCell)
}

fn random_even_cell(rng: &mut impl Rng, width: u32, height: u32) -> GridCoord {
    let x = rng.gen_range(0..(width + 1) / 2) * 2;
    let y = rng.gen_range(0..(height + 1) / 2) * 2;
    GridCoord::new(x, y)
}

fn distinct_even_cell(
    rng: &mut impl Rng,
    width: u32,
    height: u32,
    taken: GridCoord,
) -> Result<GridCoord, CarveError> {
    for _ in 0..PLACEMENT_RETRIES {
        let cell = random_even_cell(rng, width, height);
        if cell != taken {
            return Ok(cell);
        }
    }
    Err(CarveError::NoFreeCell)
}

/// Random cell whose coordinate sum is odd, so pillars are never hit.
fn random_odd_parity_cell(rng: &mut impl Rng, width: u32, height: u32) -> GridCoord {
    loop {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        if (x + y) % 2 == 1 {
            return GridCoord::new(x, y);
        }
    }
}
