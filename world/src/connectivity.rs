//! Incrementally-maintained shortest-path forest rooted at a single origin.
//!
//! The map mirrors the field's block lattice: one optional distance per cell
//! and one optional arrow per inter-cell edge. An arrow records the direction
//! of traversal from the parent toward the child in the breadth-first tree,
//! so every reachable non-origin cell carries exactly one incoming arrow from
//! a neighbor one step closer to the origin. Passability is supplied by the
//! caller as a closure; out-of-range lookups count as impassable.
//!
//! Single-cell wall toggles are folded in without a full rebuild:
//! `on_wall_added` deletes the severed subtree (re-seeding cells that remain
//! referenced by an alternate arrow) and `on_floor_restored` seeds the
//! neighbors of the reopened cell. Both finish with the same expansion loop
//! used by `generate`, whose acceptance rule is first-arrival-wins: a
//! candidate is adopted only when the cell has no distance yet or the
//! candidate is strictly shorter, and ties never rewrite an arrow.

use std::collections::VecDeque;

use mazebound_core::{Direction, GridCoord};

/// One unit of pending expansion work.
#[derive(Clone, Copy, Debug)]
struct ExpandNode {
    cell: GridCoord,
    distance: u32,
    /// Parent cell and traversal direction, or `None` for re-expansion seeds
    /// whose recorded distance is re-validated when the node is processed.
    entry: Option<(GridCoord, Direction)>,
}

#[derive(Clone, Debug)]
pub(crate) struct ConnectivityMap {
    width: u32,
    height: u32,
    distances: Vec<Option<u32>>,
    /// Arrows on edges between (x, y) and (x + 1, y); `(width - 1) * height`.
    horizontal: Vec<Option<Direction>>,
    /// Arrows on edges between (x, y) and (x, y + 1); `width * (height - 1)`.
    vertical: Vec<Option<Direction>>,
    queue: VecDeque<ExpandNode>,
    generated: bool,
}

impl ConnectivityMap {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let cells = (width as usize) * (height as usize);
        let horizontal = (width.saturating_sub(1) as usize) * (height as usize);
        let vertical = (width as usize) * (height.saturating_sub(1) as usize);
        Self {
            width,
            height,
            distances: vec![None; cells],
            horizontal: vec![None; horizontal],
            vertical: vec![None; vertical],
            queue: VecDeque::new(),
            generated: false,
        }
    }

    /// True once `generate` has run; reachability gating is meaningless before.
    pub(crate) fn is_generated(&self) -> bool {
        self.generated
    }

    /// Distance from the origin, or `None` when unreachable or out of range.
    pub(crate) fn distance(&self, cell: GridCoord) -> Option<u32> {
        self.cell_index(cell).and_then(|index| self.distances[index])
    }

    /// Arrow stored on the edge adjacent to `cell` in `direction`.
    ///
    /// Out-of-range edges report `None`, like every other read.
    pub(crate) fn arrow_from(&self, cell: GridCoord, direction: Direction) -> Option<Direction> {
        self.edge_index(cell, direction)
            .and_then(|slot| match slot {
                EdgeSlot::Horizontal(index) => self.horizontal[index],
                EdgeSlot::Vertical(index) => self.vertical[index],
            })
    }

    /// Rebuilds the whole forest from scratch with `origin` at distance zero.
    pub(crate) fn generate<F>(&mut self, origin: GridCoord, is_floor: F)
    where
        F: Fn(GridCoord) -> bool,
    {
        self.distances.fill(None);
        self.horizontal.fill(None);
        self.vertical.fill(None);
        self.queue.clear();

        if let Some(index) = self.cell_index(origin) {
            if is_floor(origin) {
                self.distances[index] = Some(0);
                self.queue.push_back(ExpandNode {
                    cell: origin,
                    distance: 0,
                    entry: None,
                });
            }
        }
        self.expand(&is_floor);
        self.generated = true;
    }

    /// Folds in a Floor→Wall change at `cell`.
    ///
    /// The subtree hanging off the cell is deleted with an explicit worklist.
    /// A chained cell that is still the target of another arrow (its referred
    /// count, recomputed fresh each visit, is positive) survives and is
    /// seeded for re-expansion with its known distance; everything else loses
    /// its distance and incident arrows while its still-measured neighbors
    /// are seeded. The expansion loop then reconnects whatever has a path
    /// around the new wall.
    pub(crate) fn on_wall_added<F>(&mut self, cell: GridCoord, is_floor: F)
    where
        F: Fn(GridCoord) -> bool,
    {
        if !self.generated {
            return;
        }

        let mut worklist: Vec<(GridCoord, bool)> = vec![(cell, true)];
        while let Some((current, is_root)) = worklist.pop() {
            if !is_root && self.referred_count(current) > 0 {
                if let Some(distance) = self.distance(current) {
                    self.queue.push_back(ExpandNode {
                        cell: current,
                        distance,
                        entry: None,
                    });
                }
                continue;
            }

            if let Some(index) = self.cell_index(current) {
                self.distances[index] = None;
            }

            // Children are the neighbors this cell parents; capture them
            // before wiping the incident arrows.
            for direction in Direction::CARDINALS {
                let is_child = self.arrow_from(current, direction) == Some(direction);
                self.clear_edge(current, direction);
                if is_child {
                    if let Some(child) = current.step(direction) {
                        worklist.push((child, false));
                    }
                }
            }

            // The hole regrows from its rim: any neighbor still holding a
            // distance becomes a seed. Stale seeds are dropped at pop time,
            // so seeding a cell the worklist later deletes is harmless.
            for direction in Direction::CARDINALS {
                if let Some(neighbor) = current.step(direction) {
                    if let Some(distance) = self.distance(neighbor) {
                        self.queue.push_back(ExpandNode {
                            cell: neighbor,
                            distance,
                            entry: None,
                        });
                    }
                }
            }
        }

        self.expand(&is_floor);
    }

    /// Folds in a Wall→Floor change at `cell`.
    ///
    /// Neighbors that already carry a distance are candidate parents; seeding
    /// them both assigns the reopened cell a distance and lets any strictly
    /// shorter route propagate beyond it.
    pub(crate) fn on_floor_restored<F>(&mut self, cell: GridCoord, is_floor: F)
    where
        F: Fn(GridCoord) -> bool,
    {
        if !self.generated {
            return;
        }

        for direction in Direction::CARDINALS {
            if let Some(neighbor) = cell.step(direction) {
                if let Some(distance) = self.distance(neighbor) {
                    self.queue.push_back(ExpandNode {
                        cell: neighbor,
                        distance,
                        entry: None,
                    });
                }
            }
        }
        self.expand(&is_floor);
    }

    /// Drains the work queue in FIFO order, applying the acceptance rule.
    fn expand<F>(&mut self, is_floor: &F)
    where
        F: Fn(GridCoord) -> bool,
    {
        while let Some(node) = self.queue.pop_front() {
            let Some(index) = self.cell_index(node.cell) else {
                continue;
            };
            if !is_floor(node.cell) {
                continue;
            }

            match node.entry {
                None => {
                    // Re-expansion seed: only valid while the recorded
                    // distance survived the deletion pass.
                    let Some(distance) = self.distances[index] else {
                        continue;
                    };
                    self.enqueue_neighbors(node.cell, distance + 1);
                }
                Some((parent, direction)) => {
                    let existing = self.distances[index];
                    if let Some(existing) = existing {
                        if node.distance >= existing {
                            continue;
                        }
                    }

                    // A cell keeps exactly one incoming arrow; a strictly
                    // shorter route supersedes the stale parent link.
                    self.clear_incoming_arrows(node.cell);
                    self.distances[index] = Some(node.distance);
                    self.set_edge(parent, direction);
                    self.enqueue_neighbors(node.cell, node.distance + 1);
                }
            }
        }
    }

    fn enqueue_neighbors(&mut self, cell: GridCoord, distance: u32) {
        for direction in Direction::CARDINALS {
            if let Some(neighbor) = cell.step(direction) {
                if self.cell_index(neighbor).is_some() {
                    self.queue.push_back(ExpandNode {
                        cell: neighbor,
                        distance,
                        entry: Some((cell, direction)),
                    });
                }
            }
        }
    }

    /// Number of arrows pointing into `cell` from its neighbors.
    fn referred_count(&self, cell: GridCoord) -> usize {
        Direction::CARDINALS
            .iter()
            .filter(|&&direction| {
                self.arrow_from(cell, direction) == Some(direction.opposite())
            })
            .count()
    }

    /// Clears every arrow whose traversal direction points into `cell`.
    fn clear_incoming_arrows(&mut self, cell: GridCoord) {
        for direction in Direction::CARDINALS {
            if self.arrow_from(cell, direction) == Some(direction.opposite()) {
                self.clear_edge(cell, direction);
            }
        }
    }

    fn set_edge(&mut self, parent: GridCoord, direction: Direction) {
        if let Some(slot) = self.edge_index(parent, direction) {
            match slot {
                EdgeSlot::Horizontal(index) => self.horizontal[index] = Some(direction),
                EdgeSlot::Vertical(index) => self.vertical[index] = Some(direction),
            }
        }
    }

    fn clear_edge(&mut self, cell: GridCoord, direction: Direction) {
        if let Some(slot) = self.edge_index(cell, direction) {
            match slot {
                EdgeSlot::Horizontal(index) => self.horizontal[index] = None,
                EdgeSlot::Vertical(index) => self.vertical[index] = None,
            }
        }
    }

    fn cell_index(&self, cell: GridCoord) -> Option<usize> {
        if cell.x() < self.width && cell.y() < self.height {
            Some((cell.y() as usize) * (self.width as usize) + cell.x() as usize)
        } else {
            None
        }
    }

    /// Storage slot of the edge adjacent to `cell` in `direction`.
    fn edge_index(&self, cell: GridCoord, direction: Direction) -> Option<EdgeSlot> {
        if cell.x() >= self.width || cell.y() >= self.height {
            return None;
        }
        let row_width = self.width.saturating_sub(1) as usize;
        match direction {
            Direction::West => cell.x().checked_sub(1).map(|x| {
                EdgeSlot::Horizontal((cell.y() as usize) * row_width + x as usize)
            }),
            Direction::East => {
                if cell.x() + 1 < self.width {
                    Some(EdgeSlot::Horizontal(
                        (cell.y() as usize) * row_width + cell.x() as usize,
                    ))
                } else {
                    None
                }
            }
            Direction::North => cell.y().checked_sub(1).map(|y| {
                EdgeSlot::Vertical((y as usize) * (self.width as usize) + cell.x() as usize)
            }),
            Direction::South => {
                if cell.y() + 1 < self.height {
                    Some(EdgeSlot::Vertical(
                        (cell.y() as usize) * (self.width as usize) + cell.x() as usize,
                    ))
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum EdgeSlot {
    Horizontal(usize),
    Vertical(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(_: GridCoord) -> bool {
        true
    }

    fn walled(walls: Vec<GridCoord>) -> impl Fn(GridCoord) -> bool {
        move |cell| !walls.contains(&cell)
    }

    #[test]
    fn generate_measures_open_grid() {
        let mut map = ConnectivityMap::new(5, 5);
        map.generate(GridCoord::new(0, 0), open);

        assert!(map.is_generated());
        assert_eq!(map.distance(GridCoord::new(0, 0)), Some(0));
        assert_eq!(map.distance(GridCoord::new(4, 0)), Some(4));
        assert_eq!(map.distance(GridCoord::new(4, 4)), Some(8));
        assert_eq!(map.distance(GridCoord::new(5, 4)), None);
    }

    #[test]
    fn generate_skips_walls_and_pockets() {
        // Column x = 1 fully walled: the right side is unreachable.
        let blocked = walled(vec![
            GridCoord::new(1, 0),
            GridCoord::new(1, 1),
            GridCoord::new(1, 2),
        ]);
        let mut map = ConnectivityMap::new(3, 3);
        map.generate(GridCoord::new(0, 0), &blocked);

        assert_eq!(map.distance(GridCoord::new(0, 2)), Some(2));
        assert_eq!(map.distance(GridCoord::new(1, 1)), None);
        assert_eq!(map.distance(GridCoord::new(2, 0)), None);
        assert_eq!(map.distance(GridCoord::new(2, 2)), None);
    }

    #[test]
    fn arrows_form_a_parent_forest() {
        let mut map = ConnectivityMap::new(4, 4);
        map.generate(GridCoord::new(0, 0), open);

        for y in 0..4 {
            for x in 0..4 {
                let cell = GridCoord::new(x, y);
                let distance = map.distance(cell).expect("open grid is reachable");
                let incoming = Direction::CARDINALS
                    .iter()
                    .filter(|&&direction| {
                        map.arrow_from(cell, direction) == Some(direction.opposite())
                    })
                    .count();
                if distance == 0 {
                    assert_eq!(incoming, 0, "origin has no parent");
                } else {
                    assert_eq!(incoming, 1, "cell {cell:?} must have one parent");
                }
            }
        }
    }

    #[test]
    fn arrow_walk_reaches_origin_in_distance_steps() {
        let mut map = ConnectivityMap::new(5, 5);
        map.generate(GridCoord::new(0, 0), open);

        let mut cell = GridCoord::new(4, 4);
        let mut steps = 0;
        while cell != GridCoord::new(0, 0) {
            let parent_direction = Direction::CARDINALS
                .into_iter()
                .find(|&direction| {
                    map.arrow_from(cell, direction) == Some(direction.opposite())
                })
                .expect("every reachable cell has a parent arrow");
            cell = cell.step(parent_direction).expect("parent lies on the grid");
            steps += 1;
            assert!(steps <= 8, "walk must not loop");
        }
        assert_eq!(steps, 8);
    }

    #[test]
    fn wall_insertion_forces_detour() {
        let mut map = ConnectivityMap::new(5, 5);
        map.generate(GridCoord::new(0, 0), open);
        assert_eq!(map.distance(GridCoord::new(4, 0)), Some(4));

        let wall = GridCoord::new(2, 0);
        let blocked = walled(vec![wall]);
        map.on_wall_added(wall, &blocked);

        assert_eq!(map.distance(wall), None);
        assert_eq!(map.distance(GridCoord::new(3, 0)), Some(5));
        assert_eq!(map.distance(GridCoord::new(4, 0)), Some(6));
        // Untouched cells keep their shortest distances.
        assert_eq!(map.distance(GridCoord::new(1, 0)), Some(1));
        assert_eq!(map.distance(GridCoord::new(4, 4)), Some(8));
    }

    #[test]
    fn wall_insertion_clears_disconnected_pocket() {
        // 3x1 corridor; walling the middle cell strands the right end.
        let mut map = ConnectivityMap::new(3, 1);
        map.generate(GridCoord::new(0, 0), open);
        assert_eq!(map.distance(GridCoord::new(2, 0)), Some(2));

        let wall = GridCoord::new(1, 0);
        map.on_wall_added(wall, walled(vec![wall]));

        assert_eq!(map.distance(GridCoord::new(0, 0)), Some(0));
        assert_eq!(map.distance(GridCoord::new(1, 0)), None);
        assert_eq!(map.distance(GridCoord::new(2, 0)), None);
        for direction in Direction::CARDINALS {
            assert_eq!(map.arrow_from(GridCoord::new(2, 0), direction), None);
        }
    }

    #[test]
    fn referred_cell_survives_chain_deletion() {
        // In an open 3x3 grid rooted at the center, walling one neighbor of
        // the origin must not strip the diagonal cells that reach the origin
        // through another side.
        let mut map = ConnectivityMap::new(3, 3);
        map.generate(GridCoord::new(1, 1), open);

        let wall = GridCoord::new(1, 0);
        map.on_wall_added(wall, walled(vec![wall]));

        assert_eq!(map.distance(GridCoord::new(0, 0)), Some(2));
        assert_eq!(map.distance(GridCoord::new(2, 0)), Some(2));
        assert_eq!(map.distance(wall), None);
    }

    #[test]
    fn floor_restoration_reconnects_and_shortens() {
        let wall = GridCoord::new(1, 0);
        let blocked = walled(vec![wall]);
        let mut map = ConnectivityMap::new(3, 1);
        map.generate(GridCoord::new(0, 0), &blocked);
        assert_eq!(map.distance(GridCoord::new(2, 0)), None);

        map.on_floor_restored(wall, open);

        assert_eq!(map.distance(wall), Some(1));
        assert_eq!(map.distance(GridCoord::new(2, 0)), Some(2));
    }

    #[test]
    fn floor_restoration_shortens_far_side() {
        // 5x2 grid with a wall at (2, 0): the top-right corner detours
        // through the second row until the gap reopens.
        let wall = GridCoord::new(2, 0);
        let blocked = walled(vec![wall]);
        let mut map = ConnectivityMap::new(5, 2);
        map.generate(GridCoord::new(0, 0), &blocked);
        assert_eq!(map.distance(GridCoord::new(4, 0)), Some(6));

        map.on_floor_restored(wall, open);

        assert_eq!(map.distance(wall), Some(2));
        assert_eq!(map.distance(GridCoord::new(3, 0)), Some(3));
        assert_eq!(map.distance(GridCoord::new(4, 0)), Some(4));
    }

    #[test]
    fn incremental_updates_match_fresh_generation() {
        let origin = GridCoord::new(0, 0);
        let toggles = [
            GridCoord::new(2, 0),
            GridCoord::new(2, 1),
            GridCoord::new(2, 2),
            GridCoord::new(1, 3),
        ];

        let mut incremental = ConnectivityMap::new(5, 5);
        incremental.generate(origin, open);
        let mut walls: Vec<GridCoord> = Vec::new();
        for &toggle in &toggles {
            walls.push(toggle);
            let blocked = walled(walls.clone());
            incremental.on_wall_added(toggle, &blocked);
        }
        // Reopen one wall again to exercise the restoration path.
        let reopened = GridCoord::new(2, 1);
        walls.retain(|&cell| cell != reopened);
        incremental.on_floor_restored(reopened, walled(walls.clone()));

        let mut fresh = ConnectivityMap::new(5, 5);
        fresh.generate(origin, walled(walls.clone()));

        for y in 0..5 {
            for x in 0..5 {
                let cell = GridCoord::new(x, y);
                assert_eq!(
                    incremental.distance(cell),
                    fresh.distance(cell),
                    "distance mismatch at {cell:?}"
                );
            }
        }

        // The arrow forest stays valid even where tie-breaking could differ
        // from a fresh run: one parent per reachable cell, one step closer.
        for y in 0..5 {
            for x in 0..5 {
                let cell = GridCoord::new(x, y);
                let Some(distance) = incremental.distance(cell) else {
                    continue;
                };
                if distance == 0 {
                    continue;
                }
                let parents: Vec<Direction> = Direction::CARDINALS
                    .into_iter()
                    .filter(|&direction| {
                        incremental.arrow_from(cell, direction) == Some(direction.opposite())
                    })
                    .collect();
                assert_eq!(parents.len(), 1, "cell {cell:?} must have one parent");
                let parent = cell.step(parents[0]).expect("parent lies on the grid");
                assert_eq!(incremental.distance(parent), Some(distance - 1));
            }
        }
    }
}
