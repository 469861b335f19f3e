#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Field state for the dungeon engine.
//!
//! A [`Field`] owns one floor: the block grid, the occupants standing on it,
//! the origin-rooted connectivity map, and the readiness scheduler that
//! advances time. Mutations flow through the field so the connectivity map
//! never drifts from the block lattice, and every observable consequence of a
//! tick is reported as a [`FieldEvent`] for the adapter layer to narrate.

mod connectivity;
mod objects;

use thiserror::Error;

use mazebound_core::{
    BlockKind, CollisionResponse, Direction, GridCoord, ItemMold, ObjectId, TurnCommand,
};

use connectivity::ConnectivityMap;
use objects::OccupantKind;

pub use objects::{Actor, Occupant, OccupantSummary};

/// Readiness debt charged for one resolved turn.
///
/// A character waits until its timer reaches zero, acts, and is charged this
/// amount again; each waiting tick subtracts the character's agility. The
/// player starts with half this debt so it acts first on a fresh floor.
pub const TURN_COST: i32 = 1000;

/// Errors reported by field mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The addressed cell lies outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Addressed column.
        x: u32,
        /// Addressed row.
        y: u32,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// No object with the given id is registered on the field.
    #[error("object {0:?} is not registered on this field")]
    MissingObject(ObjectId),
}

/// Observable consequence of a field mutation or tick, in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldEvent {
    /// A tick finished; `tick` is the index of the completed tick.
    TimeAdvanced {
        /// Index of the completed tick.
        tick: u64,
    },
    /// An object moved between blocks.
    ObjectMoved {
        /// Moving object.
        id: ObjectId,
        /// Block it left.
        from: GridCoord,
        /// Block it entered.
        to: GridCoord,
    },
    /// An attack response landed on a character.
    DamageDealt {
        /// Attacking character.
        attacker: ObjectId,
        /// Damaged character.
        target: ObjectId,
        /// Amount applied.
        damage: i32,
    },
    /// A trashed object was removed from the field.
    ObjectTrashed {
        /// Removed object.
        id: ObjectId,
    },
    /// A character stepped on an item and consumed it.
    ItemConsumed {
        /// Consumed item.
        item: ObjectId,
        /// Consuming character.
        by: ObjectId,
    },
    /// The player reached an upward stair.
    FloorExitReached {
        /// Floor the stair leads to.
        next_floor: u32,
    },
    /// The player asked to quit the session.
    QuitRequested,
}

/// Owned copy of one block's state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSnapshot {
    /// Block kind.
    pub kind: BlockKind,
    /// Ids standing on the block, bottom to top.
    pub occupants: Vec<ObjectId>,
}

#[derive(Debug)]
struct BlockState {
    kind: BlockKind,
    /// Ids standing on this block; the last entry renders on top.
    occupants: Vec<ObjectId>,
}

#[derive(Debug)]
struct ObjectEntry {
    id: ObjectId,
    position: GridCoord,
    occupant: Occupant,
}

/// One floor of the dungeon: grid, connectivity, occupants, and clock.
#[derive(Debug)]
pub struct Field {
    width: u32,
    height: u32,
    floor: u32,
    blocks: Vec<BlockState>,
    connectivity: ConnectivityMap,
    /// Registration order; ticks and collision sweeps iterate it as-is.
    objects: Vec<ObjectEntry>,
    next_object: u32,
    trashed: Vec<ObjectId>,
    tick_index: u64,
    floor_transition: Option<u32>,
    quit: bool,
}

impl Field {
    /// Creates an all-floor field of the given size on the given floor.
    #[must_use]
    pub fn new(width: u32, height: u32, floor: u32) -> Self {
        let cells = (width as usize) * (height as usize);
        let mut blocks = Vec::with_capacity(cells);
        for _ in 0..cells {
            blocks.push(BlockState {
                kind: BlockKind::Floor,
                occupants: Vec::new(),
            });
        }
        Self {
            width,
            height,
            floor,
            blocks,
            connectivity: ConnectivityMap::new(width, height),
            objects: Vec::new(),
            next_object: 0,
            trashed: Vec::new(),
            tick_index: 0,
            floor_transition: None,
            quit: false,
        }
    }

    /// Grid width in blocks.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in blocks.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Floor number this field represents.
    #[must_use]
    pub const fn floor(&self) -> u32 {
        self.floor
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Kind of the block at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn block_kind(&self, cell: GridCoord) -> Option<BlockKind> {
        self.cell_index(cell).map(|index| self.blocks[index].kind)
    }

    /// Snapshot of the block at `cell`; out-of-grid cells are an error.
    pub fn block_at(&self, cell: GridCoord) -> Result<BlockSnapshot, FieldError> {
        let index = self
            .cell_index(cell)
            .ok_or_else(|| self.out_of_bounds(cell))?;
        Ok(BlockSnapshot {
            kind: self.blocks[index].kind,
            occupants: self.blocks[index].occupants.clone(),
        })
    }

    /// Number of walls currently on the grid.
    #[must_use]
    pub fn wall_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| !block.kind.is_floor())
            .count()
    }

    /// Rewrites the block at `cell` and folds the change into connectivity.
    ///
    /// Writing the kind the block already has is a no-op. The connectivity
    /// map is only consulted after it has been generated.
    pub fn set_block_kind(&mut self, cell: GridCoord, kind: BlockKind) -> Result<(), FieldError> {
        let index = self
            .cell_index(cell)
            .ok_or_else(|| self.out_of_bounds(cell))?;
        if self.blocks[index].kind == kind {
            return Ok(());
        }
        self.blocks[index].kind = kind;

        let width = self.width;
        let height = self.height;
        let blocks = &self.blocks;
        let is_floor = move |c: GridCoord| {
            c.x() < width
                && c.y() < height
                && blocks[(c.y() as usize) * (width as usize) + c.x() as usize]
                    .kind
                    .is_floor()
        };
        match kind {
            BlockKind::Wall => self.connectivity.on_wall_added(cell, is_floor),
            BlockKind::Floor => self.connectivity.on_floor_restored(cell, is_floor),
        }
        Ok(())
    }

    /// Builds the connectivity map from scratch, rooted at `origin`.
    pub fn generate_connectivity(&mut self, origin: GridCoord) {
        let width = self.width;
        let height = self.height;
        let blocks = &self.blocks;
        let is_floor = move |c: GridCoord| {
            c.x() < width
                && c.y() < height
                && blocks[(c.y() as usize) * (width as usize) + c.x() as usize]
                    .kind
                    .is_floor()
        };
        self.connectivity.generate(origin, is_floor);
    }

    /// True once `generate_connectivity` has run.
    #[must_use]
    pub fn is_connectivity_generated(&self) -> bool {
        self.connectivity.is_generated()
    }

    /// Shortest walking distance from the connectivity origin to `cell`.
    #[must_use]
    pub fn distance_from_origin(&self, cell: GridCoord) -> Option<u32> {
        self.connectivity.distance(cell)
    }

    /// Parent arrow stored on the edge adjacent to `cell` in `direction`.
    #[must_use]
    pub fn arrow_from(&self, cell: GridCoord, direction: Direction) -> Option<Direction> {
        self.connectivity.arrow_from(cell, direction)
    }

    /// Registers an occupant at `cell` and returns its id.
    pub fn add_object_at(
        &mut self,
        cell: GridCoord,
        occupant: Occupant,
    ) -> Result<ObjectId, FieldError> {
        let index = self
            .cell_index(cell)
            .ok_or_else(|| self.out_of_bounds(cell))?;
        let id = ObjectId::new(self.next_object);
        self.next_object += 1;
        self.objects.push(ObjectEntry {
            id,
            position: cell,
            occupant,
        });
        self.blocks[index].occupants.push(id);
        Ok(id)
    }

    /// Unregisters an object and returns its occupant.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<Occupant, FieldError> {
        let entry_index = self
            .entry_index(id)
            .ok_or(FieldError::MissingObject(id))?;
        let entry = self.objects.remove(entry_index);
        if let Some(block_index) = self.cell_index(entry.position) {
            self.blocks[block_index].occupants.retain(|&other| other != id);
        }
        Ok(entry.occupant)
    }

    /// Occupant registered under `id`.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&Occupant> {
        self.entry_index(id).map(|index| &self.objects[index].occupant)
    }

    /// Block the object currently stands on.
    #[must_use]
    pub fn position_of(&self, id: ObjectId) -> Option<GridCoord> {
        self.entry_index(id).map(|index| self.objects[index].position)
    }

    /// Id of the tracked player, if one is registered.
    #[must_use]
    pub fn player_id(&self) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|entry| entry.occupant.is_player())
            .map(|entry| entry.id)
    }

    /// All registered objects in registration order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, GridCoord, &Occupant)> + '_ {
        self.objects
            .iter()
            .map(|entry| (entry.id, entry.position, &entry.occupant))
    }

    /// Ids standing on `cell`, bottom to top.
    #[must_use]
    pub fn occupants_at(&self, cell: GridCoord) -> Vec<ObjectId> {
        self.cell_index(cell)
            .map(|index| self.blocks[index].occupants.clone())
            .unwrap_or_default()
    }

    /// Teleports an object to `cell` without any walkability checks.
    pub fn move_object(&mut self, id: ObjectId, cell: GridCoord) -> Result<(), FieldError> {
        let to_index = self
            .cell_index(cell)
            .ok_or_else(|| self.out_of_bounds(cell))?;
        let entry_index = self
            .entry_index(id)
            .ok_or(FieldError::MissingObject(id))?;
        let from = self.objects[entry_index].position;
        if let Some(from_index) = self.cell_index(from) {
            self.blocks[from_index].occupants.retain(|&other| other != id);
        }
        self.blocks[to_index].occupants.push(id);
        self.objects[entry_index].position = cell;
        Ok(())
    }

    /// Runs one tick: readiness, turns, collisions, trash, time.
    ///
    /// Characters are visited in registration order. A character whose timer
    /// is still positive pays down agility; a ready character resolves one
    /// turn and is recharged with [`TURN_COST`]. Collision contacts are then
    /// swept block by block, trash is flushed, and the clock advances.
    pub fn tick(&mut self, out_events: &mut Vec<FieldEvent>) {
        let order: Vec<ObjectId> = self.objects.iter().map(|entry| entry.id).collect();
        for id in &order {
            self.run_character(*id, out_events);
        }

        // Contact sweep: each object meets every earlier-registered occupant
        // of its block, and both sides are notified.
        for subject in &order {
            let partners = self.contact_partners(*subject);
            for object in partners {
                self.process_contact(*subject, object, out_events);
                self.process_contact(object, *subject, out_events);
            }
        }

        let trashed = std::mem::take(&mut self.trashed);
        for id in trashed {
            if self.remove_object(id).is_ok() {
                out_events.push(FieldEvent::ObjectTrashed { id });
            }
        }

        self.tick_index += 1;
        out_events.push(FieldEvent::TimeAdvanced {
            tick: self.tick_index,
        });
    }

    /// Next floor requested by a stair contact, cleared on read.
    pub fn take_floor_transition(&mut self) -> Option<u32> {
        self.floor_transition.take()
    }

    /// True once the player issued a quit command.
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Renders the grid as rows of glyphs, topmost occupant first.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let index = (y as usize) * (self.width as usize) + x as usize;
                let block = &self.blocks[index];
                let glyph = block
                    .occupants
                    .last()
                    .and_then(|&id| self.object(id))
                    .map_or(block.kind.glyph(), Occupant::glyph);
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    fn run_character(&mut self, id: ObjectId, out_events: &mut Vec<FieldEvent>) {
        if self.is_trashed(id) {
            return;
        }
        let Some(entry_index) = self.entry_index(id) else {
            return;
        };

        let (mut taken, is_player) = {
            let OccupantKind::Character {
                actor,
                time_wait,
                is_player,
            } = self.objects[entry_index].occupant.kind_mut()
            else {
                return;
            };
            if *time_wait > 0 {
                if let Some(actor) = actor.as_ref() {
                    *time_wait -= actor.agility();
                }
                return;
            }
            match actor.take() {
                Some(actor) => (actor, *is_player),
                None => return,
            }
        };

        if taken.is_dead() {
            self.restore_actor(id, taken);
            self.mark_trashed(id);
            return;
        }

        let command = taken.take_turn(id, &FieldView::new(self));
        self.restore_actor(id, taken);

        match command {
            TurnCommand::Wait => {}
            TurnCommand::Move(direction) => {
                let _ = self.try_move(id, direction, out_events);
            }
            TurnCommand::Quit => {
                if is_player {
                    self.quit = true;
                    out_events.push(FieldEvent::QuitRequested);
                }
            }
        }
    }

    /// Attempts a one-block step; returns whether the turn was consumed.
    ///
    /// Walls and grid edges refuse the step without consuming it. A blocking
    /// occupant turns the step into a bump: the mover's collision response is
    /// applied to the blocker and the turn still counts.
    pub fn try_move(
        &mut self,
        id: ObjectId,
        direction: Direction,
        out_events: &mut Vec<FieldEvent>,
    ) -> bool {
        let Some(from) = self.position_of(id) else {
            return false;
        };
        let Some(to) = from.step(direction) else {
            return false;
        };
        let Some(to_index) = self.cell_index(to) else {
            return false;
        };
        if !self.blocks[to_index].kind.is_floor() {
            return false;
        }

        if let Some(blocker) = self.non_traversable_occupant_at(to) {
            let Some(summary) = self.summary(blocker) else {
                return false;
            };
            let response = match self.actor_mut(id) {
                Some(actor) => actor.on_collision(id, &summary),
                None => return false,
            };
            if let CollisionResponse::Attack { damage } = response {
                self.apply_attack(id, blocker, damage, out_events);
            }
            return true;
        }

        if let Some(from_index) = self.cell_index(from) {
            self.blocks[from_index].occupants.retain(|&other| other != id);
        }
        self.blocks[to_index].occupants.push(id);
        if let Some(entry_index) = self.entry_index(id) {
            self.objects[entry_index].position = to;
        }
        out_events.push(FieldEvent::ObjectMoved { id, from, to });
        true
    }

    /// Earlier-registered occupants sharing the subject's block.
    fn contact_partners(&self, subject: ObjectId) -> Vec<ObjectId> {
        let Some(position) = self.position_of(subject) else {
            return Vec::new();
        };
        let Some(index) = self.cell_index(position) else {
            return Vec::new();
        };
        let mut partners = Vec::new();
        for &other in &self.blocks[index].occupants {
            if other == subject {
                break;
            }
            partners.push(other);
        }
        partners
    }

    fn process_contact(
        &mut self,
        subject: ObjectId,
        object: ObjectId,
        out_events: &mut Vec<FieldEvent>,
    ) {
        if self.is_trashed(subject) || self.is_trashed(object) {
            return;
        }
        let Some(subject_index) = self.entry_index(subject) else {
            return;
        };
        if self.entry_index(object).is_none() {
            return;
        }

        enum Contact {
            Character,
            Item(ItemMold),
            UpStair,
            Inert,
        }
        let contact = match self.objects[subject_index].occupant.kind() {
            OccupantKind::Character { .. } => Contact::Character,
            OccupantKind::Item { mold } => Contact::Item(mold.clone()),
            OccupantKind::Stair { upward: true } => Contact::UpStair,
            OccupantKind::Stair { upward: false } => Contact::Inert,
        };

        match contact {
            Contact::Character => {
                let Some(summary) = self.summary(object) else {
                    return;
                };
                let response = match self.actor_mut(subject) {
                    Some(actor) => actor.on_collision(subject, &summary),
                    None => return,
                };
                if let CollisionResponse::Attack { damage } = response {
                    self.apply_attack(subject, object, damage, out_events);
                }
            }
            Contact::Item(mold) => {
                let consumed = match self.actor_mut(object) {
                    Some(actor) => {
                        actor.on_item(&mold);
                        true
                    }
                    None => false,
                };
                if consumed {
                    self.mark_trashed(subject);
                    out_events.push(FieldEvent::ItemConsumed {
                        item: subject,
                        by: object,
                    });
                }
            }
            Contact::UpStair => {
                let is_player = self
                    .object(object)
                    .map_or(false, Occupant::is_player);
                if is_player && self.floor_transition.is_none() {
                    let next_floor = self.floor + 1;
                    self.floor_transition = Some(next_floor);
                    out_events.push(FieldEvent::FloorExitReached { next_floor });
                }
            }
            Contact::Inert => {}
        }
    }

    fn apply_attack(
        &mut self,
        attacker: ObjectId,
        target: ObjectId,
        damage: i32,
        out_events: &mut Vec<FieldEvent>,
    ) {
        let Some(actor) = self.actor_mut(target) else {
            return;
        };
        actor.apply_damage(damage);
        let dead = actor.is_dead();
        out_events.push(FieldEvent::DamageDealt {
            attacker,
            target,
            damage,
        });
        if dead {
            self.mark_trashed(target);
        }
    }

    fn restore_actor(&mut self, id: ObjectId, restored: Box<dyn Actor>) {
        if let Some(entry_index) = self.entry_index(id) {
            if let OccupantKind::Character {
                actor, time_wait, ..
            } = self.objects[entry_index].occupant.kind_mut()
            {
                *actor = Some(restored);
                *time_wait += TURN_COST;
            }
        }
    }

    fn actor_mut(&mut self, id: ObjectId) -> Option<&mut dyn Actor> {
        let index = self.entry_index(id)?;
        match self.objects[index].occupant.kind_mut() {
            OccupantKind::Character {
                actor: Some(actor), ..
            } => Some(actor.as_mut()),
            _ => None,
        }
    }

    fn mark_trashed(&mut self, id: ObjectId) {
        if !self.trashed.contains(&id) {
            self.trashed.push(id);
        }
    }

    fn is_trashed(&self, id: ObjectId) -> bool {
        self.trashed.contains(&id)
    }

    /// First non-traversable occupant standing on `cell`.
    #[must_use]
    pub fn non_traversable_occupant_at(&self, cell: GridCoord) -> Option<ObjectId> {
        let index = self.cell_index(cell)?;
        self.blocks[index]
            .occupants
            .iter()
            .copied()
            .find(|&id| self.object(id).map_or(false, |occ| !occ.is_traversable()))
    }

    fn summary(&self, id: ObjectId) -> Option<OccupantSummary> {
        let index = self.entry_index(id)?;
        let entry = &self.objects[index];
        Some(OccupantSummary {
            id: entry.id,
            name: entry.occupant.name().to_string(),
            glyph: entry.occupant.glyph(),
            position: entry.position,
            is_character: entry.occupant.is_character(),
            is_player: entry.occupant.is_player(),
            is_traversable: entry.occupant.is_traversable(),
        })
    }

    fn entry_index(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|entry| entry.id == id)
    }

    fn cell_index(&self, cell: GridCoord) -> Option<usize> {
        if cell.x() < self.width && cell.y() < self.height {
            Some((cell.y() as usize) * (self.width as usize) + cell.x() as usize)
        } else {
            None
        }
    }

    fn out_of_bounds(&self, cell: GridCoord) -> FieldError {
        FieldError::OutOfBounds {
            x: cell.x(),
            y: cell.y(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Read-only window over a field, handed to actors resolving a turn.
#[derive(Debug)]
pub struct FieldView<'a> {
    field: &'a Field,
}

impl<'a> FieldView<'a> {
    pub(crate) fn new(field: &'a Field) -> Self {
        Self { field }
    }

    /// Grid width in blocks.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.field.width
    }

    /// Grid height in blocks.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.field.height
    }

    /// Kind of the block at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn block_kind(&self, cell: GridCoord) -> Option<BlockKind> {
        self.field.block_kind(cell)
    }

    /// Shortest walking distance from the connectivity origin to `cell`.
    #[must_use]
    pub fn distance_from_origin(&self, cell: GridCoord) -> Option<u32> {
        self.field.distance_from_origin(cell)
    }

    /// Parent arrow stored on the edge adjacent to `cell` in `direction`.
    #[must_use]
    pub fn arrow_from(&self, cell: GridCoord, direction: Direction) -> Option<Direction> {
        self.field.arrow_from(cell, direction)
    }

    /// Block the object currently stands on.
    #[must_use]
    pub fn position_of(&self, id: ObjectId) -> Option<GridCoord> {
        self.field.position_of(id)
    }

    /// Summary of the tracked player, if one is registered.
    #[must_use]
    pub fn player(&self) -> Option<OccupantSummary> {
        self.field
            .player_id()
            .and_then(|id| self.field.summary(id))
    }

    /// Summaries of the occupants standing on `cell`, bottom to top.
    #[must_use]
    pub fn occupants_at(&self, cell: GridCoord) -> Vec<OccupantSummary> {
        self.field
            .occupants_at(cell)
            .into_iter()
            .filter_map(|id| self.field.summary(id))
            .collect()
    }

    /// True when `cell` is an in-grid floor block with no blocking occupant.
    #[must_use]
    pub fn is_open(&self, cell: GridCoord) -> bool {
        self.field
            .block_kind(cell)
            .map_or(false, BlockKind::is_floor)
            && self.field.non_traversable_occupant_at(cell).is_none()
    }

    /// Renders the grid as rows of glyphs.
    #[must_use]
    pub fn render(&self) -> String {
        self.field.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Actor that cycles through a fixed command list; empty cycles wait.
    #[derive(Debug)]
    struct Scripted {
        agility: i32,
        cycle: Vec<TurnCommand>,
        next: usize,
    }

    impl Scripted {
        fn new(agility: i32, cycle: &[TurnCommand]) -> Box<Self> {
            Box::new(Self {
                agility,
                cycle: cycle.to_vec(),
                next: 0,
            })
        }
    }

    impl Actor for Scripted {
        fn agility(&self) -> i32 {
            self.agility
        }

        fn take_turn(&mut self, _me: ObjectId, _view: &FieldView<'_>) -> TurnCommand {
            if self.cycle.is_empty() {
                return TurnCommand::Wait;
            }
            let command = self.cycle[self.next % self.cycle.len()];
            self.next += 1;
            command
        }
    }

    fn drain_ticks(field: &mut Field, ticks: u32) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            field.tick(&mut events);
        }
        events
    }

    #[test]
    fn set_block_kind_rejects_out_of_grid_cells() {
        let mut field = Field::new(3, 3, 0);
        let result = field.set_block_kind(GridCoord::new(3, 0), BlockKind::Wall);
        assert_eq!(
            result,
            Err(FieldError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 3
            })
        );
    }

    #[test]
    fn walls_update_connectivity_through_the_field() {
        let mut field = Field::new(5, 5, 0);
        field.generate_connectivity(GridCoord::new(0, 0));
        assert_eq!(field.distance_from_origin(GridCoord::new(4, 0)), Some(4));
        // The origin parents its eastern neighbor.
        assert_eq!(
            field.arrow_from(GridCoord::new(1, 0), Direction::West),
            Some(Direction::East)
        );

        field
            .set_block_kind(GridCoord::new(2, 0), BlockKind::Wall)
            .unwrap();
        assert_eq!(field.distance_from_origin(GridCoord::new(4, 0)), Some(6));

        field
            .set_block_kind(GridCoord::new(2, 0), BlockKind::Floor)
            .unwrap();
        assert_eq!(field.distance_from_origin(GridCoord::new(4, 0)), Some(4));
    }

    #[test]
    fn block_changes_before_generation_leave_connectivity_alone() {
        let mut field = Field::new(3, 3, 0);
        field
            .set_block_kind(GridCoord::new(1, 1), BlockKind::Wall)
            .unwrap();
        assert!(!field.is_connectivity_generated());
        assert_eq!(field.distance_from_origin(GridCoord::new(0, 0)), None);
    }

    #[test]
    fn move_refused_by_wall_and_edge() {
        let mut field = Field::new(3, 1, 0);
        field
            .set_block_kind(GridCoord::new(1, 0), BlockKind::Wall)
            .unwrap();
        let id = field
            .add_object_at(
                GridCoord::new(0, 0),
                Occupant::character(
                    "walker",
                    'w',
                    Scripted::new(
                        TURN_COST,
                        &[
                            TurnCommand::Move(Direction::East),
                            TurnCommand::Move(Direction::West),
                        ],
                    ),
                ),
            )
            .unwrap();

        let _ = drain_ticks(&mut field, 4);
        assert_eq!(field.position_of(id), Some(GridCoord::new(0, 0)));
    }

    #[test]
    fn scheduler_grants_turns_proportional_to_agility() {
        let shuttle = [
            TurnCommand::Move(Direction::East),
            TurnCommand::Move(Direction::West),
        ];
        let mut field = Field::new(3, 3, 0);
        let fast = field
            .add_object_at(
                GridCoord::new(0, 0),
                Occupant::character("fast", 'f', Scripted::new(2, &shuttle)),
            )
            .unwrap();
        let slow = field
            .add_object_at(
                GridCoord::new(0, 2),
                Occupant::character("slow", 's', Scripted::new(1, &shuttle)),
            )
            .unwrap();

        let events = drain_ticks(&mut field, 10_000);

        let moves = |id: ObjectId| {
            events
                .iter()
                .filter(|event| matches!(event, FieldEvent::ObjectMoved { id: moved, .. } if *moved == id))
                .count() as i64
        };
        let fast_turns = moves(fast);
        let slow_turns = moves(slow);
        assert!(slow_turns > 0);
        assert!(
            (fast_turns - 2 * slow_turns).abs() <= 2,
            "fast {fast_turns} vs slow {slow_turns}"
        );
    }

    #[test]
    fn player_half_debt_acts_before_equal_monster() {
        let mut field = Field::new(3, 3, 0);
        let player = field
            .add_object_at(
                GridCoord::new(0, 0),
                Occupant::player(
                    "hero",
                    '@',
                    Scripted::new(10, &[TurnCommand::Move(Direction::East)]),
                ),
            )
            .unwrap();
        let monster = field
            .add_object_at(
                GridCoord::new(2, 2),
                Occupant::character(
                    "imp",
                    'i',
                    Scripted::new(10, &[TurnCommand::Move(Direction::West)]),
                ),
            )
            .unwrap();

        // Half debt at agility 10 clears in 50 ticks; the monster needs 100.
        let _ = drain_ticks(&mut field, 51);
        assert_eq!(field.position_of(player), Some(GridCoord::new(1, 0)));
        assert_eq!(field.position_of(monster), Some(GridCoord::new(2, 2)));
    }

    #[test]
    fn quit_command_only_counts_from_the_player() {
        let mut field = Field::new(3, 3, 0);
        let _ = field
            .add_object_at(
                GridCoord::new(0, 0),
                Occupant::character("imp", 'i', Scripted::new(TURN_COST, &[TurnCommand::Quit])),
            )
            .unwrap();
        let _ = drain_ticks(&mut field, 3);
        assert!(!field.quit_requested());

        let _ = field
            .add_object_at(
                GridCoord::new(1, 1),
                Occupant::player("hero", '@', Scripted::new(TURN_COST, &[TurnCommand::Quit])),
            )
            .unwrap();
        let events = drain_ticks(&mut field, 2);
        assert!(field.quit_requested());
        assert!(events.contains(&FieldEvent::QuitRequested));
    }

    #[test]
    fn render_shows_topmost_occupant_over_block_glyphs() {
        let mut field = Field::new(3, 2, 0);
        field
            .set_block_kind(GridCoord::new(2, 1), BlockKind::Wall)
            .unwrap();
        let _ = field
            .add_object_at(GridCoord::new(1, 0), Occupant::stair(true))
            .unwrap();
        let _ = field
            .add_object_at(
                GridCoord::new(1, 0),
                Occupant::player("hero", '@', Scripted::new(1, &[])),
            )
            .unwrap();

        assert_eq!(field.render(), ".@.\n..#\n");
    }
}
