//! Occupant data model and the behavior seam consumed by the scheduler.

use std::fmt;

use mazebound_core::{CollisionResponse, GridCoord, ItemMold, ObjectId, TurnCommand};

use crate::{FieldView, TURN_COST};

/// Behavior handler supplied by the character layer for each character
/// occupant.
///
/// The scheduler drives characters exclusively through this trait: it reads
/// `agility` and `is_dead`, invokes `take_turn` when the readiness timer
/// expires, and routes collision contacts, damage, and item pickups to the
/// remaining hooks. Implementations live outside the world crate; the engine
/// never assumes anything about a character beyond this surface.
pub trait Actor: fmt::Debug {
    /// Amount subtracted from the readiness timer on every tick spent waiting.
    fn agility(&self) -> i32;

    /// Resolves one turn. The view is read-only; the returned command is
    /// executed by the field. A blocking input source may suspend here.
    fn take_turn(&mut self, me: ObjectId, view: &FieldView<'_>) -> TurnCommand;

    /// Reaction to sharing a block with (or bumping into) another occupant.
    fn on_collision(&mut self, _me: ObjectId, _other: &OccupantSummary) -> CollisionResponse {
        CollisionResponse::Ignore
    }

    /// Applies incoming damage from an `Attack` response.
    fn apply_damage(&mut self, _amount: i32) {}

    /// Receives an item the character stepped on.
    fn on_item(&mut self, _mold: &ItemMold) {}

    /// Reports whether the character should be trashed by the scheduler.
    fn is_dead(&self) -> bool {
        false
    }
}

/// An object registered on a field: a character, an item, or a stair.
#[derive(Debug)]
pub struct Occupant {
    name: String,
    glyph: char,
    kind: OccupantKind,
}

#[derive(Debug)]
pub(crate) enum OccupantKind {
    Character {
        actor: Option<Box<dyn Actor>>,
        time_wait: i32,
        is_player: bool,
    },
    Item {
        mold: ItemMold,
    },
    Stair {
        upward: bool,
    },
}

impl Occupant {
    /// Creates a character occupant driven by the provided actor.
    #[must_use]
    pub fn character(name: impl Into<String>, glyph: char, actor: Box<dyn Actor>) -> Self {
        Self {
            name: name.into(),
            glyph,
            kind: OccupantKind::Character {
                actor: Some(actor),
                time_wait: TURN_COST,
                is_player: false,
            },
        }
    }

    /// Creates the tracked player character.
    ///
    /// The player starts with half the usual readiness debt so it acts before
    /// equally agile monsters on a fresh floor.
    #[must_use]
    pub fn player(name: impl Into<String>, glyph: char, actor: Box<dyn Actor>) -> Self {
        Self {
            name: name.into(),
            glyph,
            kind: OccupantKind::Character {
                actor: Some(actor),
                time_wait: TURN_COST / 2,
                is_player: true,
            },
        }
    }

    /// Creates an item occupant from its mold.
    #[must_use]
    pub fn item(mold: ItemMold) -> Self {
        Self {
            name: mold.name.clone(),
            glyph: mold.glyph,
            kind: OccupantKind::Item { mold },
        }
    }

    /// Creates a stair occupant. Upward stairs lead to the next floor.
    #[must_use]
    pub fn stair(upward: bool) -> Self {
        Self {
            name: if upward { "up stair" } else { "down stair" }.to_string(),
            glyph: if upward { '>' } else { '<' },
            kind: OccupantKind::Stair { upward },
        }
    }

    /// Name shown in reports.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Character rendered on the grid dump.
    #[must_use]
    pub const fn glyph(&self) -> char {
        self.glyph
    }

    /// Reports whether other occupants may move through this one.
    ///
    /// Items and stairs never block movement; characters always do.
    #[must_use]
    pub const fn is_traversable(&self) -> bool {
        !matches!(self.kind, OccupantKind::Character { .. })
    }

    /// Reports whether this occupant is a character.
    #[must_use]
    pub const fn is_character(&self) -> bool {
        matches!(self.kind, OccupantKind::Character { .. })
    }

    /// Reports whether this occupant is the tracked player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(
            self.kind,
            OccupantKind::Character {
                is_player: true,
                ..
            }
        )
    }

    /// Current readiness timer, if this occupant is a character.
    #[must_use]
    pub fn time_wait(&self) -> Option<i32> {
        match &self.kind {
            OccupantKind::Character { time_wait, .. } => Some(*time_wait),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &OccupantKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut OccupantKind {
        &mut self.kind
    }
}

/// Immutable description of an occupant handed to collision handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupantSummary {
    /// Identifier of the described occupant.
    pub id: ObjectId,
    /// Name shown in reports.
    pub name: String,
    /// Character rendered on the grid dump.
    pub glyph: char,
    /// Block the occupant currently stands on.
    pub position: GridCoord,
    /// Whether the occupant is a character.
    pub is_character: bool,
    /// Whether the occupant is the tracked player.
    pub is_player: bool,
    /// Whether other occupants may move through this one.
    pub is_traversable: bool,
}
