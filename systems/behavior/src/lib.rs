#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Character behaviors: the player shell and the monster chase brain.
//!
//! Both brains implement the world's `Actor` trait. The player delegates its
//! turn to an [`InputProvider`], re-prompting until the command is applicable
//! so a mistyped move never burns the turn. Monsters walk toward the player
//! along the axis with the larger remaining delta and answer contact with an
//! attack.

use std::collections::VecDeque;
use std::fmt;

use mazebound_core::{
    BlockKind, CollisionResponse, Direction, EnemyMold, GridCoord, ItemMold, ObjectId, StatBlock,
    TurnCommand,
};
use mazebound_world::{Actor, FieldView, OccupantSummary};

/// Source of player commands, one per turn.
///
/// A blocking implementation may suspend in `next_command` until the user
/// answers; the scheduler tolerates that because only one turn resolves at a
/// time.
pub trait InputProvider: fmt::Debug {
    /// Produces the next command for the character at `me`.
    fn next_command(&mut self, view: &FieldView<'_>, me: ObjectId) -> TurnCommand;
}

/// Replays a fixed command queue, then waits. Useful for drills and tests.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    queue: VecDeque<TurnCommand>,
}

impl ScriptedInput {
    /// Queue that replays `commands` in order.
    #[must_use]
    pub fn new(commands: &[TurnCommand]) -> Self {
        Self {
            queue: commands.iter().copied().collect(),
        }
    }
}

impl InputProvider for ScriptedInput {
    fn next_command(&mut self, _view: &FieldView<'_>, _me: ObjectId) -> TurnCommand {
        self.queue.pop_front().unwrap_or(TurnCommand::Wait)
    }
}

/// The player character: stats plus an input seam.
#[derive(Debug)]
pub struct PlayerBrain {
    hp: i32,
    max_hp: i32,
    attack: i32,
    agility: i32,
    input: Box<dyn InputProvider>,
}

impl PlayerBrain {
    /// Player with the given stats, driven by `input`.
    #[must_use]
    pub fn new(stats: StatBlock, input: Box<dyn InputProvider>) -> Box<Self> {
        Box::new(Self {
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            attack: stats.attack,
            agility: stats.agility,
            input,
        })
    }
}

impl Actor for PlayerBrain {
    fn agility(&self) -> i32 {
        self.agility
    }

    fn take_turn(&mut self, me: ObjectId, view: &FieldView<'_>) -> TurnCommand {
        loop {
            let command = self.input.next_command(view, me);
            let TurnCommand::Move(direction) = command else {
                return command;
            };
            let Some(position) = view.position_of(me) else {
                return TurnCommand::Wait;
            };
            // A step into a wall or off the grid re-prompts instead of
            // consuming the turn; a step into a character is a valid bump.
            match position.step(direction) {
                Some(cell) if view.block_kind(cell) == Some(BlockKind::Floor) => return command,
                _ => continue,
            }
        }
    }

    fn on_collision(&mut self, _me: ObjectId, other: &OccupantSummary) -> CollisionResponse {
        if other.is_character {
            CollisionResponse::Attack {
                damage: self.attack,
            }
        } else {
            CollisionResponse::Ignore
        }
    }

    fn apply_damage(&mut self, amount: i32) {
        self.hp -= amount;
    }

    fn on_item(&mut self, mold: &ItemMold) {
        self.hp = (self.hp + mold.power).min(self.max_hp);
    }

    fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

/// A monster that closes on the player and attacks on contact.
#[derive(Debug)]
pub struct MonsterBrain {
    hp: i32,
    attack: i32,
    agility: i32,
}

impl MonsterBrain {
    /// Monster with the stats of `mold`.
    #[must_use]
    pub fn from_mold(mold: &EnemyMold) -> Box<Self> {
        Box::new(Self {
            hp: mold.stats.max_hp,
            attack: mold.stats.attack,
            agility: mold.stats.agility,
        })
    }
}

impl Actor for MonsterBrain {
    fn agility(&self) -> i32 {
        self.agility
    }

    fn take_turn(&mut self, me: ObjectId, view: &FieldView<'_>) -> TurnCommand {
        let Some(player) = view.player() else {
            return TurnCommand::Wait;
        };
        let Some(position) = view.position_of(me) else {
            return TurnCommand::Wait;
        };
        chase(position, player.position, view)
    }

    fn on_collision(&mut self, _me: ObjectId, other: &OccupantSummary) -> CollisionResponse {
        if other.is_player {
            CollisionResponse::Attack {
                damage: self.attack,
            }
        } else {
            CollisionResponse::Ignore
        }
    }

    fn apply_damage(&mut self, amount: i32) {
        self.hp -= amount;
    }

    fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

/// One chase step from `from` toward `target`.
///
/// The axis with the larger remaining delta is tried first, horizontal on a
/// tie. A direction is taken when its cell is open or holds the player; when
/// both axes are blocked the monster waits.
fn chase(from: GridCoord, target: GridCoord, view: &FieldView<'_>) -> TurnCommand {
    let dx = i64::from(target.x()) - i64::from(from.x());
    let dy = i64::from(target.y()) - i64::from(from.y());

    let horizontal = if dx > 0 {
        Some(Direction::East)
    } else if dx < 0 {
        Some(Direction::West)
    } else {
        None
    };
    let vertical = if dy > 0 {
        Some(Direction::South)
    } else if dy < 0 {
        Some(Direction::North)
    } else {
        None
    };

    let order = if dx.abs() >= dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };

    for direction in order.into_iter().flatten() {
        if let Some(cell) = from.step(direction) {
            let holds_player = view
                .occupants_at(cell)
                .iter()
                .any(|occupant| occupant.is_player);
            if view.is_open(cell) || holds_player {
                return TurnCommand::Move(direction);
            }
        }
    }
    TurnCommand::Wait
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(max_hp: i32, attack: i32, agility: i32) -> StatBlock {
        StatBlock {
            max_hp,
            attack,
            agility,
        }
    }

    #[test]
    fn player_heals_clamp_at_max_hp() {
        let mut player = PlayerBrain::new(stats(10, 2, 5), Box::new(ScriptedInput::default()));
        player.apply_damage(9);
        assert!(!player.is_dead());

        player.on_item(&ItemMold {
            name: "herb".to_string(),
            glyph: '!',
            power: 100,
        });
        // Clamped back to full: nine more damage still leaves the player up.
        player.apply_damage(9);
        assert!(!player.is_dead());
        player.apply_damage(1);
        assert!(player.is_dead());
    }

    #[test]
    fn player_attacks_characters_and_ignores_the_rest() {
        let mut player = PlayerBrain::new(stats(10, 7, 5), Box::new(ScriptedInput::default()));
        let character = OccupantSummary {
            id: ObjectId::new(1),
            name: "imp".to_string(),
            glyph: 'i',
            position: GridCoord::new(1, 1),
            is_character: true,
            is_player: false,
            is_traversable: false,
        };
        let stair = OccupantSummary {
            id: ObjectId::new(2),
            name: "up stair".to_string(),
            glyph: '>',
            position: GridCoord::new(1, 1),
            is_character: false,
            is_player: false,
            is_traversable: true,
        };
        assert_eq!(
            player.on_collision(ObjectId::new(0), &character),
            CollisionResponse::Attack { damage: 7 }
        );
        assert_eq!(
            player.on_collision(ObjectId::new(0), &stair),
            CollisionResponse::Ignore
        );
    }

    #[test]
    fn monster_takes_stats_from_its_mold() {
        let mold = EnemyMold {
            name: "ogre".to_string(),
            glyph: 'O',
            stats: stats(6, 4, 3),
        };
        let mut monster = MonsterBrain::from_mold(&mold);
        assert_eq!(monster.agility(), 3);

        let player = OccupantSummary {
            id: ObjectId::new(0),
            name: "hero".to_string(),
            glyph: '@',
            position: GridCoord::new(0, 0),
            is_character: true,
            is_player: true,
            is_traversable: false,
        };
        assert_eq!(
            monster.on_collision(ObjectId::new(1), &player),
            CollisionResponse::Attack { damage: 4 }
        );

        monster.apply_damage(5);
        assert!(!monster.is_dead());
        monster.apply_damage(1);
        assert!(monster.is_dead());
    }

    #[test]
    fn monsters_do_not_attack_each_other() {
        let mold = EnemyMold {
            name: "ogre".to_string(),
            glyph: 'O',
            stats: stats(6, 4, 3),
        };
        let mut monster = MonsterBrain::from_mold(&mold);
        let other = OccupantSummary {
            id: ObjectId::new(2),
            name: "imp".to_string(),
            glyph: 'i',
            position: GridCoord::new(0, 0),
            is_character: true,
            is_player: false,
            is_traversable: false,
        };
        assert_eq!(
            monster.on_collision(ObjectId::new(1), &other),
            CollisionResponse::Ignore
        );
    }
}
