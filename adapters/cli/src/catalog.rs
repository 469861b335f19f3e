//! Built-in enemy and item molds for the crawl.

use mazebound_core::{EnemyMold, ItemMold, StatBlock};

pub(crate) fn enemy_molds() -> Vec<EnemyMold> {
    vec![
        EnemyMold {
            name: "slime".to_string(),
            glyph: 's',
            stats: StatBlock {
                max_hp: 6,
                attack: 2,
                agility: 4,
            },
        },
        EnemyMold {
            name: "imp".to_string(),
            glyph: 'i',
            stats: StatBlock {
                max_hp: 10,
                attack: 3,
                agility: 8,
            },
        },
        EnemyMold {
            name: "ogre".to_string(),
            glyph: 'O',
            stats: StatBlock {
                max_hp: 18,
                attack: 6,
                agility: 3,
            },
        },
    ]
}

pub(crate) fn item_molds() -> Vec<ItemMold> {
    vec![
        ItemMold {
            name: "herb".to_string(),
            glyph: '!',
            power: 8,
        },
        ItemMold {
            name: "elixir".to_string(),
            glyph: '?',
            power: 30,
        },
    ]
}
