#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Interactive terminal crawl over carved maze floors.
//!
//! Each floor is carved from a seed derived from the base seed and the floor
//! number, populated from the mold catalog, and ticked until the player
//! quits, dies, or reaches the upward stair.

mod catalog;

use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use mazebound_core::{Direction, ObjectId, StatBlock, TurnCommand};
use mazebound_system_behavior::{InputProvider, MonsterBrain, PlayerBrain};
use mazebound_system_carving::{carve, place_object_random, CarveError, Config};
use mazebound_world::{FieldEvent, FieldView, Occupant};

const PLAYER_STATS: StatBlock = StatBlock {
    max_hp: 30,
    attack: 5,
    agility: 8,
};

#[derive(Debug, Parser)]
#[command(name = "mazebound", about = "Turn-based crawl through carved maze floors")]
struct Args {
    /// Floor width in blocks.
    #[arg(long, default_value_t = 15)]
    width: u32,
    /// Floor height in blocks.
    #[arg(long, default_value_t = 9)]
    height: u32,
    /// Base seed; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Monsters placed per floor.
    #[arg(long, default_value_t = 6)]
    enemies: u32,
    /// Items placed per floor.
    #[arg(long, default_value_t = 3)]
    items: u32,
}

/// Reads one command per turn from standard input.
#[derive(Debug)]
struct StdinInput;

impl InputProvider for StdinInput {
    fn next_command(&mut self, view: &FieldView<'_>, _me: ObjectId) -> TurnCommand {
        println!();
        print!("{}", view.render());
        loop {
            print!("move [w/a/s/d], wait [x], quit [q] > ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => return TurnCommand::Quit,
                Ok(_) => {}
            }
            match line.trim() {
                "w" => return TurnCommand::Move(Direction::North),
                "a" => return TurnCommand::Move(Direction::West),
                "s" => return TurnCommand::Move(Direction::South),
                "d" => return TurnCommand::Move(Direction::East),
                "x" | "" => return TurnCommand::Wait,
                "q" => return TurnCommand::Quit,
                other => println!("unknown command {other:?}"),
            }
        }
    }
}

enum FloorOutcome {
    Advance(u32),
    Died,
    Quit,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let base_seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    println!("base seed {base_seed}");

    let mut floor = 1;
    loop {
        match play_floor(&args, base_seed, floor)? {
            FloorOutcome::Advance(next) => {
                floor = next;
            }
            FloorOutcome::Died => {
                println!("You fall on floor {floor}.");
                break;
            }
            FloorOutcome::Quit => {
                println!("Left the maze on floor {floor}.");
                break;
            }
        }
    }
    Ok(())
}

fn play_floor(args: &Args, base_seed: u64, floor: u32) -> Result<FloorOutcome> {
    let config = Config::new(
        args.width,
        args.height,
        floor,
        base_seed.wrapping_add(u64::from(floor)),
    );
    let mut maze = carve(&config)?;
    // Separate stream so populating never disturbs the carve layout.
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ 0x9e37_79b9_7f4a_7c15);

    let enemy_molds = catalog::enemy_molds();
    for _ in 0..args.enemies {
        let mold = &enemy_molds[rng.gen_range(0..enemy_molds.len())];
        let occupant = Occupant::character(
            mold.name.clone(),
            mold.glyph,
            MonsterBrain::from_mold(mold),
        );
        match place_object_random(&mut maze.field, &mut rng, occupant) {
            Ok(_) => {}
            Err(CarveError::NoFreeCell) => break,
            Err(error) => return Err(error.into()),
        }
    }
    let item_molds = catalog::item_molds();
    for _ in 0..args.items {
        let mold = item_molds[rng.gen_range(0..item_molds.len())].clone();
        match place_object_random(&mut maze.field, &mut rng, Occupant::item(mold)) {
            Ok(_) => {}
            Err(CarveError::NoFreeCell) => break,
            Err(error) => return Err(error.into()),
        }
    }

    let player = maze.field.add_object_at(
        maze.entry,
        Occupant::player("hero", '@', PlayerBrain::new(PLAYER_STATS, Box::new(StdinInput))),
    )?;

    let names: HashMap<ObjectId, String> = maze
        .field
        .objects()
        .map(|(id, _, occupant)| (id, occupant.name().to_string()))
        .collect();

    println!("=== floor {floor} ===");
    let mut events = Vec::new();
    loop {
        events.clear();
        maze.field.tick(&mut events);
        for event in &events {
            narrate(event, &names, player);
        }
        if maze.field.quit_requested() {
            return Ok(FloorOutcome::Quit);
        }
        if maze.field.player_id().is_none() {
            return Ok(FloorOutcome::Died);
        }
        if let Some(next) = maze.field.take_floor_transition() {
            return Ok(FloorOutcome::Advance(next));
        }
    }
}

fn narrate(event: &FieldEvent, names: &HashMap<ObjectId, String>, player: ObjectId) {
    let name = |id: &ObjectId| {
        names
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("object {}", id.get()))
    };
    match event {
        FieldEvent::DamageDealt {
            attacker,
            target,
            damage,
        } => {
            println!("{} hits {} for {damage}", name(attacker), name(target));
        }
        FieldEvent::ObjectTrashed { id } => {
            if *id == player {
                println!("You are slain.");
            } else {
                println!("{} is destroyed", name(id));
            }
        }
        FieldEvent::ItemConsumed { item, by } => {
            println!("{} picks up the {}", name(by), name(item));
        }
        FieldEvent::FloorExitReached { next_floor } => {
            println!("Stairs up! Climbing to floor {next_floor}.");
        }
        FieldEvent::TimeAdvanced { .. }
        | FieldEvent::ObjectMoved { .. }
        | FieldEvent::QuitRequested => {}
    }
}
