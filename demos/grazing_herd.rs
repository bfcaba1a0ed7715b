//! Grazing Herd
//!
//! A small herd of sheep sharing one behaviour definition and one bus.
//!
//! Key concepts:
//! - One definition shared by every sheep through the registry
//! - Per-sheep data living on a model part, used as the machine's context
//! - Messages fanned out over a shared bus, resolved on the next tick
//! - A wolf sighting replicated from "another process" as bytes
//!
//! Run with: cargo run --example grazing_herd

use std::rc::Rc;
use tickmind::builder::{BuildError, DefinitionBuilder, TransitionBuilder};
use tickmind::bus::MessageBus;
use tickmind::compose::{Behaviour, BehaviourRegistry, Model, ModelPart, StateMachineComponent};
use tickmind::core::Message;
use tickmind::machine::{Definition, InstanceConfig};
use tickmind::replication::{encode, republish, WireFormat};
use tickmind::state_enum;

state_enum! {
    enum Grazing {
        Wander,
        Graze,
        Flee,
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
enum Herd {
    Tick(f32),
    Wolf { distance: f32 },
    Grass,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum HerdKind {
    Tick,
    Wolf,
    Grass,
}

impl Message for Herd {
    type Kind = HerdKind;

    fn kind(&self) -> HerdKind {
        match self {
            Self::Tick(_) => HerdKind::Tick,
            Self::Wolf { .. } => HerdKind::Wolf,
            Self::Grass => HerdKind::Grass,
        }
    }
}

#[derive(Default)]
struct Sheep {
    hunger: f32,
    panic: f32,
}

struct Grazer;

impl Behaviour for Grazer {
    type State = Grazing;
    type Message = Herd;
    type Context = Sheep;

    fn define() -> Result<Definition<Grazing, Herd, Sheep>, BuildError> {
        let hungry = |sheep: &Sheep| sheep.hunger >= 1.0;
        let calm = |sheep: &Sheep| sheep.panic <= 0.0;

        DefinitionBuilder::new()
            .entry(Grazing::Wander)
            .name("grazer")
            .tick_message(Herd::Tick)
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Wander)
                    .to(Grazing::Wander)
                    .on(HerdKind::Tick)
                    .then_message(|sheep: &mut Sheep, msg: &Herd| {
                        if let Herd::Tick(delta) = msg {
                            sheep.hunger += delta;
                        }
                        true
                    }),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Wander)
                    .to(Grazing::Graze)
                    .when(hungry),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Graze)
                    .to(Grazing::Wander)
                    .on(HerdKind::Grass)
                    .then(|sheep: &mut Sheep| {
                        sheep.hunger = 0.0;
                        true
                    }),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Wander)
                    .to(Grazing::Flee)
                    .on(HerdKind::Wolf)
                    .then(|sheep: &mut Sheep| {
                        sheep.panic = 1.0;
                        true
                    }),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Graze)
                    .to(Grazing::Flee)
                    .on(HerdKind::Wolf)
                    .then(|sheep: &mut Sheep| {
                        sheep.panic = 1.0;
                        true
                    }),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Flee)
                    .to(Grazing::Flee)
                    .on(HerdKind::Tick)
                    .then_message(|sheep: &mut Sheep, msg: &Herd| {
                        if let Herd::Tick(delta) = msg {
                            sheep.panic -= delta;
                        }
                        true
                    }),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Flee)
                    .to(Grazing::Wander)
                    .when(calm),
            )?
            .build_checked()
    }
}

type Brain = StateMachineComponent<Grazing, Herd, Sheep>;

fn spawn(
    registry: &BehaviourRegistry,
    bus: &Rc<MessageBus>,
    name: &str,
    hunger: f32,
) -> Result<(Model, Rc<Brain>), Box<dyn std::error::Error>> {
    let model = Model::with_bus(Rc::clone(bus));
    let part = Rc::new(ModelPart::new(Sheep {
        hunger,
        panic: 0.0,
    }));
    let data = part
        .data::<Sheep>()
        .ok_or("sheep part carries no sheep")?;

    let brain = registry.spawn::<Grazer>(data, InstanceConfig::default().label(name))?;
    part.add_component(brain.clone());
    model.add_part(part)?;
    model.ready()?;
    Ok((model, brain))
}

fn report(herd: &[(&str, Model, Rc<Brain>)]) {
    for (name, _, brain) in herd {
        println!("  {:<6} {:?}", name, brain.current_state());
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Grazing Herd ===\n");

    let registry = BehaviourRegistry::new();
    let bus = Rc::new(MessageBus::new());

    let mut herd = Vec::new();
    for (name, hunger) in [("dolly", 0.0), ("shaun", 0.5), ("timmy", 0.9)] {
        let (model, brain) = spawn(&registry, &bus, name, hunger)?;
        herd.push((name, model, brain));
    }
    println!("{} sheep share {} definition(s)\n", herd.len(), registry.len());

    println!("After one tick of 0.3:");
    for (_, model, _) in &herd {
        model.tick(0.3);
    }
    report(&herd);

    println!("Grass falls on the field:");
    bus.publish(&Herd::Grass);
    for (_, model, _) in &herd {
        model.tick(0.0);
    }
    report(&herd);

    println!("A wolf is spotted by a neighbouring server:");
    let bytes = encode(&Herd::Wolf { distance: 5.0 }, WireFormat::Binary)?;
    let heard = republish::<Herd>(&bus, &bytes, WireFormat::Binary)?;
    println!("  {} byte(s) on the wire, heard by {} sheep", bytes.len(), heard);
    for (_, model, _) in &herd {
        model.tick(0.4);
    }
    report(&herd);

    println!("The panic wears off:");
    for _ in 0..2 {
        for (_, model, _) in &herd {
            model.tick(0.4);
        }
    }
    report(&herd);

    for (_, model, _) in &herd {
        for line in model.describe_states() {
            println!("  {}", line);
        }
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
