//! End-to-end behaviour of a grazing herd: definitions shared through the
//! registry, machines wired into models, messages arriving over the bus and
//! through replication.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use tickmind::builder::{BuildError, DefinitionBuilder, TransitionBuilder};
use tickmind::bus::{Handles, MessageBus, Subscriptions};
use tickmind::compose::{
    Behaviour, BehaviourRegistry, Component, Model, ModelPart, PartLink, StateMachineComponent,
};
use tickmind::core::Message;
use tickmind::machine::{Definition, InstanceConfig};
use tickmind::replication::{encode, republish, WireFormat};
use tickmind::state_enum;

state_enum! {
    enum Grazing {
        Wander,
        Graze,
        Flee,
        Rest,
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
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

    fn suppress_logs(&self) -> bool {
        !matches!(self, Self::Wolf { .. })
    }
}

#[derive(Default)]
struct Sheep {
    hunger: f32,
    fear: f32,
    eaten: u32,
}

fn close_wolf(_sheep: &Sheep, message: &Herd) -> bool {
    matches!(message, Herd::Wolf { distance } if *distance < 10.0)
}

fn bolt(sheep: &mut Sheep) -> bool {
    sheep.fear = 1.0;
    true
}

struct Grazer;

impl Behaviour for Grazer {
    type State = Grazing;
    type Message = Herd;
    type Context = Sheep;

    fn define() -> Result<Definition<Grazing, Herd, Sheep>, BuildError> {
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
                    .when(|sheep: &Sheep| sheep.hunger >= 1.0),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Wander)
                    .to(Grazing::Flee)
                    .on(HerdKind::Wolf)
                    .when_message(close_wolf)
                    .then(bolt),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Graze)
                    .to(Grazing::Graze)
                    .on(HerdKind::Grass)
                    .then(|sheep: &mut Sheep| {
                        sheep.hunger -= 0.5;
                        sheep.eaten += 1;
                        true
                    }),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Graze)
                    .to(Grazing::Wander)
                    .when(|sheep: &Sheep| sheep.hunger <= 0.0),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Graze)
                    .to(Grazing::Flee)
                    .on(HerdKind::Wolf)
                    .when_message(close_wolf)
                    .then(bolt),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Flee)
                    .to(Grazing::Flee)
                    .on(HerdKind::Tick)
                    .then_message(|sheep: &mut Sheep, msg: &Herd| {
                        if let Herd::Tick(delta) = msg {
                            sheep.fear -= delta;
                        }
                        true
                    }),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Flee)
                    .to(Grazing::Rest)
                    .when(|sheep: &Sheep| sheep.fear <= 0.0),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(Grazing::Rest)
                    .to(Grazing::Wander)
                    .on(HerdKind::Tick),
            )?
            .build_checked()
    }
}

type Brain = StateMachineComponent<Grazing, Herd, Sheep>;

/// A sheep model: one part carrying the sheep's data, whose brain runs
/// against that same data.
fn spawn_sheep(registry: &BehaviourRegistry, bus: &Rc<MessageBus>) -> (Model, Rc<Brain>) {
    let model = Model::with_bus(Rc::clone(bus));
    let part = Rc::new(ModelPart::new(Sheep::default()));
    let sheep = part.data::<Sheep>().unwrap();

    let config = InstanceConfig::from_json(r#"{ "logging": true, "label": "dolly" }"#).unwrap();
    let brain = registry.spawn::<Grazer>(sheep, config).unwrap();
    part.add_component(brain.clone());
    model.add_part(part).unwrap();
    model.ready().unwrap();
    (model, brain)
}

#[test]
fn definition_passes_its_own_lints() {
    assert!(Grazer::define().is_ok());
}

#[test]
fn sheep_wanders_grazes_and_flees() {
    let registry = BehaviourRegistry::new();
    let bus = Rc::new(MessageBus::new());
    let (model, brain) = spawn_sheep(&registry, &bus);
    let sheep = model.data::<Sheep>().unwrap();

    model.tick(0.6);
    assert_eq!(brain.current_state(), Grazing::Wander);
    model.tick(0.6);
    assert_eq!(brain.current_state(), Grazing::Graze);

    for _ in 0..3 {
        assert_eq!(model.publish(&Herd::Grass), 1);
    }
    model.tick(0.0);
    assert_eq!(brain.current_state(), Grazing::Wander);
    assert_eq!(sheep.borrow().eaten, 3);

    model.publish(&Herd::Wolf { distance: 40.0 });
    model.tick(0.1);
    assert_eq!(brain.current_state(), Grazing::Wander);

    model.publish(&Herd::Wolf { distance: 4.0 });
    model.tick(0.5);
    assert_eq!(brain.current_state(), Grazing::Flee);
    assert_eq!(sheep.borrow().fear, 0.5);

    model.tick(0.6);
    assert_eq!(brain.current_state(), Grazing::Rest);
    model.tick(0.1);
    assert_eq!(brain.current_state(), Grazing::Wander);
}

#[test]
fn one_wolf_scares_the_whole_herd_on_a_shared_bus() {
    let registry = BehaviourRegistry::new();
    let bus = Rc::new(MessageBus::new());
    let herd: Vec<_> = (0..3).map(|_| spawn_sheep(&registry, &bus)).collect();

    assert_eq!(registry.len(), 1);
    assert_eq!(bus.publish(&Herd::Wolf { distance: 1.0 }), 3);

    for (model, brain) in &herd {
        model.tick(0.1);
        assert_eq!(brain.current_state(), Grazing::Flee);
    }
}

#[test]
fn replicated_messages_drive_machines_like_local_ones() {
    let registry = BehaviourRegistry::new();
    let bus = Rc::new(MessageBus::new());
    let (model, brain) = spawn_sheep(&registry, &bus);

    let bytes = encode(&Herd::Wolf { distance: 2.0 }, WireFormat::Binary).unwrap();
    assert_eq!(republish::<Herd>(&bus, &bytes, WireFormat::Binary).unwrap(), 1);

    model.tick(0.2);
    assert_eq!(brain.current_state(), Grazing::Flee);
}

#[test]
fn detached_parts_stop_hearing_the_bus() {
    let registry = BehaviourRegistry::new();
    let bus = Rc::new(MessageBus::new());
    let (model, brain) = spawn_sheep(&registry, &bus);

    assert!(model.remove_part::<Sheep>());
    assert_eq!(bus.publish(&Herd::Wolf { distance: 1.0 }), 0);
    assert!(brain.link().model().is_none());
    assert_eq!(brain.mailbox().pending(), 0);
}

/// Raises the alarm a few ticks in, before the brains of the same part run.
struct Lookout {
    link: PartLink,
    ticks: Cell<u32>,
    raised: Cell<bool>,
}

impl Component for Lookout {
    fn link(&self) -> &PartLink {
        &self.link
    }

    fn tick(&self, _delta: f32) {
        self.ticks.set(self.ticks.get() + 1);
        if self.ticks.get() == 2 {
            if let Some(model) = self.link.model() {
                model.publish(&Herd::Wolf { distance: 3.0 });
                self.raised.set(true);
            }
        }
    }

    fn describe(&self) -> Option<String> {
        Some(format!("lookout after {} ticks", self.ticks.get()))
    }
}

#[test]
fn components_tick_in_order_and_see_each_others_messages() {
    let registry = BehaviourRegistry::new();
    let bus = Rc::new(MessageBus::new());
    let model = Model::with_bus(Rc::clone(&bus));

    let part = Rc::new(ModelPart::new(Sheep::default()));
    let lookout = Rc::new(Lookout {
        link: PartLink::new(),
        ticks: Cell::new(0),
        raised: Cell::new(false),
    });
    part.add_component(lookout.clone());
    let brain = registry
        .spawn::<Grazer>(part.data::<Sheep>().unwrap(), InstanceConfig::default())
        .unwrap();
    part.add_component(brain.clone());
    model.add_part(part).unwrap();

    model.tick(0.1);
    assert_eq!(brain.current_state(), Grazing::Wander);
    model.tick(0.1);
    assert!(lookout.raised.get());
    assert_eq!(brain.current_state(), Grazing::Flee);

    assert_eq!(
        model.describe_states(),
        vec![
            "[Sheep] lookout after 2 ticks".to_string(),
            "[Sheep] grazer: Flee".to_string(),
        ]
    );
}

#[test]
fn ready_hooks_can_grow_the_model() {
    struct Bell {
        rung: Rc<RefCell<u32>>,
    }

    let model = Model::new();
    let rung = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&rung);
    let sheep = ModelPart::new(Sheep::default()).on_ready(move |model, _part| {
        model
            .add_part(Rc::new(ModelPart::new(Bell {
                rung: Rc::clone(&counter),
            })))
            .unwrap();
    });
    model.add_part(Rc::new(sheep)).unwrap();

    model.ready().unwrap();
    let bell = model.data::<Bell>().unwrap();
    *bell.borrow().rung.borrow_mut() += 1;
    assert_eq!(*rung.borrow(), 1);
    assert_eq!(model.parts().len(), 2);
}

#[test]
fn shared_definition_is_reused_across_spawns() {
    let registry = BehaviourRegistry::new();
    let first: Arc<Definition<Grazing, Herd, Sheep>> = registry.definition::<Grazer>().unwrap();
    let bus = Rc::new(MessageBus::new());
    let (_model, brain) = spawn_sheep(&registry, &bus);

    assert!(brain.with_instance(|instance| Arc::ptr_eq(instance.definition(), &first)));
    assert_eq!(brain.with_instance(|instance| instance.config().label.clone()), Some("dolly".to_string()));
}

state_enum! {
    enum Nerves {
        Steady,
        Jumpy,
    }
}

#[derive(Clone, Debug)]
enum Scare {
    Spook,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum ScareKind {
    Spook,
}

impl Message for Scare {
    type Kind = ScareKind;

    fn kind(&self) -> ScareKind {
        ScareKind::Spook
    }
}

#[derive(Clone)]
struct Bleat;

struct Ewe {
    fear: u32,
    bus: Rc<MessageBus>,
}

/// Repeats every bleat with the fear level it reads from its part.
struct Voice {
    link: PartLink,
    heard: RefCell<Vec<u32>>,
}

impl Handles<Bleat> for Voice {
    fn handle_message(&self, _message: &Bleat) {
        if let Some(ewe) = self.link.part().and_then(|part| part.data::<Ewe>()) {
            self.heard.borrow_mut().push(ewe.borrow().fear);
        }
    }
}

impl Component for Voice {
    fn link(&self) -> &PartLink {
        &self.link
    }

    fn message_handlers(self: Rc<Self>) -> Subscriptions {
        Subscriptions::of(&self).handles::<Bleat>().into()
    }
}

#[test]
fn actions_may_publish_to_siblings_reading_the_same_data() {
    let bus = Rc::new(MessageBus::new());
    let model = Model::with_bus(Rc::clone(&bus));
    let part = Rc::new(ModelPart::new(Ewe {
        fear: 0,
        bus: Rc::clone(&bus),
    }));

    let definition: Definition<Nerves, Scare, Ewe> = DefinitionBuilder::new()
        .entry(Nerves::Steady)
        .transition(
            TransitionBuilder::new()
                .from(Nerves::Steady)
                .to(Nerves::Jumpy)
                .on(ScareKind::Spook)
                .then(|ewe: &mut Ewe| {
                    ewe.fear += 1;
                    ewe.bus.publish(&Bleat);
                    true
                }),
        )
        .unwrap()
        .build()
        .unwrap();
    let nerves = StateMachineComponent::spawn(
        &Arc::new(definition),
        part.data::<Ewe>().unwrap(),
        InstanceConfig::default(),
    );
    let voice = Rc::new(Voice {
        link: PartLink::new(),
        heard: RefCell::new(Vec::new()),
    });
    part.add_component(nerves.clone());
    part.add_component(voice.clone());
    model.add_part(part).unwrap();

    assert_eq!(model.publish(&Scare::Spook), 1);
    model.tick(0.1);

    assert_eq!(nerves.current_state(), Nerves::Jumpy);
    assert_eq!(*voice.heard.borrow(), vec![1]);
    assert_eq!(bus.deferred_count(), 0);
}
