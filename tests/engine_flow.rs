//=========================================================================
// Engine Flow
//
// Drives a small scene through the engine: a turret spawns pooled
// bullets every frame, a sweeper reclaims them when their lifetime runs
// out, and a guard brain reacts to the shots through the event bus.
//
//=========================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use phoenix_engine::prelude::*;

//=== Fixtures ============================================================

#[derive(Default)]
struct Bullet {
    speed: f32,
    fired: u32,
}

impl Poolable for Bullet {
    fn life_time(&self) -> f32 {
        0.6
    }

    fn on_spawn_complete(&mut self) {
        self.fired += 1;
    }
}

struct Turret {
    spawner: SpawnManager<Bullet>,
    shots: Arc<AtomicUsize>,
}

impl System for Turret {
    fn name(&self) -> &str {
        "turret"
    }

    fn update(&mut self, context: &mut GlobalContext) {
        let now = context.now();
        match self.spawner.spawn(now, |bullet| bullet.speed = 12.0) {
            Some(_) => {
                self.shots.fetch_add(1, Ordering::SeqCst);
            }
            None => context.events.queue_event(GameEvent::new("turret_dry")),
        }
    }
}

struct Guard {
    shots: Arc<AtomicUsize>,
    alerted_at: Option<u64>,
}

struct Watch;
impl AiAction<Guard> for Watch {
    fn perform_action(&mut self, _agent: &mut Guard, _status: &BrainStatus) {}
}

struct Raise;
impl AiAction<Guard> for Raise {
    fn perform_action(&mut self, agent: &mut Guard, status: &BrainStatus) {
        agent.alerted_at.get_or_insert(status.time.frame);
    }
}

struct HeardShots;
impl AiDecision<Guard> for HeardShots {
    fn decide(&mut self, agent: &Guard, _status: &BrainStatus) -> bool {
        agent.shots.load(Ordering::SeqCst) >= 2
    }
}

fn guard_brain(events: Arc<EventBus>) -> AiBrain<Guard> {
    let mut registry = BehaviorRegistry::new();
    registry.register_action("watch", || Watch);
    registry.register_action("raise", || Raise);
    registry.register_decision("heard_shots", || HeardShots);

    let json = r#"{
        "states": [
            { "name": "Patrol", "actions": ["watch"],
              "transitions": [ { "decision": "heard_shots", "true_state": "Alert" } ] },
            { "name": "Alert", "actions": ["raise"] }
        ]
    }"#;
    registry.build_brain_from_json("guard", json, Some(events)).unwrap()
}

//=== Tests ===============================================================

#[test]
fn turret_sweeper_and_guard_cooperate() {
    let pooler = SimpleObjectPooler::new(
        "turret",
        FnPrototype::new("bullet", Bullet::default),
        SimplePoolConfig {
            pool_size: 2,
            can_expand: false,
            ..Default::default()
        },
    );
    let spawner = SpawnManager::new(pooler);
    let pools = spawner.pooler().pools();
    let bullets = Arc::clone(&pools[0]);
    let shots = Arc::new(AtomicUsize::new(0));

    // 4 TPS keeps every clock value exact in binary
    let engine = EngineBuilder::new().with_tps(4.0).build();
    let events = engine.events();

    let dry = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&dry);
    let _dry_listener = events.subscribe(move |e: &GameEvent| sink.lock().push(e.name.clone()));

    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    let _change_listener = events.subscribe(move |e: &AiStateChangeEvent| {
        sink.lock().push(format!("{} -> {}", e.from, e.to));
    });

    let guard = Agent::new(
        "guard",
        guard_brain(Arc::clone(&events)),
        Guard {
            shots: Arc::clone(&shots),
            alerted_at: None,
        },
    );
    let turret = Turret {
        spawner,
        shots: Arc::clone(&shots),
    };
    let sweeper = LifetimeSweeper::new().watch_all(&pools);

    let mut engine = engine.init(|systems, _| {
        systems.register_system(sweeper);
        systems.register_system(turret);
        systems.register_system(guard);
    });

    // t=0.25 A, t=0.5 B, t=0.75 dry, t=1.0 A expired and reused,
    // t=1.25 B expired and reused
    engine.run_ticks(5);

    assert_eq!(shots.load(Ordering::SeqCst), 4);
    assert_eq!(*dry.lock(), vec!["turret_dry"]);
    assert_eq!(*changes.lock(), vec!["Patrol -> Alert"]);

    let pool = bullets.lock();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.active_count(), 2);
    for bullet in pool.iter() {
        assert_eq!(bullet.value().fired, 2);
        assert_eq!(bullet.value().speed, 12.0);
    }
}

#[test]
fn scheduled_tasks_and_state_machines_share_the_bus() {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    enum Door {
        #[default]
        Closed,
        Open,
    }
    impl StateKey for Door {}

    let mut engine = EngineBuilder::new().with_tps(10.0).build();
    let events = engine.events();
    let opened = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&opened);
    let _listener = events.subscribe(move |e: &StateChangeEvent<Door>| {
        if e.new_state == Door::Open {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let door = Arc::new(Mutex::new(StateMachine::<Door>::new("door", Arc::clone(&events), true)));
    let handle = Arc::clone(&door);
    let now = engine.context().now();
    engine.context_mut().scheduler.schedule_in(now, 0.25, move |_| {
        handle.lock().change_state(Door::Open);
    });

    engine.run_ticks(2);
    assert_eq!(opened.load(Ordering::SeqCst), 0);

    engine.run_ticks(1);
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(door.lock().current_state(), Door::Open);
    assert_eq!(door.lock().previous_state(), Door::Closed);
}
