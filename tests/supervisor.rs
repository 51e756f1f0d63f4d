use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use orbitvisor::engine::headless::{HeadlessWorld, ManualClock, RecordingObserver};
use orbitvisor::engine::{EventSource, InputEvent, keys};
use orbitvisor::{
    Config, Event, EventKind, ObserverController, OverflowPolicy, RuntimeError, Subscribe,
    Supervisor, TaskError,
};

/// Simulated time advanced per observer poll. A power of two keeps every
/// clock reading exact, so deadlines never drift.
const TICK: f64 = 1.0 / 1024.0;

/// Event source that also drives simulated time: every poll moves the clock
/// forward by one [`TICK`] and hands out the next scripted event once it is due.
struct TimedEvents {
    clock: ManualClock,
    ticks: u32,
    script: VecDeque<(f64, InputEvent)>,
    cancel_at: Option<(f64, CancellationToken)>,
}

impl TimedEvents {
    fn new(clock: ManualClock, script: Vec<(f64, InputEvent)>) -> Self {
        Self {
            clock,
            ticks: 0,
            script: script.into(),
            cancel_at: None,
        }
    }
}

impl EventSource for TimedEvents {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.ticks += 1;
        let now = f64::from(self.ticks) * TICK;
        self.clock.set(now);
        if let Some((at, token)) = &self.cancel_at {
            if now >= *at {
                token.cancel();
            }
        }
        match self.script.front() {
            Some((at, _)) if *at <= now => self.script.pop_front().map(|(_, ev)| ev),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Recorder(RefCell<Vec<Event>>);

impl Recorder {
    fn count(&self, kind: EventKind) -> usize {
        self.0.borrow().iter().filter(|e| e.kind == kind).count()
    }
}

impl Subscribe for Recorder {
    fn on_event(&self, event: &Event) {
        self.0.borrow_mut().push(event.clone());
    }
}

struct Harness {
    sup: Supervisor,
    world: Rc<RefCell<HeadlessWorld>>,
    observer: RecordingObserver,
    recorder: Rc<Recorder>,
}

fn harness(cfg: Config, events: impl FnOnce(&Supervisor, ManualClock) -> TimedEvents) -> Harness {
    let world = HeadlessWorld::shared();
    let clock = ManualClock::new(0.0);
    let recorder = Rc::new(Recorder::default());
    let observer = RecordingObserver::new();

    let mut sup = Supervisor::builder(cfg.clone(), world.clone())
        .with_subscribers(vec![recorder.clone() as Rc<dyn Subscribe>])
        .build();
    let source = events(&sup, clock.clone());

    let controller = ObserverController::new(cfg.observer.clone(), Box::new(observer.clone()));
    let spawner = sup.spawn_policy(cfg.spawn.clone(), Rc::new(clock));
    sup.register(controller.into_task(Box::new(source)));
    sup.register(spawner.into_task());

    Harness {
        sup,
        world,
        observer,
        recorder,
    }
}

fn seeded() -> Config {
    let mut cfg = Config::default();
    cfg.spawn.seed = Some(3634);
    cfg
}

#[test]
fn full_run_spawns_steers_and_tears_down() {
    let script = vec![
        (1.0, InputEvent::key_down(keys::DIGIT_1 + 6)),
        (2.0, InputEvent::MouseMove { dx: 10.0, dy: -5.0 }),
        (3.0, InputEvent::key_down(keys::C)),
        (4.0, InputEvent::key_up(keys::DIGIT_1)),
        (30.0, InputEvent::Exit),
        (31.0, InputEvent::key_down(keys::DIGIT_1)),
    ];
    let mut h = harness(seeded(), |_, clock| TimedEvents::new(clock, script));

    let report = h.sup.run().expect("clean run");

    // a spawn lands one tick past each 0.5 s deadline; the observer exits
    // on the 30.0 s poll, before the spawner samples that reading
    assert_eq!(h.recorder.count(EventKind::ShapeSpawned), 59);
    assert_eq!(h.recorder.count(EventKind::ShapeEvicted), 9);
    assert_eq!(report.shapes_released, 50);
    assert_eq!(report.finished, 1, "observer finishes");
    assert_eq!(report.killed, 1, "spawner is killed");
    assert_eq!(report.turns, 2 * 30 * 1024 - 1);

    let oldest_survivor = h
        .recorder
        .0
        .borrow()
        .iter()
        .filter(|e| e.kind == EventKind::ShapeSpawned)
        .nth(9)
        .and_then(|e| e.sim_time)
        .unwrap();
    assert!((oldest_survivor - 5.0).abs() < 0.01, "oldest survivor at {oldest_survivor}");

    let world = h.world.borrow();
    assert_eq!(world.live_shapes(), 0, "teardown releases every shape");
    assert_eq!(world.released().len(), 59);
    assert_eq!(world.bodies().len(), 4);

    let log = h.observer.log();
    assert_eq!(log.speed, Some(7));
    assert_eq!(log.collidable, Some(false));
    assert!((log.rotation.pitch - 0.5).abs() < 1e-12);
    assert!((log.rotation.yaw + 1.0).abs() < 1e-12);

    assert_eq!(h.recorder.0.borrow().last().map(|e| e.kind), Some(EventKind::AllStopped));
}

#[test]
fn reject_new_never_exceeds_capacity() {
    let mut cfg = seeded();
    cfg.spawn.max_shapes = 10;
    cfg.spawn.overflow = OverflowPolicy::RejectNew;
    let mut h = harness(cfg, |_, clock| {
        TimedEvents::new(clock, vec![(20.0, InputEvent::key_down(keys::ESCAPE))])
    });

    let report = h.sup.run().unwrap();

    for ev in h.recorder.0.borrow().iter() {
        if ev.kind == EventKind::ShapeSpawned {
            assert!(ev.count.unwrap() <= 10);
        }
    }
    assert_eq!(h.recorder.count(EventKind::ShapeSpawned), 10);
    assert_eq!(h.recorder.count(EventKind::ShapeRejected), 29);
    assert_eq!(h.recorder.count(EventKind::ShapeEvicted), 0);
    assert_eq!(report.shapes_released, 10);
    assert_eq!(h.world.borrow().live_shapes(), 0);
}

#[test]
fn engine_refusing_shapes_shuts_the_run_down() {
    let mut h = harness(seeded(), |_, clock| TimedEvents::new(clock, Vec::new()));
    h.world.borrow_mut().refuse_shapes();

    let err = h.sup.run().unwrap_err();
    match &err {
        RuntimeError::TaskFaulted { task, error } => {
            assert_eq!(task, "spawner");
            assert!(matches!(error, TaskError::Fail { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(h.sup.scheduler().live_count(), 0);
    assert_eq!(h.recorder.count(EventKind::TaskFailed), 1);
    assert_eq!(h.recorder.count(EventKind::TaskKilled), 1, "observer killed");
    assert_eq!(h.recorder.count(EventKind::AllStopped), 1);
}

#[test]
fn tiny_bus_still_reports_every_release() {
    let mut cfg = seeded();
    cfg.bus_capacity = 1;
    let mut h = harness(cfg, |_, clock| TimedEvents::new(clock, vec![(10.5, InputEvent::Exit)]));

    let report = h.sup.run().unwrap();
    assert_eq!(h.world.borrow().released().len(), 20);
    assert_eq!(report.shapes_released, 20);
    assert!(h.recorder.count(EventKind::SubscriberOverflow) > 0);
}

#[test]
fn tiny_bus_still_delivers_the_fault() {
    let mut cfg = seeded();
    cfg.bus_capacity = 1;
    let mut h = harness(cfg, |_, clock| TimedEvents::new(clock, Vec::new()));
    h.world.borrow_mut().refuse_shapes();

    assert!(h.sup.run().is_err());
    assert_eq!(h.recorder.count(EventKind::TaskFailed), 1);
}

#[test]
fn setup_failure_runs_no_task() {
    let mut h = harness(seeded(), |_, clock| {
        TimedEvents::new(clock, vec![(0.0, InputEvent::key_down(keys::DIGIT_1))])
    });
    h.world.borrow_mut().refuse_static_bodies();

    let err = h.sup.run().unwrap_err();
    assert!(matches!(err, RuntimeError::SetupFailed { .. }));
    assert_eq!(h.sup.report().turns, 0);
    assert_eq!(h.observer.log().calls, 0);
    assert_eq!(h.recorder.count(EventKind::SetupFailed), 1);
    assert_eq!(h.recorder.count(EventKind::TaskKilled), 2);
}

#[test]
fn shutdown_token_stops_a_running_world() {
    let mut h = harness(seeded(), |sup, clock| {
        let mut events = TimedEvents::new(clock, Vec::new());
        events.cancel_at = Some((5.0, sup.shutdown_token()));
        events
    });

    let report = h.sup.run().unwrap();
    assert_eq!(report.killed, 2);
    assert_eq!(report.finished, 0);
    assert_eq!(h.recorder.count(EventKind::ShutdownRequested), 1);
    assert_eq!(report.shapes_released, h.world.borrow().released().len());
    assert_eq!(h.world.borrow().live_shapes(), 0);
}

#[test]
fn disabled_spawning_keeps_the_world_empty() {
    let mut cfg = seeded();
    cfg.spawn.max_shapes = 0;
    let mut h = harness(cfg, |_, clock| TimedEvents::new(clock, vec![(10.0, InputEvent::Exit)]));

    let report = h.sup.run().unwrap();
    assert_eq!(report.shapes_released, 0);
    assert_eq!(h.recorder.count(EventKind::ShapeSpawned), 0);
    assert!(h.world.borrow().released().is_empty());
}
