//! Agent FSM integration tests
//!
//! Headless App + детерминированные фейки внешних сервисов:
//! - ScriptedWorld — управляемый из теста SpatialQuery
//! - drive_navigation — телепорт-исполнитель вместо path follower
//! - TimeUpdateStrategy::ManualDuration — ровно один fixed tick на update

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sentinel_simulation::*;

// ============================================================================
// Test fakes
// ============================================================================

#[derive(Default)]
struct ScriptedState {
    bodies: Vec<Vec3>,
    blocked: bool,
}

/// Spatial-фейк с ручным управлением из теста (shared handle)
#[derive(Clone, Default)]
struct ScriptedWorld {
    inner: Arc<Mutex<ScriptedState>>,
}

impl ScriptedWorld {
    fn set_body(&self, position: Vec3) {
        self.inner.lock().unwrap().bodies = vec![position];
    }

    fn clear_bodies(&self) {
        self.inner.lock().unwrap().bodies.clear();
    }

    fn set_blocked(&self, blocked: bool) {
        self.inner.lock().unwrap().blocked = blocked;
    }
}

impl SpatialQuery for ScriptedWorld {
    fn target_bodies_within(&self, center: Vec3, radius: f32) -> Vec<Vec3> {
        self.inner
            .lock()
            .unwrap()
            .bodies
            .iter()
            .copied()
            .filter(|b| b.distance(center) <= radius)
            .collect()
    }

    fn ray_blocked(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> bool {
        self.inner.lock().unwrap().blocked
    }
}

/// Телепорт-исполнитель навигации (заменяет внешний path follower)
fn drive_navigation(mut agents: Query<(&mut Transform, &mut NavAgent)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut transform, mut nav) in agents.iter_mut() {
        let Some(destination) = nav.destination else {
            nav.velocity = Vec3::ZERO;
            continue;
        };
        nav.path_pending = false;

        let to_destination = destination - transform.translation;
        let distance = to_destination.length();
        if distance <= 1e-3 {
            nav.remaining_distance = 0.0;
            nav.velocity = Vec3::ZERO;
            continue;
        }

        let step = (nav.speed * delta).min(distance);
        let direction = to_destination / distance;
        transform.translation += direction * step;
        nav.velocity = direction * nav.speed;
        nav.remaining_distance = distance - step;
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn create_test_app(dt: f32, world: ScriptedWorld) -> App {
    let mut app = create_headless_app(7);
    app.add_plugins(SimulationPlugin)
        .insert_resource(Time::<Fixed>::from_seconds(dt as f64))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            dt as f64,
        )))
        .insert_resource(SpatialQueryService::new(world));
    app
}

fn with_nav_driver(app: &mut App) {
    app.add_systems(FixedUpdate, drive_navigation.before(border_override));
}

fn spawn_agent(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((Agent, Transform::from_translation(position)))
        .id()
}

fn spawn_target(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((Target, Transform::from_translation(position)))
        .id()
}

fn spawn_nodes(app: &mut App, positions: &[Vec3]) -> Vec<Entity> {
    positions
        .iter()
        .map(|&pos| {
            app.world_mut()
                .spawn((PatrolNode, Transform::from_translation(pos)))
                .id()
        })
        .collect()
}

fn agent_state(app: &App, agent: Entity) -> AIState {
    *app.world().entity(agent).get::<AIState>().unwrap()
}

fn agent_destination(app: &App, agent: Entity) -> Option<Vec3> {
    app.world().entity(agent).get::<NavAgent>().unwrap().destination
}

fn move_entity(app: &mut App, entity: Entity, position: Vec3) {
    app.world_mut()
        .entity_mut(entity)
        .get_mut::<Transform>()
        .unwrap()
        .translation = position;
}

/// Крутим тики, пока условие не выполнится (или max_ticks исчерпан)
fn wait_for(app: &mut App, max_ticks: usize, cond: impl Fn(&App) -> bool) -> bool {
    for _ in 0..max_ticks {
        app.update();
        if cond(app) {
            return true;
        }
    }
    false
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_roam_selects_nearest_patrol_node() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.05, world);
    with_nav_driver(&mut app);

    spawn_nodes(&mut app, &[Vec3::new(5.0, 0.0, 0.0), Vec3::new(40.0, 0.0, 0.0)]);
    spawn_target(&mut app, Vec3::new(30.0, 0.0, 30.0)); // вне поля зрения
    let agent = spawn_agent(&mut app, Vec3::ZERO);

    for _ in 0..3 {
        app.update();
    }

    // Память пуста (чётная) → ближайший узел
    assert_eq!(agent_state(&app, agent), AIState::Roam);
    assert_eq!(agent_destination(&app, agent), Some(Vec3::new(5.0, 0.0, 0.0)));
    let memory = app.world().entity(agent).get::<NodeMemory>().unwrap();
    assert_eq!(memory.len(), 1);
}

#[test]
fn test_full_patrol_pursuit_cycle() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.05, world.clone());
    with_nav_driver(&mut app);

    spawn_nodes(
        &mut app,
        &[
            Vec3::new(6.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 40.0),
            Vec3::new(-35.0, 0.0, 0.0),
        ],
    );
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -4.0));
    let agent = spawn_agent(&mut app, Vec3::ZERO);

    // Цель видна с первого тика (в радиусе, по forward = -Z, луч свободен)
    world.set_body(Vec3::new(0.0, 0.0, -4.0));

    // Мгновенного Attack нет: нужен подтверждённый контакт 0.2s
    app.update();
    app.update();
    assert_eq!(agent_state(&app, agent), AIState::Roam);

    assert!(
        wait_for(&mut app, 20, |app| agent_state(app, agent) == AIState::Attack),
        "sustained sighting must promote Roam → Attack"
    );
    // Attack ведёт к живой позиции цели (behavior — на следующем тике)
    app.update();
    assert_eq!(agent_destination(&app, agent), Some(Vec3::new(0.0, 0.0, -4.0)));

    // Цель скрылась и ушла
    world.clear_bodies();
    move_entity(&mut app, target, Vec3::new(0.0, 0.0, -10.0));

    assert!(
        wait_for(&mut app, 60, |app| agent_state(app, agent) == AIState::Search),
        "2s without sight must demote Attack → Search"
    );
    // Точка поиска = последняя известная позиция (живая позиция на момент потери)
    assert_eq!(agent_destination(&app, agent), Some(Vec3::new(0.0, 0.0, -10.0)));

    // Дойти до точки, отработать осмотр (3 × 0.8s), вернуться в Roam
    assert!(
        wait_for(&mut app, 200, |app| agent_state(app, agent) == AIState::Roam),
        "completed sweep must return Search → Roam"
    );

    let memory = app.world().entity(agent).get::<NodeMemory>().unwrap();
    assert_eq!(memory.len(), 2);

    // Вторая выборка: память нечётная на момент выбора → дальний набор (≥ 30)
    let destination = agent_destination(&app, agent).unwrap();
    assert!(
        destination == Vec3::new(0.0, 0.0, 40.0) || destination == Vec3::new(-35.0, 0.0, 0.0),
        "odd-parity selection must draw from the far set, got {:?}",
        destination
    );
}

#[test]
fn test_occlusion_defeats_perception() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.05, world.clone());
    with_nav_driver(&mut app);

    spawn_nodes(&mut app, &[Vec3::new(5.0, 0.0, 0.0)]);
    spawn_target(&mut app, Vec3::new(0.0, 0.0, -4.0));
    let agent = spawn_agent(&mut app, Vec3::ZERO);

    // Тело в конусе, но луч перекрыт препятствием
    world.set_body(Vec3::new(0.0, 0.0, -4.0));
    world.set_blocked(true);

    for _ in 0..20 {
        app.update();
    }
    assert_eq!(agent_state(&app, agent), AIState::Roam);

    // Препятствие убрали — контакт подтверждается
    world.set_blocked(false);
    assert!(wait_for(&mut app, 20, |app| agent_state(app, agent) == AIState::Attack));
}

#[test]
fn test_border_override_forces_chase_then_reverts_to_search() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.05, world);
    with_nav_driver(&mut app);

    spawn_nodes(&mut app, &[Vec3::new(5.0, 0.0, 0.0)]);
    let target = spawn_target(&mut app, Vec3::new(100.0, 0.0, 0.0)); // за границей 70
    let agent = spawn_agent(&mut app, Vec3::ZERO);

    assert!(
        wait_for(&mut app, 3, |app| agent_state(app, agent) == AIState::Chase),
        "target beyond map border must force Chase"
    );
    // Chase ведёт к живой позиции цели
    assert_eq!(agent_destination(&app, agent), Some(Vec3::new(100.0, 0.0, 0.0)));

    // Цель вернулась в границу → поиск от последней известной позиции
    move_entity(&mut app, target, Vec3::new(10.0, 0.0, 0.0));
    assert!(
        wait_for(&mut app, 5, |app| agent_state(app, agent) == AIState::Search),
        "target back inside border must demote Chase → Search"
    );
    assert_eq!(agent_destination(&app, agent), Some(Vec3::new(10.0, 0.0, 0.0)));
}

#[test]
fn test_scan_routine_idempotent_and_completes() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.1, world);
    with_nav_driver(&mut app);

    spawn_nodes(&mut app, &[Vec3::new(5.0, 0.0, 0.0), Vec3::new(40.0, 0.0, 0.0)]);
    spawn_target(&mut app, Vec3::new(30.0, 0.0, 30.0));
    let agent = spawn_agent(&mut app, Vec3::ZERO);
    // Навигация простаивает с порождения → осмотр стартует сразу
    app.world_mut().entity_mut(agent).insert(AIState::Search);

    // Шаг осмотра никогда не откатывается (второго старта не было)
    let mut last_step = 0usize;
    let mut saw_scan = false;
    for _ in 0..40 {
        app.update();
        if let Some(scan) = app.world().entity(agent).get::<ScanRoutine>() {
            saw_scan = true;
            assert!(scan.step >= last_step, "scan restarted mid-flight");
            last_step = scan.step;
        }
        if agent_state(&app, agent) == AIState::Roam {
            break;
        }
    }

    assert!(saw_scan, "scan routine never started");
    // 3 × (0.4 + 0.4) = 2.4s симуляции — завершение и возврат в Roam
    assert_eq!(agent_state(&app, agent), AIState::Roam);
    assert!(app.world().entity(agent).get::<ScanRoutine>().is_none());
    // Завершение запросило следующий узел патруля
    assert!(agent_destination(&app, agent).is_some());
    assert_eq!(app.world().entity(agent).get::<NodeMemory>().unwrap().len(), 1);
}

#[test]
fn test_scan_cancelled_on_resight() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.1, world.clone());
    with_nav_driver(&mut app);

    spawn_nodes(&mut app, &[Vec3::new(5.0, 0.0, 0.0)]);
    spawn_target(&mut app, Vec3::new(0.0, 0.0, -3.0));
    let agent = spawn_agent(&mut app, Vec3::ZERO);
    app.world_mut().entity_mut(agent).insert(AIState::Search);

    assert!(
        wait_for(&mut app, 5, |app| app
            .world()
            .entity(agent)
            .get::<ScanRoutine>()
            .is_some()),
        "scan must start while search-idle"
    );

    // Цель мелькнула вплотную — мгновенная проверка, без гистерезиса
    let agent_pos = app
        .world()
        .entity(agent)
        .get::<Transform>()
        .unwrap()
        .translation;
    world.set_body(agent_pos);

    assert!(
        wait_for(&mut app, 3, |app| agent_state(app, agent) == AIState::Attack),
        "instantaneous sighting must promote Search → Attack"
    );
    assert!(
        app.world().entity(agent).get::<ScanRoutine>().is_none(),
        "leaving Search must cancel the active scan"
    );
}

#[test]
fn test_border_override_cancels_active_scan() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.1, world);
    with_nav_driver(&mut app);

    spawn_nodes(&mut app, &[Vec3::new(5.0, 0.0, 0.0)]);
    let target = spawn_target(&mut app, Vec3::new(30.0, 0.0, 30.0));
    let agent = spawn_agent(&mut app, Vec3::ZERO);
    app.world_mut().entity_mut(agent).insert(AIState::Search);

    assert!(wait_for(&mut app, 5, |app| app
        .world()
        .entity(agent)
        .get::<ScanRoutine>()
        .is_some()));

    // Цель телепортировалась за границу посреди осмотра
    move_entity(&mut app, target, Vec3::new(200.0, 0.0, 0.0));

    assert!(wait_for(&mut app, 3, |app| agent_state(app, agent) == AIState::Chase));
    assert!(
        app.world().entity(agent).get::<ScanRoutine>().is_none(),
        "forced Chase must cancel the active scan"
    );
}

#[test]
fn test_search_timeout_cancels_overlong_scan() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.1, world);
    with_nav_driver(&mut app);

    spawn_nodes(&mut app, &[Vec3::new(5.0, 0.0, 0.0), Vec3::new(40.0, 0.0, 0.0)]);
    spawn_target(&mut app, Vec3::new(30.0, 0.0, 30.0));
    let agent = spawn_agent(&mut app, Vec3::ZERO);

    // 5 смещений × 0.8s = 4.0s осмотра > таймаут поиска 3.0s
    app.world_mut().entity_mut(agent).insert((
        AIState::Search,
        AIConfig {
            scan_offsets: vec![-60.0, -30.0, 0.0, 30.0, 60.0],
            ..Default::default()
        },
    ));

    // Таймаут (3.0s, 30 тиков) должен сработать раньше конца осмотра (40 тиков)
    assert!(
        wait_for(&mut app, 36, |app| agent_state(app, agent) == AIState::Roam),
        "search-idle timeout must fire before the overlong scan completes"
    );
    assert!(
        app.world().entity(agent).get::<ScanRoutine>().is_none(),
        "timeout exit must cancel the active scan"
    );
}

#[test]
fn test_stalled_navigation_is_degraded_not_fatal() {
    let world = ScriptedWorld::default();
    // Без drive_navigation: внешний исполнитель "строит путь" вечно
    let mut app = create_test_app(0.1, world);

    spawn_nodes(&mut app, &[Vec3::new(5.0, 0.0, 0.0)]);
    spawn_target(&mut app, Vec3::new(30.0, 0.0, 30.0));
    let agent = spawn_agent(&mut app, Vec3::ZERO);
    app.world_mut().entity_mut(agent).insert((
        AIState::Search,
        NavAgent {
            destination: Some(Vec3::new(0.0, 0.0, -10.0)),
            path_pending: true,
            ..Default::default()
        },
    ));

    // 5 секунд: idle-детекция молчит, осмотр не стартует, краша нет
    for _ in 0..50 {
        app.update();
    }
    assert_eq!(agent_state(&app, agent), AIState::Search);
    assert!(app.world().entity(agent).get::<ScanRoutine>().is_none());
}

#[test]
fn test_node_memory_stays_bounded_over_long_run() {
    let world = ScriptedWorld::default();
    let mut app = create_test_app(0.1, world);
    with_nav_driver(&mut app);

    let ring: Vec<Vec3> = (0..8)
        .map(|i| {
            let angle = i as f32 / 8.0 * std::f32::consts::TAU;
            Vec3::new(angle.cos() * 35.0, 0.0, angle.sin() * 35.0)
        })
        .collect();
    spawn_nodes(&mut app, &ring);
    spawn_target(&mut app, Vec3::new(1.0, 0.0, 1.0));
    let agent = spawn_agent(&mut app, Vec3::ZERO);

    for tick in 0..1000 {
        app.update();
        if tick % 50 == 0 {
            let memory = app.world().entity(agent).get::<NodeMemory>().unwrap();
            assert!(memory.len() <= 5, "memory exceeded capacity at tick {}", tick);
        }
    }
}

#[test]
fn test_same_seed_runs_are_identical() {
    let run = || {
        let world = ScriptedWorld::default();
        let mut app = create_test_app(0.1, world);
        with_nav_driver(&mut app);

        let ring: Vec<Vec3> = (0..6)
            .map(|i| {
                let angle = i as f32 / 6.0 * std::f32::consts::TAU;
                Vec3::new(angle.cos() * 32.0, 0.0, angle.sin() * 32.0)
            })
            .collect();
        spawn_nodes(&mut app, &ring);
        spawn_target(&mut app, Vec3::new(1.0, 0.0, 1.0));
        let agent = spawn_agent(&mut app, Vec3::ZERO);

        let mut trace = Vec::new();
        for _ in 0..400 {
            app.update();
            trace.push((agent_state(&app, agent), agent_destination(&app, agent)));
        }
        trace
    };

    let first = run();
    let second = run();
    assert_eq!(first, second, "same seed must reproduce the same decisions");
}
