//! Headless запуск SENTINEL decision core
//!
//! Запускает Bevy App без рендера и внешнего движка: spatial-заглушка,
//! простейший телепорт-исполнитель навигации, кольцо патрульных узлов.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use sentinel_simulation::*;

fn main() {
    let seed = 42;
    println!("Starting SENTINEL headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(SpatialQueryService::new(NoopSpatialQuery))
        // Один fixed-тик на app.update(), без привязки к wall clock
        .insert_resource(TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_secs_f64(1.0 / 60.0),
        ))
        .add_systems(FixedUpdate, drive_navigation.before(border_override));

    // Кольцо патрульных узлов вокруг origin + цель + агент
    let world = app.world_mut();
    for i in 0..6 {
        let angle = i as f32 / 6.0 * std::f32::consts::TAU;
        world.spawn((
            PatrolNode,
            Transform::from_xyz(angle.cos() * 25.0, 0.0, angle.sin() * 25.0),
        ));
    }
    world.spawn((Target, Transform::from_xyz(10.0, 0.0, 10.0)));
    let agent = world.spawn((Agent, Transform::from_xyz(0.0, 0.0, 0.0))).id();

    // Прогоняем 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let state = app
                .world()
                .entity(agent)
                .get::<AIState>()
                .copied()
                .unwrap_or_default();
            let position = app
                .world()
                .entity(agent)
                .get::<Transform>()
                .map(|t| t.translation)
                .unwrap_or_default();
            println!(
                "Tick {}: state {:?}, pos ({:.1}, {:.1})",
                tick, state, position.x, position.z
            );
        }
    }

    println!("Simulation complete!");
}

/// Простейший исполнитель навигации: телепорт-шаг к destination за тик
///
/// Заменяет внешний path follower в headless-запуске; путь считается
/// построенным мгновенно.
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
