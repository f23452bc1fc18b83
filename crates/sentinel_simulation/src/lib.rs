//! SENTINEL Simulation Core
//!
//! Headless ECS-ядро принятия решений патрульного агента (strategic layer).
//! Ядро решает КУДА идти и В КАКОМ режиме агент находится; физическое
//! исполнение (path following, raycast, анимация) живёт во внешнем
//! tactical-слое и подключается через инжектируемые интерфейсы:
//! - `NavAgent` — зеркало внешнего навигационного исполнителя
//! - `SpatialQueryService` — overlap-sphere / raycast запросы
//! - `MotionTelemetry` — обратная связь скорости для анимации

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod components;
pub mod error;
pub mod logger;
pub mod perception;

// Re-export базовых типов и систем для удобства
pub use ai::*;
pub use components::*;
pub use error::AIError;
pub use perception::*;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        // Детерминистичный RNG (не перетираем seed, если embedder уже вставил свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.add_plugins(AIPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Единственный потребитель — выбор дальнего патрульного узла,
/// но seed фиксируем глобально ради воспроизводимых прогонов.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}
