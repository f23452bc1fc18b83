//! Navigation компоненты: зеркало внешнего path-following исполнителя

use bevy::prelude::*;

/// Зеркало внешнего навигационного агента (NavigationAgent движка)
///
/// Архитектура:
/// - ECS системы пишут `destination` и per-state параметры скорости
/// - Tactical-слой (или тестовый fake) читает destination, ведёт тело по
///   пути и пишет обратно `path_pending` / `remaining_distance` / `velocity`
///
/// Недостижимая цель остаётся `path_pending` бесконечно — это штатный
/// degraded mode: idle-детекция Roam/Search просто не срабатывает.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Текущая запрошенная точка назначения
    pub destination: Option<Vec3>,
    /// true пока внешний исполнитель строит путь
    pub path_pending: bool,
    /// Остаток пути до destination (метры)
    pub remaining_distance: f32,
    /// Текущая скорость тела (пишет внешний слой, читает телеметрия)
    pub velocity: Vec3,
    /// Крейсерская скорость (метры/сек), задаётся per-state
    pub speed: f32,
    /// Ускорение (метры/сек²)
    pub acceleration: f32,
    /// Угловая скорость разворота (градусы/сек)
    pub angular_speed: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            path_pending: false,
            remaining_distance: 0.0,
            velocity: Vec3::ZERO,
            speed: 3.6,
            acceleration: 8.0,
            angular_speed: 120.0,
        }
    }
}

impl NavAgent {
    /// Запрашивает навигацию к точке (fire-and-forget)
    ///
    /// Повторный запрос той же точки не перевзводит path_pending — иначе
    /// Attack/Chase, переставляя цель каждый тик, ломали бы idle-детекцию.
    pub fn set_destination(&mut self, point: Vec3) {
        if self.destination != Some(point) {
            self.destination = Some(point);
            self.path_pending = true;
        }
    }

    /// Навигация простаивает: путь построен и остаток ≤ precision
    pub fn is_idle(&self, precision: f32) -> bool {
        !self.path_pending && self.remaining_distance <= precision
    }
}
