//! Perception: конус зрения поверх инжектируемых spatial-запросов
//!
//! Ядро не делает физику само — overlap-sphere и raycast отдаёт внешний
//! слой через трейт `SpatialQuery` (в тестах — детерминированные фейки).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};


/// Параметры зрения агента
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct VisionConfig {
    /// Радиус обзора (метры)
    pub view_radius: f32,
    /// Полный угол конуса зрения (градусы, 0–360)
    pub view_angle: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            view_radius: 20.0,
            view_angle: 120.0,
        }
    }
}

/// Инжектируемый spatial-сервис (overlap + raycast внешнего движка)
pub trait SpatialQuery: Send + Sync {
    /// Позиции всех target-тегированных тел в сфере `radius` вокруг `center`
    fn target_bodies_within(&self, center: Vec3, radius: f32) -> Vec<Vec3>;

    /// true если луч из `origin` вдоль `direction` упирается в препятствие
    /// раньше `max_distance`
    fn ray_blocked(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool;
}

/// Resource-обёртка над boxed spatial-сервисом
#[derive(Resource)]
pub struct SpatialQueryService(pub Box<dyn SpatialQuery>);

impl SpatialQueryService {
    pub fn new(query: impl SpatialQuery + 'static) -> Self {
        Self(Box::new(query))
    }
}

/// Заглушка для headless-запусков без внешнего физического слоя:
/// тел нет, лучи ничем не блокируются.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpatialQuery;

impl SpatialQuery for NoopSpatialQuery {
    fn target_bodies_within(&self, _center: Vec3, _radius: f32) -> Vec<Vec3> {
        Vec::new()
    }

    fn ray_blocked(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> bool {
        false
    }
}

/// Мгновенная проверка видимости цели (pure query, без side effects)
///
/// Тело видно, если оно в радиусе, внутри половины угла конуса от forward
/// и луч до него не перекрыт препятствием. Short-circuit на первом видимом.
pub fn target_visible(
    origin: Vec3,
    forward: Vec3,
    vision: &VisionConfig,
    space: &dyn SpatialQuery,
) -> bool {
    let half_angle = (vision.view_angle / 2.0).to_radians();

    for body in space.target_bodies_within(origin, vision.view_radius) {
        let to_body = body - origin;
        let distance = to_body.length();

        // Тело вплотную к агенту — направление не определено, считаем видимым
        if distance <= f32::EPSILON {
            return true;
        }

        let direction = to_body / distance;
        if forward.angle_between(direction) < half_angle
            && !space.ray_blocked(origin, direction, distance)
        {
            return true;
        }
    }

    false
}
