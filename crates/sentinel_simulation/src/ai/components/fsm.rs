//! FSM AI components (состояние, таймеры, конфиг).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Состояния FSM патрульного агента
///
/// Ровно одно состояние в каждый момент; переходы — только в
/// `state_transitions` плюс принудительный Chase в `border_override`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Roam — обход патрульных узлов (начальное состояние)
    #[default]
    Roam,

    /// Attack — преследование видимой цели
    Attack,

    /// Search — поиск у последней известной позиции цели
    Search,

    /// Chase — безусловная погоня (цель покинула границу карты)
    Chase,
}

/// Накопительные таймеры decision core
///
/// Инвариант: все значения ≥ 0; каждый таймер обнуляется, когда его
/// триггер-условие перестаёт выполняться.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct AITimers {
    /// Непрерывное время в поле зрения (сек)
    pub sight_confirm: f32,
    /// Непрерывное время вне поля зрения (сек)
    pub sight_loss: f32,
    /// Время простоя навигации в Search (сек, копится только в idle)
    pub search_idle: f32,
}

impl AITimers {
    /// Один отсчёт perception за тик: копим один sight-таймер, сбрасываем другой
    pub fn accumulate_sight(&mut self, visible: bool, delta: f32) {
        if visible {
            self.sight_confirm += delta;
            self.sight_loss = 0.0;
        } else {
            self.sight_loss += delta;
            self.sight_confirm = 0.0;
        }
    }

    /// Дебаунс-сигнал "цель видна непрерывно"
    ///
    /// Пороги зависят от состояния: Roam требует подтверждённого контакта
    /// (confirm ≥ threshold), Attack терпит короткую окклюзию
    /// (loss < threshold). Для остальных состояний сигнал не определён —
    /// всегда false.
    pub fn continuously_seen(&self, state: AIState, threshold: f32) -> bool {
        match state {
            AIState::Roam => self.sight_confirm >= threshold,
            AIState::Attack => self.sight_loss < threshold,
            _ => false,
        }
    }
}

/// Последняя известная позиция цели
///
/// Обновляется каждый тик в Attack (и Chase) живой позицией цели;
/// читается один раз при переходе в Search как точка поиска.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct LastKnownTargetPosition(pub Vec3);

/// Параметры AI (все значения — тюнинг, ничего не вычисляется)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AIConfig {
    /// Скорость в Roam (м/с)
    pub roam_speed: f32,
    /// Скорость в Attack (м/с)
    pub attack_speed: f32,
    /// Скорость в Search (м/с)
    pub search_speed: f32,
    /// Скорость в Chase (м/с)
    pub chase_speed: f32,
    /// Ускорение в Chase (м/с²)
    pub chase_acceleration: f32,
    /// Угловая скорость в Chase (градусы/с)
    pub chase_angular_speed: f32,

    /// Дистанция "узел достигнут" для Roam (метры)
    pub roam_arrive_distance: f32,
    /// Дистанция "точка поиска достигнута" для Search (метры)
    pub search_arrive_distance: f32,

    /// Горизонтальная граница карты от origin; дальше — принудительный Chase
    pub map_border: f32,
    /// Минимальная дистанция "дальнего" узла при нечётной памяти (метры)
    pub far_node_distance: f32,

    /// Порог подтверждения контакта в Roam (сек)
    pub alert_threshold: f32,
    /// Порог потери цели в Attack (сек)
    pub lose_threshold: f32,
    /// Таймаут простоя в Search до возврата в Roam (сек)
    pub search_timeout: f32,

    /// Относительные yaw-смещения осмотра (градусы, по порядку)
    pub scan_offsets: Vec<f32>,
    /// Окно интерполяции поворота на одно смещение (сек)
    pub scan_turn_duration: f32,
    /// Пауза после поворота (сек)
    pub scan_settle_duration: f32,
    /// Множитель slerp-фактора при повороте (× delta за тик)
    pub scan_turn_rate: f32,

    /// Ёмкость памяти недавних узлов
    pub memory_capacity: usize,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            roam_speed: 3.6,
            attack_speed: 4.8,
            search_speed: 3.0,
            chase_speed: 20.0,
            chase_acceleration: 10.0,
            chase_angular_speed: 120.0,

            roam_arrive_distance: 5.0,
            search_arrive_distance: 0.5,

            map_border: 70.0,
            far_node_distance: 30.0,

            alert_threshold: 0.2,
            lose_threshold: 2.0,
            search_timeout: 3.0,

            scan_offsets: vec![-60.0, 0.0, 60.0], // смотрим влево, вперёд, вправо
            scan_turn_duration: 0.4,
            scan_settle_duration: 0.4,
            scan_turn_rate: 5.0,

            memory_capacity: 5,
        }
    }
}
