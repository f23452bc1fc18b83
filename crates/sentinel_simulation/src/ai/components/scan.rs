//! Процедура осмотра в Search: явный phase-indexed sub-FSM.
//!
//! Вместо приостановленной корутины — компонент с индексом шага и фазой,
//! продвигаемый драйвером раз в тик. Наличие компонента на агенте — флаг
//! идемпотентности: второй одновременный старт невозможен.

use bevy::prelude::*;

/// Фаза текущего шага осмотра
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ScanPhase {
    /// Плавный поворот к target_yaw (slerp каждый тик)
    Turning,
    /// Пауза с фиксированным взглядом
    Settling,
}

/// Активная процедура осмотра (снимается при завершении или отмене)
///
/// Отмена явная: любой выход из Search (принудительный Chase, мгновенное
/// повторное обнаружение, таймаут поиска) убирает компонент.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
pub struct ScanRoutine {
    /// Индекс текущего yaw-смещения в `AIConfig::scan_offsets`
    pub step: usize,
    /// Подфаза шага
    pub phase: ScanPhase,
    /// Время в текущей фазе (сек)
    pub elapsed: f32,
    /// Абсолютный yaw-ориентир текущего шага (радианы)
    pub target_yaw: f32,
}

impl ScanRoutine {
    /// Стартует осмотр с первого смещения относительно текущего yaw
    pub fn start(current_yaw: f32, first_offset_deg: f32) -> Self {
        Self {
            step: 0,
            phase: ScanPhase::Turning,
            elapsed: 0.0,
            target_yaw: current_yaw + first_offset_deg.to_radians(),
        }
    }
}
