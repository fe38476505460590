//! handlers/mod.rs
//! Módulo que agrupa los handlers HTTP (pixel, stats, notificaciones).

pub mod notification_handler;
pub mod tracking_handler;
