//! Generic CRUD layer: one controller shape for every entity

pub mod controller;
pub mod handlers;
pub mod hooks;

pub use controller::{ControllerSettings, CrudController};
pub use hooks::{ModelHooks, NoHooks, PaymentHooks, TotalsHooks};
