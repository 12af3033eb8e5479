//! egui rendering of [`AppState`](crate::state::AppState).

pub mod map;
pub mod panels;
