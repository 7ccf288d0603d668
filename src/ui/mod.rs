// UI - egui front end

pub mod app;
pub mod note_grid;
