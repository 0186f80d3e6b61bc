pub mod browser_state;
pub mod view_model;
