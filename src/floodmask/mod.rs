pub mod apply_alpha_mask;
pub mod components;
pub mod flood;
pub mod metric;
pub mod reference;
pub mod remove_background;
