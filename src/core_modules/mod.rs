pub mod blob;
pub mod blob_locator;
pub mod color_mask;
pub mod control_mapper;
pub mod frame;
pub mod pixel;
pub mod position;
pub mod smoothing;
pub mod track_state;
