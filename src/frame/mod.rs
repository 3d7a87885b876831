pub mod frame_model;
pub mod visual_diff;
