pub mod constants;
pub mod face_box;
pub mod frame;
pub mod gray_frame;
pub mod model_resolver;
