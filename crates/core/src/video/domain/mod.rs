pub mod frame_decoder;
pub mod frame_encoder;
pub mod image_writer;
