pub mod image_file_writer;
pub mod jpeg_codec;
