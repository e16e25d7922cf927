pub mod device_error;
pub mod face_reporter;
