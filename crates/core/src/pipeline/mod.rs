pub mod capture_trigger;
pub mod frame_ingestor;
pub mod ingest_error;
pub mod ingest_frame_use_case;
pub mod mjpeg_stream;
