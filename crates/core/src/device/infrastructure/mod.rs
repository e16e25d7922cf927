pub mod http_device_client;
