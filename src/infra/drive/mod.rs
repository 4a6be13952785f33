#[path = "drive_api_client.rs"]
pub mod drive_api_client;

pub use drive_api_client::DriveApiClient;
