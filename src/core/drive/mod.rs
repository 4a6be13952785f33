pub mod drive_listing;
pub mod drive_models;
pub mod file_format;

pub use drive_listing::{DriveError, DriveListing, GENERIC_LISTING_FAILURE};
pub use drive_models::{DriveFile, FileCategory};
