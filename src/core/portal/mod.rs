pub mod config_codec;
pub mod config_form;
pub mod folder_id;
pub mod portal_controller;
pub mod portal_models;

pub use config_codec::{load_from_fragment, share_link};
pub use config_form::ConfigForm;
pub use portal_controller::{
    FileDetail, LoadOutcome, PortalController, PortalError, PortalPhase, PortalState,
};
pub use portal_models::{AppConfig, ViewMode};
