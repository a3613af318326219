pub mod config;
pub mod logging;

pub mod catalog;
pub mod checksum;
pub mod downloads;
pub mod provisioner;
pub mod store;
pub mod url_model;
