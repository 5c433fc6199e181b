pub mod http_server;
pub mod service_manager;

pub use http_server::{AppState, NotifierService};
pub use service_manager::{Service, ServiceManager};
