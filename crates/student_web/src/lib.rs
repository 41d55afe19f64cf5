//! Request boundary for the student directory.
//!
//! Maps decoded requests onto `student_core` workflows and turns their
//! outcomes into template pages, redirects and notices. Transport, sessions
//! and template engines are supplied by the embedding server.

pub mod auth;
pub mod config;
pub mod request;
pub mod response;
pub mod routes;
pub mod site;

pub use auth::{require_authenticated, AuthenticationRequired, Caller};
pub use config::SiteConfig;
pub use request::{Method, Request};
pub use response::{finish, HttpResponse, JsonRenderer, RenderError, Renderer, Reply, Response};
pub use routes::Route;
pub use site::{bootstrap, SiteError, StudentSite};
