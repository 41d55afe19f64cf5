//! Handler replies and the rendering seam.
//!
//! # Responsibility
//! - Describe what a handler decided (page, redirect, not found).
//! - Turn that decision into status, location and body through a
//!   pluggable [`Renderer`].
//!
//! # Invariants
//! - Notices ride along with the reply; nothing is queued globally.

use serde_json::{json, Value};
use student_core::Notice;
use thiserror::Error;

pub const TEMPLATE_LIST: &str = "list.html";
pub const TEMPLATE_FORM: &str = "form.html";
pub const TEMPLATE_PROFILE: &str = "profile.html";
pub const TEMPLATE_NOT_FOUND: &str = "404.html";

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Render `template` with `context`.
    Page {
        template: &'static str,
        context: Value,
    },
    Redirect {
        location: String,
    },
    NotFound,
}

/// Handler output: the response plus notices for the next page view.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub response: Response,
    pub notices: Vec<Notice>,
}

impl Reply {
    pub fn page(template: &'static str, context: Value) -> Self {
        Self {
            response: Response::Page { template, context },
            notices: Vec::new(),
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            response: Response::Redirect {
                location: location.into(),
            },
            notices: Vec::new(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            response: Response::NotFound,
            notices: Vec::new(),
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn template(&self) -> Option<&'static str> {
        match &self.response {
            Response::Page { template, .. } => Some(*template),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match &self.response {
            Response::Redirect { location } => Some(location.as_str()),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&Value> {
        match &self.response {
            Response::Page { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template `{0}` is not available")]
    UnknownTemplate(String),
    #[error("failed to render `{template}`: {message}")]
    Failed { template: String, message: String },
}

/// Template engine seam.
pub trait Renderer {
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError>;
}

/// Renders `{"template": ..., "context": ...}` as JSON.
///
/// Useful for API clients and tests that want the raw context.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError> {
        serde_json::to_string(&json!({ "template": template, "context": context })).map_err(
            |err| RenderError::Failed {
                template: template.to_string(),
                message: err.to_string(),
            },
        )
    }
}

/// Transport-ready response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
    pub notices: Vec<Notice>,
}

/// Renders `reply` into a transport-ready response.
pub fn finish(reply: Reply, renderer: &dyn Renderer) -> Result<HttpResponse, RenderError> {
    let Reply { response, notices } = reply;
    let (status, location, body) = match response {
        Response::Page { template, context } => (200, None, renderer.render(template, &context)?),
        Response::Redirect { location } => (302, Some(location), String::new()),
        Response::NotFound => (404, None, renderer.render(TEMPLATE_NOT_FOUND, &json!({}))?),
    };

    Ok(HttpResponse {
        status,
        location,
        body,
        notices,
    })
}
