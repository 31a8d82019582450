//! HTML rendering
//!
//! Templates live next to this file and are compiled into the binary. Names
//! end in `.html`, so minijinja escapes every interpolated value.

use crate::error::WebError;
use minijinja::{context, Environment};
use pony_core::{ListState, PonyItem, SearchPhase};
use serde::Serialize;

const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");
const HOME_TEMPLATE: &str = include_str!("templates/home.html");
const PONIES_TEMPLATE: &str = include_str!("templates/ponies.html");

/// One rendered pony
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PonyRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub image_url: String,
}

impl From<&PonyItem> for PonyRow {
    fn from(item: &PonyItem) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            color: item.pony().color.to_string(),
            image_url: item.image_url(),
        }
    }
}

/// Everything the ponies template needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoniesView {
    /// Query in the URL, `None` when absent
    pub query: Option<String>,
    /// Text pre-filled in the search field
    pub query_input: String,
    /// `idle`, `searching`, `failed`, `empty` or `ready`
    pub status: &'static str,
    pub error: Option<String>,
    pub ponies: Vec<PonyRow>,
}

impl PoniesView {
    /// Build the view from the form text and a list snapshot
    #[must_use]
    pub fn new(query_input: impl Into<String>, state: &ListState, items: &[PonyItem]) -> Self {
        let (status, error) = match &state.phase {
            SearchPhase::Idle => ("idle", None),
            SearchPhase::Searching => ("searching", None),
            SearchPhase::Failed(message) => ("failed", Some(message.clone())),
            SearchPhase::Ready if items.is_empty() => ("empty", None),
            SearchPhase::Ready => ("ready", None),
        };

        Self {
            query: state.query.clone(),
            query_input: query_input.into(),
            status,
            error,
            ponies: items.iter().map(PonyRow::from).collect(),
        }
    }
}

/// Template environment for the HTML pages
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Load the built-in templates
    ///
    /// # Errors
    /// Returns an error if a template fails to compile.
    pub fn new() -> Result<Self, WebError> {
        let mut env = Environment::new();
        env.add_template("layout.html", LAYOUT_TEMPLATE)?;
        env.add_template("home.html", HOME_TEMPLATE)?;
        env.add_template("ponies.html", PONIES_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Landing page
    ///
    /// # Errors
    /// Returns `WebError::Render` if rendering fails.
    pub fn render_home(&self) -> Result<String, WebError> {
        let template = self.env.get_template("home.html")?;
        Ok(template.render(context! {})?)
    }

    /// Search/list page
    ///
    /// # Errors
    /// Returns `WebError::Render` if rendering fails.
    pub fn render_ponies(&self, view: &PoniesView) -> Result<String, WebError> {
        let template = self.env.get_template("ponies.html")?;
        Ok(template.render(context! { view => view })?)
    }
}
