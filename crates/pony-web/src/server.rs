//! HTTP routes
//!
//! HTML pages go through the shared [`Session`]; the JSON API talks to the
//! record service directly.

use crate::error::{handle_rejection, reject, WebError};
use crate::render::Renderer;
use crate::session::Session;
use pony_core::{
    AppConfig, Location, NavigationError, PonyId, PonyService, QueryParams, Route, QUERY_PARAM,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::http::{StatusCode, Uri};
use warp::{Filter, Rejection, Reply};

const FORM_LIMIT: u64 = 16 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    session: Arc<Session>,
    renderer: Arc<Renderer>,
    service: Arc<dyn PonyService>,
}

impl AppState {
    /// # Errors
    /// Returns `WebError::Render` if a built-in template fails to compile.
    pub fn new(service: Arc<dyn PonyService>) -> Result<Self, WebError> {
        Ok(Self {
            session: Arc::new(Session::new(Arc::clone(&service))),
            renderer: Arc::new(Renderer::new()?),
            service,
        })
    }

    /// The browser session behind the HTML pages
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct DeleteBody {
    id: String,
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn form_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(FORM_LIMIT).and(warp::body::form())
}

fn images(assets_dir: Option<PathBuf>) -> BoxedFilter<(warp::fs::File,)> {
    match assets_dir {
        Some(dir) => warp::path("images").and(warp::fs::dir(dir)).boxed(),
        None => warp::path("images")
            .and_then(|| async { Err::<warp::fs::File, Rejection>(warp::reject::not_found()) })
            .boxed(),
    }
}

/// All routes, without rejection handling
pub fn routes(
    state: AppState,
    assets_dir: Option<PathBuf>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let raw_query = || warp::query::raw().or(warp::any().map(String::new)).unify();

    let home = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(home_page);

    let ponies = warp::path!("ponies")
        .and(warp::get())
        .and(raw_query())
        .and(with_state(state.clone()))
        .and_then(ponies_page);

    let search = warp::path!("ponies" / "search")
        .and(warp::post())
        .and(form_body::<SearchBody>())
        .and(with_state(state.clone()))
        .and_then(submit_search);

    let delete = warp::path!("ponies" / "delete")
        .and(warp::post())
        .and(form_body::<DeleteBody>())
        .and(with_state(state.clone()))
        .and_then(delete_pony);

    let api_search = warp::path!("api" / "ponies")
        .and(warp::get())
        .and(raw_query())
        .and(with_state(state.clone()))
        .and_then(api_search);

    let api_delete = warp::path!("api" / "ponies" / String)
        .and(warp::delete())
        .and(with_state(state))
        .and_then(api_delete);

    home.or(ponies)
        .or(search)
        .or(delete)
        .or(api_search)
        .or(api_delete)
        .or(images(assets_dir).and(warp::get()))
}

/// Routes with error recovery and request tracing
pub fn app(
    state: AppState,
    assets_dir: Option<PathBuf>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    routes(state, assets_dir)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

/// Serve `config` until ctrl-c
///
/// # Errors
/// Fails if the seed is invalid or the address cannot be bound.
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let service: Arc<dyn PonyService> = Arc::new(config.backend.build_service()?);
    let state = AppState::new(service)?;
    let filter = app(state, config.server.assets_dir.clone());

    let (addr, server) = warp::serve(filter).try_bind_with_graceful_shutdown(
        config.server.bind,
        async {
            // An error here means no signal handler; shut down as if signalled.
            let _ = tokio::signal::ctrl_c().await;
        },
    )?;

    tracing::info!(%addr, latency_ms = config.backend.latency_ms, "ponies server listening");
    server.await;
    tracing::info!("ponies server stopped");
    Ok(())
}

async fn home_page(state: AppState) -> Result<impl Reply, Rejection> {
    state.session.show_home().await;
    let html = state.renderer.render_home().map_err(reject)?;
    Ok(warp::reply::html(html))
}

async fn ponies_page(raw: String, state: AppState) -> Result<impl Reply, Rejection> {
    let location = Location::new(Route::Ponies).with_params(QueryParams::parse(&raw));
    let view = state.session.show_ponies(location).await;
    let html = state.renderer.render_ponies(&view).map_err(reject)?;
    Ok(warp::reply::html(html))
}

async fn submit_search(body: SearchBody, state: AppState) -> Result<impl Reply, Rejection> {
    let next = state.session.submit_search(&body.query).await;
    see_other(&next)
}

async fn delete_pony(body: DeleteBody, state: AppState) -> Result<impl Reply, Rejection> {
    let id = PonyId::from(body.id);
    let outcome = state.session.delete(&id).await.map_err(reject)?;
    tracing::debug!(%id, ?outcome, "delete handled");
    see_other(&state.session.location())
}

async fn api_search(raw: String, state: AppState) -> Result<impl Reply, Rejection> {
    let params = QueryParams::parse(&raw);
    let query = params.get(QUERY_PARAM).unwrap_or_default();
    let ponies = state.service.search(query).await.map_err(reject)?;
    Ok(warp::reply::json(&ponies))
}

async fn api_delete(segment: String, state: AppState) -> Result<impl Reply, Rejection> {
    let id = decode_segment(&segment).map_err(reject)?;
    state.service.delete(&id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Percent-decode a path segment into an id
fn decode_segment(segment: &str) -> Result<PonyId, NavigationError> {
    urlencoding::decode(segment)
        .map(|id| PonyId::from(id.into_owned()))
        .map_err(|e| NavigationError::InvalidUrl {
            url: segment.to_string(),
            reason: e.to_string(),
        })
}

fn see_other(location: &Location) -> Result<impl Reply, Rejection> {
    let target = location.to_url();
    let uri: Uri = target
        .parse()
        .map_err(|_| reject(WebError::Redirect(target.clone())))?;
    Ok(warp::redirect::see_other(uri))
}
