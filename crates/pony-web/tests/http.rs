//! HTTP surface tests
//!
//! Requests go through the full filter stack with `warp::test`, no socket.

use pony_core::{InMemoryPonyService, Pony, PonyColor, PonyId, Route, ServiceError};
use pony_test_utils::{blue_mystery, purple_rain, two_ponies, ScriptedPonyService};
use pony_web::{app, AppState};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use warp::http::{Response, StatusCode};
use warp::hyper::body::Bytes;
use warp::test::request;

fn seeded() -> AppState {
    let service = assert_ok!(InMemoryPonyService::with_ponies(two_ponies()))
        .with_latency(Duration::from_millis(100));
    assert_ok!(AppState::new(Arc::new(service)))
}

fn scripted() -> (Arc<ScriptedPonyService>, AppState) {
    let service = Arc::new(ScriptedPonyService::new());
    let state = assert_ok!(AppState::new(service.clone()));
    (service, state)
}

fn body(res: &Response<Bytes>) -> String {
    String::from_utf8_lossy(res.body()).into_owned()
}

fn location(res: &Response<Bytes>) -> &str {
    res.headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test(start_paused = true)]
async fn landing_page_links_to_ponies() {
    let filter = app(seeded(), None);

    let res = request().path("/").reply(&filter).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body(&res).contains(r#"href="/ponies""#));
}

#[tokio::test(start_paused = true)]
async fn list_view_prefills_the_query_and_renders_rows() {
    let filter = app(seeded(), None);

    let res = request().path("/ponies?query=rain").reply(&filter).await;
    let html = body(&res);

    assert_eq!(res.status(), StatusCode::OK);
    assert!(html.contains(r#"id="query" name="query" type="text" value="rain""#));
    assert!(html.contains(r#"data-id="p2""#));
    assert!(!html.contains(r#"data-id="p1""#));
    assert_eq!(html.matches("delete-button").count(), 1);
}

#[tokio::test(start_paused = true)]
async fn list_view_without_query_never_calls_the_backend() {
    let (service, state) = scripted();
    let filter = app(state, None);

    let res = request().path("/ponies").reply(&filter).await;
    let html = body(&res);

    assert_eq!(res.status(), StatusCode::OK);
    assert!(html.contains("status-idle"));
    assert!(!html.contains("delete-button"));
    assert!(service.search_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn search_form_redirects_to_the_trimmed_query() {
    let filter = app(seeded(), None);
    request().path("/ponies").reply(&filter).await;

    let res = request()
        .method("POST")
        .path("/ponies/search")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("query=+blue+")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/ponies?query=blue");

    let html = body(&request().path(location(&res)).reply(&filter).await);
    assert!(html.contains(r#"data-id="p1""#));
    assert_eq!(html.matches("delete-button").count(), 1);
}

#[tokio::test(start_paused = true)]
async fn delete_then_render_shows_the_remaining_pony() {
    let (service, state) = scripted();
    let filter = app(state, None);

    let get = {
        let filter = filter.clone();
        tokio::spawn(async move { request().path("/ponies?query=").reply(&filter).await })
    };
    service.next_search().await.respond(two_ponies());
    let html = body(&get.await.unwrap());
    assert_eq!(html.matches("delete-button").count(), 2);

    let delete = {
        let filter = filter.clone();
        tokio::spawn(async move {
            request()
                .method("POST")
                .path("/ponies/delete")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("id=p1")
                .reply(&filter)
                .await
        })
    };
    let call = service.next_delete().await;
    assert_eq!(call.id, PonyId::from("p1"));
    call.complete();
    service.next_search().await.respond(vec![purple_rain()]);

    let res = delete.await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/ponies?query=");

    let html = body(&request().path("/ponies?query=").reply(&filter).await);
    assert!(html.contains(r#"data-id="p2""#));
    assert!(!html.contains(r#"data-id="p1""#));

    assert_eq!(service.delete_calls(), vec![PonyId::from("p1")]);
    assert_eq!(service.search_calls(), vec!["", ""]);
}

#[tokio::test(start_paused = true)]
async fn deleting_an_unrendered_pony_is_not_found() {
    let filter = app(seeded(), None);
    request().path("/ponies?query=rain").reply(&filter).await;

    let res = request()
        .method("POST")
        .path("/ponies/delete")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("id=p1")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body(&res).contains("pony not found: p1"));
}

#[tokio::test(start_paused = true)]
async fn api_searches_and_deletes() {
    let filter = app(seeded(), None);

    let res = request().path("/api/ponies?query=MYST").reply(&filter).await;
    assert_eq!(res.status(), StatusCode::OK);
    let found: Vec<Pony> = assert_ok!(serde_json::from_slice(res.body()));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, PonyId::from("p1"));

    let res = request()
        .method("DELETE")
        .path("/api/ponies/p1")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = request().path("/api/ponies").reply(&filter).await;
    let remaining: Vec<Pony> = assert_ok!(serde_json::from_slice(res.body()));
    assert_eq!(remaining, vec![purple_rain()]);
}

#[tokio::test(start_paused = true)]
async fn api_surfaces_backend_failures() {
    let (service, state) = scripted();
    let filter = app(state, None);

    let search = {
        let filter = filter.clone();
        tokio::spawn(async move { request().path("/api/ponies?query=b").reply(&filter).await })
    };
    service
        .next_search()
        .await
        .fail(ServiceError::Timeout { duration_ms: 100 });

    let res = search.await.unwrap();
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn unknown_paths_and_unconfigured_images_are_not_found() {
    let filter = app(seeded(), None);

    let res = request().path("/horses").reply(&filter).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = request().path("/images/pony-blue.gif").reply(&filter).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn leaving_for_home_abandons_the_page() {
    let state = seeded();
    let filter = app(state.clone(), None);
    request().path("/ponies?query=").reply(&filter).await;

    request().path("/").reply(&filter).await;

    assert_eq!(state.session().location().route, Route::Home);
    // A later search still works against the same backend.
    let html = body(&request().path("/ponies?query=").reply(&filter).await);
    assert_eq!(html.matches("delete-button").count(), 2);
}

#[tokio::test(start_paused = true)]
async fn reload_drops_ponies_deleted_through_the_api() {
    let filter = app(seeded(), None);
    let html = body(&request().path("/ponies?query=").reply(&filter).await);
    assert_eq!(html.matches("delete-button").count(), 2);

    let res = request()
        .method("DELETE")
        .path("/api/ponies/p1")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let html = body(&request().path("/ponies?query=").reply(&filter).await);
    assert_eq!(html.matches("delete-button").count(), 1);
    assert!(!html.contains(r#"data-id="p1""#));
}

#[tokio::test(start_paused = true)]
async fn reload_retries_a_failed_search() {
    let (service, state) = scripted();
    let filter = app(state, None);

    let first = {
        let filter = filter.clone();
        tokio::spawn(async move { request().path("/ponies?query=b").reply(&filter).await })
    };
    service
        .next_search()
        .await
        .fail(ServiceError::Unavailable("down".to_string()));
    assert!(body(&first.await.unwrap()).contains("status-failed"));

    let reload = {
        let filter = filter.clone();
        tokio::spawn(async move { request().path("/ponies?query=b").reply(&filter).await })
    };
    service.next_search().await.respond(vec![blue_mystery()]);
    let html = body(&reload.await.unwrap());

    assert!(!html.contains("status-failed"));
    assert!(html.contains(r#"data-id="p1""#));
    assert_eq!(service.search_calls(), vec!["b", "b"]);
}

#[tokio::test(start_paused = true)]
async fn api_delete_decodes_the_id() {
    let service = assert_ok!(InMemoryPonyService::with_ponies(vec![
        Pony::new("p 1", "Blue mystery", PonyColor::Blue),
        purple_rain(),
    ]));
    let filter = app(assert_ok!(AppState::new(Arc::new(service))), None);

    let res = request()
        .method("DELETE")
        .path("/api/ponies/p%201")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = request().path("/api/ponies?query=").reply(&filter).await;
    let remaining: Vec<Pony> = assert_ok!(serde_json::from_slice(res.body()));
    assert_eq!(remaining, vec![purple_rain()]);
}
