//! Route groups: prefix concatenation, middleware accumulation, nesting
//! and the CORS policy applied through a group.


use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::Method;
use routrie::middleware::CorsConfig;
use routrie::server::RecordedResponse;
use routrie::{handler, DefaultResponder, HandlerFunc, Request, RequestContext, Responder, Router};

fn respond_with(status: u16, message: &str) -> HandlerFunc {
    let message = message.to_string();
    handler(move |_ctx: &mut RequestContext<'_>| {
        Some(Arc::new(DefaultResponder::new(status, message.clone())) as Arc<dyn Responder>)
    })
}

fn marker(trace: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> HandlerFunc {
    let trace = trace.clone();
    handler(move |_ctx: &mut RequestContext<'_>| {
        trace.lock().unwrap().push(name);
        None
    })
}

fn serve(router: &Router, request: Request) -> RecordedResponse {
    let mut response = RecordedResponse::new();
    router.serve(&request, &mut response);
    response
}

#[test]
fn sibling_groups_route_independently() {
    tracing_util::init();
    let mut router = Router::new();

    let mut api = router.group("/api", vec![]);
    api.handle(Method::GET, "/foo", vec![respond_with(200, "hello world")]);
    api.handle(Method::PUT, "/bar", vec![respond_with(200, "hello world")]);

    let mut internal = router.group("/internal", vec![]);
    internal.handle(Method::GET, "/foo", vec![respond_with(200, "hello internal")]);

    assert_eq!(
        serve(&router, Request::new(Method::GET, "/api/foo")).body_str(),
        "hello world"
    );
    assert_eq!(
        serve(&router, Request::new(Method::GET, "/internal/foo")).body_str(),
        "hello internal"
    );
    // The group prefix alone is not a route.
    assert_eq!(serve(&router, Request::new(Method::GET, "/api")).status, 404);
}

#[test]
fn nested_groups_concatenate_prefixes_and_middleware() {
    tracing_util::init();
    let trace: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let mut router = Router::new();
    let mut api = router.group("/api", vec![marker(&trace, "outer")]);
    let mut v1 = api.group("/v1", vec![marker(&trace, "inner")]);
    let t = trace.clone();
    v1.handle(
        Method::GET,
        "/users",
        vec![handler(move |_ctx: &mut RequestContext<'_>| {
            t.lock().unwrap().push("handler");
            Some(Arc::new(DefaultResponder::new(200, "users")) as Arc<dyn Responder>)
        })],
    );

    let response = serve(&router, Request::new(Method::GET, "/api/v1/users"));
    assert_eq!(response.status, 200);
    assert_eq!(*trace.lock().unwrap(), ["outer", "inner", "handler"]);
}

#[test]
fn group_middleware_can_reject_before_the_terminal() {
    tracing_util::init();
    let auth = handler(|ctx: &mut RequestContext<'_>| {
        if ctx.request.header("x-test-auth") == Some("yes") {
            None
        } else {
            Some(Arc::new(DefaultResponder::new(401, "unauthorized")) as Arc<dyn Responder>)
        }
    });

    let mut router = Router::new();
    let mut secured = router.group("/admin", vec![auth]);
    secured.handle(Method::GET, "/panel", vec![respond_with(200, "panel")]);

    let denied = serve(&router, Request::new(Method::GET, "/admin/panel"));
    assert_eq!(denied.status, 401);
    assert_eq!(denied.body_str(), "unauthorized");

    let allowed = serve(
        &router,
        Request::new(Method::GET, "/admin/panel").with_header("X-Test-Auth", "yes"),
    );
    assert_eq!(allowed.status, 200);
    assert_eq!(allowed.body_str(), "panel");
}

#[test]
fn group_handle_with_empty_path_registers_the_prefix() {
    tracing_util::init();
    let mut router = Router::new();
    let mut api = router.group("/api", vec![]);
    api.handle(Method::GET, "", vec![respond_with(200, "root")]);

    assert_eq!(
        serve(&router, Request::new(Method::GET, "/api")).body_str(),
        "root"
    );
}

#[test]
#[should_panic(expected = "group prefix cannot end with '*'")]
fn group_prefix_ending_in_star_panics() {
    let mut router = Router::new();
    let _ = router.group("/api*", vec![]);
}

#[test]
#[should_panic(expected = "group prefix cannot end with '*'")]
fn nested_group_prefix_ending_in_star_panics() {
    let mut router = Router::new();
    let mut api = router.group("/api", vec![]);
    let _ = api.group("/files*", vec![]);
}

#[test]
#[should_panic(expected = "route path cannot be empty")]
fn empty_prefix_and_path_panics() {
    let mut router = Router::new();
    let mut root = router.group("", vec![]);
    root.handle(Method::GET, "", vec![respond_with(200, "ok")]);
}

#[test]
fn cors_applied_through_a_group() {
    tracing_util::init();
    let cors = CorsConfig::builder()
        .allow_host("example.com")
        .allow_method(Method::GET)
        .allow_method(Method::POST)
        .allow_header("Content-Type")
        .max_age(Duration::from_secs(600))
        .build()
        .expect("valid cors config");

    let mut router = Router::new();
    let mut api = router.group("/api", vec![]);
    let mut protected = cors.apply(&mut api);
    protected.handle(Method::GET, "/data", vec![respond_with(200, "data")]);

    // Preflight terminates with 204 and the policy headers.
    let preflight = serve(
        &router,
        Request::new(Method::OPTIONS, "/api/data").with_header("Origin", "https://example.com"),
    );
    assert_eq!(preflight.status, 204);
    assert_eq!(
        preflight.header("Access-Control-Allow-Origin"),
        Some("https://example.com")
    );
    assert_eq!(
        preflight.header("Access-Control-Allow-Methods"),
        Some("GET, POST")
    );
    assert_eq!(preflight.header("Access-Control-Max-Age"), Some("600"));

    // Actual request: headers stamped, chain continues to the handler.
    let actual = serve(
        &router,
        Request::new(Method::GET, "/api/data").with_header("Origin", "https://example.com"),
    );
    assert_eq!(actual.status, 200);
    assert_eq!(actual.body_str(), "data");
    assert_eq!(
        actual.header("Access-Control-Allow-Origin"),
        Some("https://example.com")
    );
    assert_eq!(actual.header("Vary"), Some("Origin"));

    // Disallowed origin is rejected before the handler.
    let rejected = serve(
        &router,
        Request::new(Method::GET, "/api/data").with_header("Origin", "https://evil.com"),
    );
    assert_eq!(rejected.status, 403);
    assert_eq!(rejected.body_str(), "cors forbidden");

    // No Origin header: not a CORS request, pass through untouched.
    let plain = serve(&router, Request::new(Method::GET, "/api/data"));
    assert_eq!(plain.status, 200);
    assert_eq!(plain.header("Access-Control-Allow-Origin"), None);
}
