use relay::error::ServerError;
use relay::handlers::{default_router, register_defaults};
use relay::http::json::JsonValue;
use relay::http::parser::decode_request;
use relay::http::request::{Method, RequestBuilder};
use relay::http::response::{Payload, Response, StatusCode};
use relay::router::Router;

fn dispatch_raw(router: &Router, raw: &str) -> Result<Response, ServerError> {
    router.dispatch(&decode_request(raw.as_bytes()).unwrap())
}

#[test]
fn test_register_and_lookup() {
    let mut router = Router::new();
    router.route(Method::GET, "/test", |_| Ok(Response::ok("test")));

    assert!(router.contains(&Method::GET, "/test"));
    assert!(router.lookup(&Method::GET, "/test").is_some());
    assert!(router.lookup(&Method::POST, "/test").is_none());
    assert!(router.lookup(&Method::GET, "/test/").is_none());
    assert_eq!(router.len(), 1);
}

#[test]
fn test_register_same_route_twice_last_wins() {
    let mut router = Router::new();
    router.route(Method::GET, "/", |_| Ok(Response::ok("first")));
    router.route(Method::GET, "/", |_| Ok(Response::ok("second")));

    assert_eq!(router.len(), 1);
    let response = dispatch_raw(&router, "GET / HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(response.payload, Payload::Text("second".to_string()));
}

#[test]
fn test_other_method_on_registered_path_is_no_match() {
    let mut router = Router::new();
    router.route(Method::GET, "/only-get", |_| Ok(Response::ok("ok")));

    let err = dispatch_raw(&router, "POST /only-get HTTP/1.1\r\n\r\n").unwrap_err();
    assert!(matches!(err, ServerError::NoRouteMatch { .. }));
    assert_eq!(err.status(), Some(StatusCode::NotFound));
}

#[test]
fn test_custom_method_can_be_routed() {
    let mut router = Router::new();
    router.route(Method::Other("BREW".to_string()), "/pot", |_| {
        Ok(Response::text(StatusCode::Other(418), "teapot"))
    });

    let response = dispatch_raw(&router, "BREW /pot HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(response.status.as_u16(), 418);
}

#[test]
fn test_handler_error_is_handler_failure() {
    let mut router = Router::new();
    router.route(Method::GET, "/fail", |_| Err(anyhow::anyhow!("boom")));

    let err = dispatch_raw(&router, "GET /fail HTTP/1.1\r\n\r\n").unwrap_err();
    assert!(matches!(&err, ServerError::HandlerFailure(msg) if msg.contains("boom")));
    assert_eq!(err.status(), Some(StatusCode::InternalServerError));
}

#[test]
fn test_handler_panic_is_contained() {
    let mut router = Router::new();
    router.route(Method::GET, "/panic", |_| panic!("handler exploded"));

    let err = dispatch_raw(&router, "GET /panic HTTP/1.1\r\n\r\n").unwrap_err();
    assert!(matches!(&err, ServerError::HandlerFailure(msg) if msg.contains("handler exploded")));
}

#[test]
fn test_default_routes_registered() {
    let mut router = Router::new();
    register_defaults(&mut router);

    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ] {
        assert!(router.contains(&method, "/"), "missing {method} /");
    }
    assert_eq!(router.len(), 5);

    // Registering again keeps one handler per key
    register_defaults(&mut router);
    assert_eq!(router.len(), 5);
}

#[test]
fn test_default_get_and_delete() {
    let router = default_router();

    let get = dispatch_raw(&router, "GET / HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(get.status, StatusCode::Ok);
    assert_eq!(get.payload, Payload::Text("Received GET request".to_string()));

    let delete = dispatch_raw(&router, "DELETE / HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(
        delete.payload,
        Payload::Text("Received DELETE request".to_string())
    );
}

#[test]
fn test_default_plain_text_echo() {
    let router = default_router();

    for verb in ["POST", "PUT", "PATCH"] {
        let raw = format!("{verb} / HTTP/1.1\r\nContent-Length: 11\r\n\r\nHello World");
        let response = dispatch_raw(&router, &raw).unwrap();
        assert_eq!(
            response.payload,
            Payload::Text(format!("Received {verb} request with body: Hello World"))
        );
    }
}

#[test]
fn test_default_json_echo() {
    let router = default_router();
    let raw = "POST / HTTP/1.1\r\nContent-Type: application/json\r\n\r\n{\"message\":\"Hello World\"}";

    let response = dispatch_raw(&router, raw).unwrap();
    let Payload::Json(fields) = response.payload else {
        panic!("expected a JSON payload");
    };
    assert_eq!(fields["message"], JsonValue::from("Hello World"));
}

#[test]
fn test_default_multipart_echo() {
    let router = default_router();
    let raw = "PATCH / HTTP/1.1\r\nContent-Type: multipart/form-data; boundary=B\r\n\r\n--B\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nHello World\r\n--B--";

    let response = dispatch_raw(&router, raw).unwrap();
    let Payload::Multipart { form, files } = response.payload else {
        panic!("expected a multipart payload");
    };
    assert_eq!(form["text"], "Hello World");
    assert!(files.is_empty());
}

#[test]
fn test_builder_request_dispatch() {
    let router = default_router();
    let request = RequestBuilder::new()
        .method(Method::GET)
        .path("/missing")
        .build()
        .unwrap();

    assert!(matches!(
        router.dispatch(&request),
        Err(ServerError::NoRouteMatch { .. })
    ));
}
