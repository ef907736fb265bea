//! Default routes on `/`.
//!
//! `GET` and `DELETE` answer with a fixed line. `POST`, `PUT` and `PATCH` echo
//! the body back in the shape it arrived in.

use crate::http::request::{Body, Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::router::Router;

pub fn register_defaults(router: &mut Router) {
    router
        .route(Method::GET, "/", |_| Ok(Response::ok("Received GET request")))
        .route(Method::POST, "/", |req| Ok(echo("POST", req)))
        .route(Method::PUT, "/", |req| Ok(echo("PUT", req)))
        .route(Method::PATCH, "/", |req| Ok(echo("PATCH", req)))
        .route(Method::DELETE, "/", |_| Ok(Response::ok("Received DELETE request")));
}

/// Router with the default routes already registered.
pub fn default_router() -> Router {
    let mut router = Router::new();
    register_defaults(&mut router);
    router
}

fn echo(verb: &str, req: &Request) -> Response {
    match &req.body {
        Body::Json(fields) => Response::json(StatusCode::Ok, fields.clone()),
        Body::Multipart(form) => {
            Response::multipart(StatusCode::Ok, form.fields.clone(), form.files.clone())
        }
        Body::Opaque => Response::ok(format!(
            "Received {verb} request with body: {}",
            req.raw_body
        )),
    }
}
