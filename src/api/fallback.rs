use rocket::{http::Method, Route};

use crate::error::Error;

pub fn routes() -> Vec<Route> {
    routes![get_fallback, post_fallback, put_fallback, delete_fallback, patch_fallback]
}

/// The methods each resource answers to.
const RESOURCES: &[(&str, &[Method])] = &[
    ("associate", &[Method::Get, Method::Post]),
    ("subject", &[Method::Get, Method::Post]),
    ("session", &[Method::Get, Method::Post]),
    ("vote", &[Method::Post]),
];

/// 405 for a known resource hit with a method it does not support. Anything
/// else is left to the 404 catcher.
fn method_not_allowed(method: Method, resource: &str) -> Option<Error> {
    let (_, allowed) = RESOURCES.iter().find(|(name, _)| *name == resource)?;
    (!allowed.contains(&method)).then(|| Error::method_not_allowed(method))
}

#[get("/<resource>/<_..>", rank = 20)]
fn get_fallback(resource: &str) -> Option<Error> {
    method_not_allowed(Method::Get, resource)
}

#[post("/<resource>/<_..>", rank = 20)]
fn post_fallback(resource: &str) -> Option<Error> {
    method_not_allowed(Method::Post, resource)
}

#[put("/<resource>/<_..>", rank = 20)]
fn put_fallback(resource: &str) -> Option<Error> {
    method_not_allowed(Method::Put, resource)
}

#[delete("/<resource>/<_..>", rank = 20)]
fn delete_fallback(resource: &str) -> Option<Error> {
    method_not_allowed(Method::Delete, resource)
}

#[patch("/<resource>/<_..>", rank = 20)]
fn patch_fallback(resource: &str) -> Option<Error> {
    method_not_allowed(Method::Patch, resource)
}
