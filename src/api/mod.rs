use rocket::{Catcher, Route};

mod associate;
mod catchers;
mod fallback;
mod session;
mod subject;
mod vote;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(associate::routes());
    routes.extend(subject::routes());
    routes.extend(session::routes());
    routes.extend(vote::routes());
    routes.extend(fallback::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers::catchers()
}
