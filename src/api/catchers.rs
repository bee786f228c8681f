use log::{error, warn};
use rocket::{
    http::{Status, StatusClass},
    serde::json::Json,
    Catcher, Request,
};

use crate::error::ErrorBody;

pub fn catchers() -> Vec<Catcher> {
    catchers![bad_request, not_found, unprocessable_entity, internal_error, default_catcher]
}

type CaughtError = (Status, Json<ErrorBody>);

fn caught(status: Status, message: &str, req: &Request<'_>) -> CaughtError {
    let log_msg = format!("HTTP Status: {status} - Error Message: {message} ({} {})", req.method(), req.uri());
    match status.class() {
        StatusClass::ServerError => error!("{log_msg}"),
        _ => warn!("{log_msg}"),
    }
    (status, Json(ErrorBody::new(status, message)))
}

/// Unparseable request bodies.
#[catch(400)]
fn bad_request(req: &Request<'_>) -> CaughtError {
    caught(Status::BadRequest, "Invalid Request", req)
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> CaughtError {
    caught(Status::NotFound, "Resource not found", req)
}

/// Well-formed JSON of the wrong shape, e.g. a string where a boolean belongs.
/// Reported like any other invalid request.
#[catch(422)]
fn unprocessable_entity(req: &Request<'_>) -> CaughtError {
    caught(Status::BadRequest, "Invalid Request", req)
}

#[catch(500)]
fn internal_error(req: &Request<'_>) -> CaughtError {
    caught(Status::InternalServerError, "Internal Server Error", req)
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request<'_>) -> CaughtError {
    caught(status, status.reason_lossy(), req)
}

#[cfg(test)]
mod tests {
    use mongodb::Database;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::error::ErrorBody;

    #[backend_test]
    async fn unknown_route_is_json_404(client: Client, _db: Database) {
        let response = client.get("/nowhere/at/all").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: ErrorBody = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(404, body.status);
    }

    #[backend_test]
    async fn malformed_json_is_400(client: Client, _db: Database) {
        let response = client
            .post("/associate")
            .header(ContentType::JSON)
            .body("{ not json")
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(400, body.status);
        assert_eq!("Invalid Request", body.message);
    }

    #[backend_test]
    async fn mistyped_json_is_400(client: Client, _db: Database) {
        let response = client
            .post("/vote")
            .header(ContentType::JSON)
            .body(r#"{"cpf": "12345678901", "subjectCode": "VOTE-1", "option": "yes"}"#)
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(400, body.status);
        assert_eq!("Invalid Request", body.message);
    }

    #[backend_test]
    async fn non_json_post_is_400(client: Client, _db: Database) {
        let response = client
            .post("/subject")
            .header(ContentType::Plain)
            .body("title=Vote 1")
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!("Supported content types: application/json", body.message);
    }
}
