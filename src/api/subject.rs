use log::{info, warn};
use mongodb::options::FindOptions;
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::subject::{SubjectDescription, SubjectRequest},
    db::subject::Subject,
    mongodb::{map_duplicate_key, Coll},
};

pub fn routes() -> Vec<Route> {
    routes![subject, subjects, create_subject, create_subject_unsupported]
}

#[get("/subject/<code>")]
async fn subject(code: &str, subjects: Coll<Subject>) -> Result<Json<SubjectDescription>> {
    info!("Finding subject by code {code}");
    let subject = subjects
        .find_one(Subject::code_filter(code), None)
        .await?
        .ok_or_else(|| Error::not_found("Subject"))?;
    Ok(Json(subject.into()))
}

#[get("/subject")]
async fn subjects(subjects: Coll<Subject>) -> Result<Json<Vec<SubjectDescription>>> {
    let options = FindOptions::builder().sort(Subject::sort_order()).build();
    let subjects = subjects
        .find(None, options)
        .await?
        .try_collect::<Vec<_>>()
        .await?;
    info!("Found {} subjects", subjects.len());

    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

#[post("/subject", data = "<request>", format = "json")]
async fn create_subject(
    request: Json<SubjectRequest>,
    subjects: Coll<Subject>,
) -> Result<Json<SubjectDescription>> {
    let subject = Subject::new(request.into_inner().validate()?);

    if subjects
        .find_one(Subject::code_filter(&subject.code), None)
        .await?
        .is_some()
    {
        warn!("Subject code {} already registered", subject.code);
        return Err(Error::subject_code_already_registered());
    }
    subjects
        .insert_one(&subject, None)
        .await
        .map_err(|e| map_duplicate_key(e, Error::subject_code_already_registered))?;
    info!("Registered subject {}", subject.code);

    Ok(Json(subject.into()))
}

#[post("/subject", rank = 2)]
fn create_subject_unsupported() -> Error {
    Error::unsupported_media_type()
}
