use log::{info, warn};
use mongodb::options::FindOptions;
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::associate::{AssociateDescription, AssociateRequest},
    db::associate::Associate,
    mongodb::{map_duplicate_key, Coll},
};

pub fn routes() -> Vec<Route> {
    routes![
        associate,
        associates,
        register_associate,
        register_associate_unsupported,
    ]
}

#[get("/associate/<cpf>")]
async fn associate(cpf: &str, associates: Coll<Associate>) -> Result<Json<AssociateDescription>> {
    info!("Finding associate by CPF {cpf}");
    let associate = associates
        .find_one(Associate::cpf_filter(cpf), None)
        .await?
        .ok_or_else(|| Error::not_found("Associate"))?;
    Ok(Json(associate.into()))
}

#[get("/associate")]
async fn associates(associates: Coll<Associate>) -> Result<Json<Vec<AssociateDescription>>> {
    let options = FindOptions::builder()
        .sort(Associate::sort_order())
        .build();
    let associates = associates
        .find(None, options)
        .await?
        .try_collect::<Vec<_>>()
        .await?;
    info!("Found {} associates", associates.len());

    Ok(Json(associates.into_iter().map(Into::into).collect()))
}

#[post("/associate", data = "<request>", format = "json")]
async fn register_associate(
    request: Json<AssociateRequest>,
    associates: Coll<Associate>,
) -> Result<Json<AssociateDescription>> {
    let associate = Associate::new(request.into_inner().validate()?);

    if associates
        .find_one(Associate::cpf_filter(&associate.cpf), None)
        .await?
        .is_some()
    {
        warn!("Associate {} already registered", associate.cpf);
        return Err(Error::associate_already_registered());
    }
    // The unique index has the final say if another request got in first.
    associates
        .insert_one(&associate, None)
        .await
        .map_err(|e| map_duplicate_key(e, Error::associate_already_registered))?;
    info!("Registered associate {}", associate.cpf);

    Ok(Json(associate.into()))
}

#[post("/associate", rank = 2)]
fn register_associate_unsupported() -> Error {
    Error::unsupported_media_type()
}

#[cfg(test)]
mod tests {
    use mongodb::{bson::doc, Database};
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json,
    };

    use super::*;
    use crate::error::ErrorBody;
    use crate::model::db::associate::AssociateCore;

    async fn post_associate<'c>(
        client: &'c Client,
        request: &AssociateRequest,
    ) -> LocalResponse<'c> {
        client
            .post(uri!(register_associate))
            .header(ContentType::JSON)
            .body(serde_json::to_string(request).unwrap())
            .dispatch()
            .await
    }

    #[backend_test]
    async fn register(client: Client, associates: Coll<Associate>) {
        let response = post_associate(&client, &AssociateRequest::example()).await;
        assert_eq!(Status::Ok, response.status());

        let raw_response = response.into_string().await.unwrap();
        let description = serde_json::from_str::<AssociateDescription>(&raw_response).unwrap();
        assert_eq!("12345678901", description.cpf);
        assert_eq!("Maria", description.first_name);

        let stored = associates
            .find_one(Associate::cpf_filter("12345678901"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!("Silva", stored.last_name);
    }

    #[backend_test]
    async fn register_twice(client: Client, associates: Coll<Associate>) {
        let response = post_associate(&client, &AssociateRequest::example()).await;
        assert_eq!(Status::Ok, response.status());

        let response = post_associate(&client, &AssociateRequest::example()).await;
        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!("Associate already registered", body.message);

        let count = associates
            .count_documents(doc! { "cpf": "12345678901" }, None)
            .await
            .unwrap();
        assert_eq!(1, count);
    }

    #[backend_test]
    async fn register_invalid(client: Client, associates: Coll<Associate>) {
        let request = AssociateRequest {
            first_name: Some(" ".to_string()),
            cpf: Some("123".to_string()),
            ..AssociateRequest::example()
        };
        let response = post_associate(&client, &request).await;
        assert_eq!(Status::BadRequest, response.status());

        let body: ErrorBody = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!("Invalid Request", body.message);
        assert_eq!(
            Some(vec![
                "firstName: First name is required.".to_string(),
                "cpf: Attribute CPF must have 11 digits.".to_string(),
            ]),
            body.errors
        );
        assert_eq!(0, associates.count_documents(None, None).await.unwrap());
    }

    #[backend_test(associate)]
    async fn find_by_cpf(client: Client) {
        let response = client.get(uri!(associate("12345678901"))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let description: AssociateDescription =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!("Maria", description.first_name);

        let response = client.get(uri!(associate("10987654321"))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: ErrorBody = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!("Associate not found", body.message);
    }

    #[backend_test]
    async fn list_sorted_by_name(client: Client, associates: Coll<Associate>) {
        associates
            .insert_many(
                [
                    Associate::new(AssociateCore::example()),
                    Associate::new(AssociateCore::example2()),
                    Associate::new(AssociateCore::example3()),
                ],
                None,
            )
            .await
            .unwrap();

        let response = client.get(uri!(associates)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let fetched: Vec<AssociateDescription> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let names: Vec<_> = fetched.iter().map(|a| a.first_name.as_str()).collect();
        assert_eq!(vec!["Ana", "Joao", "Maria"], names);
    }

    #[backend_test]
    async fn list_empty(client: Client, _db: Database) {
        let response = client.get(uri!(associates)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!("[]", response.into_string().await.unwrap());
    }
}
