use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{associate::Associate, session::VotingSession, subject::Subject, vote::Vote};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Fails with a 500 if the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        req.guard::<&State<Database>>()
            .await
            .map(|db| Coll::from_db(db))
    }
}

impl MongoCollection for Associate {
    const NAME: &'static str = "associates";
}

impl MongoCollection for Subject {
    const NAME: &'static str = "subjects";
}

impl MongoCollection for VotingSession {
    const NAME: &'static str = "sessions";
}

impl MongoCollection for Vote {
    const NAME: &'static str = "votes";
}

/// Ensure that all the required indexes exist on the given database.
///
/// These are what actually enforce uniqueness: the existence checks made by
/// the handlers only produce friendlier errors in the common case.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // One associate per CPF.
    let associate_index = IndexModel::builder()
        .keys(doc! {"cpf": 1})
        .options(unique.clone())
        .build();
    Coll::<Associate>::from_db(db)
        .create_index(associate_index, None)
        .await?;

    // One subject per code.
    let subject_index = IndexModel::builder()
        .keys(doc! {"code": 1})
        .options(unique.clone())
        .build();
    Coll::<Subject>::from_db(db)
        .create_index(subject_index, None)
        .await?;

    // One session per subject, ever.
    let session_index = IndexModel::builder()
        .keys(doc! {"subject.code": 1})
        .options(unique.clone())
        .build();
    Coll::<VotingSession>::from_db(db)
        .create_index(session_index, None)
        .await?;

    // One vote per associate per session.
    let vote_index = IndexModel::builder()
        .keys(doc! {"associate_id": 1, "session_id": 1})
        .options(unique.clone())
        .build();
    Coll::<Vote>::from_db(db)
        .create_index(vote_index, None)
        .await?;

    // Results are tallied by subject code.
    let tally_index = IndexModel::builder()
        .keys(doc! {"subject_code": 1, "cpf": 1})
        .build();
    Coll::<Vote>::from_db(db)
        .create_index(tally_index, None)
        .await?;

    Ok(())
}
