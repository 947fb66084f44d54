use crate::{
    api::ApiClient,
    error::Result,
    queries::{Queries, QueryKey},
    session::Session,
    upload::ImageUpload,
};
use animalia_common::model::{
    Id,
    pet::{Pet, PetDetails, PetMarker},
    user::UserMarker,
};
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Debug)]
pub struct Pets {
    api: ApiClient,
    session: Session,
    queries: Arc<Queries>,
}

impl Pets {
    #[must_use]
    pub fn new(api: ApiClient, session: Session, queries: Arc<Queries>) -> Self {
        Self {
            api,
            session,
            queries,
        }
    }

    pub async fn pets_of(&self, owner_id: Id<UserMarker>) -> Result<Vec<Pet>> {
        let key = QueryKey::Pets(owner_id);
        if !self.queries.pets.is_stale(&key)
            && let Some(pets) = self.queries.pets.get(&key)
        {
            return Ok(pets);
        }

        let ticket = self.queries.pets.begin_fetch(key.clone());
        let pets = self.api.pets_of(owner_id).await?;
        self.queries.pets.commit_replace(&ticket, key, pets.clone());
        Ok(pets)
    }

    /// The current user's pets.
    pub async fn mine(&self) -> Result<Vec<Pet>> {
        let owner_id = self.session.current_user_id().await?;
        self.pets_of(owner_id).await
    }

    pub async fn register(&self, details: PetDetails, image: Option<ImageUpload>) -> Result<()> {
        let owner_id = self.session.current_user_id().await?;
        self.api.register_pet(owner_id, details, image).await?;
        info!(%owner_id, "Registered pet");
        self.invalidate(owner_id);
        Ok(())
    }

    pub async fn update(
        &self,
        pet_id: Id<PetMarker>,
        details: PetDetails,
        image: Option<ImageUpload>,
    ) -> Result<()> {
        let owner_id = self.session.current_user_id().await?;
        self.api.update_pet(pet_id, details, image).await?;
        info!(%pet_id, "Updated pet");
        self.invalidate(owner_id);
        Ok(())
    }

    pub async fn delete(&self, pet_id: Id<PetMarker>) -> Result<()> {
        let owner_id = self.session.current_user_id().await?;
        self.api.delete_pet(pet_id).await?;
        info!(%pet_id, "Deleted pet");
        self.invalidate(owner_id);
        Ok(())
    }

    fn invalidate(&self, owner_id: Id<UserMarker>) {
        self.queries.pets.invalidate(&QueryKey::Pets(owner_id));
        self.queries.users.invalidate(&QueryKey::CurrentUser);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::ClientError,
        queries::QueryKey,
        test_support::{self, profile, user_base},
    };
    use animalia_common::{
        model::{
            Id,
            pet::{PetDetails, PetMarker, PetType},
        },
        util::NonEmptyString,
    };
    use axum::{
        Json, Router,
        extract::{Multipart, Query},
        http::StatusCode,
        routing::{delete, get, post},
    };
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };
    use time::macros::date;

    fn pet_json(name: &str) -> serde_json::Value {
        json!({
            "id": Id::<PetMarker>::new_random(),
            "imageUrl": "https://cdn.example/pets/1.jpg",
            "name": name,
            "type": "cat",
            "species": "russian_blue",
            "birthDay": "2021-02-22",
        })
    }

    #[tokio::test]
    async fn pets_are_cached_per_owner_until_a_change() {
        let me = profile(user_base("mike"));
        let me_id = me.id();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new()
            .route(
                "/pets/owner",
                get(move |Query(query): Query<HashMap<String, String>>| {
                    assert_eq!(query.get("ownerId"), Some(&me_id.to_string()));
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Json(json!({ "pets": [pet_json("Tama")] })) }
                }),
            )
            .route(
                "/pets/new",
                post(move |mut form: Multipart| async move {
                    let mut fields = HashMap::new();
                    while let Some(field) = form.next_field().await.unwrap() {
                        let name = field.name().unwrap().to_owned();
                        fields.insert(name, field.text().await.unwrap());
                    }
                    assert_eq!(fields["name"], "Pochi");
                    assert_eq!(fields["type"], "dog");
                    assert_eq!(fields["species"], "shiba_inu");
                    assert_eq!(fields["birthDay"], "2020-04-01");
                    assert_eq!(fields["userId"], me_id.to_string());
                    StatusCode::OK
                }),
            );
        let (client, _) = test_support::signed_in(router, &me).await;
        let pets = client.pets();

        let mine = pets.mine().await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].pet_type, PetType::Cat);
        pets.mine().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        pets.register(
            PetDetails {
                name: NonEmptyString::new_unchecked("Pochi"),
                pet_type: PetType::Dog,
                species: NonEmptyString::new_unchecked("shiba_inu"),
                birth_day: date!(2020 - 04 - 01),
            },
            None,
        )
        .await
        .unwrap();
        assert!(client.queries().pets.is_stale(&QueryKey::Pets(me_id)));

        pets.mine().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_pet_is_a_decode_error() {
        let me = profile(user_base("mike"));
        let router = Router::new().route(
            "/pets/owner",
            get(|| async {
                let mut pet = pet_json("Tama");
                pet["type"] = json!("hamster");
                Json(json!({ "pets": [pet] }))
            }),
        );
        let (client, _) = test_support::signed_in(router, &me).await;

        let result = client.pets().mine().await;
        assert!(matches!(result, Err(ClientError::Decode { .. })));
    }

    #[tokio::test]
    async fn delete_pet_by_id() {
        let me = profile(user_base("mike"));
        let pet_id: Id<PetMarker> = Id::new_random();
        let router = Router::new().route(
            "/pets/delete",
            delete(move |Query(query): Query<HashMap<String, String>>| async move {
                assert_eq!(query.get("petId"), Some(&pet_id.to_string()));
                StatusCode::OK
            }),
        );
        let (client, _) = test_support::signed_in(router, &me).await;
        client.pets().delete(pet_id).await.unwrap();
    }
}
