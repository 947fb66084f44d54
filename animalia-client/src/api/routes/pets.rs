use crate::{api::ApiClient, error::Result, upload::ImageUpload};
use animalia_common::model::{
    Id,
    pet::{Pet, PetDetails, PetMarker, PetsResponse},
    user::UserMarker,
};
use reqwest::{Method, multipart::Form};

fn pet_form(details: PetDetails, image: Option<ImageUpload>) -> Result<Form> {
    let birth_day = details.birth_day_string();
    let mut form = Form::new()
        .text("name", details.name.into_inner())
        .text("type", details.pet_type.to_string())
        .text("species", details.species.into_inner())
        .text("birthDay", birth_day);

    if let Some(image) = image {
        form = form.part("image", image.into_part()?);
    }

    Ok(form)
}

impl ApiClient {
    pub async fn pets_of(&self, owner_id: Id<UserMarker>) -> Result<Vec<Pet>> {
        let path = "pets/owner";
        let builder = self
            .request(Method::GET, path)
            .query(&[("ownerId", owner_id.to_string())]);
        let response: PetsResponse = self.send(path, builder).await?;
        Ok(response.pets)
    }

    pub async fn register_pet(
        &self,
        owner_id: Id<UserMarker>,
        details: PetDetails,
        image: Option<ImageUpload>,
    ) -> Result<()> {
        let path = "pets/new";
        let form = pet_form(details, image)?.text("userId", owner_id.to_string());
        self.send_ignoring_body(path, self.request(Method::POST, path).multipart(form))
            .await
    }

    pub async fn update_pet(
        &self,
        pet_id: Id<PetMarker>,
        details: PetDetails,
        image: Option<ImageUpload>,
    ) -> Result<()> {
        let path = "pets/update";
        let form = pet_form(details, image)?.text("petId", pet_id.to_string());
        let builder = self
            .request(Method::PUT, path)
            .query(&[("petId", pet_id.to_string())])
            .multipart(form);
        self.send_ignoring_body(path, builder).await
    }

    pub async fn delete_pet(&self, pet_id: Id<PetMarker>) -> Result<()> {
        let path = "pets/delete";
        let builder = self
            .request(Method::DELETE, path)
            .query(&[("petId", pet_id.to_string())]);
        self.send_ignoring_body(path, builder).await
    }
}
