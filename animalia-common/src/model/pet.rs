use crate::{model::Id, util::NonEmptyString};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use time::Date;

time::serde::format_description!(birth_day_format, Date, "[year]-[month]-[day]");

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PetMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    #[default]
    Dog,
    Cat,
}

impl Display for PetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PetType::Dog => "dog",
            PetType::Cat => "cat",
        })
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Id<PetMarker>,
    pub image_url: NonEmptyString,
    pub name: NonEmptyString,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    /// Backend species key, e.g. `shiba_inu` or `russian_blue`.
    pub species: NonEmptyString,
    #[serde(with = "birth_day_format")]
    pub birth_day: Date,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct PetsResponse {
    pub pets: Vec<Pet>,
}

/// Fields sent when registering or editing a pet.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PetDetails {
    pub name: NonEmptyString,
    pub pet_type: PetType,
    pub species: NonEmptyString,
    pub birth_day: Date,
}

impl PetDetails {
    #[must_use]
    pub fn birth_day_string(&self) -> String {
        let (year, month, day) = self.birth_day.to_calendar_date();
        format!("{year:04}-{:02}-{day:02}", u8::from(month))
    }
}
