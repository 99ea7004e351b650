use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A user as returned by `GET /users`. Only `id` is required; every other
/// field may be absent in the payload and deserializes to its default so a
/// sparse record never fails the whole list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub company: Option<Company>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub name: Option<String>,
}

/// A post as returned by `GET /posts?userId=<id>`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Sort criteria for the user view. The dotted form names a nested field and
/// is resolved by navigating the structure; a missing field orders as the
/// empty string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Name,
    CompanyName,
}

impl SortKey {
    /// Resolve the field this key sorts by for the given user
    #[must_use]
    pub fn field_of<'a>(&self, user: &'a User) -> &'a str {
        match self {
            Self::Name => user.name.as_deref().unwrap_or(""),
            Self::CompanyName => user
                .company
                .as_ref()
                .and_then(|company| company.name.as_deref())
                .unwrap_or(""),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CompanyName => "company.name",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "name" => Ok(Self::Name),
            "company.name" => Ok(Self::CompanyName),
            _ => Err(format!("unknown sort key: {key}")),
        }
    }
}
