//! A handful of Graph API resource shapes.
//!
//! Every field is optional: Facebook leaves out whatever the token isn't
//! allowed to see, or whatever wasn't requested through `fields`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mapper::{deserialize_data_list, deserialize_date};

/// Anything with an id. Also the shape of a publish response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacebookType {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFacebookType {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedFacebookType {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<NamedFacebookType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub updated_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub founded: Option<String>,
    #[serde(default)]
    pub company_overview: Option<String>,
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub products: Option<String>,
    #[serde(default)]
    pub fan_count: Option<i64>,
    #[serde(default)]
    pub likes: Option<i64>,
    #[serde(rename = "is_community_page", default)]
    pub community_page: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub checkins: Option<i64>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Page access token, present when listing the pages a user manages.
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from: Option<NamedFacebookType>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub created_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Comments {
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_data_list")]
    pub data: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub from: Option<CategorizedFacebookType>,
    #[serde(default, deserialize_with = "deserialize_data_list")]
    pub to: Vec<NamedFacebookType>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub comments: Option<Comments>,
    #[serde(default, deserialize_with = "deserialize_data_list")]
    pub actions: Vec<Action>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub updated_time: Option<DateTime<Utc>>,
}
