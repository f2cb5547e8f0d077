//! User profile snapshot.

use serde::{Deserialize, Serialize};

/// Read-only profile snapshot fetched once after authentication.
///
/// The service returns `null` for unset fields; everything is optional
/// except the username.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Free-form "about" text.
    #[serde(default)]
    pub about: Option<String>,
    /// Avatar image URL.
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
    /// Birthday as reported by the service.
    #[serde(default)]
    pub birthday: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// Registered email addresses.
    #[serde(default)]
    pub emails: Vec<String>,
    /// First name.
    #[serde(rename = "firstname", default)]
    pub first_name: Option<String>,
    /// Gender code.
    #[serde(default)]
    pub gender: Option<String>,
    /// Homepage URL.
    #[serde(default)]
    pub homepage: Option<String>,
    /// Job title.
    #[serde(rename = "jobtitle", default)]
    pub job_title: Option<String>,
    /// Preferred language.
    #[serde(default)]
    pub language: Option<String>,
    /// Last name.
    #[serde(rename = "lastname", default)]
    pub last_name: Option<String>,
    /// Mood message.
    #[serde(default)]
    pub mood: Option<String>,
    /// Home phone number.
    #[serde(rename = "phoneHome", default)]
    pub phone_home: Option<String>,
    /// Mobile phone number.
    #[serde(rename = "phoneMobile", default)]
    pub phone_mobile: Option<String>,
    /// Office phone number.
    #[serde(rename = "phoneOffice", default)]
    pub phone_office: Option<String>,
    /// Province or state.
    #[serde(default)]
    pub province: Option<String>,
    /// Rich-text mood message.
    #[serde(rename = "richMood", default)]
    pub rich_mood: Option<String>,
    /// Account username, e.g. `live:someone`.
    #[serde(default)]
    pub username: String,
}
