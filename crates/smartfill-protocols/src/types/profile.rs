//! User profile, credential and page context.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Open-ended user profile. A missing key means "no value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    attributes: BTreeMap<String, String>,
}

impl Profile {
    /// Attribute keys the settings page knows about.
    pub const KNOWN_KEYS: &'static [&'static str] = &[
        "name",
        "email",
        "phone",
        "company",
        "jobTitle",
        "address",
        "city",
        "state",
        "zip",
        "country",
        "customBio",
        "experience",
        "currentSalary",
        "expectedSalary",
        "noticePeriod",
        "availability",
        "workAuthorization",
        "skills",
        "education",
        "university",
        "graduationYear",
        "certifications",
        "linkedin",
        "github",
        "portfolio",
        "twitter",
        "dateOfBirth",
        "gender",
        "pronouns",
        "ethnicity",
        "veteranStatus",
        "disability",
        "coverLetter",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// Non-empty value of an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into().trim().to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.attributes.remove(key)
    }

    /// Overlay every attribute of `other` onto this profile.
    pub fn merge(&mut self, other: Profile) {
        self.attributes.extend(other.attributes);
    }

    /// A profile is usable once it has a name.
    pub fn is_complete(&self) -> bool {
        self.get("name").is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.values().all(|v| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Profile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut profile = Profile::new();
        for (k, v) in iter {
            profile.set(k, v);
        }
        profile
    }
}

/// Opaque bearer credential for the value resolver.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Page-level textual context, taken from the top-level frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub url: String,
    pub title: String,
}
