use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, sync::LazyLock};

use crate::error::{Field, ValidationErrors};

/// Host used when the user types a bare handle
pub const PROFILE_BASE_URL: &str = "https://letterboxd.com";

static FILMS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*)://([^/\s]+)/([A-Za-z0-9_-]+)/films/?$")
        .expect("films url pattern")
});

static PROFILE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*)://([^/\s]+)/([A-Za-z0-9_-]+)/?$")
        .expect("profile url pattern")
});

static BARE_HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("handle pattern"));

/// Canonical locator of a user's films listing
///
/// Shaped `<scheme>://<host>/<handle>/films/` whenever the input could be
/// recognised; otherwise it carries the trimmed input unchanged and the
/// backend decides whether it is usable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileLocator(String);

impl ProfileLocator {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the locator has the canonical films-listing shape
    pub fn is_canonical(&self) -> bool {
        self.0.ends_with('/') && FILMS_URL.is_match(&self.0)
    }

    /// The profile handle, when the locator is canonical
    pub fn handle(&self) -> Option<&str> {
        if !self.is_canonical() {
            return None;
        }
        FILMS_URL
            .captures(&self.0)
            .and_then(|caps| caps.get(3))
            .map(|m| m.as_str())
    }
}

impl Display for ProfileLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProfileLocator {
    fn from(input: &str) -> Self {
        normalize(input)
    }
}

/// Turns whatever the user typed into a profile locator
///
/// First match wins: a films URL gets a trailing slash, a bare profile URL
/// gets `/films/` appended, a bare handle is placed on the default host.
/// Anything else passes through trimmed.
pub fn normalize(input: &str) -> ProfileLocator {
    let trimmed = input.trim();

    if let Some(caps) = FILMS_URL.captures(trimmed) {
        return ProfileLocator(format!("{}://{}/{}/films/", &caps[1], &caps[2], &caps[3]));
    }

    if let Some(caps) = PROFILE_URL.captures(trimmed) {
        return ProfileLocator(format!("{}://{}/{}/films/", &caps[1], &caps[2], &caps[3]));
    }

    if BARE_HANDLE.is_match(trimmed) {
        return ProfileLocator(format!("{}/{}/films/", PROFILE_BASE_URL, trimmed));
    }

    ProfileLocator(trimmed.to_string())
}

/// A validated pair of distinct, non-empty profile locators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendRequest {
    first: ProfileLocator,
    second: ProfileLocator,
}

impl BlendRequest {
    pub fn first(&self) -> &ProfileLocator {
        &self.first
    }

    pub fn second(&self) -> &ProfileLocator {
        &self.second
    }
}

/// Normalizes both inputs and checks they can form a blend request
///
/// Duplicates are detected on the canonical forms, so `alice` and
/// `https://letterboxd.com/alice` collide.
pub fn validate_pair(first: &str, second: &str) -> Result<BlendRequest, ValidationErrors> {
    let first = normalize(first);
    let second = normalize(second);
    let mut errors = ValidationErrors::default();

    if first.is_empty() {
        errors.set(Field::First, "Enter a Letterboxd username or profile URL");
    }
    if second.is_empty() {
        errors.set(Field::Second, "Enter a Letterboxd username or profile URL");
    }
    if errors.is_empty() && first == second {
        errors.set(Field::First, "Enter two different profiles");
        errors.set(Field::Second, "Enter two different profiles");
    }

    if !errors.is_empty() {
        tracing::debug!(
            first = ?errors.first,
            second = ?errors.second,
            "Profile validation failed"
        );
        return Err(errors);
    }

    Ok(BlendRequest { first, second })
}
