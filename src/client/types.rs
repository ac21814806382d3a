//! Type definitions for the Raindrop.io API.
//!
//! This module contains the records exchanged with the REST API and the OAuth
//! endpoints, together with the generic response envelopes.
//!
//! ## Key Types
//!
//! - [`Collection`] - A folder of bookmarks, possibly nested under a parent
//! - [`Raindrop`] - A single bookmark
//! - [`Tag`] - A tag name with its usage count
//! - [`ItemResponse`] / [`ItemsResponse`] - The `{result, item|items}` envelopes
//! - [`Credential`] - The access token returned by the OAuth exchange
//!
//! ## Wire Format
//!
//! Optional attributes are skipped when unset rather than sent as `null`.
//! Fields whose zero value is meaningful (such as a parent collection id of
//! `0`) are modelled with `Option` so "absent" and "zero" stay distinct.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::client::error::{RaindropError, Result};

/// Envelope for endpoints returning a single record.
///
/// A `result` of `false` is an application-level failure reported by the
/// server; it is decoded like any other reply and `error` / `error_message`
/// explain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "errorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

/// Envelope for endpoints returning a list of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    pub result: bool,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total number of matches, sent by the raindrops listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "errorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

/// Envelope for endpoints that only report success, such as tag removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "errorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

/// Reference to another record by id, encoded as `{"$id": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    #[serde(rename = "$id")]
    pub id: i64,
}

/// Collection access level and whether its raindrops can be dragged elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Access {
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub draggable: bool,
}

/// How a collection is displayed in the Raindrop.io apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    List,
    Simple,
    Grid,
    Masonry,
}

/// A Raindrop.io collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub access: Access,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cover: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        rename = "lastUpdate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update: Option<DateTime<Utc>>,
    /// Absent for root collections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<IdRef>,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<View>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
}

impl Collection {
    pub fn parent_id(&self) -> Option<i64> {
        self.parent.map(|p| p.id)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Body of the create collection request.
///
/// Use [`NewCollection::root`] or [`NewCollection::child`]; the parent key is
/// only written for child collections, so a parent id of `0` is still sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCollection {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<View>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(rename = "parent.$id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cover: Vec<String>,
}

impl NewCollection {
    pub fn root(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            view: None,
            sort: None,
            public: None,
            parent_id: None,
            cover: Vec::new(),
        }
    }

    pub fn child(title: impl Into<String>, parent_id: i64) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::root(title)
        }
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_sort(mut self, sort: i64) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = Some(public);
        self
    }

    pub fn with_cover(mut self, cover: Vec<String>) -> Self {
        self.cover = cover;
        self
    }
}

/// Media attached to a raindrop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub link: String,
}

/// Marker asking the server to fetch the page metadata itself. Encoded as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PleaseParse {}

/// A Raindrop.io bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raindrop {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html: String,
    /// link, article, image, video, document or audio
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Media>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        rename = "lastUpdate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(
        rename = "pleaseParse",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub please_parse: Option<PleaseParse>,
}

impl Raindrop {
    /// A bare bookmark for `link`, with every optional field unset.
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            id: None,
            link: link.into(),
            title: String::new(),
            excerpt: String::new(),
            note: String::new(),
            html: String::new(),
            kind: None,
            cover: None,
            media: Vec::new(),
            tags: BTreeSet::new(),
            collection: None,
            created: None,
            last_update: None,
            order: None,
            please_parse: None,
        }
    }

    pub fn collection_id(&self) -> Option<i64> {
        self.collection.map(|c| c.id)
    }
}

/// A tag and the number of raindrops carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteTagsRequest<'a> {
    pub tags: &'a [String],
}

/// One filter of the raindrops `search` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub key: String,
    pub val: String,
}

impl SearchFilter {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            key: "tag".to_string(),
            val: tag.into(),
        }
    }
}

/// Body of the authorization-code exchange.
#[derive(Debug, Serialize)]
pub struct AccessTokenRequest<'a> {
    pub code: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub redirect_uri: &'a str,
    pub grant_type: &'a str,
}

/// Body of the refresh-token exchange.
#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'a str,
    pub refresh_token: &'a str,
}

/// Raw reply of `/oauth/access_token`.
///
/// On success the token fields are set. On failure the server may instead send
/// `{"result": false, "status": 400, "errorMessage": "Incorrect redirect_uri"}`,
/// sometimes with HTTP 200.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "errorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

impl AccessTokenResponse {
    /// Turn the reply into a [`Credential`], or a `TokenExchange` error when
    /// the server did not issue a token.
    pub fn into_credential(self) -> Result<Credential> {
        match self.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) if self.result != Some(false) => Ok(Credential {
                access_token,
                refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
                expires_in: self.expires_in,
                token_type: self.token_type,
            }),
            _ => {
                let message = self
                    .error_message
                    .or(self.error)
                    .unwrap_or_else(|| "no access token in response".to_string());
                Err(RaindropError::TokenExchange { message })
            }
        }
    }
}

/// An OAuth access credential. Held by the caller and passed to every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Credential {
    /// Absolute expiry for a token issued at `issued_at`.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        issued_at.checked_add_signed(Duration::seconds(secs))
    }

    /// First characters of the token, safe to log.
    pub fn token_preview(&self) -> String {
        token_preview(&self.access_token)
    }
}

pub(crate) fn token_preview(token: &str) -> String {
    let end = token
        .char_indices()
        .nth(10)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    format!("{}...", &token[..end])
}

/// Query parameters of the OAuth redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRedirect {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AuthorizationRedirect {
    /// Status the redirect handler answers with when the redirect is malformed.
    pub const MALFORMED_STATUS: u16 = 400;

    /// Extract the authorization code.
    ///
    /// A non-empty `code` wins. Otherwise a non-empty `error` is reported as
    /// [`RaindropError::AuthorizationDenied`], and a redirect with neither is
    /// reported as [`RaindropError::MissingAuthorizationCode`].
    pub fn into_code(self) -> Result<String> {
        if let Some(code) = self.code.filter(|c| !c.is_empty()) {
            return Ok(code);
        }
        match self.error.filter(|e| !e.is_empty()) {
            Some(error) => Err(RaindropError::AuthorizationDenied(error)),
            None => Err(RaindropError::MissingAuthorizationCode {
                status: Self::MALFORMED_STATUS,
            }),
        }
    }
}
