//! Wire shapes of the four upstreams and how each one reports "no data".

use crate::models::{
    CountryFacts, ExchangeRates, Identity, NewsHeadline, Rate, MAX_HEADLINES, NOT_AVAILABLE,
};
use crate::upstream_client::UpstreamResponse;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

// ============ Identity (randomuser.me) ============

#[derive(Debug, Deserialize)]
pub struct RandomUserResponse {
    #[serde(default)]
    pub results: Vec<RawUser>,
    pub error: Option<String>,
}

impl UpstreamResponse for RandomUserResponse {
    type Payload = RawUser;

    fn into_payload(self) -> Option<RawUser> {
        if let Some(ref error) = self.error {
            tracing::warn!("Identity upstream reported an error: {}", error);
            return None;
        }
        self.results.into_iter().next()
    }
}

#[derive(Debug, Deserialize)]
pub struct RawUser {
    pub gender: String,
    pub name: RawName,
    pub picture: RawPicture,
    pub dob: RawDob,
    pub location: RawLocation,
}

#[derive(Debug, Deserialize)]
pub struct RawName {
    pub first: String,
    pub last: String,
}

#[derive(Debug, Deserialize)]
pub struct RawPicture {
    pub large: String,
}

#[derive(Debug, Deserialize)]
pub struct RawDob {
    pub date: String,
    pub age: u32,
}

#[derive(Debug, Deserialize)]
pub struct RawLocation {
    pub street: RawStreet,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct RawStreet {
    pub number: StreetNumber,
    pub name: String,
}

/// House numbers come back as integers, but some nationalities use strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StreetNumber {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for StreetNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreetNumber::Numeric(n) => write!(f, "{}", n),
            StreetNumber::Text(s) => f.write_str(s),
        }
    }
}

pub fn format_address(number: &StreetNumber, street: &str) -> String {
    format!("{} {}", number, street)
}

/// Renders an ISO-8601 timestamp as an en-US long date ("July 20, 1993").
///
/// Falls back to the raw string when it does not parse.
pub fn format_date_of_birth(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date.with_timezone(&Utc).format("%B %-d, %Y").to_string(),
        Err(e) => {
            tracing::warn!("Unparseable date of birth '{}': {}", raw, e);
            raw.to_string()
        }
    }
}

impl From<RawUser> for Identity {
    fn from(raw: RawUser) -> Self {
        Identity {
            first_name: raw.name.first,
            last_name: raw.name.last,
            gender: raw.gender,
            profile_picture: raw.picture.large,
            age: raw.dob.age,
            date_of_birth: format_date_of_birth(&raw.dob.date),
            city: raw.location.city,
            full_address: format_address(&raw.location.street.number, &raw.location.street.name),
            country: raw.location.country,
        }
    }
}

// ============ Country facts (restcountries.com) ============

/// Either a list of matches or an error object such as `{"status":404,"message":"Not Found"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CountryResponse {
    Matches(Vec<RawCountry>),
    Failure {
        status: Option<Value>,
        message: Option<String>,
    },
}

impl UpstreamResponse for CountryResponse {
    type Payload = RawCountry;

    fn into_payload(self) -> Option<RawCountry> {
        match self {
            CountryResponse::Matches(countries) => countries.into_iter().next(),
            CountryResponse::Failure { status, message } => {
                tracing::debug!(
                    "Country upstream reported status={:?} message={:?}",
                    status,
                    message
                );
                None
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCountry {
    #[serde(default)]
    pub name: Option<RawCountryName>,
    #[serde(default)]
    pub capital: Option<Vec<String>>,
    /// Language code -> language name, in upstream order.
    #[serde(default)]
    pub languages: Option<Map<String, Value>>,
    /// Currency code -> `{ "name": ..., "symbol": ... }`, in upstream order.
    #[serde(default)]
    pub currencies: Option<Map<String, Value>>,
    #[serde(default)]
    pub flags: Option<RawFlags>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCountryName {
    pub common: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawFlags {
    pub png: Option<String>,
}

/// Joins the language names, keeping the upstream's mapping order.
pub fn join_languages(languages: &Map<String, Value>) -> String {
    let names: Vec<&str> = languages.values().filter_map(Value::as_str).collect();
    if names.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        names.join(", ")
    }
}

/// Returns the `"<name> (<code>)"` display string and the first code encountered.
pub fn describe_currencies(currencies: &Map<String, Value>) -> (String, Option<String>) {
    let entries: Vec<String> = currencies
        .iter()
        .map(|(code, details)| {
            let name = details
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(NOT_AVAILABLE);
            format!("{} ({})", name, code)
        })
        .collect();

    if entries.is_empty() {
        return (NOT_AVAILABLE.to_string(), None);
    }

    let first_code = currencies.keys().next().cloned();
    (entries.join(", "), first_code)
}

impl From<RawCountry> for CountryFacts {
    fn from(raw: RawCountry) -> Self {
        let (currency, currency_code) = raw
            .currencies
            .as_ref()
            .map(describe_currencies)
            .unwrap_or_else(|| (NOT_AVAILABLE.to_string(), None));

        CountryFacts {
            country_name: raw
                .name
                .and_then(|n| n.common)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            capital: raw
                .capital
                .and_then(|capitals| capitals.into_iter().next())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            languages: raw
                .languages
                .as_ref()
                .map(join_languages)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            currency,
            currency_code,
            flag: raw.flags.and_then(|f| f.png).filter(|png| !png.is_empty()),
        }
    }
}

// ============ Exchange rates (exchangerate-api.com) ============

/// Target currencies every rate lookup is converted into.
pub const USD: &str = "USD";
pub const KZT: &str = "KZT";

#[derive(Debug, Deserialize)]
pub struct ExchangeRateResponse {
    pub result: Option<String>,
    pub error: Option<Value>,
    #[serde(rename = "error-type")]
    pub error_type: Option<String>,
    pub conversion_rates: Option<Map<String, Value>>,
    pub rates: Option<Map<String, Value>>,
}

impl UpstreamResponse for ExchangeRateResponse {
    /// The rate table, keyed by target currency code.
    type Payload = Map<String, Value>;

    fn into_payload(self) -> Option<Map<String, Value>> {
        let errored = self.result.as_deref() == Some("error")
            || self.error.as_ref().is_some_and(is_truthy);
        if errored {
            tracing::debug!(
                "Exchange upstream reported error-type={:?}",
                self.error_type
            );
            return None;
        }
        // "conversion_rates" is the v6 shape; "rates" is the legacy one
        self.conversion_rates.or(self.rates)
    }
}

/// `false`, `0`, `""` and `null` all mean "no error".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn rate_for(table: &Map<String, Value>, target: &str) -> Rate {
    match table.get(target) {
        Some(Value::Number(rate)) => Rate::Quoted(rate.clone()),
        _ => Rate::NotAvailable,
    }
}

impl ExchangeRates {
    pub fn from_table(base_currency: &str, table: &Map<String, Value>) -> Self {
        ExchangeRates {
            base_currency: base_currency.to_string(),
            usd_rate: rate_for(table, USD),
            kzt_rate: rate_for(table, KZT),
        }
    }
}

// ============ News (newsapi.org) ============

#[derive(Debug, Deserialize)]
pub struct NewsResponse {
    pub status: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
    pub articles: Option<Vec<RawArticle>>,
}

impl UpstreamResponse for NewsResponse {
    type Payload = Vec<RawArticle>;

    fn into_payload(self) -> Option<Vec<RawArticle>> {
        if self.status.as_deref() == Some("error") {
            tracing::debug!(
                "News upstream reported code={:?} message={:?}",
                self.code,
                self.message
            );
            return None;
        }
        self.articles.filter(|articles| !articles.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url_to_image: Option<String>,
    pub url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<RawArticle> for NewsHeadline {
    fn from(raw: RawArticle) -> Self {
        NewsHeadline {
            title: non_empty(raw.title).unwrap_or_else(|| "No title".to_string()),
            description: non_empty(raw.description)
                .unwrap_or_else(|| "No description available".to_string()),
            image: non_empty(raw.url_to_image),
            url: non_empty(raw.url),
        }
    }
}

/// Keeps the first [`MAX_HEADLINES`] articles in upstream order.
pub fn headlines_from_articles(articles: Vec<RawArticle>) -> Vec<NewsHeadline> {
    articles
        .into_iter()
        .take(MAX_HEADLINES)
        .map(NewsHeadline::from)
        .collect()
}
