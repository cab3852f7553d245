use serde::{Serialize, Serializer};
use serde_json::Number;
use utoipa::ToSchema;

/// Sentinel shown wherever a country or rate field has no value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Maximum number of headlines kept per response.
pub const MAX_HEADLINES: usize = 5;

// ============ Identity ============

/// The randomly generated person. Produced once per request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    /// URL of the large profile picture.
    pub profile_picture: String,
    pub age: u32,
    /// Long-form date, e.g. "July 20, 1993".
    pub date_of_birth: String,
    pub city: String,
    /// Display name of the country; the join key into every enrichment branch.
    pub country: String,
    /// `"<number> <street>"`.
    pub full_address: String,
}

// ============ Country ============

/// Canonical facts about the identity's country.
///
/// A record built by [`CountryFacts::fallback`] has the same shape as a real
/// one; callers never see a missing `countryDetails`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryFacts {
    pub country_name: String,
    pub capital: String,
    /// Comma-joined language names in upstream order.
    pub languages: String,
    /// Comma-joined `"<name> (<code>)"` entries.
    pub currency: String,
    /// First currency code listed by the upstream, if any.
    pub currency_code: Option<String>,
    /// PNG flag URL.
    pub flag: Option<String>,
}

impl CountryFacts {
    /// Record used when the country upstream has nothing for `country_name`.
    pub fn fallback(country_name: &str) -> Self {
        Self {
            country_name: country_name.to_string(),
            capital: NOT_AVAILABLE.to_string(),
            languages: NOT_AVAILABLE.to_string(),
            currency: NOT_AVAILABLE.to_string(),
            currency_code: None,
            flag: None,
        }
    }
}

// ============ Exchange rates ============

/// One conversion rate, or the "N/A" sentinel when the upstream omitted the target.
///
/// Quoted rates keep the number exactly as the upstream wrote it (`520` stays `520`).
#[derive(Debug, Clone, PartialEq)]
pub enum Rate {
    Quoted(Number),
    NotAvailable,
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rate::Quoted(value) => value.serialize(serializer),
            Rate::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Conversion rates from the country's currency to USD and KZT.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    pub base_currency: String,
    /// Number, or the string "N/A".
    #[schema(value_type = f64)]
    pub usd_rate: Rate,
    /// Number, or the string "N/A".
    #[schema(value_type = f64)]
    pub kzt_rate: Rate,
}

// ============ News ============

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsHeadline {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    /// Article link; `null` when the upstream did not provide one.
    pub url: Option<String>,
}

// ============ Response ============

/// The merged answer to one "describe a random person" request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResult {
    #[serde(flatten)]
    pub identity: Identity,
    pub country_details: CountryFacts,
    pub exchange_rates: Option<ExchangeRates>,
    pub news_headlines: Option<Vec<NewsHeadline>>,
}

impl AggregatedResult {
    pub fn merge(
        identity: Identity,
        country_details: CountryFacts,
        exchange_rates: Option<ExchangeRates>,
        news_headlines: Option<Vec<NewsHeadline>>,
    ) -> Self {
        Self {
            identity,
            country_details,
            exchange_rates,
            news_headlines,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
