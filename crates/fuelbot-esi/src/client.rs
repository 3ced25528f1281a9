//! ESI structure and market data

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fuelbot_api::{PriceHistoryEntry, StructureService, StructureSnapshot};
use fuelbot_provider_api::{
    AuthContext, FetchError, FetchResult, MarketHistoryProvider, StructureProvider,
};
use fuelbot_util::{ItemTypeId, StructureId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::fetch_error;

pub const ESI_BASE_URL: &str = "https://esi.evetech.net/latest";

/// Header carrying the number of result pages
const PAGES_HEADER: &str = "x-pages";

#[derive(Debug, Deserialize)]
struct CharacterInfo {
    corporation_id: i64,
}

#[derive(Debug, Deserialize)]
struct CorporationStructure {
    structure_id: i64,
    type_id: i32,
    #[serde(default)]
    fuel_expires: Option<DateTime<Utc>>,
    #[serde(default)]
    services: Vec<CorporationStructureService>,
}

#[derive(Debug, Deserialize)]
struct CorporationStructureService {
    name: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct UniverseStructure {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MarketHistoryDay {
    date: NaiveDate,
    average: f64,
}

impl CorporationStructure {
    fn into_snapshot(self, name: String) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(self.structure_id),
            type_id: ItemTypeId::new(self.type_id),
            name,
            fuel_expires: self.fuel_expires,
            services: self
                .services
                .into_iter()
                .map(|s| StructureService::new(s.name, s.state))
                .collect(),
        }
    }
}

/// ESI client for corporation structures and regional market history
#[derive(Clone)]
pub struct EsiClient {
    http: reqwest::Client,
    base_url: String,
    market_region_id: i32,
}

impl EsiClient {
    pub fn new(http: reqwest::Client, market_region_id: i32) -> Self {
        Self::with_base_url(http, ESI_BASE_URL, market_region_id)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>, market_region_id: i32) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            market_region_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path`, returning the decoded body and the page count
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> FetchResult<(T, u32)> {
        let url = self.url(path);
        let mut request = self.http.get(&url).query(query);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let pages = response
            .headers()
            .get(PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map_or(1, parse_pages);

        let body = response.json().await.map_err(fetch_error)?;
        Ok((body, pages))
    }

    async fn corporation_structures(
        &self,
        ctx: &AuthContext,
        corporation_id: i64,
    ) -> FetchResult<Vec<CorporationStructure>> {
        let path = format!("/corporations/{}/structures/", corporation_id);
        let mut structures = Vec::new();
        let mut page = 1;

        loop {
            let (batch, pages): (Vec<CorporationStructure>, u32) = self
                .get(&path, &[("page", page.to_string())], Some(&ctx.access_token))
                .await?;
            structures.extend(batch);

            if page >= pages {
                break;
            }
            page += 1;
        }

        Ok(structures)
    }
}

/// Page count from the header value; anything unreadable means one page
fn parse_pages(value: &str) -> u32 {
    value.trim().parse().ok().filter(|p| *p >= 1).unwrap_or(1)
}

#[async_trait]
impl StructureProvider for EsiClient {
    async fn list_structures(&self, ctx: &AuthContext) -> FetchResult<Vec<StructureSnapshot>> {
        let (character, _): (CharacterInfo, _) = self
            .get(&format!("/characters/{}/", ctx.character_id), &[], None)
            .await?;

        let structures = self
            .corporation_structures(ctx, character.corporation_id)
            .await?;
        debug!(
            corporation_id = character.corporation_id,
            count = structures.len(),
            "Loaded corporation structures"
        );

        let mut snapshots = Vec::with_capacity(structures.len());
        for structure in structures {
            let (info, _): (UniverseStructure, _) = self
                .get(
                    &format!("/universe/structures/{}/", structure.structure_id),
                    &[],
                    Some(&ctx.access_token),
                )
                .await?;
            snapshots.push(structure.into_snapshot(info.name));
        }

        Ok(snapshots)
    }
}

#[async_trait]
impl MarketHistoryProvider for EsiClient {
    async fn price_history(
        &self,
        _ctx: &AuthContext,
        type_id: ItemTypeId,
    ) -> FetchResult<Vec<PriceHistoryEntry>> {
        let (days, _): (Vec<MarketHistoryDay>, _) = self
            .get(
                &format!("/markets/{}/history/", self.market_region_id),
                &[("type_id", type_id.to_string())],
                None,
            )
            .await?;

        Ok(days
            .into_iter()
            .map(|d| PriceHistoryEntry {
                date: d.date,
                average: d.average,
            })
            .collect())
    }
}
