//! Campaign service: campaign CRUD and application review

use reach_common::Service;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::tokens::TokenManager;

pub const CAMPAIGNS_PATH: &str = "/api/v1/campaigns";
pub const APPLICATIONS_PATH: &str = "/api/v1/applications";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields for creating or replacing a campaign
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignFilters {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CampaignFilters {
    /// Query pairs for the set filters only
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = &self.status {
            query.push(("status".to_string(), status.clone()));
        }
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl ReviewDecision {
    pub fn approve() -> Self {
        Self {
            status: ReviewStatus::Approved,
            review_notes: None,
        }
    }

    pub fn reject(notes: impl Into<String>) -> Self {
        Self {
            status: ReviewStatus::Rejected,
            review_notes: Some(notes.into()),
        }
    }
}

/// A creator's application to a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Backends answer listings either as a bare array or as a page object
#[derive(Deserialize)]
#[serde(untagged)]
enum CampaignListing {
    Bare(Vec<Campaign>),
    Page {
        #[serde(alias = "items")]
        campaigns: Vec<Campaign>,
    },
}

impl From<CampaignListing> for Vec<Campaign> {
    fn from(listing: CampaignListing) -> Self {
        match listing {
            CampaignListing::Bare(campaigns) | CampaignListing::Page { campaigns } => campaigns,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CampaignApi {
    client: ApiClient,
}

impl CampaignApi {
    pub fn new(tokens: TokenManager) -> Self {
        Self {
            client: ApiClient::new(Service::Campaign, tokens),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list(&self, filters: &CampaignFilters) -> Result<Vec<Campaign>, ClientError> {
        let response = self
            .client
            .get_with_params::<CampaignListing>(CAMPAIGNS_PATH, filters.to_query())
            .await?;
        Ok(response.into_data().map(Vec::from).unwrap_or_default())
    }

    pub async fn create(&self, draft: &CampaignDraft) -> Result<Campaign, ClientError> {
        let response = self.client.post(CAMPAIGNS_PATH, draft).await?;
        required(response.into_data(), "create campaign")
    }

    pub async fn get(&self, id: &str) -> Result<Campaign, ClientError> {
        let response = self.client.get(&campaign_path(id)).await?;
        required(response.into_data(), "get campaign")
    }

    pub async fn update(&self, id: &str, draft: &CampaignDraft) -> Result<Campaign, ClientError> {
        let response = self.client.put(&campaign_path(id), draft).await?;
        required(response.into_data(), "update campaign")
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete::<Value>(&campaign_path(id)).await?;
        tracing::info!(campaign_id = %id, "Campaign deleted");
        Ok(())
    }

    /// Approve or reject an application
    pub async fn review_application(
        &self,
        application_id: &str,
        decision: &ReviewDecision,
    ) -> Result<Application, ClientError> {
        let endpoint = format!("{}/{}/review", APPLICATIONS_PATH, application_id);
        let response = self.client.put(&endpoint, decision).await?;

        tracing::info!(
            application_id = %application_id,
            status = ?decision.status,
            "Application reviewed"
        );

        required(response.into_data(), "review application")
    }
}

fn campaign_path(id: &str) -> String {
    format!("{}/{}", CAMPAIGNS_PATH, id)
}

fn required<T>(data: Option<T>, operation: &str) -> Result<T, ClientError> {
    data.ok_or_else(|| ClientError::Serialization(format!("{} response had no data", operation)))
}
