//! Edge DNS API client

use async_trait::async_trait;
use edgeform_core::client::{ApiError, ApiRequest, Session};
use serde::{Deserialize, Serialize};

// =============================================================================
// Zones
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub zone: String,
    #[serde(rename = "type")]
    pub zone_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub masters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub sign_and_serve: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing)]
    pub activation_state: Option<String>,
    #[serde(default, skip_serializing)]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub alias_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateZoneRequest {
    pub contract_id: String,
    pub group_id: Option<String>,
    pub zone: Zone,
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub zone: String,
    pub name: String,
    pub record_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: i64,
    #[serde(default)]
    pub rdata: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecordRequest {
    pub zone: String,
    pub record: RecordSet,
}

// =============================================================================
// Authorities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthoritiesResponse {
    #[serde(default)]
    pub contracts: Vec<ContractAuthorities>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAuthorities {
    pub contract_id: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

#[async_trait]
pub trait Dns: Send + Sync {
    async fn get_zone(&self, zone: &str) -> Result<Zone, ApiError>;

    async fn create_zone(&self, request: CreateZoneRequest) -> Result<(), ApiError>;

    async fn update_zone(&self, zone: Zone) -> Result<(), ApiError>;

    async fn get_record(&self, key: &RecordKey) -> Result<RecordSet, ApiError>;

    async fn create_record(&self, request: WriteRecordRequest) -> Result<(), ApiError>;

    async fn update_record(&self, request: WriteRecordRequest) -> Result<(), ApiError>;

    async fn delete_record(&self, key: &RecordKey) -> Result<(), ApiError>;

    async fn get_authorities(&self, contract_id: &str) -> Result<AuthoritiesResponse, ApiError>;

    /// Record data of one record set
    async fn get_rdata(&self, key: &RecordKey) -> Result<Vec<String>, ApiError> {
        Ok(self.get_record(key).await?.rdata)
    }
}

/// Edge DNS client over an authenticated session
pub struct HttpDns {
    session: Session,
}

impl HttpDns {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

fn zone_path(zone: &str) -> String {
    format!("/config-dns/v2/zones/{}", zone)
}

fn record_path(key: &RecordKey) -> String {
    format!(
        "/config-dns/v2/zones/{}/names/{}/types/{}",
        key.zone, key.name, key.record_type
    )
}

#[async_trait]
impl Dns for HttpDns {
    async fn get_zone(&self, zone: &str) -> Result<Zone, ApiError> {
        self.session.exec_json(ApiRequest::get(zone_path(zone))).await
    }

    async fn create_zone(&self, request: CreateZoneRequest) -> Result<(), ApiError> {
        let mut http = ApiRequest::post("/config-dns/v2/zones")
            .query("contractId", request.contract_id);
        if let Some(group_id) = request.group_id {
            http = http.query("gid", group_id);
        }
        self.session.exec_empty(http.json_body(&request.zone)?).await
    }

    async fn update_zone(&self, zone: Zone) -> Result<(), ApiError> {
        self.session
            .exec_empty(ApiRequest::put(zone_path(&zone.zone)).json_body(&zone)?)
            .await
    }

    async fn get_record(&self, key: &RecordKey) -> Result<RecordSet, ApiError> {
        self.session.exec_json(ApiRequest::get(record_path(key))).await
    }

    async fn create_record(&self, request: WriteRecordRequest) -> Result<(), ApiError> {
        let key = RecordKey {
            zone: request.zone,
            name: request.record.name.clone(),
            record_type: request.record.record_type.clone(),
        };
        self.session
            .exec_empty(ApiRequest::post(record_path(&key)).json_body(&request.record)?)
            .await
    }

    async fn update_record(&self, request: WriteRecordRequest) -> Result<(), ApiError> {
        let key = RecordKey {
            zone: request.zone,
            name: request.record.name.clone(),
            record_type: request.record.record_type.clone(),
        };
        self.session
            .exec_empty(ApiRequest::put(record_path(&key)).json_body(&request.record)?)
            .await
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<(), ApiError> {
        self.session
            .exec_empty(ApiRequest::delete(record_path(key)))
            .await
    }

    async fn get_authorities(&self, contract_id: &str) -> Result<AuthoritiesResponse, ApiError> {
        self.session
            .exec_json(
                ApiRequest::get("/config-dns/v2/data/authorities")
                    .query("contractIds", contract_id),
            )
            .await
    }
}
