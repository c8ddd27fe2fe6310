use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use edgeform_core::client::ApiError;

use super::client::*;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    GetZone(String),
    CreateZone(CreateZoneRequest),
    UpdateZone(Zone),
    GetRecord(RecordKey),
    CreateRecord(WriteRecordRequest),
    UpdateRecord(WriteRecordRequest),
    DeleteRecord(RecordKey),
    GetAuthorities(String),
}

/// In-memory Edge DNS holding zones and record sets
#[derive(Default)]
pub(crate) struct MockDns {
    calls: Mutex<Vec<Call>>,
    pub zones: Mutex<HashMap<String, Zone>>,
    pub records: Mutex<HashMap<RecordKey, RecordSet>>,
    pub authorities: HashMap<String, Vec<String>>,
    /// Error returned by every operation whose name is listed
    failures: Mutex<Vec<(&'static str, ApiError)>>,
}

impl MockDns {
    pub fn new() -> Self {
        Self {
            authorities: HashMap::from([(
                "ctr_1-3CV382".to_string(),
                vec!["a1-118.akam.net.".to_string(), "a2-64.akam.net.".to_string()],
            )]),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail(&self, operation: &'static str, error: ApiError) {
        self.failures.lock().unwrap().push((operation, error));
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| *name == operation)
        {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn key_of(request: &WriteRecordRequest) -> RecordKey {
    RecordKey {
        zone: request.zone.clone(),
        name: request.record.name.clone(),
        record_type: request.record.record_type.clone(),
    }
}

#[async_trait]
impl Dns for MockDns {
    async fn get_zone(&self, zone: &str) -> Result<Zone, ApiError> {
        self.record("GetZone", Call::GetZone(zone.to_string()))?;
        self.zones
            .lock()
            .unwrap()
            .get(zone)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Zone not found"))
    }

    async fn create_zone(&self, request: CreateZoneRequest) -> Result<(), ApiError> {
        self.record("CreateZone", Call::CreateZone(request.clone()))?;
        let mut zone = request.zone;
        zone.activation_state = Some("PENDING".to_string());
        zone.version_id = Some("1".to_string());
        self.zones.lock().unwrap().insert(zone.zone.clone(), zone);
        Ok(())
    }

    async fn update_zone(&self, zone: Zone) -> Result<(), ApiError> {
        self.record("UpdateZone", Call::UpdateZone(zone.clone()))?;
        let mut zones = self.zones.lock().unwrap();
        let Some(current) = zones.get_mut(&zone.zone) else {
            return Err(ApiError::not_found("Zone not found"));
        };
        *current = Zone {
            activation_state: current.activation_state.clone(),
            version_id: current.version_id.clone(),
            alias_count: current.alias_count,
            ..zone
        };
        Ok(())
    }

    async fn get_record(&self, key: &RecordKey) -> Result<RecordSet, ApiError> {
        self.record("GetRecord", Call::GetRecord(key.clone()))?;
        self.records
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Record set not found"))
    }

    async fn create_record(&self, request: WriteRecordRequest) -> Result<(), ApiError> {
        self.record("CreateRecord", Call::CreateRecord(request.clone()))?;
        let key = key_of(&request);
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&key) {
            return Err(ApiError::status(409, "Record set already exists"));
        }
        records.insert(key, request.record);
        Ok(())
    }

    async fn update_record(&self, request: WriteRecordRequest) -> Result<(), ApiError> {
        self.record("UpdateRecord", Call::UpdateRecord(request.clone()))?;
        self.records
            .lock()
            .unwrap()
            .insert(key_of(&request), request.record);
        Ok(())
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<(), ApiError> {
        self.record("DeleteRecord", Call::DeleteRecord(key.clone()))?;
        self.records
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("Record set not found"))
    }

    async fn get_authorities(&self, contract_id: &str) -> Result<AuthoritiesResponse, ApiError> {
        self.record("GetAuthorities", Call::GetAuthorities(contract_id.to_string()))?;
        let authorities = self
            .authorities
            .get(contract_id)
            .ok_or_else(|| ApiError::status(403, "Contract not accessible"))?;
        Ok(AuthoritiesResponse {
            contracts: vec![ContractAuthorities {
                contract_id: contract_id.to_string(),
                authorities: authorities.clone(),
            }],
        })
    }
}
