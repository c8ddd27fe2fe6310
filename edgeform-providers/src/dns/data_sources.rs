use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta};
use edgeform_core::provider::{DataSource, ProviderError, ProviderResult};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::client::{Dns, RecordKey};
use crate::upstream;

const AUTHORITIES_SET: &str = "akamai_authorities_set";
const RECORD_SET: &str = "akamai_dns_record_set";

pub(crate) fn all(client: &ClientAccessor<dyn Dns>) -> BTreeMap<String, Arc<dyn DataSource>> {
    let mut data_sources: BTreeMap<String, Arc<dyn DataSource>> = BTreeMap::new();
    data_sources.insert(
        AUTHORITIES_SET.to_string(),
        Arc::new(AuthoritiesSet {
            client: client.clone(),
        }),
    );
    data_sources.insert(
        RECORD_SET.to_string(),
        Arc::new(RecordSetLookup {
            client: client.clone(),
        }),
    );
    data_sources
}

/// Name servers authoritative for the zones of a contract
struct AuthoritiesSet {
    client: ClientAccessor<dyn Dns>,
}

#[async_trait]
impl DataSource for AuthoritiesSet {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(AUTHORITIES_SET)
            .attribute(AttributeSchema::new("contract", AttributeType::String).required())
            .attribute(AttributeSchema::new("authorities", types::string_list()).computed())
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", AUTHORITIES_SET);
        let client = self.client.client(meta)?;
        let contract = d.get_string("contract")?;

        let response = client
            .get_authorities(&contract)
            .await
            .map_err(upstream("GetAuthorities"))?;
        let authorities = response
            .contracts
            .into_iter()
            .find(|c| c.contract_id == contract)
            .map(|c| c.authorities)
            .unwrap_or_default();
        if authorities.is_empty() {
            return Err(ProviderError::InvalidValue {
                field: "contract".to_string(),
                message: format!("no authorities returned for contract {}", contract),
            });
        }

        d.set("authorities", authorities)?;
        d.set_id(contract);
        Ok(())
    }
}

/// Record data of one record set
struct RecordSetLookup {
    client: ClientAccessor<dyn Dns>,
}

#[async_trait]
impl DataSource for RecordSetLookup {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RECORD_SET)
            .attribute(AttributeSchema::new("zone", AttributeType::String).required())
            .attribute(AttributeSchema::new("host", AttributeType::String).required())
            .attribute(AttributeSchema::new("record_type", AttributeType::String).required())
            .attribute(AttributeSchema::new("rdata", types::string_list()).computed())
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", RECORD_SET);
        let client = self.client.client(meta)?;
        let key = RecordKey {
            zone: d.get_string("zone")?,
            name: d.get_string("host")?,
            record_type: d.get_string("record_type")?,
        };

        let rdata = client
            .get_rdata(&key)
            .await
            .map_err(upstream("GetRdata"))?;
        d.set("rdata", Value::from(rdata))?;
        d.set_id(key.name);
        Ok(())
    }
}
