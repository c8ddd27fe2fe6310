//! akamai_dns_record

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta};
use edgeform_core::id;
use edgeform_core::provider::{ProviderError, ProviderResult, Resource, verify_unchanged};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::client::{Dns, RecordKey, RecordSet, WriteRecordRequest};
use crate::upstream;

pub(crate) const RESOURCE_TYPE: &str = "akamai_dns_record";

const ID_HINT: &str = "zone:recordName:recordType";

const RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "AFSDB", "CAA", "CNAME", "DNSKEY", "DS", "HINFO", "LOC", "MX", "NAPTR", "NS",
    "PTR", "RP", "SOA", "SPF", "SRV", "SSHFP", "TLSA", "TXT",
];

pub(crate) struct RecordResource {
    pub(crate) client: ClientAccessor<dyn Dns>,
}

fn key_from_id(d: &ResourceData) -> ProviderResult<RecordKey> {
    let parts = id::decompose(d.require_id()?, 3, ID_HINT)?;
    Ok(RecordKey {
        zone: parts[0].clone(),
        name: parts[1].clone(),
        record_type: parts[2].clone(),
    })
}

/// Record set built from configuration; the name must lie inside the zone
fn record_from(d: &ResourceData) -> ProviderResult<(String, RecordSet)> {
    let zone = d.get_string("zone")?;
    let name = d.get_string("name")?;
    if name != zone && !name.ends_with(&format!(".{}", zone)) {
        return Err(ProviderError::InvalidValue {
            field: "name".to_string(),
            message: format!("record name {} is not within zone {}", name, zone),
        });
    }
    let targets = d.get_string_list("target")?;
    if targets.is_empty() {
        return Err(ProviderError::FieldMissing {
            field: "target".to_string(),
        });
    }

    let record = RecordSet {
        name,
        record_type: d.get_string("recordtype")?,
        ttl: d.get_int("ttl")?,
        rdata: targets,
    };
    Ok((zone, record))
}

#[async_trait]
impl Resource for RecordResource {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .with_description("Edge DNS record set")
            .attribute(AttributeSchema::new("zone", AttributeType::String).required())
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("recordtype", types::one_of(RECORD_TYPES)).required(),
            )
            .attribute(AttributeSchema::new("ttl", types::positive_int()).required())
            .attribute(
                AttributeSchema::new("target", types::string_list())
                    .required()
                    .with_description("Record data, one entry per record"),
            )
    }

    async fn create(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} create", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let (zone, record) = record_from(d)?;
        let id = id::compose(&[&zone, &record.name, &record.record_type]);

        client
            .create_record(WriteRecordRequest { zone, record })
            .await
            .map_err(upstream("CreateRecord"))?;
        d.set_id(id);
        self.read(meta, d).await
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let key = key_from_id(d)?;

        let record = match client.get_record(&key).await {
            Ok(record) => record,
            Err(err) if err.is_not_found() => {
                log::warn!(
                    "record {} {} in zone {} no longer exists",
                    key.name,
                    key.record_type,
                    key.zone
                );
                d.clear_id();
                return Ok(());
            }
            Err(err) => return Err(upstream("GetRecord")(err)),
        };

        d.set_attrs([
            ("zone", Value::from(key.zone)),
            ("name", Value::from(record.name)),
            ("recordtype", Value::from(record.record_type)),
            ("ttl", Value::Int(record.ttl)),
            ("target", Value::from(record.rdata)),
        ])
    }

    async fn update(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} update", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let (zone, record) = record_from(d)?;
        client
            .update_record(WriteRecordRequest { zone, record })
            .await
            .map_err(upstream("UpdateRecord"))?;
        self.read(meta, d).await
    }

    async fn delete(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} delete", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let key = key_from_id(d)?;
        match client.delete_record(&key).await {
            Err(err) if !err.is_not_found() => Err(upstream("DeleteRecord")(err)),
            _ => Ok(()),
        }
    }

    fn customize_diff(&self, old: &ResourceData, new: &ResourceData) -> ProviderResult<()> {
        for field in ["zone", "name", "recordtype"] {
            verify_unchanged(old, new, field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::DnsProvider;
    use super::super::mock::{Call, MockDns};
    use super::*;
    use edgeform_core::ProviderRegistry;
    use edgeform_core::client::ApiError;

    fn registry(mock: Arc<MockDns>) -> ProviderRegistry {
        ProviderRegistry::builder()
            .subprovider(Arc::new(DnsProvider::with_client(mock)))
            .build()
            .unwrap()
    }

    fn planned(registry: &ProviderRegistry, name: &str) -> ResourceData {
        registry
            .new_resource_data(RESOURCE_TYPE)
            .unwrap()
            .with_attribute("zone", "example.net")
            .with_attribute("name", name)
            .with_attribute("recordtype", "A")
            .with_attribute("ttl", Value::Int(300))
            .with_attribute("target", vec!["10.0.0.1".to_string()])
    }

    fn www() -> RecordKey {
        RecordKey {
            zone: "example.net".to_string(),
            name: "www.example.net".to_string(),
            record_type: "A".to_string(),
        }
    }

    #[tokio::test]
    async fn create_read_delete() {
        let mock = Arc::new(MockDns::new());
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();

        let mut d = planned(&registry, "www.example.net");
        let diags = registry.create(&meta, RESOURCE_TYPE, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(d.id(), Some("example.net:www.example.net:A"));
        assert_eq!(mock.calls()[1], Call::GetRecord(www()));

        let diags = registry.delete(&meta, RESOURCE_TYPE, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(mock.calls().last(), Some(&Call::DeleteRecord(www())));
        assert!(mock.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn name_outside_zone_is_rejected() {
        let mock = Arc::new(MockDns::new());
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();

        let mut d = planned(&registry, "www.example.com");
        let diags = registry.create(&meta, RESOURCE_TYPE, &mut d).await;
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "invalid value for 'name': record name www.example.com is not within zone example.net"
        );
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn removed_record_clears_id() {
        let mock = Arc::new(MockDns::new());
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();

        let mut d =
            planned(&registry, "www.example.net").with_id("example.net:www.example.net:A");
        let diags = registry.read(&meta, RESOURCE_TYPE, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(d.id(), None);
    }

    #[tokio::test]
    async fn import_by_composite_id() {
        let mock = Arc::new(MockDns::new());
        mock.records.lock().unwrap().insert(
            www(),
            RecordSet {
                name: "www.example.net".to_string(),
                record_type: "A".to_string(),
                ttl: 600,
                rdata: vec!["10.0.0.2".to_string()],
            },
        );
        let registry = registry(mock);
        let meta = OperationMeta::unconfigured();

        let (d, diags) = registry
            .import(&meta, RESOURCE_TYPE, "example.net:www.example.net:A")
            .await;
        assert!(diags.is_empty(), "{:?}", diags);
        let d = d.unwrap();
        assert_eq!(d.get_int("ttl").unwrap(), 600);
        assert_eq!(d.get_string_list("target").unwrap(), vec!["10.0.0.2"]);

        let (d, diags) = registry
            .import(&meta, RESOURCE_TYPE, "example.net:mail.example.net:MX")
            .await;
        assert!(d.is_none());
        assert!(diags.has_error());
    }

    #[tokio::test]
    async fn server_error_on_read_keeps_state() {
        let mock = Arc::new(MockDns::new());
        mock.fail("GetRecord", ApiError::status(500, "Internal Server Error"));
        let registry = registry(mock);
        let mut d =
            planned(&registry, "www.example.net").with_id("example.net:www.example.net:A");
        let diags = registry
            .read(&OperationMeta::unconfigured(), RESOURCE_TYPE, &mut d)
            .await;
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "calling 'GetRecord': API error 500: Internal Server Error"
        );
        assert_eq!(d.id(), Some("example.net:www.example.net:A"));
    }
}
