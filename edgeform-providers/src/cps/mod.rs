//! Certificate provisioning subprovider
//!
//! Only exposes the catalogue of verification warnings, used to
//! acknowledge warnings on enrollments.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use edgeform_core::client::OperationMeta;
use edgeform_core::provider::{DataSource, ProviderResult, Resource, Subprovider};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Update anytime the subprovider adds new features
pub const PROVIDER_VERSION: &str = "v0.0.1";

const WARNINGS: &str = "akamai_cps_warnings";

/// Pre- and post-verification warning IDs with their descriptions
const WARNING_MAP: &[(&str, &str)] = &[
    (
        "CERTIFICATE_ADDED_TO_TRUST_CHAIN",
        "Certificate has been added to the trust chain.",
    ),
    (
        "CERTIFICATE_ALREADY_LOADED",
        "Certificate has already been loaded.",
    ),
    (
        "CERTIFICATE_DATA_BLANK_OR_MISSING",
        "Certificate data is blank or missing for '<key-type>'.",
    ),
    (
        "CERTIFICATE_EXPIRATION_DATE_BEYOND_MAX_DAYS",
        "The certificate expiration date is beyond the maximum allowed duration.",
    ),
    (
        "CERTIFICATE_HAS_NULL_ISSUER",
        "Certificate '<certificate>' has a null issuer.",
    ),
    (
        "CERTIFICATE_KEY_TYPE_MISMATCH",
        "Use an '<key-type>' certificate.",
    ),
    (
        "CERTIFICATE_NOT_YET_VALID",
        "Certificate '<certificate>' is not valid yet.",
    ),
    (
        "CERTIFICATE_TRUST_CHAIN_INCOMPLETE",
        "The trust chain of the certificate is incomplete.",
    ),
    (
        "DNS_NAME_LONGER_THEN_255_CHARS",
        "The DNS name is longer than 255 characters.",
    ),
    (
        "MAX_SAN_COUNT_EXCEEDED",
        "The number of SANs exceeds the maximum allowed for the enrollment.",
    ),
    (
        "SIGNATURE_ALGORITHM_DOES_NOT_MATCH",
        "The signature algorithm of the certificate does not match the enrollment.",
    ),
    (
        "TRUST_CHAIN_EMPTY_AND_CERTIFICATE_SIGNED_BY_NON_STANDARD_ROOT",
        "The trust chain is empty and the certificate is signed by a non-standard root.",
    ),
];

pub struct CpsProvider;

impl Subprovider for CpsProvider {
    fn name(&self) -> &'static str {
        "cps"
    }

    fn version(&self) -> &'static str {
        PROVIDER_VERSION
    }

    fn resources(&self) -> BTreeMap<String, Arc<dyn Resource>> {
        BTreeMap::new()
    }

    fn data_sources(&self) -> BTreeMap<String, Arc<dyn DataSource>> {
        let mut data_sources: BTreeMap<String, Arc<dyn DataSource>> = BTreeMap::new();
        data_sources.insert(WARNINGS.to_string(), Arc::new(Warnings));
        data_sources
    }
}

struct Warnings;

#[async_trait]
impl DataSource for Warnings {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(WARNINGS)
            .with_description(
                "Returns a map of pre- and post-verification warnings alongside with \
                 identifiers to be used in acknowledging warnings lists",
            )
            .attribute(
                AttributeSchema::new(
                    "warnings",
                    AttributeType::Map(Box::new(AttributeType::String)),
                )
                .computed()
                .with_description(
                    "Map of pre- and post-verification warnings consisting of the warning \
                     id and description",
                ),
            )
    }

    async fn read(&self, _meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", WARNINGS);
        let warnings: BTreeMap<String, String> = WARNING_MAP
            .iter()
            .map(|(id, description)| (id.to_string(), description.to_string()))
            .collect();
        d.set("warnings", Value::from(warnings))?;
        d.set_id(WARNINGS);
        Ok(())
    }
}
