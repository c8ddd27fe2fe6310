use async_trait::async_trait;
use edgeform_core::client::OperationMeta;
use edgeform_core::json_payload;
use edgeform_core::provider::{DataSource, ProviderError, ProviderResult};
use edgeform_core::resource::ResourceData;
use edgeform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::MediaKind;

/// Top-level policy keys that only image policies understand
const IMAGE_ONLY_KEYS: &[&str] = &[
    "transformations",
    "postBreakpointTransformations",
    "imageQuery",
    "imageInterpolation",
];

/// Canonical JSON of a policy document, ready for a policy resource
pub(crate) struct PolicyDocument {
    pub(crate) kind: MediaKind,
}

#[async_trait]
impl DataSource for PolicyDocument {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.kind.policy_type())
            .attribute(
                AttributeSchema::new("policy", types::json_string())
                    .required()
                    .with_description("The policy document"),
            )
            .attribute(AttributeSchema::new("json", AttributeType::String).computed())
    }

    async fn read(&self, _meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", self.kind.policy_type());
        let raw = d.get_string("policy")?;
        let document: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|source| ProviderError::InvalidJson {
                field: "policy".to_string(),
                source,
            })?;

        if self.kind == MediaKind::Video
            && let Some(key) = IMAGE_ONLY_KEYS.iter().find(|k| document.contains_key(**k))
        {
            return Err(ProviderError::InvalidValue {
                field: "policy".to_string(),
                message: format!("'{}' is not supported in video policies", key),
            });
        }

        let canonical = json_payload::canonicalize(&raw).map_err(|source| {
            ProviderError::InvalidJson {
                field: "policy".to_string(),
                source,
            }
        })?;
        d.set("json", canonical)?;
        d.set_id(self.kind.policy_type());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::ImagingProvider;
    use super::super::mock::MockImaging;
    use super::*;
    use edgeform_core::ProviderRegistry;

    async fn read(kind: MediaKind, policy: &str) -> (ResourceData, edgeform_core::Diagnostics) {
        let registry = ProviderRegistry::builder()
            .subprovider(Arc::new(ImagingProvider::with_client(Arc::new(
                MockImaging::new(),
            ))))
            .build()
            .unwrap();
        let mut d = registry
            .new_data_source_data(kind.policy_type())
            .unwrap()
            .with_attribute("policy", policy);
        let diags = registry
            .read_data_source(&OperationMeta::unconfigured(), kind.policy_type(), &mut d)
            .await;
        (d, diags)
    }

    #[tokio::test]
    async fn keys_are_sorted_at_every_depth() {
        let (d, diags) = read(
            MediaKind::Image,
            r#"{"output": {"quality": 80, "adaptiveQuality": 50}, "breakpoints": {"widths": [640, 320]}}"#,
        )
        .await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(
            d.get_string("json").unwrap(),
            r#"{"breakpoints":{"widths":[640,320]},"output":{"adaptiveQuality":50,"quality":80}}"#
        );
    }

    #[tokio::test]
    async fn video_policy_rejects_image_transformations() {
        let (d, diags) = read(
            MediaKind::Video,
            r#"{"transformations": [{"transformation": "Blur"}]}"#,
        )
        .await;
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "invalid value for 'policy': 'transformations' is not supported in video policies"
        );
        assert_eq!(d.id(), None);
    }
}
