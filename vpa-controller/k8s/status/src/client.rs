use crate::{
    core::UpdateVpaStatus,
    k8s::{self, VerticalPodAutoscalerStatus},
};

const FIELD_MANAGER: &str = "vpa-status-controller";

/// Writes autoscaler statuses through the Kubernetes API.
#[derive(Clone)]
pub struct StatusClient {
    client: k8s::Client,
    params: k8s::PatchParams,
}

impl StatusClient {
    pub fn new(client: k8s::Client) -> Self {
        Self {
            client,
            params: k8s::PatchParams {
                field_manager: Some(FIELD_MANAGER.to_string()),
                ..Default::default()
            },
        }
    }
}

#[async_trait::async_trait]
impl UpdateVpaStatus for StatusClient {
    type Error = k8s::Error;

    async fn update_status(
        &self,
        namespace: &str,
        name: &str,
        status: VerticalPodAutoscalerStatus,
    ) -> Result<VerticalPodAutoscalerStatus, k8s::Error> {
        let api = k8s::Api::<k8s::VerticalPodAutoscaler>::namespaced(self.client.clone(), namespace);
        let patch = make_patch(&status).map_err(k8s::Error::SerdeError)?;
        let vpa = api
            .patch_status(name, &self.params, &k8s::Patch::Merge(patch))
            .await?;
        Ok(vpa.status.unwrap_or_default())
    }
}

/// Builds a merge patch that replaces the whole status. Absent fields are
/// written as `null` so that stale values are removed.
pub(crate) fn make_patch(
    status: &VerticalPodAutoscalerStatus,
) -> Result<serde_json::Value, serde_json::Error> {
    let mut value = serde_json::to_value(status)?;
    if let Some(fields) = value.as_object_mut() {
        for key in ["recommendation", "conditions"] {
            fields
                .entry(key)
                .or_insert(serde_json::Value::Null);
        }
    }
    Ok(serde_json::json!({ "status": value }))
}
