use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Azure cloud the declaration targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AzureCloud {
    #[default]
    Global,
    China,
    UsGov,
    Germany,
    /// Sovereign or private cloud; every endpoint comes from [`CloudEndpoints`].
    Custom,
}

/// Endpoints for a custom Azure cloud.
///
/// Only consulted when the declaration uses [`AzureCloud::Custom`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudEndpoints {
    pub authentication_endpoint: Option<String>,
    pub resource_manager_endpoint: Option<String>,
    pub management_endpoint: Option<String>,
    pub graph_endpoint: Option<String>,
    pub storage_endpoint_suffix: Option<String>,
    pub key_vault_suffix: Option<String>,
    pub metrics_client_audience: Option<String>,
    pub metrics_query_audience: Option<String>,
    pub log_analytics_endpoint: Option<String>,
}

/// Resolved set of endpoints used to authenticate and talk to a cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudEnvironment {
    pub name: &'static str,
    pub authentication_endpoint: String,
    pub management_endpoint: String,
    pub resource_manager_endpoint: String,
    /// Germany never had a Log Analytics deployment.
    pub log_analytics_endpoint: Option<String>,
}

impl AzureCloud {
    /// Resolve the endpoints for this cloud.
    ///
    /// Well-known clouds ignore `endpoints`; [`AzureCloud::Custom`] requires the
    /// authentication, management and resource manager endpoints to be present.
    pub fn environment(&self, endpoints: Option<&CloudEndpoints>) -> Result<CloudEnvironment, ModelError> {
        let env = match self {
            AzureCloud::Global => well_known(
                "AzureGlobalCloud",
                "https://login.microsoftonline.com/",
                "https://management.core.windows.net/",
                "https://management.azure.com/",
                Some("https://api.loganalytics.io/"),
            ),
            AzureCloud::China => well_known(
                "AzureChinaCloud",
                "https://login.chinacloudapi.cn/",
                "https://management.core.chinacloudapi.cn/",
                "https://management.chinacloudapi.cn/",
                Some("https://api.loganalytics.azure.cn/"),
            ),
            AzureCloud::UsGov => well_known(
                "AzureUSGovernment",
                "https://login.microsoftonline.us/",
                "https://management.core.usgovcloudapi.net/",
                "https://management.usgovcloudapi.net/",
                Some("https://api.loganalytics.us/"),
            ),
            AzureCloud::Germany => well_known(
                "AzureGermanCloud",
                "https://login.microsoftonline.de/",
                "https://management.core.cloudapi.de/",
                "https://management.microsoftazure.de/",
                None,
            ),
            AzureCloud::Custom => {
                let endpoints = endpoints.ok_or(ModelError::MissingEndpoint("endpoints"))?;
                CloudEnvironment {
                    name: "AzureCustomCloud",
                    authentication_endpoint: required(
                        &endpoints.authentication_endpoint,
                        "authenticationEndpoint",
                    )?,
                    management_endpoint: required(
                        &endpoints.management_endpoint,
                        "managementEndpoint",
                    )?,
                    resource_manager_endpoint: required(
                        &endpoints.resource_manager_endpoint,
                        "resourceManagerEndpoint",
                    )?,
                    log_analytics_endpoint: endpoints
                        .log_analytics_endpoint
                        .clone()
                        .filter(|s| !s.trim().is_empty()),
                }
            }
        };
        Ok(env)
    }
}

fn well_known(
    name: &'static str,
    authentication: &str,
    management: &str,
    resource_manager: &str,
    log_analytics: Option<&str>,
) -> CloudEnvironment {
    CloudEnvironment {
        name,
        authentication_endpoint: authentication.to_string(),
        management_endpoint: management.to_string(),
        resource_manager_endpoint: resource_manager.to_string(),
        log_analytics_endpoint: log_analytics.map(str::to_string),
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, ModelError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ModelError::MissingEndpoint(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_cloud_has_log_analytics() {
        let env = AzureCloud::Global.environment(None).unwrap();
        assert_eq!(env.name, "AzureGlobalCloud");
        assert!(env.log_analytics_endpoint.is_some());
    }

    #[test]
    fn germany_has_no_log_analytics() {
        let env = AzureCloud::Germany.environment(None).unwrap();
        assert!(env.log_analytics_endpoint.is_none());
    }

    #[test]
    fn custom_cloud_requires_endpoints() {
        assert_eq!(
            AzureCloud::Custom.environment(None),
            Err(ModelError::MissingEndpoint("endpoints"))
        );

        let partial = CloudEndpoints {
            authentication_endpoint: Some("https://login.example/".into()),
            ..Default::default()
        };
        assert_eq!(
            AzureCloud::Custom.environment(Some(&partial)),
            Err(ModelError::MissingEndpoint("managementEndpoint"))
        );
    }

    #[test]
    fn custom_cloud_resolves_configured_endpoints() {
        let endpoints = CloudEndpoints {
            authentication_endpoint: Some("https://login.example/".into()),
            management_endpoint: Some("https://mgmt.example/".into()),
            resource_manager_endpoint: Some("https://arm.example/".into()),
            log_analytics_endpoint: Some("  ".into()),
            ..Default::default()
        };
        let env = AzureCloud::Custom.environment(Some(&endpoints)).unwrap();
        assert_eq!(env.resource_manager_endpoint, "https://arm.example/");
        assert!(env.log_analytics_endpoint.is_none());
    }
}
