use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of Azure resource; picks the scraper used for a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    /// Any resource addressed by its provider path.
    Generic,
    VirtualMachine,
    StorageAccount,
    ServiceBusNamespace,
    SqlDatabase,
    RedisCache,
    /// Log Analytics workspace; queried through the logs API, not metrics.
    LogAnalytics,
}

impl ResourceType {
    /// Short symbolic identifier used for logging and labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Generic => "generic",
            ResourceType::VirtualMachine => "virtualMachine",
            ResourceType::StorageAccount => "storageAccount",
            ResourceType::ServiceBusNamespace => "serviceBusNamespace",
            ResourceType::SqlDatabase => "sqlDatabase",
            ResourceType::RedisCache => "redisCache",
            ResourceType::LogAnalytics => "logAnalytics",
        }
    }

    /// ARM provider namespace and type; `None` for [`ResourceType::Generic`].
    pub fn provider_namespace(&self) -> Option<&'static str> {
        match self {
            ResourceType::Generic => None,
            ResourceType::VirtualMachine => Some("Microsoft.Compute/virtualMachines"),
            ResourceType::StorageAccount => Some("Microsoft.Storage/storageAccounts"),
            ResourceType::ServiceBusNamespace => Some("Microsoft.ServiceBus/namespaces"),
            ResourceType::SqlDatabase => Some("Microsoft.Sql/servers/databases"),
            ResourceType::RedisCache => Some("Microsoft.Cache/redis"),
            ResourceType::LogAnalytics => Some("Microsoft.OperationalInsights/workspaces"),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource to scrape, either declared or returned by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub resource_type: ResourceType,
    /// Overrides the declaration subscription when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Overrides the declaration resource group when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,
    pub scope: ResourceScope,
}

/// What a [`ResourceDefinition`] points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResourceScope {
    /// A single named resource. For [`ResourceType::Generic`] the name is the full
    /// provider path, e.g. `Microsoft.Network/loadBalancers/lb-1`.
    Resource { name: String },
    /// Every resource of the type inside the resource group.
    ResourceGroup,
    /// Every resource of the type inside the subscription.
    Subscription,
}

impl ResourceDefinition {
    pub fn resource(resource_type: ResourceType, name: impl Into<String>) -> Self {
        Self::scoped(resource_type, ResourceScope::Resource { name: name.into() })
    }

    pub fn resource_group(resource_type: ResourceType, resource_group: impl Into<String>) -> Self {
        Self::scoped(resource_type, ResourceScope::ResourceGroup).with_resource_group(resource_group)
    }

    pub fn subscription(resource_type: ResourceType, subscription: impl Into<String>) -> Self {
        Self::scoped(resource_type, ResourceScope::Subscription).with_subscription(subscription)
    }

    fn scoped(resource_type: ResourceType, scope: ResourceScope) -> Self {
        Self {
            resource_type,
            subscription_id: None,
            resource_group_name: None,
            scope,
        }
    }

    pub fn with_subscription(mut self, subscription: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription.into());
        self
    }

    pub fn with_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group_name = Some(resource_group.into());
        self
    }

    /// Resource-specific subscription, ignoring blank values.
    pub fn subscription_override(&self) -> Option<&str> {
        non_blank(self.subscription_id.as_deref())
    }

    /// Resource-specific resource group, ignoring blank values.
    pub fn resource_group_override(&self) -> Option<&str> {
        non_blank(self.resource_group_name.as_deref())
    }

    /// Human readable name for logs.
    pub fn resource_name(&self) -> &str {
        match &self.scope {
            ResourceScope::Resource { name } => name,
            ResourceScope::ResourceGroup => self.resource_group_override().unwrap_or("<resource group>"),
            ResourceScope::Subscription => self.subscription_override().unwrap_or("<subscription>"),
        }
    }

    /// ARM URI of the resource given the effective subscription and resource group.
    pub fn resource_uri(&self, subscription_id: &str, resource_group: &str) -> String {
        match &self.scope {
            ResourceScope::Subscription => format!("/subscriptions/{subscription_id}"),
            ResourceScope::ResourceGroup => {
                format!("/subscriptions/{subscription_id}/resourceGroups/{resource_group}")
            }
            ResourceScope::Resource { name } => match self.resource_type.provider_namespace() {
                Some(namespace) => format!(
                    "/subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/{namespace}/{name}"
                ),
                None => format!(
                    "/subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/{}",
                    name.trim_start_matches('/')
                ),
            },
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
