use super::{ResourceKind, Sku, impl_resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Storage account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: StorageAccountProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    /// Service URLs keyed by service; routing preference adds nested objects
    #[serde(default, skip_serializing)]
    pub primary_endpoints: HashMap<String, Value>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

impl StorageAccount {
    /// Primary URL of one service (`blob`, `file`, `queue`, ...)
    pub fn primary_endpoint(&self, service: &str) -> Option<&str> {
        self.properties
            .primary_endpoints
            .get(service)
            .and_then(Value::as_str)
    }
}

impl_resource!(StorageAccount, ResourceKind::StorageAccount);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Resource;
    use serde_json::json;

    #[test]
    fn test_storage_account_request_body() {
        let account = StorageAccount {
            location: Some("westus".to_string()),
            sku: Some(Sku::new("Standard_LRS")),
            kind: Some("StorageV2".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&account).unwrap(),
            json!({
                "location": "westus",
                "sku": { "name": "Standard_LRS" },
                "kind": "StorageV2",
                "properties": {}
            })
        );
    }

    #[test]
    fn test_storage_account_with_routing_endpoints() {
        let account: StorageAccount = serde_json::from_value(json!({
            "name": "vmflowst0307090501",
            "location": "westus",
            "kind": "StorageV2",
            "properties": {
                "provisioningState": "Succeeded",
                "primaryEndpoints": {
                    "blob": "https://vmflowst0307090501.blob.core.windows.net/",
                    "web": "https://vmflowst0307090501.z22.web.core.windows.net/",
                    "microsoftEndpoints": {
                        "blob": "https://vmflowst0307090501-microsoftrouting.blob.core.windows.net/"
                    },
                    "internetEndpoints": {
                        "blob": "https://vmflowst0307090501-internetrouting.blob.core.windows.net/"
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(account.provisioning_state(), Some("Succeeded"));
        assert_eq!(
            account.primary_endpoint("blob"),
            Some("https://vmflowst0307090501.blob.core.windows.net/")
        );
        assert_eq!(account.primary_endpoint("microsoftEndpoints"), None);
    }
}
