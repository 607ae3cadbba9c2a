//! Module description handed to the host's gateway settings screen.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetaData {
    pub display_name: &'static str,
    #[serde(rename = "APIVersion")]
    pub api_version: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    System,
    Text,
    Password,
    Yesno,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigField {
    #[serde(skip)]
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<&'static str>,
    #[serde(rename = "Type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleDefinition {
    pub meta: MetaData,
    pub config: serde_json::Map<String, serde_json::Value>,
}

pub fn metadata() -> MetaData {
    MetaData { display_name: "Stancer", api_version: "1.1" }
}

fn key_field(name: &'static str, friendly: &'static str, field_type: FieldType, description: &'static str) -> ConfigField {
    ConfigField {
        name,
        friendly_name: Some(friendly),
        field_type,
        size: Some("50"),
        default: Some(""),
        value: None,
        description: Some(description),
    }
}

/// Admin settings in display order.
pub fn config_fields() -> Vec<ConfigField> {
    vec![
        ConfigField {
            name: "FriendlyName",
            friendly_name: None,
            field_type: FieldType::System,
            size: None,
            default: None,
            value: Some("Stancer"),
            description: None,
        },
        key_field("livePublicKey", "Public KEY - LIVE", FieldType::Text, "Enter your live public key"),
        key_field("liveSecretKey", "Secret KEY - LIVE", FieldType::Password, "Enter your live secret key"),
        key_field("testPublicKey", "Public KEY - TEST", FieldType::Text, "Enter your test public key"),
        key_field("testSecretKey", "Secret KEY - TEST", FieldType::Password, "Enter your test secret key"),
        ConfigField {
            name: "testMode",
            friendly_name: Some("Test Mode"),
            field_type: FieldType::Yesno,
            size: None,
            default: None,
            value: None,
            description: Some("Tick to enable test mode"),
        },
    ]
}

pub fn module_definition() -> ModuleDefinition {
    let config = config_fields()
        .into_iter()
        .filter_map(|field| {
            serde_json::to_value(&field)
                .ok()
                .map(|value| (field.name.to_string(), value))
        })
        .collect();
    ModuleDefinition { meta: metadata(), config }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_lists_all_settings() {
        let def = module_definition();
        let keys: Vec<&str> = def.config.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 6);
        assert!(keys.contains(&"liveSecretKey"));
        assert_eq!(def.config["testMode"]["Type"], "yesno");
        assert_eq!(def.config["liveSecretKey"]["Type"], "password");
        assert_eq!(def.config["FriendlyName"]["Value"], "Stancer");
        let meta = serde_json::to_value(def.meta).unwrap();
        assert_eq!(meta["APIVersion"], "1.1");
        assert_eq!(meta["DisplayName"], "Stancer");
    }
}
