//! Module descriptor metadata.
//!
//! A descriptor is parsed from one module directory's `module.json` and is
//! immutable after load. The descriptor list and the aggregated action list
//! are the read-only external contract served at `/api/modules` and
//! `/api/actions`.

use serde::{Deserialize, Serialize};

/// HTTP verb a module route or action is invoked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
            HttpVerb::Patch => "patch",
        }
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, externally invokable operation advertised by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub method: HttpVerb,
    pub url: String,
}

/// Static, validated metadata for one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Unique module name. Duplicates across the module source are a fatal
    /// load error.
    pub name: String,

    /// Display string for the client shell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Opaque icon identifier for the client shell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Actions this module advertises at `/api/actions`.
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_parses_minimal_metadata() {
        let descriptor: ModuleDescriptor =
            serde_json::from_str(r#"{"name": "Statistics"}"#).unwrap();
        assert_eq!(descriptor.name, "Statistics");
        assert!(descriptor.label.is_none());
        assert!(descriptor.icon.is_none());
        assert!(descriptor.actions.is_empty());
    }

    #[test]
    fn descriptor_parses_actions_in_order() {
        let descriptor: ModuleDescriptor = serde_json::from_str(
            r#"{
                "name": "Power",
                "label": "Power",
                "icon": "icon-off",
                "actions": [
                    {"name": "Restart", "method": "post", "url": "/api/actions/restart"},
                    {"name": "Shutdown", "method": "post", "url": "/api/actions/shutdown"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(descriptor.actions.len(), 2);
        assert_eq!(descriptor.actions[0].name, "Restart");
        assert_eq!(descriptor.actions[1].name, "Shutdown");
        assert_eq!(descriptor.actions[0].method, HttpVerb::Post);
    }

    #[test]
    fn descriptor_rejects_unknown_verb() {
        let result = serde_json::from_str::<ModuleDescriptor>(
            r#"{"name": "Bad", "actions": [{"name": "X", "method": "brew", "url": "/x"}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn optional_fields_are_skipped_when_serialized() {
        let descriptor = ModuleDescriptor {
            name: "Statistics".to_string(),
            label: None,
            icon: None,
            actions: Vec::new(),
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert!(json.get("label").is_none());
        assert!(json.get("icon").is_none());
    }
}
