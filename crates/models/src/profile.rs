use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TABLE: &str = "profiles";

/// Optional signup fields that enrich the profile row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub email: String,
}

/// The `profiles` row written at signup. `id` is the identity provider's user id.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub email: String,
}

impl Profile {
    pub fn new(id: impl Into<String>, fields: ProfileFields) -> Self {
        Self {
            id: id.into(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            mobile: fields.mobile,
            email: fields.email,
        }
    }
}

/// A stored `profiles` row exactly as the store returned it: column names,
/// value types and absent columns are all preserved.
///
/// Anything other than a JSON object fails to deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ProfileRow(pub Map<String, Value>);

impl ProfileRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_row_is_kept_as_is() {
        let row = json!({
            "id": "u-1",
            "first_name": "Ada",
            "mobile": 5551234,
            "created_at": "2024-01-01T00:00:00Z"
        });
        let stored: ProfileRow = serde_json::from_value(row.clone()).unwrap();
        assert_eq!(stored.get("mobile"), Some(&json!(5551234)));
        assert_eq!(stored.get("last_name"), None);
        assert_eq!(serde_json::to_value(&stored).unwrap(), row);
    }

    #[test]
    fn non_object_row_is_rejected() {
        assert!(serde_json::from_value::<ProfileRow>(json!(["u-1"])).is_err());
        assert!(serde_json::from_value::<ProfileRow>(json!("u-1")).is_err());
    }

    #[test]
    fn signup_row_carries_every_field() {
        let fields = ProfileFields { first_name: "Ada".into(), email: "a@x.com".into(), ..Default::default() };
        let out = serde_json::to_value(Profile::new("u-1", fields)).unwrap();
        assert_eq!(
            out,
            json!({"id": "u-1", "first_name": "Ada", "last_name": "", "mobile": "", "email": "a@x.com"})
        );
    }
}
