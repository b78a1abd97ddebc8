use serde::{Deserialize, Serialize};

use crate::domain::ContactId;

/// Body of `POST /persons`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactId>,
    pub name: String,
    pub number: String,
}

/// Body of `PUT /persons/:id`. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

pub fn persons_route() -> &'static str {
    "/persons"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Contact;

    #[test]
    fn contact_id_accepts_numbers_and_strings() {
        let from_text: Contact =
            serde_json::from_str(r#"{"id":"7","name":"Ada","number":"1"}"#).expect("json");
        let from_number: Contact =
            serde_json::from_str(r#"{"id":7,"name":"Ada","number":"1"}"#).expect("json");
        assert_eq!(from_text, from_number);
        assert_eq!(from_number.id.as_number(), Some(7));
    }

    #[test]
    fn contact_id_serializes_as_string() {
        let json = serde_json::to_value(Contact::new(3u64, "Bo", "9")).expect("json");
        assert_eq!(json["id"], serde_json::json!("3"));
    }

    #[test]
    fn opaque_ids_have_no_numeric_value() {
        assert_eq!(ContactId::new("a1f3").as_number(), None);
    }

    #[test]
    fn new_contact_omits_missing_id() {
        let body = NewContact {
            id: None,
            name: "Bo".into(),
            number: "9".into(),
        };
        let json = serde_json::to_value(&body).expect("json");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = ContactPatch {
            number: Some("2".into()),
            ..ContactPatch::default()
        };
        assert_eq!(
            serde_json::to_string(&patch).expect("json"),
            r#"{"number":"2"}"#
        );
    }
}
