use prost::Message;

pub mod consumer;
pub mod error;
pub mod producer;
pub mod registry;
pub mod telemetry;

pub use error::PipeError;

// =============================================================================
// CORE DATA STRUCTURES
// =============================================================================

/// One address book entry.
///
/// This is the domain form: parsed from JSON data files and printed to the
/// log. The wire form is the generated `addressbook.v1.Person`; conversions
/// between the two live below.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl Person {
    /// Record key on the wire: the decimal rendering of the id.
    pub fn key(&self) -> String {
        self.id.to_string()
    }

    /// Parse an entry from its JSON file form. Missing fields take their
    /// zero values; unknown fields are rejected.
    pub fn from_json_slice(bytes: &[u8], context: &str) -> Result<Self, PipeError> {
        serde_json::from_slice(bytes).map_err(|e| PipeError::from_parse_error(e, context))
    }

    /// Encode into the record value wire form.
    pub fn to_wire(&self) -> Vec<u8> {
        protopipe_proto::Person::from(self).encode_to_vec()
    }

    /// Decode from the record value wire form. An empty payload yields the
    /// all-default entry, per proto3.
    pub fn from_wire(bytes: &[u8], context: &str) -> Result<Self, PipeError> {
        let wire = protopipe_proto::Person::decode(bytes)
            .map_err(|e| PipeError::from_parse_error(e, context))?;
        Ok(wire.into())
    }
}

impl From<&Person> for protopipe_proto::Person {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            name: person.name.clone(),
            email: person.email.clone(),
        }
    }
}

impl From<protopipe_proto::Person> for Person {
    fn from(wire: protopipe_proto::Person) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            email: wire.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_parsing() {
        let person = Person::from_json_slice(
            br#"{"id":1,"name":"Ada","email":"ada@example.com"}"#,
            "record file",
        )
        .unwrap();

        assert_eq!(person.id, 1);
        assert_eq!(person.name, "Ada");
        assert_eq!(person.email, "ada@example.com");
        assert_eq!(person.key(), "1");
    }

    #[test]
    fn test_json_missing_fields_take_defaults() {
        let person = Person::from_json_slice(br#"{"id":7}"#, "record file").unwrap();

        assert_eq!(person.id, 7);
        assert_eq!(person.name, "");
        assert_eq!(person.email, "");
    }

    #[test]
    fn test_json_rejects_unknown_fields() {
        let result = Person::from_json_slice(br#"{"id":1,"phone":"555-0100"}"#, "record file");
        assert!(matches!(result, Err(PipeError::InvalidRecord { .. })));
    }

    #[test]
    fn test_json_rejects_malformed_input() {
        let result = Person::from_json_slice(b"not json", "record file");
        match result {
            Err(PipeError::InvalidRecord { context, .. }) => {
                assert_eq!(context, "record file");
            }
            other => panic!("Expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_wire_round_trip() {
        let person = Person {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };

        let decoded = Person::from_wire(&person.to_wire(), "round trip").unwrap();
        assert_eq!(decoded, person);
    }

    #[test]
    fn test_empty_payload_decodes_to_default() {
        let person = Person::from_wire(b"", "record value").unwrap();
        assert_eq!(person, Person::default());
    }

    #[test]
    fn test_malformed_payload_is_invalid_record() {
        let result = Person::from_wire(&[0xff, 0xff, 0xff], "record value");
        assert!(matches!(result, Err(PipeError::InvalidRecord { .. })));
    }
}
