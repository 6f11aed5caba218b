use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::PrimitiveDateTime;

/// A contact record as exchanged with the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// User-editable contact fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    JobTitle,
    Address,
    City,
    State,
    ZipCode,
    Country,
    Notes,
}

impl ContactField {
    pub const ALL: [ContactField; 12] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Company,
        ContactField::JobTitle,
        ContactField::Address,
        ContactField::City,
        ContactField::State,
        ContactField::ZipCode,
        ContactField::Country,
        ContactField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactField::FirstName => "First Name",
            ContactField::LastName => "Last Name",
            ContactField::Email => "Email",
            ContactField::Phone => "Phone",
            ContactField::Company => "Company",
            ContactField::JobTitle => "Job Title",
            ContactField::Address => "Address",
            ContactField::City => "City",
            ContactField::State => "State",
            ContactField::ZipCode => "Zip Code",
            ContactField::Country => "Country",
            ContactField::Notes => "Notes",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            ContactField::FirstName => "John",
            ContactField::LastName => "Doe",
            ContactField::Email => "john@example.com",
            ContactField::Phone => "+1234567890",
            ContactField::Company => "Company Name",
            ContactField::JobTitle => "Job Title",
            ContactField::Address => "Street Address",
            ContactField::City => "City",
            ContactField::State => "State",
            ContactField::ZipCode => "Zip Code",
            ContactField::Country => "Country",
            ContactField::Notes => "Additional notes",
        }
    }
}

impl Contact {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::Phone => opt_str(&self.phone),
            ContactField::Company => opt_str(&self.company),
            ContactField::JobTitle => opt_str(&self.job_title),
            ContactField::Address => opt_str(&self.address),
            ContactField::City => opt_str(&self.city),
            ContactField::State => opt_str(&self.state),
            ContactField::ZipCode => opt_str(&self.zip_code),
            ContactField::Country => opt_str(&self.country),
            ContactField::Notes => opt_str(&self.notes),
        }
    }

    /// Set a field from user input. Empty optional fields become absent.
    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        let optional = if value.is_empty() {
            None
        } else {
            Some(value.clone())
        };
        match field {
            ContactField::FirstName => self.first_name = value,
            ContactField::LastName => self.last_name = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => self.phone = optional,
            ContactField::Company => self.company = optional,
            ContactField::JobTitle => self.job_title = optional,
            ContactField::Address => self.address = optional,
            ContactField::City => self.city = optional,
            ContactField::State => self.state = optional,
            ContactField::ZipCode => self.zip_code = optional,
            ContactField::Country => self.country = optional,
            ContactField::Notes => self.notes = optional,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Label/value pairs for the read-only detail view.
    pub fn detail_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Email", self.email.clone()),
            ("Phone", or_dash(&self.phone)),
            ("Company", or_dash(&self.company)),
            ("Job Title", or_dash(&self.job_title)),
        ];

        if let Some(address) = non_empty(&self.address) {
            let mut line = address.to_string();
            if let Some(city) = non_empty(&self.city) {
                line.push_str(", ");
                line.push_str(city);
            }
            if let Some(state) = non_empty(&self.state) {
                line.push_str(", ");
                line.push_str(state);
            }
            if let Some(zip) = non_empty(&self.zip_code) {
                line.push(' ');
                line.push_str(zip);
            }
            fields.push(("Address", line));
        }
        if let Some(country) = non_empty(&self.country) {
            fields.push(("Country", country.to_string()));
        }
        if let Some(notes) = non_empty(&self.notes) {
            fields.push(("Notes", notes.to_string()));
        }
        if let Some(photo) = non_empty(&self.photo_file_name) {
            fields.push(("Photo", photo.to_string()));
        }
        if let Some(created) = non_empty(&self.created_at) {
            fields.push(("Created", format_timestamp(created)));
        }
        if let Some(updated) = non_empty(&self.updated_at) {
            fields.push(("Updated", format_timestamp(updated)));
        }
        fields
    }
}

/// Page of contacts returned by the list and search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPage {
    pub content: Vec<Contact>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
}

impl<'de> Deserialize<'de> for ContactPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct PageMeta {
            #[serde(default)]
            total_elements: u64,
            #[serde(default)]
            total_pages: u32,
            #[serde(default)]
            number: u32,
            #[serde(default)]
            size: u32,
        }

        // Spring serializes either a flat `Page` or `{ content, page: {..} }`.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Nested {
                #[serde(default)]
                content: Vec<Contact>,
                page: PageMeta,
            },
            Flat {
                #[serde(default)]
                content: Vec<Contact>,
                #[serde(flatten)]
                meta: PageMeta,
            },
        }

        let (content, meta) = match Helper::deserialize(deserializer)? {
            Helper::Nested { content, page } => (content, page),
            Helper::Flat { content, meta } => (content, meta),
        };
        Ok(ContactPage {
            content,
            total_elements: meta.total_elements,
            total_pages: meta.total_pages,
            number: meta.number,
            size: meta.size,
        })
    }
}

/// Render a server timestamp as `YYYY-MM-DD HH:MM`, or return it unchanged
/// when it is not a local ISO date-time.
pub fn format_timestamp(raw: &str) -> String {
    let without_fraction = raw.split('.').next().unwrap_or(raw);
    let input = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let output = format_description!("[year]-[month]-[day] [hour]:[minute]");
    PrimitiveDateTime::parse(without_fraction, &input)
        .ok()
        .and_then(|parsed| parsed.format(&output).ok())
        .unwrap_or_else(|| raw.to_string())
}

pub fn or_dash(value: &Option<String>) -> String {
    non_empty(value).unwrap_or("-").to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn opt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_wire_format_uses_camel_case_and_skips_absent() {
        let mut contact = Contact::default();
        contact.set_field(ContactField::FirstName, "John");
        contact.set_field(ContactField::JobTitle, "Engineer");
        contact.set_field(ContactField::Phone, "");

        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["jobTitle"], "Engineer");
        assert!(json.get("phone").is_none());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_contact_decodes_server_record() {
        let raw = r#"{
            "id": 7,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "phone": null,
            "zipCode": "12345",
            "createdAt": "2024-03-01T09:15:42.123456"
        }"#;
        let contact: Contact = serde_json::from_str(raw).unwrap();
        assert_eq!(contact.id, Some(7));
        assert_eq!(contact.full_name(), "Ada Lovelace");
        assert_eq!(contact.phone, None);
        assert_eq!(contact.field(ContactField::ZipCode), "12345");
    }

    #[test]
    fn test_page_decodes_flat_shape() {
        let raw = r#"{
            "content": [{"id": 1, "firstName": "A", "lastName": "B", "email": "a@b.co"}],
            "totalElements": 11,
            "totalPages": 2,
            "number": 1,
            "size": 10,
            "first": false,
            "last": true,
            "pageable": {"pageNumber": 1}
        }"#;
        let page: ContactPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.total_elements, 11);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.number, 1);
    }

    #[test]
    fn test_page_decodes_nested_shape() {
        let raw = r#"{
            "content": [],
            "page": {"size": 10, "number": 0, "totalElements": 0, "totalPages": 0}
        }"#;
        let page: ContactPage = serde_json::from_str(raw).unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.size, 10);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_detail_fields_compose_address() {
        let contact = Contact {
            email: "john@example.com".into(),
            address: Some("1 Main St".into()),
            city: Some("Springfield".into()),
            zip_code: Some("99999".into()),
            ..Default::default()
        };
        let fields = contact.detail_fields();
        assert!(fields.contains(&("Phone", "-".to_string())));
        assert!(fields.contains(&("Address", "1 Main St, Springfield 99999".to_string())));
        assert!(!fields.iter().any(|(label, _)| *label == "Country"));
    }

    #[test]
    fn test_detail_fields_skip_city_without_address() {
        let contact = Contact {
            city: Some("Springfield".into()),
            ..Default::default()
        };
        assert!(!contact
            .detail_fields()
            .iter()
            .any(|(label, _)| *label == "Address"));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-03-01T09:15:42.123456"), "2024-03-01 09:15");
        assert_eq!(format_timestamp("2024-03-01T09:15:42"), "2024-03-01 09:15");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
