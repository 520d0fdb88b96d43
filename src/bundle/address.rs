//! Typed view over positional address records
//!
//! On the wire an address is `{ type, line: [..], country, state, district, ... }`
//! where every `line` offset has a fixed meaning. Inside the engine addresses are
//! handled as [`Address`] and only turned back into the positional array at the
//! bundle boundary, so an offset can never drift.

use crate::error::{FormError, Result};
use serde_json::{Map, Value};

/// Number of positional lines every written address carries
pub const LINE_COUNT: usize = 11;

/// Semantic meaning of each `line` offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressLine {
    Country = 0,
    Number = 1,
    Street = 2,
    ResidentialArea = 3,
    Town = 4,
    Village = 5,
    Chief = 6,
    UrbanOrRural = 7,
    InternationalLine1 = 8,
    InternationalLine2 = 9,
    InternationalLine3 = 10,
}

impl AddressLine {
    pub const ALL: [AddressLine; LINE_COUNT] = [
        AddressLine::Country,
        AddressLine::Number,
        AddressLine::Street,
        AddressLine::ResidentialArea,
        AddressLine::Town,
        AddressLine::Village,
        AddressLine::Chief,
        AddressLine::UrbanOrRural,
        AddressLine::InternationalLine1,
        AddressLine::InternationalLine2,
        AddressLine::InternationalLine3,
    ];

    pub fn offset(self) -> usize {
        self as usize
    }

    pub fn from_offset(offset: usize) -> Option<Self> {
        Self::ALL.get(offset).copied()
    }
}

/// Something a single form field can address inside an address record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressComponent {
    Line(AddressLine),
    Country,
    State,
    District,
    InternationalState,
    InternationalDistrict,
    PostalCode,
}

impl AddressComponent {
    /// Accepts a line offset (number or numeric string) or a key name
    pub fn from_param(param: &Value) -> Option<Self> {
        match param {
            Value::Number(n) => n
                .as_u64()
                .and_then(|o| AddressLine::from_offset(o as usize))
                .map(Self::Line),
            Value::String(s) => match s.as_str() {
                "country" => Some(Self::Country),
                "state" => Some(Self::State),
                "district" => Some(Self::District),
                "internationalState" => Some(Self::InternationalState),
                "internationalDistrict" => Some(Self::InternationalDistrict),
                "postalCode" => Some(Self::PostalCode),
                other => other
                    .parse::<usize>()
                    .ok()
                    .and_then(AddressLine::from_offset)
                    .map(Self::Line),
            },
            _ => None,
        }
    }

    /// Local keys route to their international counterparts outside the default country
    pub fn route(self, is_default_country: bool) -> Self {
        match (self, is_default_country) {
            (Self::State, false) => Self::InternationalState,
            (Self::District, false) => Self::InternationalDistrict,
            (other, _) => other,
        }
    }

    /// Whether a query for this component applies under the given country
    pub fn readable_for(self, is_default_country: bool) -> bool {
        match self {
            Self::State | Self::District => is_default_country,
            Self::InternationalState | Self::InternationalDistrict => !is_default_country,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub address_type: Option<String>,
    lines: [Option<String>; LINE_COUNT],
    /// Positions past the known layout, kept verbatim
    extra_lines: Vec<Value>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub international_state: Option<String>,
    pub international_district: Option<String>,
    pub postal_code: Option<String>,
    /// Keys this engine does not interpret, kept verbatim
    other: Map<String, Value>,
}

impl Address {
    pub fn new(address_type: impl Into<String>) -> Self {
        Self {
            address_type: Some(address_type.into()),
            ..Self::default()
        }
    }

    /// Read an address record from the bundle
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            FormError::mismatch(format!(
                "address must be an object, found {}",
                crate::bundle::path::kind_of(value)
            ))
        })?;

        let mut address = Address::default();
        for (key, v) in obj {
            match key.as_str() {
                "type" => address.address_type = text(v),
                "line" => {
                    let lines = v.as_array().ok_or_else(|| {
                        FormError::mismatch("address line must be an array")
                    })?;
                    for (offset, line) in lines.iter().enumerate() {
                        if offset < LINE_COUNT {
                            address.lines[offset] = text(line);
                        } else {
                            address.extra_lines.push(line.clone());
                        }
                    }
                }
                "country" => address.country = text(v),
                "state" => address.state = text(v),
                "district" => address.district = text(v),
                "internationalState" => address.international_state = text(v),
                "internationalDistrict" => address.international_district = text(v),
                "postalCode" => address.postal_code = text(v),
                _ => {
                    address.other.insert(key.clone(), v.clone());
                }
            }
        }
        Ok(address)
    }

    /// Write the positional wire form
    pub fn to_value(&self) -> Value {
        let mut obj = self.other.clone();
        if let Some(t) = &self.address_type {
            obj.insert("type".into(), Value::String(t.clone()));
        }
        let mut lines: Vec<Value> = self
            .lines
            .iter()
            .map(|l| Value::String(l.clone().unwrap_or_default()))
            .collect();
        lines.extend(self.extra_lines.iter().cloned());
        obj.insert("line".into(), Value::Array(lines));

        let keyed = [
            ("country", &self.country),
            ("state", &self.state),
            ("district", &self.district),
            ("internationalState", &self.international_state),
            ("internationalDistrict", &self.international_district),
            ("postalCode", &self.postal_code),
        ];
        for (key, value) in keyed {
            if let Some(v) = value {
                obj.insert(key.into(), Value::String(v.clone()));
            }
        }
        Value::Object(obj)
    }

    pub fn line(&self, line: AddressLine) -> Option<&str> {
        self.lines[line.offset()].as_deref()
    }

    pub fn get(&self, component: AddressComponent) -> Option<&str> {
        match component {
            AddressComponent::Line(line) => self.line(line),
            AddressComponent::Country => self.country.as_deref(),
            AddressComponent::State => self.state.as_deref(),
            AddressComponent::District => self.district.as_deref(),
            AddressComponent::InternationalState => self.international_state.as_deref(),
            AddressComponent::InternationalDistrict => self.international_district.as_deref(),
            AddressComponent::PostalCode => self.postal_code.as_deref(),
        }
    }

    pub fn set(&mut self, component: AddressComponent, value: impl Into<String>) {
        let value = Some(value.into()).filter(|v| !v.is_empty());
        match component {
            AddressComponent::Line(line) => self.lines[line.offset()] = value,
            AddressComponent::Country => self.country = value,
            AddressComponent::State => self.state = value,
            AddressComponent::District => self.district = value,
            AddressComponent::InternationalState => self.international_state = value,
            AddressComponent::InternationalDistrict => self.international_district = value,
            AddressComponent::PostalCode => self.postal_code = value,
        }
    }

    /// Move state/district between the local and international keys so they
    /// match the country now on the record
    pub fn reroute(&mut self, is_default_country: bool) {
        if is_default_country {
            if self.state.is_none() {
                self.state = self.international_state.take();
            }
            if self.district.is_none() {
                self.district = self.international_district.take();
            }
        } else {
            if self.international_state.is_none() {
                self.international_state = self.state.take();
            }
            if self.international_district.is_none() {
                self.international_district = self.district.take();
            }
        }
    }

    /// Same place, whatever the address type says
    pub fn same_location(&self, other: &Address) -> bool {
        self.lines == other.lines
            && self.country == other.country
            && self.state == other.state
            && self.district == other.district
            && self.international_state == other.international_state
            && self.international_district == other.international_district
            && self.postal_code == other.postal_code
    }

    /// Copy of this address relabelled with another type
    pub fn retyped(&self, address_type: impl Into<String>) -> Self {
        Self {
            address_type: Some(address_type.into()),
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Option::is_none)
            && self.country.is_none()
            && self.state.is_none()
            && self.district.is_none()
            && self.international_state.is_none()
            && self.international_district.is_none()
            && self.postal_code.is_none()
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Find the address of a given type in an `address` array
pub fn find_address(addresses: &Value, address_type: &str) -> Result<Option<Address>> {
    match addresses {
        Value::Null => Ok(None),
        Value::Array(items) => items
            .iter()
            .find(|a| a.get("type").and_then(Value::as_str) == Some(address_type))
            .map(Address::from_value)
            .transpose(),
        other => Err(FormError::mismatch(format!(
            "address list must be an array, found {}",
            crate::bundle::path::kind_of(other)
        ))),
    }
}

/// Insert or update the address of a given type inside an `address` array slot
pub fn upsert_address<F>(slot: &mut Value, address_type: &str, update: F) -> Result<()>
where
    F: FnOnce(&mut Address),
{
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    let items = slot.as_array_mut().ok_or_else(|| {
        FormError::mismatch("address list must be an array")
    })?;

    let position = items
        .iter()
        .position(|a| a.get("type").and_then(Value::as_str) == Some(address_type));
    let mut address = match position {
        Some(i) => Address::from_value(&items[i])?,
        None => Address::new(address_type),
    };
    update(&mut address);

    match position {
        Some(i) => items[i] = address.to_value(),
        None => items.push(address.to_value()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_offsets_are_fixed() {
        assert_eq!(AddressLine::Chief.offset(), 6);
        assert_eq!(AddressLine::UrbanOrRural.offset(), 7);
        assert_eq!(AddressLine::InternationalLine3.offset(), 10);
        assert_eq!(AddressLine::from_offset(11), None);
    }

    #[test]
    fn test_component_from_param() {
        assert_eq!(
            AddressComponent::from_param(&json!(6)),
            Some(AddressComponent::Line(AddressLine::Chief))
        );
        assert_eq!(
            AddressComponent::from_param(&json!("7")),
            Some(AddressComponent::Line(AddressLine::UrbanOrRural))
        );
        assert_eq!(
            AddressComponent::from_param(&json!("postalCode")),
            Some(AddressComponent::PostalCode)
        );
        assert_eq!(AddressComponent::from_param(&json!("city")), None);
        assert_eq!(AddressComponent::from_param(&json!(12)), None);
    }

    #[test]
    fn test_routing() {
        assert_eq!(
            AddressComponent::State.route(false),
            AddressComponent::InternationalState
        );
        assert_eq!(AddressComponent::State.route(true), AddressComponent::State);
        assert!(!AddressComponent::District.readable_for(false));
        assert!(AddressComponent::InternationalDistrict.readable_for(false));
    }

    #[test]
    fn test_wire_layout() {
        let mut address = Address::new("PERMANENT");
        address.set(AddressComponent::Line(AddressLine::Chief), "Chief Mwale");
        address.set(AddressComponent::Country, "FAR");

        let value = address.to_value();
        let line = value["line"].as_array().unwrap();
        assert_eq!(line.len(), LINE_COUNT);
        assert_eq!(line[6], json!("Chief Mwale"));
        assert_eq!(line[7], json!(""));
        assert_eq!(value["country"], json!("FAR"));
        assert_eq!(value["type"], json!("PERMANENT"));
    }

    #[test]
    fn test_unknown_keys_survive() {
        let value = json!({"type": "CURRENT", "line": ["", "4"], "city": "Ibombo", "use": "home"});
        let address = Address::from_value(&value).unwrap();
        let back = address.to_value();
        assert_eq!(back["city"], json!("Ibombo"));
        assert_eq!(back["use"], json!("home"));
        assert_eq!(back["line"][1], json!("4"));
    }

    #[test]
    fn test_upsert_updates_matching_type_only() {
        let mut slot = json!([
            {"type": "PERMANENT", "line": ["", "1"]},
            {"type": "CURRENT", "line": ["", "2"]}
        ]);
        upsert_address(&mut slot, "CURRENT", |a| {
            a.set(AddressComponent::Line(AddressLine::Street), "Main")
        })
        .unwrap();

        assert_eq!(slot[0]["line"], json!(["", "1"]));
        assert_eq!(slot[1]["line"][2], json!("Main"));
        assert_eq!(slot[1]["line"][1], json!("2"));
    }

    #[test]
    fn test_find_address_rejects_non_array() {
        assert!(find_address(&json!({"type": "PERMANENT"}), "PERMANENT").is_err());
        assert_eq!(find_address(&Value::Null, "PERMANENT").unwrap(), None);
    }

    #[test]
    fn test_same_location_ignores_type() {
        let mut a = Address::new("PERMANENT");
        a.set(AddressComponent::District, "Ibombo");
        let b = a.retyped("CURRENT");
        assert!(a.same_location(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_reroute_follows_country() {
        let mut address = Address::new("PERMANENT");
        address.set(AddressComponent::State, "Central");
        address.reroute(false);
        assert_eq!(address.state, None);
        assert_eq!(address.international_state.as_deref(), Some("Central"));
        address.reroute(true);
        assert_eq!(address.state.as_deref(), Some("Central"));
    }
}
