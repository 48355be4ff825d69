use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::materials::tools::catalogue::PropertyDescriptor;

/// Key under which tagged enumerations carry their bare value.
pub const ENUM_DISCRIMINANT: &str = "_value_";
/// Service field holding the nested symmetry block.
pub const SYMMETRY_FIELD: &str = "symmetry";
/// Text shown when either half of an entity header is missing.
pub const MISSING_TEXT: &str = "N/A";

/// Properties a [`Record`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    MaterialId,
    Formula,
    BandGap,
    EnergyAboveHull,
    IsStable,
    IsMetal,
    IsMagnetic,
    FormationEnergy,
    Density,
    Volume,
    SiteCount,
    TotalMagnetization,
    Elements,
    SpaceGroupSymbol,
    SpaceGroupNumber,
    CrystalSystem,
}

/// Where a property lives in the normalized tree and how it is read.
#[derive(Debug, Clone, Copy)]
enum Extraction {
    Field(&'static str),
    Symmetry(&'static str),
    SymmetryEnumeration(&'static str),
    ElementList(&'static str),
}

impl PropertyKey {
    /// Name used for the property in structured output.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKey::MaterialId => "material_id",
            PropertyKey::Formula => "formula",
            PropertyKey::BandGap => "band_gap",
            PropertyKey::EnergyAboveHull => "energy_above_hull",
            PropertyKey::IsStable => "is_stable",
            PropertyKey::IsMetal => "is_metal",
            PropertyKey::IsMagnetic => "is_magnetic",
            PropertyKey::FormationEnergy => "formation_energy",
            PropertyKey::Density => "density",
            PropertyKey::Volume => "volume",
            PropertyKey::SiteCount => "n_sites",
            PropertyKey::TotalMagnetization => "magnetization",
            PropertyKey::Elements => "elements",
            PropertyKey::SpaceGroupSymbol => "space_group",
            PropertyKey::SpaceGroupNumber => "space_group_number",
            PropertyKey::CrystalSystem => "crystal_system",
        }
    }

    /// Top-level service field that has to be requested for this property.
    pub fn source_field(self) -> &'static str {
        match self.extraction() {
            Extraction::Field(field) | Extraction::ElementList(field) => field,
            Extraction::Symmetry(_) | Extraction::SymmetryEnumeration(_) => SYMMETRY_FIELD,
        }
    }

    fn extraction(self) -> Extraction {
        match self {
            PropertyKey::MaterialId => Extraction::Field("material_id"),
            PropertyKey::Formula => Extraction::Field("formula_pretty"),
            PropertyKey::BandGap => Extraction::Field("band_gap"),
            PropertyKey::EnergyAboveHull => Extraction::Field("energy_above_hull"),
            PropertyKey::IsStable => Extraction::Field("is_stable"),
            PropertyKey::IsMetal => Extraction::Field("is_metal"),
            PropertyKey::IsMagnetic => Extraction::Field("is_magnetic"),
            PropertyKey::FormationEnergy => Extraction::Field("formation_energy_per_atom"),
            PropertyKey::Density => Extraction::Field("density"),
            PropertyKey::Volume => Extraction::Field("volume"),
            PropertyKey::SiteCount => Extraction::Field("nsites"),
            PropertyKey::TotalMagnetization => Extraction::Field("total_magnetization"),
            PropertyKey::Elements => Extraction::ElementList("elements"),
            PropertyKey::SpaceGroupSymbol => Extraction::Symmetry("symbol"),
            PropertyKey::SpaceGroupNumber => Extraction::Symmetry("number"),
            PropertyKey::CrystalSystem => Extraction::SymmetryEnumeration("crystal_system"),
        }
    }
}

/// A record slot: either a normalized value or the missing sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Missing,
    Present(Value),
}

static MISSING: Field = Field::Missing;

impl Field {
    /// Absent keys and explicit `null` both count as missing.
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Field::Missing,
            Some(value) => Field::Present(value.clone()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Missing => None,
            Field::Present(value) => Some(value),
        }
    }
}

/// Fixed-schema view of one material, in catalogue order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(PropertyKey, Field)>,
}

impl Record {
    /// Returns the slot for `key`, or the missing sentinel when the record was
    /// built from a catalogue that does not list it.
    pub fn get(&self, key: PropertyKey) -> &Field {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, field)| field)
            .unwrap_or(&MISSING)
    }

    pub fn fields(&self) -> impl Iterator<Item = (PropertyKey, &Field)> {
        self.fields.iter().map(|(key, field)| (*key, field))
    }

    /// Caption used for the record's column, e.g. `Si (mp-149)`.
    pub fn header(&self) -> String {
        format!(
            "{} ({})",
            header_part(self.get(PropertyKey::Formula)),
            header_part(self.get(PropertyKey::MaterialId))
        )
    }
}

fn header_part(field: &Field) -> String {
    match field {
        Field::Present(Value::String(text)) => text.clone(),
        Field::Present(other) => other.to_string(),
        Field::Missing => MISSING_TEXT.to_string(),
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, field) in &self.fields {
            map.serialize_entry(key.as_str(), &field.as_value())?;
        }
        map.end()
    }
}

/// Extracts the catalogue's properties from a normalized document.
pub fn build_record(tree: &Value, catalogue: &[PropertyDescriptor]) -> Record {
    let fields = catalogue
        .iter()
        .map(|descriptor| (descriptor.key, resolve(tree, descriptor.key)))
        .collect();
    Record { fields }
}

fn resolve(tree: &Value, key: PropertyKey) -> Field {
    match key.extraction() {
        Extraction::Field(name) => Field::from_value(tree.get(name)),
        Extraction::Symmetry(name) => Field::from_value(symmetry(tree).and_then(|s| s.get(name))),
        Extraction::SymmetryEnumeration(name) => {
            unwrap_enumeration(symmetry(tree).and_then(|s| s.get(name)))
        }
        Extraction::ElementList(name) => flatten_elements(tree.get(name)),
    }
}

fn symmetry(tree: &Value) -> Option<&Value> {
    tree.get(SYMMETRY_FIELD).filter(|block| block.is_object())
}

/// A tagged enumeration yields its bare value, a bare string passes through,
/// anything else is missing.
fn unwrap_enumeration(value: Option<&Value>) -> Field {
    match value {
        Some(Value::Object(tagged)) => Field::from_value(tagged.get(ENUM_DISCRIMINANT)),
        Some(Value::String(text)) => Field::Present(Value::String(text.clone())),
        _ => Field::Missing,
    }
}

/// Joins an element list into `"Fe, O"`. An empty list is an empty string,
/// an absent list is missing.
fn flatten_elements(value: Option<&Value>) -> Field {
    let text = match value {
        None | Some(Value::Null) => return Field::Missing,
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(symbol) => symbol.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };
    Field::Present(Value::String(text))
}
