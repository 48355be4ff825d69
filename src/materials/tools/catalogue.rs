//! Fixed property catalogues, one per use case. Catalogue order is the row
//! order of every rendering.

use crate::materials::tools::record::PropertyKey;

/// Significant digits used for floating point cells.
pub const DEFAULT_SIGNIFICANT_DIGITS: usize = 4;

/// One displayable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Row or column caption.
    pub label: &'static str,
    pub key: PropertyKey,
    /// Appended verbatim to numeric cells, e.g. `" eV/atom"`.
    pub unit: &'static str,
    /// Significant digits kept when a float is displayed.
    pub significant_digits: usize,
}

impl PropertyDescriptor {
    pub const fn new(label: &'static str, key: PropertyKey, unit: &'static str) -> Self {
        Self {
            label,
            key,
            unit,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
        }
    }
}

const fn plain(label: &'static str, key: PropertyKey) -> PropertyDescriptor {
    PropertyDescriptor::new(label, key, "")
}

/// Properties listed by `search`.
pub const SEARCH: &[PropertyDescriptor] = &[
    plain("Material_ID", PropertyKey::MaterialId),
    plain("Formula", PropertyKey::Formula),
    PropertyDescriptor::new("Band_Gap", PropertyKey::BandGap, " eV"),
    PropertyDescriptor::new("Energy_Above_Hull", PropertyKey::EnergyAboveHull, " eV/atom"),
    plain("Is_Stable", PropertyKey::IsStable),
    plain("Is_Metal", PropertyKey::IsMetal),
    PropertyDescriptor::new("Formation_Energy", PropertyKey::FormationEnergy, " eV/atom"),
    PropertyDescriptor::new("Density", PropertyKey::Density, " g/cm³"),
    plain("Space_Group_Symbol", PropertyKey::SpaceGroupSymbol),
];

/// Properties written by `export`. Units are part of the labels so that the
/// spreadsheet cells stay bare numbers.
pub const EXPORT: &[PropertyDescriptor] = &[
    plain("Material_ID", PropertyKey::MaterialId),
    plain("Formula", PropertyKey::Formula),
    plain("Band_Gap_eV", PropertyKey::BandGap),
    plain("Energy_Above_Hull_eV_Atom", PropertyKey::EnergyAboveHull),
    plain("Is_Stable", PropertyKey::IsStable),
    plain("Is_Metal", PropertyKey::IsMetal),
    plain("Formation_Energy_eV_Atom", PropertyKey::FormationEnergy),
    plain("Density_g_cm3", PropertyKey::Density),
    plain("Volume_A3", PropertyKey::Volume),
    plain("N_Sites", PropertyKey::SiteCount),
    plain("Elements", PropertyKey::Elements),
    plain("Space_Group_Symbol", PropertyKey::SpaceGroupSymbol),
    plain("Space_Group_Number", PropertyKey::SpaceGroupNumber),
    plain("Crystal_System", PropertyKey::CrystalSystem),
];

/// Properties shown side by side by `compare`.
pub const COMPARE: &[PropertyDescriptor] = &[
    plain("Material_ID", PropertyKey::MaterialId),
    plain("Formula", PropertyKey::Formula),
    plain("Band_Gap_eV", PropertyKey::BandGap),
    PropertyDescriptor::new("Energy_Above_Hull", PropertyKey::EnergyAboveHull, " eV/atom"),
    plain("Is_Stable", PropertyKey::IsStable),
    plain("Is_Metal", PropertyKey::IsMetal),
    plain("Is_Magnetic", PropertyKey::IsMagnetic),
    PropertyDescriptor::new("Formation_Energy", PropertyKey::FormationEnergy, " eV/atom"),
    PropertyDescriptor::new("Density", PropertyKey::Density, " g/cm³"),
    PropertyDescriptor::new("Volume", PropertyKey::Volume, " Å³"),
    plain("N_Sites", PropertyKey::SiteCount),
    PropertyDescriptor::new("Total_Magnetization", PropertyKey::TotalMagnetization, " μB"),
    plain("Space_Group_Symbol", PropertyKey::SpaceGroupSymbol),
    plain("Crystal_System", PropertyKey::CrystalSystem),
];

/// Service fields to request so that every property of `catalogue` can be
/// resolved, deduplicated in first-use order.
pub fn source_fields(catalogue: &[PropertyDescriptor]) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = Vec::with_capacity(catalogue.len());
    for descriptor in catalogue {
        let field = descriptor.key.source_field();
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}
