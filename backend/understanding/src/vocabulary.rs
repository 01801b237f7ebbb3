//! Unit vocabulary: permitted canonical units per attribute type, and the
//! alias table that maps surface forms ("cm", "lbs") to canonical names.
//!
//! Built once at start-up and shared read-only; nothing in here mutates after
//! construction.

use std::collections::{BTreeSet, HashMap};

use metricscan_core::AttributeType;

const LENGTH_UNITS: &[&str] = &["centimetre", "foot", "inch", "metre", "millimetre", "yard"];

const MASS_UNITS: &[&str] = &[
    "gram", "kilogram", "microgram", "milligram", "ounce", "pound", "ton",
];

const VOLTAGE_UNITS: &[&str] = &["kilovolt", "millivolt", "volt"];

const WATTAGE_UNITS: &[&str] = &["kilowatt", "watt"];

const VOLUME_UNITS: &[&str] = &[
    "centilitre",
    "cubic foot",
    "cubic inch",
    "cup",
    "decilitre",
    "fluid ounce",
    "gallon",
    "imperial gallon",
    "litre",
    "microlitre",
    "millilitre",
    "pint",
    "quart",
];

/// Surface form → canonical unit. Keys are lower-case letters only, which is
/// every shape the extractor's token pattern can produce.
const STANDARD_ALIASES: &[(&str, &str)] = &[
    // Length
    ("cm", "centimetre"),
    ("centimeter", "centimetre"),
    ("cms", "centimetre"),
    ("ft", "foot"),
    ("feet", "foot"),
    ("in", "inch"),
    ("inches", "inch"),
    ("m", "metre"),
    ("meter", "metre"),
    ("meters", "metre"),
    ("mm", "millimetre"),
    ("millimeter", "millimetre"),
    ("yd", "yard"),
    ("yards", "yard"),
    // Mass
    ("g", "gram"),
    ("grams", "gram"),
    ("gm", "gram"),
    ("gms", "gram"),
    ("kg", "kilogram"),
    ("kilograms", "kilogram"),
    ("kgs", "kilogram"),
    ("mg", "milligram"),
    ("milligrams", "milligram"),
    ("mgs", "milligram"),
    ("microgram", "microgram"),
    ("oz", "ounce"),
    ("ounces", "ounce"),
    ("lb", "pound"),
    ("pounds", "pound"),
    ("lbs", "pound"),
    // Voltage
    ("kv", "kilovolt"),
    ("mv", "millivolt"),
    ("v", "volt"),
    ("volts", "volt"),
    // Power
    ("kw", "kilowatt"),
    ("w", "watt"),
    ("watts", "watt"),
    // Volume
    ("cl", "centilitre"),
    ("centiliter", "centilitre"),
    ("ml", "millilitre"),
    ("milliliter", "millilitre"),
    ("l", "litre"),
    ("liters", "litre"),
    ("gal", "gallon"),
    ("gallons", "gallon"),
    ("pt", "pint"),
    ("pints", "pint"),
    ("qt", "quart"),
    ("quarts", "quart"),
    ("floz", "fluid ounce"),
];

/// Immutable unit registry.
#[derive(Debug, Clone)]
pub struct UnitVocabulary {
    permitted: HashMap<AttributeType, BTreeSet<String>>,
    aliases: HashMap<String, String>,
}

impl UnitVocabulary {
    /// Build a vocabulary from explicit tables.
    ///
    /// Alias keys are lower-cased on the way in; when two keys collapse to the
    /// same lower-case form the first one wins.
    pub fn new<P, A>(permitted: P, aliases: A) -> Self
    where
        P: IntoIterator<Item = (AttributeType, Vec<String>)>,
        A: IntoIterator<Item = (String, String)>,
    {
        let permitted = permitted
            .into_iter()
            .map(|(attr, units)| (attr, units.into_iter().collect()))
            .collect();

        let mut alias_map = HashMap::new();
        for (surface, canonical) in aliases {
            alias_map.entry(surface.to_lowercase()).or_insert(canonical);
        }

        Self {
            permitted,
            aliases: alias_map,
        }
    }

    /// The product-catalogue vocabulary.
    pub fn standard() -> Self {
        let owned = |units: &[&str]| units.iter().map(|u| u.to_string()).collect::<Vec<_>>();
        let permitted = AttributeType::ALL.into_iter().map(|attr| {
            let units = match attr {
                AttributeType::Width | AttributeType::Depth | AttributeType::Height => LENGTH_UNITS,
                AttributeType::ItemWeight | AttributeType::MaximumWeightRecommendation => {
                    MASS_UNITS
                }
                AttributeType::Voltage => VOLTAGE_UNITS,
                AttributeType::Wattage => WATTAGE_UNITS,
                AttributeType::ItemVolume => VOLUME_UNITS,
            };
            (attr, owned(units))
        });
        let aliases = STANDARD_ALIASES
            .iter()
            .map(|(surface, canonical)| (surface.to_string(), canonical.to_string()));
        Self::new(permitted, aliases)
    }

    /// Canonical units accepted for `attribute`; `None` for attributes the
    /// vocabulary was not built with.
    pub fn permitted_units(&self, attribute: AttributeType) -> Option<&BTreeSet<String>> {
        self.permitted.get(&attribute)
    }

    pub fn is_permitted(&self, attribute: AttributeType, canonical_unit: &str) -> bool {
        self.permitted
            .get(&attribute)
            .is_some_and(|units| units.contains(canonical_unit))
    }

    /// Map a surface form to its canonical name; unknown forms pass through
    /// unchanged. Lookup is exact-match on the stored (lower-case) keys.
    pub fn canonicalize<'a>(&'a self, surface: &'a str) -> &'a str {
        self.aliases.get(surface).map(String::as_str).unwrap_or(surface)
    }

    /// Every surface form in the alias table.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }
}

impl Default for UnitVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}
