use std::collections::BTreeMap;
use std::path::Path;

use adsb_proto::aircraft::operator_prefix;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Immutable code -> name table kept in byte-wise sorted order so lookups are
/// a binary search.
#[derive(Debug, Clone, PartialEq)]
pub struct NameTable {
    entries: Vec<(String, String)>,
}

impl NameTable {
    /// Builds a table from unordered pairs. Later duplicates replace earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: BTreeMap<String, String> = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: map.into_iter().collect() }
    }

    /// Exact, case-sensitive match. `None` means "not in the catalog".
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(code))
            .ok()
            .map(|i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].0 < w[1].0)
    }
}

/// Display names for aircraft type codes and airline callsign prefixes.
#[derive(Debug, Clone, PartialEq)]
pub struct NameRegistry {
    types: NameTable,
    airlines: NameTable,
}

#[derive(Debug, Deserialize)]
struct NamesFile {
    #[serde(default)]
    types: BTreeMap<String, String>,
    #[serde(default)]
    airlines: BTreeMap<String, String>,
}

impl NameRegistry {
    pub fn new(types: NameTable, airlines: NameTable) -> Self {
        Self { types, airlines }
    }

    /// The catalog shipped with the display.
    pub fn builtin() -> Self {
        Self::new(
            NameTable::from_pairs(BUILTIN_TYPES.iter().copied()),
            NameTable::from_pairs(BUILTIN_AIRLINES.iter().copied()),
        )
    }

    /// Replaces the catalog from TOML with `[types]` and `[airlines]` tables.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let f: NamesFile = toml::from_str(s).context("parse names toml")?;
        anyhow::ensure!(!f.types.is_empty() || !f.airlines.is_empty(), "names file has no entries");
        Ok(Self::new(NameTable::from_pairs(f.types), NameTable::from_pairs(f.airlines)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read names file {}", path.display()))?;
        Self::from_toml_str(&s)
    }

    pub fn type_name(&self, code: &str) -> Option<&str> {
        self.types.get(code)
    }

    pub fn airline_name(&self, prefix: &str) -> Option<&str> {
        self.airlines.get(prefix)
    }

    /// Airline for a callsign, keyed on its three-letter operator prefix.
    pub fn airline_for_callsign(&self, callsign: &str) -> Option<&str> {
        self.airline_name(operator_prefix(callsign)?)
    }

    pub fn types(&self) -> &NameTable {
        &self.types
    }

    pub fn airlines(&self) -> &NameTable {
        &self.airlines
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("A19N", "A319neo"),
    ("A20N", "A320neo"),
    ("A21N", "A321neo"),
    ("A225", "An-225"),
    ("A306", "A300-600"),
    ("A318", "A318"),
    ("A319", "A319"),
    ("A320", "A320"),
    ("A321", "A321"),
    ("A332", "A330-200"),
    ("A333", "A330-300"),
    ("A338", "A330-800"),
    ("A339", "A330-900"),
    ("A342", "A340-200"),
    ("A343", "A340-300"),
    ("A345", "A340-500"),
    ("A346", "A340-600"),
    ("A359", "A350-900"),
    ("A35K", "A350-1000"),
    ("A388", "A380"),
    ("AT76", "ATR 72"),
    ("B37M", "B737 MAX7"),
    ("B38M", "B737 MAX8"),
    ("B39M", "B737 MAX9"),
    ("B463", "BAe 146"),
    ("B733", "B737-300"),
    ("B734", "B737-400"),
    ("B735", "B737-500"),
    ("B737", "B737-700"),
    ("B738", "B737-800"),
    ("B739", "B737-900"),
    ("B744", "B747-400"),
    ("B748", "B747-8"),
    ("B752", "B757-200"),
    ("B753", "B757-300"),
    ("B762", "B767-200"),
    ("B763", "B767-300"),
    ("B764", "B767-400"),
    ("B772", "B777-200"),
    ("B77L", "B777-200LR"),
    ("B77W", "B777-300ER"),
    ("B788", "B787-8"),
    ("B789", "B787-9"),
    ("B78X", "B787-10"),
    ("BCS1", "A220-100"),
    ("BCS3", "A220-300"),
    ("C172", "Cessna 172"),
    ("C25A", "Citation CJ2"),
    ("C510", "Citation Mstg"),
    ("C560", "Citation V"),
    ("C680", "Citation Sov"),
    ("CL35", "Chall 350"),
    ("CRJ2", "CRJ-200"),
    ("CRJ7", "CRJ-700"),
    ("CRJ9", "CRJ-900"),
    ("CRJX", "CRJ-1000"),
    ("DH8D", "Q400"),
    ("E135", "ERJ-135"),
    ("E145", "ERJ-145"),
    ("E170", "E170"),
    ("E175", "E175"),
    ("E190", "E190"),
    ("E195", "E195"),
    ("E290", "E190-E2"),
    ("E295", "E195-E2"),
    ("F900", "Falcon 900"),
    ("GL5T", "Global 5500"),
    ("GL7T", "Global 7500"),
    ("GLEX", "Glbl Express"),
    ("GLF6", "G650"),
    ("MD11", "MD-11"),
    ("P8", "P-8 Poseidon"),
    ("PC12", "PC-12"),
    ("RJ85", "Avro RJ85"),
    ("SU95", "Superjet 100"),
];

const BUILTIN_AIRLINES: &[(&str, &str)] = &[
    ("ACA", "Air Canada"),
    ("AFR", "Air France"),
    ("ANA", "All Nippon"),
    ("AUA", "Austrian"),
    ("AZA", "ITA Airways"),
    ("BAW", "British"),
    ("BEL", "Brussels"),
    ("BTI", "airBaltic"),
    ("CAL", "China Airln"),
    ("CCA", "Air China"),
    ("CLH", "LH City"),
    ("CSA", "Czech Airln"),
    ("DAL", "Delta"),
    ("DLH", "Lufthansa"),
    ("EJU", "easyJet EU"),
    ("ETH", "Ethiopian"),
    ("EWG", "Eurowings"),
    ("EZY", "easyJet"),
    ("FIN", "Finnair"),
    ("IBE", "Iberia"),
    ("KLM", "KLM"),
    ("LOT", "LOT Polish"),
    ("NAX", "Norwegian"),
    ("QTR", "Qatar Awys"),
    ("RAM", "Royal Air"),
    ("RYR", "Ryanair"),
    ("SAS", "SAS"),
    ("SIA", "Singapore"),
    ("SWR", "Swiss"),
    ("TAP", "TAP"),
    ("THY", "Turkish"),
    ("TRA", "Transavia"),
    ("TVS", "SmartWings"),
    ("UAL", "United"),
    ("VLG", "Vueling"),
    ("WZZ", "Wizz Air"),
];
