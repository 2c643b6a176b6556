//! Official district names of Nepal, grouped by province.
//!
//! Layer files join on these names exactly. A replacement list can be
//! loaded from a `District,Province` CSV when the boundary dataset in use
//! spells districts differently.

use crate::utils::error::{LayerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// (district, province)
const OFFICIAL_DISTRICTS: &[(&str, &str)] = &[
    // Koshi
    ("Bhojpur", "Koshi"),
    ("Dhankuta", "Koshi"),
    ("Ilam", "Koshi"),
    ("Jhapa", "Koshi"),
    ("Khotang", "Koshi"),
    ("Morang", "Koshi"),
    ("Okhaldhunga", "Koshi"),
    ("Panchthar", "Koshi"),
    ("Sankhuwasabha", "Koshi"),
    ("Solukhumbu", "Koshi"),
    ("Sunsari", "Koshi"),
    ("Taplejung", "Koshi"),
    ("Terhathum", "Koshi"),
    ("Udayapur", "Koshi"),
    // Madhesh
    ("Bara", "Madhesh"),
    ("Dhanusha", "Madhesh"),
    ("Mahottari", "Madhesh"),
    ("Parsa", "Madhesh"),
    ("Rautahat", "Madhesh"),
    ("Saptari", "Madhesh"),
    ("Sarlahi", "Madhesh"),
    ("Siraha", "Madhesh"),
    // Bagmati
    ("Bhaktapur", "Bagmati"),
    ("Chitwan", "Bagmati"),
    ("Dhading", "Bagmati"),
    ("Dolakha", "Bagmati"),
    ("Kathmandu", "Bagmati"),
    ("Kavrepalanchok", "Bagmati"),
    ("Lalitpur", "Bagmati"),
    ("Makwanpur", "Bagmati"),
    ("Nuwakot", "Bagmati"),
    ("Ramechhap", "Bagmati"),
    ("Rasuwa", "Bagmati"),
    ("Sindhuli", "Bagmati"),
    ("Sindhupalchok", "Bagmati"),
    // Gandaki
    ("Baglung", "Gandaki"),
    ("Gorkha", "Gandaki"),
    ("Kaski", "Gandaki"),
    ("Lamjung", "Gandaki"),
    ("Manang", "Gandaki"),
    ("Mustang", "Gandaki"),
    ("Myagdi", "Gandaki"),
    ("Nawalpur", "Gandaki"),
    ("Parbat", "Gandaki"),
    ("Syangja", "Gandaki"),
    ("Tanahun", "Gandaki"),
    // Lumbini
    ("Arghakhanchi", "Lumbini"),
    ("Banke", "Lumbini"),
    ("Bardiya", "Lumbini"),
    ("Dang", "Lumbini"),
    ("Gulmi", "Lumbini"),
    ("Kapilvastu", "Lumbini"),
    ("Palpa", "Lumbini"),
    ("Parasi", "Lumbini"),
    ("Pyuthan", "Lumbini"),
    ("Rolpa", "Lumbini"),
    ("Rukum East", "Lumbini"),
    ("Rupandehi", "Lumbini"),
    // Karnali
    ("Dailekh", "Karnali"),
    ("Dolpa", "Karnali"),
    ("Humla", "Karnali"),
    ("Jajarkot", "Karnali"),
    ("Jumla", "Karnali"),
    ("Kalikot", "Karnali"),
    ("Mugu", "Karnali"),
    ("Rukum West", "Karnali"),
    ("Salyan", "Karnali"),
    ("Surkhet", "Karnali"),
    // Sudurpashchim
    ("Achham", "Sudurpashchim"),
    ("Baitadi", "Sudurpashchim"),
    ("Bajhang", "Sudurpashchim"),
    ("Bajura", "Sudurpashchim"),
    ("Dadeldhura", "Sudurpashchim"),
    ("Darchula", "Sudurpashchim"),
    ("Doti", "Sudurpashchim"),
    ("Kailali", "Sudurpashchim"),
    ("Kanchanpur", "Sudurpashchim"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    #[serde(rename = "District")]
    pub name: String,
    #[serde(rename = "Province")]
    pub province: String,
}

#[derive(Debug, Clone)]
pub struct Gazetteer {
    districts: Vec<District>,
    by_name: HashMap<String, usize>,
    by_folded_name: HashMap<String, usize>,
}

impl Gazetteer {
    pub fn official() -> Self {
        let districts = OFFICIAL_DISTRICTS
            .iter()
            .map(|(name, province)| District {
                name: (*name).to_string(),
                province: (*province).to_string(),
            })
            .collect();
        Self::index(districts)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(&path)?;
        let gazetteer = Self::from_csv_reader(file)?;
        tracing::debug!(
            "Loaded {} districts from gazetteer {}",
            gazetteer.len(),
            path.as_ref().display()
        );
        Ok(gazetteer)
    }

    /// 讀取 `District,Province` 格式的 CSV
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut districts: Vec<District> = Vec::new();
        for record in csv_reader.deserialize::<District>() {
            let district = record.map_err(|e| LayerError::GazetteerError {
                message: format!("Invalid gazetteer row: {}", e),
            })?;
            if district.name.is_empty() {
                return Err(LayerError::GazetteerError {
                    message: "District name cannot be empty".to_string(),
                });
            }
            if districts.iter().any(|d| d.name == district.name) {
                return Err(LayerError::GazetteerError {
                    message: format!("District '{}' is listed twice", district.name),
                });
            }
            districts.push(district);
        }

        if districts.is_empty() {
            return Err(LayerError::GazetteerError {
                message: "Gazetteer contains no districts".to_string(),
            });
        }

        Ok(Self::index(districts))
    }

    fn index(districts: Vec<District>) -> Self {
        let mut by_name = HashMap::with_capacity(districts.len());
        let mut by_folded_name = HashMap::with_capacity(districts.len());

        for (idx, district) in districts.iter().enumerate() {
            by_name.insert(district.name.clone(), idx);
            by_folded_name.insert(fold(&district.name), idx);
        }

        Self {
            districts,
            by_name,
            by_folded_name,
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&District> {
        self.by_name.get(name).map(|&idx| &self.districts[idx])
    }

    /// Official spelling of `name` when it differs only by case or
    /// surrounding whitespace. This is not a fuzzy match.
    pub fn case_hint(&self, name: &str) -> Option<&str> {
        self.by_folded_name
            .get(&fold(name))
            .map(|&idx| self.districts[idx].name.as_str())
            .filter(|official| *official != name)
    }

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    /// Provinces in first-seen order.
    pub fn provinces(&self) -> Vec<&str> {
        let mut provinces: Vec<&str> = Vec::new();
        for district in &self.districts {
            if !provinces.contains(&district.province.as_str()) {
                provinces.push(&district.province);
            }
        }
        provinces
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::official()
    }
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}
