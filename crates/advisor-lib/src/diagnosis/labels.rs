//! Class-label map for the disease classifier

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Lookup from predicted class index to the raw training class name.
/// The artifact ships the training-time mapping (class name to dense
/// index); it is inverted here at load.
pub struct ClassLabelMap {
    labels: HashMap<usize, String>,
}

impl ClassLabelMap {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read class label map {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let indices: HashMap<String, usize> =
            serde_json::from_str(raw).context("Failed to parse class label map")?;
        if indices.is_empty() {
            anyhow::bail!("class label map is empty");
        }

        let labels = indices.into_iter().map(|(name, idx)| (idx, name)).collect();
        Ok(Self { labels })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Reconstruct a readable "Species - Condition" string from the raw
/// training class name: `Tomato___Early_blight` -> `Tomato - Early blight`.
pub fn format_label(raw: &str) -> String {
    raw.replace("___", " - ").replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_species_and_condition() {
        assert_eq!(format_label("Tomato___Early_blight"), "Tomato - Early blight");
        assert_eq!(format_label("Apple___Cedar_apple_rust"), "Apple - Cedar apple rust");
    }

    #[test]
    fn test_format_healthy_class() {
        assert_eq!(format_label("Tomato___healthy"), "Tomato - healthy");
    }

    #[test]
    fn test_format_without_separator() {
        assert_eq!(format_label("Background_without_leaves"), "Background without leaves");
    }

    #[test]
    fn test_map_inverts_training_indices() {
        let map = ClassLabelMap::from_json(
            r#"{"Tomato___Early_blight": 0, "Tomato___healthy": 1, "Potato___Late_blight": 2}"#,
        )
        .unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(0), Some("Tomato___Early_blight"));
        assert_eq!(map.get(2), Some("Potato___Late_blight"));
        assert_eq!(map.get(9), None);
    }

    #[test]
    fn test_empty_map_is_rejected() {
        assert!(ClassLabelMap::from_json("{}").is_err());
    }

    #[test]
    fn test_garbage_map_is_rejected() {
        assert!(ClassLabelMap::from_json("[1, 2, 3]").is_err());
    }
}
