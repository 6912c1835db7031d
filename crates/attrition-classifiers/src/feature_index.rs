use std::collections::HashMap;

/// Position of every feature column inside an encoded feature vector.
///
/// Feature vectors are laid out in table column order with the target column
/// removed, so every column after the target moves down by one position. The
/// map is positional: rebuild it whenever columns are added or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureIndexMap {
    features: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FeatureIndexMap {
    /// Compute the map for `columns` (in table order) excluding `target`.
    pub fn new(columns: &[String], target: &str) -> Self {
        let mut features = Vec::with_capacity(columns.len());
        let mut positions = HashMap::with_capacity(columns.len());
        let mut found_target = false;

        for (position, column) in columns.iter().enumerate() {
            if column == target {
                found_target = true;
                continue;
            }
            let index = if found_target { position - 1 } else { position };
            positions.insert(column.clone(), index);
            features.push(column.clone());
        }

        FeatureIndexMap {
            features,
            positions,
        }
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Feature columns in vector order.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// `(column, position)` pairs in vector order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.features
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
    }
}
