// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction filtering and per-class aggregation

use std::collections::HashMap;

use super::models::{ObjectCount, Prediction};

/// Keep predictions whose score is at least `threshold`, preserving order.
pub fn over_threshold<I>(predictions: I, threshold: f32) -> impl Iterator<Item = Prediction>
where
    I: IntoIterator<Item = Prediction>,
{
    predictions
        .into_iter()
        .filter(move |p| p.score >= threshold)
}

/// Count predictions per class label.
///
/// One entry per distinct label, ordered by first appearance.
pub fn count<'a, I>(predictions: I) -> Vec<ObjectCount>
where
    I: IntoIterator<Item = &'a Prediction>,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ObjectCount> = Vec::new();

    for prediction in predictions {
        match positions.get(prediction.class_name.as_str()) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                positions.insert(prediction.class_name.as_str(), counts.len());
                counts.push(ObjectCount::new(prediction.class_name.clone(), 1));
            }
        }
    }

    counts
}
