use crate::warn;

/// A named notch on an axis channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Detent {
    label: String,
    value: f64,
}

impl Detent {
    pub fn new(label: impl Into<String>, value: f64) -> Self { Self { label: label.into(), value } }
    pub fn label(&self) -> &str { &self.label }
    pub fn value(&self) -> f64 { self.value }
}

/// The ordered detents of one axis.
///
/// Values are kept inside `[0, 1]`, unique and ascending. Construction repairs input that
/// violates this (non-finite rows are dropped, the first of several equal values wins, the
/// rest is stably sorted) and logs the repair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetentSet {
    detents: Vec<Detent>,
}

impl DetentSet {
    #[allow(clippy::float_cmp)]
    pub fn new(entries: impl IntoIterator<Item = Detent>) -> Self {
        let mut detents: Vec<Detent> = Vec::new();
        let mut repaired = false;
        for entry in entries {
            if !entry.value.is_finite() {
                repaired = true;
                continue;
            }
            let value = entry.value.clamp(0.0, 1.0);
            if detents.iter().any(|d| d.value == value) {
                repaired = true;
                continue;
            }
            repaired |= detents.last().is_some_and(|last| last.value > value);
            detents.push(Detent { label: entry.label, value });
        }
        if repaired {
            warn!("Detent table was not unique and ascending, using a repaired copy");
            detents.sort_by(|a, b| a.value.total_cmp(&b.value));
        }
        Self { detents }
    }

    pub fn is_empty(&self) -> bool { self.detents.is_empty() }
    pub fn len(&self) -> usize { self.detents.len() }
    pub fn get(&self, index: usize) -> Option<&Detent> { self.detents.get(index) }
    pub fn iter(&self) -> impl Iterator<Item = &Detent> { self.detents.iter() }
    pub fn values(&self) -> Vec<f64> { self.detents.iter().map(Detent::value).collect() }

    /// Smallest detent value.
    pub fn min_value(&self) -> Option<f64> { self.detents.first().map(Detent::value) }

    /// The detent closest to `value` together with its index.
    ///
    /// Equal distances resolve to the earliest detent.
    pub fn nearest(&self, value: f64) -> Option<(usize, &Detent)> {
        let mut best: Option<(usize, &Detent, f64)> = None;
        for (i, detent) in self.detents.iter().enumerate() {
            let dist = (detent.value - value).abs();
            if best.is_none_or(|(_, _, best_dist)| dist < best_dist) {
                best = Some((i, detent, dist));
            }
        }
        best.map(|(i, detent, _)| (i, detent))
    }
}
