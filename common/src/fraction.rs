//! Dataset fractions and the ascending sequence a run iterates over.

use serde::{Deserialize, Serialize};

use crate::errors::{CommonError, CommonResult};

/// A percentage of the full dataset, 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DatasetFraction(u32);

impl DatasetFraction {
    /// Create a fraction, rejecting values outside 1..=100.
    pub fn new(percent: u32) -> CommonResult<Self> {
        if (1..=100).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(CommonError::InvalidFraction(percent))
        }
    }

    /// The whole dataset.
    pub fn full() -> Self {
        Self(100)
    }

    pub fn percent(self) -> u32 {
        self.0
    }

    /// Number of leading records this fraction selects out of `total`.
    ///
    /// Rounds down, so a fraction never selects more than its share.
    pub fn prefix_len(self, total: usize) -> usize {
        // u128 keeps the product exact for any usize total
        ((total as u128 * self.0 as u128) / 100) as usize
    }
}

impl std::fmt::Display for DatasetFraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u32> for DatasetFraction {
    type Error = CommonError;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<DatasetFraction> for u32 {
    fn from(fraction: DatasetFraction) -> Self {
        fraction.0
    }
}

/// Strictly ascending, non-empty list of fractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct FractionSequence(Vec<DatasetFraction>);

impl FractionSequence {
    /// Build a sequence from raw percentages.
    pub fn from_percents(percents: &[u32]) -> CommonResult<Self> {
        if percents.is_empty() {
            return Err(CommonError::InvalidSequence("no fractions given".to_string()));
        }

        let fractions = percents
            .iter()
            .map(|&p| DatasetFraction::new(p))
            .collect::<CommonResult<Vec<_>>>()?;

        if let Some(pair) = fractions.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CommonError::InvalidSequence(format!(
                "{} does not follow {} in ascending order",
                pair[1], pair[0]
            )));
        }

        Ok(Self(fractions))
    }

    /// 10%, 20%, ..., 100%.
    pub fn deciles() -> Self {
        Self((1..=10).map(|i| DatasetFraction(i * 10)).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = DatasetFraction> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[DatasetFraction] {
        &self.0
    }
}

impl Default for FractionSequence {
    fn default() -> Self {
        Self::deciles()
    }
}

impl TryFrom<Vec<u32>> for FractionSequence {
    type Error = CommonError;

    fn try_from(percents: Vec<u32>) -> Result<Self, Self::Error> {
        Self::from_percents(&percents)
    }
}

impl From<FractionSequence> for Vec<u32> {
    fn from(seq: FractionSequence) -> Self {
        seq.0.into_iter().map(u32::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_len_rounds_down() {
        let f = DatasetFraction::new(10).unwrap();
        assert_eq!(f.prefix_len(1000), 100);
        assert_eq!(f.prefix_len(15), 1);
        assert_eq!(f.prefix_len(9), 0);
        assert_eq!(DatasetFraction::full().prefix_len(9), 9);
    }

    #[test]
    fn test_fraction_bounds() {
        assert_eq!(DatasetFraction::new(0), Err(CommonError::InvalidFraction(0)));
        assert_eq!(DatasetFraction::new(101), Err(CommonError::InvalidFraction(101)));
        assert!(DatasetFraction::new(1).is_ok());
        assert!(DatasetFraction::new(100).is_ok());
    }

    #[test]
    fn test_sequence_validation() {
        assert!(FractionSequence::from_percents(&[]).is_err());
        assert!(FractionSequence::from_percents(&[10, 10]).is_err());
        assert!(FractionSequence::from_percents(&[50, 10]).is_err());

        let seq = FractionSequence::from_percents(&[10, 50, 100]).unwrap();
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_deciles() {
        let percents: Vec<u32> = FractionSequence::deciles().into();
        assert_eq!(percents, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn test_sequence_deserialize_validates() {
        let ok: FractionSequence = serde_json::from_str("[10, 20]").unwrap();
        assert_eq!(ok.len(), 2);
        assert!(serde_json::from_str::<FractionSequence>("[20, 10]").is_err());
    }
}
