use crate::error::{invalid, Result};

/// A labelled tick at an item position along a panel side.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: usize,
    pub text: String,
}

/// Frequency threshold deciding which ticks keep their text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelFilter {
    threshold: f64,
}

impl LabelFilter {
    /// `threshold` must lie in `[0, 1)`; zero disables thresholding.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&threshold) {
            return invalid!("freq_thresh_show_labels must be >= 0 and < 1, got {threshold}");
        }
        Ok(Self { threshold })
    }

    pub fn disabled() -> Self {
        Self { threshold: 0.0 }
    }

    pub fn is_thresholded(&self) -> bool {
        self.threshold > 0.0
    }

    pub fn keeps(&self, frequency: f64) -> bool {
        !self.is_thresholded() || frequency > self.threshold
    }
}

/// Decide which ticks of one axis are drawn with text.
///
/// A configured threshold wins over everything else. Otherwise every label is
/// shown when `show_all` is set or the axis is short enough, and none is
/// shown past `displayable`.
pub fn select_labels(
    labels: &[String],
    frequencies: &[f64],
    displayable: usize,
    show_all: bool,
    filter: &LabelFilter,
) -> Result<Vec<Tick>> {
    if labels.len() != frequencies.len() {
        return invalid!(
            "{} labels but {} frequencies for the same axis",
            labels.len(),
            frequencies.len()
        );
    }

    let ticks = labels
        .iter()
        .zip(frequencies)
        .enumerate()
        .map(|(position, (text, &freq))| {
            let tick = Tick {
                position,
                text: text.clone(),
            };
            (tick, freq)
        });

    let selected: Vec<Tick> = if filter.is_thresholded() {
        ticks.filter(|(_, freq)| filter.keeps(*freq)).map(|(t, _)| t).collect()
    } else if show_all || labels.len() <= displayable {
        ticks.map(|(t, _)| t).collect()
    } else {
        Vec::new()
    };
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("v{i}")).collect()
    }

    #[test]
    fn threshold_is_strict() {
        let filter = LabelFilter::new(0.05).unwrap();
        let ticks = select_labels(&labels(3), &[0.0, 0.05, 0.10], 60, false, &filter).unwrap();
        assert_eq!(
            ticks,
            vec![Tick {
                position: 2,
                text: "v2".into()
            }]
        );
    }

    #[test]
    fn threshold_beats_show_all() {
        let filter = LabelFilter::new(0.5).unwrap();
        let ticks = select_labels(&labels(3), &[0.9, 0.1, 0.6], 60, true, &filter).unwrap();
        let positions: Vec<usize> = ticks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn long_axes_lose_their_labels() {
        let filter = LabelFilter::disabled();
        let freq = vec![0.5; 61];
        assert!(select_labels(&labels(61), &freq, 60, false, &filter).unwrap().is_empty());
        assert_eq!(select_labels(&labels(61), &freq, 60, true, &filter).unwrap().len(), 61);
        assert_eq!(select_labels(&labels(60), &freq[..60], 60, false, &filter).unwrap().len(), 60);
    }

    #[test]
    fn threshold_range_is_checked() {
        assert!(LabelFilter::new(1.0).is_err());
        assert!(LabelFilter::new(-0.1).is_err());
        assert!(!LabelFilter::new(0.0).unwrap().is_thresholded());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(select_labels(&labels(2), &[0.1], 60, false, &LabelFilter::disabled()).is_err());
    }
}
