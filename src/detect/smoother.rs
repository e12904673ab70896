//! Windowed median over raw scene scores

/// Median of `raw[i - radius ..= i + radius]` for every sample, with the
/// window truncated at both ends of the series.
pub fn median_scores(raw: &[f64], radius: usize) -> Vec<f64> {
    if radius == 0 {
        return raw.to_vec();
    }

    let mut window = Vec::with_capacity(2 * radius + 1);
    (0..raw.len())
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(raw.len());
            window.clear();
            window.extend_from_slice(&raw[lo..hi]);
            median(&mut window)
        })
        .collect()
}

/// Median of a non-empty slice; even lengths average the two middle values.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
