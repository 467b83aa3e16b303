use statrs::statistics::Statistics;

// Missing values are excluded, never treated as zero. An all-missing input
// yields None instead of NaN.

pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present = present(values);
    if present.is_empty() {
        return None;
    }
    Some(present.iter().mean())
}

pub fn min_present(values: &[Option<f64>]) -> Option<f64> {
    let present = present(values);
    if present.is_empty() {
        return None;
    }
    Some(Statistics::min(present.iter()))
}
