/**
Calculates the arithmetic mean of a slice of f64 values.

## Arguments
- `values`: A slice of f64 values.

## Returns
The mean of the values, or `0.0` if the slice is empty.
 */
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
