// src/angle.rs

/// Wraps an angle in degrees into (-180, 180].
///
/// Large magnitudes are first reduced with `%` (exact for floats), so the
/// fix-up loops run at most twice. Non-finite input is returned as is.
pub fn normalize(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let mut angle = angle;
    if angle.abs() > 720.0 {
        angle %= 360.0;
    }
    while angle > 180.0 {
        angle -= 360.0;
    }
    while angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

/// Absolute angular distance between two headings, in [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    normalize(a - b).abs()
}

/// Mean of the last `window` values, or of all of them if there are fewer.
pub fn mean_of_last<'a, I>(values: I, window: usize) -> f64
where
    I: DoubleEndedIterator<Item = &'a f64>,
{
    let (sum, count) = values
        .rev()
        .take(window)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
