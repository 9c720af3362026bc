use num_traits::Float;

use crate::error::Error;
use crate::Result;

/// Linearly rescale `x` from `[in_min, in_max]` onto `[out_min, out_max]`
///
/// The result saturates at the bounds of the output range rather than extrapolating, so a noisy
/// reading slightly outside the reportable range of a device lands on the nearest rail.
///
/// # Errors
///
/// Returns [`Error::DivideByZero`] when the input range is degenerate, i.e. `in_min == in_max`.
///
/// # Examples
///
/// ```
/// use air_quality::math::remap;
///
/// let mapped = remap(5.0, 0.0, 10.0, 0.0, 1023.0).unwrap();
/// approx::assert_relative_eq!(mapped, 511.5);
///
/// // Values beyond the input range are clamped
/// assert_eq!(remap(-3.0, 0.0, 10.0, 0.0, 1023.0).unwrap(), 0.0);
/// assert_eq!(remap(12.0, 0.0, 10.0, 0.0, 1023.0).unwrap(), 1023.0);
/// ```
pub fn remap<E: Float>(x: E, in_min: E, in_max: E, out_min: E, out_max: E) -> Result<E> {
    let in_span = in_max - in_min;
    if in_span.is_zero() {
        return Err(Error::DivideByZero);
    }

    let out = (x - in_min) * (out_max - out_min) / in_span + out_min;

    if out < out_min {
        Ok(out_min)
    } else if out > out_max {
        Ok(out_max)
    } else {
        Ok(out)
    }
}
