//! Animatable values.
//!
//! Springs and tweens operate on a flat list of `f64` components, one
//! independent channel per element. A scalar has one component; a position or
//! colour has a fixed number of them. The component count of a value must not
//! change over a driver's lifetime.

use std::fmt::Debug;

use smallvec::SmallVec;

/// Inline storage for the component list. Up to four channels (a 2D point,
/// an RGBA colour) stay on the stack.
pub type Components = SmallVec<[f64; 4]>;

/// A value that can be split into numeric components and rebuilt from them.
pub trait Animatable: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// The value's components, in order.
    fn components(&self) -> Components;

    /// Rebuild a value from components.
    ///
    /// `components` has the same length as `self.components()`; `self` is a
    /// template for types whose shape is not fixed by the type itself.
    fn from_components(&self, components: &[f64]) -> Self;

    /// Number of components.
    fn len(&self) -> usize {
        self.components().len()
    }

    /// Whether the value has no components.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A value of the same shape with every component zero.
    fn zeroed(&self) -> Self {
        let zeros: Components = std::iter::repeat(0.0).take(self.len()).collect();
        self.from_components(&zeros)
    }
}

impl Animatable for f64 {
    fn components(&self) -> Components {
        smallvec::smallvec![*self]
    }

    fn from_components(&self, components: &[f64]) -> Self {
        components.first().copied().unwrap_or_default()
    }

    fn len(&self) -> usize {
        1
    }
}

impl Animatable for f32 {
    fn components(&self) -> Components {
        smallvec::smallvec![f64::from(*self)]
    }

    fn from_components(&self, components: &[f64]) -> Self {
        components.first().map_or(0.0, |c| *c as f32)
    }

    fn len(&self) -> usize {
        1
    }
}

impl<const N: usize> Animatable for [f64; N] {
    fn components(&self) -> Components {
        self.iter().copied().collect()
    }

    fn from_components(&self, components: &[f64]) -> Self {
        let mut out = [0.0; N];
        for (slot, value) in out.iter_mut().zip(components) {
            *slot = *value;
        }
        out
    }

    fn len(&self) -> usize {
        N
    }
}

impl Animatable for Vec<f64> {
    fn components(&self) -> Components {
        self.iter().copied().collect()
    }

    fn from_components(&self, components: &[f64]) -> Self {
        components.to_vec()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl Animatable for Components {
    fn components(&self) -> Components {
        self.clone()
    }

    fn from_components(&self, components: &[f64]) -> Self {
        Components::from_slice(components)
    }

    fn len(&self) -> usize {
        SmallVec::len(self)
    }
}

/// Per-element linear interpolation `from + (to - from) * t`.
///
/// Returns `to` unchanged when the shapes differ.
pub fn lerp<T: Animatable>(from: &T, to: &T, t: f64) -> T {
    let a = from.components();
    let b = to.components();
    if a.len() != b.len() {
        return to.clone();
    }
    let mixed: Components = a.iter().zip(&b).map(|(a, b)| a + (b - a) * t).collect();
    to.from_components(&mixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_have_one_component() {
        assert_eq!(2.5_f64.components().as_slice(), &[2.5]);
        assert_eq!(1.0_f64.from_components(&[7.0]), 7.0);
        assert_eq!(3.0_f32.zeroed(), 0.0);
    }

    #[test]
    fn vectors_round_trip_their_shape() {
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(v.len(), 3);
        assert_eq!(v.zeroed(), vec![0.0; 3]);

        let point = [4.0, 5.0];
        assert_eq!(point.from_components(&[6.0, 7.0]), [6.0, 7.0]);
    }

    #[test]
    fn lerp_is_per_element() {
        assert_eq!(lerp(&0.0_f64, &10.0, 0.25), 2.5);
        assert_eq!(lerp(&vec![0.0, 100.0], &vec![10.0, 0.0], 0.5), vec![5.0, 50.0]);
        assert_eq!(lerp(&[1.0, 1.0], &[3.0, 5.0], 1.0), [3.0, 5.0]);
    }

    #[test]
    fn lerp_with_mismatched_shapes_returns_target() {
        assert_eq!(lerp(&vec![0.0], &vec![1.0, 2.0], 0.5), vec![1.0, 2.0]);
    }
}
