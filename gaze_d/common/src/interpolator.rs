use glam::{DVec2, Vec2, Vec3};
use std::ops::{Add, Sub};

/// Values that can be blended componentwise by a scalar factor.
pub trait Smoothable: Copy + Add<Output = Self> + Sub<Output = Self> {
    type Scalar: Copy;

    fn scale(self, factor: Self::Scalar) -> Self;
    fn is_finite(&self) -> bool;
}

impl Smoothable for f32 {
    type Scalar = f32;

    fn scale(self, factor: Self::Scalar) -> Self {
        self * factor
    }

    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

impl Smoothable for f64 {
    type Scalar = f64;

    fn scale(self, factor: Self::Scalar) -> Self {
        self * factor
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Smoothable for Vec2 {
    type Scalar = f32;

    fn scale(self, factor: Self::Scalar) -> Self {
        self * factor
    }

    fn is_finite(&self) -> bool {
        Vec2::is_finite(*self)
    }
}

impl Smoothable for DVec2 {
    type Scalar = f64;

    fn scale(self, factor: Self::Scalar) -> Self {
        self * factor
    }

    fn is_finite(&self) -> bool {
        DVec2::is_finite(*self)
    }
}

impl Smoothable for Vec3 {
    type Scalar = f32;

    fn scale(self, factor: Self::Scalar) -> Self {
        self * factor
    }

    fn is_finite(&self) -> bool {
        Vec3::is_finite(*self)
    }
}

/// Exponential low-pass filter. Smaller factors smooth harder.
#[derive(Debug, Clone, Copy)]
pub struct LowPassInterpolator<T: Smoothable> {
    filter_factor: T::Scalar,
    current: T,
}

impl<T: Smoothable> LowPassInterpolator<T> {
    pub fn new(filter_factor: T::Scalar, initial_value: T) -> Self {
        Self {
            filter_factor,
            current: initial_value,
        }
    }

    fn low_pass(current: &mut T, target: T, factor: T::Scalar) -> T {
        let next = *current + (target - *current).scale(factor);
        *current = next;
        next
    }

    /// Moves the filtered value toward `new_value`. `factor` overrides the
    /// configured filter factor for this call only.
    ///
    /// Non-finite input leaves the state untouched.
    pub fn update(&mut self, new_value: T, factor: Option<T::Scalar>) -> T {
        if !new_value.is_finite() {
            return self.current;
        }
        let factor = factor.unwrap_or(self.filter_factor);
        Self::low_pass(&mut self.current, new_value, factor)
    }

    pub fn value(&self) -> T {
        self.current
    }

    pub fn filter_factor(&self) -> T::Scalar {
        self.filter_factor
    }

    pub fn reset(&mut self, value: T) {
        self.current = value;
    }
}
