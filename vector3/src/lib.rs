mod vector3_f64;
pub use vector3_f64::*;

mod vector3_i32;
pub use vector3_i32::*;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: num_traits::identities::Zero + Copy> Vector3<T> {
    #[inline]
    pub fn new(x: T, y: T, z: T) -> Self {
        Vector3 { x, y, z }
    }

    #[inline]
    pub fn zeros() -> Vector3<T> {
        Vector3 {
            x: T::zero(),
            y: T::zero(),
            z: T::zero(),
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        vec![self.x, self.y, self.z]
    }

    /// Slice view of the components; relies on the #[repr(C)] layout.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(&self.x as *const T, 3) }
    }
}
