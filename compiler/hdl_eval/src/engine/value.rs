/// Raw 64-bit scalar passed to or returned from native code.
///
/// Integers are stored two's complement, reals as IEEE-754 bits. How the
/// bits are read back is up to the caller, who knows the static type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GenericValue(u64);

impl GenericValue {
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_int(value: i64) -> Self {
        Self(value as u64)
    }

    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Self(value.to_bits())
    }

    /// The bits as an integer, sign-extended when `signed`.
    #[inline]
    pub fn to_int(self, signed: bool) -> i128 {
        if signed {
            i128::from(self.as_i64())
        } else {
            i128::from(self.0)
        }
    }

    #[inline]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn as_i64(self) -> i64 {
        self.0 as i64
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        f64::from_bits(self.0)
    }

    pub(crate) fn from_bool(value: bool) -> Self {
        Self(u64::from(value))
    }

    pub(crate) fn is_true(self) -> bool {
        self.0 != 0
    }
}
