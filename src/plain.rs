/// Marker for types that can be handed to the GPU as raw bytes.
///
/// # Safety
/// Implementors must be `#[repr(C)]`, contain no padding and no pointers.
pub unsafe trait Plain {
    fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(
                (self as *const Self).cast::<u8>(),
                std::mem::size_of_val(self),
            )
        }
    }
}

unsafe impl<T: Plain> Plain for [T] {}

unsafe impl<T: Plain, const N: usize> Plain for [T; N] {}

unsafe impl Plain for f32 {}
