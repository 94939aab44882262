use lazy_static::lazy_static;
use libsodium_sys;

lazy_static! {
    static ref SODIUM: () = {
        unsafe {
            if libsodium_sys::sodium_init() < 0 {
                panic!("Cryptography initialization failed")
            }
        }
    };
}

/// Initialize the sodium infrastructure. Safe to call any number of times,
/// the first caller pays the cost.
#[inline]
pub fn init() {
    lazy_static::initialize(&SODIUM);
}

/// Fills the provided buffer with cryptographically secure random bytes
#[inline]
pub fn random_bytes(out: &mut [u8]) {
    init();

    unsafe {
        libsodium_sys::randombytes_buf(out.as_mut_ptr() as *mut ::std::ffi::c_void, out.len());
    }
}
