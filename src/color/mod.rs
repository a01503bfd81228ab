//! Per-channel color transforms
//!
//! Pure, stateless pixel operations: white-balance variants and their fixed
//! chain, saturation and brightness scaling, and shadow brightening. All
//! operations consume and produce 8-bit RGB buffers; alpha is never touched
//! here (it is split off before the chain and consumed by the compositor).

pub mod adjust;
pub mod balance;
pub mod hsv;

pub use adjust::{adjust_brightness, brighten_shadows, increase_saturation};
pub use balance::{adaptive, apply_full_balance, gray_world, perfect_reflector, white_patch};
pub use hsv::{hsv_to_rgb, rgb_to_hsv, Hsv};

/// Apply a per-pixel kernel to one interleaved RGB row in place.
#[inline]
pub(crate) fn map_row<F: Fn([u8; 3]) -> [u8; 3]>(row: &mut [u8], kernel: F) {
    for px in row.chunks_exact_mut(3) {
        let out = kernel([px[0], px[1], px[2]]);
        px.copy_from_slice(&out);
    }
}
