//! Image-processing pipeline stages
//!
//! - [`resize`]: bound the working resolution
//! - [`extract`]: foreground mask from a matte provider, with fallback
//! - [`refine`]: dilate and blur a mask
//! - [`recolor`]: mask-weighted tinting

pub mod extract;
pub mod recolor;
pub mod refine;
pub mod resize;

pub use extract::{
    binarize_alpha, extract_mask, extract_mask_with_source, fallback_mask, try_extract_mask,
    MASK_BINARIZE_THRESHOLD,
};
pub use recolor::{blend_recolor, luma, recolor, try_recolor, RECOLOR_EXPAND_PIXELS};
pub use refine::{dilate_square, refine_mask, MaskRefinement};
pub use resize::{resize_for_processing, resize_to, scaled_dimensions};
