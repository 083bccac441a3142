//! Domain entities for framecast: captured frames and their derived variants.

pub mod frame;
pub mod variant;

pub use frame::{Frame, TransformError};
pub use variant::{derive_variants, TransformPlan, Variant, VariantImage};
