//! Data model: categories, variants, part handles and the palette

pub mod category;
pub mod palette;
pub mod part;
pub mod variant;

pub use category::Category;
pub use palette::Palette;
pub use part::{Part, PartLayer, PartStatus, PartWait};
pub use variant::VariantDescriptor;
