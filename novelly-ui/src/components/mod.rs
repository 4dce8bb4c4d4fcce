//! Reusable UI Components

pub mod header;
pub mod loading;
pub mod novel_card;
pub mod stars;
pub mod toast;

pub use header::Header;
pub use loading::{GridSkeleton, Loading, Spinner};
pub use novel_card::{NovelCard, NovelRow};
pub use stars::{StarPicker, StarRating};
pub use toast::Toast;
