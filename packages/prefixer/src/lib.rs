pub mod behavior;
pub mod browsers;
pub mod data;
pub mod error;
pub mod flexbox;
pub mod handlers;
pub mod matrix;
pub mod orchestrator;
pub mod vendor;
pub mod version;
pub mod walker;

pub use behavior::{PrefixBehavior, FLEX_2009, FLEX_2012, FLEX_FINAL};
pub use browsers::{Browser, BrowserSelection};
pub use data::{CompatProvider, CompatTable, FeatureKind};
pub use error::{PrefixError, PrefixResult};
pub use handlers::Category;
pub use matrix::SupportMatrix;
pub use orchestrator::{Options, Prefixer};
pub use vendor::{is_unprefixed, split_prefixed, Prefix};
pub use version::Version;
pub use walker::{find_equivalents, Equivalents, WalkPolicy};
