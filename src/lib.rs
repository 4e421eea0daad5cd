//! Content tree, reference resolution, cascade propagation and lazy
//! resource publishing for a static site build.
//!
//! ```ignore
//! let site = Site::load_dir(SiteConfig::load(Path::new("tola.toml"))?)?;
//! let page = site.resolve(None, "sect3/b1")?;
//! site.publish_all();
//! ```

pub mod logger;

pub mod cascade;
pub mod cli;
pub mod config;
pub mod core;
pub mod frontmatter;
pub mod page;
pub mod resolve;
pub mod resource;
pub mod site;
pub mod tree;

pub use cascade::{CascadeError, Propagator};
pub use config::{ConfigError, SiteConfig};
pub use resolve::{ResolveError, get_page_legacy, resolve};
pub use site::Site;
pub use tree::{ContentNode, ContentTree};
