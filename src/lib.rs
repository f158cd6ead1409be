//! Manages LXD profiles and projects on behalf of an infrastructure-as-code
//! host framework.
//!
//! Each resource type is driven by a controller implementing [`Resource`];
//! controllers are handed out by [`Provider`], which owns the configuration
//! and the connection to LXD.
//!
//! The interesting part is [`ProfileResource`]'s update: when a profile's
//! declared project changes, the profile is moved between projects (see
//! [`migrate_profile()`]) before the rest of its attributes are reconciled.

mod config;
mod lxd;
mod provider;
mod resources;

pub mod logging;


pub use self::{config::*, lxd::*, provider::*, resources::*};

mod prelude {
    pub use crate::{config::*, lxd::*, resources::*};
    pub use anyhow::{bail, Context, Result};
}
