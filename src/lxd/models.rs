mod device;
mod device_type;
mod etag;
mod profile;
mod profile_name;
mod project;
mod project_name;
mod remote_name;

pub use self::{
    device::*, device_type::*, etag::*, profile::*, profile_name::*, project::*, project_name::*,
    remote_name::*,
};
