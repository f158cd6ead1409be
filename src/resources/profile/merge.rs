use super::{ProfileDevice, ProfileState};
use crate::prelude::*;
use tracing::debug;

/// Applies the difference between `prior` and `declared` on top of what the
/// remote currently has, returning the new body to submit or `None` if there
/// is nothing to change.
///
/// Description and config are replaced as a whole. Devices are merged: those
/// that were declared before are removed, then those declared now are
/// inserted; devices the remote has but that were never declared are kept.
pub fn merge_profile(
    mut current: LxdProfilePut,
    prior: &ProfileState,
    declared: &ProfileState,
) -> Option<LxdProfilePut> {
    let mut changed = false;

    if prior.description != declared.description {
        changed = true;
        current.description = declared.description.clone();
    }

    if prior.config != declared.config {
        changed = true;
        current.config = declared.config.clone();
    }

    if prior.devices != declared.devices {
        changed = true;

        for device in &prior.devices {
            current.devices.remove(&device.name);
        }

        current
            .devices
            .extend(ProfileDevice::to_lxd_all(&declared.devices));

        debug!("Updated device list: {:?}", current.devices);
    }

    changed.then_some(current)
}
