use crate::prelude::*;
use tracing::{debug, info};

/// What happened to the profile in the project it's moved into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MigrationTarget {
    /// Profile didn't exist there, so it's been copied over from the source
    Created,

    /// Profile already existed there and has been left intact
    KeptExisting,
}

/// What happened to the profile in the project it's moved out of.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MigrationSource {
    /// Nothing referred to the profile, so it's been deleted
    Removed,

    /// Something still refers to the profile, so it's been left in place
    KeptInUse,

    /// Profile had been already removed by an earlier migration
    AlreadyGone,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Migration {
    pub target: MigrationTarget,
    pub source: MigrationSource,
}

/// Moves a profile between two projects of the same remote.
///
/// Profile that already exists in the target project is never overwritten,
/// and the source copy is deleted only when nothing refers to it. Re-running
/// a migration (e.g. after an earlier run failed halfway) converges onto the
/// same state; a source missing while the target exists counts as a migration
/// that's already been completed.
///
/// There's no rollback: a failure after the copy has been created leaves both
/// copies in place.
pub fn migrate_profile(
    lxd: &mut dyn LxdClient,
    remote: &LxdRemoteName,
    profile: &LxdProfileName,
    from: &LxdProjectName,
    to: &LxdProjectName,
) -> Result<Migration> {
    info!(
        "Moving profile {} from project `{}` into `{}`",
        profile.on(remote),
        from,
        to
    );

    let fetched = lxd.use_project(remote, from).profile(profile);

    let source = match fetched {
        Ok((source, _)) => source,

        Err(err) if err.is_not_found() => {
            let migrated = lxd
                .use_project(remote, to)
                .has_profile(profile)
                .with_context(|| format!("Couldn't list profiles of project `{}`", to))?;

            if migrated {
                debug!("Profile is gone from `{}` but present in `{}`", from, to);

                return Ok(Migration {
                    target: MigrationTarget::KeptExisting,
                    source: MigrationSource::AlreadyGone,
                });
            }

            return Err(err).with_context(|| {
                format!("Couldn't find profile `{}` in project `{}`", profile, from)
            });
        }

        Err(err) => {
            return Err(err).with_context(|| {
                format!("Couldn't fetch profile `{}` from project `{}`", profile, from)
            });
        }
    };

    let mut destination = lxd.use_project(remote, to);

    let exists = destination
        .has_profile(profile)
        .with_context(|| format!("Couldn't list profiles of project `{}`", to))?;

    let target = if exists {
        debug!("Profile already exists in `{}`, leaving it intact", to);

        MigrationTarget::KeptExisting
    } else {
        destination
            .create_profile(&LxdProfilesPost {
                name: profile.to_owned(),
                profile: source.to_put(),
            })
            .with_context(|| format!("Couldn't copy profile `{}` into project `{}`", profile, to))?;

        MigrationTarget::Created
    };

    let source = if source.is_used() {
        debug!(
            "Profile is still used in `{}` (by {:?}), leaving it in place",
            from, source.used_by
        );

        MigrationSource::KeptInUse
    } else {
        lxd.use_project(remote, from)
            .delete_profile(profile)
            .with_context(|| {
                format!("Couldn't delete profile `{}` from project `{}`", profile, from)
            })?;

        MigrationSource::Removed
    };

    Ok(Migration { target, source })
}
