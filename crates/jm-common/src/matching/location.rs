use super::component::{Component, ComponentScore};
use crate::{RemoteCategory, normalize::normalize_label};

/// Case-insensitive: the preferred location equals or is a substring of the job's
/// location ("Remote" matches "Remote - US", not the other way round).
pub fn location_matches(preferred: &str, job_location: &str) -> bool {
    let preferred = normalize_label(preferred);
    let job_location = normalize_label(job_location);
    if preferred.is_empty() || job_location.is_empty() {
        return false;
    }
    job_location.contains(&preferred)
}

/// Location component, a coarse binary signal.
///
/// Applicable when the query names a preferred location or remote category.
/// - fully remote job and the candidate accepts remote → 1, the job has no location constraint
/// - any preferred location matches the job's location text → 1
/// - job has no location text → not applicable
/// - otherwise → 0
pub fn score_location(
    preferred_locations: &[String],
    preferred_remote: &[RemoteCategory],
    job_location: Option<&str>,
    job_remote: Option<RemoteCategory>,
) -> ComponentScore {
    if preferred_locations.is_empty() && preferred_remote.is_empty() {
        return ComponentScore::not_applicable(Component::Location, "no location preference");
    }

    if job_remote == Some(RemoteCategory::Remote)
        && preferred_remote.contains(&RemoteCategory::Remote)
    {
        return ComponentScore::scored(
            Component::Location,
            1.0,
            "fully remote job - no location constraint",
        );
    }

    let Some(job_location) = job_location.filter(|loc| !loc.trim().is_empty()) else {
        return ComponentScore::not_applicable(Component::Location, "job has no location");
    };

    match preferred_locations
        .iter()
        .find(|preferred| location_matches(preferred, job_location))
    {
        Some(preferred) => ComponentScore::scored(
            Component::Location,
            1.0,
            format!("preferred '{}' matches '{}'", preferred.trim(), job_location.trim()),
        ),
        None => ComponentScore::scored(
            Component::Location,
            0.0,
            format!("no preferred location matches '{}'", job_location.trim()),
        ),
    }
}

/// Remote component: 1 when the job's category is one the candidate accepts.
///
/// Not applicable without a remote preference or when the job's category is unknown.
pub fn score_remote(
    preferred_remote: &[RemoteCategory],
    job_remote: Option<RemoteCategory>,
) -> ComponentScore {
    if preferred_remote.is_empty() {
        return ComponentScore::not_applicable(Component::Remote, "no remote preference");
    }
    let Some(job_remote) = job_remote else {
        return ComponentScore::not_applicable(Component::Remote, "job remote category unknown");
    };

    if preferred_remote.contains(&job_remote) {
        ComponentScore::scored(Component::Remote, 1.0, format!("{job_remote} accepted"))
    } else {
        ComponentScore::scored(
            Component::Remote,
            0.0,
            format!("{job_remote} not in preferred categories"),
        )
    }
}
