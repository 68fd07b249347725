//! User profiles for the users a client can see.

use crate::model::{Machine, User};
use crate::protocol::UserProfile;
use std::collections::BTreeMap;
use std::iter;

/// One profile per distinct user among `machine` and `peers`.
///
/// Users are keyed by name; a later record with the same name replaces an
/// earlier one. The display name is `name@base_domain` when a base domain is
/// set, otherwise the bare name. Profiles come back sorted by name.
pub fn generate_user_profiles(
    machine: &Machine,
    peers: &[Machine],
    base_domain: &str,
) -> Vec<UserProfile> {
    let mut users: BTreeMap<&str, &User> = BTreeMap::new();
    for m in iter::once(machine).chain(peers) {
        users.insert(m.user.name.as_str(), &m.user);
    }

    users
        .into_values()
        .map(|user| UserProfile {
            id: user.id,
            login_name: user.name.clone(),
            display_name: display_name(&user.name, base_domain),
            profile_pic_url: String::new(),
        })
        .collect()
}

fn display_name(name: &str, base_domain: &str) -> String {
    if base_domain.is_empty() {
        name.to_string()
    } else {
        format!("{name}@{base_domain}")
    }
}
