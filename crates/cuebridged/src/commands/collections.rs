//! Scene collections and profiles.

use serde_json::{Value, json};

use crate::dispatch::{CommandContext, Request};

use super::{CommandResult, Params, done, fields};

pub(super) fn set_current_scene_collection(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let name = Params::new(request).str("sc-name")?;
    context
        .studio
        .with_studio(|studio| studio.set_current_collection(name))?;
    done()
}

pub(super) fn get_current_scene_collection(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    let name = context
        .studio
        .with_studio(|studio| studio.current_collection.clone());
    Ok(fields(json!({ "sc-name": name })))
}

pub(super) fn list_scene_collections(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    let collections: Vec<Value> = context.studio.with_studio(|studio| {
        studio
            .collections
            .iter()
            .map(|name| json!({ "sc-name": name }))
            .collect()
    });
    Ok(fields(json!({ "scene-collections": collections })))
}

pub(super) fn set_current_profile(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("profile-name")?;
    context
        .studio
        .with_studio(|studio| studio.set_current_profile(name))?;
    done()
}

pub(super) fn get_current_profile(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    let name = context
        .studio
        .with_studio(|studio| studio.current_profile.clone());
    Ok(fields(json!({ "profile-name": name })))
}

pub(super) fn list_profiles(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    let profiles: Vec<Value> = context.studio.with_studio(|studio| {
        studio
            .profiles
            .iter()
            .map(|name| json!({ "profile-name": name }))
            .collect()
    });
    Ok(fields(json!({ "profiles": profiles })))
}
