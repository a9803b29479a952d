//! Scene switching, creation and per-scene transition overrides.

use serde_json::{Value, json};

use crate::dispatch::{CommandContext, Request};
use crate::studio::{Scene, SceneItem, Studio};

use super::{CommandResult, Params, done, fields};

/// Scene as listed by `GetCurrentScene`, `GetSceneList` and `GetPreviewScene`.
pub(super) fn scene_json(studio: &Studio, scene: &Scene) -> Value {
    let sources: Vec<Value> = scene
        .items
        .iter()
        .map(|item| item_json(studio, item))
        .collect();
    json!({ "name": scene.name, "sources": sources })
}

fn item_json(studio: &Studio, item: &SceneItem) -> Value {
    let (kind, width, height, volume, muted) = match studio.source(&item.source) {
        Ok(source) => (
            source.type_id.as_str(),
            source.width,
            source.height,
            source.volume,
            source.muted,
        ),
        Err(_) => ("scene", studio.video.base_width, studio.video.base_height, 1.0, false),
    };
    let transform = &item.transform;
    json!({
        "id": item.id,
        "name": item.source,
        "type": kind,
        "volume": volume,
        "muted": muted,
        "x": transform.position.x,
        "y": transform.position.y,
        "alignment": transform.position.alignment,
        "source_cx": width,
        "source_cy": height,
        "cx": f64::from(width) * transform.scale.x,
        "cy": f64::from(height) * transform.scale.y,
        "render": item.visible,
        "locked": item.locked,
    })
}

pub(super) fn set_current_scene(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("scene-name")?;
    context.studio.with_studio(|studio| studio.set_current_scene(name))?;
    done()
}

pub(super) fn get_current_scene(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        let scene = studio.current_scene()?;
        Ok(fields(scene_json(studio, scene)))
    })
}

pub(super) fn get_scene_list(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        let scenes: Vec<Value> = studio
            .scenes
            .iter()
            .map(|scene| scene_json(studio, scene))
            .collect();
        Ok(fields(json!({
            "current-scene": studio.current_scene,
            "scenes": scenes,
        })))
    })
}

pub(super) fn create_scene(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("sceneName")?;
    context.studio.with_studio(|studio| studio.create_scene(name))?;
    done()
}

pub(super) fn set_scene_transition_override(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let scene = params.str("sceneName")?;
    let transition = params.str("transitionName")?;
    let duration = params.opt_u64("transitionDuration")?;
    context
        .studio
        .with_studio(|studio| studio.set_transition_override(scene, transition, duration))?;
    done()
}

pub(super) fn remove_scene_transition_override(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let scene = Params::new(request).str("sceneName")?;
    context
        .studio
        .with_studio(|studio| studio.remove_transition_override(scene))?;
    done()
}

pub(super) fn get_scene_transition_override(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let scene = Params::new(request).str("sceneName")?;
    context.studio.with_studio(|studio| {
        let scene = studio.scene(scene)?;
        let (name, duration) = match &scene.transition_override {
            Some(entry) => (
                entry.transition.as_str(),
                entry.duration_ms.map_or(-1, |ms| i64::try_from(ms).unwrap_or(i64::MAX)),
            ),
            None => ("", -1),
        };
        Ok(fields(json!({
            "transitionName": name,
            "transitionDuration": duration,
        })))
    })
}
